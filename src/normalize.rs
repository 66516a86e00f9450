//! Response shape normalization.
//!
//! The service answers either with JSON or with a raw zip stream. Zip
//! responses are repackaged into the same JSON envelope a JSON download
//! would produce, so callers always receive JSON text.

use crate::codec;
use crate::error::{Result, WatanaError};
use crate::types::{DownloadResponse, FileEnvelope};
use std::borrow::Cow;
use std::path::Path;

/// Message placed in envelopes synthesized from zip responses.
pub const DOWNLOAD_MESSAGE: &str = "Archivo descargado correctamente";

/// Request number placed in envelopes synthesized from zip responses. The
/// binary response carries no request number.
pub const PLACEHOLDER_REQUEST_NUMBER: &str = "00000000000";

/// File name used when the response has no usable `Content-Disposition`.
pub const DEFAULT_DOWNLOAD_NAME: &str = "descarga";

/// Shape of a successful response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ContentKind {
    Json,
    Zip,
}

/// Classify a `Content-Type` header value. Parameters and case are ignored.
pub(crate) fn classify(content_type: Option<&str>) -> Result<ContentKind> {
    let raw = content_type.unwrap_or_default();
    let essence = raw
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        "application/json" => Ok(ContentKind::Json),
        "application/x-zip-compressed" | "application/zip" | "application/x-zip" => {
            Ok(ContentKind::Zip)
        }
        "" => Err(WatanaError::UnsupportedContentType("(none)".to_string())),
        _ => Err(WatanaError::UnsupportedContentType(raw.trim().to_string())),
    }
}

/// Extract the file name from a `Content-Disposition` header value.
///
/// `filename*` (RFC 5987) takes precedence over `filename`.
pub(crate) fn disposition_filename(header: &str) -> Option<String> {
    let params: Vec<(String, &str)> = header
        .split(';')
        .skip(1)
        .filter_map(|param| {
            let (key, value) = param.split_once('=')?;
            Some((key.trim().to_ascii_lowercase(), value.trim()))
        })
        .collect();

    let extended = params
        .iter()
        .find(|(key, _)| key == "filename*")
        .and_then(|(_, value)| {
            let (_, encoded) = value.split_once("''")?;
            urlencoding::decode(encoded.trim_matches('"'))
                .ok()
                .map(Cow::into_owned)
        });

    extended
        .or_else(|| {
            params
                .iter()
                .find(|(key, _)| key == "filename")
                .map(|(_, value)| value.trim_matches('"').to_string())
        })
        .filter(|name| !name.trim().is_empty())
}

/// Derive the display name of a downloaded file: the `Content-Disposition`
/// file name without directories or extension, or [`DEFAULT_DOWNLOAD_NAME`].
pub(crate) fn download_name(content_disposition: Option<&str>) -> String {
    content_disposition
        .and_then(disposition_filename)
        .and_then(|name| {
            let base = name.rsplit(['/', '\\']).next().unwrap_or_default().to_string();
            Path::new(&base)
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
        })
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| DEFAULT_DOWNLOAD_NAME.to_string())
}

/// Wrap a zip response body into a serialized [`DownloadResponse`].
pub(crate) fn synthesize_download(body: &[u8], content_disposition: Option<&str>) -> Result<String> {
    let envelope = DownloadResponse {
        success: true,
        message: DOWNLOAD_MESSAGE.to_string(),
        request_number: PLACEHOLDER_REQUEST_NUMBER.to_string(),
        files: vec![FileEnvelope {
            name: download_name(content_disposition),
            content: codec::encode_base64(body),
        }],
    };

    serde_json::to_string(&envelope)
        .map_err(|e| WatanaError::Unexpected(format!("failed to encode download envelope: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_json_and_zip() {
        assert_eq!(
            classify(Some("application/json; charset=utf-8")).unwrap(),
            ContentKind::Json
        );
        assert_eq!(
            classify(Some("Application/X-Zip-Compressed")).unwrap(),
            ContentKind::Zip
        );
        assert_eq!(classify(Some("application/zip")).unwrap(), ContentKind::Zip);
    }

    #[test]
    fn test_classify_rejects_other_types() {
        match classify(Some("text/plain")) {
            Err(WatanaError::UnsupportedContentType(t)) => assert_eq!(t, "text/plain"),
            other => panic!("expected UnsupportedContentType, got {other:?}"),
        }
        assert!(matches!(
            classify(None),
            Err(WatanaError::UnsupportedContentType(_))
        ));
    }

    #[test]
    fn test_disposition_filename_variants() {
        assert_eq!(
            disposition_filename("attachment; filename=\"report.zip\"").as_deref(),
            Some("report.zip")
        );
        assert_eq!(
            disposition_filename("attachment; filename=report.zip").as_deref(),
            Some("report.zip")
        );
        assert_eq!(
            disposition_filename(
                "attachment; filename=\"fallback.zip\"; filename*=UTF-8''acta%20final.zip"
            )
            .as_deref(),
            Some("acta final.zip")
        );
        assert_eq!(disposition_filename("attachment"), None);
        assert_eq!(disposition_filename("attachment; filename=\"\""), None);
    }

    #[test]
    fn test_download_name_strips_extension() {
        assert_eq!(download_name(Some("attachment; filename=\"report.zip\"")), "report");
        assert_eq!(download_name(Some("attachment; filename=\"../tmp/x.zip\"")), "x");
        assert_eq!(download_name(Some("inline")), DEFAULT_DOWNLOAD_NAME);
        assert_eq!(download_name(None), DEFAULT_DOWNLOAD_NAME);
    }

    #[test]
    fn test_synthesize_download() {
        let body = codec::compress(b"%PDF firmado", "firmado", "pdf").unwrap();
        let json = synthesize_download(&body, Some("attachment; filename=\"report.zip\"")).unwrap();

        let envelope: DownloadResponse = serde_json::from_str(&json).unwrap();
        assert!(envelope.success);
        assert_eq!(envelope.message, DOWNLOAD_MESSAGE);
        assert_eq!(envelope.request_number, PLACEHOLDER_REQUEST_NUMBER);
        assert_eq!(envelope.files.len(), 1);
        assert_eq!(envelope.files[0].name, "report");
        assert_eq!(codec::decode_base64(&envelope.files[0].content).unwrap(), body);
        assert_eq!(envelope.files[0].decode().unwrap(), b"%PDF firmado");
    }

    #[test]
    fn test_extended_filename_decoding() {
        assert_eq!(
            disposition_filename("attachment; filename*=UTF-8''contrato%20a%C3%B1o.zip").as_deref(),
            Some("contrato año.zip")
        );
        assert_eq!(
            download_name(Some("attachment; filename*=UTF-8''contrato%20a%C3%B1o.zip")),
            "contrato año"
        );
        // Invalid UTF-8 in `filename*` falls back to `filename`.
        assert_eq!(
            disposition_filename("attachment; filename=\"plain.zip\"; filename*=UTF-8''%FF.zip")
                .as_deref(),
            Some("plain.zip")
        );
    }
}
