//! Type definitions for the Watana SDK.
//!
//! This module contains the request and response types used by the SDK.
//! Rust field names are mapped to the service's wire names with serde
//! renames.

use crate::codec;
use crate::error::{Result, WatanaError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// A person asked to sign.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Signer {
    /// Full name as shown in the signature.
    #[serde(rename = "nombre_completo")]
    pub full_name: String,
    /// Email address the request is delivered to.
    #[serde(rename = "email")]
    pub email: String,
    /// Mobile number, used for OTP delivery.
    #[serde(rename = "celular", default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Identity document type (e.g. "DNI").
    #[serde(
        rename = "tipo_documento",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub document_type: Option<String>,
    /// Identity document number.
    #[serde(
        rename = "numero_documento",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub document_number: Option<String>,
}

/// A named file whose content is `base64(zip(bytes))`.
///
/// Used for uploads and downloads alike.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct FileEnvelope {
    /// Display name, without extension.
    #[serde(rename = "nombre_archivo")]
    pub name: String,
    /// Zip-compressed, base64-encoded content.
    #[serde(rename = "zip_base64")]
    pub content: String,
}

impl FileEnvelope {
    /// Pack raw bytes into an envelope.
    ///
    /// # Example
    ///
    /// ```rust
    /// use watana::FileEnvelope;
    ///
    /// let file = FileEnvelope::from_bytes("contract", "pdf", b"%PDF-1.7").unwrap();
    /// assert_eq!(file.name, "contract");
    /// assert_eq!(file.decode().unwrap(), b"%PDF-1.7");
    /// ```
    pub fn from_bytes(name: &str, extension: &str, bytes: &[u8]) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            content: codec::pack(bytes, name, extension)?,
        })
    }

    /// Read a file from disk and pack it under its stem and extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            WatanaError::Unexpected(format!("failed to read {}: {e}", path.display()))
        })?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self::from_bytes(&name, &extension, &bytes)
    }

    /// Recover the original bytes.
    pub fn decode(&self) -> Result<Vec<u8>> {
        codec::unpack(&self.content)
    }

    /// Decode the content and write it to `dir/name.extension`.
    pub async fn save_to(&self, dir: impl AsRef<Path>, extension: &str) -> Result<PathBuf> {
        let bytes = self.decode()?;
        let file_name = match extension.trim_start_matches('.') {
            "" => self.name.clone(),
            ext => format!("{}.{ext}", self.name),
        };
        let path = dir.as_ref().join(file_name);

        tokio::fs::write(&path, bytes).await.map_err(|e| {
            WatanaError::Unexpected(format!("failed to write {}: {e}", path.display()))
        })?;
        Ok(path)
    }
}

/// The `{success, mensaje}` shape every operation resolves to.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Envelope {
    /// Whether the service accepted the operation.
    pub success: bool,
    /// Human-readable message from the service.
    #[serde(rename = "mensaje", default)]
    pub message: String,
    /// Any operation-specific fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Result of `consultar_carpeta`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FolderStatus {
    pub success: bool,
    #[serde(rename = "mensaje", default)]
    pub message: String,
    /// Folder state as reported by the service.
    #[serde(rename = "estado", default)]
    pub status: Option<String>,
    /// Number of the request attached to the folder, if any.
    #[serde(rename = "solicitud_numero", default)]
    pub request_number: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Result of `enviar_carpeta`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SendFolderResponse {
    pub success: bool,
    #[serde(rename = "mensaje", default)]
    pub message: String,
    /// Number assigned to the signature request.
    #[serde(rename = "solicitud_numero", default)]
    pub request_number: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Result of `descargar_carpeta`.
///
/// When the service streams a zip file back, this envelope is synthesized
/// locally from the binary response.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DownloadResponse {
    pub success: bool,
    #[serde(rename = "mensaje", default)]
    pub message: String,
    #[serde(rename = "solicitud_numero", default)]
    pub request_number: String,
    /// Downloaded files.
    #[serde(rename = "archivos", default)]
    pub files: Vec<FileEnvelope>,
}

/// Result of `preparar_solicitud`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PrepareRequestResponse {
    pub success: bool,
    #[serde(rename = "mensaje", default)]
    pub message: String,
    /// Code to pass to `enviar_solicitud`.
    #[serde(rename = "firma_codigo", default)]
    pub signature_code: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Result of `enviar_solicitud` and `consultar_solicitud`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RequestStatus {
    pub success: bool,
    #[serde(rename = "mensaje", default)]
    pub message: String,
    #[serde(rename = "solicitud_numero", default)]
    pub request_number: Option<String>,
    #[serde(rename = "estado", default)]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Result of `firmar_pdf`, `sellar_pdf` and `validar_pdf`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PdfResponse {
    pub success: bool,
    #[serde(rename = "mensaje", default)]
    pub message: String,
    /// Signed or stamped PDF as `base64(zip(bytes))`. Absent for validation.
    #[serde(rename = "zip_base64", default)]
    pub content: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PdfResponse {
    /// Decode the returned PDF, if the service sent one.
    pub fn decode_pdf(&self) -> Result<Option<Vec<u8>>> {
        self.content.as_deref().map(codec::unpack).transpose()
    }
}

/// Request to create a folder and send it for signature.
#[derive(Debug, Clone, Default)]
pub struct SendFolderRequest {
    /// Caller-assigned folder code.
    pub folder_code: String,
    pub title: String,
    pub description: Option<String>,
    pub signer: Signer,
    pub files: Vec<FileEnvelope>,
    /// Add a trusted timestamp to the signatures.
    pub timestamp: Option<bool>,
    /// Hours until the request expires.
    pub expiration_hours: Option<u32>,
    /// Free-form options, merged without overwriting the fields above.
    pub extra: Option<Map<String, Value>>,
}

/// Request to prepare a signature request inside an existing folder.
#[derive(Debug, Clone, Default)]
pub struct PrepareRequest {
    pub folder_code: String,
    /// Name of the signature request.
    pub name: String,
    pub files: Vec<FileEnvelope>,
    pub extra: Option<Map<String, Value>>,
}

/// Request to send a prepared signature request to its signers.
#[derive(Debug, Clone, Default)]
pub struct SendSignatureRequest {
    pub folder_code: String,
    /// Code returned by `preparar_solicitud`.
    pub signature_code: String,
    pub signers: Vec<Signer>,
    pub extra: Option<Map<String, Value>>,
}

/// Request to sign, stamp or validate a PDF.
#[derive(Debug, Clone, Default)]
pub struct PdfRequest {
    /// PDF as `base64(zip(bytes))`.
    pub content: String,
    /// Signature appearance and other free-form options.
    pub extra: Option<Map<String, Value>>,
}

impl PdfRequest {
    /// Pack raw PDF bytes into a request.
    pub fn from_pdf(name: &str, pdf: &[u8]) -> Result<Self> {
        Ok(Self {
            content: codec::pack(pdf, name, "pdf")?,
            extra: None,
        })
    }

    /// Attach free-form options.
    pub fn with_options(mut self, options: Map<String, Value>) -> Self {
        self.extra = Some(options);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signer_serialization() {
        let signer = Signer {
            full_name: "Ana Quispe".to_string(),
            email: "ana@example.com".to_string(),
            phone: None,
            document_type: Some("DNI".to_string()),
            document_number: Some("12345678".to_string()),
        };

        let json = serde_json::to_string(&signer).unwrap();
        assert!(json.contains("\"nombre_completo\":\"Ana Quispe\""));
        assert!(json.contains("\"tipo_documento\":\"DNI\""));
        assert!(!json.contains("celular")); // None fields are skipped
    }

    #[test]
    fn test_envelope_keeps_extra_fields() {
        let json = r#"{"success": true, "mensaje": "ok", "estado": "FIRMADO"}"#;
        let envelope: Envelope = serde_json::from_str(json).unwrap();
        assert!(envelope.success);
        assert_eq!(envelope.message, "ok");
        assert_eq!(envelope.extra["estado"], "FIRMADO");
    }

    #[test]
    fn test_download_response_deserialization() {
        let json = r#"{
            "success": true,
            "mensaje": "listo",
            "solicitud_numero": "00000000042",
            "archivos": [{"nombre_archivo": "acta", "zip_base64": "UEsFBg=="}]
        }"#;

        let response: DownloadResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.request_number, "00000000042");
        assert_eq!(response.files.len(), 1);
        assert_eq!(response.files[0].name, "acta");
    }

    #[test]
    fn test_file_envelope_decode() {
        let file = FileEnvelope::from_bytes("acta", "pdf", b"%PDF-1.4 acta").unwrap();
        assert_eq!(file.decode().unwrap(), b"%PDF-1.4 acta");
    }

    #[test]
    fn test_pdf_response_decode() {
        let content = codec::pack(b"%PDF signed", "signed", "pdf").unwrap();
        let response = PdfResponse {
            success: true,
            content: Some(content),
            ..Default::default()
        };
        assert_eq!(response.decode_pdf().unwrap(), Some(b"%PDF signed".to_vec()));

        let validation = PdfResponse::default();
        assert_eq!(validation.decode_pdf().unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_envelope_disk_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("informe.pdf");
        tokio::fs::write(&source, b"%PDF informe").await.unwrap();

        let file = FileEnvelope::from_path(&source).await.unwrap();
        assert_eq!(file.name, "informe");

        let out_dir = dir.path().join("out");
        tokio::fs::create_dir(&out_dir).await.unwrap();
        let saved = file.save_to(&out_dir, "pdf").await.unwrap();
        assert_eq!(saved, out_dir.join("informe.pdf"));
        assert_eq!(tokio::fs::read(saved).await.unwrap(), b"%PDF informe");
    }
}
