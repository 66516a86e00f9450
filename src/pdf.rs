//! PDF operations.
//!
//! This module provides the PdfClient for signing, stamping and validating
//! standalone PDF documents, outside of any folder.

use crate::client::Client;
use crate::error::Result;
use crate::payload::{keys, Operation, Payload};
use crate::types::{PdfRequest, PdfResponse};
use std::future::{pending, Future};

/// Client for PDF operations.
///
/// Access via `client.pdf()`.
pub struct PdfClient {
    client: Client,
}

impl PdfClient {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Sign a PDF with the organization's certificate.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use watana::{Client, PdfRequest};
    /// use serde_json::json;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = Client::new("https://empresa.watana.pe/api", "token-xxxxx")?;
    ///     let pdf = std::fs::read("contrato.pdf")?;
    ///
    ///     let options = json!({ "firma_visible": true, "pagina": 1 });
    ///     let request = PdfRequest::from_pdf("contrato", &pdf)?
    ///         .with_options(options.as_object().cloned().unwrap_or_default());
    ///
    ///     let response = client.pdf().sign(request).await?;
    ///     if let Some(signed) = response.decode_pdf()? {
    ///         std::fs::write("contrato-firmado.pdf", signed)?;
    ///     }
    ///     Ok(())
    /// }
    /// ```
    pub async fn sign(&self, request: PdfRequest) -> Result<PdfResponse> {
        self.dispatch(Operation::SignPdf, request, pending()).await
    }

    /// [`sign`](Self::sign) with a cancellation signal.
    pub async fn sign_with_cancel<C>(&self, request: PdfRequest, cancel: C) -> Result<PdfResponse>
    where
        C: Future<Output = ()>,
    {
        self.dispatch(Operation::SignPdf, request, cancel).await
    }

    /// Apply a time stamp to a PDF.
    pub async fn stamp(&self, request: PdfRequest) -> Result<PdfResponse> {
        self.dispatch(Operation::StampPdf, request, pending()).await
    }

    /// [`stamp`](Self::stamp) with a cancellation signal.
    pub async fn stamp_with_cancel<C>(&self, request: PdfRequest, cancel: C) -> Result<PdfResponse>
    where
        C: Future<Output = ()>,
    {
        self.dispatch(Operation::StampPdf, request, cancel).await
    }

    /// Validate the signatures contained in a PDF. The verdict is returned
    /// in the response's extra fields.
    pub async fn validate(&self, request: PdfRequest) -> Result<PdfResponse> {
        self.dispatch(Operation::ValidatePdf, request, pending()).await
    }

    /// [`validate`](Self::validate) with a cancellation signal.
    pub async fn validate_with_cancel<C>(
        &self,
        request: PdfRequest,
        cancel: C,
    ) -> Result<PdfResponse>
    where
        C: Future<Output = ()>,
    {
        self.dispatch(Operation::ValidatePdf, request, cancel).await
    }

    async fn dispatch<C>(
        &self,
        operation: Operation,
        request: PdfRequest,
        cancel: C,
    ) -> Result<PdfResponse>
    where
        C: Future<Output = ()>,
    {
        self.client
            .send_typed_with_cancel(operation, pdf_payload(operation, request), cancel)
            .await
    }
}

fn pdf_payload(operation: Operation, request: PdfRequest) -> Payload {
    let mut payload = Payload::for_operation(operation);
    payload.insert(keys::ZIP_BASE64, request.content);
    if let Some(extra) = request.extra {
        payload.merge(extra);
    }
    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pdf_payload_keeps_content_over_options() {
        let request = PdfRequest {
            content: "UEsDBA==".to_string(),
            extra: json!({ "zip_base64": "other", "razon": "Aprobado" })
                .as_object()
                .cloned(),
        };

        let payload = pdf_payload(Operation::StampPdf, request);
        assert_eq!(payload.operation(), Some("sellar_pdf"));
        assert_eq!(payload.get(keys::ZIP_BASE64).unwrap(), "UEsDBA==");
        assert_eq!(payload.get("razon").unwrap(), "Aprobado");
    }

    #[test]
    fn test_pdf_payload_empty_content_is_still_present() {
        let payload = pdf_payload(Operation::ValidatePdf, PdfRequest::default());
        assert!(payload.validate(Operation::ValidatePdf).is_ok());
    }
}
