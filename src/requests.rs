//! Signature request operations.
//!
//! A signature request binds documents of a folder to one or more signers.
//! It is prepared first, which yields a signature code, then sent.

use crate::client::Client;
use crate::error::Result;
use crate::payload::{keys, Operation, Payload};
use crate::types::{PrepareRequest, PrepareRequestResponse, RequestStatus, SendSignatureRequest};
use std::future::{pending, Future};

/// Client for signature request operations.
///
/// Access via `client.requests()`.
pub struct RequestsClient {
    client: Client,
}

impl RequestsClient {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Prepare a signature request inside a folder.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use watana::{Client, FileEnvelope, PrepareRequest, SendSignatureRequest, Signer};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = Client::new("https://empresa.watana.pe/api", "token-xxxxx")?;
    ///
    ///     let prepared = client.requests().prepare(PrepareRequest {
    ///         folder_code: "C-0001".to_string(),
    ///         name: "Adenda".to_string(),
    ///         files: vec![FileEnvelope::from_path("adenda.pdf").await?],
    ///         extra: None,
    ///     }).await?;
    ///
    ///     let sent = client.requests().send(SendSignatureRequest {
    ///         folder_code: "C-0001".to_string(),
    ///         signature_code: prepared.signature_code.unwrap_or_default(),
    ///         signers: vec![Signer {
    ///             full_name: "Ana Quispe".to_string(),
    ///             email: "ana@example.com".to_string(),
    ///             ..Default::default()
    ///         }],
    ///         extra: None,
    ///     }).await?;
    ///     println!("{}", sent.message);
    ///     Ok(())
    /// }
    /// ```
    pub async fn prepare(&self, request: PrepareRequest) -> Result<PrepareRequestResponse> {
        self.prepare_with_cancel(request, pending()).await
    }

    /// [`prepare`](Self::prepare) with a cancellation signal.
    pub async fn prepare_with_cancel<C>(
        &self,
        request: PrepareRequest,
        cancel: C,
    ) -> Result<PrepareRequestResponse>
    where
        C: Future<Output = ()>,
    {
        let mut payload = Payload::for_operation(Operation::PrepareRequest);
        payload
            .insert(keys::FOLDER_CODE, request.folder_code)
            .insert(keys::NAME, request.name);
        payload.insert_serialized(keys::FILES, &request.files)?;
        if let Some(extra) = request.extra {
            payload.merge(extra);
        }

        self.client
            .send_typed_with_cancel(Operation::PrepareRequest, payload, cancel)
            .await
    }

    /// Send a prepared signature request to its signers.
    pub async fn send(&self, request: SendSignatureRequest) -> Result<RequestStatus> {
        self.send_with_cancel(request, pending()).await
    }

    /// [`send`](Self::send) with a cancellation signal.
    pub async fn send_with_cancel<C>(
        &self,
        request: SendSignatureRequest,
        cancel: C,
    ) -> Result<RequestStatus>
    where
        C: Future<Output = ()>,
    {
        let mut payload = Payload::for_operation(Operation::SendRequest);
        payload
            .insert(keys::FOLDER_CODE, request.folder_code)
            .insert(keys::SIGNATURE_CODE, request.signature_code);
        payload.insert_serialized(keys::SIGNERS, &request.signers)?;
        if let Some(extra) = request.extra {
            payload.merge(extra);
        }

        self.client
            .send_typed_with_cancel(Operation::SendRequest, payload, cancel)
            .await
    }

    /// Check the state of a signature request.
    ///
    /// # Arguments
    ///
    /// * `folder_code` - The folder the request belongs to
    /// * `signature_code` - Code of a specific request, if the folder has several
    pub async fn consult(
        &self,
        folder_code: &str,
        signature_code: Option<&str>,
    ) -> Result<RequestStatus> {
        self.consult_with_cancel(folder_code, signature_code, pending())
            .await
    }

    /// [`consult`](Self::consult) with a cancellation signal.
    pub async fn consult_with_cancel<C>(
        &self,
        folder_code: &str,
        signature_code: Option<&str>,
        cancel: C,
    ) -> Result<RequestStatus>
    where
        C: Future<Output = ()>,
    {
        let mut payload = Payload::for_operation(Operation::ConsultRequest);
        payload
            .insert(keys::FOLDER_CODE, folder_code)
            .insert_opt(keys::SIGNATURE_CODE, signature_code);

        self.client
            .send_typed_with_cancel(Operation::ConsultRequest, payload, cancel)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requests_client_creation() {
        let client = Client::new("https://demo.watana.pe/api", "test_token").unwrap();
        let _requests = client.requests();
    }
}
