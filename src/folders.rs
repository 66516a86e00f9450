//! Folder operations.
//!
//! This module provides the FoldersClient for sending folders to sign,
//! checking their state, downloading the signed documents and deleting
//! them.

use crate::client::Client;
use crate::error::Result;
use crate::payload::{keys, Operation, Payload};
use crate::types::{
    DownloadResponse, Envelope, FolderStatus, SendFolderRequest, SendFolderResponse,
};
use std::future::{pending, Future};

/// Client for folder operations.
///
/// Access via `client.folders()`.
pub struct FoldersClient {
    client: Client,
}

impl FoldersClient {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Check the state of a folder.
    ///
    /// # Arguments
    ///
    /// * `folder_code` - The caller-assigned folder code
    pub async fn consult(&self, folder_code: &str) -> Result<FolderStatus> {
        self.consult_with_cancel(folder_code, pending()).await
    }

    /// [`consult`](Self::consult), aborted with
    /// [`WatanaError::Cancelled`](crate::WatanaError::Cancelled) when
    /// `cancel` completes first.
    pub async fn consult_with_cancel<C>(&self, folder_code: &str, cancel: C) -> Result<FolderStatus>
    where
        C: Future<Output = ()>,
    {
        self.client
            .send_typed_with_cancel(Operation::ConsultFolder, folder_payload(folder_code), cancel)
            .await
    }

    /// Create a folder with its documents and send it to its signer.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use watana::{Client, FileEnvelope, SendFolderRequest, Signer};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = Client::new("https://empresa.watana.pe/api", "token-xxxxx")?;
    ///
    ///     let response = client.folders().send(SendFolderRequest {
    ///         folder_code: "C-0001".to_string(),
    ///         title: "Contrato de servicios".to_string(),
    ///         signer: Signer {
    ///             full_name: "Ana Quispe".to_string(),
    ///             email: "ana@example.com".to_string(),
    ///             ..Default::default()
    ///         },
    ///         files: vec![FileEnvelope::from_path("contrato.pdf").await?],
    ///         ..Default::default()
    ///     }).await?;
    ///
    ///     println!("Request number: {:?}", response.request_number);
    ///     Ok(())
    /// }
    /// ```
    pub async fn send(&self, request: SendFolderRequest) -> Result<SendFolderResponse> {
        self.send_with_cancel(request, pending()).await
    }

    /// [`send`](Self::send) with a cancellation signal.
    pub async fn send_with_cancel<C>(
        &self,
        request: SendFolderRequest,
        cancel: C,
    ) -> Result<SendFolderResponse>
    where
        C: Future<Output = ()>,
    {
        let mut payload = Payload::for_operation(Operation::SendFolder);
        payload
            .insert(keys::FOLDER_CODE, request.folder_code)
            .insert(keys::TITLE, request.title)
            .insert_opt(keys::DESCRIPTION, request.description)
            .insert_opt(keys::TIMESTAMP, request.timestamp)
            .insert_opt(keys::EXPIRATION_HOURS, request.expiration_hours);
        payload.insert_serialized(keys::SIGNER, &request.signer)?;
        payload.insert_serialized(keys::FILES, &request.files)?;
        if let Some(extra) = request.extra {
            payload.merge(extra);
        }

        self.client
            .send_typed_with_cancel(Operation::SendFolder, payload, cancel)
            .await
    }

    /// Download the documents of a folder.
    ///
    /// Each returned file's content is `base64(zip(bytes))`; use
    /// [`FileEnvelope::decode`](crate::FileEnvelope::decode) to get the
    /// document back.
    pub async fn download(&self, folder_code: &str) -> Result<DownloadResponse> {
        self.download_with_cancel(folder_code, pending()).await
    }

    /// [`download`](Self::download) with a cancellation signal.
    pub async fn download_with_cancel<C>(
        &self,
        folder_code: &str,
        cancel: C,
    ) -> Result<DownloadResponse>
    where
        C: Future<Output = ()>,
    {
        self.client
            .send_typed_with_cancel(Operation::DownloadFolder, folder_payload(folder_code), cancel)
            .await
    }

    /// Delete a folder.
    ///
    /// **Warning:** This operation is irreversible.
    pub async fn delete(&self, folder_code: &str) -> Result<Envelope> {
        self.delete_with_cancel(folder_code, pending()).await
    }

    /// [`delete`](Self::delete) with a cancellation signal. A request that
    /// already reached the service may still complete there.
    pub async fn delete_with_cancel<C>(&self, folder_code: &str, cancel: C) -> Result<Envelope>
    where
        C: Future<Output = ()>,
    {
        self.client
            .send_typed_with_cancel(Operation::DeleteFolder, folder_payload(folder_code), cancel)
            .await
    }
}

fn folder_payload(folder_code: &str) -> Payload {
    let mut payload = Payload::new();
    payload.insert(keys::FOLDER_CODE, folder_code);
    payload
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folders_client_creation() {
        let client = Client::new("https://demo.watana.pe/api", "test_token").unwrap();
        let _folders = client.folders();
    }

    #[test]
    fn test_folder_payload() {
        let payload = folder_payload("C-0001");
        assert_eq!(payload.get(keys::FOLDER_CODE).unwrap(), "C-0001");
        assert_eq!(payload.operation(), None);
    }
}
