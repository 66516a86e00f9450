//! # Watana Rust SDK
//!
//! Rust client for the Watana digital signature service.
//!
//! Watana keeps folders of documents, routes them to signers and signs,
//! stamps or validates PDFs with the organization's certificate. Every
//! operation is a JSON `POST` against a single endpoint, authenticated
//! with a static token.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use watana::{Client, FileEnvelope, SendFolderRequest, Signer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new("https://empresa.watana.pe/api", "token-xxxxx")?;
//!
//!     // Send a folder to sign
//!     let sent = client.folders().send(SendFolderRequest {
//!         folder_code: "C-0001".to_string(),
//!         title: "Contrato de servicios".to_string(),
//!         signer: Signer {
//!             full_name: "Ana Quispe".to_string(),
//!             email: "ana@example.com".to_string(),
//!             ..Default::default()
//!         },
//!         files: vec![FileEnvelope::from_path("contrato.pdf").await?],
//!         ..Default::default()
//!     }).await?;
//!     println!("{}", sent.message);
//!
//!     // Later, download the signed documents
//!     let download = client.folders().download("C-0001").await?;
//!     for file in &download.files {
//!         file.save_to(".", "zip").await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Files
//!
//! File content always travels as `base64(zip(bytes))`. [`FileEnvelope`]
//! and the [`codec`] module handle both directions.
//!
//! ## Error Handling
//!
//! All operations return `Result<T, WatanaError>`:
//!
//! ```rust,no_run
//! use watana::{Client, WatanaError};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = Client::new("https://empresa.watana.pe/api", "token-xxxxx").unwrap();
//!
//!     match client.folders().consult("C-0001").await {
//!         Ok(status) => println!("Folder: {:?}", status.status),
//!         Err(WatanaError::Transport { status, .. }) => println!("Rejected with {status}"),
//!         Err(WatanaError::Timeout) => println!("Timed out"),
//!         Err(e) => println!("Error: {}", e),
//!     }
//! }
//! ```

pub mod client;
pub mod codec;
pub mod error;
pub mod folders;
pub mod normalize;
pub mod payload;
pub mod pdf;
pub mod requests;
pub mod types;

// Re-export main types at the crate root
pub use client::{Client, ClientConfig};
pub use error::{Result, WatanaError};
pub use payload::{Operation, Payload};

pub use types::{
    DownloadResponse, Envelope, FileEnvelope, FolderStatus, PdfRequest, PdfResponse,
    PrepareRequest, PrepareRequestResponse, RequestStatus, SendFolderRequest,
    SendFolderResponse, SendSignatureRequest, Signer,
};
