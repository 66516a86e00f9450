//! Basic usage example for the Watana SDK.
//!
//! This example demonstrates:
//! - Creating a client from the environment
//! - Sending a folder to sign
//! - Checking its state
//! - Downloading the documents
//!
//! Run with:
//! ```bash
//! WATANA_URL=https://empresa.watana.pe/api WATANA_TOKEN=xxx \
//!     cargo run --example basic -- contrato.pdf ana@example.com
//! ```

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use watana::{Client, FileEnvelope, SendFolderRequest, Signer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "watana=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let document = args.next().ok_or("usage: basic <file.pdf> <signer-email>")?;
    let email = args.next().ok_or("usage: basic <file.pdf> <signer-email>")?;

    let client = Client::from_env()?;
    let folder_code = format!("DEMO-{}", std::process::id());

    println!("Sending folder {folder_code}...");
    let sent = client
        .folders()
        .send(SendFolderRequest {
            folder_code: folder_code.clone(),
            title: "Demo folder".to_string(),
            signer: Signer {
                full_name: "Demo Signer".to_string(),
                email,
                ..Default::default()
            },
            files: vec![FileEnvelope::from_path(&document).await?],
            ..Default::default()
        })
        .await?;
    println!("  {} (request {:?})", sent.message, sent.request_number);

    let status = client.folders().consult(&folder_code).await?;
    println!("State: {:?}", status.status);

    let download = client.folders().download(&folder_code).await?;
    for file in &download.files {
        let path = file.save_to(".", "zip").await?;
        println!("Saved {}", path.display());
    }

    Ok(())
}
