//! Sign a PDF and validate the result.
//!
//! Run with:
//! ```bash
//! WATANA_URL=https://empresa.watana.pe/api WATANA_TOKEN=xxx \
//!     cargo run --example sign_pdf -- contrato.pdf
//! ```

use serde_json::json;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use watana::{Client, PdfRequest};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "watana=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let input = std::env::args().nth(1).ok_or("usage: sign_pdf <file.pdf>")?;
    let input = Path::new(&input);
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("documento")
        .to_string();

    let client = Client::from_env()?;
    let pdf = tokio::fs::read(input).await?;

    let options = json!({ "firma_visible": true, "pagina": 1 });
    let request = PdfRequest::from_pdf(&stem, &pdf)?
        .with_options(options.as_object().cloned().unwrap_or_default());

    let signed = client.pdf().sign(request).await?;
    println!("{}", signed.message);

    let Some(signed_pdf) = signed.decode_pdf()? else {
        println!("The service returned no document");
        return Ok(());
    };

    let output = input.with_file_name(format!("{stem}-firmado.pdf"));
    tokio::fs::write(&output, &signed_pdf).await?;
    println!("Saved {}", output.display());

    let verdict = client
        .pdf()
        .validate(PdfRequest::from_pdf(&stem, &signed_pdf)?)
        .await?;
    println!("Validation: {} {:?}", verdict.message, verdict.extra);

    Ok(())
}
