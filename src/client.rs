//! Watana API client.
//!
//! The main entry point for interacting with the Watana signature service.
//! Every operation is a single JSON `POST` against one endpoint; the client
//! normalizes the answer to JSON text whether the service replied with
//! JSON or with a zip stream.

use crate::error::{Result, WatanaError};
use crate::folders::FoldersClient;
use crate::normalize::{self, ContentKind};
use crate::payload::{Operation, Payload};
use crate::pdf::PdfClient;
use crate::requests::RequestsClient;
use reqwest::{header, Client as HttpClient, Response};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Environment variable holding the service URL.
pub const ENV_URL: &str = "WATANA_URL";
/// Environment variable holding the API token.
pub const ENV_TOKEN: &str = "WATANA_TOKEN";
/// Environment variable holding the request timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "WATANA_TIMEOUT_SECS";

/// Watana API client.
///
/// Cheap to clone; clones share the underlying connection pool.
///
/// # Example
///
/// ```rust,no_run
/// use watana::Client;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = Client::new("https://empresa.watana.pe/api", "token-xxxxx")?;
///
///     let status = client.folders().consult("C-0001").await?;
///     println!("{}: {:?}", status.message, status.status);
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Client {
    pub(crate) http: HttpClient,
    pub(crate) base_url: String,
    pub(crate) token: String,
    pub(crate) timeout: Duration,
}

/// Configuration options for the client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Service endpoint. Requests are posted to this URL as-is.
    pub base_url: String,
    /// API token, sent verbatim in the `Authorization` header.
    pub token: String,
    /// Request timeout (default: 5 minutes).
    pub timeout: Option<Duration>,
    /// User-Agent header value.
    pub user_agent: Option<String>,
}

impl ClientConfig {
    /// Configuration with default timeout and user agent.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            timeout: None,
            user_agent: None,
        }
    }

    /// Read the configuration from `WATANA_URL`, `WATANA_TOKEN` and the
    /// optional `WATANA_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| WatanaError::Config(format!("{key} is not set")))
        };

        let timeout = match lookup(ENV_TIMEOUT_SECS) {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    WatanaError::Config(format!("{ENV_TIMEOUT_SECS} is not a number: {raw}"))
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            base_url: required(ENV_URL)?,
            token: required(ENV_TOKEN)?,
            timeout,
            user_agent: None,
        })
    }
}

impl Client {
    /// Create a new Watana client with default configuration.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Your Watana API endpoint
    /// * `token` - Your Watana API token
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        Self::with_config(ClientConfig::new(base_url, token))
    }

    /// Create a new Watana client with custom configuration.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use watana::{Client, ClientConfig};
    /// use std::time::Duration;
    ///
    /// let client = Client::with_config(ClientConfig {
    ///     timeout: Some(Duration::from_secs(60)),
    ///     user_agent: Some("my-app/1.0".to_string()),
    ///     ..ClientConfig::new("https://empresa.watana.pe/api", "token-xxxxx")
    /// })
    /// .unwrap();
    /// ```
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        if config.base_url.trim().is_empty() {
            return Err(WatanaError::Config("base URL is empty".to_string()));
        }
        if config.token.trim().is_empty() {
            return Err(WatanaError::Config("token is empty".to_string()));
        }

        let timeout = config.timeout.unwrap_or(DEFAULT_TIMEOUT);
        let user_agent = config
            .user_agent
            .unwrap_or_else(|| format!("watana-rust/{}", env!("CARGO_PKG_VERSION")));

        let http = HttpClient::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| WatanaError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url,
            token: config.token,
            timeout,
        })
    }

    /// Build a client from the environment. See [`ClientConfig::from_env`].
    pub fn from_env() -> Result<Self> {
        Self::with_config(ClientConfig::from_env()?)
    }

    /// Get the base URL for the API.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the timeout bounding every call.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Get the folders client.
    pub fn folders(&self) -> FoldersClient {
        FoldersClient::new(self.clone())
    }

    /// Get the signature requests client.
    pub fn requests(&self) -> RequestsClient {
        RequestsClient::new(self.clone())
    }

    /// Get the PDF client.
    pub fn pdf(&self) -> PdfClient {
        PdfClient::new(self.clone())
    }

    /// Send one operation and return the response as JSON text.
    ///
    /// The payload is tagged with `operation` unless it already carries a
    /// tag, then checked for the operation's mandatory fields. A missing
    /// field fails with [`WatanaError::Validation`] before any network I/O.
    ///
    /// Zip responses are wrapped into a download envelope, so the result is
    /// JSON in every case.
    pub async fn send(&self, operation: Operation, mut payload: Payload) -> Result<String> {
        payload.set_operation(operation.as_str());
        payload.validate(operation)?;

        debug!(operation = %operation, fields = payload.len(), "sending request");

        let response = self
            .http
            .post(&self.base_url)
            .header(header::ACCEPT, "application/json")
            .header(header::AUTHORIZATION, self.token.as_str())
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                operation = %operation,
                status = status.as_u16(),
                body_len = body.len(),
                "request rejected"
            );
            return Err(WatanaError::Transport {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
                body,
            });
        }

        let content_type = header_value(&response, header::CONTENT_TYPE);
        let kind = normalize::classify(content_type.as_deref())?;
        debug!(
            operation = %operation,
            status = status.as_u16(),
            content_type = content_type.as_deref().unwrap_or_default(),
            "response received"
        );

        match kind {
            ContentKind::Json => Ok(response.text().await?),
            ContentKind::Zip => {
                let disposition = header_value(&response, header::CONTENT_DISPOSITION);
                let body = response.bytes().await?;
                normalize::synthesize_download(&body, disposition.as_deref())
            }
        }
    }

    /// [`send`](Self::send), then deserialize the JSON into `T`.
    pub async fn send_typed<T: DeserializeOwned>(
        &self,
        operation: Operation,
        payload: Payload,
    ) -> Result<T> {
        let body = self.send(operation, payload).await?;
        decode_response(&body)
    }

    /// [`send`](Self::send), aborted with [`WatanaError::Cancelled`] as soon
    /// as `cancel` completes.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use watana::{Client, Operation, Payload};
    /// use std::time::Duration;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = Client::new("https://empresa.watana.pe/api", "token-xxxxx")?;
    ///     let mut payload = Payload::new();
    ///     payload.insert("carpeta_codigo", "C-0001");
    ///
    ///     let json = client
    ///         .send_with_cancel(
    ///             Operation::ConsultFolder,
    ///             payload,
    ///             tokio::time::sleep(Duration::from_secs(10)),
    ///         )
    ///         .await?;
    ///     println!("{json}");
    ///     Ok(())
    /// }
    /// ```
    pub async fn send_with_cancel<C>(
        &self,
        operation: Operation,
        payload: Payload,
        cancel: C,
    ) -> Result<String>
    where
        C: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            _ = cancel => {
                debug!(operation = %operation, "request cancelled");
                Err(WatanaError::Cancelled)
            }
            result = self.send(operation, payload) => result,
        }
    }

    /// [`send_typed`](Self::send_typed) with a cancellation signal.
    pub async fn send_typed_with_cancel<T, C>(
        &self,
        operation: Operation,
        payload: Payload,
        cancel: C,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        C: Future<Output = ()>,
    {
        let body = self.send_with_cancel(operation, payload, cancel).await?;
        decode_response(&body)
    }
}

fn header_value(response: &Response, name: header::HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn decode_response<T: DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|source| WatanaError::ResponseDecoding {
        target: std::any::type_name::<T>(),
        source,
    })
}
