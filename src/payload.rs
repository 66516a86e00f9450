//! Operation payloads.
//!
//! A [`Payload`] is the ordered key/value body of one request. It is tagged
//! with the operation name under [`keys::OPERATION`], populated by the
//! facades, checked against the operation's mandatory fields and handed to
//! [`Client::send`](crate::Client::send) exactly once.

use crate::error::{Result, WatanaError};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use tracing::debug;

/// Wire names of the payload keys understood by the service.
pub mod keys {
    pub const OPERATION: &str = "operacion";
    pub const FOLDER_CODE: &str = "carpeta_codigo";
    pub const TITLE: &str = "titulo";
    pub const DESCRIPTION: &str = "descripcion";
    pub const SIGNER: &str = "firmante";
    pub const SIGNERS: &str = "firmantes";
    pub const FILES: &str = "archivos";
    pub const NAME: &str = "nombre";
    pub const SIGNATURE_CODE: &str = "firma_codigo";
    pub const ZIP_BASE64: &str = "zip_base64";
    pub const TIMESTAMP: &str = "sello_de_tiempo";
    pub const EXPIRATION_HOURS: &str = "expiracion_en_horas";
}

/// The operations exposed by the Watana API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ConsultFolder,
    SendFolder,
    DownloadFolder,
    DeleteFolder,
    PrepareRequest,
    SendRequest,
    ConsultRequest,
    SignPdf,
    StampPdf,
    ValidatePdf,
}

impl Operation {
    /// Every operation, in catalogue order.
    pub const ALL: [Operation; 10] = [
        Operation::ConsultFolder,
        Operation::SendFolder,
        Operation::DownloadFolder,
        Operation::DeleteFolder,
        Operation::PrepareRequest,
        Operation::SendRequest,
        Operation::ConsultRequest,
        Operation::SignPdf,
        Operation::StampPdf,
        Operation::ValidatePdf,
    ];

    /// The identifier sent under [`keys::OPERATION`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::ConsultFolder => "consultar_carpeta",
            Operation::SendFolder => "enviar_carpeta",
            Operation::DownloadFolder => "descargar_carpeta",
            Operation::DeleteFolder => "eliminar_carpeta",
            Operation::PrepareRequest => "preparar_solicitud",
            Operation::SendRequest => "enviar_solicitud",
            Operation::ConsultRequest => "consultar_solicitud",
            Operation::SignPdf => "firmar_pdf",
            Operation::StampPdf => "sellar_pdf",
            Operation::ValidatePdf => "validar_pdf",
        }
    }

    /// Mandatory payload keys, in the order they are checked.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            Operation::SendFolder => &[
                keys::FOLDER_CODE,
                keys::TITLE,
                keys::SIGNER,
                keys::FILES,
            ],
            Operation::PrepareRequest => &[keys::FOLDER_CODE, keys::NAME, keys::FILES],
            Operation::SendRequest => &[keys::FOLDER_CODE, keys::SIGNATURE_CODE, keys::SIGNERS],
            Operation::SignPdf | Operation::StampPdf | Operation::ValidatePdf => {
                &[keys::ZIP_BASE64]
            }
            Operation::ConsultFolder
            | Operation::DownloadFolder
            | Operation::DeleteFolder
            | Operation::ConsultRequest => &[],
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered key/value request body.
///
/// Keys keep their insertion order on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Payload(Map<String, Value>);

impl Payload {
    /// Create an empty payload. The operation key is filled in by
    /// [`Client::send`](crate::Client::send).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a payload already tagged with `operation`.
    pub fn for_operation(operation: Operation) -> Self {
        let mut payload = Self::new();
        payload.set_operation(operation.as_str());
        payload
    }

    /// Tag the payload with an operation name. The first tag wins; later
    /// calls leave an existing tag untouched.
    pub fn set_operation(&mut self, operation: &str) {
        if !self.0.contains_key(keys::OPERATION) {
            self.0
                .insert(keys::OPERATION.to_string(), Value::from(operation));
        }
    }

    /// The operation this payload is tagged with, if any.
    pub fn operation(&self) -> Option<&str> {
        self.0.get(keys::OPERATION).and_then(Value::as_str)
    }

    /// Insert or replace `key`.
    ///
    /// The operation key follows [`set_operation`](Self::set_operation): it
    /// is only set when absent, and non-string values for it are dropped.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let key = key.into();
        if key == keys::OPERATION {
            let value = value.into();
            match value.as_str() {
                Some(operation) => self.set_operation(operation),
                None => debug!(value = %value, "ignoring non-string operation tag"),
            }
        } else {
            self.0.insert(key, value.into());
        }
        self
    }

    /// Serialize `value` and insert it under `key`.
    pub fn insert_serialized<T: Serialize>(&mut self, key: &str, value: &T) -> Result<&mut Self> {
        let value = serde_json::to_value(value)
            .map_err(|e| WatanaError::Unexpected(format!("failed to serialize `{key}`: {e}")))?;
        Ok(self.insert(key, value))
    }

    /// Insert `value` only when present.
    pub fn insert_opt(&mut self, key: &str, value: Option<impl Into<Value>>) -> &mut Self {
        if let Some(value) = value {
            self.insert(key, value);
        }
        self
    }

    /// Look up a value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of entries, the operation tag included.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the payload has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Merge free-form options after the mandatory fields are set.
    ///
    /// Keys already present are reserved: colliding entries from `extra`
    /// are dropped, never overwriting the existing value.
    pub fn merge(&mut self, extra: Map<String, Value>) -> &mut Self {
        for (key, value) in extra {
            if self.0.contains_key(&key) {
                debug!(key = %key, "ignoring extra option that collides with a reserved key");
                continue;
            }
            self.0.insert(key, value);
        }
        self
    }

    /// Check every mandatory field of `operation`, stopping at the first
    /// one that is missing.
    pub fn validate(&self, operation: Operation) -> Result<()> {
        operation
            .required_fields()
            .iter()
            .try_for_each(|field| require_field(self, field))
    }
}

impl From<Map<String, Value>> for Payload {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Fail with [`WatanaError::Validation`] if `name` is absent or null.
pub fn require_field(payload: &Payload, name: &str) -> Result<()> {
    match payload.get(name) {
        None | Some(Value::Null) => Err(WatanaError::Validation {
            field: name.to_string(),
        }),
        Some(_) => Ok(()),
    }
}
