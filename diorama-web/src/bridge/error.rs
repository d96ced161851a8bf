//! Errors surfaced to JavaScript callers

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),
    #[error("Unknown log level '{0}'")]
    InvalidLogLevel(String),
    #[error("Invalid camera: {0}")]
    InvalidCamera(&'static str),
    #[error("Unknown transfer mode '{0}'")]
    InvalidMode(String),
    #[error("Cannot change transfer mode while a transfer is in flight")]
    TransferInFlight,
    #[error("Transfer hooks object is missing '{0}'")]
    MissingHook(&'static str),
}

impl From<BridgeError> for JsValue {
    fn from(err: BridgeError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
