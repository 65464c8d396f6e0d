// ================================================================
// File: wearview-common/src/error.rs
// ================================================================

use thiserror::Error;

use crate::models::category::BodyShape;

#[derive(Debug, Error)]
pub enum Error {
    /// A remote entity (wearable, NFT, profile) the caller asked for does
    /// not exist upstream.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A wearable has no representation for the requested body shape.
    #[error("Wearable {urn} has no representation for body shape {body_shape}")]
    MissingRepresentation { urn: String, body_shape: BodyShape },

    /// The caller-supplied inputs cannot produce a config (e.g. a contract
    /// address with neither token id nor item id, or a required category
    /// with no default URN).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Network / non-2xx failure that survived the retry budget. Carries
    /// the last underlying error text.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A controller request named a namespace/method/params combination the
    /// closed command set does not contain, or no controller is live yet.
    #[error("{0}")]
    ControllerDispatch(String),

    /// An emote operation was invoked on a controller constructed for a
    /// preview that holds no emote.
    #[error("Invalid emote controller")]
    InvalidEmoteController,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Parse(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Parse(s.to_string())
    }
}
