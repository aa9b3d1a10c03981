// src/errors.rs
use thiserror::Error;

/// Bybit retCode returned when the requested leverage is already set.
/// Informational, not a failure.
pub const LEVERAGE_NOT_MODIFIED: i64 = 110_043;

#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("exchange rejected request (retCode {code}): {msg}")]
    Api { code: i64, msg: String },

    #[error("request signing failed: {0}")]
    Sign(String),

    #[error("unexpected response shape: {0}")]
    Parse(String),
}

impl ExchangeError {
    /// The one benign rejection the engine demotes to informational.
    pub fn is_leverage_not_modified(&self) -> bool {
        matches!(self, ExchangeError::Api { code, .. } if *code == LEVERAGE_NOT_MODIFIED)
    }
}
