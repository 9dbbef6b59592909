//! Error type shared by the fetch, notification, and configuration layers.
//!
//! The important split is between a failed fetch (the user needs to retry)
//! and everything downstream of a successful fetch. A model reply that cannot
//! be parsed is *not* an error: the sanitizer degrades it to an empty bulletin.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BulletinError {
    #[error("no API key configured (set GEMINI_API_KEY or API_KEY, or `api_key` in config.yaml)")]
    MissingApiKey,

    #[error("request to the model service failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("model service returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("invalid endpoint URL: {0}")]
    Endpoint(#[from] url::ParseError),

    #[error("notification dispatch failed: {0}")]
    Notify(String),

    #[error("state store I/O error: {0}")]
    Store(std::io::Error),

    #[error("state store is corrupt: {0}")]
    StoreFormat(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BulletinError {
    /// True for the "fetch failed" condition shown to the user with a retry hint.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            BulletinError::Fetch(_) | BulletinError::Api { .. } | BulletinError::Endpoint(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, BulletinError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_is_fetch_failure() {
        let e = BulletinError::Api {
            status: 503,
            body: "overloaded".to_string(),
        };
        assert!(e.is_fetch_failure());
        assert_eq!(e.to_string(), "model service returned 503: overloaded");
    }

    #[test]
    fn test_other_errors_are_not_fetch_failures() {
        assert!(!BulletinError::MissingApiKey.is_fetch_failure());
        assert!(!BulletinError::Notify("boom".into()).is_fetch_failure());
        assert!(!BulletinError::InvalidConfig("x".into()).is_fetch_failure());
    }
}
