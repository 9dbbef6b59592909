//! YAML configuration with built-in defaults.
//!
//! Resolution order: an explicit `--config` path (must exist), then
//! `~/.config/daily_ai_bulletin/config.yaml` if present, then defaults.
//! Command-line flags are applied on top by `main`.

use crate::error::{BulletinError, Result};
use crate::models::Language;
use crate::utils::app_dir;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Which channel delivers the daily alert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifierKind {
    #[default]
    Console,
    Webhook,
    None,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Gemini model name.
    pub model: String,
    /// Scheme and host of the generative-language API.
    pub api_base: String,
    /// API key; usually supplied through `GEMINI_API_KEY` instead.
    pub api_key: Option<String>,
    pub request_timeout_secs: u64,
    /// Editor name used in the system instruction and header.
    pub brand: String,
    pub language: Language,
    /// Reference timezone for the daily alert, minutes east of UTC.
    pub utc_offset_minutes: i32,
    /// First hour (0-23, reference timezone) at which the alert may fire.
    pub target_hour: u32,
    pub check_interval_secs: u64,
    pub state_path: PathBuf,
    pub notifier: NotifierKind,
    pub webhook_url: Option<String>,
    pub notification_title: String,
    pub notification_body: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            api_base: "https://generativelanguage.googleapis.com".to_string(),
            api_key: None,
            request_timeout_secs: 90,
            brand: "bahaAİ".to_string(),
            language: Language::Tr,
            utc_offset_minutes: 180,
            target_hour: 11,
            check_interval_secs: 60,
            state_path: app_dir().join("state.json"),
            notifier: NotifierKind::Console,
            webhook_url: None,
            notification_title: "bahaAİ Günlük Bülten Hazır! 🤖".to_string(),
            notification_body: "Yapay zeka dünyasındaki son gelişmeleri okumak için dokunun."
                .to_string(),
        }
    }
}

impl AppConfig {
    /// Parse and validate a YAML document. Missing keys take their defaults.
    pub fn from_yaml(raw: &str) -> Result<Self> {
        let config: AppConfig = if raw.trim().is_empty() {
            AppConfig::default()
        } else {
            serde_yaml::from_str(raw)?
        };
        config.validate()?;
        Ok(config)
    }

    #[instrument(level = "info")]
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (app_dir().join("config.yaml"), false),
        };

        if !required && !path.exists() {
            debug!(path = %path.display(), "no config file; using defaults");
            return Ok(AppConfig::default());
        }

        let raw = std::fs::read_to_string(&path)?;
        let config = Self::from_yaml(&raw)?;
        info!(path = %path.display(), model = %config.model, "Loaded configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.target_hour > 23 {
            return Err(BulletinError::InvalidConfig(format!(
                "target_hour must be 0-23, got {}",
                self.target_hour
            )));
        }
        if self.utc_offset_minutes.abs() > 18 * 60 {
            return Err(BulletinError::InvalidConfig(format!(
                "utc_offset_minutes must be within ±1080, got {}",
                self.utc_offset_minutes
            )));
        }
        if self.check_interval_secs == 0 {
            return Err(BulletinError::InvalidConfig(
                "check_interval_secs must be positive".to_string(),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(BulletinError::InvalidConfig("model must not be empty".to_string()));
        }
        Ok(())
    }
}
