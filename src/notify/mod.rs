//! Notification dispatch and the once-a-day gate.
//!
//! # Submodules
//!
//! - [`console`]: rings the terminal bell and prints the alert
//! - [`webhook`]: posts the alert to a Discord-style webhook
//! - [`gate`]: decides whether today's alert should fire
//!
//! A notifier that is not supported in the current environment is not an
//! error: the gate simply skips dispatch.

pub mod console;
pub mod gate;
pub mod webhook;

use crate::config::{AppConfig, NotifierKind};
use crate::error::Result;
use console::ConsoleNotifier;
use tracing::info;
use webhook::WebhookNotifier;

/// Whether the user allowed alerts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Permission {
    /// Not asked yet.
    #[default]
    Default,
    Granted,
    Denied,
}

/// Title and body of an alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

impl Notification {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// A channel that can show an alert to the user.
pub trait Notifier {
    /// False when the environment has no way to show alerts at all.
    fn is_supported(&self) -> bool;

    /// Current permission without asking.
    fn permission(&self) -> Permission;

    /// Ask for permission if it has not been decided yet and return the result.
    async fn request_permission(&mut self) -> Permission;

    /// Show the alert. Only called once permission is granted.
    async fn send(&self, notification: &Notification) -> Result<()>;
}

/// The notifier selected in the configuration.
#[derive(Debug, Clone)]
pub enum ConfiguredNotifier {
    Console(ConsoleNotifier),
    Webhook(WebhookNotifier),
    Disabled,
}

impl ConfiguredNotifier {
    pub fn from_config(config: &AppConfig) -> Self {
        let notifier = match config.notifier {
            NotifierKind::Console => Self::Console(ConsoleNotifier::new()),
            NotifierKind::Webhook => Self::Webhook(WebhookNotifier::new(config.webhook_url.clone())),
            NotifierKind::None => Self::Disabled,
        };
        info!(kind = ?config.notifier, supported = notifier.is_supported(), "notifier selected");
        notifier
    }
}

impl Notifier for ConfiguredNotifier {
    fn is_supported(&self) -> bool {
        match self {
            Self::Console(n) => n.is_supported(),
            Self::Webhook(n) => n.is_supported(),
            Self::Disabled => false,
        }
    }

    fn permission(&self) -> Permission {
        match self {
            Self::Console(n) => n.permission(),
            Self::Webhook(n) => n.permission(),
            Self::Disabled => Permission::Denied,
        }
    }

    async fn request_permission(&mut self) -> Permission {
        match self {
            Self::Console(n) => n.request_permission().await,
            Self::Webhook(n) => n.request_permission().await,
            Self::Disabled => Permission::Denied,
        }
    }

    async fn send(&self, notification: &Notification) -> Result<()> {
        match self {
            Self::Console(n) => n.send(notification).await,
            Self::Webhook(n) => n.send(notification).await,
            Self::Disabled => Ok(()),
        }
    }
}
