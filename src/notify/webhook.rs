//! Alerts delivered to a Discord-style webhook (`{"content": "..."}`).
//!
//! A single attempt is made per dispatch. If it fails the gate does not record
//! the day, so the next periodic check tries again.

use super::{Notification, Notifier, Permission};
use crate::error::{BulletinError, Result};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    url: Option<String>,
    client: Client,
    timeout: Duration,
    permission: Permission,
}

#[derive(Debug, Serialize)]
struct WebhookPayload {
    content: String,
}

impl WebhookNotifier {
    pub fn new(url: Option<String>) -> Self {
        Self {
            url: url.filter(|u| !u.trim().is_empty()),
            client: Client::new(),
            timeout: Duration::from_secs(5),
            permission: Permission::Default,
        }
    }
}

impl Notifier for WebhookNotifier {
    fn is_supported(&self) -> bool {
        self.url.is_some()
    }

    fn permission(&self) -> Permission {
        self.permission
    }

    // Configuring a webhook URL is the user's consent.
    async fn request_permission(&mut self) -> Permission {
        self.permission = if self.is_supported() {
            Permission::Granted
        } else {
            Permission::Denied
        };
        self.permission
    }

    #[instrument(level = "info", skip_all)]
    async fn send(&self, notification: &Notification) -> Result<()> {
        let Some(url) = self.url.as_deref() else {
            return Ok(());
        };
        let payload = WebhookPayload {
            content: format!("**{}**\n{}", notification.title, notification.body),
        };

        let rsp = self
            .client
            .post(url)
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|e| BulletinError::Notify(e.to_string()))?;

        if let Err(e) = rsp.error_for_status_ref() {
            warn!(error = %e, "webhook rejected notification");
            return Err(BulletinError::Notify(format!("webhook HTTP error: {e}")));
        }
        info!("webhook notification delivered");
        Ok(())
    }
}
