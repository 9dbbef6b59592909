//! Terminal alerts: a bell plus a framed title and body on stdout.

use super::{Notification, Notifier, Permission};
use crate::error::Result;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct ConsoleNotifier {
    permission: Permission,
}

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Text printed for an alert, without the bell.
pub fn format_alert(notification: &Notification) -> String {
    format!("🔔 {}\n   {}", notification.title, notification.body)
}

impl Notifier for ConsoleNotifier {
    fn is_supported(&self) -> bool {
        true
    }

    fn permission(&self) -> Permission {
        self.permission
    }

    // There is no prompt to show in a terminal: asking is granting.
    async fn request_permission(&mut self) -> Permission {
        if self.permission == Permission::Default {
            self.permission = Permission::Granted;
        }
        self.permission
    }

    async fn send(&self, notification: &Notification) -> Result<()> {
        println!("\x07\n{}\n", format_alert(notification));
        info!(title = %notification.title, "console notification shown");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_request_grants_once_asked() {
        let mut n = ConsoleNotifier::new();
        assert_eq!(n.permission(), Permission::Default);
        assert_eq!(n.request_permission().await, Permission::Granted);
        assert_eq!(n.permission(), Permission::Granted);
    }

    #[test]
    fn test_format_alert() {
        let text = format_alert(&Notification::new("Ready", "Tap to read"));
        assert_eq!(text, "🔔 Ready\n   Tap to read");
    }
}
