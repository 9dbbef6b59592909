//! Once-a-day notification gate.
//!
//! The gate is polled (every minute in `watch` mode) and fires at most once per
//! calendar day of the reference timezone, the first time it runs at or after
//! the target hour. The persisted marker is the only state:
//!
//! - marker == today → `Sent`
//! - anything else → `Pending`
//!
//! The day rolls over on its own because "today" changes. The marker is written
//! only after a dispatch succeeded.

use super::{Notification, Notifier, Permission};
use crate::error::Result;
use crate::store::{LAST_NOTIFICATION_KEY, StateStore};
use crate::utils::reference_time;
use chrono::{DateTime, FixedOffset, Timelike, Utc};
use std::fmt;
use tracing::{debug, error, info, instrument};

/// Whether today's alert already went out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Pending,
    Sent,
}

/// What a single [`NotificationGate::check`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    Dispatched,
    AlreadySent,
    TooEarly,
    PermissionDenied,
    Unsupported,
}

impl fmt::Display for GateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GateOutcome::Dispatched => "dispatched",
            GateOutcome::AlreadySent => "already sent today",
            GateOutcome::TooEarly => "before target hour",
            GateOutcome::PermissionDenied => "permission not granted",
            GateOutcome::Unsupported => "notifications unsupported",
        };
        f.write_str(s)
    }
}

pub struct NotificationGate<S> {
    store: S,
    offset: FixedOffset,
    target_hour: u32,
    notification: Notification,
}

impl<S: StateStore> NotificationGate<S> {
    pub fn new(store: S, offset: FixedOffset, target_hour: u32, notification: Notification) -> Self {
        Self {
            store,
            offset,
            target_hour,
            notification,
        }
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    fn last_sent(&self) -> Result<Option<String>> {
        self.store.get(LAST_NOTIFICATION_KEY)
    }

    pub fn state(&self, now: DateTime<Utc>) -> Result<GateState> {
        let today = reference_time(now, self.offset).date_naive().to_string();
        Ok(match self.last_sent()? {
            Some(last) if last == today => GateState::Sent,
            _ => GateState::Pending,
        })
    }

    /// Run one check at `now`, dispatching through `notifier` if today's alert is due.
    #[instrument(level = "debug", skip_all, fields(%now))]
    pub async fn check<N: Notifier>(&mut self, notifier: &N, now: DateTime<Utc>) -> Result<GateOutcome> {
        if !notifier.is_supported() {
            return Ok(GateOutcome::Unsupported);
        }
        if notifier.permission() != Permission::Granted {
            return Ok(GateOutcome::PermissionDenied);
        }

        let local = reference_time(now, self.offset);
        let today = local.date_naive().to_string();
        if self.last_sent()?.as_deref() == Some(today.as_str()) {
            return Ok(GateOutcome::AlreadySent);
        }
        if local.hour() < self.target_hour {
            debug!(hour = local.hour(), target = self.target_hour, "too early for daily alert");
            return Ok(GateOutcome::TooEarly);
        }

        notifier.send(&self.notification).await?;
        if let Err(e) = self.store.set(LAST_NOTIFICATION_KEY, &today) {
            error!(error = %e, date = %today, "alert sent but marker could not be saved");
            return Err(e);
        }
        info!(date = %today, "daily alert dispatched");
        Ok(GateOutcome::Dispatched)
    }
}
