//! Utility functions for reference-timezone time, string truncation, and file system checks.
//!
//! This module provides helper functions used throughout the application:
//! - Conversion of a UTC instant into the fixed reference timezone
//! - String truncation for logging model replies
//! - File system validation for output directories
//! - Default locations for the config and state files

use crate::error::{BulletinError, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use std::fs as stdfs;
use std::path::PathBuf;
use tokio::fs;
use tracing::{info, instrument};

/// Build the reference timezone from an offset in minutes east of UTC.
pub fn reference_offset(utc_offset_minutes: i32) -> Result<FixedOffset> {
    FixedOffset::east_opt(utc_offset_minutes * 60).ok_or_else(|| {
        BulletinError::InvalidConfig(format!(
            "utc_offset_minutes {utc_offset_minutes} is out of range"
        ))
    })
}

/// The wall-clock reading of `now` in the reference timezone.
pub fn reference_time(now: DateTime<Utc>, offset: FixedOffset) -> DateTime<FixedOffset> {
    now.with_timezone(&offset)
}

/// Today's calendar date in the reference timezone.
pub fn reference_date(now: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    reference_time(now, offset).date_naive()
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes (backing off to a character
/// boundary) with an ellipsis and byte count appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// `$HOME/.config/daily_ai_bulletin`, or `./.daily_ai_bulletin` without a home dir.
pub fn app_dir() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".config").join("daily_ai_bulletin"),
        None => PathBuf::from(".daily_ai_bulletin"),
    }
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then creates and removes a probe file.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<()> {
    fs::create_dir_all(path).await?;
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    stdfs::File::create(&probe_path)?;
    let _ = stdfs::remove_file(&probe_path);
    info!("Output directory is writable");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn test_truncate_for_log_short_string() {
        assert_eq!(truncate_for_log("Hello, world!", 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_respects_char_boundary() {
        // 'ı' is two bytes; cutting at 1 would split it.
        let result = truncate_for_log("ıı", 1);
        assert_eq!(result, "…(+4 bytes)");
    }

    #[test]
    fn test_reference_time_istanbul() {
        let offset = reference_offset(180).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();
        assert_eq!(reference_time(now, offset).hour(), 11);
    }

    #[test]
    fn test_reference_date_rolls_over_before_utc() {
        let offset = reference_offset(180).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 22, 30, 0).unwrap();
        assert_eq!(
            reference_date(now, offset),
            NaiveDate::from_ymd_opt(2025, 3, 2).unwrap()
        );
    }

    #[test]
    fn test_reference_offset_out_of_range() {
        assert!(reference_offset(24 * 60).is_err());
        assert!(reference_offset(-18 * 60 + 1).is_ok());
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("out/json");
        ensure_writable_dir(nested.to_str().unwrap()).await.unwrap();
        assert!(nested.is_dir());
    }
}
