//! JSON export of a fetched bulletin.
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! └── 2025-05-06.json
//! ```
//!
//! A second fetch on the same day overwrites the file; bulletins are not
//! accumulated.

use crate::error::Result;
use crate::models::BulletinResult;
use chrono::NaiveDate;
use serde::Serialize;
use std::path::PathBuf;
use tokio::fs;
use tracing::{info, instrument};

#[derive(Debug, Serialize)]
struct BulletinFile<'a> {
    date: String,
    #[serde(flatten)]
    bulletin: &'a BulletinResult,
}

/// Write `bulletin` to `{json_output_dir}/{date}.json` and return the path.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir, %date))]
pub async fn write_bulletin(
    bulletin: &BulletinResult,
    date: NaiveDate,
    json_output_dir: &str,
) -> Result<PathBuf> {
    let file = BulletinFile {
        date: date.to_string(),
        bulletin,
    };
    let json = serde_json::to_string_pretty(&file)?;

    fs::create_dir_all(json_output_dir).await?;
    let path = PathBuf::from(json_output_dir).join(format!("{date}.json"));
    fs::write(&path, json).await?;
    info!(path = %path.display(), items = bulletin.items.len(), "Wrote JSON bulletin");
    Ok(path)
}
