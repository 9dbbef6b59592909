//! Markdown export of a fetched bulletin in one language.

use crate::error::Result;
use crate::models::{BulletinResult, Language};
use crate::outputs::terminal::{clean_title, long_date};
use chrono::NaiveDate;
use std::fmt::Write;
use std::path::PathBuf;
use tokio::fs;
use tracing::{info, instrument};

/// Render the bulletin as a Markdown document. Item content is already Markdown.
pub fn bulletin_to_markdown(
    bulletin: &BulletinResult,
    brand: &str,
    date: NaiveDate,
    language: Language,
) -> String {
    let mut md = String::new();
    writeln!(md, "# {brand} · {}\n", long_date(date, language)).unwrap();

    for item in &bulletin.items {
        let (title, content) = item.localized(language);
        writeln!(md, "## {}\n", clean_title(title)).unwrap();
        writeln!(md, "{}\n", content.trim()).unwrap();
    }

    if !bulletin.sources.is_empty() {
        let heading = match language {
            Language::Tr => "Kaynaklar",
            Language::En => "Sources",
        };
        writeln!(md, "## {heading}\n").unwrap();
        for source in &bulletin.sources {
            writeln!(md, "- [{}]({})", source.title, source.url).unwrap();
        }
    }
    md
}

/// Write the Markdown bulletin to `{markdown_output_dir}/{date}.md`.
#[instrument(level = "info", skip_all, fields(%markdown_output_dir, %date))]
pub async fn write_bulletin(
    bulletin: &BulletinResult,
    brand: &str,
    date: NaiveDate,
    language: Language,
    markdown_output_dir: &str,
) -> Result<PathBuf> {
    let md = bulletin_to_markdown(bulletin, brand, date, language);
    fs::create_dir_all(markdown_output_dir).await?;
    let path = PathBuf::from(markdown_output_dir).join(format!("{date}.md"));
    fs::write(&path, md).await?;
    info!(path = %path.display(), "Wrote Markdown bulletin");
    Ok(path)
}
