//! Card layout for the terminal.
//!
//! Content strings carry a little Markdown from the model: `- ` / `* ` bullet
//! lines and `**bold**` spans. Bullets become `•`, bold becomes an ANSI bold
//! span, and everything else is printed as-is.

use crate::models::{BulletinResult, Language};
use chrono::{Datelike, NaiveDate, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Write;

static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("bold regex is valid"));
static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#+\s").expect("heading regex is valid"));

const BOLD_ON: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

const MONTHS_EN: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];
const MONTHS_TR: [&str; 12] = [
    "Ocak", "Şubat", "Mart", "Nisan", "Mayıs", "Haziran", "Temmuz", "Ağustos", "Eylül", "Ekim",
    "Kasım", "Aralık",
];

fn weekday_name(day: Weekday, language: Language) -> &'static str {
    match (language, day) {
        (Language::En, Weekday::Mon) => "Monday",
        (Language::En, Weekday::Tue) => "Tuesday",
        (Language::En, Weekday::Wed) => "Wednesday",
        (Language::En, Weekday::Thu) => "Thursday",
        (Language::En, Weekday::Fri) => "Friday",
        (Language::En, Weekday::Sat) => "Saturday",
        (Language::En, Weekday::Sun) => "Sunday",
        (Language::Tr, Weekday::Mon) => "Pazartesi",
        (Language::Tr, Weekday::Tue) => "Salı",
        (Language::Tr, Weekday::Wed) => "Çarşamba",
        (Language::Tr, Weekday::Thu) => "Perşembe",
        (Language::Tr, Weekday::Fri) => "Cuma",
        (Language::Tr, Weekday::Sat) => "Cumartesi",
        (Language::Tr, Weekday::Sun) => "Pazar",
    }
}

/// Long date in the display language: `Tuesday, May 6, 2025` / `6 Mayıs 2025 Salı`.
pub fn long_date(date: NaiveDate, language: Language) -> String {
    let month = date.month0() as usize;
    let weekday = weekday_name(date.weekday(), language);
    match language {
        Language::En => format!("{weekday}, {} {}, {}", MONTHS_EN[month], date.day(), date.year()),
        Language::Tr => format!("{} {} {} {weekday}", date.day(), MONTHS_TR[month], date.year()),
    }
}

/// Drop leading Markdown heading markers from a title.
pub fn clean_title(title: &str) -> String {
    HEADING.replace(title.trim(), "").to_string()
}

fn render_inline(line: &str) -> String {
    BOLD.replace_all(line, format!("{BOLD_ON}$1{RESET}").as_str()).to_string()
}

/// Render a content string line by line.
pub fn render_content(content: &str) -> String {
    let mut out = String::new();
    for line in content.lines() {
        let trimmed = line.trim_start();
        if let Some(rest) = trimmed.strip_prefix("- ").or_else(|| trimmed.strip_prefix("* ")) {
            let _ = writeln!(out, "    • {}", render_inline(rest));
        } else if trimmed.is_empty() {
            out.push('\n');
        } else {
            let _ = writeln!(out, "  {}", render_inline(trimmed));
        }
    }
    out
}

pub fn header(brand: &str, date: NaiveDate, language: Language) -> String {
    let heading = match language {
        Language::Tr => "Son Gelişmeler",
        Language::En => "Latest Intelligence",
    };
    format!(
        "{BOLD_ON}{brand}{RESET} · The Intelligence Briefing · {}\n\n{BOLD_ON}{heading}{RESET}\n",
        long_date(date, language)
    )
}

/// The full bulletin: cards in order, then the source list.
pub fn render_bulletin(bulletin: &BulletinResult, language: Language) -> String {
    let mut out = String::new();

    if bulletin.is_empty() {
        let msg = match language {
            Language::Tr => "Haber bulunamadı. Daha sonra tekrar deneyin.",
            Language::En => "No news found. Try refreshing later.",
        };
        let _ = writeln!(out, "\n  {msg}\n");
    }

    for (i, item) in bulletin.items.iter().enumerate() {
        let (title, content) = item.localized(language);
        let _ = writeln!(out, "\n{BOLD_ON}{:>2}. {}{RESET}", i + 1, clean_title(title));
        out.push_str(&render_content(content));
    }

    if !bulletin.sources.is_empty() {
        let heading = match language {
            Language::Tr => "Kaynaklar",
            Language::En => "Sources",
        };
        let _ = writeln!(out, "\n{BOLD_ON}{heading}{RESET}");
        for source in &bulletin.sources {
            let _ = writeln!(out, "  - {} <{}>", source.title, source.url);
        }
    }
    out
}

/// Message shown when the fetch failed.
pub fn fetch_failed(language: Language, retry_hint: &str) -> String {
    match language {
        Language::Tr => format!("Bağlantı Hatası: bülten alınamadı. {retry_hint}"),
        Language::En => format!("Connection Interrupted: could not load the bulletin. {retry_hint}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewsItem, ParseStatus, Source};

    fn bulletin() -> BulletinResult {
        BulletinResult {
            items: vec![NewsItem {
                title_en: "## Big release".into(),
                content_en: "Intro with **bold** text\n\n- first\n* second".into(),
                title_tr: "Büyük sürüm".into(),
                content_tr: "Giriş".into(),
            }],
            sources: vec![Source {
                url: "https://a.example".into(),
                title: "A".into(),
            }],
            status: ParseStatus::Parsed,
        }
    }

    #[test]
    fn test_long_date_both_languages() {
        let date = NaiveDate::from_ymd_opt(2025, 5, 6).unwrap();
        assert_eq!(long_date(date, Language::En), "Tuesday, May 6, 2025");
        assert_eq!(long_date(date, Language::Tr), "6 Mayıs 2025 Salı");
    }

    #[test]
    fn test_clean_title() {
        assert_eq!(clean_title("### Headline"), "Headline");
        assert_eq!(clean_title("#hashtag stays"), "#hashtag stays");
    }

    #[test]
    fn test_render_content_bullets_and_bold() {
        let out = render_content("Intro with **bold** text\n\n- first\n* second");
        assert_eq!(
            out,
            format!("  Intro with {BOLD_ON}bold{RESET} text\n\n    • first\n    • second\n")
        );
    }

    #[test]
    fn test_render_bulletin_english() {
        let out = render_bulletin(&bulletin(), Language::En);
        assert!(out.contains(" 1. Big release"));
        assert!(out.contains("Sources"));
        assert!(out.contains("  - A <https://a.example>"));
    }

    #[test]
    fn test_render_bulletin_turkish_uses_turkish_fields() {
        let out = render_bulletin(&bulletin(), Language::Tr);
        assert!(out.contains("Büyük sürüm"));
        assert!(out.contains("Kaynaklar"));
        assert!(!out.contains("Big release"));
    }

    #[test]
    fn test_render_empty_bulletin() {
        let empty = BulletinResult {
            items: vec![],
            sources: vec![],
            status: ParseStatus::Malformed,
        };
        assert!(render_bulletin(&empty, Language::En).contains("No news found"));
    }
}
