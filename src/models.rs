//! Data models for bulletins, citations, and model replies.
//!
//! This module defines the core data structures used throughout the application:
//! - [`NewsItem`]: one bilingual news card as returned by the model
//! - [`Source`]: a validated, deduplicated grounding citation
//! - [`BulletinResult`]: the sanitized output of one fetch
//! - [`ModelReply`] / [`Citation`]: the raw result of the network call
//!
//! `NewsItem` uses camelCase field names on the wire to match the JSON shape
//! the prompt asks the model for.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single bilingual news card.
///
/// Produced by the sanitizer and never mutated afterwards; presentation only
/// reads it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    /// Headline in English.
    pub title_en: String,
    /// Markdown-ish summary in English.
    pub content_en: String,
    /// Headline in Turkish.
    pub title_tr: String,
    /// Markdown-ish summary in Turkish.
    pub content_tr: String,
}

impl NewsItem {
    /// Title and content for the requested language.
    pub fn localized(&self, language: Language) -> (&str, &str) {
        match language {
            Language::En => (&self.title_en, &self.content_en),
            Language::Tr => (&self.title_tr, &self.content_tr),
        }
    }
}

/// A grounding source shown under the bulletin. `url` is the uniqueness key.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Source {
    pub url: String,
    pub title: String,
}

/// How the item list of a [`BulletinResult`] was obtained.
///
/// Anything other than `Parsed` means the reply was degraded to an empty
/// list; the fetch itself still counts as a success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseStatus {
    Parsed,
    NoArray,
    Malformed,
}

impl fmt::Display for ParseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParseStatus::Parsed => "parsed",
            ParseStatus::NoArray => "no_array",
            ParseStatus::Malformed => "malformed",
        };
        f.write_str(s)
    }
}

/// One fetched bulletin: news items in model order plus deduplicated sources.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BulletinResult {
    pub items: Vec<NewsItem>,
    pub sources: Vec<Source>,
    pub status: ParseStatus,
}

impl BulletinResult {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A raw grounding citation as it comes off the wire. Either field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Citation {
    pub url: Option<String>,
    pub title: Option<String>,
}

#[cfg(test)]
impl Citation {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            title: Some(title.into()),
        }
    }
}

/// Free-form model output plus any grounding citations that came with it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelReply {
    pub text: String,
    pub citations: Vec<Citation>,
}

/// Display language for cards and UI strings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Tr,
    En,
}

impl Language {
    pub fn toggled(self) -> Self {
        match self {
            Language::Tr => Language::En,
            Language::En => Language::Tr,
        }
    }
}
