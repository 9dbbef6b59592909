//! Turn a loosely structured model reply into a typed bulletin.
//!
//! The model is asked for a bare JSON array but routinely wraps it in code
//! fences or surrounds it with prose. Parsing goes in two steps:
//!
//! 1. Strip fence markers and try to parse the whole text as an array.
//! 2. Otherwise take the slice from the first `[` to the last `]` and parse that.
//!
//! Step 2 is a heuristic. A stray `]` in trailing prose (or a `[` in leading
//! prose) moves the boundary and the slice fails to parse. In that case the
//! bulletin degrades to an empty item list. The fetch is never failed because of
//! the reply's shape.
//!
//! Elements are checked one at a time: an element missing a field is skipped
//! and the rest of the array is kept.

use crate::models::{BulletinResult, Citation, NewsItem, ParseStatus, Source};
use crate::utils::truncate_for_log;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

/// Opening fences may carry a language tag (```json); closing fences never do.
static FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```[A-Za-z0-9_-]*").expect("fence regex is valid"));

/// Remove every fenced-code marker and trim the result.
pub fn strip_fences(text: &str) -> String {
    FENCE.replace_all(text, "").trim().to_string()
}

/// Extract the news items from `text`.
///
/// Returns the items together with how they were obtained. Failure is only
/// ever reported through [`ParseStatus`].
pub fn parse_items(text: &str) -> (Vec<NewsItem>, ParseStatus) {
    let cleaned = strip_fences(text);

    if let Ok(values) = serde_json::from_str::<Vec<Value>>(&cleaned) {
        return (conforming_items(values), ParseStatus::Parsed);
    }

    let (Some(start), Some(end)) = (cleaned.find('['), cleaned.rfind(']')) else {
        debug!("no JSON array brackets in model reply");
        return (Vec::new(), ParseStatus::NoArray);
    };
    if end < start {
        debug!(start, end, "closing bracket precedes opening bracket");
        return (Vec::new(), ParseStatus::NoArray);
    }

    match serde_json::from_str::<Vec<Value>>(&cleaned[start..=end]) {
        Ok(values) => (conforming_items(values), ParseStatus::Parsed),
        Err(e) => {
            warn!(
                error = %e,
                response_preview = %truncate_for_log(&cleaned, 300),
                "model returned invalid JSON; falling back to empty bulletin"
            );
            (Vec::new(), ParseStatus::Malformed)
        }
    }
}

/// Keep the array elements that have the `NewsItem` shape, in order.
fn conforming_items(values: Vec<Value>) -> Vec<NewsItem> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match NewsItem::deserialize(&value) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(
                    index,
                    error = %e,
                    element = %truncate_for_log(&value.to_string(), 200),
                    "skipping non-conforming news item"
                );
                None
            }
        })
        .collect()
}

/// Keep citations with a non-empty url and title, deduplicated by url.
///
/// The first title seen for a url wins and first-seen order is preserved.
pub fn dedupe_sources(citations: &[Citation]) -> Vec<Source> {
    citations
        .iter()
        .filter_map(|c| match (c.url.as_deref(), c.title.as_deref()) {
            (Some(url), Some(title)) if !url.is_empty() && !title.is_empty() => Some(Source {
                url: url.to_string(),
                title: title.to_string(),
            }),
            _ => None,
        })
        .unique_by(|s| s.url.clone())
        .collect()
}

/// Build a [`BulletinResult`] from a raw reply and its grounding citations.
#[instrument(level = "debug", skip_all, fields(bytes = text.len(), citations = citations.len()))]
pub fn sanitize(text: &str, citations: &[Citation]) -> BulletinResult {
    let (items, status) = parse_items(text);
    let sources = dedupe_sources(citations);
    debug!(items = items.len(), sources = sources.len(), %status, "sanitized model reply");
    BulletinResult {
        items,
        sources,
        status,
    }
}
