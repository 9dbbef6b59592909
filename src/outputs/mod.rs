//! Output of a fetched bulletin.
//!
//! # Submodules
//!
//! - [`terminal`]: bilingual cards and status lines printed to stdout
//! - [`json`]: `{dir}/{date}.json` export
//! - [`markdown`]: `{dir}/{date}.md` export in the display language

pub mod json;
pub mod markdown;
pub mod terminal;
