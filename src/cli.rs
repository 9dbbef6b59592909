//! Command-line interface definitions.
//!
//! Options given here override the YAML configuration. The API key can also
//! come from the `GEMINI_API_KEY` environment variable.

use crate::config::AppConfig;
use crate::models::Language;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for the daily AI bulletin.
///
/// # Examples
///
/// ```sh
/// # Print today's bulletin in English and save a JSON copy
/// daily_ai_bulletin fetch --lang en -j ./json
///
/// # Stay open: refresh on demand and fire the daily alert at 11:00 Istanbul time
/// daily_ai_bulletin watch
///
/// # From cron: fire the alert if it is due
/// daily_ai_bulletin notify-check
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to config.yaml (default: ~/.config/daily_ai_bulletin/config.yaml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Gemini model name
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// File holding the last-notified date
    #[arg(long, global = true)]
    pub state_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch today's bulletin once and print it
    Fetch(FetchArgs),
    /// Fetch, then keep running: periodic alert check plus interactive commands
    Watch(WatchArgs),
    /// Run the daily alert check once
    NotifyCheck,
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Display language
    #[arg(short, long, value_enum)]
    pub lang: Option<Language>,

    /// Also write the bulletin as JSON into this directory
    #[arg(short, long)]
    pub json_output_dir: Option<String>,

    /// Also write the bulletin as Markdown into this directory
    #[arg(short, long)]
    pub markdown_output_dir: Option<String>,
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Display language
    #[arg(short, long, value_enum)]
    pub lang: Option<Language>,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(key) = &self.api_key {
            config.api_key = Some(key.clone());
        } else if config.api_key.is_none() {
            config.api_key = std::env::var("API_KEY").ok();
        }
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(path) = &self.state_path {
            config.state_path = path.clone();
        }
        let lang = match &self.command {
            Command::Fetch(args) => args.lang,
            Command::Watch(args) => args.lang,
            Command::NotifyCheck => None,
        };
        if let Some(lang) = lang {
            config.language = lang;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_fetch_parsing() {
        let cli = Cli::parse_from([
            "daily_ai_bulletin",
            "fetch",
            "--lang",
            "en",
            "--json-output-dir",
            "./json",
        ]);
        match cli.command {
            Command::Fetch(args) => {
                assert_eq!(args.lang, Some(Language::En));
                assert_eq!(args.json_output_dir.as_deref(), Some("./json"));
                assert_eq!(args.markdown_output_dir, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from(["daily_ai_bulletin", "fetch", "-j", "/tmp/json", "-m", "/tmp/md"]);
        let Command::Fetch(args) = cli.command else {
            panic!("expected fetch");
        };
        assert_eq!(args.json_output_dir.as_deref(), Some("/tmp/json"));
        assert_eq!(args.markdown_output_dir.as_deref(), Some("/tmp/md"));
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::parse_from([
            "daily_ai_bulletin",
            "notify-check",
            "--state-path",
            "/tmp/state.json",
            "--model",
            "gemini-2.0-flash",
        ]);
        assert!(matches!(cli.command, Command::NotifyCheck));

        let mut config = AppConfig::default();
        cli.apply(&mut config);
        assert_eq!(config.state_path, PathBuf::from("/tmp/state.json"));
        assert_eq!(config.model, "gemini-2.0-flash");
    }

    #[test]
    fn test_apply_language_override() {
        let cli = Cli::parse_from(["daily_ai_bulletin", "watch", "-l", "en"]);
        let mut config = AppConfig::default();
        cli.apply(&mut config);
        assert_eq!(config.language, Language::En);
    }
}
