//! # Daily AI Bulletin
//!
//! Asks Gemini (with Google Search grounding) for today's AI news, shows it
//! as bilingual English/Turkish cards in the terminal, and fires a
//! once-a-day alert at a fixed hour of a fixed reference timezone.
//!
//! ## Usage
//!
//! ```sh
//! GEMINI_API_KEY=... daily_ai_bulletin fetch --lang en
//! GEMINI_API_KEY=... daily_ai_bulletin watch
//! daily_ai_bulletin notify-check
//! ```
//!
//! ## Architecture
//!
//! 1. **Fetching**: one `generateContent` call per bulletin ([`api`])
//! 2. **Sanitizing**: free-form reply → items + deduplicated sources ([`sanitize`])
//! 3. **Output**: terminal cards, optional JSON/Markdown files ([`outputs`])
//! 4. **Daily alert**: a polled gate backed by a one-key state file ([`notify::gate`])
//!
//! Everything runs on a single-threaded runtime. In `watch` mode a refresh
//! starts a new fetch; results from older fetches are dropped on arrival.

use chrono::{FixedOffset, Utc};
use clap::Parser;
use std::error::Error;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod error;
mod models;
mod notify;
mod outputs;
mod prompt;
mod sanitize;
mod store;
mod utils;

use api::{GeminiClient, fetch_bulletin};
use cli::{Cli, Command, FetchArgs};
use config::AppConfig;
use models::{BulletinResult, Language};
use notify::gate::{GateOutcome, NotificationGate};
use notify::{ConfiguredNotifier, Notification, Notifier, Permission};
use outputs::{json, markdown, terminal};
use store::FileStore;
use utils::{ensure_writable_dir, reference_date, reference_offset};

type FetchResult = (u64, error::Result<BulletinResult>);

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let args = Cli::parse();
    debug!(?args.command, "Parsed CLI arguments");

    let mut config = AppConfig::load(args.config.as_deref())?;
    args.apply(&mut config);
    config.validate()?;

    match &args.command {
        Command::Fetch(fetch_args) => run_fetch(&config, fetch_args).await,
        Command::Watch(_) => run_watch(config).await,
        Command::NotifyCheck => run_notify_check(&config).await,
    }
}

fn build_gate(config: &AppConfig, offset: FixedOffset) -> NotificationGate<FileStore> {
    NotificationGate::new(
        FileStore::new(&config.state_path),
        offset,
        config.target_hour,
        Notification::new(&config.notification_title, &config.notification_body),
    )
}

async fn run_fetch(config: &AppConfig, args: &FetchArgs) -> Result<(), Box<dyn Error>> {
    let start_time = std::time::Instant::now();
    let offset = reference_offset(config.utc_offset_minutes)?;
    let language = config.language;

    // Fail early on unwritable output dirs, before spending a model call.
    for dir in [&args.json_output_dir, &args.markdown_output_dir].into_iter().flatten() {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(path = %dir, error = %e, "Output directory is not writable");
            return Err(e.into());
        }
    }

    let client = GeminiClient::from_config(config)?;
    debug!(endpoint = %client.endpoint(), "model client ready");
    let date = reference_date(Utc::now(), offset);
    print!("{}", terminal::header(&config.brand, date, language));

    let bulletin = match fetch_bulletin(&client, &config.brand, date).await {
        Ok(b) => b,
        Err(e) => {
            eprintln!("{}", terminal::fetch_failed(language, "Run the command again to retry."));
            return Err(e.into());
        }
    };
    print!("{}", terminal::render_bulletin(&bulletin, language));

    if let Some(dir) = &args.json_output_dir {
        if let Err(e) = json::write_bulletin(&bulletin, date, dir).await {
            error!(error = %e, "Failed to write JSON bulletin");
        }
    }
    if let Some(dir) = &args.markdown_output_dir {
        if let Err(e) = markdown::write_bulletin(&bulletin, &config.brand, date, language, dir).await {
            error!(error = %e, "Failed to write Markdown bulletin");
        }
    }

    let elapsed = start_time.elapsed();
    info!(?elapsed, items = bulletin.items.len(), "Execution complete");
    Ok(())
}

async fn run_notify_check(config: &AppConfig) -> Result<(), Box<dyn Error>> {
    let offset = reference_offset(config.utc_offset_minutes)?;
    let mut notifier = ConfiguredNotifier::from_config(config);
    notifier.request_permission().await;
    let mut gate = build_gate(config, offset);

    let now = Utc::now();
    let outcome = gate.check(&notifier, now).await?;
    info!(state = ?gate.state(now)?, %outcome, "notify-check finished");
    println!("{outcome}");
    Ok(())
}

/// Tags fetches so that only the newest one is displayed.
#[derive(Debug, Default)]
struct FetchGeneration(u64);

impl FetchGeneration {
    fn advance(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }

    fn is_current(&self, tag: u64) -> bool {
        tag == self.0
    }
}

/// Start a fetch tagged with a fresh generation number.
fn spawn_fetch(
    client: &GeminiClient,
    brand: &str,
    offset: FixedOffset,
    tx: &UnboundedSender<FetchResult>,
    generation: &mut FetchGeneration,
) {
    let tag = generation.advance();
    let client = client.clone();
    let brand = brand.to_string();
    let tx = tx.clone();
    let date = reference_date(Utc::now(), offset);

    tokio::spawn(async move {
        let res = fetch_bulletin(&client, &brand, date).await;
        // Receiver only disappears when the loop has exited.
        let _ = tx.send((tag, res));
    });
}

async fn run_gate<N: Notifier>(gate: &mut NotificationGate<FileStore>, notifier: &N) {
    match gate.check(notifier, Utc::now()).await {
        Ok(GateOutcome::Dispatched) => info!("daily notification dispatched"),
        Ok(outcome) => debug!(%outcome, "daily notification not dispatched"),
        Err(e) => warn!(error = %e, "daily notification check failed"),
    }
}

fn loading_line(language: Language) -> &'static str {
    match language {
        Language::Tr => "Global kaynaklar taranıyor...",
        Language::En => "Scanning global tech sources...",
    }
}

fn help_line(language: Language) -> &'static str {
    match language {
        Language::Tr => "[r] yenile  [l] EN/TR  [n] bildirimleri aç  [q] çıkış",
        Language::En => "[r] refresh  [l] EN/TR  [n] enable alerts  [q] quit",
    }
}

fn permission_line(permission: Permission, language: Language, target_hour: u32) -> String {
    match (permission, language) {
        (Permission::Granted, Language::Tr) => {
            format!("Bildirimler aktif! Her gün {target_hour:02}:00'de haber verilecek.")
        }
        (Permission::Granted, Language::En) => {
            format!("Notifications enabled! You will be notified daily at {target_hour:02}:00.")
        }
        (_, Language::Tr) => "Bildirim izni verilmedi.".to_string(),
        (_, Language::En) => "Notification permission denied.".to_string(),
    }
}

async fn run_watch(config: AppConfig) -> Result<(), Box<dyn Error>> {
    let offset = reference_offset(config.utc_offset_minutes)?;
    let client = GeminiClient::from_config(&config)?;
    let mut language = config.language;
    let mut notifier = ConfiguredNotifier::from_config(&config);
    let mut gate = build_gate(&config, offset);

    let (tx, mut rx) = unbounded_channel::<FetchResult>();
    let mut generation = FetchGeneration::default();
    let mut current: Option<BulletinResult> = None;

    print!("{}", terminal::header(&config.brand, reference_date(Utc::now(), offset), language));
    println!("{}", loading_line(language));
    spawn_fetch(&client, &config.brand, offset, &tx, &mut generation);

    let permission = notifier.request_permission().await;
    info!(?permission, "notification permission");

    // The first tick completes immediately, so the gate also runs at startup.
    let mut ticker = interval(Duration::from_secs(config.check_interval_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    println!("{}", help_line(language));

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                run_gate(&mut gate, &notifier).await;
            }
            Some((tag, res)) = rx.recv() => {
                if !generation.is_current(tag) {
                    debug!(tag, latest = generation.0, "discarding stale bulletin");
                    continue;
                }
                match res {
                    Ok(bulletin) => {
                        print!("{}", terminal::render_bulletin(&bulletin, language));
                        current = Some(bulletin);
                    }
                    Err(e) => {
                        warn!(error = %e, fetch_failure = e.is_fetch_failure(), "bulletin fetch failed");
                        let hint = match language {
                            Language::Tr => "Tekrar denemek için [r].",
                            Language::En => "Press [r] to retry.",
                        };
                        println!("{}", terminal::fetch_failed(language, hint));
                    }
                }
            }
            line = lines.next_line(), if stdin_open => {
                match line {
                    Ok(Some(cmd)) => match cmd.trim() {
                        "r" => {
                            println!("{}", loading_line(language));
                            spawn_fetch(&client, &config.brand, offset, &tx, &mut generation);
                        }
                        "l" => {
                            language = language.toggled();
                            print!("{}", terminal::header(&config.brand, reference_date(Utc::now(), offset), language));
                            if let Some(bulletin) = &current {
                                print!("{}", terminal::render_bulletin(bulletin, language));
                            }
                        }
                        "n" => {
                            let permission = notifier.request_permission().await;
                            println!("{}", permission_line(permission, language, config.target_hour));
                            if permission == Permission::Granted {
                                run_gate(&mut gate, &notifier).await;
                            }
                        }
                        "q" => break,
                        "" => {}
                        _ => println!("{}", help_line(language)),
                    },
                    Ok(None) => {
                        // Detached from a terminal; keep the alert timer running.
                        debug!("stdin closed");
                        stdin_open = false;
                    }
                    Err(e) => {
                        warn!(error = %e, "failed reading stdin");
                        stdin_open = false;
                    }
                }
            }
        }
    }

    info!("watch loop finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_newest_fetch_is_current() {
        let mut generation = FetchGeneration::default();
        let first = generation.advance();
        assert!(generation.is_current(first));

        // A refresh supersedes the in-flight fetch.
        let second = generation.advance();
        assert!(!generation.is_current(first));
        assert!(generation.is_current(second));
    }

    #[test]
    fn test_permission_line_uses_target_hour() {
        let line = permission_line(Permission::Granted, Language::En, 9);
        assert_eq!(line, "Notifications enabled! You will be notified daily at 09:00.");
        assert_eq!(
            permission_line(Permission::Denied, Language::Tr, 11),
            "Bildirim izni verilmedi."
        );
    }
}
