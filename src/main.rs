use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use console::Emoji;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tracing::debug;
use url::Url;

use podpick::{
    DownloadMode, ProgressEvent, ProgressReporter, ReqwestClient, SessionOptions, StdinPrompter,
    format_progress, run_session,
};

// Emoji with fallback for terminals without Unicode support
static SEARCH: Emoji<'_, '_> = Emoji("🔍 ", "[~] ");
static HEADPHONES: Emoji<'_, '_> = Emoji("🎧 ", "[i] ");
static DOWNLOAD: Emoji<'_, '_> = Emoji("📥 ", "[v] ");
static SUCCESS: Emoji<'_, '_> = Emoji("✅ ", "[+] ");
static FAILURE: Emoji<'_, '_> = Emoji("❌ ", "[!] ");
static SKIP: Emoji<'_, '_> = Emoji("⏭️  ", "[-] ");
static PARTY: Emoji<'_, '_> = Emoji("🎉 ", "[*] ");
static CROSS: Emoji<'_, '_> = Emoji("✗ ", "x ");

/// Pick and download podcast episodes from an RSS feed
#[derive(Parser, Debug)]
#[command(name = "podpick")]
#[command(about = "Pick and download podcast episodes from an RSS feed")]
#[command(version)]
struct Args {
    /// RSS feed URL
    rss_feed_url: Url,

    /// Download all episodes without prompting
    #[arg(long)]
    all: bool,

    /// Directory to save episodes in
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - suppress the progress line
    #[arg(short, long)]
    quiet: bool,
}

/// Renders session events on the terminal, with a single progress line per download
struct TerminalReporter {
    show_progress: bool,
    bar: Mutex<Option<ProgressBar>>,
}

impl TerminalReporter {
    fn new(show_progress: bool) -> Self {
        Self {
            show_progress,
            bar: Mutex::new(None),
        }
    }

    fn start_bar(&self, content_length: Option<u64>) {
        if !self.show_progress {
            return;
        }

        *self.bar.lock().unwrap() = Some(progress_line(content_length));
    }

    fn take_bar(&self) -> Option<ProgressBar> {
        self.bar.lock().unwrap().take()
    }
}

impl ProgressReporter for TerminalReporter {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::FetchingFeed { url } => {
                println!("{SEARCH}Fetching feed: {}", url.cyan());
            }

            ProgressEvent::FeedParsed {
                feed_title,
                total_episodes,
            } => {
                println!(
                    "{HEADPHONES}{} • {} episodes",
                    feed_title.bold().green(),
                    total_episodes.to_string().cyan()
                );
            }

            ProgressEvent::ItemRejected { title, error } => {
                println!("{FAILURE}Skipping '{}': {}", title.yellow(), error.red());
            }

            ProgressEvent::AlreadyExists { filename } => {
                println!(
                    "{SKIP}File '{}' already exists. Skipping download.",
                    filename.dimmed()
                );
            }

            ProgressEvent::SkippedByUser { title } => {
                println!("{SKIP}Skipped '{}'", title.dimmed());
            }

            ProgressEvent::DownloadQueued { filename } => {
                println!("{DOWNLOAD}Downloading '{}'", filename.cyan());
            }

            ProgressEvent::DownloadStarting { content_length, .. } => {
                self.start_bar(content_length);
            }

            ProgressEvent::DownloadProgress {
                bytes_downloaded,
                total_bytes,
                ..
            } => {
                if let Some(bar) = self.bar.lock().unwrap().as_ref() {
                    bar.set_position(bytes_downloaded);
                    bar.set_message(format_progress(bytes_downloaded, total_bytes));
                }
            }

            ProgressEvent::DownloadCompleted { filename, .. } => {
                if let Some(bar) = self.take_bar() {
                    bar.finish();
                }
                println!("{SUCCESS}Downloaded '{}'", filename.green());
            }

            ProgressEvent::DownloadFailed { filename, error } => {
                if let Some(bar) = self.take_bar() {
                    bar.abandon();
                }
                println!(
                    "{FAILURE}Error downloading '{}': {}",
                    filename.yellow(),
                    error.red()
                );
            }

            ProgressEvent::SessionCompleted {
                downloaded_count,
                existing_count,
                skipped_count,
                failed_count,
                quit,
            } => {
                let headline = if quit { "Stopped:" } else { "Done:" };
                println!(
                    "\n{PARTY}{} {} downloaded, {} already present, {} skipped, {} failed",
                    headline.bold().green(),
                    downloaded_count.to_string().green().bold(),
                    existing_count.to_string().cyan(),
                    skipped_count.to_string().yellow(),
                    if failed_count > 0 {
                        failed_count.to_string().red().bold()
                    } else {
                        failed_count.to_string().green()
                    }
                );
            }
        }
    }
}

/// Progress line drawn on stdout, next to every other user-facing message
fn progress_line(content_length: Option<u64>) -> ProgressBar {
    let style = ProgressStyle::with_template(&format!("{DOWNLOAD}Downloading... {{msg}}"))
        .expect("progress template is valid");

    let bar = ProgressBar::with_draw_target(content_length, ProgressDrawTarget::stdout());
    bar.set_style(style);
    bar.set_message(format_progress(0, content_length));
    bar
}

fn init_tracing(verbose: u8) {
    // RUST_LOG wins over -v
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);
    debug!(?args, "CLI arguments parsed");

    let client = ReqwestClient::new();
    let prompter = StdinPrompter::new();

    let options = SessionOptions {
        output_dir: args.output_dir.clone(),
        mode: if args.all {
            DownloadMode::All
        } else {
            DownloadMode::Interactive
        },
    };

    let reporter = Arc::new(TerminalReporter::new(!args.quiet));

    let summary = run_session(
        &client,
        args.rss_feed_url.as_str(),
        &options,
        &prompter,
        reporter,
    )
    .await
    .context("Failed to download episodes")?;

    if !summary.failed_episodes.is_empty() {
        println!("\n{}", "Failed episodes:".red().bold());
        for (filename, error) in &summary.failed_episodes {
            println!("  {}{} - {}", CROSS, filename.yellow(), error.dimmed());
        }
    }

    // Per-episode failures never change the exit status
    Ok(())
}
