// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::episode::{download_episode, episode_filename};
use crate::error::SessionError;
use crate::feed::fetch_feed;
use crate::http::HttpClient;
use crate::policy::{Decision, DownloadMode, Prompter, decide};
use crate::progress::{ProgressEvent, SharedProgressReporter};

/// Options for a download session
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Directory that downloaded episodes are written to
    pub output_dir: PathBuf,
    /// Whether to ask before each download
    pub mode: DownloadMode,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            mode: DownloadMode::Interactive,
        }
    }
}

/// Result of a download session
#[derive(Debug, Clone, Default)]
pub struct SessionSummary {
    /// Number of episodes successfully downloaded
    pub downloaded: usize,
    /// Number of episodes whose file was already present
    pub already_present: usize,
    /// Number of episodes the user declined
    pub skipped: usize,
    /// Number of episodes that failed to download
    pub failed: usize,
    /// Number of feed items that could not be parsed
    pub rejected: usize,
    /// Whether the user stopped before the end of the feed
    pub quit: bool,
    /// Details of failed episodes (filename, error message)
    pub failed_episodes: Vec<(String, String)>,
}

/// Fetch a feed and walk its episodes one at a time
///
/// Only fetching or parsing the feed (or losing standard input) ends the
/// session with an error. Problems with single items or downloads are
/// reported and the loop moves on to the next episode.
pub async fn run_session<C: HttpClient>(
    client: &C,
    feed_url: &str,
    options: &SessionOptions,
    prompter: &dyn Prompter,
    reporter: SharedProgressReporter,
) -> Result<SessionSummary, SessionError> {
    reporter.report(ProgressEvent::FetchingFeed {
        url: feed_url.to_string(),
    });

    let feed = fetch_feed(client, feed_url).await?;

    reporter.report(ProgressEvent::FeedParsed {
        feed_title: feed.title.clone(),
        total_episodes: feed.episodes.len(),
    });

    let mut summary = SessionSummary {
        rejected: feed.rejected.len(),
        ..Default::default()
    };

    for item in &feed.rejected {
        reporter.report(ProgressEvent::ItemRejected {
            title: item.title.clone(),
            error: item.error.to_string(),
        });
    }

    for episode in &feed.episodes {
        let filename = episode_filename(episode);
        let path = options.output_dir.join(&filename);

        let decision = decide(&path, &filename, options.mode, prompter)
            .await
            .map_err(SessionError::Prompt)?;
        debug!(%filename, ?decision, "Decided on episode");

        match decision {
            Decision::AlreadyExists => {
                summary.already_present += 1;
                reporter.report(ProgressEvent::AlreadyExists { filename });
            }
            Decision::SkippedByUser => {
                summary.skipped += 1;
                reporter.report(ProgressEvent::SkippedByUser {
                    title: episode.title.clone(),
                });
            }
            Decision::Quit => {
                info!("Stopping at user request");
                summary.quit = true;
                break;
            }
            Decision::Download => {
                if options.mode == DownloadMode::All {
                    reporter.report(ProgressEvent::DownloadQueued {
                        filename: filename.clone(),
                    });
                }
                fetch_episode(
                    client,
                    &episode.enclosure_url,
                    &path,
                    filename,
                    &reporter,
                    &mut summary,
                )
                .await;
            }
        }
    }

    reporter.report(ProgressEvent::SessionCompleted {
        downloaded_count: summary.downloaded,
        existing_count: summary.already_present,
        skipped_count: summary.skipped,
        failed_count: summary.failed,
        quit: summary.quit,
    });

    Ok(summary)
}

async fn fetch_episode<C: HttpClient>(
    client: &C,
    url: &str,
    path: &Path,
    filename: String,
    reporter: &SharedProgressReporter,
    summary: &mut SessionSummary,
) {
    match download_episode(client, url, path, reporter).await {
        Ok(bytes) => {
            info!(%filename, bytes, "Downloaded episode");
            summary.downloaded += 1;
        }
        Err(e) => {
            info!(%filename, error = %e, "Download failed");
            summary.failed += 1;
            summary
                .failed_episodes
                .push((filename.clone(), e.to_string()));
            reporter.report(ProgressEvent::DownloadFailed {
                filename,
                error: e.to_string(),
            });
        }
    }
}
