use std::sync::Arc;

use indicatif::HumanBytes;

/// Events emitted while picking and downloading episodes
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Feed is being fetched from URL
    FetchingFeed { url: String },

    /// Feed has been parsed successfully
    FeedParsed {
        feed_title: String,
        total_episodes: usize,
    },

    /// A feed item was skipped while parsing
    ItemRejected { title: String, error: String },

    /// The episode's file is already on disk
    AlreadyExists { filename: String },

    /// The user declined an episode
    SkippedByUser { title: String },

    /// A download is about to start without asking first
    DownloadQueued { filename: String },

    /// A download is starting
    DownloadStarting {
        filename: String,
        /// Expected content length in bytes, if known
        content_length: Option<u64>,
    },

    /// Download progress update
    DownloadProgress {
        filename: String,
        bytes_downloaded: u64,
        total_bytes: Option<u64>,
    },

    /// A download completed successfully
    DownloadCompleted {
        filename: String,
        bytes_downloaded: u64,
    },

    /// A download failed
    DownloadFailed { filename: String, error: String },

    /// Session finished, either through the end of the feed or by quitting
    SessionCompleted {
        downloaded_count: usize,
        existing_count: usize,
        skipped_count: usize,
        failed_count: usize,
        quit: bool,
    },
}

/// Trait for reporting progress events.
///
/// Implementations can use this to display progress bars, log messages,
/// or collect statistics.
pub trait ProgressReporter: Send + Sync {
    /// Report a progress event
    fn report(&self, event: ProgressEvent);
}

/// A shared reference to a progress reporter
pub type SharedProgressReporter = Arc<dyn ProgressReporter>;

/// A no-op progress reporter that silently ignores all events.
/// Useful for tests or quiet mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn report(&self, _event: ProgressEvent) {}
}

impl NoopReporter {
    /// Create a new NoopReporter wrapped in an Arc
    pub fn shared() -> SharedProgressReporter {
        Arc::new(Self)
    }
}

/// Percentage of the download that is done, if the total size is known
pub fn percent_complete(bytes_downloaded: u64, total_bytes: Option<u64>) -> Option<f64> {
    match total_bytes {
        Some(total) if total > 0 => Some(bytes_downloaded as f64 / total as f64 * 100.0),
        _ => None,
    }
}

/// Human readable progress text for a single progress line
pub fn format_progress(bytes_downloaded: u64, total_bytes: Option<u64>) -> String {
    match percent_complete(bytes_downloaded, total_bytes) {
        Some(percent) => format!("{percent:.1}% complete"),
        None => format!("{} downloaded (size unknown)", HumanBytes(bytes_downloaded)),
    }
}

/// Reporter that keeps every event, for assertions in tests
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingReporter {
    events: std::sync::Mutex<Vec<ProgressEvent>>,
}

#[cfg(test)]
impl RecordingReporter {
    pub(crate) fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl ProgressReporter for RecordingReporter {
    fn report(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(event);
    }
}
