pub mod episode;
pub mod error;
pub mod feed;
pub mod http;
pub mod policy;
pub mod progress;
pub mod session;

// Re-export main types for convenience
pub use episode::{derive_filename, download_episode, episode_filename};
pub use error::{DownloadError, FeedError, SessionError};
pub use feed::{Episode, Feed, RejectedItem, fetch_feed, parse_feed};
pub use http::{HttpClient, HttpResponse, ReqwestClient};
pub use policy::{Answer, Decision, DownloadMode, Prompter, StdinPrompter, decide};
pub use progress::{
    NoopReporter, ProgressEvent, ProgressReporter, SharedProgressReporter, format_progress,
    percent_complete,
};
pub use session::{SessionOptions, SessionSummary, run_session};
