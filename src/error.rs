// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when fetching or parsing RSS feeds
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Failed to fetch feed from {url}: {source}")]
    FetchFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to parse RSS feed: {0}")]
    ParseFailed(#[from] rss::Error),

    #[error("Failed to parse publication date '{date_str}': {source}")]
    InvalidDate {
        date_str: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Episode '{title}' has no publication date")]
    MissingDate { title: String },

    #[error("Episode '{title}' has no enclosure (audio file)")]
    MissingEnclosure { title: String },
}

impl FeedError {
    /// Whether this error only concerns a single feed item
    pub fn is_per_item(&self) -> bool {
        matches!(
            self,
            FeedError::InvalidDate { .. }
                | FeedError::MissingDate { .. }
                | FeedError::MissingEnclosure { .. }
        )
    }
}

/// Errors that can occur during episode downloads
#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("Failed to create file {path}: {source}")]
    FileCreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP request failed for {url}: {source}")]
    HttpFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Stream error while downloading {url}: {source}")]
    StreamFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to write to file {path}: {source}")]
    FileWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Top-level errors that end a session
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("Failed to read answer from standard input: {0}")]
    Prompt(#[source] std::io::Error),
}
