// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use bytes::Bytes;
use tracing::debug;

use crate::error::FeedError;
use crate::http::HttpClient;

use super::parse::{Feed, parse_feed};

/// Fetch raw feed bytes from a URL (without parsing)
pub async fn fetch_feed_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Bytes, FeedError> {
    let bytes = client
        .get_bytes(url)
        .await
        .map_err(|e| FeedError::FetchFailed {
            url: url.to_string(),
            source: e,
        })?;
    debug!(%url, bytes = bytes.len(), "Fetched feed");
    Ok(bytes)
}

/// Fetch and parse a podcast feed from a URL
pub async fn fetch_feed<C: HttpClient>(client: &C, url: &str) -> Result<Feed, FeedError> {
    let bytes = fetch_feed_bytes(client, url).await?;
    parse_feed(&bytes)
}
