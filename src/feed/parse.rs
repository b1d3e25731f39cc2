// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use chrono::{DateTime, FixedOffset};
use tracing::{debug, info};

use crate::error::FeedError;

/// RFC 1123 with a numeric zone, e.g. `Mon, 02 Jan 2006 15:04:05 -0700`
const PUB_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// Same as `PUB_DATE_FORMAT` without the leading weekday
const PUB_DATE_FORMAT_NO_WEEKDAY: &str = "%d %b %Y %H:%M:%S %z";

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Represents a parsed podcast feed
#[derive(Debug)]
pub struct Feed {
    pub title: String,
    /// Episodes in feed order
    pub episodes: Vec<Episode>,
    /// Items that could not be turned into episodes
    pub rejected: Vec<RejectedItem>,
}

/// Represents a single podcast episode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Episode {
    pub title: String,
    pub pub_date: DateTime<FixedOffset>,
    pub enclosure_url: String,
}

/// A feed item that was skipped while parsing
#[derive(Debug)]
pub struct RejectedItem {
    pub title: String,
    pub error: FeedError,
}

/// Parse RSS feed XML bytes into a Feed
///
/// Only malformed XML fails the whole feed. Items with an unusable
/// publication date or without an enclosure end up in `rejected`.
pub fn parse_feed(xml_bytes: &[u8]) -> Result<Feed, FeedError> {
    let channel = rss::Channel::read_from(xml_bytes)?;

    let mut episodes = Vec::with_capacity(channel.items().len());
    let mut rejected = Vec::new();

    for item in channel.items() {
        match parse_episode(item) {
            Ok(episode) => episodes.push(episode),
            Err(error) => {
                let title = item.title().unwrap_or_default().to_string();
                info!(%title, %error, "Skipping feed item");
                rejected.push(RejectedItem { title, error });
            }
        }
    }

    debug!(
        episodes = episodes.len(),
        rejected = rejected.len(),
        "Parsed feed"
    );

    Ok(Feed {
        title: channel.title().to_string(),
        episodes,
        rejected,
    })
}

fn parse_episode(item: &rss::Item) -> Result<Episode, FeedError> {
    let title = item.title().unwrap_or_default().to_string();

    let date_str = item.pub_date().ok_or_else(|| FeedError::MissingDate {
        title: title.clone(),
    })?;
    let pub_date = parse_pub_date(date_str)?;

    let enclosure = item
        .enclosure()
        .ok_or_else(|| FeedError::MissingEnclosure {
            title: title.clone(),
        })?;

    Ok(Episode {
        title,
        pub_date,
        enclosure_url: enclosure.url().to_string(),
    })
}

/// Parse a publication date in strict RFC 1123 form with numeric zone
///
/// The weekday has to be a valid short day name, but it is not checked
/// against the calendar date. Feeds get it wrong often enough.
pub fn parse_pub_date(date_str: &str) -> Result<DateTime<FixedOffset>, FeedError> {
    let trimmed = date_str.trim();

    let parsed = match trimmed.split_once(", ") {
        Some((weekday, rest)) if WEEKDAYS.contains(&weekday) => {
            DateTime::parse_from_str(rest, PUB_DATE_FORMAT_NO_WEEKDAY)
        }
        // Fails for any weekday token that is not a day name
        _ => DateTime::parse_from_str(trimmed, PUB_DATE_FORMAT),
    };

    parsed.map_err(|source| FeedError::InvalidDate {
        date_str: date_str.to_string(),
        source,
    })
}
