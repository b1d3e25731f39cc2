use chrono::{DateTime, FixedOffset};

use crate::feed::Episode;

/// Characters that are not allowed in episode filenames
const RESERVED_CHARS: &[char] = &['/', '\\', '?', '%', '*', ':', '|', '"', '<', '>'];

/// Extension given to every downloaded episode
const AUDIO_EXTENSION: &str = "mp3";

/// Derive the filename for a publication date and title
///
/// Format: "YYYYMMDD-cleaned title.mp3", with the date taken in the
/// feed's own timezone.
pub fn derive_filename(pub_date: &DateTime<FixedOffset>, title: &str) -> String {
    format!(
        "{}-{}.{}",
        pub_date.format("%Y%m%d"),
        clean_title(title),
        AUDIO_EXTENSION
    )
}

/// Derive the filename for an episode
pub fn episode_filename(episode: &Episode) -> String {
    derive_filename(&episode.pub_date, &episode.title)
}

/// Replace reserved characters with '-' and drop one trailing '-'
fn clean_title(title: &str) -> String {
    let replaced: String = title
        .chars()
        .map(|c| if RESERVED_CHARS.contains(&c) { '-' } else { c })
        .collect();

    match replaced.strip_suffix('-') {
        Some(stripped) => stripped.to_string(),
        None => replaced,
    }
}
