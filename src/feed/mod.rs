mod fetch;
mod parse;

pub use fetch::{fetch_feed, fetch_feed_bytes};
pub use parse::{Episode, Feed, RejectedItem, parse_feed, parse_pub_date};
