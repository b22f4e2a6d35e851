//! iCalendar feed generation.
//!
//! Builds RFC 5545 documents for a single event or a whole feed. The builders
//! are pure: the only input besides the events is the `DTSTAMP` instant, which
//! the `_at` variants take explicitly.

mod datetime;
mod escape;
mod fold;
mod generate;

pub use datetime::{ICS_UTC_FORMAT, format_utc, parse_timestamp, to_ics_utc};
pub use escape::escape_text;
pub use fold::fold_line;
pub use generate::{
    FeedOptions, build_event_ics, build_event_ics_at, build_feed_ics, build_feed_ics_at,
    event_uid,
};
