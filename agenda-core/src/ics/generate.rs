//! Single-event and feed document generation.

use chrono::{DateTime, Utc};
use url::Url;

use super::datetime::{format_utc, to_ics_utc};
use super::escape::escape_text;
use super::fold::fold_line;
use crate::error::AgendaResult;
use crate::event::CalendarEvent;

pub const DEFAULT_PRODUCT_ID: &str = "-//Majabudaya//Events//ID";
pub const DEFAULT_CALENDAR_NAME: &str = "Agenda Budaya Majalengka";

/// Calendar-level metadata written into the document header.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedOptions {
    /// PRODID value
    pub product_id: String,
    /// X-WR-CALNAME value, used by the multi-event feed only
    pub calendar_name: String,
}

impl Default for FeedOptions {
    fn default() -> Self {
        FeedOptions {
            product_id: DEFAULT_PRODUCT_ID.to_string(),
            calendar_name: DEFAULT_CALENDAR_NAME.to_string(),
        }
    }
}

/// Collects content lines and joins them with CRLF.
struct ContentLines(Vec<String>);

impl ContentLines {
    fn new() -> Self {
        ContentLines(Vec::new())
    }

    fn push(&mut self, name: &str, value: &str) {
        self.0.push(fold_line(&format!("{name}:{value}")));
    }

    fn push_text(&mut self, name: &str, value: &str) {
        self.push(name, &escape_text(value));
    }

    fn finish(self) -> String {
        self.0.join("\r\n")
    }
}

/// Stable UID: `<id or slug>@<host of base_url>`.
///
/// Falls back to the bare identifier when `base_url` does not parse or has no host.
pub fn event_uid(event: &CalendarEvent, base_url: &str) -> String {
    let identifier = event.identifier();

    let host = Url::parse(base_url).ok().and_then(|url| {
        let host = url.host_str()?.to_string();
        Some(match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host,
        })
    });

    match host {
        Some(host) if !host.is_empty() => format!("{identifier}@{host}"),
        _ => identifier,
    }
}

/// Generate a single-event document stamped with the current time.
pub fn build_event_ics(event: &CalendarEvent, base_url: &str) -> AgendaResult<String> {
    build_event_ics_at(event, base_url, &FeedOptions::default(), Utc::now())
}

/// Generate a single-event document with an explicit DTSTAMP.
pub fn build_event_ics_at(
    event: &CalendarEvent,
    base_url: &str,
    options: &FeedOptions,
    dtstamp: DateTime<Utc>,
) -> AgendaResult<String> {
    let dtstamp = format_utc(&dtstamp);

    let mut lines = ContentLines::new();
    push_calendar_header(&mut lines, options);
    lines.push("X-WR-TIMEZONE", "UTC");
    push_event(&mut lines, event, base_url, &dtstamp)?;
    lines.push("END", "VCALENDAR");

    Ok(lines.finish())
}

/// Generate a feed document stamped with the current time.
pub fn build_feed_ics(events: &[CalendarEvent], base_url: &str) -> AgendaResult<String> {
    build_feed_ics_at(events, base_url, &FeedOptions::default(), Utc::now())
}

/// Generate a feed document with an explicit DTSTAMP.
///
/// Events are written in the order given. Any event with a malformed
/// timestamp rejects the whole feed.
pub fn build_feed_ics_at(
    events: &[CalendarEvent],
    base_url: &str,
    options: &FeedOptions,
    dtstamp: DateTime<Utc>,
) -> AgendaResult<String> {
    let dtstamp = format_utc(&dtstamp);

    let mut lines = ContentLines::new();
    push_calendar_header(&mut lines, options);
    lines.push_text("X-WR-CALNAME", &options.calendar_name);
    lines.push("X-WR-TIMEZONE", "UTC");
    lines.push("DTSTAMP", &dtstamp);

    for event in events {
        push_event(&mut lines, event, base_url, &dtstamp)?;
    }

    lines.push("END", "VCALENDAR");

    Ok(lines.finish())
}

fn push_calendar_header(lines: &mut ContentLines, options: &FeedOptions) {
    lines.push("BEGIN", "VCALENDAR");
    lines.push("VERSION", "2.0");
    lines.push("PRODID", &options.product_id);
    lines.push("CALSCALE", "GREGORIAN");
    lines.push("METHOD", "PUBLISH");
}

fn push_event(
    lines: &mut ContentLines,
    event: &CalendarEvent,
    base_url: &str,
    dtstamp: &str,
) -> AgendaResult<()> {
    let start = to_ics_utc("starts_at", &event.starts_at)?;
    let end = event
        .ends_at()
        .map(|value| to_ics_utc("ends_at", value))
        .transpose()?;

    lines.push("BEGIN", "VEVENT");
    lines.push("UID", &event_uid(event, base_url));
    lines.push("DTSTAMP", dtstamp);
    lines.push("DTSTART", &start);
    if let Some(ref end) = end {
        lines.push("DTEND", end);
    }
    lines.push_text("SUMMARY", event.display_title());
    if let Some(description) = event.description() {
        lines.push_text("DESCRIPTION", description);
    }
    if let Some(location) = event.location() {
        lines.push_text("LOCATION", location);
    }
    lines.push_text("URL", &event.detail_url(base_url));
    lines.push("END", "VEVENT");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AgendaError;
    use crate::event::EventId;
    use chrono::TimeZone;

    const BASE_URL: &str = "https://example.org";

    fn frozen_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 14, 8, 30, 0).unwrap()
    }

    fn gamelan_night() -> CalendarEvent {
        CalendarEvent {
            id: Some(EventId::from("42")),
            slug: "gamelan-night".to_string(),
            title: "Gamelan Night".to_string(),
            starts_at: "2025-03-01T10:00:00.000Z".to_string(),
            ends_at: Some("2025-03-01T12:00:00.000Z".to_string()),
            location: Some("Town Square".to_string()),
            description: None,
        }
    }

    fn event_ics(event: &CalendarEvent) -> String {
        build_event_ics_at(event, BASE_URL, &FeedOptions::default(), frozen_now()).unwrap()
    }

    #[test]
    fn test_event_ics_scenario_fragments() {
        let ics = event_ics(&gamelan_night());
        let lines: Vec<&str> = ics.split("\r\n").collect();

        for expected in [
            "UID:42@example.org",
            "DTSTART:20250301T100000Z",
            "DTEND:20250301T120000Z",
            "SUMMARY:Gamelan Night",
            "LOCATION:Town Square",
            "URL:https://example.org/events/gamelan-night",
        ] {
            assert!(lines.contains(&expected), "Missing {expected}. ICS:\n{ics}");
        }
        assert!(!ics.contains("DESCRIPTION"), "Unexpected DESCRIPTION. ICS:\n{ics}");
    }

    #[test]
    fn test_event_ics_envelope_and_line_endings() {
        let ics = event_ics(&gamelan_night());

        assert!(ics.starts_with("BEGIN:VCALENDAR\r\nVERSION:2.0\r\n"));
        assert!(ics.ends_with("END:VEVENT\r\nEND:VCALENDAR"));
        assert!(ics.contains("PRODID:-//Majabudaya//Events//ID\r\n"));
        assert!(ics.contains("CALSCALE:GREGORIAN\r\n"));
        assert!(ics.contains("METHOD:PUBLISH\r\n"));
        assert!(ics.contains("DTSTAMP:20250214T083000Z\r\n"));

        // Every LF belongs to a CRLF
        assert_eq!(ics.matches('\n').count(), ics.matches("\r\n").count());
    }

    #[test]
    fn test_event_ics_is_deterministic_with_frozen_clock() {
        let event = gamelan_night();
        assert_eq!(event_ics(&event), event_ics(&event));
    }

    #[test]
    fn test_event_ics_dtstamp_uses_current_time_format() {
        let ics = build_event_ics(&gamelan_night(), BASE_URL).unwrap();
        let dtstamp = ics
            .split("\r\n")
            .find_map(|l| l.strip_prefix("DTSTAMP:"))
            .expect("Should have DTSTAMP line");

        assert_eq!(dtstamp.len(), 16);
        assert_eq!(&dtstamp[8..9], "T");
        assert!(dtstamp.ends_with('Z'));
        assert!(
            dtstamp[..8].chars().chain(dtstamp[9..15].chars()).all(|c| c.is_ascii_digit()),
            "Bad DTSTAMP: {dtstamp}"
        );
    }

    #[test]
    fn test_event_ics_escapes_text_fields() {
        let mut event = gamelan_night();
        event.title = "A,B;C\\D\nE".to_string();
        event.description = Some("Line one\r\nLine two".to_string());
        event.location = Some("Hall 1, Floor 2".to_string());

        let ics = event_ics(&event);
        assert!(ics.contains("SUMMARY:A\\,B\\;C\\\\D\\nE\r\n"), "ICS:\n{ics}");
        assert!(ics.contains("DESCRIPTION:Line one\\nLine two\r\n"), "ICS:\n{ics}");
        assert!(ics.contains("LOCATION:Hall 1\\, Floor 2\r\n"), "ICS:\n{ics}");
    }

    #[test]
    fn test_event_ics_omits_absent_optional_fields() {
        let mut event = gamelan_night();
        event.ends_at = None;
        event.description = None;
        event.location = None;

        let ics = event_ics(&event);
        for name in ["DTEND", "DESCRIPTION", "LOCATION"] {
            assert!(
                !ics.split("\r\n").any(|l| l.starts_with(name)),
                "Should not have {name} line. ICS:\n{ics}"
            );
        }
    }

    #[test]
    fn test_event_ics_empty_title_falls_back_to_event() {
        let mut event = gamelan_night();
        event.title = String::new();

        assert!(event_ics(&event).contains("\r\nSUMMARY:Event\r\n"));
    }

    #[test]
    fn test_uid_tracks_base_url_host() {
        let event = gamelan_night();

        assert_eq!(event_uid(&event, BASE_URL), event_uid(&event, BASE_URL));
        assert_eq!(event_uid(&event, "https://example.org/"), "42@example.org");
        assert_eq!(event_uid(&event, "https://budaya.example.id"), "42@budaya.example.id");
        assert_eq!(event_uid(&event, "http://localhost:3000"), "42@localhost:3000");
        assert_eq!(event_uid(&event, "not a url"), "42");
    }

    #[test]
    fn test_uid_falls_back_to_slug() {
        let mut event = gamelan_night();
        event.id = None;

        assert_eq!(event_uid(&event, BASE_URL), "gamelan-night@example.org");
    }

    #[test]
    fn test_uid_never_has_empty_local_part() {
        let mut event = gamelan_night();
        event.id = None;
        event.slug = String::new();

        assert_eq!(event_uid(&event, BASE_URL), "event@example.org");
    }

    #[test]
    fn test_invalid_start_is_rejected() {
        let mut event = gamelan_night();
        event.starts_at = "tomorrow evening".to_string();

        let err = build_event_ics_at(&event, BASE_URL, &FeedOptions::default(), frozen_now())
            .unwrap_err();
        assert!(matches!(err, AgendaError::InvalidTimestamp { field: "starts_at", .. }));
    }

    #[test]
    fn test_invalid_end_is_rejected() {
        let mut event = gamelan_night();
        event.ends_at = Some("2025-02-30T10:00:00Z".to_string());

        let err = build_event_ics_at(&event, BASE_URL, &FeedOptions::default(), frozen_now())
            .unwrap_err();
        assert!(matches!(err, AgendaError::InvalidTimestamp { field: "ends_at", .. }));
    }

    #[test]
    fn test_long_description_is_folded() {
        let mut event = gamelan_night();
        event.description = Some("Pertunjukan gamelan degung ".repeat(10));

        let ics = event_ics(&event);
        assert!(ics.split("\r\n").all(|l| l.len() <= 75));
        assert!(ics.contains("\r\n "));
    }

    #[test]
    fn test_empty_feed_has_header_only() {
        let ics = build_feed_ics_at(&[], BASE_URL, &FeedOptions::default(), frozen_now()).unwrap();

        assert_eq!(ics.matches("BEGIN:VCALENDAR").count(), 1);
        assert_eq!(ics.matches("END:VCALENDAR").count(), 1);
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 0);
        assert!(ics.contains("X-WR-CALNAME:Agenda Budaya Majalengka\r\n"));
        assert!(ics.contains("X-WR-TIMEZONE:UTC\r\n"));
        assert!(ics.contains("DTSTAMP:20250214T083000Z\r\n"));
    }

    #[test]
    fn test_feed_keeps_input_order() {
        let slugs = ["wayang-golek", "tari-topeng", "gamelan-night"];
        let events: Vec<CalendarEvent> = slugs
            .iter()
            .enumerate()
            .map(|(i, slug)| {
                let mut event = gamelan_night();
                event.id = Some(EventId::from(i as i64 + 1));
                event.slug = slug.to_string();
                event
            })
            .collect();

        let ics =
            build_feed_ics_at(&events, BASE_URL, &FeedOptions::default(), frozen_now()).unwrap();

        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 3);
        let positions: Vec<usize> = slugs
            .iter()
            .map(|slug| ics.find(&format!("URL:{BASE_URL}/events/{slug}")).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "Order not kept:\n{ics}");
        assert!(ics.contains("UID:1@example.org\r\n"));
        assert!(ics.contains("UID:3@example.org\r\n"));
    }

    #[test]
    fn test_feed_shares_one_dtstamp() {
        let events = vec![gamelan_night(), gamelan_night()];
        let ics =
            build_feed_ics_at(&events, BASE_URL, &FeedOptions::default(), frozen_now()).unwrap();

        let stamps: Vec<&str> = ics
            .split("\r\n")
            .filter_map(|l| l.strip_prefix("DTSTAMP:"))
            .collect();
        assert_eq!(stamps.len(), 3);
        assert!(stamps.iter().all(|s| *s == "20250214T083000Z"));
    }

    #[test]
    fn test_feed_uses_custom_options() {
        let options = FeedOptions {
            product_id: "-//Example//Feed//EN".to_string(),
            calendar_name: "Kalender, Budaya".to_string(),
        };
        let ics = build_feed_ics_at(&[], BASE_URL, &options, frozen_now()).unwrap();

        assert!(ics.contains("PRODID:-//Example//Feed//EN\r\n"));
        assert!(ics.contains("X-WR-CALNAME:Kalender\\, Budaya\r\n"));
    }

    #[test]
    fn test_feed_rejects_any_invalid_event() {
        let mut broken = gamelan_night();
        broken.starts_at = "Invalid Date".to_string();
        let events = vec![gamelan_night(), broken];

        let result = build_feed_ics_at(&events, BASE_URL, &FeedOptions::default(), frozen_now());
        assert!(result.is_err());
    }

    #[test]
    fn test_generated_documents_parse_as_icalendar() {
        let mut event = gamelan_night();
        event.description = Some("Bring, a; friend\nand snacks".to_string());
        let events = vec![event.clone(), gamelan_night()];

        for ics in [
            event_ics(&event),
            build_feed_ics_at(&events, BASE_URL, &FeedOptions::default(), frozen_now()).unwrap(),
        ] {
            let unfolded = icalendar::parser::unfold(&format!("{ics}\r\n"));
            let calendar = icalendar::parser::read_calendar(&unfolded)
                .unwrap_or_else(|e| panic!("Should parse: {e}\n{ics}"));
            let vevents: Vec<_> = calendar
                .components
                .iter()
                .filter(|c| c.name == "VEVENT")
                .collect();
            assert!(!vevents.is_empty());
            for vevent in vevents {
                for name in ["UID", "DTSTAMP", "DTSTART", "SUMMARY", "URL"] {
                    assert!(vevent.find_prop(name).is_some(), "VEVENT missing {name}");
                }
            }
        }
    }
}
