//! Google Calendar quick-add links.

use url::form_urlencoded;

use crate::error::AgendaResult;
use crate::event::CalendarEvent;
use crate::ics::to_ics_utc;

pub const GOOGLE_CALENDAR_RENDER_URL: &str = "https://www.google.com/calendar/render";

/// Build a link that pre-fills Google Calendar's "add event" form.
///
/// Values are form-urlencoded as-is. iCalendar escaping does not apply here.
pub fn build_google_cal_url(event: &CalendarEvent, base_url: &str) -> AgendaResult<String> {
    let start = to_ics_utc("starts_at", &event.starts_at)?;
    let end = match event.ends_at() {
        Some(value) => to_ics_utc("ends_at", value)?,
        None => start.clone(),
    };

    let url = event.detail_url(base_url);
    let details = match event.description() {
        Some(description) => format!("{description}\n\n{url}"),
        None => url,
    };

    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("action", "TEMPLATE")
        .append_pair("text", event.display_title())
        .append_pair("dates", &format!("{start}/{end}"))
        .append_pair("details", &details)
        .append_pair("location", event.location().unwrap_or_default())
        .append_pair("trp", "false")
        .finish();

    Ok(format!("{GOOGLE_CALENDAR_RENDER_URL}?{query}"))
}
