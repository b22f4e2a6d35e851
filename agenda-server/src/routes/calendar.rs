//! Calendar feed endpoints

use axum::{
    Router,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use agenda_core::AgendaError;
use agenda_core::event::CalendarEvent;
use agenda_core::gcal::build_google_cal_url;
use agenda_core::ics::{build_event_ics_at, build_feed_ics_at};
use agenda_core::store::{FEED_LIMIT, FeedMode};
use chrono::Utc;
use serde::Deserialize;
use tracing::debug;

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events.ics", get(feed_ics))
        .route("/events/{slug}/ics", get(event_ics))
        .route("/events/{slug}/google", get(google_redirect))
}

#[derive(Deserialize)]
pub struct FeedQuery {
    pub mode: Option<String>,
}

fn calendar_response(file_stem: &str, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_stem}.ics\""),
            ),
            (header::CACHE_CONTROL, "no-store".to_string()),
        ],
        body,
    )
        .into_response()
}

async fn load_event(state: &AppState, key: &str) -> Result<CalendarEvent, AppError> {
    let row = state
        .store
        .find_event(key)
        .await?
        .ok_or_else(|| AgendaError::EventNotFound(key.to_string()))?;
    Ok(row.into_calendar_event())
}

/// GET /events/:slug/ics - Single event as an .ics download (slug or id)
async fn event_ics(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    let event = load_event(&state, &slug).await?;
    let ics = build_event_ics_at(&event, &state.base_url, &state.feed, Utc::now())?;

    Ok(calendar_response(&event.file_stem(), ics))
}

/// GET /events.ics?mode=upcoming|past|all - Feed of many events
async fn feed_ics(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> Result<Response, AppError> {
    let mode = FeedMode::from_query(query.mode.as_deref());
    let rows = state.store.list_events(mode, FEED_LIMIT).await?;
    debug!(%mode, count = rows.len(), "Building feed");

    let events: Vec<CalendarEvent> = rows.into_iter().map(CalendarEvent::from).collect();
    let ics = build_feed_ics_at(&events, &state.base_url, &state.feed, Utc::now())?;

    Ok(calendar_response("events", ics))
}

/// GET /events/:slug/google - Redirect to Google Calendar's add-event form
async fn google_redirect(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Redirect, AppError> {
    let event = load_event(&state, &slug).await?;
    let url = build_google_cal_url(&event, &state.base_url)?;

    Ok(Redirect::to(&url))
}
