use std::path::Path;

use anyhow::Result;
use agenda_core::event::CalendarEvent;
use agenda_core::ics::{build_event_ics_at, build_feed_ics_at};
use agenda_core::store::{FEED_LIMIT, FeedMode};
use chrono::Utc;
use tracing::info;

use super::{Context, write_output};

pub async fn run_event(ctx: &Context, slug: &str, output: Option<&Path>) -> Result<()> {
    let event = ctx.find_event(slug).await?;
    let ics = build_event_ics_at(
        &event,
        &ctx.config.base_url(),
        &ctx.config.feed_options(),
        Utc::now(),
    )?;

    write_output(output, &ics)
}

pub async fn run_feed(ctx: &Context, mode: FeedMode, output: Option<&Path>) -> Result<()> {
    let rows = ctx.store.list_events(mode, FEED_LIMIT).await?;
    info!(%mode, count = rows.len(), "Building feed");

    let events: Vec<CalendarEvent> = rows.into_iter().map(CalendarEvent::from).collect();
    let ics = build_feed_ics_at(
        &events,
        &ctx.config.base_url(),
        &ctx.config.feed_options(),
        Utc::now(),
    )?;

    write_output(output, &ics)
}
