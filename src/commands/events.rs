use anyhow::Result;
use agenda_core::event::CalendarEvent;
use agenda_core::ics::parse_timestamp;
use agenda_core::store::{FEED_LIMIT, FeedMode};
use owo_colors::OwoColorize;

use super::Context;

pub async fn run(ctx: &Context, mode: FeedMode) -> Result<()> {
    let display = ctx.config.display()?;
    let rows = ctx.store.list_events(mode, FEED_LIMIT).await?;

    if rows.is_empty() {
        println!("{}", format!("No {mode} events").dimmed());
        return Ok(());
    }

    for row in rows {
        let event = CalendarEvent::from(row);

        let when = match parse_timestamp("starts_at", &event.starts_at) {
            Ok(start) => {
                let (day, month) = display.badge(&start);
                format!("{day} {month}  {}", display.format(&start))
            }
            Err(_) => format!("{} ({})", "invalid date".red(), event.starts_at),
        };

        println!("{}  {}", when, event.display_title().bold());

        let mut details = vec![event.slug.clone()];
        if let Some(location) = event.location() {
            details.push(location.to_string());
        }
        println!("        {}", details.join(" · ").dimmed());
    }

    Ok(())
}
