use anyhow::{Context as _, Result};
use agenda_core::gcal::build_google_cal_url;

use super::Context;

pub async fn run(ctx: &Context, slug: &str, open_browser: bool) -> Result<()> {
    let event = ctx.find_event(slug).await?;
    let url = build_google_cal_url(&event, &ctx.config.base_url())?;

    println!("{url}");

    if open_browser {
        open::that(&url).context("Could not open browser")?;
    }

    Ok(())
}
