use std::path::Path;

use anyhow::Result;
use agenda_core::registration::{RegistrationFilter, registrations_to_csv};
use tracing::info;

use super::{Context, write_output};

pub async fn run(ctx: &Context, filter: &RegistrationFilter, output: Option<&Path>) -> Result<()> {
    let rows = ctx.store.list_registrations(filter).await?;
    info!(count = rows.len(), "Exporting registrations");

    write_output(output, &registrations_to_csv(&rows))
}
