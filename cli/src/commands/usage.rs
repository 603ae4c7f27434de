//! Usage commands

use super::Services;
use crate::{output::OutputFormat, UsageCommands};
use netusage_stats::format_size;

pub async fn handle(action: UsageCommands, services: &Services, format: OutputFormat) -> anyhow::Result<()> {
    match action {
        UsageCommands::Summary => {
            let summary = services.aggregator.summary().await?;
            format.print(&summary, || summary.to_string());
        }
        UsageCommands::Label => {
            let label = services.label.refresh_pending().await?;
            format.print(&label, || label.clone().unwrap_or_default());
        }
        UsageCommands::Format { bytes } => {
            let size = format_size(bytes);
            format.print(&size, || size.clone());
        }
    }
    Ok(())
}
