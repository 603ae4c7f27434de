//! Subscription commands

use super::Services;
use crate::{output::OutputFormat, SubscriptionCommands};
use netusage_common::SubscriptionId;
use netusage_fetch::fetch_subscription_info;

pub async fn handle(action: SubscriptionCommands, services: &Services, format: OutputFormat) -> anyhow::Result<()> {
    match action {
        SubscriptionCommands::Resolve { subscription_id } => {
            let template = services.resolver.resolve(SubscriptionId::new(subscription_id));
            format.print(&template, || template.to_string());
        }
        SubscriptionCommands::Lookup { subscription_id } => {
            let id = SubscriptionId::new(subscription_id);
            let info = fetch_subscription_info(services.coordinator.as_ref(), services.resolver.clone(), id).await?;
            format.print(&info, || match &info {
                Some(info) => format!(
                    "subscription {}: identity={} group={}",
                    info.id,
                    info.subscriber_identity.as_deref().unwrap_or("-"),
                    info.group_id.as_deref().unwrap_or("-"),
                ),
                None => format!("subscription {} is not active", id),
            });
        }
    }
    Ok(())
}
