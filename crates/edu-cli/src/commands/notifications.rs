use edu_db::NotificationFilter;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::NotificationCommands;
use crate::commands::shared::limit::effective_limit;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct ReadResponse {
    id: String,
    marked_read: bool,
}

/// Handle `educ notifications`.
pub async fn handle(
    action: &NotificationCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        NotificationCommands::List { recipient, unread } => {
            let filter = NotificationFilter {
                recipient_id: recipient.clone(),
                unread_only: *unread,
                limit: Some(effective_limit(None, flags.limit, ctx.config.general.default_limit)),
            };
            let notifications = ctx.db.list_notifications(&filter).await?;
            output(&notifications, flags.format)
        }
        NotificationCommands::Read { id } => {
            let marked_read = ctx.db.mark_notification_read(id).await?;
            if !marked_read {
                anyhow::bail!("notification not found: {id}");
            }
            output(
                &ReadResponse {
                    id: id.clone(),
                    marked_read,
                },
                flags.format,
            )
        }
    }
}
