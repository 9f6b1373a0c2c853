use anyhow::anyhow;
use desk_core::enums::NotificationKind;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::NotifyCommands;
use crate::context::AppContext;
use crate::output::output;

pub async fn handle(action: &NotifyCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        NotifyCommands::List => {
            let notifications = ctx.service.list_notifications(flags.limit).await?;
            output(&notifications, flags.format)
        }
        NotifyCommands::Send(args) => {
            if args.title.trim().is_empty() || args.message.trim().is_empty() {
                anyhow::bail!("--title and --message must not be blank");
            }
            let kind = parse_kind(&args.kind)?;
            let notification = ctx
                .service
                .create_notification(args.title.trim(), args.message.trim(), kind)
                .await?;
            output(&notification, flags.format)
        }
    }
}

fn parse_kind(raw: &str) -> anyhow::Result<NotificationKind> {
    serde_json::from_value(serde_json::Value::String(raw.trim().to_ascii_lowercase())).map_err(|_| {
        anyhow!("unknown notification kind '{raw}' (expected info, warning, success or error)")
    })
}

#[cfg(test)]
mod tests {
    use super::parse_kind;
    use desk_core::enums::NotificationKind;

    #[test]
    fn kinds_parse_case_insensitively() {
        assert_eq!(parse_kind("Warning").unwrap(), NotificationKind::Warning);
        assert_eq!(parse_kind(" info ").unwrap(), NotificationKind::Info);
        let err = parse_kind("urgent").unwrap_err();
        assert!(err.to_string().contains("urgent"));
    }
}
