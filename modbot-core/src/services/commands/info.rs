//! Read-only informational commands.

use async_trait::async_trait;
use tracing::info;

use modbot_common::models::{ChatKind, EscalationState};

use crate::Error;
use crate::services::commands::{CommandContext, CommandHandler};

pub struct StartCommand;

#[async_trait]
impl CommandHandler for StartCommand {
    fn name(&self) -> &str {
        "start"
    }

    fn description(&self) -> &str {
        "Start the bot and show a short introduction"
    }

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<(), Error> {
        ctx.reply(
            "👋 Hi! I keep group chats tidy.\n\n\
             Add me to a group as admin, then:\n\
             /help - list all commands\n\
             /rules - show the chat rules\n\
             /stats - chat statistics",
        )
        .await;
        Ok(())
    }
}

/// Lists every registered command with its description.
pub struct HelpCommand;

#[async_trait]
impl CommandHandler for HelpCommand {
    fn name(&self) -> &str {
        "help"
    }

    fn description(&self) -> &str {
        "Display all available commands"
    }

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<(), Error> {
        let mut text = String::from("📖 Commands:\n");
        for (name, description) in ctx.registry.list() {
            text.push_str(&format!("/{} - {}\n", name, description));
        }
        ctx.reply(text.trim_end()).await;
        Ok(())
    }
}

pub struct InfoCommand;

#[async_trait]
impl CommandHandler for InfoCommand {
    fn name(&self) -> &str {
        "info"
    }

    fn description(&self) -> &str {
        "Show bot information"
    }

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<(), Error> {
        ctx.reply(&format!(
            "ℹ️ modbot v{}\n\n\
             • Moderation: ban, kick, warn, mute\n\
             • Content filters with automatic escalation\n\
             • Notes, rules and statistics",
            env!("CARGO_PKG_VERSION")
        ))
        .await;
        Ok(())
    }
}

pub struct StatsCommand;

#[async_trait]
impl CommandHandler for StatsCommand {
    fn name(&self) -> &str {
        "stats"
    }

    fn description(&self) -> &str {
        "Display chat statistics"
    }

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<(), Error> {
        let stats = ctx.services.stats_repo.get_stats(ctx.chat_id()).await?;
        ctx.reply(&format!(
            "📊 Chat statistics\n\n\
             💬 Messages: {}\n\
             ⚠️ Warnings: {}\n\
             🔇 Mutes: {}\n\
             👢 Kicks: {}\n\
             🚫 Bans: {}\n\
             📝 Notes saved: {}",
            stats.total_messages,
            stats.users_warned,
            stats.users_muted,
            stats.users_kicked,
            stats.users_banned,
            stats.notes_saved
        ))
        .await;
        Ok(())
    }
}

pub struct ChatInfoCommand;

#[async_trait]
impl CommandHandler for ChatInfoCommand {
    fn name(&self) -> &str {
        "chatinfo"
    }

    fn description(&self) -> &str {
        "Show chat information"
    }

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<(), Error> {
        let event = ctx.event();
        let kind = match event.chat_kind {
            ChatKind::Private => "private",
            ChatKind::Group => "group",
        };
        let title = event.chat_title.as_deref().unwrap_or("-");
        ctx.reply(&format!(
            "ℹ️ Chat information\n\nChat ID: {}\nType: {}\nTitle: {}",
            event.chat_id, kind, title
        ))
        .await;
        Ok(())
    }
}

/// Defaults to the sender when no target is given.
pub struct UserInfoCommand;

#[async_trait]
impl CommandHandler for UserInfoCommand {
    fn name(&self) -> &str {
        "userinfo"
    }

    fn description(&self) -> &str {
        "Show a user's moderation status"
    }

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<(), Error> {
        let user_id = ctx.target_user().map(|(id, _)| id).unwrap_or(ctx.sender_id());
        let record = ctx.services.escalation.record(ctx.chat_id(), user_id).await?;
        let settings = ctx.services.settings_or_default(ctx.chat_id()).await?;

        let status = match record.state() {
            EscalationState::Clean => "clean".to_string(),
            EscalationState::Warned(_) => "warned".to_string(),
            EscalationState::Muted => match record.muted_until {
                Some(until) => format!("muted until {}", until.format("%Y-%m-%d %H:%M UTC")),
                None => "muted".to_string(),
            },
            EscalationState::Banned => "banned".to_string(),
        };
        ctx.reply(&format!(
            "👤 User information\n\nUser ID: {}\nStatus: {}\nWarnings: {}/{}",
            user_id, status, record.warning_count, settings.auto_ban_after_warnings
        ))
        .await;
        Ok(())
    }
}

pub struct ReportCommand;

#[async_trait]
impl CommandHandler for ReportCommand {
    fn name(&self) -> &str {
        "report"
    }

    fn description(&self) -> &str {
        "Report a user to the admins"
    }

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<(), Error> {
        let Some((reported, reason)) = ctx.target_user() else {
            ctx.reply_usage("/report <user_id> <reason> (or reply to a message)").await;
            return Ok(());
        };
        info!(
            chat_id = ctx.chat_id(),
            reporter = ctx.sender_id(),
            reported,
            "User report: {}",
            reason
        );
        ctx.reply("✅ Report submitted to admins").await;
        Ok(())
    }
}
