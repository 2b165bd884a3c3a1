//! Moderator commands. All of them are group-only and admin-only; targets are
//! a numeric user id or the author of the replied-to message.

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use modbot_common::models::{Escalation, StatKind};

use crate::Error;
use crate::services::commands::{
    format_duration, parse_duration, reason_suffix, split_first_word, CommandContext, CommandHandler,
};
use crate::services::permissions::Role;

pub const MAX_PURGE: u32 = 100;

pub struct BanCommand;

#[async_trait]
impl CommandHandler for BanCommand {
    fn name(&self) -> &str {
        "ban"
    }

    fn description(&self) -> &str {
        "Ban a user: /ban <user_id> [reason] or reply"
    }

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<(), Error> {
        ctx.require_moderator()?;
        let Some((user_id, reason)) = ctx.target_user() else {
            ctx.reply_usage("/ban <user_id> [reason] (or reply to a message)").await;
            return Ok(());
        };

        let result = ctx.services.platform.ban_user(ctx.chat_id(), user_id).await;
        if ctx.check_action("ban", result).await {
            ctx.bump_stat(StatKind::Bans).await;
            info!(chat_id = ctx.chat_id(), user_id, by = ctx.sender_id(), "User banned");
            ctx.reply(&format!("🔨 User {} banned{}", user_id, reason_suffix(reason))).await;
        }
        Ok(())
    }
}

pub struct KickCommand;

#[async_trait]
impl CommandHandler for KickCommand {
    fn name(&self) -> &str {
        "kick"
    }

    fn description(&self) -> &str {
        "Remove a user; they may rejoin"
    }

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<(), Error> {
        ctx.require_moderator()?;
        let Some((user_id, reason)) = ctx.target_user() else {
            ctx.reply_usage("/kick <user_id> [reason] (or reply to a message)").await;
            return Ok(());
        };

        let result = ctx.services.platform.kick_user(ctx.chat_id(), user_id).await;
        if ctx.check_action("kick", result).await {
            ctx.bump_stat(StatKind::Kicks).await;
            info!(chat_id = ctx.chat_id(), user_id, by = ctx.sender_id(), "User kicked");
            ctx.reply(&format!("👢 User {} kicked{}", user_id, reason_suffix(reason))).await;
        }
        Ok(())
    }
}

pub struct UnbanCommand;

#[async_trait]
impl CommandHandler for UnbanCommand {
    fn name(&self) -> &str {
        "unban"
    }

    fn description(&self) -> &str {
        "Lift a ban and reset the user's warnings"
    }

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<(), Error> {
        ctx.require_moderator()?;
        let Some((user_id, _)) = ctx.target_user() else {
            ctx.reply_usage("/unban <user_id>").await;
            return Ok(());
        };

        let result = ctx.services.platform.unban_user(ctx.chat_id(), user_id).await;
        if ctx.check_action("unban", result).await {
            ctx.services.escalation.clear(ctx.chat_id(), user_id).await?;
            ctx.reply(&format!("✅ User {} unbanned", user_id)).await;
        }
        Ok(())
    }
}

pub struct WarnCommand;

#[async_trait]
impl CommandHandler for WarnCommand {
    fn name(&self) -> &str {
        "warn"
    }

    fn description(&self) -> &str {
        "Warn a user; repeated warnings escalate to mute or ban"
    }

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<(), Error> {
        ctx.require_moderator()?;
        let Some((user_id, reason)) = ctx.target_user() else {
            ctx.reply_usage("/warn <user_id> [reason] (or reply to a message)").await;
            return Ok(());
        };

        let outcome = ctx.services.escalation.record_violation(ctx.chat_id(), user_id).await?;
        let text = match outcome.escalation {
            Escalation::AlreadyBanned => format!("User {} is already banned", user_id),
            _ => format!(
                "⚠️ User {} warned ({}/{}){}",
                user_id,
                outcome.record.warning_count,
                outcome.threshold,
                reason_suffix(reason)
            ),
        };
        ctx.reply(&text).await;
        Ok(())
    }
}

pub struct ClearWarnsCommand;

#[async_trait]
impl CommandHandler for ClearWarnsCommand {
    fn name(&self) -> &str {
        "clearwarns"
    }

    fn description(&self) -> &str {
        "Reset a user's warnings, mute and ban state"
    }

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<(), Error> {
        ctx.require_moderator()?;
        let Some((user_id, _)) = ctx.target_user() else {
            ctx.reply_usage("/clearwarns <user_id> (or reply to a message)").await;
            return Ok(());
        };

        ctx.services.escalation.clear(ctx.chat_id(), user_id).await?;
        ctx.reply(&format!("✅ Warnings cleared for user {}", user_id)).await;
        Ok(())
    }
}

/// Anyone may look up warnings; without a target it shows the sender's own.
pub struct WarnsCommand;

#[async_trait]
impl CommandHandler for WarnsCommand {
    fn name(&self) -> &str {
        "warns"
    }

    fn description(&self) -> &str {
        "Show a user's warning count"
    }

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<(), Error> {
        ctx.require(Role::GroupOnly)?;
        let user_id = ctx.target_user().map(|(id, _)| id).unwrap_or(ctx.sender_id());

        let record = ctx.services.escalation.record(ctx.chat_id(), user_id).await?;
        let settings = ctx.services.settings_or_default(ctx.chat_id()).await?;

        let mut text = format!(
            "User {} has {}/{} warnings",
            user_id, record.warning_count, settings.auto_ban_after_warnings
        );
        if record.banned {
            text.push_str(" (banned)");
        } else if let Some(until) = record.muted_until {
            text.push_str(&format!(" (muted until {})", until.format("%Y-%m-%d %H:%M UTC")));
        }
        ctx.reply(&text).await;
        Ok(())
    }
}

pub struct MuteCommand;

#[async_trait]
impl CommandHandler for MuteCommand {
    fn name(&self) -> &str {
        "mute"
    }

    fn description(&self) -> &str {
        "Mute a user: /mute <user_id> [30s|5m|2h|1d]"
    }

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<(), Error> {
        ctx.require_moderator()?;
        let Some((user_id, rest)) = ctx.target_user() else {
            ctx.reply_usage("/mute <user_id> [duration]").await;
            return Ok(());
        };

        let (duration_arg, _) = split_first_word(rest);
        let duration = if duration_arg.is_empty() {
            ctx.services.settings_or_default(ctx.chat_id()).await?.mute_duration()
        } else {
            match parse_duration(duration_arg) {
                Some(d) => d,
                None => {
                    ctx.reply_usage("/mute <user_id> [30s|5m|2h|1d]").await;
                    return Ok(());
                }
            }
        };

        let Some(until) = Utc::now().checked_add_signed(duration) else {
            ctx.reply_usage("/mute <user_id> [30s|5m|2h|1d]").await;
            return Ok(());
        };
        match ctx.services.escalation.mute_until(ctx.chat_id(), user_id, until).await? {
            Some(_) => {
                ctx.reply(&format!("🔇 User {} muted for {}", user_id, format_duration(duration))).await;
            }
            None => {
                ctx.reply(&format!("User {} is banned", user_id)).await;
            }
        }
        Ok(())
    }
}

pub struct UnmuteCommand;

#[async_trait]
impl CommandHandler for UnmuteCommand {
    fn name(&self) -> &str {
        "unmute"
    }

    fn description(&self) -> &str {
        "Lift a mute early"
    }

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<(), Error> {
        ctx.require_moderator()?;
        let Some((user_id, _)) = ctx.target_user() else {
            ctx.reply_usage("/unmute <user_id>").await;
            return Ok(());
        };

        if ctx.services.escalation.unmute(ctx.chat_id(), user_id).await? {
            ctx.reply(&format!("🔊 User {} unmuted", user_id)).await;
        } else {
            ctx.reply(&format!("User {} is not muted", user_id)).await;
        }
        Ok(())
    }
}

/// Deletes the `n` messages before the command, then the command itself.
pub struct PurgeCommand;

#[async_trait]
impl CommandHandler for PurgeCommand {
    fn name(&self) -> &str {
        "purge"
    }

    fn description(&self) -> &str {
        "Delete the last n messages (1-100)"
    }

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<(), Error> {
        ctx.require_moderator()?;
        let count = match split_first_word(ctx.args()).0.parse::<u32>() {
            Ok(n) if (1..=MAX_PURGE).contains(&n) => n,
            _ => {
                ctx.reply_usage("/purge <1-100>").await;
                return Ok(());
            }
        };

        let chat_id = ctx.chat_id();
        let command_id = ctx.event().message_id;
        let mut deleted = 0u32;
        for offset in 1..=i64::from(count) {
            let message_id = command_id - offset;
            if message_id <= 0 {
                break;
            }
            // Gaps and already-deleted ids are expected; keep going.
            if let Ok(true) = ctx.services.platform.delete_message(chat_id, message_id).await {
                deleted += 1;
            }
        }
        let _ = ctx.services.platform.delete_message(chat_id, command_id).await;

        info!(chat_id, by = ctx.sender_id(), "Purged {}/{} messages", deleted, count);
        ctx.reply(&format!("🗑️ Deleted {} messages", deleted)).await;
        Ok(())
    }
}

pub struct PinCommand;

#[async_trait]
impl CommandHandler for PinCommand {
    fn name(&self) -> &str {
        "pin"
    }

    fn description(&self) -> &str {
        "Pin the replied-to message"
    }

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<(), Error> {
        ctx.require_moderator()?;
        let Some(message_id) = ctx.event().reply_to_message_id else {
            ctx.reply_usage("reply to a message with /pin").await;
            return Ok(());
        };

        let result = ctx.services.platform.pin_message(ctx.chat_id(), message_id).await;
        if ctx.check_action("pin", result).await {
            ctx.reply("📌 Message pinned").await;
        }
        Ok(())
    }
}

/// Unpins the replied-to message, or the most recent pin without a reply.
pub struct UnpinCommand;

#[async_trait]
impl CommandHandler for UnpinCommand {
    fn name(&self) -> &str {
        "unpin"
    }

    fn description(&self) -> &str {
        "Unpin a message"
    }

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<(), Error> {
        ctx.require_moderator()?;
        let target = ctx.event().reply_to_message_id;

        let result = ctx.services.platform.unpin_message(ctx.chat_id(), target).await;
        if ctx.check_action("unpin", result).await {
            ctx.reply("📌 Message unpinned").await;
        }
        Ok(())
    }
}
