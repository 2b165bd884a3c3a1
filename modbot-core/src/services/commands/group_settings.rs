use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use modbot_common::models::ChatSettings;

use crate::Error;
use crate::services::commands::{on_off, parse_toggle, split_first_word, CommandContext, CommandHandler};
use crate::services::permissions::Role;

async fn save(ctx: &CommandContext<'_>, mut settings: ChatSettings) -> Result<(), Error> {
    settings.updated_at = Utc::now();
    ctx.services.settings_repo.save_settings(&settings).await?;
    info!(chat_id = ctx.chat_id(), by = ctx.sender_id(), "Chat settings updated");
    Ok(())
}

fn render(settings: &ChatSettings) -> String {
    format!(
        "⚙️ Chat settings\n\n\
         🚫 Antiflood: {}\n\
         👋 Welcome: {}\n\
         🧹 Filters: {}\n\
         ⚠️ Auto-warn: {}\n\
         🔇 Auto-mute: {} ({} min)\n\
         🔨 Auto-ban: {} (after {} warnings)",
        on_off(settings.antiflood_enabled),
        on_off(settings.welcome_enabled),
        on_off(settings.filter_enabled),
        on_off(settings.auto_warn_enabled),
        on_off(settings.auto_mute_enabled),
        settings.auto_mute_duration,
        on_off(settings.auto_ban_enabled),
        settings.auto_ban_after_warnings,
    )
}

/// Applies one `key value` pair. `Err` carries the usage hint to show.
pub fn apply_setting(settings: &mut ChatSettings, key: &str, value: &str) -> Result<(), &'static str> {
    let toggle = || parse_toggle(value).ok_or("value must be on or off");
    match key.to_lowercase().as_str() {
        "autowarn" => settings.auto_warn_enabled = toggle()?,
        "automute" => settings.auto_mute_enabled = toggle()?,
        "autoban" => settings.auto_ban_enabled = toggle()?,
        "antiflood" => settings.antiflood_enabled = toggle()?,
        "welcome" => settings.welcome_enabled = toggle()?,
        "filter" => settings.filter_enabled = toggle()?,
        "muteduration" => {
            settings.auto_mute_duration = match value.trim().parse::<u32>() {
                Ok(m) if m > 0 => m,
                _ => return Err("muteduration takes minutes > 0"),
            }
        }
        "banthreshold" => {
            settings.auto_ban_after_warnings = match value.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => return Err("banthreshold takes a number > 0"),
            }
        }
        _ => return Err("unknown setting"),
    }
    Ok(())
}

pub struct SettingsCommand;

#[async_trait]
impl CommandHandler for SettingsCommand {
    fn name(&self) -> &str {
        "settings"
    }

    fn description(&self) -> &str {
        "View or change chat settings (admin only in groups)"
    }

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<(), Error> {
        ctx.require(Role::GroupAdmin)?;
        let mut settings = ctx.services.settings_or_default(ctx.chat_id()).await?;

        let (key, value) = split_first_word(ctx.args());
        if key.is_empty() {
            ctx.reply(&render(&settings)).await;
            return Ok(());
        }

        match apply_setting(&mut settings, key, value) {
            Ok(()) => {
                save(ctx, settings).await?;
                ctx.reply(&format!("✅ {} updated", key.to_lowercase())).await;
            }
            Err(hint) => {
                ctx.reply_usage(&format!(
                    "/settings <autowarn|automute|autoban|antiflood|welcome|filter> <on|off>, \
                     /settings muteduration <minutes>, /settings banthreshold <n> ({})",
                    hint
                ))
                .await;
            }
        }
        Ok(())
    }
}

/// `/welcome` shows the message, `/welcome on|off` toggles it, anything else
/// becomes the new text.
pub struct WelcomeCommand;

#[async_trait]
impl CommandHandler for WelcomeCommand {
    fn name(&self) -> &str {
        "welcome"
    }

    fn description(&self) -> &str {
        "Show, toggle or set the welcome message"
    }

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<(), Error> {
        ctx.require(Role::GroupOnly)?;
        let mut settings = ctx.services.settings_or_default(ctx.chat_id()).await?;
        let args = ctx.args();

        if args.is_empty() {
            ctx.reply(&format!(
                "👋 Welcome message ({}):\n{}",
                on_off(settings.welcome_enabled),
                settings.welcome_text
            ))
            .await;
            return Ok(());
        }

        ctx.require(Role::GroupAdmin)?;
        if let Some(flag) = parse_toggle(args) {
            settings.welcome_enabled = flag;
            save(ctx, settings).await?;
            ctx.reply(&format!("👋 Welcome: {}", on_off(flag))).await;
        } else {
            settings.welcome_text = args.to_string();
            settings.welcome_enabled = true;
            save(ctx, settings).await?;
            ctx.reply("👋 Welcome message set").await;
        }
        Ok(())
    }
}

pub struct AntifloodCommand;

#[async_trait]
impl CommandHandler for AntifloodCommand {
    fn name(&self) -> &str {
        "antiflood"
    }

    fn description(&self) -> &str {
        "Enable/disable antiflood protection"
    }

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<(), Error> {
        ctx.require_moderator()?;
        let Some(flag) = parse_toggle(ctx.args()) else {
            ctx.reply_usage("/antiflood on|off").await;
            return Ok(());
        };

        let mut settings = ctx.services.settings_or_default(ctx.chat_id()).await?;
        settings.antiflood_enabled = flag;
        save(ctx, settings).await?;
        if flag {
            ctx.reply("🚫 Antiflood: ENABLED").await;
        } else {
            ctx.reply("✅ Antiflood: DISABLED").await;
        }
        Ok(())
    }
}

/// `/rules` or `/rules view` for everyone; `/rules set <text>` for admins.
pub struct RulesCommand;

#[async_trait]
impl CommandHandler for RulesCommand {
    fn name(&self) -> &str {
        "rules"
    }

    fn description(&self) -> &str {
        "View or set chat rules"
    }

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<(), Error> {
        let (action, rest) = split_first_word(ctx.args());
        let mut settings = ctx.services.settings_or_default(ctx.chat_id()).await?;

        match action.to_lowercase().as_str() {
            "" | "view" => match settings.rules_text.as_deref() {
                Some(rules) => ctx.reply(&format!("📋 Chat rules\n\n{}", rules)).await,
                None => ctx.reply("📋 No rules set for this chat").await,
            },
            "set" => {
                ctx.require(Role::GroupAdmin)?;
                if rest.is_empty() {
                    ctx.reply_usage("/rules set <text>").await;
                    return Ok(());
                }
                settings.rules_text = Some(rest.to_string());
                save(ctx, settings).await?;
                ctx.reply("✅ Rules updated").await;
            }
            _ => ctx.reply_usage("/rules [view] | /rules set <text>").await,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_setting_toggles_and_numbers() {
        let mut s = ChatSettings::for_chat(1);
        apply_setting(&mut s, "AutoMute", "on").unwrap();
        apply_setting(&mut s, "muteduration", "15").unwrap();
        apply_setting(&mut s, "banthreshold", "5").unwrap();
        apply_setting(&mut s, "autowarn", "off").unwrap();
        assert!(s.auto_mute_enabled);
        assert_eq!(s.auto_mute_duration, 15);
        assert_eq!(s.auto_ban_after_warnings, 5);
        assert!(!s.auto_warn_enabled);
    }

    #[test]
    fn test_render_shows_only_settable_values() {
        let mut s = ChatSettings::for_chat(1);
        apply_setting(&mut s, "antiflood", "off").unwrap();
        apply_setting(&mut s, "muteduration", "20").unwrap();
        let text = render(&s);
        assert!(text.contains("🚫 Antiflood: OFF\n"));
        assert!(text.contains("🔇 Auto-mute: OFF (20 min)"));
        assert!(!text.contains("threshold"));
    }

    #[test]
    fn test_apply_setting_rejects_bad_values() {
        let mut s = ChatSettings::for_chat(1);
        assert!(apply_setting(&mut s, "banthreshold", "0").is_err());
        assert!(apply_setting(&mut s, "autoban", "maybe").is_err());
        assert!(apply_setting(&mut s, "colour", "blue").is_err());
        assert_eq!(s.auto_ban_after_warnings, 3);
        assert!(s.auto_ban_enabled);
    }
}
