// File: modbot-core/src/services/commands/mod.rs
//! Builtin slash-commands. Each command is its own type implementing
//! `CommandHandler`; `register_builtin_commands` puts all of them into a
//! registry at startup.

pub mod moderation;
pub mod content;
pub mod group_settings;
pub mod info;

use std::sync::Arc;
use async_trait::async_trait;
use chrono::Duration;
use tracing::warn;
use modbot_common::models::{ChatEvent, StatKind};

use crate::Error;
use crate::services::command_registry::CommandRegistry;
use crate::services::event_context::EventContext;
use crate::services::notices;
use crate::services::permissions::{self, Role};

/// A command parsed out of a `ChatEvent`; lives only for one dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandInvocation {
    /// Case-folded, sigil and `@botname` suffix removed.
    pub name: String,
    /// Everything after the first whitespace, trimmed.
    pub args: String,
    pub event: ChatEvent,
}

/// Everything a handler gets to see while it runs.
pub struct CommandContext<'a> {
    pub invocation: &'a CommandInvocation,
    pub services: &'a EventContext,
    pub registry: &'a CommandRegistry,
}

impl<'a> CommandContext<'a> {
    pub fn chat_id(&self) -> i64 {
        self.invocation.event.chat_id
    }

    pub fn sender_id(&self) -> i64 {
        self.invocation.event.sender_id
    }

    pub fn event(&self) -> &ChatEvent {
        &self.invocation.event
    }

    pub fn args(&self) -> &str {
        &self.invocation.args
    }

    pub async fn reply(&self, text: &str) {
        self.services.notify(self.chat_id(), text).await;
    }

    pub async fn reply_usage(&self, line: &str) {
        self.reply(&notices::usage(line)).await;
    }

    pub fn require(&self, role: Role) -> Result<(), Error> {
        permissions::require(self.event(), role)
    }

    /// Group chats only, and only for admins.
    pub fn require_moderator(&self) -> Result<(), Error> {
        self.require(Role::GroupOnly)?;
        self.require(Role::GroupAdmin)
    }

    /// Turns an outbound action result into success/failure. Failures are
    /// logged and answered with the generic notice.
    pub async fn check_action(&self, action: &str, result: Result<bool, Error>) -> bool {
        match result {
            Ok(true) => true,
            Ok(false) => {
                warn!(chat_id = self.chat_id(), "{} refused by platform", action);
                self.reply(notices::ACTION_FAILED).await;
                false
            }
            Err(e) => {
                warn!(chat_id = self.chat_id(), "{} failed: {:?}", action, e);
                self.reply(notices::ACTION_FAILED).await;
                false
            }
        }
    }

    pub async fn bump_stat(&self, kind: StatKind) {
        if let Err(e) = self.services.stats_repo.increment_stat(self.chat_id(), kind).await {
            warn!(chat_id = self.chat_id(), "Failed to increment {:?} stat: {:?}", kind, e);
        }
    }

    /// Target user: a numeric first argument, else the author of the replied-to
    /// message. Returns the target and the remaining argument text.
    pub fn target_user(&self) -> Option<(i64, &str)> {
        let (first, rest) = split_first_word(self.args());
        if let Some(id) = parse_user_id(first) {
            return Some((id, rest));
        }
        self.event().reply_to_user_id.map(|id| (id, self.args()))
    }
}

#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Command name without the sigil, e.g. `"warn"`.
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<(), Error>;
}

/// Splits on the first run of whitespace; both halves trimmed.
pub fn split_first_word(s: &str) -> (&str, &str) {
    let s = s.trim();
    match s.find(char::is_whitespace) {
        Some(i) => (&s[..i], s[i..].trim()),
        None => (s, ""),
    }
}

/// Numeric user ids only; `@username` needs a lookup this bot doesn't do.
pub fn parse_user_id(arg: &str) -> Option<i64> {
    let arg = arg.trim();
    if arg.starts_with('@') {
        return None;
    }
    arg.parse::<i64>().ok()
}

/// `30s`, `5m`, `2h`, `1d`; a bare number means minutes. Amounts chrono
/// cannot represent yield `None`.
pub fn parse_duration(arg: &str) -> Option<Duration> {
    let arg = arg.trim().to_ascii_lowercase();
    if arg.is_empty() {
        return None;
    }
    let (digits, unit) = match arg.char_indices().find(|(_, c)| !c.is_ascii_digit()) {
        Some((i, _)) => arg.split_at(i),
        None => (arg.as_str(), "m"),
    };
    let amount: i64 = digits.parse().ok()?;
    if amount <= 0 {
        return None;
    }
    match unit {
        "s" => Duration::try_seconds(amount),
        "m" => Duration::try_minutes(amount),
        "h" => Duration::try_hours(amount),
        "d" => Duration::try_days(amount),
        _ => None,
    }
}

/// `on|enable|true|1` / `off|disable|false|0`.
pub fn parse_toggle(arg: &str) -> Option<bool> {
    match arg.trim().to_ascii_lowercase().as_str() {
        "on" | "enable" | "true" | "1" | "yes" => Some(true),
        "off" | "disable" | "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

pub fn on_off(flag: bool) -> &'static str {
    if flag { "ON" } else { "OFF" }
}

/// Short human form, largest whole unit: `90s`, `5m`, `2h`, `1d`.
pub fn format_duration(d: Duration) -> String {
    let secs = d.num_seconds();
    if secs % 86_400 == 0 && secs > 0 {
        format!("{}d", secs / 86_400)
    } else if secs % 3_600 == 0 && secs > 0 {
        format!("{}h", secs / 3_600)
    } else if secs % 60 == 0 && secs > 0 {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}

/// ` (reason: ...)` or nothing.
pub fn reason_suffix(reason: &str) -> String {
    let reason = reason.trim();
    if reason.is_empty() {
        String::new()
    } else {
        format!(" (reason: {})", reason)
    }
}

/// Registers every builtin command. Must run before the pipeline accepts events.
pub fn register_builtin_commands(registry: &mut CommandRegistry) -> Result<(), Error> {
    let handlers: Vec<Arc<dyn CommandHandler>> = vec![
        Arc::new(info::StartCommand),
        Arc::new(info::HelpCommand),
        Arc::new(info::InfoCommand),
        Arc::new(info::StatsCommand),
        Arc::new(moderation::BanCommand),
        Arc::new(moderation::KickCommand),
        Arc::new(moderation::UnbanCommand),
        Arc::new(moderation::WarnCommand),
        Arc::new(moderation::ClearWarnsCommand),
        Arc::new(moderation::WarnsCommand),
        Arc::new(moderation::MuteCommand),
        Arc::new(moderation::UnmuteCommand),
        Arc::new(moderation::PurgeCommand),
        Arc::new(moderation::PinCommand),
        Arc::new(moderation::UnpinCommand),
        Arc::new(content::NoteCommand),
        Arc::new(content::FilterCommand),
        Arc::new(group_settings::WelcomeCommand),
        Arc::new(group_settings::AntifloodCommand),
        Arc::new(group_settings::SettingsCommand),
        Arc::new(group_settings::RulesCommand),
        Arc::new(info::ChatInfoCommand),
        Arc::new(info::UserInfoCommand),
        Arc::new(info::ReportCommand),
    ];
    for handler in handlers {
        registry.register(handler)?;
    }
    Ok(())
}

/// A registry holding all builtin commands.
pub fn builtin_registry() -> Result<CommandRegistry, Error> {
    let mut registry = CommandRegistry::new();
    register_builtin_commands(&mut registry)?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration("30s"), Some(Duration::seconds(30)));
        assert_eq!(parse_duration("5m"), Some(Duration::minutes(5)));
        assert_eq!(parse_duration("2H"), Some(Duration::hours(2)));
        assert_eq!(parse_duration("1d"), Some(Duration::days(1)));
        assert_eq!(parse_duration("15"), Some(Duration::minutes(15)));
        assert_eq!(parse_duration("0m"), None);
        assert_eq!(parse_duration("5w"), None);
        assert_eq!(parse_duration("soon"), None);
        assert_eq!(parse_duration("99999999999999d"), None);
        assert_eq!(parse_duration("99999999999999999999m"), None);
    }

    #[test]
    fn test_format_duration_picks_largest_unit() {
        assert_eq!(format_duration(Duration::minutes(60)), "1h");
        assert_eq!(format_duration(Duration::seconds(90)), "90s");
        assert_eq!(format_duration(Duration::days(2)), "2d");
        assert_eq!(format_duration(Duration::minutes(15)), "15m");
    }

    #[test]
    fn test_parse_user_id_rejects_usernames() {
        assert_eq!(parse_user_id(" 42 "), Some(42));
        assert_eq!(parse_user_id("@someone"), None);
        assert_eq!(parse_user_id("abc"), None);
    }

    #[test]
    fn test_split_first_word() {
        assert_eq!(split_first_word("7 spamming a lot"), ("7", "spamming a lot"));
        assert_eq!(split_first_word("  list "), ("list", ""));
        assert_eq!(split_first_word(""), ("", ""));
    }

    #[test]
    fn test_builtin_names_are_unique() {
        let registry = builtin_registry().unwrap();
        for name in [
            "ban", "kick", "unban", "warn", "clearwarns", "mute", "unmute", "purge",
            "note", "filter", "welcome", "antiflood", "settings", "rules", "help",
        ] {
            assert!(registry.contains(name), "missing /{}", name);
        }
    }
}
