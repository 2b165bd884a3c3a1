use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BAN_THRESHOLD: u32 = 3;
pub const DEFAULT_MUTE_MINUTES: u32 = 60;
pub const DEFAULT_WELCOME_TEXT: &str = "Welcome to our group!";

/// Per-chat moderation configuration. Chats without stored settings use
/// `ChatSettings::for_chat`, which carries the global defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSettings {
    pub chat_id: i64,

    pub antiflood_enabled: bool,

    pub welcome_enabled: bool,
    pub welcome_text: String,

    pub auto_warn_enabled: bool,

    pub auto_mute_enabled: bool,
    /// Minutes.
    pub auto_mute_duration: u32,

    pub auto_ban_enabled: bool,
    pub auto_ban_after_warnings: u32,

    pub filter_enabled: bool,

    pub rules_text: Option<String>,

    pub updated_at: DateTime<Utc>,
}

impl ChatSettings {
    pub fn for_chat(chat_id: i64) -> Self {
        Self {
            chat_id,
            antiflood_enabled: true,
            welcome_enabled: true,
            welcome_text: DEFAULT_WELCOME_TEXT.to_string(),
            auto_warn_enabled: true,
            auto_mute_enabled: false,
            auto_mute_duration: DEFAULT_MUTE_MINUTES,
            auto_ban_enabled: true,
            auto_ban_after_warnings: DEFAULT_BAN_THRESHOLD,
            filter_enabled: true,
            rules_text: None,
            updated_at: Utc::now(),
        }
    }

    pub fn mute_duration(&self) -> Duration {
        Duration::minutes(i64::from(self.auto_mute_duration))
    }
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self::for_chat(0)
    }
}
