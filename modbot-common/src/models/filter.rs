use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A chat-scoped substitution rule. Rules apply in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRule {
    pub chat_id: i64,
    pub pattern: String,
    pub replacement: String,
    pub is_regex: bool,
    pub created_at: DateTime<Utc>,
}

impl FilterRule {
    pub fn literal(chat_id: i64, pattern: &str, replacement: &str) -> Self {
        Self {
            chat_id,
            pattern: pattern.to_string(),
            replacement: replacement.to_string(),
            is_regex: false,
            created_at: Utc::now(),
        }
    }

    pub fn regex(chat_id: i64, pattern: &str, replacement: &str) -> Self {
        Self {
            is_regex: true,
            ..Self::literal(chat_id, pattern, replacement)
        }
    }
}
