use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A saved chat note, keyed by `(chat_id, key)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub chat_id: i64,
    pub key: String,
    pub content: String,
    pub updated_at: DateTime<Utc>,
}
