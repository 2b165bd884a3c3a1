use async_trait::async_trait;
use crate::error::Error;
use crate::models::{ChatSettings, ChatStats, FilterRule, Note, StatKind, ViolationRecord};

#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn get_settings(&self, chat_id: i64) -> Result<Option<ChatSettings>, Error>;
    async fn save_settings(&self, settings: &ChatSettings) -> Result<(), Error>;
}

/// Counter store for escalation state.
///
/// Writers must go through `compare_and_swap` so that two concurrent
/// violations for the same user cannot both read the same prior count.
#[async_trait]
pub trait ViolationRepository: Send + Sync {
    async fn get_or_create_record(&self, chat_id: i64, user_id: i64) -> Result<ViolationRecord, Error>;

    /// Replaces the stored record with `new` iff the stored version still equals
    /// `expected.version`. On success the stored version becomes
    /// `expected.version + 1`. Returns whether the swap happened.
    async fn compare_and_swap(&self, expected: &ViolationRecord, new: &ViolationRecord) -> Result<bool, Error>;

    /// Unconditional write; bumps the version.
    async fn save_record(&self, record: &ViolationRecord) -> Result<(), Error>;

    async fn list_records(&self, chat_id: i64) -> Result<Vec<ViolationRecord>, Error>;
    async fn list_chats(&self) -> Result<Vec<i64>, Error>;
}

#[async_trait]
pub trait FilterRepository: Send + Sync {
    async fn add_filter(&self, rule: &FilterRule) -> Result<(), Error>;
    /// Removes every rule of the chat with this exact pattern.
    async fn remove_filter(&self, chat_id: i64, pattern: &str) -> Result<bool, Error>;
    /// Rules in insertion order.
    async fn list_filters(&self, chat_id: i64) -> Result<Vec<FilterRule>, Error>;
}

#[async_trait]
pub trait NoteRepository: Send + Sync {
    async fn save_note(&self, note: &Note) -> Result<(), Error>;
    async fn get_note(&self, chat_id: i64, key: &str) -> Result<Option<Note>, Error>;
    async fn list_notes(&self, chat_id: i64) -> Result<Vec<Note>, Error>;
    async fn delete_note(&self, chat_id: i64, key: &str) -> Result<bool, Error>;
}

#[async_trait]
pub trait StatsRepository: Send + Sync {
    async fn increment_stat(&self, chat_id: i64, kind: StatKind) -> Result<(), Error>;
    async fn get_stats(&self, chat_id: i64) -> Result<ChatStats, Error>;
}
