use async_trait::async_trait;
use crate::error::Error;

/// Outbound calls to the chat platform.
///
/// `Ok(false)` means the platform refused the action (missing rights, unknown
/// user, ...). `Err` means the call itself failed. Callers treat both as a
/// failed action and only use the distinction for logging.
#[cfg_attr(feature = "mocks", mockall::automock)]
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), Error>;
    async fn ban_user(&self, chat_id: i64, user_id: i64) -> Result<bool, Error>;
    async fn unban_user(&self, chat_id: i64, user_id: i64) -> Result<bool, Error>;
    async fn kick_user(&self, chat_id: i64, user_id: i64) -> Result<bool, Error>;
    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<bool, Error>;
    async fn pin_message(&self, chat_id: i64, message_id: i64) -> Result<bool, Error>;
    async fn unpin_message(&self, chat_id: i64, message_id: Option<i64>) -> Result<bool, Error>;

    /// Admin-list resolution for group chats.
    async fn is_chat_admin(&self, chat_id: i64, user_id: i64) -> Result<bool, Error>;
}
