use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Inbound wire shape (Telegram-style webhook update)
// ---------------------------------------------------------------------------

/// One webhook delivery. Updates without a `message` are acknowledged and dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Update {
    #[serde(default)]
    pub update_id: Option<i64>,
    #[serde(default)]
    pub message: Option<IncomingMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub message_id: i64,
    pub chat: ChatRef,
    #[serde(default)]
    pub from: Option<UserRef>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub reply_to_message: Option<Box<IncomingMessage>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRef {
    pub id: i64,
    #[serde(rename = "type")]
    pub chat_type: ChatType,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRef {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
}

/// Chat type as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatType {
    Private,
    Group,
    Supergroup,
    Channel,
    #[serde(other)]
    Unknown,
}

/// The two chat kinds the moderation core acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatKind {
    Private,
    Group,
}

impl ChatKind {
    /// `group` and `supergroup` collapse into `Group`; channels and unknown
    /// types are not meaningful here.
    pub fn from_chat_type(chat_type: ChatType) -> Option<Self> {
        match chat_type {
            ChatType::Private => Some(ChatKind::Private),
            ChatType::Group | ChatType::Supergroup => Some(ChatKind::Group),
            ChatType::Channel | ChatType::Unknown => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Core event
// ---------------------------------------------------------------------------

/// Immutable record of one inbound message, built once per delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatEvent {
    pub chat_id: i64,
    pub sender_id: i64,
    pub message_id: i64,
    pub text: String,
    pub sender_is_admin: bool,
    pub sender_is_bot: bool,
    pub chat_kind: ChatKind,
    pub chat_title: Option<String>,
    pub sender_username: Option<String>,
    /// Sender of the message this one replies to, if any.
    pub reply_to_user_id: Option<i64>,
    pub reply_to_message_id: Option<i64>,
}

impl ChatEvent {
    /// Builds an event from a wire message. Returns `None` when the message has
    /// no sender or comes from a chat kind the core ignores. A missing text
    /// body becomes the empty string.
    pub fn from_message(message: &IncomingMessage) -> Option<Self> {
        let from = message.from.as_ref()?;
        let chat_kind = ChatKind::from_chat_type(message.chat.chat_type)?;

        Some(Self {
            chat_id: message.chat.id,
            sender_id: from.id,
            message_id: message.message_id,
            text: message.text.clone().unwrap_or_default(),
            sender_is_admin: false,
            sender_is_bot: from.is_bot,
            chat_kind,
            chat_title: message.chat.title.clone(),
            sender_username: from.username.clone(),
            reply_to_user_id: message
                .reply_to_message
                .as_ref()
                .and_then(|m| m.from.as_ref())
                .map(|u| u.id),
            reply_to_message_id: message.reply_to_message.as_ref().map(|m| m.message_id),
        })
    }

    pub fn with_admin(mut self, sender_is_admin: bool) -> Self {
        self.sender_is_admin = sender_is_admin;
        self
    }

    pub fn is_group(&self) -> bool {
        self.chat_kind == ChatKind::Group
    }

    pub fn is_private(&self) -> bool {
        self.chat_kind == ChatKind::Private
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_without_message_parses() {
        let update: Update = serde_json::from_str(r#"{"update_id": 5}"#).unwrap();
        assert!(update.message.is_none());
    }

    #[test]
    fn test_supergroup_maps_to_group() {
        let raw = r#"{
            "message": {
                "message_id": 11,
                "chat": {"id": -100, "type": "supergroup"},
                "from": {"id": 7, "is_bot": false},
                "text": "hello",
                "reply_to_message": {
                    "message_id": 10,
                    "chat": {"id": -100, "type": "supergroup"},
                    "from": {"id": 9, "is_bot": false}
                }
            }
        }"#;
        let update: Update = serde_json::from_str(raw).unwrap();
        let event = ChatEvent::from_message(update.message.as_ref().unwrap()).unwrap();
        assert_eq!(event.chat_kind, ChatKind::Group);
        assert_eq!(event.reply_to_user_id, Some(9));
        assert_eq!(event.reply_to_message_id, Some(10));
        assert!(!event.sender_is_admin);
    }

    #[test]
    fn test_channel_and_senderless_messages_are_ignored() {
        let raw = r#"{"message_id": 1, "chat": {"id": 1, "type": "channel"}, "from": {"id": 2}}"#;
        let msg: IncomingMessage = serde_json::from_str(raw).unwrap();
        assert!(ChatEvent::from_message(&msg).is_none());

        let raw = r#"{"message_id": 1, "chat": {"id": 1, "type": "private"}, "text": "hi"}"#;
        let msg: IncomingMessage = serde_json::from_str(raw).unwrap();
        assert!(ChatEvent::from_message(&msg).is_none());
    }

    #[test]
    fn test_unknown_chat_type_does_not_fail_decoding() {
        let raw = r#"{"message_id": 1, "chat": {"id": 1, "type": "forum"}, "from": {"id": 2}}"#;
        let msg: IncomingMessage = serde_json::from_str(raw).unwrap();
        assert_eq!(msg.chat.chat_type, ChatType::Unknown);
    }
}
