// File: modbot-core/src/test_utils/fixtures.rs

use serde_json::json;
use modbot_common::models::{ChatEvent, ChatKind};

/// Webhook body for a group message, as the platform would post it.
pub fn group_update(chat_id: i64, user_id: i64, message_id: i64, text: &str) -> Vec<u8> {
    json!({
        "update_id": message_id,
        "message": {
            "message_id": message_id,
            "chat": {"id": chat_id, "type": "supergroup", "title": "Test Group"},
            "from": {"id": user_id, "is_bot": false, "username": format!("user{}", user_id)},
            "text": text
        }
    })
    .to_string()
    .into_bytes()
}

pub fn private_update(user_id: i64, message_id: i64, text: &str) -> Vec<u8> {
    json!({
        "update_id": message_id,
        "message": {
            "message_id": message_id,
            "chat": {"id": user_id, "type": "private"},
            "from": {"id": user_id, "is_bot": false},
            "text": text
        }
    })
    .to_string()
    .into_bytes()
}

/// Group message replying to a message of `reply_to_user`.
pub fn group_reply_update(
    chat_id: i64,
    user_id: i64,
    message_id: i64,
    text: &str,
    reply_to_user: i64,
    reply_to_message: i64,
) -> Vec<u8> {
    json!({
        "message": {
            "message_id": message_id,
            "chat": {"id": chat_id, "type": "group"},
            "from": {"id": user_id, "is_bot": false},
            "text": text,
            "reply_to_message": {
                "message_id": reply_to_message,
                "chat": {"id": chat_id, "type": "group"},
                "from": {"id": reply_to_user, "is_bot": false}
            }
        }
    })
    .to_string()
    .into_bytes()
}

pub fn group_event(chat_id: i64, user_id: i64, message_id: i64, text: &str, is_admin: bool) -> ChatEvent {
    ChatEvent {
        chat_id,
        sender_id: user_id,
        message_id,
        text: text.to_string(),
        sender_is_admin: is_admin,
        sender_is_bot: false,
        chat_kind: ChatKind::Group,
        chat_title: None,
        sender_username: None,
        reply_to_user_id: None,
        reply_to_message_id: None,
    }
}
