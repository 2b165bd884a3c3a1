// File: src/platforms/telegram/client.rs

use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, warn};

use modbot_common::traits::ChatPlatform;
use crate::Error;

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";
/// Bound on one Bot API round trip.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Envelope every Bot API method answers with.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatMember {
    status: String,
}

/// Bot API client implementing the outbound moderation calls.
#[derive(Clone)]
pub struct TelegramClient {
    http: ReqwestClient,
    method_base: String,
}

impl TelegramClient {
    pub fn new(api_base: &str, bot_token: &str) -> Result<Self, Error> {
        let http = ReqwestClient::builder()
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()?;
        Ok(Self::with_client(http, api_base, bot_token))
    }

    pub fn with_client(http: ReqwestClient, api_base: &str, bot_token: &str) -> Self {
        let method_base = format!("{}/bot{}", api_base.trim_end_matches('/'), bot_token);
        Self { http, method_base }
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, payload: Value) -> Result<T, Error> {
        let url = format!("{}/{}", self.method_base, method);
        debug!("Telegram call {}", method);

        let resp = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await?
            .json::<ApiResponse<T>>()
            .await?;

        if !resp.ok {
            return Err(Error::Platform(format!(
                "{} rejected: {}",
                method,
                resp.description.unwrap_or_else(|| "no description".into())
            )));
        }
        resp.result
            .ok_or_else(|| Error::Platform(format!("{} returned no result", method)))
    }

    /// Calls a method whose result is a bare `true`. A platform-side refusal
    /// becomes `Ok(false)`; transport failures stay errors.
    async fn call_flag(&self, method: &str, payload: Value) -> Result<bool, Error> {
        match self.call::<bool>(method, payload).await {
            Ok(flag) => Ok(flag),
            Err(Error::Platform(msg)) => {
                warn!("{}", msg);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl ChatPlatform for TelegramClient {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), Error> {
        self.call::<Value>("sendMessage", json!({ "chat_id": chat_id, "text": text }))
            .await?;
        Ok(())
    }

    async fn ban_user(&self, chat_id: i64, user_id: i64) -> Result<bool, Error> {
        self.call_flag("banChatMember", json!({ "chat_id": chat_id, "user_id": user_id }))
            .await
    }

    async fn unban_user(&self, chat_id: i64, user_id: i64) -> Result<bool, Error> {
        self.call_flag(
            "unbanChatMember",
            json!({ "chat_id": chat_id, "user_id": user_id, "only_if_banned": true }),
        )
        .await
    }

    /// The Bot API has no kick; ban then immediately unban so the user may rejoin.
    async fn kick_user(&self, chat_id: i64, user_id: i64) -> Result<bool, Error> {
        if !self.ban_user(chat_id, user_id).await? {
            return Ok(false);
        }
        self.call_flag(
            "unbanChatMember",
            json!({ "chat_id": chat_id, "user_id": user_id }),
        )
        .await
    }

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<bool, Error> {
        self.call_flag(
            "deleteMessage",
            json!({ "chat_id": chat_id, "message_id": message_id }),
        )
        .await
    }

    async fn pin_message(&self, chat_id: i64, message_id: i64) -> Result<bool, Error> {
        self.call_flag(
            "pinChatMessage",
            json!({ "chat_id": chat_id, "message_id": message_id, "disable_notification": true }),
        )
        .await
    }

    async fn unpin_message(&self, chat_id: i64, message_id: Option<i64>) -> Result<bool, Error> {
        let payload = match message_id {
            Some(id) => json!({ "chat_id": chat_id, "message_id": id }),
            None => json!({ "chat_id": chat_id }),
        };
        self.call_flag("unpinChatMessage", payload).await
    }

    async fn is_chat_admin(&self, chat_id: i64, user_id: i64) -> Result<bool, Error> {
        let member: ChatMember = self
            .call("getChatMember", json!({ "chat_id": chat_id, "user_id": user_id }))
            .await?;
        Ok(matches!(member.status.as_str(), "creator" | "administrator"))
    }
}
