use std::sync::Arc;
use modbot_common::models::ChatSettings;
use modbot_common::traits::{
    ChatPlatform, FilterRepository, NoteRepository, SettingsRepository, StatsRepository,
    ViolationRepository,
};
use tracing::warn;

use crate::Error;
use crate::repositories::memory::{
    InMemoryFilterRepository, InMemoryNoteRepository, InMemorySettingsRepository,
    InMemoryStatsRepository, InMemoryViolationRepository,
};
use crate::services::escalation::EscalationService;

/// EventContext bundles the collaborators command handlers and the ingestion
/// pipeline need, so a single object is passed around instead of many
/// parameters.
#[derive(Clone)]
pub struct EventContext {
    pub platform: Arc<dyn ChatPlatform>,
    pub escalation: Arc<EscalationService>,
    pub settings_repo: Arc<dyn SettingsRepository>,
    pub violation_repo: Arc<dyn ViolationRepository>,
    pub filter_repo: Arc<dyn FilterRepository>,
    pub note_repo: Arc<dyn NoteRepository>,
    pub stats_repo: Arc<dyn StatsRepository>,
}

impl EventContext {
    pub fn new(
        platform: Arc<dyn ChatPlatform>,
        settings_repo: Arc<dyn SettingsRepository>,
        violation_repo: Arc<dyn ViolationRepository>,
        filter_repo: Arc<dyn FilterRepository>,
        note_repo: Arc<dyn NoteRepository>,
        stats_repo: Arc<dyn StatsRepository>,
    ) -> Self {
        let escalation = Arc::new(EscalationService::new(
            violation_repo.clone(),
            settings_repo.clone(),
            stats_repo.clone(),
            platform.clone(),
        ));
        Self {
            platform,
            escalation,
            settings_repo,
            violation_repo,
            filter_repo,
            note_repo,
            stats_repo,
        }
    }

    /// Context over fresh in-memory stores.
    pub fn in_memory(platform: Arc<dyn ChatPlatform>) -> Self {
        Self::new(
            platform,
            Arc::new(InMemorySettingsRepository::new()),
            Arc::new(InMemoryViolationRepository::new()),
            Arc::new(InMemoryFilterRepository::new()),
            Arc::new(InMemoryNoteRepository::new()),
            Arc::new(InMemoryStatsRepository::new()),
        )
    }

    /// Stored settings, or the global defaults for chats that have none.
    pub async fn settings_or_default(&self, chat_id: i64) -> Result<ChatSettings, Error> {
        Ok(self
            .settings_repo
            .get_settings(chat_id)
            .await?
            .unwrap_or_else(|| ChatSettings::for_chat(chat_id)))
    }

    /// Sends a chat notice; delivery failures are logged, never propagated.
    pub async fn notify(&self, chat_id: i64, text: &str) {
        if let Err(e) = self.platform.send_message(chat_id, text).await {
            warn!(chat_id, "Failed to send notice: {:?}", e);
        }
    }
}
