use async_trait::async_trait;
use dashmap::DashMap;
use modbot_common::models::ChatSettings;
use modbot_common::traits::SettingsRepository;
use crate::Error;

#[derive(Default)]
pub struct InMemorySettingsRepository {
    settings: DashMap<i64, ChatSettings>,
}

impl InMemorySettingsRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsRepository for InMemorySettingsRepository {
    async fn get_settings(&self, chat_id: i64) -> Result<Option<ChatSettings>, Error> {
        Ok(self.settings.get(&chat_id).map(|s| s.clone()))
    }

    async fn save_settings(&self, settings: &ChatSettings) -> Result<(), Error> {
        self.settings.insert(settings.chat_id, settings.clone());
        Ok(())
    }
}
