use async_trait::async_trait;
use dashmap::DashMap;
use modbot_common::models::{ChatStats, StatKind};
use modbot_common::traits::StatsRepository;
use crate::Error;

#[derive(Default)]
pub struct InMemoryStatsRepository {
    stats: DashMap<i64, ChatStats>,
}

impl InMemoryStatsRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StatsRepository for InMemoryStatsRepository {
    async fn increment_stat(&self, chat_id: i64, kind: StatKind) -> Result<(), Error> {
        self.stats
            .entry(chat_id)
            .or_insert_with(|| ChatStats::new(chat_id))
            .increment(kind);
        Ok(())
    }

    async fn get_stats(&self, chat_id: i64) -> Result<ChatStats, Error> {
        Ok(self
            .stats
            .get(&chat_id)
            .map(|s| s.clone())
            .unwrap_or_else(|| ChatStats::new(chat_id)))
    }
}
