use async_trait::async_trait;
use dashmap::DashMap;
use modbot_common::models::FilterRule;
use modbot_common::traits::FilterRepository;
use crate::Error;

#[derive(Default)]
pub struct InMemoryFilterRepository {
    filters: DashMap<i64, Vec<FilterRule>>,
}

impl InMemoryFilterRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FilterRepository for InMemoryFilterRepository {
    async fn add_filter(&self, rule: &FilterRule) -> Result<(), Error> {
        self.filters.entry(rule.chat_id).or_default().push(rule.clone());
        Ok(())
    }

    async fn remove_filter(&self, chat_id: i64, pattern: &str) -> Result<bool, Error> {
        let Some(mut rules) = self.filters.get_mut(&chat_id) else {
            return Ok(false);
        };
        let before = rules.len();
        rules.retain(|r| r.pattern != pattern);
        Ok(rules.len() != before)
    }

    async fn list_filters(&self, chat_id: i64) -> Result<Vec<FilterRule>, Error> {
        Ok(self
            .filters
            .get(&chat_id)
            .map(|rules| rules.clone())
            .unwrap_or_default())
    }
}
