use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use modbot_common::models::ViolationRecord;
use modbot_common::traits::ViolationRepository;
use crate::Error;

/// Violation records keyed by `(chat_id, user_id)`.
///
/// DashMap holds the shard lock for the duration of an `entry`, so the
/// version check and the write in `compare_and_swap` happen atomically.
#[derive(Default)]
pub struct InMemoryViolationRepository {
    records: DashMap<(i64, i64), ViolationRecord>,
}

impl InMemoryViolationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ViolationRepository for InMemoryViolationRepository {
    async fn get_or_create_record(&self, chat_id: i64, user_id: i64) -> Result<ViolationRecord, Error> {
        let record = self
            .records
            .entry((chat_id, user_id))
            .or_insert_with(|| ViolationRecord::new(chat_id, user_id))
            .clone();
        Ok(record)
    }

    async fn compare_and_swap(&self, expected: &ViolationRecord, new: &ViolationRecord) -> Result<bool, Error> {
        let key = (expected.chat_id, expected.user_id);
        let mut stored = new.clone();
        stored.version = expected.version + 1;
        stored.updated_at = Utc::now();

        match self.records.entry(key) {
            Entry::Occupied(mut slot) => {
                if slot.get().version != expected.version {
                    return Ok(false);
                }
                slot.insert(stored);
                Ok(true)
            }
            Entry::Vacant(slot) => {
                if expected.version != 0 {
                    return Ok(false);
                }
                slot.insert(stored);
                Ok(true)
            }
        }
    }

    async fn save_record(&self, record: &ViolationRecord) -> Result<(), Error> {
        let key = (record.chat_id, record.user_id);
        let mut entry = self
            .records
            .entry(key)
            .or_insert_with(|| ViolationRecord::new(record.chat_id, record.user_id));
        let next_version = entry.version + 1;
        *entry = record.clone();
        entry.version = next_version;
        entry.updated_at = Utc::now();
        Ok(())
    }

    async fn list_records(&self, chat_id: i64) -> Result<Vec<ViolationRecord>, Error> {
        let mut records: Vec<ViolationRecord> = self
            .records
            .iter()
            .filter(|r| r.key().0 == chat_id)
            .map(|r| r.value().clone())
            .collect();
        records.sort_by_key(|r| r.user_id);
        Ok(records)
    }

    async fn list_chats(&self) -> Result<Vec<i64>, Error> {
        let mut chats: Vec<i64> = self.records.iter().map(|r| r.key().0).collect();
        chats.sort_unstable();
        chats.dedup();
        Ok(chats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stale_swap_is_rejected() -> Result<(), Error> {
        let repo = InMemoryViolationRepository::new();
        let first = repo.get_or_create_record(1, 2).await?;

        let mut bumped = first.clone();
        bumped.warning_count = 1;
        assert!(repo.compare_and_swap(&first, &bumped).await?);

        // Same expected version again: someone else already won.
        let mut competing = first.clone();
        competing.warning_count = 1;
        assert!(!repo.compare_and_swap(&first, &competing).await?);

        let stored = repo.get_or_create_record(1, 2).await?;
        assert_eq!(stored.warning_count, 1);
        assert_eq!(stored.version, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_chats_is_deduplicated() -> Result<(), Error> {
        let repo = InMemoryViolationRepository::new();
        repo.get_or_create_record(5, 1).await?;
        repo.get_or_create_record(5, 2).await?;
        repo.get_or_create_record(3, 1).await?;
        assert_eq!(repo.list_chats().await?, vec![3, 5]);
        assert_eq!(repo.list_records(5).await?.len(), 2);
        Ok(())
    }
}
