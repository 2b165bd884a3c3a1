// File: modbot-core/src/test_utils/mod.rs
//! Test doubles and fixtures shared by unit and integration tests.

pub mod fixtures;

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use async_trait::async_trait;

use modbot_common::traits::ChatPlatform;

use crate::Error;

pub use fixtures::{group_event, group_reply_update, group_update, private_update};

fn locked<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Records every outbound call. Moderation actions can be told to fail, and
/// admins are whatever `add_admin` was given.
#[derive(Default)]
pub struct RecordingPlatform {
    sent: Mutex<Vec<(i64, String)>>,
    bans: Mutex<Vec<(i64, i64)>>,
    unbans: Mutex<Vec<(i64, i64)>>,
    kicks: Mutex<Vec<(i64, i64)>>,
    deleted: Mutex<Vec<(i64, i64)>>,
    pinned: Mutex<Vec<(i64, i64)>>,
    unpinned: Mutex<Vec<(i64, Option<i64>)>>,
    admins: Mutex<HashSet<(i64, i64)>>,
    admin_lookups: AtomicUsize,
    fail_actions: AtomicBool,
    ban_delay_ms: AtomicU64,
}

impl RecordingPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_admin(&self, chat_id: i64, user_id: i64) {
        locked(&self.admins).insert((chat_id, user_id));
    }

    /// When set, every moderation action returns a platform error.
    pub fn set_fail_actions(&self, fail: bool) {
        self.fail_actions.store(fail, Ordering::SeqCst);
    }

    /// Makes `ban_user` take this long before it records the ban.
    pub fn set_ban_delay(&self, delay: Duration) {
        self.ban_delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<(i64, String)> {
        locked(&self.sent).clone()
    }

    pub fn sent_texts(&self, chat_id: i64) -> Vec<String> {
        locked(&self.sent)
            .iter()
            .filter(|(c, _)| *c == chat_id)
            .map(|(_, t)| t.clone())
            .collect()
    }

    pub fn bans(&self) -> Vec<(i64, i64)> {
        locked(&self.bans).clone()
    }

    pub fn unbans(&self) -> Vec<(i64, i64)> {
        locked(&self.unbans).clone()
    }

    pub fn kicks(&self) -> Vec<(i64, i64)> {
        locked(&self.kicks).clone()
    }

    pub fn deleted(&self) -> Vec<(i64, i64)> {
        locked(&self.deleted).clone()
    }

    pub fn pinned(&self) -> Vec<(i64, i64)> {
        locked(&self.pinned).clone()
    }

    pub fn unpinned(&self) -> Vec<(i64, Option<i64>)> {
        locked(&self.unpinned).clone()
    }

    pub fn admin_lookups(&self) -> usize {
        self.admin_lookups.load(Ordering::SeqCst)
    }

    fn action<T>(&self, log: &Mutex<Vec<T>>, entry: T) -> Result<bool, Error> {
        if self.fail_actions.load(Ordering::SeqCst) {
            return Err(Error::Platform("simulated platform failure".into()));
        }
        locked(log).push(entry);
        Ok(true)
    }
}

#[async_trait]
impl ChatPlatform for RecordingPlatform {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), Error> {
        locked(&self.sent).push((chat_id, text.to_string()));
        Ok(())
    }

    async fn ban_user(&self, chat_id: i64, user_id: i64) -> Result<bool, Error> {
        let delay = self.ban_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        self.action(&self.bans, (chat_id, user_id))
    }

    async fn unban_user(&self, chat_id: i64, user_id: i64) -> Result<bool, Error> {
        self.action(&self.unbans, (chat_id, user_id))
    }

    async fn kick_user(&self, chat_id: i64, user_id: i64) -> Result<bool, Error> {
        self.action(&self.kicks, (chat_id, user_id))
    }

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<bool, Error> {
        self.action(&self.deleted, (chat_id, message_id))
    }

    async fn pin_message(&self, chat_id: i64, message_id: i64) -> Result<bool, Error> {
        self.action(&self.pinned, (chat_id, message_id))
    }

    async fn unpin_message(&self, chat_id: i64, message_id: Option<i64>) -> Result<bool, Error> {
        self.action(&self.unpinned, (chat_id, message_id))
    }

    async fn is_chat_admin(&self, chat_id: i64, user_id: i64) -> Result<bool, Error> {
        self.admin_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(locked(&self.admins).contains(&(chat_id, user_id)))
    }
}
