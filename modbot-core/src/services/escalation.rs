//! Per-(chat, user) escalation: `Clean -> Warned(n) -> Muted | Banned`.
//!
//! Every write goes through a compare-and-swap retry loop on the violation
//! store, so command-triggered and filter-triggered violations for the same
//! user never lose an increment, and the sweep never clobbers a mute that was
//! refreshed after it read the record.

use std::sync::Arc;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use modbot_common::models::{ChatSettings, Escalation, StatKind, ViolationOutcome, ViolationRecord};
use modbot_common::traits::{ChatPlatform, SettingsRepository, StatsRepository, ViolationRepository};

use crate::Error;
use crate::services::notices;

/// Upper bound on optimistic retries before giving up with `Error::Conflict`.
pub const MAX_CAS_ATTEMPTS: usize = 32;

/// Pure transition for one violation. Returns the record to write (`None` if
/// nothing changes) and what happened.
///
/// A banned user stays banned and is not counted again; the ban threshold is
/// checked before mute, and a new mute window replaces the previous one.
pub fn apply_violation(
    current: &ViolationRecord,
    settings: &ChatSettings,
    now: DateTime<Utc>,
) -> (Option<ViolationRecord>, Escalation) {
    if current.banned {
        return (None, Escalation::AlreadyBanned);
    }

    let mut next = current.clone();
    next.warning_count = next.warning_count.saturating_add(1);

    if settings.auto_ban_enabled && next.warning_count >= settings.auto_ban_after_warnings {
        next.banned = true;
        next.lift_mute();
        (Some(next), Escalation::Banned)
    } else if settings.auto_mute_enabled {
        let until = now + settings.mute_duration();
        next.set_muted_until(until);
        (Some(next), Escalation::Muted { until })
    } else {
        (Some(next), Escalation::Warned)
    }
}

/// Outbound work that follows a committed transition.
#[derive(Clone)]
struct FollowUp {
    stats: Arc<dyn StatsRepository>,
    platform: Arc<dyn ChatPlatform>,
}

impl FollowUp {
    async fn bump_stat(&self, chat_id: i64, kind: StatKind) {
        if let Err(e) = self.stats.increment_stat(chat_id, kind).await {
            warn!(chat_id, "Failed to increment {:?} stat: {:?}", kind, e);
        }
    }

    async fn notify(&self, chat_id: i64, text: &str) {
        if let Err(e) = self.platform.send_message(chat_id, text).await {
            warn!(chat_id, "Failed to send notice: {:?}", e);
        }
    }

    async fn request_ban(&self, chat_id: i64, user_id: i64) {
        match self.platform.ban_user(chat_id, user_id).await {
            Ok(true) => {
                self.bump_stat(chat_id, StatKind::Bans).await;
                self.notify(chat_id, notices::AUTO_BANNED).await;
            }
            Ok(false) => {
                warn!(chat_id, user_id, "Platform refused auto-ban");
                self.notify(chat_id, notices::ACTION_FAILED).await;
            }
            Err(e) => {
                warn!(chat_id, user_id, "Auto-ban call failed: {:?}", e);
                self.notify(chat_id, notices::ACTION_FAILED).await;
            }
        }
    }

    async fn run(self, chat_id: i64, user_id: i64, escalation: Escalation) {
        match escalation {
            Escalation::AlreadyBanned => {}
            Escalation::Warned => {
                self.bump_stat(chat_id, StatKind::Warnings).await;
            }
            Escalation::Muted { .. } => {
                self.bump_stat(chat_id, StatKind::Warnings).await;
                self.bump_stat(chat_id, StatKind::Mutes).await;
                self.notify(chat_id, notices::AUTO_MUTED).await;
            }
            Escalation::Banned => {
                self.bump_stat(chat_id, StatKind::Warnings).await;
                self.request_ban(chat_id, user_id).await;
            }
        }
    }
}

pub struct EscalationService {
    violations: Arc<dyn ViolationRepository>,
    settings: Arc<dyn SettingsRepository>,
    follow_up: FollowUp,
}

impl EscalationService {
    pub fn new(
        violations: Arc<dyn ViolationRepository>,
        settings: Arc<dyn SettingsRepository>,
        stats: Arc<dyn StatsRepository>,
        platform: Arc<dyn ChatPlatform>,
    ) -> Self {
        Self {
            violations,
            settings,
            follow_up: FollowUp { stats, platform },
        }
    }

    /// Stored settings, or `NotConfigured` when the chat has none.
    async fn configured_settings(&self, chat_id: i64) -> Result<ChatSettings, Error> {
        self.settings
            .get_settings(chat_id)
            .await?
            .ok_or(Error::NotConfigured(chat_id))
    }

    async fn effective_settings(&self, chat_id: i64) -> Result<ChatSettings, Error> {
        match self.configured_settings(chat_id).await {
            Ok(settings) => Ok(settings),
            Err(Error::NotConfigured(_)) => {
                debug!(chat_id, "No settings stored; using global defaults");
                Ok(ChatSettings::for_chat(chat_id))
            }
            Err(e) => Err(e),
        }
    }

    /// Read-modify-write with compare-and-swap. `transition` may run more than
    /// once; it returns the record to store (or `None` to leave it alone).
    async fn update_record<T, F>(
        &self,
        chat_id: i64,
        user_id: i64,
        mut transition: F,
    ) -> Result<(ViolationRecord, T), Error>
    where
        F: FnMut(&ViolationRecord) -> (Option<ViolationRecord>, T) + Send,
        T: Send,
    {
        for attempt in 1..=MAX_CAS_ATTEMPTS {
            let current = self.violations.get_or_create_record(chat_id, user_id).await?;
            let (next, out) = transition(&current);
            let Some(mut next) = next else {
                return Ok((current, out));
            };
            if self.violations.compare_and_swap(&current, &next).await? {
                next.version = current.version + 1;
                return Ok((next, out));
            }
            debug!(chat_id, user_id, attempt, "Violation record changed underneath us; retrying");
            tokio::task::yield_now().await;
        }
        Err(Error::Conflict(format!(
            "violation record {}/{} kept changing",
            chat_id, user_id
        )))
    }

    pub async fn record_violation(&self, chat_id: i64, user_id: i64) -> Result<ViolationOutcome, Error> {
        self.record_violation_at(chat_id, user_id, Utc::now()).await
    }

    /// Counts one violation and applies the chat's mute/ban policy.
    ///
    /// The ban action is requested only by the call whose swap moved the record
    /// into `banned`, so concurrent or repeated violations cannot ban twice.
    pub async fn record_violation_at(
        &self,
        chat_id: i64,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<ViolationOutcome, Error> {
        let settings = self.effective_settings(chat_id).await?;
        let (record, escalation) = self
            .update_record(chat_id, user_id, |current| apply_violation(current, &settings, now))
            .await?;

        match escalation {
            Escalation::AlreadyBanned => {
                debug!(chat_id, user_id, "Violation from banned user ignored");
            }
            Escalation::Warned => {
                info!(chat_id, user_id, "Warning {}/{}", record.warning_count, settings.auto_ban_after_warnings);
            }
            Escalation::Muted { until } => {
                info!(chat_id, user_id, "Auto-muted until {} (warning {})", until, record.warning_count);
            }
            Escalation::Banned => {
                info!(chat_id, user_id, "Auto-ban threshold reached ({} warnings)", record.warning_count);
            }
        }

        // Committed: the follow-up runs to completion even if this caller is cancelled.
        let follow_up = self.follow_up.clone().run(chat_id, user_id, escalation);
        if let Err(e) = tokio::spawn(follow_up).await {
            warn!(chat_id, user_id, "Escalation follow-up task failed: {:?}", e);
        }

        Ok(ViolationOutcome {
            record,
            escalation,
            threshold: settings.auto_ban_after_warnings,
        })
    }

    pub async fn sweep_expired_mutes(&self, chat_id: i64) -> Result<Vec<i64>, Error> {
        self.sweep_expired_mutes_at(chat_id, Utc::now()).await
    }

    /// Lifts every mute whose window ended before `now`. Each candidate is
    /// re-checked inside the swap, so a mute refreshed after the listing
    /// survives. Returns the users that were unmuted.
    pub async fn sweep_expired_mutes_at(&self, chat_id: i64, now: DateTime<Utc>) -> Result<Vec<i64>, Error> {
        let candidates: Vec<i64> = self
            .violations
            .list_records(chat_id)
            .await?
            .into_iter()
            .filter(|r| r.mute_expired_at(now))
            .map(|r| r.user_id)
            .collect();

        let mut unmuted = Vec::new();
        for user_id in candidates {
            let result = self
                .update_record(chat_id, user_id, |current| {
                    if current.mute_expired_at(now) {
                        let mut next = current.clone();
                        next.lift_mute();
                        (Some(next), true)
                    } else {
                        (None, false)
                    }
                })
                .await;
            match result {
                Ok((_, true)) => {
                    info!(chat_id, user_id, "Mute expired; user unmuted");
                    unmuted.push(user_id);
                }
                Ok((_, false)) => {
                    debug!(chat_id, user_id, "Mute refreshed since listing; left in place");
                }
                Err(e) => {
                    warn!(chat_id, user_id, "Failed to lift expired mute: {:?}", e);
                }
            }
        }
        Ok(unmuted)
    }

    /// Sweeps every chat the violation store knows about.
    pub async fn sweep_all_expired_mutes_at(&self, now: DateTime<Utc>) -> Result<usize, Error> {
        let mut total = 0;
        for chat_id in self.violations.list_chats().await? {
            match self.sweep_expired_mutes_at(chat_id, now).await {
                Ok(users) => total += users.len(),
                Err(e) => warn!(chat_id, "Mute sweep failed: {:?}", e),
            }
        }
        Ok(total)
    }

    /// Moderator reset: zero warnings, no mute, no ban. Idempotent.
    pub async fn clear(&self, chat_id: i64, user_id: i64) -> Result<ViolationRecord, Error> {
        let (record, changed) = self
            .update_record(chat_id, user_id, |current| {
                if current.warning_count == 0 && !current.muted && !current.banned {
                    return (None, false);
                }
                let mut next = current.clone();
                next.warning_count = 0;
                next.lift_mute();
                next.banned = false;
                (Some(next), true)
            })
            .await?;
        if changed {
            info!(chat_id, user_id, "Violation record cleared");
        }
        Ok(record)
    }

    /// Explicit moderator mute; does not count as a violation. Returns `None`
    /// for banned users, who never re-enter `Muted`.
    pub async fn mute_until(
        &self,
        chat_id: i64,
        user_id: i64,
        until: DateTime<Utc>,
    ) -> Result<Option<ViolationRecord>, Error> {
        let (record, applied) = self
            .update_record(chat_id, user_id, |current| {
                if current.banned {
                    return (None, false);
                }
                let mut next = current.clone();
                next.set_muted_until(until);
                (Some(next), true)
            })
            .await?;
        if applied {
            info!(chat_id, user_id, "Muted until {}", until);
            self.follow_up.bump_stat(chat_id, StatKind::Mutes).await;
            Ok(Some(record))
        } else {
            Ok(None)
        }
    }

    /// Lifts a mute; warnings are kept. Returns whether the user was muted.
    pub async fn unmute(&self, chat_id: i64, user_id: i64) -> Result<bool, Error> {
        let (_, lifted) = self
            .update_record(chat_id, user_id, |current| {
                if !current.muted {
                    return (None, false);
                }
                let mut next = current.clone();
                next.lift_mute();
                (Some(next), true)
            })
            .await?;
        if lifted {
            info!(chat_id, user_id, "Unmuted by moderator");
        }
        Ok(lifted)
    }

    pub async fn record(&self, chat_id: i64, user_id: i64) -> Result<ViolationRecord, Error> {
        self.violations.get_or_create_record(chat_id, user_id).await
    }
}
