use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-(chat, user) escalation state.
///
/// `muted_until` is `Some` exactly when `muted` is true. `version` is bumped by
/// the store on every successful compare-and-swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationRecord {
    pub chat_id: i64,
    pub user_id: i64,
    pub warning_count: u32,
    pub muted: bool,
    pub muted_until: Option<DateTime<Utc>>,
    pub banned: bool,
    pub version: u64,
    pub updated_at: DateTime<Utc>,
}

impl ViolationRecord {
    pub fn new(chat_id: i64, user_id: i64) -> Self {
        Self {
            chat_id,
            user_id,
            warning_count: 0,
            muted: false,
            muted_until: None,
            banned: false,
            version: 0,
            updated_at: Utc::now(),
        }
    }

    pub fn state(&self) -> EscalationState {
        if self.banned {
            EscalationState::Banned
        } else if self.muted {
            EscalationState::Muted
        } else if self.warning_count > 0 {
            EscalationState::Warned(self.warning_count)
        } else {
            EscalationState::Clean
        }
    }

    /// True when the record is muted and its window ended strictly before `now`.
    pub fn mute_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.muted && self.muted_until.is_some_and(|until| until < now)
    }

    pub fn set_muted_until(&mut self, until: DateTime<Utc>) {
        self.muted = true;
        self.muted_until = Some(until);
    }

    pub fn lift_mute(&mut self) {
        self.muted = false;
        self.muted_until = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationState {
    Clean,
    Warned(u32),
    Muted,
    Banned,
}

/// What a single `record_violation` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escalation {
    /// Counted only; neither mute nor ban is enabled for this chat.
    Warned,
    /// Mute window (re)started.
    Muted { until: DateTime<Utc> },
    /// Threshold reached on this violation; the ban action was requested.
    Banned,
    /// The user was already banned; nothing else happened.
    AlreadyBanned,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViolationOutcome {
    pub record: ViolationRecord,
    pub escalation: Escalation,
    pub threshold: u32,
}
