use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatKind {
    Messages,
    Warnings,
    Bans,
    Kicks,
    Mutes,
    Notes,
}

/// Per-chat counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatStats {
    pub chat_id: i64,
    pub total_messages: u64,
    pub users_warned: u64,
    pub users_banned: u64,
    pub users_kicked: u64,
    pub users_muted: u64,
    pub notes_saved: u64,
}

impl ChatStats {
    pub fn new(chat_id: i64) -> Self {
        Self { chat_id, ..Default::default() }
    }

    pub fn increment(&mut self, kind: StatKind) {
        *self.counter_mut(kind) += 1;
    }

    pub fn get(&self, kind: StatKind) -> u64 {
        match kind {
            StatKind::Messages => self.total_messages,
            StatKind::Warnings => self.users_warned,
            StatKind::Bans => self.users_banned,
            StatKind::Kicks => self.users_kicked,
            StatKind::Mutes => self.users_muted,
            StatKind::Notes => self.notes_saved,
        }
    }

    fn counter_mut(&mut self, kind: StatKind) -> &mut u64 {
        match kind {
            StatKind::Messages => &mut self.total_messages,
            StatKind::Warnings => &mut self.users_warned,
            StatKind::Bans => &mut self.users_banned,
            StatKind::Kicks => &mut self.users_kicked,
            StatKind::Mutes => &mut self.users_muted,
            StatKind::Notes => &mut self.notes_saved,
        }
    }
}
