// File: modbot-common/src/models/mod.rs
pub mod chat;
pub mod settings;
pub mod violation;
pub mod filter;
pub mod note;
pub mod stats;

pub use chat::{ChatEvent, ChatKind, ChatType, IncomingMessage, Update};
pub use settings::ChatSettings;
pub use violation::{Escalation, EscalationState, ViolationOutcome, ViolationRecord};
pub use filter::FilterRule;
pub use note::Note;
pub use stats::{ChatStats, StatKind};
