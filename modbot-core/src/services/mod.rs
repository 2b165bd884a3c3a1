pub mod command_registry;
pub mod command_dispatcher;
pub mod commands;
pub mod delivery_log;
pub mod escalation;
pub mod event_context;
pub mod filter_engine;
pub mod ingestion;
pub mod notices;
pub mod permissions;

pub use command_dispatcher::{CommandDispatcher, DispatchOutcome};
pub use command_registry::CommandRegistry;
pub use escalation::EscalationService;
pub use event_context::EventContext;
pub use filter_engine::FilterEngine;
pub use ingestion::{Ack, IngestionConfig, IngestionPipeline};
