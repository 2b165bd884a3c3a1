//! modbot-server/src/context.rs
//!
//! Assembles the long-lived services the server runs on.

use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use modbot_common::traits::ChatPlatform;
use modbot_core::Error;
use modbot_core::platforms::telegram::TelegramClient;
use modbot_core::services::commands::register_builtin_commands;
use modbot_core::services::{CommandRegistry, EscalationService, EventContext, IngestionConfig, IngestionPipeline};

use crate::Args;

pub struct ServerContext {
    pub escalation: Arc<EscalationService>,
    pub pipeline: Arc<IngestionPipeline>,
}

impl ServerContext {
    pub fn new(args: &Args) -> Result<Self, Error> {
        let platform: Arc<dyn ChatPlatform> = Arc::new(TelegramClient::new(&args.api_base, &args.bot_token)?);
        let services = EventContext::in_memory(platform);

        // The registry is complete before the pipeline sees any event and is
        // never written again.
        let mut registry = CommandRegistry::new();
        register_builtin_commands(&mut registry)?;
        info!("Registered {} commands", registry.len());

        let config = IngestionConfig {
            event_timeout: Duration::from_millis(args.event_timeout_ms),
            dedupe_window: Duration::from_secs(args.dedupe_window_secs),
            ..IngestionConfig::default()
        };
        let escalation = services.escalation.clone();
        let pipeline = Arc::new(IngestionPipeline::new(services, Arc::new(registry), config));

        Ok(Self {
            escalation,
            pipeline,
        })
    }
}
