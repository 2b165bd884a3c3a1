// File: modbot-core/src/services/ingestion.rs

use std::sync::Arc;
use std::time::Duration;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use modbot_common::models::{ChatEvent, ChatSettings, StatKind, Update};

use crate::services::command_dispatcher::{parse_invocation, CommandDispatcher, COMMAND_SIGIL};
use crate::services::command_registry::CommandRegistry;
use crate::services::delivery_log::{DeliveryLog, DEFAULT_CAPACITY};
use crate::services::event_context::EventContext;
use crate::services::filter_engine::FilterEngine;
use crate::services::notices;

#[derive(Debug, Clone)]
pub struct IngestionConfig {
    /// Budget for one event, command or filter path alike.
    pub event_timeout: Duration,
    pub dedupe_window: Duration,
    pub dedupe_capacity: usize,
}

impl IngestionConfig {
    /// Share of the event budget a command handler gets. The rest covers the
    /// stat bump and the admin lookup, so a slow handler is cut off by the
    /// dispatcher before the whole event is dropped.
    pub fn command_timeout(&self) -> Duration {
        self.event_timeout * 4 / 5
    }
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            event_timeout: Duration::from_millis(5000),
            dedupe_window: Duration::from_secs(600),
            dedupe_capacity: DEFAULT_CAPACITY,
        }
    }
}

/// Acknowledgement for one delivery. Every variant maps to a 2xx upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ack {
    Processed,
    /// No message body, undecodable payload, or a chat kind the bot ignores.
    Ignored,
    /// Same `(chat, message)` seen inside the dedupe window.
    Duplicate,
    /// Dropped after exceeding the per-event budget.
    TimedOut,
}

/// Top-level entry point: classifies each delivery and routes it to the
/// dispatcher or the filter engine. Events of one chat run one at a time;
/// different chats run in parallel.
pub struct IngestionPipeline {
    context: EventContext,
    dispatcher: CommandDispatcher,
    filters: FilterEngine,
    deliveries: DeliveryLog,
    chat_locks: DashMap<i64, Arc<Mutex<()>>>,
    config: IngestionConfig,
}

impl IngestionPipeline {
    /// `registry` must be fully populated; it is read-only from here on.
    pub fn new(context: EventContext, registry: Arc<CommandRegistry>, config: IngestionConfig) -> Self {
        let dispatcher = CommandDispatcher::new(registry, context.clone()).with_timeout(config.command_timeout());
        let filters = FilterEngine::new(context.filter_repo.clone());
        let window = chrono::Duration::from_std(config.dedupe_window)
            .unwrap_or_else(|_| chrono::Duration::minutes(10));
        let deliveries = DeliveryLog::new(window, config.dedupe_capacity);

        Self {
            context,
            dispatcher,
            filters,
            deliveries,
            chat_locks: DashMap::new(),
            config,
        }
    }

    pub fn context(&self) -> &EventContext {
        &self.context
    }

    pub fn dispatcher(&self) -> &CommandDispatcher {
        &self.dispatcher
    }

    /// Decodes a raw webhook body. Undecodable input is acknowledged and dropped.
    pub async fn ingest(&self, raw: &[u8]) -> Ack {
        match serde_json::from_slice::<Update>(raw) {
            Ok(update) => self.ingest_update(update).await,
            Err(e) => {
                warn!("Dropping undecodable update: {}", e);
                Ack::Ignored
            }
        }
    }

    pub async fn ingest_update(&self, update: Update) -> Ack {
        let Some(message) = update.message else {
            debug!(update_id = ?update.update_id, "Update without message; acknowledged");
            return Ack::Ignored;
        };
        let Some(event) = ChatEvent::from_message(&message) else {
            debug!(chat_id = message.chat.id, "Message from unsupported chat or without sender; acknowledged");
            return Ack::Ignored;
        };

        if !self.deliveries.first_seen(event.chat_id, event.message_id) {
            debug!(chat_id = event.chat_id, message_id = event.message_id, "Duplicate delivery; acknowledged");
            return Ack::Duplicate;
        }

        let chat_id = event.chat_id;
        let lock = self.chat_lock(chat_id);
        let serial = lock.lock().await;

        let ack = match tokio::time::timeout(self.config.event_timeout, self.process(event)).await {
            Ok(()) => Ack::Processed,
            Err(_) => {
                warn!(chat_id, "Event exceeded {:?}; dropped", self.config.event_timeout);
                Ack::TimedOut
            }
        };

        drop(serial);
        drop(lock);
        self.release_chat_lock(chat_id);
        ack
    }

    fn chat_lock(&self, chat_id: i64) -> Arc<Mutex<()>> {
        self.chat_locks.entry(chat_id).or_default().clone()
    }

    /// Forgets the chat's lock once no other event holds or waits on it.
    fn release_chat_lock(&self, chat_id: i64) {
        self.chat_locks.remove_if(&chat_id, |_, lock| Arc::strong_count(lock) == 1);
    }

    /// Chats with an event in flight.
    pub fn active_chats(&self) -> usize {
        self.chat_locks.len()
    }

    async fn process(&self, event: ChatEvent) {
        if let Err(e) = self.context.stats_repo.increment_stat(event.chat_id, StatKind::Messages).await {
            warn!(chat_id = event.chat_id, "Failed to count message: {:?}", e);
        }

        if event.text.trim_start().starts_with(COMMAND_SIGIL) {
            self.handle_command(event).await;
        } else {
            self.handle_plain_message(event).await;
        }
    }

    async fn handle_command(&self, event: ChatEvent) {
        let Some(mut invocation) = parse_invocation(&event) else {
            return;
        };
        // Admin lookups cost a platform round trip; skip them for chat noise.
        if !self.dispatcher.registry().contains(&invocation.name) {
            debug!(chat_id = event.chat_id, "Ignoring unknown command /{}", invocation.name);
            return;
        }
        let is_admin = self.resolve_admin(&event).await;
        invocation.event = invocation.event.with_admin(is_admin);

        let outcome = self.dispatcher.dispatch_invocation(&invocation).await;
        debug!(chat_id = event.chat_id, command = %invocation.name, "Dispatch outcome: {:?}", outcome);
    }

    /// Private chats belong to the sender. Lookup failures deny.
    async fn resolve_admin(&self, event: &ChatEvent) -> bool {
        if event.is_private() {
            return true;
        }
        match self.context.platform.is_chat_admin(event.chat_id, event.sender_id).await {
            Ok(is_admin) => is_admin,
            Err(e) => {
                warn!(chat_id = event.chat_id, user_id = event.sender_id, "Admin lookup failed: {:?}", e);
                false
            }
        }
    }

    async fn handle_plain_message(&self, event: ChatEvent) {
        if event.text.is_empty() {
            return;
        }
        let settings = match self.context.settings_or_default(event.chat_id).await {
            Ok(settings) => settings,
            Err(e) => {
                warn!(chat_id = event.chat_id, "Settings lookup failed, using defaults: {:?}", e);
                ChatSettings::for_chat(event.chat_id)
            }
        };
        if !settings.filter_enabled {
            return;
        }

        let filtered = match self.filters.apply(event.chat_id, &event.text).await {
            Ok(text) => text,
            Err(e) => {
                warn!(chat_id = event.chat_id, "Filter pass failed: {:?}", e);
                return;
            }
        };
        if filtered == event.text {
            return;
        }

        info!(chat_id = event.chat_id, user_id = event.sender_id, "Message matched a filter rule");
        self.suppress(&event).await;
        self.context.notify(event.chat_id, notices::VIOLATION).await;

        if !settings.auto_warn_enabled {
            return;
        }
        match self.context.escalation.record_violation(event.chat_id, event.sender_id).await {
            Ok(outcome) => {
                debug!(
                    chat_id = event.chat_id,
                    user_id = event.sender_id,
                    "Violation {}/{} -> {:?}",
                    outcome.record.warning_count,
                    outcome.threshold,
                    outcome.escalation
                );
            }
            Err(e) => warn!(chat_id = event.chat_id, user_id = event.sender_id, "Failed to record violation: {:?}", e),
        }
    }

    async fn suppress(&self, event: &ChatEvent) {
        match self.context.platform.delete_message(event.chat_id, event.message_id).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(chat_id = event.chat_id, message_id = event.message_id, "Platform refused message deletion");
                self.context.notify(event.chat_id, notices::ACTION_FAILED).await;
            }
            Err(e) => {
                warn!(chat_id = event.chat_id, message_id = event.message_id, "Message deletion failed: {:?}", e);
                self.context.notify(event.chat_id, notices::ACTION_FAILED).await;
            }
        }
    }
}
