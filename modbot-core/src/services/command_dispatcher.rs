use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use futures_util::FutureExt;
use tracing::{debug, error, info, warn};

use modbot_common::models::ChatEvent;

use crate::Error;
use crate::services::command_registry::CommandRegistry;
use crate::services::commands::{CommandContext, CommandInvocation};
use crate::services::event_context::EventContext;

pub const COMMAND_SIGIL: char = '/';

pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

/// What happened to one dispatched event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Text does not start with the sigil, or the command token is empty.
    NotACommand,
    /// No handler under that name; dropped silently.
    Unknown,
    Executed,
    /// Handler refused the sender; the fixed notice was sent.
    Denied,
    /// Handler returned an error or panicked; logged only.
    Failed,
    TimedOut,
}

/// Parses `/name[@bot] args...` into an invocation. The name is case-folded;
/// `args` is everything after the first whitespace, trimmed.
pub fn parse_invocation(event: &ChatEvent) -> Option<CommandInvocation> {
    let text = event.text.trim_start();
    let rest = text.strip_prefix(COMMAND_SIGIL)?;

    let (token, args) = match rest.find(char::is_whitespace) {
        Some(i) => (&rest[..i], rest[i..].trim()),
        None => (rest, ""),
    };
    let token = match token.split_once('@') {
        Some((name, _bot)) => name,
        None => token,
    };
    if token.is_empty() {
        return None;
    }

    Some(CommandInvocation {
        name: token.to_lowercase(),
        args: args.to_string(),
        event: event.clone(),
    })
}

/// Routes commands to their handlers and contains handler failures, so one bad
/// command never affects the next event.
pub struct CommandDispatcher {
    registry: Arc<CommandRegistry>,
    context: EventContext,
    timeout: Duration,
}

impl CommandDispatcher {
    pub fn new(registry: Arc<CommandRegistry>, context: EventContext) -> Self {
        Self {
            registry,
            context,
            timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn registry(&self) -> &CommandRegistry {
        self.registry.as_ref()
    }

    pub async fn dispatch(&self, event: &ChatEvent) -> DispatchOutcome {
        match parse_invocation(event) {
            Some(invocation) => self.dispatch_invocation(&invocation).await,
            None => DispatchOutcome::NotACommand,
        }
    }

    pub async fn dispatch_invocation(&self, invocation: &CommandInvocation) -> DispatchOutcome {
        let handler = match self.registry.lookup(&invocation.name) {
            Ok(h) => h,
            Err(_) => {
                debug!(chat_id = invocation.event.chat_id, "Ignoring unknown command /{}", invocation.name);
                return DispatchOutcome::Unknown;
            }
        };

        let ctx = CommandContext {
            invocation,
            services: &self.context,
            registry: self.registry.as_ref(),
        };
        debug!(
            chat_id = ctx.chat_id(),
            user_id = ctx.sender_id(),
            command = %invocation.name,
            "Dispatching command"
        );

        let run = AssertUnwindSafe(handler.execute(&ctx)).catch_unwind();
        match tokio::time::timeout(self.timeout, run).await {
            Ok(Ok(Ok(()))) => {
                info!(chat_id = ctx.chat_id(), command = %invocation.name, "Command executed");
                DispatchOutcome::Executed
            }
            Ok(Ok(Err(Error::PermissionDenied(notice)))) => {
                debug!(chat_id = ctx.chat_id(), user_id = ctx.sender_id(), command = %invocation.name, "Permission denied");
                ctx.reply(&notice).await;
                DispatchOutcome::Denied
            }
            Ok(Ok(Err(e))) => {
                error!(chat_id = ctx.chat_id(), command = %invocation.name, "Command failed: {:?}", e);
                DispatchOutcome::Failed
            }
            Ok(Err(_panic)) => {
                error!(chat_id = ctx.chat_id(), command = %invocation.name, "Command handler panicked");
                DispatchOutcome::Failed
            }
            Err(_) => {
                warn!(chat_id = ctx.chat_id(), command = %invocation.name, "Command timed out after {:?}; dropped", self.timeout);
                DispatchOutcome::TimedOut
            }
        }
    }
}
