use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::Error;
use crate::services::commands::CommandHandler;

/// Name -> handler table, filled once at startup.
///
/// Registration takes `&mut self`; once built the registry is shared as
/// `Arc<CommandRegistry>` and is read-only from then on, so no runtime
/// registration can race with dispatch.
#[derive(Default)]
pub struct CommandRegistry {
    handlers: Vec<Arc<dyn CommandHandler>>,
    index: HashMap<String, usize>,
}

/// Lookup key: sigil stripped, case-folded.
pub fn normalize_name(name: &str) -> String {
    name.trim().trim_start_matches('/').to_lowercase()
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails with `DuplicateCommand` if the case-folded name is taken.
    pub fn register(&mut self, handler: Arc<dyn CommandHandler>) -> Result<(), Error> {
        let key = normalize_name(handler.name());
        if key.is_empty() {
            return Err(Error::InvalidArgument("command name must not be empty".into()));
        }
        if self.index.contains_key(&key) {
            return Err(Error::DuplicateCommand(key));
        }
        info!("Registering command: /{}", key);
        self.index.insert(key, self.handlers.len());
        self.handlers.push(handler);
        Ok(())
    }

    /// Exact, case-insensitive match. No prefix matching.
    pub fn lookup(&self, name: &str) -> Result<Arc<dyn CommandHandler>, Error> {
        let key = normalize_name(name);
        match self.index.get(&key) {
            Some(&i) => Ok(self.handlers[i].clone()),
            None => {
                debug!("No command registered as '{}'", key);
                Err(Error::CommandNotFound(key))
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&normalize_name(name))
    }

    /// `(name, description)` pairs in registration order.
    pub fn list(&self) -> Vec<(String, String)> {
        self.handlers
            .iter()
            .map(|h| (normalize_name(h.name()), h.description().to_string()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::services::commands::CommandContext;

    struct Named(&'static str);

    #[async_trait]
    impl CommandHandler for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            "test command"
        }

        async fn execute(&self, _ctx: &CommandContext<'_>) -> Result<(), Error> {
            Ok(())
        }
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let mut registry = CommandRegistry::new();
        registry.register(Arc::new(Named("warn"))).unwrap();
        let err = registry.register(Arc::new(Named("/WARN"))).unwrap_err();
        assert!(matches!(err, Error::DuplicateCommand(ref n) if n == "warn"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_lookup_is_case_insensitive_and_exact() {
        let mut registry = CommandRegistry::new();
        registry.register(Arc::new(Named("clearwarns"))).unwrap();

        assert!(registry.lookup("ClearWarns").is_ok());
        assert!(registry.lookup("/clearwarns").is_ok());
        assert!(matches!(registry.lookup("clear"), Err(Error::CommandNotFound(_))));
        assert!(matches!(registry.lookup("clearwarnsx"), Err(Error::CommandNotFound(_))));
    }

    #[test]
    fn test_list_keeps_registration_order() {
        let mut registry = CommandRegistry::new();
        for name in ["start", "ban", "help", "antiflood"] {
            registry.register(Arc::new(Named(name))).unwrap();
        }
        let names: Vec<String> = registry.list().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["start", "ban", "help", "antiflood"]);
    }
}
