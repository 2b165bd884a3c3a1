use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use dashmap::DashMap;
use regex::Regex;
use tracing::{debug, warn};

use modbot_common::models::FilterRule;
use modbot_common::traits::FilterRepository;

use crate::Error;

/// Compiled regex rules of one chat. `None` marks a pattern that failed to
/// compile, so it is reported once and not retried on every message.
type CompiledPatterns = HashMap<String, Option<Regex>>;

/// Applies a chat's substitution rules to message text.
///
/// Callers compare the result with the input; a difference is the only signal
/// that a rule fired.
pub struct FilterEngine {
    filter_repo: Arc<dyn FilterRepository>,
    compiled: DashMap<i64, CompiledPatterns>,
}

impl FilterEngine {
    pub fn new(filter_repo: Arc<dyn FilterRepository>) -> Self {
        Self {
            filter_repo,
            compiled: DashMap::new(),
        }
    }

    pub async fn apply(&self, chat_id: i64, text: &str) -> Result<String, Error> {
        let rules = self.filter_repo.list_filters(chat_id).await?;
        Ok(self.apply_rules(chat_id, &rules, text))
    }

    /// Rules run in the given order; a malformed pattern skips only that rule.
    pub fn apply_rules(&self, chat_id: i64, rules: &[FilterRule], text: &str) -> String {
        self.sync_patterns(chat_id, rules);
        let compiled = self.compiled.get(&chat_id);

        let mut out = text.to_string();
        for rule in rules {
            if rule.pattern.is_empty() {
                continue;
            }
            if rule.is_regex {
                let re = compiled
                    .as_ref()
                    .and_then(|patterns| patterns.get(&rule.pattern).cloned().flatten());
                if let Some(re) = re {
                    out = re.replace_all(&out, rule.replacement.as_str()).into_owned();
                }
            } else {
                out = out.replace(&rule.pattern, &rule.replacement);
            }
        }
        if out != text {
            debug!(chat_id, "Filter rules rewrote message text");
        }
        out
    }

    /// Brings the chat's compiled set in line with its current rules: removed
    /// patterns are dropped, new ones compiled once.
    fn sync_patterns(&self, chat_id: i64, rules: &[FilterRule]) {
        let wanted: HashSet<&str> = rules
            .iter()
            .filter(|r| r.is_regex && !r.pattern.is_empty())
            .map(|r| r.pattern.as_str())
            .collect();
        if wanted.is_empty() {
            self.compiled.remove(&chat_id);
            return;
        }

        let mut patterns = self.compiled.entry(chat_id).or_default();
        patterns.retain(|pattern, _| wanted.contains(pattern.as_str()));
        for pattern in wanted {
            if !patterns.contains_key(pattern) {
                patterns.insert(pattern.to_string(), compile(chat_id, pattern));
            }
        }
    }

    /// Compiled patterns held for a chat, failures included.
    pub fn cached_patterns(&self, chat_id: i64) -> usize {
        self.compiled.get(&chat_id).map_or(0, |patterns| patterns.len())
    }
}

fn compile(chat_id: i64, pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!(chat_id, "Skipping malformed filter pattern '{}': {}", pattern, e);
            None
        }
    }
}

/// Checks a pattern up front so `/filter addregex` can reject it.
pub fn validate_pattern(pattern: &str) -> Result<(), Error> {
    Regex::new(pattern)
        .map(|_| ())
        .map_err(|e| Error::InvalidArgument(format!("invalid pattern: {}", e)))
}
