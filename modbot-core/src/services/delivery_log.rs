use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

pub const DEFAULT_CAPACITY: usize = 10_000;

/// Remembers recently processed `(chat_id, message_id)` pairs so a redelivered
/// webhook is acknowledged without running the pipeline a second time.
pub struct DeliveryLog {
    window: Duration,
    capacity: usize,
    seen: DashMap<(i64, i64), DateTime<Utc>>,
}

impl DeliveryLog {
    pub fn new(window: Duration, capacity: usize) -> Self {
        Self {
            window,
            capacity: capacity.max(1),
            seen: DashMap::new(),
        }
    }

    pub fn first_seen(&self, chat_id: i64, message_id: i64) -> bool {
        self.first_seen_at(chat_id, message_id, Utc::now())
    }

    /// True the first time a pair shows up inside the window. Checking and
    /// recording happen under the same shard lock.
    pub fn first_seen_at(&self, chat_id: i64, message_id: i64, now: DateTime<Utc>) -> bool {
        let fresh = match self.seen.entry((chat_id, message_id)) {
            Entry::Occupied(mut seen) => {
                if now - *seen.get() < self.window {
                    false
                } else {
                    seen.insert(now);
                    true
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(now);
                true
            }
        };

        if fresh && self.seen.len() > self.capacity {
            self.prune(now);
        }
        fresh
    }

    fn prune(&self, now: DateTime<Utc>) {
        let before = self.seen.len();
        let cutoff = now - self.window;
        self.seen.retain(|_, at| *at > cutoff);

        // Still full of in-window entries: drop the oldest half.
        if self.seen.len() > self.capacity {
            let mut stamps: Vec<DateTime<Utc>> = self.seen.iter().map(|e| *e.value()).collect();
            stamps.sort_unstable();
            let keep_from = stamps[stamps.len() / 2];
            self.seen.retain(|_, at| *at >= keep_from);
        }
        debug!("Delivery log pruned {} -> {} entries", before, self.seen.len());
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
