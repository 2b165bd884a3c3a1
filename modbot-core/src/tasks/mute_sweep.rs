// modbot-core/src/tasks/mute_sweep.rs

use std::sync::Arc;
use std::time::Duration;
use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::services::escalation::EscalationService;

/// Spawns a background task that lifts expired mutes in every known chat,
/// once per `interval`. The sweep is independent of event arrival.
pub fn spawn_mute_sweep_task(escalation: Arc<EscalationService>, interval: Duration) -> JoinHandle<()> {
    info!("Mute sweep running every {:?}", interval);
    tokio::spawn(async move {
        loop {
            sleep(interval).await;
            match escalation.sweep_all_expired_mutes_at(Utc::now()).await {
                Ok(0) => debug!("Mute sweep: nothing expired"),
                Ok(n) => info!("Mute sweep lifted {} mute(s)", n),
                Err(e) => warn!("Mute sweep failed: {:?}", e),
            }
        }
    })
}
