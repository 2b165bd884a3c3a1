// modbot-server/src/server.rs

use std::time::Duration;
use tracing::{error, info};

use modbot_core::Error;
use modbot_core::http::{serve, webhook_router};
use modbot_core::tasks::mute_sweep::spawn_mute_sweep_task;

use crate::Args;
use crate::context::ServerContext;

pub async fn run_server(args: Args) -> Result<(), Error> {
    let ctx = ServerContext::new(&args)?;

    let sweep = spawn_mute_sweep_task(
        ctx.escalation.clone(),
        Duration::from_secs(args.sweep_interval_secs.max(1)),
    );

    let router = webhook_router(ctx.pipeline.clone(), &args.webhook_path);
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for ctrl-c: {:?}", e);
        }
        info!("Ctrl-C received, shutting down");
    };

    let result = serve(args.listen_addr, router, shutdown).await;
    sweep.abort();
    info!("Server shutdown complete.");
    result
}
