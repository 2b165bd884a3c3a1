use std::net::SocketAddr;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

mod context;
mod server;

#[derive(Parser, Debug, Clone)]
#[command(name = "modbot")]
#[command(author, version, about = "modbot - group chat moderation bot")]
pub struct Args {
    /// Address the webhook server binds to
    #[arg(long, env = "MODBOT_LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    pub listen_addr: SocketAddr,

    /// Bot API token
    #[arg(long, env = "MODBOT_BOT_TOKEN", hide_env_values = true)]
    pub bot_token: String,

    /// Bot API base URL
    #[arg(long, env = "MODBOT_API_BASE", default_value = "https://api.telegram.org")]
    pub api_base: String,

    /// Route the platform posts updates to
    #[arg(long, env = "MODBOT_WEBHOOK_PATH", default_value = "/webhook/telegram")]
    pub webhook_path: String,

    /// Seconds between expired-mute sweeps
    #[arg(long, default_value_t = 30)]
    pub sweep_interval_secs: u64,

    /// Processing budget for one inbound event
    #[arg(long, default_value_t = 5000)]
    pub event_timeout_ms: u64,

    /// How long a delivered message id is remembered for duplicate detection
    #[arg(long, default_value_t = 600)]
    pub dedupe_window_secs: u64,
}

fn init_tracing() {
    let filter = EnvFilter::from_default_env()
        .add_directive("modbot=info".parse().unwrap_or_default());
    let sub = fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(sub)
        .expect("Failed to set global subscriber");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();
    let args = Args::parse();
    info!(
        "modbot starting. listen={}, webhook={}, sweep={}s",
        args.listen_addr, args.webhook_path, args.sweep_interval_secs
    );

    if let Err(e) = server::run_server(args).await {
        error!("Server error: {:?}", e);
        return Err(e.into());
    }
    info!("Main finished. Goodbye!");
    Ok(())
}
