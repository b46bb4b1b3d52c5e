//! LevelUp edge functions server

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};

use levelup_edge::{config::Args, logging, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    logging::init_tracing(&args.log_level, args.json_logs());

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    info!("======================================");
    info!("  LevelUp edge functions v{}", env!("CARGO_PKG_VERSION"));
    info!("======================================");
    info!("Listen: {}", args.listen);
    info!("Mode: {}", if args.dev_mode { "DEVELOPMENT" } else { "PRODUCTION" });
    info!(
        "Supabase: {}",
        args.supabase_url.as_deref().unwrap_or("(not configured)")
    );
    info!("ElevenLabs: {}", args.elevenlabs_base_url);
    info!("Request timeout: {}ms", args.request_timeout_ms);
    info!("======================================");

    let usage = match args.usage_log_path.clone() {
        Some(path) => match logging::UsageLogger::to_file(path).await {
            Ok(logger) => logger,
            Err(e) => {
                warn!("Usage log unavailable, continuing without it: {}", e);
                logging::UsageLogger::disabled()
            }
        },
        None => logging::UsageLogger::disabled(),
    };

    let state = server::AppState::new(args)?.with_usage(usage);

    server::run(Arc::new(state)).await?;

    Ok(())
}
