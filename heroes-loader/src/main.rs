use heroes_telemetry::tracing::init_tracing;
use tracing::{error, info};

mod config;
mod core;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _log_flusher = init_tracing("heroes-loader")?;

    if let Err(err) = core::start_loader().await {
        error!("loader terminated with an error: {err:?}");
        return Err(err);
    }

    info!("loader finished");

    Ok(())
}
