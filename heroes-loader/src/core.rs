use anyhow::Context;
use heroes_ingest::destination::postgres::PostgresDestination;
use heroes_ingest::pipeline::Pipeline;
use heroes_ingest::source::http::HttpRecordSource;
use tracing::info;

use crate::config::load_loader_config;

/// Loads configuration, connects source and destination, and runs the pipeline to
/// completion.
pub async fn start_loader() -> anyhow::Result<()> {
    let config = load_loader_config().context("failed to load loader configuration")?;
    config.validate().context("invalid loader configuration")?;

    let source = HttpRecordSource::new(&config.source)?;
    let destination = PostgresDestination::connect(&config.destination)
        .await
        .context("failed to connect to the destination database")?;

    info!(base_url = %config.source.base_url, "loader starting");

    let pipeline = Pipeline::new(config.pipeline, source, destination);
    pipeline.run().await?;

    Ok(())
}
