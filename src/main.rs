use anyhow::Context;
use tracing::info;

pub mod canary;
use canary::{Canary, PinTarget, RetryPolicy};
pub mod config;
pub mod device;
use device::grpc::GrpcConnector;
pub mod error;
pub mod logging;
pub mod mimir;
use mimir::MetricsExporter;
pub mod store;
use store::mongo::MongoStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A .env file is optional; real environment variables take precedence.
    let _ = dotenvy::dotenv();
    logging::init();

    let config = config::load_config().context("invalid canary configuration")?;

    let connector = GrpcConnector::new(config.canary.request_timeout());
    let store = MongoStore::connect(
        &config.mongodb_uri,
        &config.canary.database,
        &config.canary.collection,
    )
    .await
    .context("failed to set up result store")?;

    let pin = PinTarget {
        board: config.canary.board.clone(),
        pin: config.canary.pin.clone(),
    };
    let policy = RetryPolicy {
        max_attempts: config.canary.connect_attempts,
        delay: config.canary.retry_delay(),
    };

    let mut canary = Canary::new(connector, store, config.target, pin, policy);
    if let Some(mimir) = config.mimir {
        println!("Using Mimir endpoint: {}", mimir.endpoint);
        let exporter = MetricsExporter::new(mimir).context("failed to build metrics client")?;
        canary = canary.with_exporter(exporter);
    }

    let record = canary.run().await?;

    info!(
        success = record.is_success(),
        attempts = record.attempts,
        connection_latency_ms = record.connection_latency_ms,
        "canary passed"
    );
    Ok(())
}
