use anyhow::Result;
use tracing::info;

use capmap::environment::{self, Config};
use capmap::logging;
use capmap::web;

#[tokio::main]
async fn main() -> Result<()> {
    logging::configure_logging(&environment::log_dir());

    let config = Config::from_env();
    info!(
        "Serving CAP alerts from {} (fetch concurrency: {})",
        config.feed_url,
        config
            .fetch_concurrency
            .map_or_else(|| "unlimited".to_string(), |limit| limit.to_string())
    );

    web::serve(config).await
}
