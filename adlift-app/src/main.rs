use adlift_common::observability::{init_logging, LogConfig};
use adlift_config::{AdliftConfig, AdliftConfigLoader};
use adlift_feed::FeedWriter;
use adlift_service::{router, SubmissionService};
use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    // 1) Load config (env wins)
    let cfg: AdliftConfig = AdliftConfigLoader::new()
        .with_optional_file("adlift.yaml")
        .load()?;

    let log_path = init_logging(LogConfig::default())?;
    tracing::info!(log = %log_path.display(), "adlift starting");

    let service = SubmissionService::new(FeedWriter::new(&cfg.storage.output_dir));
    let app = router(service);

    let addr = format!("{}:{}", cfg.server.host, cfg.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, output_dir = %cfg.storage.output_dir, "submission API listening");
    axum::serve(listener, app).await?;

    Ok(())
}
