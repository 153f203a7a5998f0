use anyhow::Result;
use bankscraper::{config::PipelineConfig, pipeline::Pipeline};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();
    info!("startup");

    let config = PipelineConfig::default();
    let mut pipeline = Pipeline::new(config);
    pipeline.run().await?;

    info!("all done");
    Ok(())
}
