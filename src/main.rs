use anyhow::{Context, Result};
use parquet_converter::config::Settings;
use parquet_converter::{app, logging};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env().context("load settings from environment")?;
    logging::init(&settings.log_level);

    app::run(settings).await
}
