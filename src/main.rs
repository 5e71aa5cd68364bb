use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use wealth_query_server::{
    classifier::Classifier,
    formatter::{Catalogs, PayloadBuilder},
    settings::{Args, Settings},
    web,
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let settings = Settings::from_file(args.config.as_deref()).with_context(|| {
        format!(
            "Failed to load settings from {}",
            args.config
                .as_ref()
                .map_or_else(|| "defaults".to_string(), |path| path.display().to_string())
        )
    })?;

    tracing_subscriber::fmt()
        .with_max_level(settings.log.level)
        .init();

    let classifier =
        Classifier::new(settings.classifier).context("Invalid classifier configuration")?;
    let builder = Arc::new(PayloadBuilder::new(
        classifier,
        Catalogs::default(),
        &settings.formatter.source,
    ));

    info!(address = %settings.web.address, "Wealth query server listening");
    web::serve(builder, settings.web.address).await;
    Ok(())
}
