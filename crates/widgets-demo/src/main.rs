mod config;
mod errors;

use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use widgets_core::{CoreError, DynamoStore, Provisioner, TableSpec, Widget};

use crate::config::{DemoConfig, LogFormat};
use crate::errors::DemoError;

#[tokio::main]
async fn main() -> ExitCode {
    let config = DemoConfig::from_env();
    init_tracing(config.as_ref().map(|c| c.log_format).unwrap_or_default());

    match run(config).await {
        Ok(widget) => {
            println!("Item loaded. Description: {}", widget.description);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "widgets demo failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Result<DemoConfig, errors::ConfigError>) -> Result<Widget, DemoError> {
    let config = config?;

    info!(endpoint = ?config.endpoint_url, "creating DynamoDB client");
    let store = DynamoStore::connect(config.endpoint_url.as_deref()).await;

    let spec = TableSpec::widgets().map_err(CoreError::from)?;
    let provisioner = Provisioner::new(store, spec, config.wait);
    info!(
        table = %provisioner.spec().name,
        max_wait = ?config.wait.max_total_delay(),
        "starting widgets demo"
    );

    Ok(provisioner.run().await?)
}

/// Log to stdout, filtered by `RUST_LOG` (default `info`).
fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Text => subscriber.init(),
        LogFormat::Json => subscriber.json().init(),
    }
}
