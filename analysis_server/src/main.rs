// src/main.rs

use analysis_server::config::AppConfig;
use analysis_server::run_server;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "invalid configuration");
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, err.to_string()));
        }
    };

    if config.api_key.is_none() {
        warn!("TWELVEDATA_API_KEY is not set; analysis requests will report missing_credential");
    }

    run_server(config).await
}
