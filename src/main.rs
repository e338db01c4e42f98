use anyhow::Result;
use mentra_echo::{AppServer, Config, EchoHandler};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Missing required variables abort here, before any listener exists
    let config = Config::from_env()?;

    info!("mentra-echo v0.1.0");
    info!("Package: {}", config.package_name);
    info!("Webhook will bind to 0.0.0.0:{}", config.port);

    let server = AppServer::new(config, Arc::new(EchoHandler));
    if let Err(e) = server.start().await {
        error!("Server failed: {:#}", e);
        return Err(e);
    }

    Ok(())
}
