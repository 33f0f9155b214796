#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::SocketAddr;

    use pert_estimator::config::LOG_ENV;
    use pert_estimator::{EstimationSession, EstimatorConfig, http_api};

    let env_filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let addr: SocketAddr = std::env::var("PERT_ESTIMATOR_HTTP_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()?;

    let config = EstimatorConfig::from_env()?;
    tracing::info!(%addr, levels = config.confidence_levels.len(), "pert-estimator HTTP API listening");
    http_api::serve(addr, EstimationSession::with_config(config)).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
