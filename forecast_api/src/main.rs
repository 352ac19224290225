use anyhow::Result;
use forecast_api::{app, AppState, ServerConfig};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (optional - won't fail if missing)
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "forecast_api=info,sales_forecast=info,tower_http=info".into()
            }),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let addr = config.socket_addr();

    let listener = TcpListener::bind(addr).await?;
    info!("forecast_api v{} listening on {}", env!("CARGO_PKG_VERSION"), addr);

    axum::serve(listener, app(AppState::new())).await?;

    Ok(())
}
