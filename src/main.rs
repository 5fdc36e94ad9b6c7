use anyhow::{Context, Result};
use content_front::api::ApiClient;
use content_front::config::Config;
use content_front::server::{router, AppState};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("content_front=info".parse()?),
        )
        .init();

    info!("Starting content front-end");

    // Load configuration from environment
    let config = Config::from_env()?;
    info!(
        "Environment: {}, content API: {}, site: {}",
        config.environment,
        config.api_base,
        config.site_slug.as_deref().unwrap_or("(all)")
    );

    let client = ApiClient::new(&config).context("Failed to create content API client")?;
    let addr = format!("0.0.0.0:{}", config.port);
    let app = router(AppState::new(client, config));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
