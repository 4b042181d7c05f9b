use anyhow::Context;

use holdbook_infra::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    holdbook_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let app = holdbook_api::app::build_app(&config)
        .await
        .context("failed to open the table store")?;

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
