use anyhow::Context;

use pricelens_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pricelens_observability::init();

    let config = ApiConfig::from_env();
    tracing::debug!(?config, "configuration loaded");

    let addr = config.bind_addr;
    let app = pricelens_api::app::build_app(config).await?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
