use skybook_core::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = Config::from_env()?;
    let port = config.port;

    let state = skybook_server::build_state(config).await?;

    // Surfaces the initial registration token in the logs on first boot.
    state.auth.bootstrap().await?;

    let app = skybook_server::router(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!("skybook-server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown signal received");
        })
        .await?;

    Ok(())
}
