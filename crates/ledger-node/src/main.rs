use clap::Parser;
use ledger_core::CancelFlag;
use ledger_node::{
    api,
    config::{Args, NodeConfig},
    AppState,
};
use tracing::{info, warn, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = NodeConfig::from(Args::parse());
    let state = AppState::new(&config)?;
    let cancel = state.cancel.clone();
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(config.listen).await?;
    info!(node_id = %config.node_id, "ledger-node listening on http://{}", config.listen);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel))
        .await?;
    Ok(())
}

async fn shutdown_signal(cancel: CancelFlag) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(%err, "failed to listen for ctrl-c; running until killed");
        std::future::pending::<()>().await;
    }
    info!("shutting down; cancelling in-flight mining");
    cancel.cancel();
}
