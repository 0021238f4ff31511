use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use signaling_server::{config::Config, logging, server, signaling::LifecycleManager};
use tokio::{
    net::TcpListener,
    signal::unix::{signal, SignalKind},
    sync::broadcast,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    logging::init(&config.log_filter)?;

    let mut interrupt =
        signal(SignalKind::interrupt()).context("failed to create interrupt signal stream")?;
    let mut terminate =
        signal(SignalKind::terminate()).context("failed to create terminate signal stream")?;
    let listener = TcpListener::bind(config.listen_addr())
        .await
        .with_context(|| format!("could not bind to {}", config.listen_addr()))?;
    let (quit_tx, quit_rx) = broadcast::channel::<()>(1);

    let server = tokio::spawn(server::serve(
        listener,
        Arc::new(LifecycleManager::new()),
        quit_rx,
    ));

    tokio::select! {
        _ = interrupt.recv() => {}
        _ = terminate.recv() => {}
    }
    // the server task may already be gone
    let _ = quit_tx.send(());

    server.await.context("server task panicked")?
}
