use std::sync::Arc;

use tokio::{net::TcpListener, sync::broadcast, task::JoinSet};

use crate::{session, signaling::LifecycleManager};

/// Accept peers on `listener` until a quit signal arrives, then wait for every session to wind down
pub async fn serve(
    listener: TcpListener,
    lifecycle_manager: Arc<LifecycleManager>,
    mut quit_rx: broadcast::Receiver<()>,
) -> anyhow::Result<()> {
    let mut join_set: JoinSet<anyhow::Result<()>> = JoinSet::new();

    if let Ok(addr) = listener.local_addr() {
        tracing::info!(addr = %addr, "signaling server listening");
    }

    loop {
        tokio::select! {
            _ = quit_rx.recv() => {
                tracing::info!("server interrupted, gracefully shutting down");
                break;
            }
            accepted = listener.accept() => match accepted {
                Ok((socket, peer_addr)) => {
                    join_set.spawn(session::handle_peer_session(
                        lifecycle_manager.clone(),
                        quit_rx.resubscribe(),
                        socket,
                        peer_addr,
                    ));
                }
                Err(e) => tracing::error!(error = %e, "failed to accept connection"),
            },
            Some(finished) = join_set.join_next() => log_session_outcome(finished),
        }
    }

    while let Some(finished) = join_set.join_next().await {
        log_session_outcome(finished);
    }
    tracing::info!("server shut down");

    Ok(())
}

fn log_session_outcome(finished: Result<anyhow::Result<()>, tokio::task::JoinError>) {
    match finished {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!(error = %format!("{:#}", e), "peer session ended with an error"),
        Err(e) => tracing::error!(error = %e, "peer session task failed"),
    }
}
