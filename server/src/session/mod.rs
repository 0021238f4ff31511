use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use comms::{
    command::UserCommand,
    event::{self, Event},
    transport::{self, server::CommandStream, server::EventWriter, ReadError},
};
use tokio::{
    net::TcpStream,
    sync::{broadcast, mpsc},
};
use tokio_stream::StreamExt;

use crate::signaling::{ConnectionId, LifecycleManager, SignalingError};

/// Given a tcp stream and the lifecycle manager, handles a single peer connection
/// until the peer closes the stream, the stream fails for some reason, or the server shuts down.
///
/// Whatever ends the session, the connection is disconnected from the lifecycle manager exactly once,
/// so the rest of its room always learns that it left.
pub async fn handle_peer_session(
    lifecycle_manager: Arc<LifecycleManager>,
    quit_rx: broadcast::Receiver<()>,
    stream: TcpStream,
    peer_addr: SocketAddr,
) -> anyhow::Result<()> {
    let connection_id = ConnectionId::generate();
    // Split the tcp stream into a command stream and an event writer with better ergonomics
    let (commands, event_writer) = transport::server::split_tcp_stream(stream);
    // Every event routed to this connection, from any other connection, arrives through this channel
    let (outbox_tx, outbox_rx) = mpsc::unbounded_channel();

    lifecycle_manager
        .connect(connection_id.clone(), outbox_tx)
        .await
        .context("could not register the connection")?;
    tracing::debug!(connection_id = %connection_id, peer = %peer_addr, "peer connected");

    let mut session = PeerSession {
        connection_id: connection_id.clone(),
        lifecycle_manager: lifecycle_manager.clone(),
        commands,
        event_writer,
        outbox_rx,
        quit_rx,
    };
    let result = session.run().await;

    lifecycle_manager.disconnect(&connection_id).await;
    tracing::debug!(connection_id = %connection_id, peer = %peer_addr, "peer disconnected");

    result
}

struct PeerSession {
    connection_id: ConnectionId,
    lifecycle_manager: Arc<LifecycleManager>,
    commands: CommandStream,
    event_writer: EventWriter,
    outbox_rx: mpsc::UnboundedReceiver<Event>,
    quit_rx: broadcast::Receiver<()>,
}

impl PeerSession {
    async fn run(&mut self) -> anyhow::Result<()> {
        // Tell the peer the id other peers will use to reach it
        self.event_writer
            .write(&Event::ConnectionEstablished(
                event::ConnectionEstablishedEvent {
                    id: String::from(self.connection_id.as_str()),
                },
            ))
            .await?;

        loop {
            tokio::select! {
                cmd = self.commands.next() => match cmd {
                    // The peer closed the tcp stream
                    None => break,
                    Some(Ok(cmd)) => self.handle_command(cmd).await,
                    // A line we could not understand, the rest of the stream is still fine
                    Some(Err(e)) if e.is_recoverable() => {
                        tracing::warn!(connection_id = %self.connection_id, error = %e, "dropping undecodable message");
                    }
                    Some(Err(e)) => return Err(stream_failure(e)),
                },
                // Relayed and broadcast events routed to this connection are sent to the peer
                Some(event) = self.outbox_rx.recv() => {
                    self.event_writer.write(&event).await?;
                }
                // If the server is shutting down we stop reading, the caller still cleans up
                Ok(_) = self.quit_rx.recv() => {
                    tracing::debug!(connection_id = %self.connection_id, "closing peer stream for shutdown");
                    break;
                }
            }
        }

        Ok(())
    }

    async fn handle_command(&mut self, cmd: UserCommand) {
        let name = cmd.name();

        match self
            .lifecycle_manager
            .handle_command(&self.connection_id, cmd)
            .await
        {
            Ok(()) => {}
            Err(e @ SignalingError::Protocol { .. }) => {
                tracing::warn!(connection_id = %self.connection_id, command = name, error = %e, "command dropped");
            }
            Err(e) => {
                tracing::error!(connection_id = %self.connection_id, command = name, error = %e, "command failed");
            }
        }
    }
}

fn stream_failure(e: ReadError) -> anyhow::Error {
    anyhow::Error::new(e).context("peer stream failed")
}
