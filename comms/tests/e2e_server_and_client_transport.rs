use std::net::SocketAddr;

use comms::{
    command::{self, UserCommand},
    event::{self, Event},
    transport,
};
use serde_json::json;
use tokio::net::{TcpListener, TcpStream};
use tokio_stream::StreamExt;

#[tokio::test]
async fn assert_server_client_transport() {
    // bind before spawning either side so the client never races the listener
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("could not bind to a local port");
    let addr = listener.local_addr().expect("listener has no local address");

    let (server_collected_commands, client_collected_events) =
        tokio::join!(execute_server(listener), execute_client(addr));

    assert!(server_collected_commands.is_ok());
    assert!(client_collected_events.is_ok());

    assert_eq!(
        server_collected_commands.unwrap(),
        vec![
            UserCommand::JoinRoom(command::JoinRoomCommand {
                room_id: "room-1".into(),
            }),
            UserCommand::Offer(command::OfferCommand {
                offer: json!({"type": "offer", "sdp": "v=0"}),
                target: "peer-2".into(),
            }),
        ]
    );

    assert_eq!(
        client_collected_events.unwrap(),
        vec![Event::ConnectionEstablished(
            event::ConnectionEstablishedEvent {
                id: "peer-1".into(),
            }
        )]
    );
}

async fn execute_server(listener: TcpListener) -> anyhow::Result<Vec<command::UserCommand>> {
    // accept the only client connection we will have
    let tcp_stream = match listener.accept().await {
        Ok((tcp_stream, _addr)) => tcp_stream,
        Err(e) => return Err(anyhow::anyhow!("failed to accept client: {}", e)),
    };

    // break the client connection into higher level API for ease of use
    let (mut command_stream, mut event_writer) = transport::server::split_tcp_stream(tcp_stream);
    // store commands received from the client
    let mut collected_commands = Vec::new();

    // greet the peer with its connection id
    event_writer
        .write(&Event::ConnectionEstablished(
            event::ConnectionEstablishedEvent {
                id: "peer-1".into(),
            },
        ))
        .await?;

    // listen for commands from the client until the connection is closed
    while let Some(result) = command_stream.next().await {
        match result {
            // client has sent a valid command which we could read and parse
            Ok(command) => collected_commands.push(command),
            // garbage in between valid commands must not end the stream
            Err(e) if e.is_recoverable() => continue,
            Err(e) => return Err(anyhow::anyhow!("failed to read command: {}", e)),
        }
    }

    Ok(collected_commands)
}

async fn execute_client(addr: SocketAddr) -> anyhow::Result<Vec<event::Event>> {
    // create a client connection to the server
    let tcp_stream = match TcpStream::connect(addr).await {
        Ok(tcp_stream) => tcp_stream,
        Err(e) => return Err(anyhow::anyhow!("failed to connect to server: {}", e)),
    };

    // break the server connection into higher level API for ease of use
    let (mut event_stream, mut command_writer) = transport::client::split_tcp_stream(tcp_stream);
    // store events received from the server
    let mut collected_events = Vec::new();

    // read the greeting event from the server
    match event_stream.next().await {
        Some(Ok(event)) => collected_events.push(event),
        Some(Err(e)) => return Err(anyhow::anyhow!("could not parse event: {}", e)),
        None => return Err(anyhow::anyhow!("server closed the connection")),
    }

    command_writer
        .write(&UserCommand::JoinRoom(command::JoinRoomCommand {
            room_id: "room-1".into(),
        }))
        .await?;

    // not a known command, the server side should skip it
    command_writer
        .write_raw_line(br#"{"_ct":"send-message","c":"hello"}"#)
        .await?;
    // not even UTF-8, also skipped without closing the stream
    command_writer.write_raw_line(b"\xff\xfe garbage").await?;

    command_writer
        .write(&UserCommand::Offer(command::OfferCommand {
            offer: json!({"type": "offer", "sdp": "v=0"}),
            target: "peer-2".into(),
        }))
        .await?;

    Ok(collected_events)
}
