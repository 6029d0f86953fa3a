use std::net::SocketAddr;
use std::sync::Arc;
use std::thread;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::runtime::{Builder, Runtime};
use tokio::sync::mpsc::{self, UnboundedSender};

use super::wire::{self, ClientMessage, ServerMessage};
use super::{ParticipantId, Relay, SessionId};
use crate::error::RelayError;

/// TCP front for a [`Relay`]. Every connection is served by its own task:
/// one half reads requests, a second task writes the moves relayed to it.
pub struct RelayServer {
    runtime: Runtime,
    listener: TcpListener,
    relay: Arc<Relay>,
}

impl RelayServer {
    /// Bind the listener on a fresh multi-threaded runtime.
    pub fn bind(addr: impl ToSocketAddrs) -> Result<Self, RelayError> {
        let runtime = Builder::new_multi_thread().enable_all().build()?;
        let listener = runtime.block_on(TcpListener::bind(addr))?;
        Ok(RelayServer {
            runtime,
            listener,
            relay: Arc::new(Relay::new()),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, RelayError> {
        Ok(self.listener.local_addr()?)
    }

    /// The hub behind this server
    pub fn relay(&self) -> Arc<Relay> {
        Arc::clone(&self.relay)
    }

    /// Accept connections until the listener fails. Blocks the calling
    /// thread.
    pub fn run(self) -> Result<(), RelayError> {
        let RelayServer {
            runtime,
            listener,
            relay,
        } = self;
        runtime.block_on(serve(listener, relay))
    }

    /// Run the accept loop on a background thread.
    pub fn spawn(self) -> thread::JoinHandle<Result<(), RelayError>> {
        thread::spawn(move || self.run())
    }
}

async fn serve(listener: TcpListener, relay: Arc<Relay>) -> Result<(), RelayError> {
    log::info!("relay listening on {}", listener.local_addr()?);
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                log::warn!("failed to accept connection: {e}");
                continue;
            }
        };
        let relay = Arc::clone(&relay);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, &relay).await {
                log::warn!("connection {peer} closed with error: {e}");
            }
        });
    }
}

async fn handle_connection(stream: TcpStream, relay: &Relay) -> Result<(), RelayError> {
    stream.set_nodelay(true)?;
    let (reader, mut writer) = stream.into_split();
    let (tx, mut rx) = mpsc::unbounded_channel::<usize>();

    let writer_task = tokio::spawn(async move {
        while let Some(column) = rx.recv().await {
            let line = wire::encode(&ServerMessage::MoveMade { column })?;
            writer.write_all(line.as_bytes()).await?;
        }
        Ok::<(), RelayError>(())
    });

    let mut memberships: Vec<(SessionId, ParticipantId)> = Vec::new();
    let result = read_requests(reader, relay, &tx, &mut memberships).await;

    // The writer ends once the hub and this task have let go of the sender.
    for (session, id) in &memberships {
        relay.leave(session, *id);
    }
    drop(tx);
    if let Ok(Err(e)) = writer_task.await {
        log::debug!("writer stopped: {e}");
    }
    result
}

async fn read_requests(
    reader: OwnedReadHalf,
    relay: &Relay,
    tx: &UnboundedSender<usize>,
    memberships: &mut Vec<(SessionId, ParticipantId)>,
) -> Result<(), RelayError> {
    let mut lines = BufReader::new(reader).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let message: ClientMessage = match wire::decode(&line) {
            Ok(message) => message,
            Err(e) => {
                log::warn!("ignoring malformed request {line:?}: {e}");
                continue;
            }
        };

        match message {
            ClientMessage::Join { session_id } => {
                if memberships.iter().any(|(joined, _)| *joined == session_id) {
                    continue;
                }
                let id = relay.join_with_sender(&session_id, tx.clone());
                memberships.push((session_id, id));
            }
            ClientMessage::Move { session_id, column } => {
                let from = memberships
                    .iter()
                    .find(|(joined, _)| *joined == session_id)
                    .map(|(_, id)| *id);
                let delivered = relay.publish_move(&session_id, from, column);
                log::debug!("move {column} in session {session_id} relayed to {delivered}");
            }
        }
    }
    Ok(())
}
