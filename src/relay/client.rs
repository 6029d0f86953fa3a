use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::runtime::{Builder, Runtime};
use tokio::sync::mpsc::{self, UnboundedSender};

use super::hub::Inbox;
use super::wire::{self, ClientMessage, ServerMessage};
use super::{MoveChannel, SessionId};
use crate::error::RelayError;

/// TCP participant of a [`super::RelayServer`] session. Owns a small runtime
/// whose reader task decodes relayed moves in the background; the
/// [`MoveChannel`] side stays blocking. Not for use inside an async context.
pub struct RelayClient {
    session: SessionId,
    // Socket halves close before the runtime shuts down.
    writer: OwnedWriteHalf,
    inbox: Inbox,
    runtime: Runtime,
}

impl RelayClient {
    /// Connect and join `session`.
    pub fn connect(addr: impl ToSocketAddrs, session: SessionId) -> Result<Self, RelayError> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()?;
        let stream = runtime.block_on(TcpStream::connect(addr))?;
        stream.set_nodelay(true)?;
        let (reader, writer) = stream.into_split();
        let (tx, rx) = mpsc::unbounded_channel();
        runtime.spawn(read_moves(reader, tx));

        let mut client = RelayClient {
            session,
            writer,
            inbox: Inbox::new(rx),
            runtime,
        };
        client.send(&ClientMessage::Join {
            session_id: client.session.clone(),
        })?;
        Ok(client)
    }

    fn send(&mut self, message: &ClientMessage) -> Result<(), RelayError> {
        let line = wire::encode(message)?;
        self.runtime
            .block_on(self.writer.write_all(line.as_bytes()))?;
        Ok(())
    }
}

/// Forward relayed columns until the server closes the connection.
async fn read_moves(reader: OwnedReadHalf, tx: UnboundedSender<usize>) {
    let mut lines = BufReader::new(reader).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                log::debug!("relay connection lost: {e}");
                break;
            }
        };
        match wire::decode::<ServerMessage>(&line) {
            Ok(ServerMessage::MoveMade { column }) => {
                if tx.send(column).is_err() {
                    break;
                }
            }
            Err(e) => log::warn!("ignoring malformed relay message {line:?}: {e}"),
        }
    }
}

impl MoveChannel for RelayClient {
    fn session_id(&self) -> &SessionId {
        &self.session
    }

    fn publish_move(&mut self, column: usize) -> Result<(), RelayError> {
        self.send(&ClientMessage::Move {
            session_id: self.session.clone(),
            column,
        })
    }

    fn try_recv_move(&mut self) -> Result<Option<usize>, RelayError> {
        self.inbox.try_next()
    }

    fn recv_move_timeout(&mut self, timeout: Duration) -> Result<Option<usize>, RelayError> {
        self.inbox.next_within(&self.runtime, timeout)
    }
}
