use super::server::EchoStats;
use crate::net::{ReadHalf, TcpStream, WriteHalf};
use crate::runtime::maybe_yield;

use std::cell::RefCell;
use std::net::SocketAddr;
use std::rc::Rc;

/// Lifecycle of one echo connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Accepted,
    Reading,
    Writing,
    Closed,
}

/// Summary of a closed connection.
#[derive(Clone, Debug)]
pub struct ConnectionRecord {
    pub peer: SocketAddr,

    /// Bytes read from the peer and written back.
    pub bytes: u64,

    /// Number of non-empty reads.
    pub reads: u64,

    /// The failure that ended the connection, if it did not close cleanly.
    pub error: Option<String>,
}

/// One client of the echo server, owned by its fiber.
pub(crate) struct Connection {
    reader: ReadHalf,
    writer: WriteHalf,
    peer: SocketAddr,
    state: ConnectionState,
    bytes: u64,
    reads: u64,
}

impl Connection {
    pub(crate) fn new(stream: TcpStream, peer: SocketAddr) -> Self {
        let (reader, writer) = stream.split();

        Self {
            reader,
            writer,
            peer,
            state: ConnectionState::Accepted,
            bytes: 0,
            reads: 0,
        }
    }

    /// Echoes until the peer closes or an I/O error occurs, then records
    /// the connection in `stats`.
    pub(crate) async fn run(mut self, stats: Rc<RefCell<EchoStats>>) {
        tracing::info!(peer = %self.peer, "client connected");

        let error = loop {
            self.transition(ConnectionState::Reading);

            let chunk = match self.reader.read().await {
                Ok(chunk) => chunk,
                Err(err) => break Some(err),
            };

            if chunk.is_empty() {
                break None;
            }

            self.reads += 1;
            self.transition(ConnectionState::Writing);

            let len = chunk.len() as u64;
            if let Err(err) = self.writer.write_all(chunk).await {
                break Some(err);
            }

            self.bytes += len;
            stats.borrow_mut().bytes_echoed += len;

            maybe_yield().await;
        };

        self.transition(ConnectionState::Closed);

        match &error {
            None => tracing::info!(
                peer = %self.peer,
                bytes = self.bytes,
                "client disconnected"
            ),
            Some(err) => tracing::warn!(
                peer = %self.peer,
                bytes = self.bytes,
                error = %err,
                "client connection failed"
            ),
        }

        stats.borrow_mut().record(ConnectionRecord {
            peer: self.peer,
            bytes: self.bytes,
            reads: self.reads,
            error: error.map(|err| err.to_string()),
        });
    }

    fn transition(&mut self, next: ConnectionState) {
        tracing::trace!(peer = %self.peer, from = ?self.state, to = ?next, "connection state");
        self.state = next;
    }
}
