use super::connection::{Connection, ConnectionRecord};
use crate::error::Result;
use crate::future::Future;
use crate::net::{ListenOptions, TcpListener};
use crate::runtime::{Handle, maybe_yield};

use std::cell::{Cell, RefCell};
use std::io;
use std::net::SocketAddr;
use std::rc::Rc;

/// Counters kept by an [`EchoServer`].
#[derive(Clone, Debug, Default)]
pub struct EchoStats {
    /// Connections accepted so far.
    pub accepted: u64,

    /// Connections currently being served.
    pub active: u64,

    /// Bytes echoed across all connections.
    pub bytes_echoed: u64,

    /// One record per closed connection, in closing order.
    pub closed: Vec<ConnectionRecord>,
}

impl EchoStats {
    pub(crate) fn record(&mut self, record: ConnectionRecord) {
        self.active = self.active.saturating_sub(1);
        self.closed.push(record);
    }
}

/// A connection-per-fiber TCP echo server.
pub struct EchoServer {
    handle: Handle,
    listener: Rc<TcpListener>,
    stats: Rc<RefCell<EchoStats>>,
    stopping: Rc<Cell<bool>>,
}

impl EchoServer {
    /// Binds the listening socket.
    pub fn bind(handle: &Handle, address: SocketAddr, options: ListenOptions) -> Result<Self> {
        let listener = TcpListener::bind(handle, address, options)?;

        Ok(Self {
            handle: handle.clone(),
            listener: Rc::new(listener),
            stats: Rc::new(RefCell::new(EchoStats::default())),
            stopping: Rc::new(Cell::new(false)),
        })
    }

    /// Starts the accept loop.
    ///
    /// The returned future resolves once [`stop`](Self::stop) has been
    /// called, and fails if accepting fails for any other reason.
    pub fn serve(&self) -> Future<()> {
        let accept_loop = AcceptLoop {
            handle: self.handle.clone(),
            listener: self.listener.clone(),
            stats: self.stats.clone(),
            stopping: self.stopping.clone(),
        };

        self.handle.spawn(accept_loop.run())
    }

    /// Stops accepting new connections.
    ///
    /// Connections already being served keep running until their peers
    /// close them.
    pub fn stop(&self) {
        if self.stopping.replace(true) {
            return;
        }

        tracing::info!("stopping echo server");
        self.listener.abort_accept();
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Returns a snapshot of the server counters.
    pub fn stats(&self) -> EchoStats {
        self.stats.borrow().clone()
    }
}

struct AcceptLoop {
    handle: Handle,
    listener: Rc<TcpListener>,
    stats: Rc<RefCell<EchoStats>>,
    stopping: Rc<Cell<bool>>,
}

impl AcceptLoop {
    async fn run(self) -> Result<()> {
        tracing::info!(address = %self.listener.local_addr()?, "echo server listening");

        while !self.stopping.get() {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    {
                        let mut stats = self.stats.borrow_mut();
                        stats.accepted += 1;
                        stats.active += 1;
                    }

                    let connection = Connection::new(stream, peer);
                    self.handle
                        .spawn_detached(connection.run(self.stats.clone()));
                }
                Err(_) if self.stopping.get() => break,
                Err(err) if is_transient(err.io_kind()) => {
                    tracing::warn!(error = %err, "accept failed, retrying");
                }
                Err(err) => {
                    tracing::error!(error = %err, "accept loop failed");
                    return Err(err);
                }
            }

            maybe_yield().await;
        }

        tracing::info!("echo server stopped");
        Ok(())
    }
}

fn is_transient(kind: Option<io::ErrorKind>) -> bool {
    matches!(
        kind,
        Some(
            io::ErrorKind::ConnectionAborted
                | io::ErrorKind::ConnectionReset
                | io::ErrorKind::Interrupted
        )
    )
}
