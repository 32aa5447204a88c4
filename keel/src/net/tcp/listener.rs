use super::socket::Socket;
use super::stream::TcpStream;
use crate::error::Result;
use crate::future::Future;
use crate::reactor::Direction;
use crate::reactor::poller::platform::{
    sys_accept, sys_bind, sys_close, sys_listen, sys_set_reuseaddr, sys_socket, sys_sockname,
};
use crate::runtime::Handle;

use std::io;
use std::net::SocketAddr;
use std::rc::Rc;

/// Socket options applied by [`TcpListener::bind`].
#[derive(Clone, Copy, Debug)]
pub struct ListenOptions {
    /// Enables `SO_REUSEADDR` so a restarted server can bind immediately.
    pub reuse_address: bool,

    /// Maximum length of the pending connection queue.
    pub backlog: u32,
}

impl ListenOptions {
    pub fn new() -> Self {
        Self {
            reuse_address: false,
            backlog: 128,
        }
    }

    pub fn reuse_address(mut self, enabled: bool) -> Self {
        self.reuse_address = enabled;
        self
    }

    pub fn backlog(mut self, backlog: u32) -> Self {
        self.backlog = backlog;
        self
    }
}

impl Default for ListenOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// A non-blocking TCP listener.
///
/// `TcpListener` accepts incoming connections through the reactor without
/// blocking the scheduler.
pub struct TcpListener {
    socket: Rc<Socket>,
}

impl TcpListener {
    /// Binds a listener to `address`.
    ///
    /// IPv6 listeners are dual-stack. `SO_REUSEADDR` is set before binding
    /// when `options.reuse_address` is enabled.
    pub fn bind(handle: &Handle, address: SocketAddr, options: ListenOptions) -> Result<Self> {
        let fd = sys_socket(&address)?;

        let configured = (|| -> io::Result<()> {
            if options.reuse_address {
                sys_set_reuseaddr(fd)?;
            }

            sys_bind(fd, &address)?;
            sys_listen(fd, options.backlog)
        })();

        if let Err(err) = configured {
            sys_close(fd);
            return Err(err.into());
        }

        Ok(Self {
            socket: Rc::new(Socket::new(fd, handle)),
        })
    }

    /// Accepts an incoming connection.
    ///
    /// The future resolves with the connected stream and the peer address
    /// once a client connects.
    pub fn accept(&self) -> Future<(TcpStream, SocketAddr)> {
        accept_from(self.socket.clone())
    }

    /// Fails a pending [`accept`](Self::accept) with `ConnectionAborted`.
    pub fn abort_accept(&self) {
        self.socket
            .handle
            .abort_io(self.socket.fd, io::ErrorKind::ConnectionAborted);
    }

    /// Returns the local socket address of this listener.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(sys_sockname(self.socket.fd)?)
    }
}

fn accept_from(socket: Rc<Socket>) -> Future<(TcpStream, SocketAddr)> {
    loop {
        match sys_accept(socket.fd) {
            Ok((fd, peer)) => {
                let stream = TcpStream::from_socket(Socket::new(fd, &socket.handle));
                return socket.handle.ready((stream, peer));
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
                let handle = socket.handle.clone();

                return handle
                    .readiness(socket.fd, Direction::Read)
                    .then(move |()| accept_from(socket));
            }
            Err(err) => return socket.handle.failed(err.into()),
        }
    }
}
