use super::socket::Socket;
use crate::error::{Error, Result};
use crate::future::Future;
use crate::reactor::Direction;
use crate::reactor::poller::platform::{
    sys_connect, sys_peername, sys_read, sys_send, sys_shutdown, sys_socket, sys_sockname,
    sys_take_socket_error,
};
use crate::runtime::Handle;

use std::io;
use std::net::{Shutdown, SocketAddr};
use std::rc::Rc;

/// Largest chunk returned by a single read.
const READ_CHUNK: usize = 8192;

/// A non-blocking TCP stream.
///
/// `TcpStream` exchanges bytes through the reactor: each read or write
/// tries the syscall first and waits for readiness only when it would block.
/// At most one read and one write may be in flight at a time.
pub struct TcpStream {
    socket: Rc<Socket>,
}

impl TcpStream {
    pub(crate) fn from_socket(socket: Socket) -> Self {
        Self {
            socket: Rc::new(socket),
        }
    }

    /// Establishes a TCP connection to `address`.
    pub fn connect(handle: &Handle, address: SocketAddr) -> Future<TcpStream> {
        let fd = match sys_socket(&address) {
            Ok(fd) => fd,
            Err(err) => return handle.failed(err.into()),
        };

        let socket = Socket::new(fd, handle);

        match sys_connect(fd, &address) {
            Ok(()) => handle.ready(Self::from_socket(socket)),
            Err(err) if in_progress(&err) => handle
                .readiness(fd, Direction::Write)
                .then(move |()| match sys_take_socket_error(socket.fd) {
                    Ok(None) => Ok(Self::from_socket(socket)),
                    Ok(Some(err)) | Err(err) => Err(Error::Io(err)),
                }),
            Err(err) => handle.failed(err.into()),
        }
    }

    /// Reads the next chunk of bytes.
    ///
    /// Resolves with at most 8 KiB; an empty buffer means the peer shut down
    /// its side of the connection.
    pub fn read(&self) -> Future<Vec<u8>> {
        read_from(self.socket.clone())
    }

    /// Writes the whole buffer.
    pub fn write_all(&self, data: Vec<u8>) -> Future<()> {
        write_from(self.socket.clone(), data, 0)
    }

    /// Shuts down the read, write, or both halves of this connection.
    pub fn shutdown(&self, how: Shutdown) -> Result<()> {
        Ok(sys_shutdown(self.socket.fd, how)?)
    }

    /// Returns the address of the remote peer.
    pub fn peer_addr(&self) -> Result<SocketAddr> {
        Ok(sys_peername(self.socket.fd)?)
    }

    /// Returns the local address of this connection.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(sys_sockname(self.socket.fd)?)
    }

    /// Splits the stream into a read half and a write half.
    ///
    /// Both halves share the underlying socket, which is closed once both
    /// are dropped.
    pub fn split(self) -> (ReadHalf, WriteHalf) {
        (
            ReadHalf {
                socket: self.socket.clone(),
            },
            WriteHalf {
                socket: self.socket,
            },
        )
    }
}

/// The read half of a [`TcpStream`], created by [`TcpStream::split`].
pub struct ReadHalf {
    socket: Rc<Socket>,
}

impl ReadHalf {
    /// Reads the next chunk of bytes; empty means end of stream.
    pub fn read(&self) -> Future<Vec<u8>> {
        read_from(self.socket.clone())
    }
}

/// The write half of a [`TcpStream`], created by [`TcpStream::split`].
pub struct WriteHalf {
    socket: Rc<Socket>,
}

impl WriteHalf {
    /// Writes the whole buffer.
    pub fn write_all(&self, data: Vec<u8>) -> Future<()> {
        write_from(self.socket.clone(), data, 0)
    }

    /// Shuts down the write direction, signalling end of stream to the peer.
    pub fn shutdown(&self) -> Result<()> {
        Ok(sys_shutdown(self.socket.fd, Shutdown::Write)?)
    }
}

fn in_progress(err: &io::Error) -> bool {
    err.raw_os_error() == Some(libc::EINPROGRESS) || err.kind() == io::ErrorKind::WouldBlock
}

fn read_from(socket: Rc<Socket>) -> Future<Vec<u8>> {
    let mut buffer = vec![0u8; READ_CHUNK];

    loop {
        match sys_read(socket.fd, &mut buffer) {
            Ok(n) => {
                buffer.truncate(n);
                return socket.handle.ready(buffer);
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
                let handle = socket.handle.clone();

                return handle
                    .readiness(socket.fd, Direction::Read)
                    .then(move |()| read_from(socket));
            }
            Err(err) => return socket.handle.failed(err.into()),
        }
    }
}

fn write_from(socket: Rc<Socket>, data: Vec<u8>, mut offset: usize) -> Future<()> {
    while offset < data.len() {
        match sys_send(socket.fd, &data[offset..]) {
            Ok(0) => {
                return socket.handle.failed(
                    io::Error::new(io::ErrorKind::WriteZero, "write returned zero bytes").into(),
                );
            }
            Ok(n) => offset += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
                let handle = socket.handle.clone();

                return handle
                    .readiness(socket.fd, Direction::Write)
                    .then(move |()| write_from(socket, data, offset));
            }
            Err(err) => return socket.handle.failed(err.into()),
        }
    }

    socket.handle.ready(())
}
