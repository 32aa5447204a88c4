use libc::{
    AF_INET, AF_INET6, F_GETFL, F_SETFD, F_SETFL, FD_CLOEXEC, IPPROTO_IPV6, IPV6_V6ONLY,
    O_NONBLOCK, SHUT_RD, SHUT_RDWR, SHUT_WR, SO_ERROR, SO_REUSEADDR, SOCK_STREAM, SOL_SOCKET,
    c_int, sockaddr, sockaddr_in, sockaddr_in6, sockaddr_storage, socklen_t,
};
use std::net::{Ipv4Addr, Ipv6Addr, Shutdown, SocketAddr, SocketAddrV4, SocketAddrV6};
use std::os::fd::RawFd;
use std::{io, mem};

#[cfg(target_os = "linux")]
const SEND_FLAGS: c_int = libc::MSG_NOSIGNAL;

#[cfg(not(target_os = "linux"))]
const SEND_FLAGS: c_int = 0;

/// Turns a `-1` return into the thread's last OS error.
fn cvt<T: Copy + PartialOrd + Default>(rc: T) -> io::Result<T> {
    if rc < T::default() {
        Err(io::Error::last_os_error())
    } else {
        Ok(rc)
    }
}

fn setsockopt_int(fd: RawFd, level: c_int, name: c_int, value: c_int) -> io::Result<()> {
    let len = mem::size_of::<c_int>() as socklen_t;
    cvt(unsafe { libc::setsockopt(fd, level, name, &value as *const c_int as *const _, len) })?;
    Ok(())
}

/// Reads from a non-blocking descriptor into `buffer`.
pub(crate) fn sys_read(fd: RawFd, buffer: &mut [u8]) -> io::Result<usize> {
    let n = cvt(unsafe { libc::read(fd, buffer.as_mut_ptr() as *mut _, buffer.len()) })?;
    Ok(n as usize)
}

/// Sends `buffer` on a non-blocking socket.
///
/// A peer that went away is reported as an error instead of `SIGPIPE`
/// where the platform allows it.
pub(crate) fn sys_send(fd: RawFd, buffer: &[u8]) -> io::Result<usize> {
    let n = cvt(unsafe { libc::send(fd, buffer.as_ptr() as *const _, buffer.len(), SEND_FLAGS) })?;
    Ok(n as usize)
}

pub(crate) fn sys_close(fd: RawFd) {
    unsafe { libc::close(fd) };
}

/// Puts a descriptor in non-blocking, close-on-exec mode.
pub(crate) fn sys_set_nonblocking(fd: RawFd) -> io::Result<()> {
    let flags = cvt(unsafe { libc::fcntl(fd, F_GETFL) })?;
    cvt(unsafe { libc::fcntl(fd, F_SETFL, flags | O_NONBLOCK) })?;
    cvt(unsafe { libc::fcntl(fd, F_SETFD, FD_CLOEXEC) })?;
    Ok(())
}

/// Runs `configure` on a fresh descriptor, closing it if that fails.
fn configured(fd: RawFd, configure: impl FnOnce(RawFd) -> io::Result<()>) -> io::Result<RawFd> {
    match configure(fd) {
        Ok(()) => Ok(fd),
        Err(err) => {
            sys_close(fd);
            Err(err)
        }
    }
}

/// Creates a non-blocking stream socket for `addr`'s family.
///
/// IPv6 sockets are made dual-stack so they also accept IPv4 peers.
pub(crate) fn sys_socket(addr: &SocketAddr) -> io::Result<RawFd> {
    let family = match addr {
        SocketAddr::V4(_) => AF_INET,
        SocketAddr::V6(_) => AF_INET6,
    };

    let fd = cvt(unsafe { libc::socket(family, SOCK_STREAM, 0) })?;

    configured(fd, |fd| {
        sys_set_nonblocking(fd)?;

        if family == AF_INET6 {
            setsockopt_int(fd, IPPROTO_IPV6, IPV6_V6ONLY, 0)?;
        }

        Ok(())
    })
}

pub(crate) fn sys_set_reuseaddr(fd: RawFd) -> io::Result<()> {
    setsockopt_int(fd, SOL_SOCKET, SO_REUSEADDR, 1)
}

pub(crate) fn sys_bind(fd: RawFd, addr: &SocketAddr) -> io::Result<()> {
    let (storage, len) = encode_addr(addr);
    cvt(unsafe { libc::bind(fd, &storage as *const _ as *const sockaddr, len) })?;
    Ok(())
}

pub(crate) fn sys_listen(fd: RawFd, backlog: u32) -> io::Result<()> {
    let backlog = backlog.min(c_int::MAX as u32) as c_int;
    cvt(unsafe { libc::listen(fd, backlog) })?;
    Ok(())
}

/// Accepts a pending connection as a non-blocking socket.
pub(crate) fn sys_accept(fd: RawFd) -> io::Result<(RawFd, SocketAddr)> {
    let mut storage: sockaddr_storage = unsafe { mem::zeroed() };
    let mut len = STORAGE_LEN;

    let client = cvt(unsafe { libc::accept(fd, &mut storage as *mut _ as *mut sockaddr, &mut len) })?;

    let client = configured(client, sys_set_nonblocking)?;

    match decode_addr(&storage) {
        Ok(peer) => Ok((client, peer)),
        Err(err) => {
            sys_close(client);
            Err(err)
        }
    }
}

/// Starts a non-blocking connect; `EINPROGRESS` is returned as an error.
pub(crate) fn sys_connect(fd: RawFd, addr: &SocketAddr) -> io::Result<()> {
    let (storage, len) = encode_addr(addr);
    cvt(unsafe { libc::connect(fd, &storage as *const _ as *const sockaddr, len) })?;
    Ok(())
}

/// Takes the pending error of a socket, if any.
///
/// Used once a non-blocking `connect` reports writability.
pub(crate) fn sys_take_socket_error(fd: RawFd) -> io::Result<Option<io::Error>> {
    let mut code: c_int = 0;
    let mut len = mem::size_of::<c_int>() as socklen_t;

    cvt(unsafe {
        libc::getsockopt(fd, SOL_SOCKET, SO_ERROR, &mut code as *mut c_int as *mut _, &mut len)
    })?;

    Ok((code != 0).then(|| io::Error::from_raw_os_error(code)))
}

pub(crate) fn sys_shutdown(fd: RawFd, how: Shutdown) -> io::Result<()> {
    let how = match how {
        Shutdown::Read => SHUT_RD,
        Shutdown::Write => SHUT_WR,
        Shutdown::Both => SHUT_RDWR,
    };

    cvt(unsafe { libc::shutdown(fd, how) })?;
    Ok(())
}

type AddrQuery = unsafe extern "C" fn(c_int, *mut sockaddr, *mut socklen_t) -> c_int;

fn query_addr(fd: RawFd, query: AddrQuery) -> io::Result<SocketAddr> {
    let mut storage: sockaddr_storage = unsafe { mem::zeroed() };
    let mut len = STORAGE_LEN;

    cvt(unsafe { query(fd, &mut storage as *mut _ as *mut sockaddr, &mut len) })?;
    decode_addr(&storage)
}

pub(crate) fn sys_sockname(fd: RawFd) -> io::Result<SocketAddr> {
    query_addr(fd, libc::getsockname)
}

pub(crate) fn sys_peername(fd: RawFd) -> io::Result<SocketAddr> {
    query_addr(fd, libc::getpeername)
}

const STORAGE_LEN: socklen_t = mem::size_of::<sockaddr_storage>() as socklen_t;

fn decode_addr(storage: &sockaddr_storage) -> io::Result<SocketAddr> {
    match storage.ss_family as c_int {
        AF_INET => {
            let raw = unsafe { &*(storage as *const _ as *const sockaddr_in) };
            let ip = Ipv4Addr::from(u32::from_be(raw.sin_addr.s_addr));

            Ok(SocketAddrV4::new(ip, u16::from_be(raw.sin_port)).into())
        }
        AF_INET6 => {
            let raw = unsafe { &*(storage as *const _ as *const sockaddr_in6) };
            let ip = Ipv6Addr::from(raw.sin6_addr.s6_addr);
            let port = u16::from_be(raw.sin6_port);

            Ok(SocketAddrV6::new(ip, port, raw.sin6_flowinfo, raw.sin6_scope_id).into())
        }
        family => Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("unsupported address family {family}"),
        )),
    }
}

fn encode_addr(addr: &SocketAddr) -> (sockaddr_storage, socklen_t) {
    let mut storage: sockaddr_storage = unsafe { mem::zeroed() };

    let len = match addr {
        SocketAddr::V4(v4) => {
            let raw = unsafe { &mut *(&mut storage as *mut _ as *mut sockaddr_in) };
            raw.sin_family = AF_INET as _;
            raw.sin_port = v4.port().to_be();
            raw.sin_addr.s_addr = u32::from(*v4.ip()).to_be();
            mem::size_of::<sockaddr_in>()
        }
        SocketAddr::V6(v6) => {
            let raw = unsafe { &mut *(&mut storage as *mut _ as *mut sockaddr_in6) };
            raw.sin6_family = AF_INET6 as _;
            raw.sin6_port = v6.port().to_be();
            raw.sin6_addr.s6_addr = v6.ip().octets();
            raw.sin6_flowinfo = v6.flowinfo();
            raw.sin6_scope_id = v6.scope_id();
            mem::size_of::<sockaddr_in6>()
        }
    };

    (storage, len as socklen_t)
}
