//! TCP networking primitives.
//!
//! This module provides non-blocking TCP types driven by the reactor.
//! Every operation returns a [`Future`](crate::Future): continuation code
//! chains on it with the combinators, fibers simply `.await` it.
//!
//! It exposes:
//! - [`TcpListener`] for accepting connections,
//! - [`TcpStream`] and its [`ReadHalf`]/[`WriteHalf`] for exchanging bytes,
//! - [`ListenOptions`] for socket configuration before `listen`.

mod tcp;

pub use tcp::listener::{ListenOptions, TcpListener};
pub use tcp::stream::{ReadHalf, TcpStream, WriteHalf};
