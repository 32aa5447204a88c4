//! TCP echo service.
//!
//! One fiber accepts connections and spawns a detached fiber per client;
//! each client fiber reads chunks and writes them back until the peer closes
//! its side. Errors on one connection end only that connection.
//!
//! ```rust,ignore
//! let server = EchoServer::bind(handle, addr, ListenOptions::new().reuse_address(true))?;
//! let done = server.serve();
//! // ...
//! server.stop();
//! ```

mod connection;
mod server;

pub use connection::{ConnectionRecord, ConnectionState};
pub use server::{EchoServer, EchoStats};
