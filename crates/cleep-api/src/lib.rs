// cleep-api: Async Rust client for the Cleep RPC server (commands + event polling)

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::{COMMAND_TIMEOUT_MARGIN, RpcClient};
pub use error::Error;
pub use models::{CommandRequest, PollEvent, RpcResponse};
pub use transport::{TlsMode, TransportConfig};
