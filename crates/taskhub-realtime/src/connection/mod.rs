//! WebSocket connection management: protocol state and socket tasks.

pub mod handle;
pub mod session;

pub use handle::{Connection, ConnectionId, Flow};
pub use session::serve;
