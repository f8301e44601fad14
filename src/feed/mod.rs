pub mod connection;
pub mod messages;
pub mod queue;

pub use connection::BridgeServer;
