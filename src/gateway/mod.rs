pub mod connection;
pub mod messages;
pub mod responder;

pub use connection::{GatewayClient, IncomingCommand};
pub use responder::InteractionResponder;
