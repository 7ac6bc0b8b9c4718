pub mod dispatcher;
pub mod replies;
pub mod worker;

use std::future::Future;

use crate::error::Result;
use crate::types::Reply;

pub use dispatcher::{CommandDispatcher, Outcome};
pub use worker::CommandWorker;

/// Outbound side of one command: where replies for that interaction go.
pub trait Responder: Send + Sync {
    /// Tell the platform the command was received and a reply will follow.
    fn acknowledge(&self) -> impl Future<Output = Result<()>> + Send;

    /// Post a reply (text, optionally with one attachment).
    fn send(&self, reply: Reply) -> impl Future<Output = Result<()>> + Send;

    /// Replace the text of the original response.
    fn edit_original(&self, content: &str) -> impl Future<Output = Result<()>> + Send;
}
