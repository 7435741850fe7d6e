use thiserror::Error;

use crate::ids::NodeId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("menu item {0} not found")]
    NodeNotFound(NodeId),
    #[error("property {name:?} not found on menu item {id}")]
    PropertyNotFound { id: NodeId, name: String },
    #[error("invalid parent: {0}")]
    InvalidParent(NodeId),
    /// The mutation itself has been committed; only telling the remote side
    /// about it failed.
    #[error("notification delivery failed: {}", .0.join("; "))]
    Notification(Vec<String>),
    #[error("event handler failed: {0}")]
    Handler(String),
    #[error("inconsistent state: {0}")]
    InconsistentState(String),
}
