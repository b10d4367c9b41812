use crate::graph::NodeIndex;
use thiserror::Error;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Error)]
pub enum WiringError {
    #[error("outlet is already bound to node {0}")]
    OutletAlreadyBound(NodeIndex),
    #[error("node {0} belongs to a different world")]
    ForeignWorld(NodeIndex),
    #[error("cannot merge an empty list of streams")]
    EmptyMerge,
}
