//! Component registry errors

use thiserror::Error;

use super::ComponentHandle;

/// Misuse of an entity's component registry
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentError {
    /// The handle does not name a live component of this entity
    #[error("Component {0} is not attached to this entity")]
    NotAttached(ComponentHandle),

    /// The component is already waiting for the next sync step to remove it
    #[error("Component {0} is already queued for removal")]
    RemovalAlreadyQueued(ComponentHandle),
}
