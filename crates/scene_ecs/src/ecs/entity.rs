//! Entity implementation

use std::fmt;

/// Entity identifier
///
/// This is the owning-entity back-reference a component carries while it is
/// attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity {
    id: u32,
}

impl Entity {
    /// Create a new entity with the given ID
    pub(crate) const fn new(id: u32) -> Self {
        Self { id }
    }

    /// Get the entity ID
    pub const fn id(&self) -> u32 {
        self.id
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.id)
    }
}
