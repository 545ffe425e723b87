//! Specialized collection types

pub use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Generational key of a component inside one entity's registry
    pub struct ComponentKey;
}

/// Handle-based map using slot map for stable references
pub type HandleMap<T> = SlotMap<ComponentKey, T>;
