//! Entity-Component-System implementation
//!
//! Each entity owns a [`ComponentList`] that stages additions and removals
//! and commits them once per frame.

pub mod component;
pub mod component_list;
pub mod entity;
pub mod error;

#[cfg(test)]
mod tests;

pub use component::{AsAny, Component, ComponentHandle, Renderable};
pub use component_list::{ComponentContext, ComponentList, Iter, SyncReport};
pub use entity::Entity;
pub use error::ComponentError;
