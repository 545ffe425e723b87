//! Component trait and lifecycle hooks
//!
//! Components are handed to an entity's [`ComponentList`](super::ComponentList)
//! as boxed trait objects. The registry owns them from then on and drives
//! their lifecycle hooks during the once-per-frame sync step.

use std::any::Any;
use std::fmt;

use super::{ComponentContext, Entity};
use crate::foundation::collections::ComponentKey;

/// Upcast helper so trait objects can be downcast to their concrete type
pub trait AsAny: Any {
    /// View as `&dyn Any`
    fn as_any(&self) -> &dyn Any;

    /// View as `&mut dyn Any`
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Capability of components that take part in the scene's render ordering
pub trait Renderable {
    /// Rendering layer for sorting (lower layers render first)
    fn render_layer(&self) -> i32;
}

/// An attachable unit of behavior or data
///
/// Every hook has a no-op default. Hooks receive a [`ComponentContext`] that
/// names the owning entity and can look up sibling components.
pub trait Component: AsAny {
    /// Human readable type name used in diagnostics
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Whether this component is enabled
    fn enabled(&self) -> bool {
        true
    }

    /// Change the enabled state
    ///
    /// Components that never disable themselves can keep the default, which
    /// ignores the request.
    fn set_enabled(&mut self, _enabled: bool) {}

    /// Returns the renderable capability when this component has one
    ///
    /// Must be free of side effects; the registry may call it at any time.
    fn as_renderable(&self) -> Option<&dyn Renderable> {
        None
    }

    /// Called once the component is part of the committed set
    fn on_added_to_entity(&mut self, _ctx: &ComponentContext<'_>) {}

    /// Called after every component admitted in the same sync step has
    /// received `on_added_to_entity`
    fn on_awake(&mut self, _ctx: &ComponentContext<'_>) {}

    /// Called when the component starts running
    fn on_enabled(&mut self, _ctx: &ComponentContext<'_>) {}

    /// Called when the component or its entity is disabled
    fn on_disabled(&mut self, _ctx: &ComponentContext<'_>) {}

    /// Called exactly once when the component leaves its entity
    fn on_removed_from_entity(&mut self, _ctx: &ComponentContext<'_>) {}
}

impl<'a> dyn Component + 'a {
    /// Check whether the concrete type is `T`
    pub fn is<T: Component>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Downcast to the concrete type
    pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Mutably downcast to the concrete type
    pub fn downcast_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Whether this is the renderable variant
    pub fn is_renderable(&self) -> bool {
        self.as_renderable().is_some()
    }
}

impl<'a> fmt::Debug for dyn Component + 'a {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("type", &self.type_name())
            .field("enabled", &self.enabled())
            .field("renderable", &self.is_renderable())
            .finish()
    }
}

/// Identity of a component: the entity that owns it plus its slot key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentHandle {
    entity: Entity,
    key: ComponentKey,
}

impl ComponentHandle {
    pub(crate) const fn new(entity: Entity, key: ComponentKey) -> Self {
        Self { entity, key }
    }

    /// Entity this handle was issued by
    pub const fn entity(&self) -> Entity {
        self.entity
    }

    /// Key inside the entity's component storage
    pub const fn key(&self) -> ComponentKey {
        self.key
    }
}

impl fmt::Display for ComponentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{:?}", self.entity, self.key)
    }
}
