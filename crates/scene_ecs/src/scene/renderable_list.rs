//! Render-layer ordered index of renderable components
//!
//! The scene keeps one of these for all of its entities. Component registries
//! register and unregister their renderable components during their sync
//! step or teardown; rendering code walks the index in layer order.

use crate::ecs::{ComponentHandle, Renderable};

/// Registration surface a component registry needs from the scene
pub trait RenderableIndex {
    /// Start tracking a renderable component
    fn register(&mut self, handle: ComponentHandle, renderable: &dyn Renderable);

    /// Stop tracking a renderable component
    fn unregister(&mut self, handle: ComponentHandle);
}

/// One tracked renderable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderableEntry {
    /// Identity of the component
    pub handle: ComponentHandle,

    /// Rendering layer captured at registration
    pub render_layer: i32,
}

/// Renderable components sorted by render layer
///
/// Sorting is lazy and stable, so components on the same layer keep their
/// registration order.
#[derive(Debug, Default)]
pub struct RenderableComponentList {
    entries: Vec<RenderableEntry>,
    needs_sort: bool,
}

impl RenderableComponentList {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked renderables
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is tracked
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `handle` is tracked
    pub fn contains(&self, handle: ComponentHandle) -> bool {
        self.entries.iter().any(|entry| entry.handle == handle)
    }

    /// Render layer `handle` was registered with
    pub fn layer_of(&self, handle: ComponentHandle) -> Option<i32> {
        self.entries
            .iter()
            .find(|entry| entry.handle == handle)
            .map(|entry| entry.render_layer)
    }

    /// Sort by render layer if registrations changed since the last sort
    pub fn update_lists(&mut self) {
        if self.needs_sort {
            self.entries.sort_by_key(|entry| entry.render_layer);
            self.needs_sort = false;
        }
    }

    /// Entries in render order
    pub fn iter(&mut self) -> std::slice::Iter<'_, RenderableEntry> {
        self.update_lists();
        self.entries.iter()
    }

    /// Entries as of the last sort
    ///
    /// In render order whenever [`update_lists`](Self::update_lists) ran after
    /// the last registration, which [`Scene::update`](super::Scene::update)
    /// guarantees at the end of every frame.
    pub fn entries(&self) -> &[RenderableEntry] {
        &self.entries
    }

    /// Whether registrations changed since the last sort
    pub const fn needs_sort(&self) -> bool {
        self.needs_sort
    }
}

impl RenderableIndex for RenderableComponentList {
    fn register(&mut self, handle: ComponentHandle, renderable: &dyn Renderable) {
        if self.contains(handle) {
            log::warn!("Renderable {} is already registered", handle);
            return;
        }

        self.entries.push(RenderableEntry {
            handle,
            render_layer: renderable.render_layer(),
        });
        self.needs_sort = true;
    }

    fn unregister(&mut self, handle: ComponentHandle) {
        // removal keeps the remaining entries sorted
        if let Some(position) = self.entries.iter().position(|entry| entry.handle == handle) {
            self.entries.remove(position);
        } else {
            log::warn!("Renderable {} was not registered", handle);
        }
    }
}
