//! Per-entity component registry
//!
//! Game logic may add and remove components at any point in a frame. Those
//! requests are staged in two buffers and only applied by
//! [`ComponentList::update_lists`], which the owning entity calls once per
//! frame. Between sync steps the committed set never changes, so iteration
//! and indexed access always observe a consistent view.
//!
//! Misuse policy:
//! - adding one instance twice cannot happen, [`ComponentList::add`] takes
//!   ownership and hands out a fresh handle
//! - removing a handle that is not attached yields
//!   [`ComponentError::NotAttached`]
//! - removing a handle twice before the next sync yields
//!   [`ComponentError::RemovalAlreadyQueued`]
//! - removing a handle that is still pending addition cancels the addition
//!   without firing any hook

use std::fmt;

use super::{Component, ComponentError, ComponentHandle, Entity};
use crate::foundation::collections::{ComponentKey, HandleMap};
use crate::scene::RenderableIndex;

struct Slot {
    /// `None` only while the component is running one of its own hooks
    component: Option<Box<dyn Component>>,
    owner: Option<Entity>,
    /// Set while the component is tracked by the renderable index
    registered: bool,
}

/// Read-only view used by typed lookup, shared with hook contexts
#[derive(Clone, Copy)]
struct Lookup<'a> {
    slots: &'a HandleMap<Slot>,
    committed: &'a [ComponentKey],
    pending_add: &'a [ComponentKey],
}

impl<'a> Lookup<'a> {
    fn resolve(self, key: ComponentKey) -> Option<&'a dyn Component> {
        self.slots.get(key)?.component.as_deref()
    }

    fn committed_then_pending(self) -> impl Iterator<Item = (ComponentKey, &'a dyn Component)> + 'a {
        self.committed
            .iter()
            .chain(self.pending_add)
            .filter_map(move |&key| Some((key, self.resolve(key)?)))
    }

    fn find_key<T: Component>(self) -> Option<ComponentKey> {
        self.committed_then_pending()
            .find(|(_, component)| component.is::<T>())
            .map(|(key, _)| key)
    }

    fn first<T: Component>(self) -> Option<&'a T> {
        self.committed_then_pending()
            .find_map(|(_, component)| component.downcast_ref::<T>())
    }

    fn all<T: Component>(self) -> impl Iterator<Item = &'a T> + 'a {
        self.committed_then_pending()
            .filter_map(|(_, component)| component.downcast_ref::<T>())
    }
}

/// What a lifecycle hook can see of its entity
///
/// The component running the hook is not visible through its own context.
pub struct ComponentContext<'a> {
    handle: ComponentHandle,
    lookup: Lookup<'a>,
}

impl<'a> ComponentContext<'a> {
    /// The owning entity
    pub const fn entity(&self) -> Entity {
        self.handle.entity()
    }

    /// Handle of the component running the hook
    pub const fn handle(&self) -> ComponentHandle {
        self.handle
    }

    /// First sibling of type `T`, committed components first
    pub fn get_component<T: Component>(&self) -> Option<&'a T> {
        self.lookup.first::<T>()
    }

    /// Every sibling of type `T`, committed components first
    pub fn get_components<T: Component>(&self) -> impl Iterator<Item = &'a T> + 'a {
        self.lookup.all::<T>()
    }
}

/// Result of one sync step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Components admitted into the committed set
    pub added: usize,

    /// Components evicted from the committed set
    pub removed: usize,
}

impl SyncReport {
    /// True when the sync step changed nothing
    pub const fn is_empty(&self) -> bool {
        self.added == 0 && self.removed == 0
    }
}

/// The components attached to one entity
pub struct ComponentList {
    entity: Entity,
    slots: HandleMap<Slot>,
    committed: Vec<ComponentKey>,
    pending_add: Vec<ComponentKey>,
    pending_remove: Vec<ComponentKey>,
    /// Start of the still-pending part of `pending_add` during a sync step
    pending_cursor: usize,
}

impl ComponentList {
    /// Create an empty registry for `entity`
    pub fn new(entity: Entity) -> Self {
        Self::with_capacity(entity, 0)
    }

    /// Create an empty registry with storage reserved for `capacity` components
    pub fn with_capacity(entity: Entity, capacity: usize) -> Self {
        Self {
            entity,
            slots: HandleMap::with_capacity_and_key(capacity),
            committed: Vec::with_capacity(capacity),
            pending_add: Vec::new(),
            pending_remove: Vec::new(),
            pending_cursor: 0,
        }
    }

    /// The owning entity
    pub const fn entity(&self) -> Entity {
        self.entity
    }

    /// Queue a component for admission at the next sync step
    pub fn add<C: Component>(&mut self, component: C) -> ComponentHandle {
        self.add_boxed(Box::new(component))
    }

    /// Queue an already boxed component for admission at the next sync step
    ///
    /// The component is owned by this entity from now on, but stays invisible
    /// to iteration and indexed access until [`update_lists`](Self::update_lists).
    /// Typed lookup finds it immediately.
    pub fn add_boxed(&mut self, component: Box<dyn Component>) -> ComponentHandle {
        let type_name = component.type_name();
        let key = self.slots.insert(Slot {
            component: Some(component),
            owner: Some(self.entity),
            registered: false,
        });
        self.pending_add.push(key);

        let handle = self.handle(key);
        log::trace!("Queued {} ({}) for addition", type_name, handle);
        handle
    }

    /// Queue a component for removal at the next sync step
    ///
    /// The component stays committed and visible until then. Removing a
    /// component that was added this frame cancels the addition instead.
    pub fn remove(&mut self, handle: ComponentHandle) -> Result<(), ComponentError> {
        let key = self.attached_key(handle).ok_or_else(|| {
            log::warn!("Rejected removal of {}: not attached to {}", handle, self.entity);
            ComponentError::NotAttached(handle)
        })?;

        if let Some(position) = self.pending_add.iter().position(|&k| k == key) {
            self.pending_add.remove(position);
            if let Some(mut slot) = self.slots.remove(key) {
                slot.owner = None;
            }
            log::debug!("Cancelled pending addition of {}", handle);
            return Ok(());
        }

        if self.pending_remove.contains(&key) {
            log::warn!("Rejected removal of {}: already queued", handle);
            return Err(ComponentError::RemovalAlreadyQueued(handle));
        }

        self.pending_remove.push(key);
        log::trace!("Queued {} for removal", handle);
        Ok(())
    }

    /// Commit staged removals and additions, firing lifecycle hooks
    ///
    /// Removals run first, in the order they were queued: unregister from
    /// `renderables`, leave the committed set, `on_removed_from_entity`, clear
    /// the owner. Additions then run in two passes over the batch. The first
    /// registers renderables, appends to the committed set and fires
    /// `on_added_to_entity`. The second fires `on_awake`, followed by
    /// `on_enabled` when both `entity_enabled` and the component are enabled.
    pub fn update_lists<R>(&mut self, entity_enabled: bool, renderables: &mut R) -> SyncReport
    where
        R: RenderableIndex + ?Sized,
    {
        let mut report = SyncReport::default();

        if !self.pending_remove.is_empty() {
            for key in std::mem::take(&mut self.pending_remove) {
                // teardown may already have detached it; the slot then stays
                // with the committed set the caller is about to discard
                if self.detach(key, renderables, true) {
                    self.slots.remove(key);
                    report.removed += 1;
                }
            }
        }

        if !self.pending_add.is_empty() {
            for index in 0..self.pending_add.len() {
                self.pending_cursor = index;
                let key = self.pending_add[index];
                self.admit(key, renderables);
            }

            // every sibling of this batch is committed before any of them runs
            self.pending_cursor = self.pending_add.len();
            for index in 0..self.pending_add.len() {
                let key = self.pending_add[index];
                self.dispatch(key, |component, ctx| component.on_awake(ctx));

                if entity_enabled && self.is_enabled(key) {
                    self.dispatch(key, |component, ctx| component.on_enabled(ctx));
                }
            }

            report.added = self.pending_add.len();
            self.pending_add.clear();
            self.pending_cursor = 0;
        }

        if !report.is_empty() {
            log::debug!(
                "{}: +{} -{} components ({} committed)",
                self.entity,
                report.added,
                report.removed,
                self.committed.len()
            );
        }
        report
    }

    /// Detach every committed component immediately
    ///
    /// Used when the owning entity is destroyed. Bypasses the staging buffers
    /// and leaves the committed set as is; the caller discards the registry
    /// afterwards. Components that were already detached are skipped, so no
    /// component sees `on_removed_from_entity` twice. Returns the number of
    /// components detached.
    pub fn remove_all_components<R>(&mut self, renderables: &mut R) -> usize
    where
        R: RenderableIndex + ?Sized,
    {
        let mut detached = 0;
        for index in 0..self.committed.len() {
            let key = self.committed[index];
            if self.detach(key, renderables, false) {
                detached += 1;
            }
        }

        log::debug!("{}: detached {} components", self.entity, detached);
        detached
    }

    /// Notify committed, enabled components that the entity was toggled
    pub fn on_entity_enabled_changed(&mut self, enabled: bool) {
        for index in 0..self.committed.len() {
            let key = self.committed[index];
            if !self.is_attached(key) || !self.is_enabled(key) {
                continue;
            }
            if enabled {
                self.dispatch(key, |component, ctx| component.on_enabled(ctx));
            } else {
                self.dispatch(key, |component, ctx| component.on_disabled(ctx));
            }
        }
    }

    /// Enable or disable one component
    ///
    /// Committed components of an enabled entity receive `on_enabled` or
    /// `on_disabled` when the state actually changes. Pending components are
    /// only updated; their sync step decides whether `on_enabled` fires.
    pub fn set_component_enabled(
        &mut self,
        handle: ComponentHandle,
        enabled: bool,
        entity_enabled: bool,
    ) -> Result<(), ComponentError> {
        let key = self
            .attached_key(handle)
            .ok_or(ComponentError::NotAttached(handle))?;

        let was_enabled = self.is_enabled(key);
        if let Some(component) = self.slots.get_mut(key).and_then(|slot| slot.component.as_deref_mut()) {
            component.set_enabled(enabled);
        }

        if was_enabled == self.is_enabled(key) || !entity_enabled || !self.committed.contains(&key) {
            return Ok(());
        }

        if enabled {
            self.dispatch(key, |component, ctx| component.on_enabled(ctx));
        } else {
            self.dispatch(key, |component, ctx| component.on_disabled(ctx));
        }
        Ok(())
    }

    /// First component of type `T`
    ///
    /// Committed components are searched in stored order, then components
    /// still pending addition in queued order, so a component added this
    /// frame is found before its sync step.
    pub fn get_component<T: Component>(&self) -> Option<&T> {
        self.lookup().first::<T>()
    }

    /// Mutable access to the first component of type `T`, same search order
    /// as [`get_component`](Self::get_component)
    pub fn get_component_mut<T: Component>(&mut self) -> Option<&mut T> {
        let key = self.lookup().find_key::<T>()?;
        self.slots
            .get_mut(key)?
            .component
            .as_deref_mut()?
            .downcast_mut::<T>()
    }

    /// Every component of type `T`, committed first, then pending additions
    pub fn get_components<T: Component>(&self) -> impl Iterator<Item = &T> + '_ {
        self.lookup().all::<T>()
    }

    /// Look up a component by identity, committed or pending addition
    pub fn get_by_handle(&self, handle: ComponentHandle) -> Option<&dyn Component> {
        let key = self.attached_key(handle)?;
        self.slots.get(key)?.component.as_deref()
    }

    /// Mutable lookup by identity
    pub fn get_by_handle_mut(&mut self, handle: ComponentHandle) -> Option<&mut (dyn Component + 'static)> {
        let key = self.attached_key(handle)?;
        self.slots.get_mut(key)?.component.as_deref_mut()
    }

    /// Whether `handle` names a component owned by this entity
    pub fn contains(&self, handle: ComponentHandle) -> bool {
        self.attached_key(handle).is_some()
    }

    /// Owning entity back-reference of `handle`, `None` once detached
    pub fn owner_of(&self, handle: ComponentHandle) -> Option<Entity> {
        if handle.entity() != self.entity {
            return None;
        }
        self.slots.get(handle.key())?.owner
    }

    /// Number of committed components
    pub fn len(&self) -> usize {
        self.committed.len()
    }

    /// True when no component is committed
    pub fn is_empty(&self) -> bool {
        self.committed.is_empty()
    }

    /// Committed component at `index`, in admission order
    pub fn get(&self, index: usize) -> Option<&dyn Component> {
        let key = *self.committed.get(index)?;
        self.lookup().resolve(key)
    }

    /// Iterate committed components in admission order
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            slots: &self.slots,
            keys: self.committed.iter(),
        }
    }

    /// Handles of committed components in admission order
    pub fn handles(&self) -> impl Iterator<Item = ComponentHandle> + '_ {
        self.committed.iter().map(move |&key| self.handle(key))
    }

    /// Components waiting for the next sync step to be admitted
    pub fn pending_add_count(&self) -> usize {
        self.pending_add.len()
    }

    /// Components waiting for the next sync step to be removed
    pub fn pending_remove_count(&self) -> usize {
        self.pending_remove.len()
    }

    const fn handle(&self, key: ComponentKey) -> ComponentHandle {
        ComponentHandle::new(self.entity, key)
    }

    fn lookup(&self) -> Lookup<'_> {
        Lookup {
            slots: &self.slots,
            committed: &self.committed,
            pending_add: &self.pending_add[self.pending_cursor..],
        }
    }

    fn attached_key(&self, handle: ComponentHandle) -> Option<ComponentKey> {
        let key = handle.key();
        (handle.entity() == self.entity && self.is_attached(key)).then_some(key)
    }

    fn is_attached(&self, key: ComponentKey) -> bool {
        self.slots.get(key).is_some_and(|slot| slot.owner.is_some())
    }

    fn is_enabled(&self, key: ComponentKey) -> bool {
        self.lookup().resolve(key).is_some_and(|component| component.enabled())
    }

    /// Run `hook` on one component with the rest of the entity visible
    fn dispatch<F>(&mut self, key: ComponentKey, hook: F)
    where
        F: FnOnce(&mut (dyn Component + 'static), &ComponentContext<'_>),
    {
        let Some(mut component) = self.slots.get_mut(key).and_then(|slot| slot.component.take()) else {
            return;
        };

        log::trace!("Dispatching hook to {} ({})", component.type_name(), self.handle(key));
        let ctx = ComponentContext {
            handle: self.handle(key),
            lookup: self.lookup(),
        };
        hook(&mut *component, &ctx);

        if let Some(slot) = self.slots.get_mut(key) {
            slot.component = Some(component);
        }
    }

    fn admit<R>(&mut self, key: ComponentKey, renderables: &mut R)
    where
        R: RenderableIndex + ?Sized,
    {
        let handle = self.handle(key);
        let registered = match self.lookup().resolve(key).and_then(|component| component.as_renderable()) {
            Some(renderable) => {
                renderables.register(handle, renderable);
                true
            }
            None => false,
        };
        if let Some(slot) = self.slots.get_mut(key) {
            slot.registered = registered;
        }

        self.committed.push(key);
        self.dispatch(key, |component, ctx| component.on_added_to_entity(ctx));
    }

    /// Returns false when the component was already detached
    fn detach<R>(&mut self, key: ComponentKey, renderables: &mut R, evict: bool) -> bool
    where
        R: RenderableIndex + ?Sized,
    {
        if !self.is_attached(key) {
            return false;
        }

        // decided by what admission registered, not by the current state
        let registered = self
            .slots
            .get_mut(key)
            .is_some_and(|slot| std::mem::replace(&mut slot.registered, false));
        if registered {
            renderables.unregister(self.handle(key));
        }

        if evict {
            if let Some(position) = self.committed.iter().position(|&k| k == key) {
                self.committed.remove(position);
            }
        }

        self.dispatch(key, |component, ctx| component.on_removed_from_entity(ctx));

        if let Some(slot) = self.slots.get_mut(key) {
            slot.owner = None;
        }
        true
    }
}

impl fmt::Debug for ComponentList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentList")
            .field("entity", &self.entity)
            .field("committed", &self.iter().map(|c| c.type_name()).collect::<Vec<_>>())
            .field("pending_add", &self.pending_add.len())
            .field("pending_remove", &self.pending_remove.len())
            .finish()
    }
}

/// Iterator over committed components
pub struct Iter<'a> {
    slots: &'a HandleMap<Slot>,
    keys: std::slice::Iter<'a, ComponentKey>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a dyn Component;

    fn next(&mut self) -> Option<Self::Item> {
        let slots = self.slots;
        self.keys
            .by_ref()
            .find_map(|&key| slots.get(key)?.component.as_deref())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.keys.size_hint().1)
    }
}

impl<'a> IntoIterator for &'a ComponentList {
    type Item = &'a dyn Component;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
