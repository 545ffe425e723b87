//! # Scene Manager
//!
//! Owns the entities of a scene and the shared renderable index. Each frame
//! [`Scene::update`] commits every entity's staged component changes and
//! then tears down entities that were destroyed during the frame.

use thiserror::Error;

use super::RenderableComponentList;
use crate::config::SceneConfig;
use crate::ecs::{Component, ComponentError, ComponentHandle, ComponentList, Entity, SyncReport};

/// Scene errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// No more entities can be created
    #[error("Entity limit of {0} reached")]
    EntityLimitReached(usize),

    /// Every entity id of this scene has been handed out
    #[error("Entity ids exhausted")]
    EntityIdsExhausted,

    /// The entity does not exist or was already torn down
    #[error("Unknown entity: {0}")]
    UnknownEntity(Entity),

    /// Component registry misuse
    #[error(transparent)]
    Component(#[from] ComponentError),
}

/// Statistics of the last [`Scene::update`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SceneStats {
    /// Number of completed frames
    pub frame: u64,

    /// Live entities after the update
    pub entity_count: usize,

    /// Tracked renderable components after the update
    pub renderable_count: usize,

    /// Components admitted this frame
    pub components_added: usize,

    /// Components removed this frame, including those of destroyed entities
    pub components_removed: usize,

    /// Entities torn down this frame
    pub entities_destroyed: usize,
}

/// An entity and the components attached to it
#[derive(Debug)]
pub struct EntityRecord {
    id: Entity,
    name: String,
    enabled: bool,
    components: ComponentList,
}

impl EntityRecord {
    fn new(id: Entity, name: String, component_capacity: usize) -> Self {
        Self {
            id,
            name,
            enabled: true,
            components: ComponentList::with_capacity(id, component_capacity),
        }
    }

    /// Entity identifier
    pub const fn id(&self) -> Entity {
        self.id
    }

    /// Name given at creation
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the entity is enabled
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Attached components
    pub const fn components(&self) -> &ComponentList {
        &self.components
    }

    /// Attached components, mutable
    pub fn components_mut(&mut self) -> &mut ComponentList {
        &mut self.components
    }

    fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            self.enabled = enabled;
            self.components.on_entity_enabled_changed(enabled);
        }
    }

    fn update_components(&mut self, renderables: &mut RenderableComponentList) -> SyncReport {
        self.components.update_lists(self.enabled, renderables)
    }
}

/// High-level scene manager
#[derive(Debug)]
pub struct Scene {
    config: SceneConfig,
    next_entity_id: u32,
    entities: Vec<EntityRecord>,
    pending_destroy: Vec<Entity>,
    renderables: RenderableComponentList,
    stats: SceneStats,
}

impl Scene {
    /// Create a new scene with default configuration
    pub fn new() -> Self {
        Self::with_config(SceneConfig::default())
    }

    /// Create a scene with custom configuration
    pub fn with_config(config: SceneConfig) -> Self {
        log::info!("Creating scene (max {} entities)", config.max_entities);
        Self {
            config,
            next_entity_id: 0,
            entities: Vec::new(),
            pending_destroy: Vec::new(),
            renderables: RenderableComponentList::new(),
            stats: SceneStats::default(),
        }
    }

    /// Scene configuration
    pub const fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Create a new entity
    pub fn create_entity(&mut self, name: impl Into<String>) -> Result<Entity, SceneError> {
        if self.entities.len() >= self.config.max_entities {
            log::warn!("Entity limit of {} reached", self.config.max_entities);
            return Err(SceneError::EntityLimitReached(self.config.max_entities));
        }

        let next_entity_id = self.next_entity_id.checked_add(1).ok_or_else(|| {
            log::warn!("Entity ids exhausted");
            SceneError::EntityIdsExhausted
        })?;
        let id = Entity::new(self.next_entity_id);
        self.next_entity_id = next_entity_id;

        let name = name.into();
        log::debug!("Created {} '{}'", id, name);
        self.entities
            .push(EntityRecord::new(id, name, self.config.component_capacity));
        Ok(id)
    }

    /// Look up an entity
    pub fn entity(&self, id: Entity) -> Option<&EntityRecord> {
        self.entities.iter().find(|record| record.id == id)
    }

    /// Look up an entity mutably
    pub fn entity_mut(&mut self, id: Entity) -> Option<&mut EntityRecord> {
        self.entities.iter_mut().find(|record| record.id == id)
    }

    /// Iterate entities in creation order
    pub fn entities(&self) -> impl Iterator<Item = &EntityRecord> {
        self.entities.iter()
    }

    /// Queue a component for addition to `entity`
    pub fn add_component<C: Component>(
        &mut self,
        entity: Entity,
        component: C,
    ) -> Result<ComponentHandle, SceneError> {
        let record = self.record_mut(entity)?;
        Ok(record.components.add(component))
    }

    /// Queue a component for removal from the entity that owns it
    pub fn remove_component(&mut self, handle: ComponentHandle) -> Result<(), SceneError> {
        let record = self.record_mut(handle.entity())?;
        record.components.remove(handle)?;
        Ok(())
    }

    /// First component of type `T` on `entity`, including pending additions
    pub fn get_component<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.entity(entity)?.components.get_component::<T>()
    }

    /// Mutable access to the first component of type `T` on `entity`
    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        self.entity_mut(entity)?.components.get_component_mut::<T>()
    }

    /// Enable or disable an entity, notifying its enabled components
    pub fn set_entity_enabled(&mut self, entity: Entity, enabled: bool) -> Result<(), SceneError> {
        self.record_mut(entity)?.set_enabled(enabled);
        Ok(())
    }

    /// Enable or disable a single component
    pub fn set_component_enabled(
        &mut self,
        handle: ComponentHandle,
        enabled: bool,
    ) -> Result<(), SceneError> {
        let record = self.record_mut(handle.entity())?;
        let entity_enabled = record.enabled;
        record
            .components
            .set_component_enabled(handle, enabled, entity_enabled)?;
        Ok(())
    }

    /// Queue an entity for destruction at the end of the next update
    ///
    /// Destroying an entity that is already queued is a no-op.
    pub fn destroy_entity(&mut self, entity: Entity) -> Result<(), SceneError> {
        if self.entity(entity).is_none() {
            return Err(SceneError::UnknownEntity(entity));
        }
        if !self.pending_destroy.contains(&entity) {
            self.pending_destroy.push(entity);
        }
        Ok(())
    }

    /// Run one frame of component bookkeeping
    ///
    /// Entities that are not queued for destruction run their sync step in
    /// creation order. Queued entities are then torn down, detaching all of
    /// their committed components, and discarded together with any changes
    /// they still had staged.
    pub fn update(&mut self) -> SceneStats {
        let mut stats = SceneStats {
            frame: self.stats.frame + 1,
            ..SceneStats::default()
        };

        for record in &mut self.entities {
            if self.pending_destroy.contains(&record.id) {
                continue;
            }
            let report = record.update_components(&mut self.renderables);
            stats.components_added += report.added;
            stats.components_removed += report.removed;
        }

        for entity in std::mem::take(&mut self.pending_destroy) {
            let Some(position) = self.entities.iter().position(|record| record.id == entity) else {
                continue;
            };
            let mut record = self.entities.remove(position);
            stats.components_removed += record.components.remove_all_components(&mut self.renderables);
            stats.entities_destroyed += 1;
            log::debug!("Destroyed {} '{}'", record.id, record.name);
        }

        self.renderables.update_lists();
        stats.entity_count = self.entities.len();
        stats.renderable_count = self.renderables.len();
        self.stats = stats;
        stats
    }

    /// Statistics of the last update
    pub const fn stats(&self) -> &SceneStats {
        &self.stats
    }

    /// Renderable components of every entity, in render order
    pub const fn renderables(&self) -> &RenderableComponentList {
        &self.renderables
    }

    /// Renderable index, mutable
    pub fn renderables_mut(&mut self) -> &mut RenderableComponentList {
        &mut self.renderables
    }

    fn record_mut(&mut self, entity: Entity) -> Result<&mut EntityRecord, SceneError> {
        self.entity_mut(entity).ok_or(SceneError::UnknownEntity(entity))
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
