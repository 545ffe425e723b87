//! # Scene ECS
//!
//! Per-entity component registry for a frame-driven game runtime.
//!
//! ## Features
//!
//! - **Deferred mutation**: components added or removed during a frame are
//!   staged and committed once per frame, so iteration never observes a
//!   half-applied change
//! - **Ordered lifecycle**: `on_added_to_entity` runs for a whole batch before
//!   any `on_awake`/`on_enabled`
//! - **Render ordering**: renderable components are kept in a scene-wide
//!   index sorted by render layer
//!
//! ## Quick Start
//!
//! ```rust
//! use scene_ecs::prelude::*;
//!
//! struct Health(u32);
//! impl Component for Health {}
//!
//! let mut scene = Scene::new();
//! let player = scene.create_entity("player").unwrap();
//! scene.add_component(player, Health(100)).unwrap();
//!
//! // visible to lookup immediately, committed on the next update
//! assert!(scene.get_component::<Health>(player).is_some());
//! scene.update();
//! assert_eq!(scene.entity(player).map(|e| e.components().len()), Some(1));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod ecs;
pub mod foundation;
pub mod scene;

/// Common imports for users of the crate
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, SceneConfig},
        ecs::{
            Component, ComponentContext, ComponentError, ComponentHandle, ComponentList, Entity,
            Renderable, SyncReport,
        },
        scene::{RenderableComponentList, RenderableIndex, Scene, SceneError, SceneStats},
    };
}
