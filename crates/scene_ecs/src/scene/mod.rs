//! Scene management
//!
//! The scene owns entities, drives their once-per-frame sync step and keeps
//! the render-layer ordered index of renderable components.

pub mod renderable_list;
pub mod scene_manager;

pub use renderable_list::{RenderableComponentList, RenderableEntry, RenderableIndex};
pub use scene_manager::{EntityRecord, Scene, SceneError, SceneStats};
