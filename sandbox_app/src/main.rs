//! Sandbox demo for the component registry
//!
//! Builds a small scene and runs a few frames of adds, removals, lookups,
//! toggles and entity destruction, logging what the registry does.
//!
//! Usage: `sandbox [config.toml|config.ron]`

use scene_ecs::foundation::logging;
use scene_ecs::prelude::*;

/// Position of an entity
#[derive(Debug, Clone, Copy)]
struct Transform {
    x: f32,
    y: f32,
}

impl Component for Transform {}

/// Draws the entity on a render layer
struct SpriteRenderer {
    texture: &'static str,
    layer: i32,
    enabled: bool,
}

impl SpriteRenderer {
    const fn new(texture: &'static str, layer: i32) -> Self {
        Self {
            texture,
            layer,
            enabled: true,
        }
    }
}

impl Renderable for SpriteRenderer {
    fn render_layer(&self) -> i32 {
        self.layer
    }
}

impl Component for SpriteRenderer {
    fn enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn as_renderable(&self) -> Option<&dyn Renderable> {
        Some(self)
    }

    fn on_enabled(&mut self, ctx: &ComponentContext<'_>) {
        log::info!("{} shows '{}' on layer {}", ctx.entity(), self.texture, self.layer);
    }

    fn on_disabled(&mut self, ctx: &ComponentContext<'_>) {
        log::info!("{} hides '{}'", ctx.entity(), self.texture);
    }
}

/// Hit points; reads its sibling transform when attached
struct Health {
    current: u32,
}

impl Component for Health {
    fn on_added_to_entity(&mut self, ctx: &ComponentContext<'_>) {
        match ctx.get_component::<Transform>() {
            Some(transform) => log::info!(
                "{} spawned with {} hp at ({}, {})",
                ctx.entity(),
                self.current,
                transform.x,
                transform.y
            ),
            None => log::info!("{} spawned with {} hp", ctx.entity(), self.current),
        }
    }

    fn on_removed_from_entity(&mut self, ctx: &ComponentContext<'_>) {
        log::info!("{} lost its health ({} hp left)", ctx.entity(), self.current);
    }
}

fn load_config() -> Result<SceneConfig, ConfigError> {
    match std::env::args().nth(1) {
        Some(path) => SceneConfig::load_from_file(&path),
        None => Ok(SceneConfig::default()),
    }
}

fn log_frame(scene: &Scene, stats: &SceneStats) {
    log::info!(
        "frame {}: {} entities, {} renderables, +{} -{} components, {} destroyed",
        stats.frame,
        stats.entity_count,
        stats.renderable_count,
        stats.components_added,
        stats.components_removed,
        stats.entities_destroyed
    );
    for entity in scene.entities() {
        log::debug!("  {} '{}': {:?}", entity.id(), entity.name(), entity.components());
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    logging::init_with_filter(&config.log_filter);

    let mut scene = Scene::with_config(config);

    // frame 1: spawn
    let player = scene.create_entity("player")?;
    scene.add_component(player, Transform { x: 0.0, y: 0.0 })?;
    scene.add_component(player, Health { current: 100 })?;
    let player_sprite = scene.add_component(player, SpriteRenderer::new("ship.png", 1))?;

    let rock = scene.create_entity("asteroid")?;
    scene.add_component(rock, Transform { x: 12.0, y: -4.0 })?;
    scene.add_component(rock, SpriteRenderer::new("rock.png", 0))?;

    if scene.get_component::<Health>(player).is_some() {
        log::info!("Health is visible before the first update");
    }
    let stats = scene.update();
    log_frame(&scene, &stats);

    // frame 2: damage and hide the sprite
    if let Some(health) = scene.get_component_mut::<Health>(player) {
        health.current -= 25;
    }
    scene.set_component_enabled(player_sprite, false)?;
    let stats = scene.update();
    log_frame(&scene, &stats);

    // frame 3: swap the sprite, remove-then-add in one frame
    scene.remove_component(player_sprite)?;
    scene.add_component(player, SpriteRenderer::new("ship_damaged.png", 1))?;
    if let Err(err) = scene.remove_component(player_sprite) {
        log::warn!("Second removal rejected: {}", err);
    }
    let stats = scene.update();
    log_frame(&scene, &stats);

    // frame 4: pause the asteroid, then destroy it
    scene.set_entity_enabled(rock, false)?;
    scene.destroy_entity(rock)?;
    let stats = scene.update();
    log_frame(&scene, &stats);

    for entry in scene.renderables().entries() {
        log::info!("render {} on layer {}", entry.handle, entry.render_layer);
    }
    Ok(())
}
