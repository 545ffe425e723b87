//! Ordering and visibility guarantees of the staged add/remove protocol

use std::cell::RefCell;
use std::rc::Rc;

use crate::ecs::{Component, ComponentContext, ComponentList, Entity, Renderable, SyncReport};
use crate::scene::RenderableComponentList;

type Journal = Rc<RefCell<Vec<String>>>;

fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

fn drain(journal: &Journal) -> Vec<String> {
    journal.borrow_mut().drain(..).collect()
}

/// Records every hook it receives
struct Tracker {
    name: &'static str,
    enabled: bool,
    layer: Option<i32>,
    journal: Journal,
}

impl Tracker {
    fn new(name: &'static str, journal: &Journal) -> Self {
        Self {
            name,
            enabled: true,
            layer: None,
            journal: Rc::clone(journal),
        }
    }

    fn renderable(name: &'static str, layer: i32, journal: &Journal) -> Self {
        Self {
            layer: Some(layer),
            ..Self::new(name, journal)
        }
    }

    fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    fn record(&self, event: &str) {
        self.journal.borrow_mut().push(format!("{}:{}", self.name, event));
    }
}

impl Renderable for Tracker {
    fn render_layer(&self) -> i32 {
        self.layer.unwrap_or_default()
    }
}

impl Component for Tracker {
    fn enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn as_renderable(&self) -> Option<&dyn Renderable> {
        self.layer.map(|_| self as &dyn Renderable)
    }

    fn on_added_to_entity(&mut self, _ctx: &ComponentContext<'_>) {
        self.record("added");
    }

    fn on_awake(&mut self, _ctx: &ComponentContext<'_>) {
        self.record("awake");
    }

    fn on_enabled(&mut self, _ctx: &ComponentContext<'_>) {
        self.record("enabled");
    }

    fn on_disabled(&mut self, _ctx: &ComponentContext<'_>) {
        self.record("disabled");
    }

    fn on_removed_from_entity(&mut self, _ctx: &ComponentContext<'_>) {
        self.record("removed");
    }
}

/// Looks for a sibling `Tracker` from its hooks
struct Seeker {
    journal: Journal,
}

impl Seeker {
    fn look(&self, ctx: &ComponentContext<'_>, phase: &str) {
        let found = ctx.get_component::<Tracker>().map_or("nothing", |tracker| tracker.name);
        let sees_self = ctx.get_component::<Self>().is_some();
        self.journal
            .borrow_mut()
            .push(format!("seeker:{phase}:{found}:{}:{sees_self}", ctx.entity().id()));
    }
}

impl Component for Seeker {
    fn on_added_to_entity(&mut self, ctx: &ComponentContext<'_>) {
        self.look(ctx, "added");
    }

    fn on_awake(&mut self, ctx: &ComponentContext<'_>) {
        self.look(ctx, "awake");
    }
}

/// Plain data used as a lookup selector
struct Marker(u8);
impl Component for Marker {}

fn setup() -> (ComponentList, RenderableComponentList, Journal) {
    (ComponentList::new(Entity::new(7)), RenderableComponentList::new(), journal())
}

#[test]
fn test_batch_is_added_before_any_awake() {
    let (mut list, mut renderables, log) = setup();
    list.add(Tracker::renderable("a", 1, &log));
    list.add(Tracker::renderable("b", 2, &log));
    assert!(drain(&log).is_empty());

    list.update_lists(true, &mut renderables);
    assert_eq!(
        drain(&log),
        vec!["a:added", "b:added", "a:awake", "a:enabled", "b:awake", "b:enabled"]
    );
    assert_eq!(renderables.len(), 2);
}

#[test]
fn test_enabled_requires_entity_and_component() {
    let (mut list, mut renderables, log) = setup();
    list.add(Tracker::new("on", &log));
    list.add(Tracker::new("off", &log).disabled());
    list.update_lists(true, &mut renderables);
    assert_eq!(
        drain(&log),
        vec!["on:added", "off:added", "on:awake", "on:enabled", "off:awake"]
    );

    list.add(Tracker::new("late", &log));
    list.update_lists(false, &mut renderables);
    assert_eq!(drain(&log), vec!["late:added", "late:awake"]);
}

#[test]
fn test_siblings_visible_from_hooks() {
    let (mut list, mut renderables, log) = setup();
    list.add(Seeker {
        journal: Rc::clone(&log),
    });
    list.add(Tracker::new("p", &log));
    list.update_lists(true, &mut renderables);

    // the tracker is found through the pending batch first, then committed
    assert_eq!(
        drain(&log),
        vec![
            "seeker:added:p:7:false",
            "p:added",
            "seeker:awake:p:7:false",
            "p:awake",
            "p:enabled",
        ]
    );
}

#[test]
fn test_lookup_falls_back_to_pending_additions() {
    let (mut list, mut renderables, log) = setup();
    list.add(Tracker::new("a", &log));
    list.add(Marker(2));

    assert_eq!(list.get_component::<Marker>().map(|m| m.0), Some(2));
    assert!(list.is_empty());

    list.update_lists(true, &mut renderables);
    assert_eq!(list.get_component::<Marker>().map(|m| m.0), Some(2));
    assert_eq!(list.len(), 2);
    assert!(list.get_component::<Seeker>().is_none());
}

#[test]
fn test_removed_component_leaves_after_sync() {
    let (mut list, mut renderables, log) = setup();
    let a = list.add(Tracker::new("a", &log));
    let b = list.add(Tracker::new("b", &log));
    list.update_lists(true, &mut renderables);
    drain(&log);

    list.remove(a).unwrap();
    assert_eq!(list.handles().collect::<Vec<_>>(), vec![a, b]);
    assert!(drain(&log).is_empty());

    list.update_lists(true, &mut renderables);
    assert_eq!(list.handles().collect::<Vec<_>>(), vec![b]);
    assert_eq!(list.owner_of(a), None);
    assert_eq!(list.owner_of(b), Some(Entity::new(7)));
    assert_eq!(drain(&log), vec!["a:removed"]);

    list.update_lists(true, &mut renderables);
    assert!(drain(&log).is_empty());
}

#[test]
fn test_removals_run_before_additions() {
    let (mut list, mut renderables, log) = setup();
    let old = list.add(Tracker::renderable("old", 0, &log));
    list.update_lists(true, &mut renderables);
    drain(&log);

    list.add(Tracker::renderable("new", 0, &log));
    list.remove(old).unwrap();
    list.update_lists(true, &mut renderables);

    assert_eq!(drain(&log), vec!["old:removed", "new:added", "new:awake", "new:enabled"]);
    assert_eq!(renderables.len(), 1);
    assert!(!renderables.contains(old));
}

#[test]
fn test_teardown_detaches_each_component_once() {
    let (mut list, mut renderables, log) = setup();
    let a = list.add(Tracker::renderable("a", 3, &log));
    let b = list.add(Tracker::new("b", &log));
    list.update_lists(true, &mut renderables);
    list.remove(b).unwrap();
    drain(&log);

    assert_eq!(list.remove_all_components(&mut renderables), 2);
    assert_eq!(drain(&log), vec!["a:removed", "b:removed"]);
    assert_eq!(list.owner_of(a), None);
    assert_eq!(list.owner_of(b), None);
    assert!(renderables.is_empty());

    // the stale queued removal must not notify b a second time
    let report = list.update_lists(true, &mut renderables);
    assert!(drain(&log).is_empty());
    assert_eq!(report, SyncReport::default());
    assert_eq!(list.len(), 2);
    assert_eq!(list.len(), list.iter().count());
    assert!(list.get(1).is_some());
    assert!(renderables.is_empty());
}

#[test]
fn test_unregister_follows_admission_not_current_state() {
    let (mut list, mut renderables, log) = setup();
    let sprite = list.add(Tracker::renderable("sprite", 3, &log));
    list.update_lists(true, &mut renderables);
    assert!(renderables.contains(sprite));

    // the component stops reporting itself as renderable while attached
    if let Some(tracker) = list.get_component_mut::<Tracker>() {
        tracker.layer = None;
    }
    list.remove(sprite).unwrap();
    list.update_lists(true, &mut renderables);

    assert!(list.is_empty());
    assert!(!renderables.contains(sprite));
    assert!(renderables.is_empty());
}

#[test]
fn test_late_renderable_is_never_unregistered() {
    let (mut list, mut renderables, log) = setup();
    let other = list.add(Tracker::renderable("other", 1, &log));
    let plain = list.add(Tracker::new("plain", &log));
    list.update_lists(true, &mut renderables);

    // becoming renderable after admission does not enter the index
    if let Some(tracker) = list.get_by_handle_mut(plain).and_then(|c| c.downcast_mut::<Tracker>()) {
        tracker.layer = Some(2);
    }
    list.remove(plain).unwrap();
    list.update_lists(true, &mut renderables);

    assert_eq!(renderables.len(), 1);
    assert!(renderables.contains(other));
}

#[test]
fn test_entity_toggle_notifies_enabled_components() {
    let (mut list, mut renderables, log) = setup();
    list.add(Tracker::new("on", &log));
    list.add(Tracker::new("off", &log).disabled());
    list.update_lists(true, &mut renderables);
    drain(&log);

    list.on_entity_enabled_changed(false);
    list.on_entity_enabled_changed(true);
    assert_eq!(drain(&log), vec!["on:disabled", "on:enabled"]);
}

#[test]
fn test_component_toggle() {
    let (mut list, mut renderables, log) = setup();
    let tracker = list.add(Tracker::new("p", &log));

    list.set_component_enabled(tracker, false, true).unwrap();
    list.update_lists(true, &mut renderables);
    assert_eq!(drain(&log), vec!["p:added", "p:awake"]);

    list.set_component_enabled(tracker, true, true).unwrap();
    list.set_component_enabled(tracker, true, true).unwrap();
    list.set_component_enabled(tracker, false, false).unwrap();
    assert_eq!(drain(&log), vec!["p:enabled"]);
}
