// SPDX-License-Identifier: MIT OR Apache-2.0
//! Test doubles shared by the unit tests.

use crate::signal::Signal;
use crate::target::{TargetHandle, TargetId, TargetResolver, TourTarget};
use crate::view::{ActivatableControl, ControlHandle, ControlLocator, OverlayView};
use egui::{pos2, Pos2, Rect};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

/// Ordered record of what happened during a test
#[derive(Clone, Default)]
pub(crate) struct EventLog(Rc<RefCell<Vec<String>>>);

impl EventLog {
    pub(crate) fn push(&self, event: impl Into<String>) {
        self.0.borrow_mut().push(event.into());
    }

    pub(crate) fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.borrow_mut())
    }

    pub(crate) fn contains(&self, prefix: &str) -> bool {
        self.0.borrow().iter().any(|e| e.starts_with(prefix))
    }
}

pub(crate) struct FakeTarget {
    id: TargetId,
    name: String,
    rect: Cell<Rect>,
    live: Cell<bool>,
}

impl FakeTarget {
    pub(crate) fn new(name: &str) -> Rc<Self> {
        Rc::new(Self {
            id: TargetId::new(),
            name: name.to_string(),
            rect: Cell::new(Rect::from_min_max(pos2(100.0, 100.0), pos2(200.0, 150.0))),
            live: Cell::new(true),
        })
    }

    pub(crate) fn handle(name: &str) -> TargetHandle {
        Self::new(name)
    }

    pub(crate) fn set_live(&self, live: bool) {
        self.live.set(live);
    }

    pub(crate) fn set_rect(&self, rect: Rect) {
        self.rect.set(rect);
    }
}

impl TourTarget for FakeTarget {
    fn id(&self) -> TargetId {
        self.id
    }

    fn corners(&self) -> [Pos2; 4] {
        let r = self.rect.get();
        [r.left_top(), r.right_top(), r.right_bottom(), r.left_bottom()]
    }

    fn is_live(&self) -> bool {
        self.live.get()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Default)]
pub(crate) struct FakeControl {
    activated: Signal<()>,
}

impl FakeControl {
    pub(crate) fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub(crate) fn activate(&self) {
        self.activated.emit(&());
    }
}

impl ActivatableControl for FakeControl {
    fn activated(&self) -> &Signal<()> {
        &self.activated
    }
}

#[derive(Default)]
pub(crate) struct FakeLocator {
    controls: RefCell<HashMap<TargetId, Rc<FakeControl>>>,
}

impl FakeLocator {
    pub(crate) fn attach(&self, target: &TargetHandle, control: Rc<FakeControl>) {
        self.controls.borrow_mut().insert(target.id(), control);
    }
}

impl ControlLocator for FakeLocator {
    fn find_control(&self, target: &TargetHandle) -> Option<ControlHandle> {
        let control = self.controls.borrow().get(&target.id()).cloned()?;
        Some(control)
    }
}

pub(crate) struct FakeResolver {
    targets: HashMap<String, TargetHandle>,
    lookups: RefCell<Vec<String>>,
}

impl FakeResolver {
    pub(crate) fn new<const N: usize>(keys: [&str; N]) -> Self {
        Self {
            targets: keys
                .iter()
                .map(|k| (k.to_string(), FakeTarget::handle(k)))
                .collect(),
            lookups: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn lookups(&self) -> Vec<String> {
        self.lookups.borrow().clone()
    }
}

impl TargetResolver for FakeResolver {
    fn resolve(&self, key: &str) -> Option<TargetHandle> {
        self.lookups.borrow_mut().push(key.to_string());
        self.targets.get(key).cloned()
    }
}

/// View that records calls instead of drawing
#[derive(Default)]
pub(crate) struct RecordingView {
    pub(crate) log: EventLog,
    fallback: Cell<bool>,
    visible: Cell<bool>,
    syncs: Cell<usize>,
    animated: Cell<f32>,
    activated: Signal<()>,
}

impl RecordingView {
    pub(crate) fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub(crate) fn fallback_armed(&self) -> bool {
        self.fallback.get()
    }

    pub(crate) fn is_visible(&self) -> bool {
        self.visible.get()
    }

    pub(crate) fn sync_count(&self) -> usize {
        self.syncs.get()
    }

    pub(crate) fn animated_time(&self) -> f32 {
        self.animated.get()
    }

    /// Emulates a pointer click inside the hole
    pub(crate) fn click_hole(&self) {
        if self.fallback.get() {
            self.activated.emit(&());
        }
    }
}

impl OverlayView for RecordingView {
    fn show(&self, description: &str, target: Option<&TargetHandle>) {
        let name = target.map_or("<none>", |t| t.name());
        self.log.push(format!("show '{description}' at {name}"));
        self.visible.set(true);
    }

    fn hide(&self) {
        self.log.push("hide");
        self.visible.set(false);
    }

    fn sync_to_target(&self, _target: &TargetHandle) {
        self.syncs.set(self.syncs.get() + 1);
    }

    fn set_fallback_click(&self, enabled: bool) {
        self.fallback.set(enabled);
    }

    fn target_activated(&self) -> &Signal<()> {
        &self.activated
    }

    fn tick_animation(&self, delta_time: f32) {
        self.animated.set(self.animated.get() + delta_time);
    }
}
