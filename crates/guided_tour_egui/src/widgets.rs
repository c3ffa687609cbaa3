// SPDX-License-Identifier: MIT OR Apache-2.0
//! egui widgets as tour targets.
//!
//! Widgets are registered once under a key, optionally beneath a parent,
//! then recorded every frame with the rectangle egui gave them. A widget stays
//! live until a whole frame passes without it being recorded, so a step that
//! advances halfway through layout still sees widgets drawn later on.

use egui::emath::Rot2;
use egui::{Pos2, Rect, Response, Ui};
use guided_tour_core::{
    ActivatableControl, ControlHandle, ControlLocator, Signal, TargetHandle, TargetId,
    TargetResolver, TourTarget,
};
use indexmap::IndexMap;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Activation source attached to a button widget
pub struct ButtonControl {
    label: String,
    activated: Signal<()>,
}

impl ButtonControl {
    /// Create a control
    pub fn new(label: impl Into<String>) -> Rc<Self> {
        Rc::new(Self {
            label: label.into(),
            activated: Signal::new(),
        })
    }

    /// Report a user activation
    pub fn activate(&self) {
        tracing::trace!("Button '{}' activated", self.label);
        self.activated.emit(&());
    }
}

impl ActivatableControl for ButtonControl {
    fn activated(&self) -> &Signal<()> {
        &self.activated
    }

    fn label(&self) -> &str {
        &self.label
    }
}

/// A registered widget
pub struct WidgetTarget {
    id: TargetId,
    key: String,
    parent: Option<TargetId>,
    rect: Cell<Rect>,
    /// Rotation in radians around the rect center
    rotation: Cell<f32>,
    /// Frame in which the widget was last recorded
    last_seen: Cell<Option<u64>>,
    /// Shared with the registry
    frame: Rc<Cell<u64>>,
    control: Option<Rc<ButtonControl>>,
}

impl WidgetTarget {
    /// Registry key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Parent widget, if any
    pub fn parent(&self) -> Option<TargetId> {
        self.parent
    }

    /// Last recorded rectangle, before rotation
    pub fn rect(&self) -> Rect {
        self.rect.get()
    }

    /// Set the rectangle without touching liveness
    pub fn set_rect(&self, rect: Rect) {
        self.rect.set(rect);
    }

    /// Set the rotation around the rect center
    pub fn set_rotation(&self, radians: f32) {
        self.rotation.set(radians);
    }

    /// Mark the widget detached until it is recorded again
    pub fn detach(&self) {
        self.last_seen.set(None);
    }

    /// Button attached directly to this widget
    pub fn control(&self) -> Option<Rc<ButtonControl>> {
        self.control.clone()
    }
}

impl TourTarget for WidgetTarget {
    fn id(&self) -> TargetId {
        self.id
    }

    fn corners(&self) -> [Pos2; 4] {
        let rect = self.rect.get();
        let center = rect.center();
        let rot = Rot2::from_angle(self.rotation.get());
        [rect.left_top(), rect.right_top(), rect.right_bottom(), rect.left_bottom()]
            .map(|corner| center + rot * (corner - center))
    }

    fn is_live(&self) -> bool {
        let frame = self.frame.get();
        self.last_seen.get().is_some_and(|seen| seen + 1 >= frame)
    }

    fn name(&self) -> &str {
        &self.key
    }
}

/// Keyed set of widgets; resolves keys to targets and targets to buttons
#[derive(Default)]
pub struct WidgetRegistry {
    widgets: RefCell<IndexMap<String, Rc<WidgetTarget>>>,
    frame: Rc<Cell<u64>>,
}

impl WidgetRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a widget without a control
    pub fn register(&self, key: &str, parent: Option<&str>) -> Rc<WidgetTarget> {
        self.insert(key, parent, None)
    }

    /// Register a widget that owns a button
    pub fn register_button(&self, key: &str, parent: Option<&str>) -> Rc<WidgetTarget> {
        self.insert(key, parent, Some(ButtonControl::new(key)))
    }

    fn insert(
        &self,
        key: &str,
        parent: Option<&str>,
        control: Option<Rc<ButtonControl>>,
    ) -> Rc<WidgetTarget> {
        if let Some(existing) = self.get(key) {
            return existing;
        }

        let parent = parent.and_then(|p| {
            let found = self.get(p).map(|w| w.id);
            if found.is_none() {
                tracing::warn!("Widget '{}' registered under unknown parent '{}'", key, p);
            }
            found
        });

        let widget = Rc::new(WidgetTarget {
            id: TargetId::new(),
            key: key.to_string(),
            parent,
            rect: Cell::new(Rect::NOTHING),
            rotation: Cell::new(0.0),
            last_seen: Cell::new(None),
            frame: self.frame.clone(),
            control,
        });
        self.widgets.borrow_mut().insert(key.to_string(), widget.clone());
        widget
    }

    /// Widget by key
    pub fn get(&self, key: &str) -> Option<Rc<WidgetTarget>> {
        self.widgets.borrow().get(key).cloned()
    }

    /// Widget by target id
    pub fn by_id(&self, id: TargetId) -> Option<Rc<WidgetTarget>> {
        self.widgets.borrow().values().find(|w| w.id == id).cloned()
    }

    /// Number of registered widgets
    pub fn len(&self) -> usize {
        self.widgets.borrow().len()
    }

    /// Check if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.widgets.borrow().is_empty()
    }

    /// Start a new frame; call before laying out widgets
    pub fn begin_frame(&self) {
        self.frame.set(self.frame.get() + 1);
    }

    /// Record a widget's rectangle for this frame and mark it live
    pub fn record(&self, key: &str, rect: Rect) {
        match self.get(key) {
            Some(widget) => {
                widget.rect.set(rect);
                widget.last_seen.set(Some(self.frame.get()));
            }
            None => tracing::warn!("Recorded unregistered widget '{}'", key),
        }
    }

    /// Record a response and forward its clicks to the widget's control
    pub fn record_response(&self, key: &str, response: &Response) {
        self.record(key, response.rect);

        if response.clicked() {
            if let Some(control) = self.get(key).and_then(|w| w.control()) {
                control.activate();
            }
        }
    }

    /// Draw a button for a registered widget
    pub fn button(&self, ui: &mut Ui, key: &str, text: impl Into<egui::WidgetText>) -> Response {
        let response = ui.button(text);
        self.record_response(key, &response);
        response
    }

    /// Draw a label for a registered widget
    pub fn label(&self, ui: &mut Ui, key: &str, text: impl Into<egui::WidgetText>) -> Response {
        let response = ui.label(text);
        self.record(key, response.rect);
        response
    }
}

impl TargetResolver for WidgetRegistry {
    fn resolve(&self, key: &str) -> Option<TargetHandle> {
        let widget = self.get(key)?;
        Some(widget as TargetHandle)
    }
}

impl ControlLocator for WidgetRegistry {
    fn find_control(&self, target: &TargetHandle) -> Option<ControlHandle> {
        let mut current = self.by_id(target.id());
        while let Some(widget) = current {
            if let Some(control) = widget.control() {
                return Some(control as ControlHandle);
            }
            current = widget.parent.and_then(|id| self.by_id(id));
        }
        None
    }
}
