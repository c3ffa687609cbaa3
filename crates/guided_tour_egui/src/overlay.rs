// SPDX-License-Identifier: MIT OR Apache-2.0
//! Overlay view drawn with egui.
//!
//! The view dims the screen with four panels around the highlighted hole,
//! frames the hole, and shows the step description in a bubble with a
//! bobbing pointer. Panels swallow clicks; the hole lets them through to the
//! widget underneath. When the fallback is armed, a click inside the hole
//! fires [`OverlayView::target_activated`] instead.

use egui::text::LayoutJob;
use egui::{
    Color32, FontId, Galley, Id, LayerId, Order, Painter, Pos2, Rect, Sense, Stroke, Vec2,
};
use guided_tour_core::{
    AnimationConfig, BubbleConfig, ContainerFrame, OverlayGeometryEngine, OverlayLayout,
    OverlayView, Signal, TargetHandle, TourSettings,
};
use std::cell::RefCell;
use std::sync::Arc;

/// Colors and strokes of the overlay
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    /// Dimming panels
    pub mask: Color32,
    /// Frame around the hole
    pub highlight: Stroke,
    /// Highlight corner rounding
    pub highlight_rounding: f32,
    /// Bubble background
    pub bubble_fill: Color32,
    /// Bubble outline
    pub bubble_stroke: Stroke,
    /// Bubble corner rounding
    pub bubble_rounding: f32,
    /// Description text
    pub text: Color32,
    /// Pointer color
    pub pointer: Color32,
    /// Pointer radius
    pub pointer_radius: f32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            mask: Color32::from_rgba_unmultiplied(0, 0, 0, 170),
            highlight: Stroke::new(3.0, Color32::from_rgb(255, 200, 100)),
            highlight_rounding: 6.0,
            bubble_fill: Color32::from_gray(35),
            bubble_stroke: Stroke::new(1.0, Color32::from_gray(90)),
            bubble_rounding: 8.0,
            text: Color32::from_gray(235),
            pointer: Color32::from_rgb(255, 200, 100),
            pointer_radius: 10.0,
        }
    }
}

struct OverlayState {
    visible: bool,
    description: String,
    target: Option<TargetHandle>,
    frame: ContainerFrame,
    engine: OverlayGeometryEngine,
    layout: Option<OverlayLayout>,
    galley: Option<Arc<Galley>>,
    /// The description changed and the bubble has not been measured since
    needs_measure: bool,
    bubble_size: Vec2,
    anim_time: f32,
    fallback_armed: bool,
    /// Number of completed [`EguiOverlayView::ui`] calls
    ui_pass: u64,
    /// Pass during which the fallback was last armed
    armed_at: Option<u64>,
}

impl OverlayState {
    fn resync(&mut self) {
        let Some(target) = self.target.clone() else {
            self.layout = None;
            self.engine.clear();
            return;
        };
        let layout = self.engine.sync(&target.corners(), &self.frame, self.bubble_size);
        self.layout = Some(layout);
    }
}

/// [`OverlayView`] implementation for egui
pub struct EguiOverlayView {
    id: Id,
    animation: AnimationConfig,
    bubble: BubbleConfig,
    style: OverlayStyle,
    state: RefCell<OverlayState>,
    target_activated: Signal<()>,
}

impl EguiOverlayView {
    /// Create a hidden overlay covering `frame`
    pub fn new(settings: &TourSettings, frame: ContainerFrame) -> Self {
        let bubble = settings.bubble;
        let estimate = bubble.bubble_size(Vec2::new(bubble.min_width, bubble.font_size));
        Self {
            id: Id::new("guided_tour_overlay"),
            animation: settings.animation,
            bubble,
            style: OverlayStyle::default(),
            state: RefCell::new(OverlayState {
                visible: false,
                description: String::new(),
                target: None,
                frame,
                engine: OverlayGeometryEngine::new(settings.overlay),
                layout: None,
                galley: None,
                needs_measure: false,
                bubble_size: estimate,
                anim_time: 0.0,
                fallback_armed: false,
                ui_pass: 0,
                armed_at: None,
            }),
            target_activated: Signal::new(),
        }
    }

    /// Update the container; takes effect on the next sync
    pub fn set_container(&self, frame: ContainerFrame) {
        self.state.borrow_mut().frame = frame;
    }

    /// Check if the overlay is shown
    pub fn is_visible(&self) -> bool {
        self.state.borrow().visible
    }

    /// Current description
    pub fn description(&self) -> String {
        self.state.borrow().description.clone()
    }

    /// Layout from the last sync, if a target is highlighted
    pub fn layout(&self) -> Option<OverlayLayout> {
        self.state.borrow().layout
    }

    /// Bubble size used by the last sync
    pub fn bubble_size(&self) -> Vec2 {
        self.state.borrow().bubble_size
    }

    /// Check if hole clicks fire [`OverlayView::target_activated`]
    pub fn is_fallback_armed(&self) -> bool {
        self.state.borrow().fallback_armed
    }

    /// Seconds of animation since the overlay was last shown
    pub fn animation_time(&self) -> f32 {
        self.state.borrow().anim_time
    }

    /// Route a click at a reference-space position.
    ///
    /// Returns true if it landed in the hole with the fallback armed, in
    /// which case [`OverlayView::target_activated`] has fired.
    pub fn handle_click(&self, pos: Pos2) -> bool {
        let hit = {
            let state = self.state.borrow();
            state.visible
                && state.fallback_armed
                && state.engine.hit_test(state.frame.to_local(pos))
        };

        if hit {
            tracing::debug!("Fallback click inside highlighted target");
            self.target_activated.emit(&());
        }
        hit
    }

    /// Measure the bubble, block input outside the hole, and paint.
    ///
    /// Call once per frame after the controller tick. A click released in
    /// the same frame the fallback was armed is not routed: it belongs to
    /// the control that completed the previous step.
    pub fn ui(&self, ctx: &egui::Context) {
        self.show_frame(ctx);
        self.state.borrow_mut().ui_pass += 1;
    }

    fn show_frame(&self, ctx: &egui::Context) {
        self.measure_bubble(ctx);

        let (layout, frame, fresh_fallback) = {
            let state = self.state.borrow();
            if !state.visible {
                return;
            }
            (state.layout, state.frame, state.armed_at == Some(state.ui_pass))
        };

        // Without a target the whole container blocks input
        let blockers: Vec<Rect> = match layout {
            Some(layout) => layout.panels.active().map(|p| p.rect).collect(),
            None => vec![frame.bounds],
        };
        egui::Area::new(self.id)
            .order(Order::Foreground)
            .fixed_pos(Pos2::ZERO)
            .constrain(false)
            .show(ctx, |ui| {
                for (i, rect) in blockers.iter().enumerate() {
                    let rect = frame.rect_to_reference(*rect);
                    let _ = ui.interact(rect, self.id.with(i), Sense::click());
                }
            });

        let painter = ctx.layer_painter(LayerId::new(Order::Foreground, self.id.with("paint")));
        self.paint(&painter);

        let click = ctx.input(|i| {
            if i.pointer.primary_clicked() {
                i.pointer.interact_pos()
            } else {
                None
            }
        });
        match click {
            Some(_) if fresh_fallback => {
                tracing::debug!("Ignoring click from the frame the fallback was armed");
            }
            Some(pos) => {
                self.handle_click(pos);
            }
            None => {}
        }

        if self.animation.show_pointer || self.animation.blink_text {
            ctx.request_repaint();
        }
    }

    /// Paint the overlay in reference space
    pub fn paint(&self, painter: &Painter) {
        let state = self.state.borrow();
        if !state.visible {
            return;
        }
        let frame = state.frame;

        let Some(layout) = state.layout else {
            // No target: dim everything and center the bubble
            painter.rect_filled(frame.rect_to_reference(frame.bounds), 0.0, self.style.mask);
            let center = frame.to_reference(frame.bounds.center());
            self.paint_bubble(painter, &state, center);
            return;
        };

        for panel in layout.panels.active() {
            painter.rect_filled(frame.rect_to_reference(panel.rect), 0.0, self.style.mask);
        }

        let highlight = Rect::from_center_size(layout.highlight.center, layout.highlight.size);
        painter.rect_stroke(
            frame.rect_to_reference(highlight),
            self.style.highlight_rounding,
            self.style.highlight,
        );

        self.paint_bubble(painter, &state, frame.to_reference(layout.bubble_anchor));

        if self.animation.show_pointer {
            let bob = self.animation.pointer_bob_offset(state.anim_time);
            let tip = frame.to_reference(layout.pointer_anchor + bob);
            painter.circle_filled(tip, self.style.pointer_radius, self.style.pointer);
            painter.circle_stroke(
                tip,
                self.style.pointer_radius + 3.0,
                Stroke::new(2.0, self.style.pointer.gamma_multiply(0.5)),
            );
        }
    }

    fn paint_bubble(&self, painter: &Painter, state: &OverlayState, center: Pos2) {
        let rect = Rect::from_center_size(center, state.bubble_size);
        painter.rect(rect, self.style.bubble_rounding, self.style.bubble_fill, self.style.bubble_stroke);

        let Some(galley) = state.galley.clone() else {
            return;
        };
        let alpha = self.animation.blink_alpha(state.anim_time);
        let text_pos = Pos2::new(
            rect.center().x - galley.size().x * 0.5,
            rect.min.y + self.bubble.vertical_padding,
        );
        painter.galley_with_override_text_color(text_pos, galley, self.style.text.gamma_multiply(alpha));
    }

    /// Lay out a pending description and resync with the new bubble size
    fn measure_bubble(&self, ctx: &egui::Context) {
        let mut state = self.state.borrow_mut();
        if !state.needs_measure {
            return;
        }
        state.needs_measure = false;

        let font = FontId::proportional(self.bubble.font_size);
        let text = state.description.clone();
        let bubble = self.bubble;
        let color = self.style.text;
        let galley = ctx.fonts(|fonts| {
            let natural = fonts.layout_no_wrap(text.clone(), font.clone(), color).size().x;
            let mut job = LayoutJob::simple(text, font, color, bubble.wrap_width(natural));
            job.wrap.max_rows = bubble.max_lines.max(1);
            fonts.layout_job(job)
        });

        let text_size = Vec2::new(bubble.wrap_width(galley.size().x), galley.size().y);
        state.bubble_size = bubble.bubble_size(text_size);
        state.galley = Some(galley);
        state.resync();
    }
}

impl OverlayView for EguiOverlayView {
    fn show(&self, description: &str, target: Option<&TargetHandle>) {
        let mut state = self.state.borrow_mut();
        state.visible = true;
        if state.description != description || state.galley.is_none() {
            state.description = description.to_string();
            state.needs_measure = true;
        }
        state.target = target.cloned();
        state.anim_time = 0.0;
        state.resync();
    }

    fn hide(&self) {
        let mut state = self.state.borrow_mut();
        state.visible = false;
        state.target = None;
        state.layout = None;
        state.engine.clear();
    }

    fn sync_to_target(&self, target: &TargetHandle) {
        let mut state = self.state.borrow_mut();
        state.target = Some(target.clone());
        state.resync();
    }

    fn set_fallback_click(&self, enabled: bool) {
        let mut state = self.state.borrow_mut();
        if enabled && !state.fallback_armed {
            state.armed_at = Some(state.ui_pass);
        } else if !enabled {
            state.armed_at = None;
        }
        state.fallback_armed = enabled;
    }

    fn target_activated(&self) -> &Signal<()> {
        &self.target_activated
    }

    fn tick_animation(&self, delta_time: f32) {
        let mut state = self.state.borrow_mut();
        if state.visible {
            state.anim_time += delta_time;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{pos2, vec2, RawInput};
    use crate::widgets::WidgetRegistry;
    use guided_tour_core::{PresenterConfig, Step, TargetId, TourController, TourTarget};
    use std::cell::Cell;
    use std::rc::Rc;

    struct Boxed {
        id: TargetId,
        rect: Cell<Rect>,
    }

    impl TourTarget for Boxed {
        fn id(&self) -> TargetId {
            self.id
        }

        fn corners(&self) -> [Pos2; 4] {
            let r = self.rect.get();
            [r.left_top(), r.right_top(), r.right_bottom(), r.left_bottom()]
        }

        fn is_live(&self) -> bool {
            true
        }
    }

    fn target(rect: Rect) -> (Rc<Boxed>, TargetHandle) {
        let boxed = Rc::new(Boxed {
            id: TargetId::new(),
            rect: Cell::new(rect),
        });
        let handle: TargetHandle = boxed.clone();
        (boxed, handle)
    }

    fn view() -> EguiOverlayView {
        let bounds = Rect::from_min_size(Pos2::ZERO, vec2(1920.0, 1080.0));
        EguiOverlayView::new(&TourSettings::default(), ContainerFrame::identity(bounds))
    }

    fn counter(view: &EguiOverlayView) -> Rc<Cell<u32>> {
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        view.target_activated().connect(move |_| h.set(h.get() + 1));
        hits
    }

    #[test]
    fn test_show_lays_out_around_target() {
        let view = view();
        let (_, handle) = target(Rect::from_min_max(pos2(100.0, 100.0), pos2(200.0, 150.0)));

        view.show("Tap here", Some(&handle));

        assert!(view.is_visible());
        assert_eq!(view.description(), "Tap here");
        let layout = view.layout().unwrap();
        assert_eq!(layout.hole, Rect::from_min_max(pos2(84.0, 84.0), pos2(216.0, 166.0)));
    }

    #[test]
    fn test_show_without_target_has_no_layout() {
        let view = view();
        view.show("Welcome", None);
        assert!(view.is_visible());
        assert!(view.layout().is_none());
    }

    #[test]
    fn test_sync_follows_moving_target() {
        let view = view();
        let (boxed, handle) = target(Rect::from_min_max(pos2(100.0, 100.0), pos2(200.0, 150.0)));
        view.show("", Some(&handle));

        boxed.rect.set(Rect::from_min_max(pos2(300.0, 300.0), pos2(400.0, 350.0)));
        view.sync_to_target(&handle);

        assert_eq!(view.layout().unwrap().hole.min, pos2(284.0, 284.0));
    }

    #[test]
    fn test_fallback_click_inside_hole() {
        let view = view();
        let hits = counter(&view);
        let (_, handle) = target(Rect::from_min_max(pos2(100.0, 100.0), pos2(200.0, 150.0)));
        view.show("", Some(&handle));

        // Not armed yet
        assert!(!view.handle_click(pos2(150.0, 120.0)));

        view.set_fallback_click(true);
        assert!(view.is_fallback_armed());
        assert!(!view.handle_click(pos2(500.0, 500.0)));
        assert!(view.handle_click(pos2(150.0, 120.0)));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_hidden_overlay_ignores_clicks() {
        let view = view();
        let hits = counter(&view);
        let (_, handle) = target(Rect::from_min_max(pos2(100.0, 100.0), pos2(200.0, 150.0)));
        view.show("", Some(&handle));
        view.set_fallback_click(true);

        view.hide();

        assert!(!view.is_visible());
        assert!(view.layout().is_none());
        assert!(!view.handle_click(pos2(150.0, 120.0)));
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn test_handler_may_reenter_view() {
        let view = Rc::new(view());
        let (_, handle) = target(Rect::from_min_max(pos2(100.0, 100.0), pos2(200.0, 150.0)));
        view.show("first", Some(&handle));
        view.set_fallback_click(true);

        let weak = Rc::downgrade(&view);
        view.target_activated().connect(move |_| {
            if let Some(view) = weak.upgrade() {
                view.set_fallback_click(false);
                view.show("second", None);
            }
        });

        assert!(view.handle_click(pos2(150.0, 120.0)));
        assert_eq!(view.description(), "second");
        assert!(!view.is_fallback_armed());
    }

    #[test]
    fn test_animation_resets_on_show() {
        let view = view();
        view.tick_animation(1.0);
        assert_eq!(view.animation_time(), 0.0);

        view.show("a", None);
        view.tick_animation(0.5);
        view.tick_animation(0.25);
        assert_eq!(view.animation_time(), 0.75);

        view.show("b", None);
        assert_eq!(view.animation_time(), 0.0);
    }

    #[test]
    fn test_bubble_measured_within_frame() {
        let view = view();
        let (_, handle) = target(Rect::from_min_max(pos2(100.0, 100.0), pos2(200.0, 150.0)));
        view.show("Open the shop to buy your first upgrade", Some(&handle));

        let ctx = egui::Context::default();
        let _ = ctx.run(RawInput::default(), |ctx| view.ui(ctx));

        let bubble = BubbleConfig::default();
        let size = view.bubble_size();
        assert!(size.x >= bubble.min_width + 2.0 * bubble.horizontal_padding);
        assert!(size.x <= bubble.max_width + 2.0 * bubble.horizontal_padding + 1.0);
        assert!(size.y > 2.0 * bubble.vertical_padding);
    }

    fn press(pos: Pos2, pressed: bool) -> Vec<egui::Event> {
        vec![
            egui::Event::PointerMoved(pos),
            egui::Event::PointerButton {
                pos,
                button: egui::PointerButton::Primary,
                pressed,
                modifiers: egui::Modifiers::default(),
            },
        ]
    }

    #[test]
    fn test_control_click_does_not_complete_next_fallback_step() {
        let screen = Rect::from_min_size(Pos2::ZERO, vec2(1920.0, 1080.0));
        let view = Rc::new(EguiOverlayView::new(&TourSettings::default(), ContainerFrame::identity(screen)));
        let registry = Rc::new(WidgetRegistry::new());
        registry.register_button("a", None);
        registry.register("b", None);
        registry.register("c", None);
        let controller = TourController::initialize(view.clone(), registry.clone(), PresenterConfig::default());
        controller.set_resolver(registry.clone());

        let ctx = egui::Context::default();
        let run = |events: Vec<egui::Event>| {
            let input = RawInput {
                screen_rect: Some(screen),
                events,
                ..Default::default()
            };
            let _ = ctx.run(input, |ctx| {
                registry.begin_frame();
                egui::CentralPanel::default().show(ctx, |ui| {
                    registry.button(ui, "a", "Button A");
                    // Directly beneath the button, so its hole covers the button too
                    registry.label(ui, "b", "Label B wide text");
                });
                view.set_container(ContainerFrame::identity(ctx.screen_rect()));
                controller.tick(ctx.input(|i| i.stable_dt));
                view.ui(ctx);
            });
        };

        run(Vec::new());
        let steps = vec![Step::new("A", "Press A"), Step::new("B", "Look at B"), Step::new("C", "Never drawn")];
        controller.play_by_key(steps, &["a", "b", "c"]).unwrap();
        run(Vec::new());

        let a = registry.get("a").unwrap().rect().center();
        run(press(a, true));
        run(press(a, false));

        assert_eq!(controller.sequencer().current_index(), Some(1));
        assert!(view.is_fallback_armed());
        assert!(view.layout().unwrap().hole.contains(a));

        // A fresh click on the label completes its step
        let b = registry.get("b").unwrap().rect().center();
        run(press(b, true));
        run(press(b, false));

        assert!(!controller.sequencer().is_playing());
        assert!(!view.is_visible());
    }
}
