// SPDX-License-Identifier: MIT OR Apache-2.0
//! Overlay geometry.
//!
//! Converts a target's four corners into:
//! - A padded, clamped hole rectangle in container-local space
//! - Four masking panels tiling the container around the hole
//! - Bubble and pointer anchors
//!
//! All outputs are recomputed on every sync. The only retained state is the
//! last hole, kept for fallback hit-testing.

use crate::config::OverlayConfig;
use egui::emath::TSTransform;
use egui::{Pos2, Rect, Vec2};

/// Panels thinner than this on either axis are not rendered
pub const PANEL_EPSILON: f32 = 0.1;

/// The overlay's coordinate frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerFrame {
    /// Container bounds in local space
    pub bounds: Rect,
    /// Maps the shared reference space into local space
    pub from_reference: TSTransform,
}

impl ContainerFrame {
    /// Create a frame
    pub fn new(bounds: Rect, from_reference: TSTransform) -> Self {
        Self { bounds, from_reference }
    }

    /// Frame whose local space is the reference space
    pub fn identity(bounds: Rect) -> Self {
        Self::new(bounds, TSTransform::IDENTITY)
    }

    /// Reference point to local
    pub fn to_local(&self, point: Pos2) -> Pos2 {
        self.from_reference.mul_pos(point)
    }

    /// Local point to reference
    pub fn to_reference(&self, point: Pos2) -> Pos2 {
        self.from_reference.inverse().mul_pos(point)
    }

    /// Local rectangle to reference
    pub fn rect_to_reference(&self, rect: Rect) -> Rect {
        self.from_reference.inverse().mul_rect(rect)
    }
}

/// Highlight frame drawn around the hole
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Highlight {
    /// Center in local space
    pub center: Pos2,
    /// Full size
    pub size: Vec2,
}

/// One masking panel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskPanel {
    /// Panel rectangle in local space
    pub rect: Rect,
    /// False when the panel is too thin to render
    pub active: bool,
}

impl MaskPanel {
    fn from_edges(x_min: f32, x_max: f32, y_min: f32, y_max: f32) -> Self {
        let w = (x_max - x_min).max(0.0);
        let h = (y_max - y_min).max(0.0);
        Self {
            rect: Rect::from_min_size(Pos2::new(x_min, y_min), Vec2::new(w, h)),
            active: w > PANEL_EPSILON && h > PANEL_EPSILON,
        }
    }

    /// Panel area, whether or not it is active
    pub fn area(&self) -> f32 {
        self.rect.width() * self.rect.height()
    }
}

/// The four panels around the hole
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskPanels {
    /// Full width, container top to hole top
    pub top: MaskPanel,
    /// Full width, hole bottom to container bottom
    pub bottom: MaskPanel,
    /// Hole height, container left to hole left
    pub left: MaskPanel,
    /// Hole height, hole right to container right
    pub right: MaskPanel,
}

impl MaskPanels {
    /// All panels, top, bottom, left, right
    pub fn iter(&self) -> impl Iterator<Item = &MaskPanel> {
        [&self.top, &self.bottom, &self.left, &self.right].into_iter()
    }

    /// Panels that should be rendered
    pub fn active(&self) -> impl Iterator<Item = &MaskPanel> {
        self.iter().filter(|p| p.active)
    }
}

/// Everything the view needs to draw one frame of the overlay
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayLayout {
    /// Padded, clamped target bounds in local space
    pub hole: Rect,
    /// Highlight frame (same extent as the hole)
    pub highlight: Highlight,
    /// Masking panels
    pub panels: MaskPanels,
    /// Center of the description bubble
    pub bubble_anchor: Pos2,
    /// Base position of the pointer, before bobbing
    pub pointer_anchor: Pos2,
}

/// Compute the overlay layout for a target.
///
/// `bubble_size` must be the bubble's current measured size; a stale size
/// gives a stale clamp.
pub fn compute_layout(
    corners: &[Pos2; 4],
    frame: &ContainerFrame,
    config: &OverlayConfig,
    bubble_size: Vec2,
) -> OverlayLayout {
    let bounds = frame.bounds;

    // Bounding box of all four projected corners
    let mut min = Pos2::new(f32::INFINITY, f32::INFINITY);
    let mut max = Pos2::new(f32::NEG_INFINITY, f32::NEG_INFINITY);
    for corner in corners {
        let p = frame.to_local(*corner);
        min = min.min(p);
        max = max.max(p);
    }

    let pad = Vec2::splat(config.padding);
    let mut min = min - pad;
    let mut max = max + pad;

    // Negative padding can flip the box
    if min.x > max.x {
        std::mem::swap(&mut min.x, &mut max.x);
    }
    if min.y > max.y {
        std::mem::swap(&mut min.y, &mut max.y);
    }

    let min = clamp_to(min, bounds);
    let max = clamp_to(max, bounds);
    let hole = Rect::from_min_max(min, max);

    let panels = MaskPanels {
        top: MaskPanel::from_edges(bounds.min.x, bounds.max.x, bounds.min.y, hole.min.y),
        bottom: MaskPanel::from_edges(bounds.min.x, bounds.max.x, hole.max.y, bounds.max.y),
        left: MaskPanel::from_edges(bounds.min.x, hole.min.x, hole.min.y, hole.max.y),
        right: MaskPanel::from_edges(hole.max.x, bounds.max.x, hole.min.y, hole.max.y),
    };

    let center = hole.center();
    let half_bubble = bubble_size * 0.5 + Vec2::splat(config.bubble_margin);
    let bubble_anchor = Pos2::new(
        clamp_axis(center.x + config.text_offset[0], bounds.min.x, bounds.max.x, half_bubble.x),
        clamp_axis(center.y + config.text_offset[1], bounds.min.y, bounds.max.y, half_bubble.y),
    );

    OverlayLayout {
        hole,
        highlight: Highlight {
            center,
            size: hole.size(),
        },
        panels,
        bubble_anchor,
        pointer_anchor: center + config.pointer_offset(),
    }
}

fn clamp_to(p: Pos2, bounds: Rect) -> Pos2 {
    Pos2::new(
        p.x.max(bounds.min.x).min(bounds.max.x),
        p.y.max(bounds.min.y).min(bounds.max.y),
    )
}

/// Keep an interval of half-width `half` centered at `value` inside `[lo, hi]`.
/// An interval wider than the range is centered on it.
fn clamp_axis(value: f32, lo: f32, hi: f32, half: f32) -> f32 {
    let lo_c = lo + half;
    let hi_c = hi - half;
    if lo_c > hi_c {
        (lo + hi) * 0.5
    } else {
        value.max(lo_c).min(hi_c)
    }
}

/// Geometry engine with the last hole retained for hit-testing
#[derive(Debug, Clone, Default)]
pub struct OverlayGeometryEngine {
    config: OverlayConfig,
    hole: Option<Rect>,
}

impl OverlayGeometryEngine {
    /// Create an engine with the given settings
    pub fn new(config: OverlayConfig) -> Self {
        Self { config, hole: None }
    }

    /// Recompute the layout for a target and remember its hole
    pub fn sync(&mut self, corners: &[Pos2; 4], frame: &ContainerFrame, bubble_size: Vec2) -> OverlayLayout {
        let layout = compute_layout(corners, frame, &self.config, bubble_size);
        self.hole = Some(layout.hole);
        layout
    }

    /// Forget the hole; hit-tests fail until the next sync
    pub fn clear(&mut self) {
        self.hole = None;
    }

    /// Last computed hole, in local space
    pub fn hole(&self) -> Option<Rect> {
        self.hole
    }

    /// Whether a local-space point falls inside the last hole
    pub fn hit_test(&self, local_point: Pos2) -> bool {
        self.hole.is_some_and(|hole| hole.contains(local_point))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    fn container() -> ContainerFrame {
        ContainerFrame::identity(Rect::from_min_max(pos2(0.0, 0.0), pos2(800.0, 600.0)))
    }

    fn corners_of(rect: Rect) -> [Pos2; 4] {
        [rect.left_top(), rect.right_top(), rect.right_bottom(), rect.left_bottom()]
    }

    fn config(padding: f32) -> OverlayConfig {
        OverlayConfig {
            padding,
            ..OverlayConfig::default()
        }
    }

    fn panel_area_sum(layout: &OverlayLayout) -> f32 {
        layout.panels.iter().map(MaskPanel::area).sum()
    }

    #[test]
    fn test_padded_hole() {
        let target = Rect::from_min_max(pos2(100.0, 50.0), pos2(300.0, 250.0));
        let layout = compute_layout(&corners_of(target), &container(), &config(10.0), Vec2::ZERO);

        assert_eq!(layout.hole, Rect::from_min_max(pos2(90.0, 40.0), pos2(310.0, 260.0)));
        assert_eq!(layout.highlight.center, pos2(200.0, 150.0));
        assert_eq!(layout.highlight.size, Vec2::new(220.0, 220.0));
    }

    #[test]
    fn test_panels_tile_container() {
        let target = Rect::from_min_max(pos2(100.0, 50.0), pos2(300.0, 250.0));
        let layout = compute_layout(&corners_of(target), &container(), &config(0.0), Vec2::ZERO);
        let panels = layout.panels;

        assert_eq!(panels.top.rect, Rect::from_min_max(pos2(0.0, 0.0), pos2(800.0, 50.0)));
        assert_eq!(panels.bottom.rect, Rect::from_min_max(pos2(0.0, 250.0), pos2(800.0, 600.0)));
        assert_eq!(panels.left.rect, Rect::from_min_max(pos2(0.0, 50.0), pos2(100.0, 250.0)));
        assert_eq!(panels.right.rect, Rect::from_min_max(pos2(300.0, 50.0), pos2(800.0, 250.0)));
        assert_eq!(panels.active().count(), 4);

        let hole_area = layout.hole.width() * layout.hole.height();
        assert_eq!(panel_area_sum(&layout), 800.0 * 600.0 - hole_area);

        for (i, a) in panels.iter().enumerate() {
            assert!(!a.rect.intersects(layout.hole.shrink(0.5)));
            for b in panels.iter().skip(i + 1) {
                assert!(!a.rect.intersect(b.rect).is_positive());
            }
        }
    }

    #[test]
    fn test_rotated_target_uses_all_corners() {
        // Diamond: a square rotated 45 degrees around (400, 300)
        let corners = [pos2(400.0, 250.0), pos2(450.0, 300.0), pos2(400.0, 350.0), pos2(350.0, 300.0)];
        let layout = compute_layout(&corners, &container(), &config(0.0), Vec2::ZERO);
        assert_eq!(layout.hole, Rect::from_min_max(pos2(350.0, 250.0), pos2(450.0, 350.0)));
    }

    #[test]
    fn test_reference_transform_applied() {
        let frame = ContainerFrame::new(
            Rect::from_min_max(pos2(0.0, 0.0), pos2(400.0, 300.0)),
            TSTransform::new(Vec2::new(-100.0, -100.0), 0.5),
        );
        let target = Rect::from_min_max(pos2(200.0, 200.0), pos2(400.0, 300.0));
        let layout = compute_layout(&corners_of(target), &frame, &config(0.0), Vec2::ZERO);
        assert_eq!(layout.hole, Rect::from_min_max(pos2(0.0, 0.0), pos2(100.0, 50.0)));
        assert_eq!(frame.to_reference(pos2(0.0, 0.0)), pos2(200.0, 200.0));
    }

    #[test]
    fn test_negative_padding_normalized() {
        let target = Rect::from_min_max(pos2(100.0, 100.0), pos2(110.0, 110.0));
        let layout = compute_layout(&corners_of(target), &container(), &config(-20.0), Vec2::ZERO);
        assert!(layout.hole.min.x <= layout.hole.max.x);
        assert!(layout.hole.min.y <= layout.hole.max.y);
        assert_eq!(layout.hole, Rect::from_min_max(pos2(90.0, 90.0), pos2(120.0, 120.0)));
    }

    #[test]
    fn test_hole_clamps_to_right_edge() {
        let target = Rect::from_min_max(pos2(700.0, 200.0), pos2(900.0, 300.0));
        let layout = compute_layout(&corners_of(target), &container(), &config(0.0), Vec2::ZERO);

        assert_eq!(layout.hole.max.x, 800.0);
        assert!(!layout.panels.right.active);
        assert_eq!(layout.panels.right.rect.width(), 0.0);

        assert!(layout.panels.top.active);
        assert_eq!(layout.panels.top.rect, Rect::from_min_max(pos2(0.0, 0.0), pos2(800.0, 200.0)));
        assert!(layout.panels.bottom.active);
        assert_eq!(layout.panels.bottom.rect, Rect::from_min_max(pos2(0.0, 300.0), pos2(800.0, 600.0)));
        assert!(layout.panels.left.active);
        assert_eq!(layout.panels.left.rect, Rect::from_min_max(pos2(0.0, 200.0), pos2(700.0, 300.0)));
    }

    #[test]
    fn test_hole_always_inside_container() {
        let frame = container();
        let targets = [
            Rect::from_min_max(pos2(-50.0, -50.0), pos2(20.0, 20.0)),
            Rect::from_min_max(pos2(780.0, 590.0), pos2(1000.0, 900.0)),
            Rect::from_min_max(pos2(-500.0, 100.0), pos2(-300.0, 200.0)),
            Rect::from_min_max(pos2(-100.0, -100.0), pos2(900.0, 700.0)),
            Rect::from_min_max(pos2(400.0, 300.0), pos2(400.0, 300.0)),
        ];

        for target in targets {
            let layout = compute_layout(&corners_of(target), &frame, &config(16.0), Vec2::ZERO);
            assert!(frame.bounds.contains_rect(layout.hole), "{target:?} -> {:?}", layout.hole);

            let hole_area = layout.hole.width() * layout.hole.height();
            let expected = frame.bounds.area() - hole_area;
            assert!((panel_area_sum(&layout) - expected).abs() < 1e-2);
        }
    }

    #[test]
    fn test_target_outside_container_leaves_degenerate_hole() {
        let target = Rect::from_min_max(pos2(-500.0, 100.0), pos2(-300.0, 200.0));
        let layout = compute_layout(&corners_of(target), &container(), &config(0.0), Vec2::ZERO);
        assert_eq!(layout.hole.width(), 0.0);
        assert!(!layout.panels.left.active);
        assert!(layout.panels.right.active);
    }

    #[test]
    fn test_bubble_anchor_offset_and_clamp() {
        let cfg = OverlayConfig {
            padding: 0.0,
            text_offset: [0.0, 140.0],
            bubble_margin: 10.0,
            ..OverlayConfig::default()
        };

        let target = Rect::from_min_max(pos2(300.0, 100.0), pos2(500.0, 200.0));
        let layout = compute_layout(&corners_of(target), &container(), &cfg, Vec2::new(200.0, 60.0));
        assert_eq!(layout.bubble_anchor, pos2(400.0, 290.0));

        // Near the bottom-left corner the bubble is pushed back inside
        let target = Rect::from_min_max(pos2(0.0, 500.0), pos2(40.0, 560.0));
        let layout = compute_layout(&corners_of(target), &container(), &cfg, Vec2::new(200.0, 60.0));
        assert_eq!(layout.bubble_anchor, pos2(110.0, 560.0));
    }

    #[test]
    fn test_oversized_bubble_centered() {
        let target = Rect::from_min_max(pos2(0.0, 0.0), pos2(10.0, 10.0));
        let layout = compute_layout(&corners_of(target), &container(), &config(0.0), Vec2::new(2000.0, 40.0));
        assert_eq!(layout.bubble_anchor.x, 400.0);
    }

    #[test]
    fn test_pointer_anchor() {
        let cfg = OverlayConfig {
            padding: 0.0,
            pointer_offset: [80.0, 40.0],
            ..OverlayConfig::default()
        };
        let target = Rect::from_min_max(pos2(100.0, 100.0), pos2(200.0, 200.0));
        let layout = compute_layout(&corners_of(target), &container(), &cfg, Vec2::ZERO);
        assert_eq!(layout.pointer_anchor, pos2(230.0, 190.0));
    }

    #[test]
    fn test_sync_is_idempotent() {
        let mut engine = OverlayGeometryEngine::new(OverlayConfig::default());
        let corners = [pos2(120.0, 80.0), pos2(260.0, 95.0), pos2(245.0, 210.0), pos2(105.0, 195.0)];
        let first = engine.sync(&corners, &container(), Vec2::new(300.0, 50.0));
        let second = engine.sync(&corners, &container(), Vec2::new(300.0, 50.0));
        assert_eq!(first, second);
        assert_eq!(engine.hole(), Some(second.hole));
    }

    #[test]
    fn test_hit_test() {
        let mut engine = OverlayGeometryEngine::new(config(0.0));
        assert!(!engine.hit_test(pos2(150.0, 150.0)));

        let target = Rect::from_min_max(pos2(100.0, 100.0), pos2(200.0, 200.0));
        engine.sync(&corners_of(target), &container(), Vec2::ZERO);
        assert!(engine.hit_test(pos2(150.0, 150.0)));
        assert!(!engine.hit_test(pos2(250.0, 150.0)));

        engine.clear();
        assert!(!engine.hit_test(pos2(150.0, 150.0)));
    }
}
