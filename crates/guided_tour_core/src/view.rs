// SPDX-License-Identifier: MIT OR Apache-2.0
//! Contracts between the presenter and the UI layer.

use crate::signal::Signal;
use crate::target::TargetHandle;
use std::rc::Rc;

/// Rendering surface for the overlay.
///
/// The presenter drives it from inside signal handlers, so methods take
/// `&self`; implementations keep their state behind interior mutability
/// and must not hold a borrow while emitting [`Self::target_activated`].
pub trait OverlayView {
    /// Show the overlay with a description, highlighting `target` if given
    fn show(&self, description: &str, target: Option<&TargetHandle>);

    /// Hide the overlay
    fn hide(&self);

    /// Recompute the overlay layout against the target's current rectangle
    fn sync_to_target(&self, target: &TargetHandle);

    /// Arm or disarm the hit-test fallback
    fn set_fallback_click(&self, enabled: bool);

    /// Fired when a fallback click lands inside the highlighted hole
    fn target_activated(&self) -> &Signal<()>;

    /// Advance view-side animation
    fn tick_animation(&self, _delta_time: f32) {}
}

/// An interactive control that reports user activation
pub trait ActivatableControl {
    /// Fired when the user activates the control
    fn activated(&self) -> &Signal<()>;

    /// Name for diagnostics
    fn label(&self) -> &str {
        ""
    }
}

/// Shared handle to a control
pub type ControlHandle = Rc<dyn ActivatableControl>;

/// Finds the control that represents a target.
///
/// Implementations look on the target itself first, then up its ancestors.
pub trait ControlLocator {
    /// The control for `target`, if any
    fn find_control(&self, target: &TargetHandle) -> Option<ControlHandle>;
}
