// SPDX-License-Identifier: MIT OR Apache-2.0
//! Guided tour core.
//!
//! This crate drives an in-app guided tour overlay:
//! - Step sequencing with enter/complete hooks
//! - Binding of the current step to an activatable control (or a hit-test fallback)
//! - Overlay geometry: highlight hole, masking panels, bubble placement
//!
//! ## Architecture
//!
//! The tour is built on:
//! - [`StepSequencer`], a state machine over an ordered step/target list
//! - [`BindingPresenter`], which listens to the sequencer and drives an [`OverlayView`]
//! - [`OverlayGeometryEngine`], a pure transform from target corners to overlay layout
//! - [`TourController`], the owner that wires everything and ticks it once per frame
//!
//! Everything is single-threaded and synchronous. Notifications are delivered
//! through [`Signal`], which tolerates re-entrant calls from its handlers.

pub mod config;
pub mod controller;
pub mod error;
pub mod geometry;
pub mod presenter;
pub mod sequencer;
pub mod signal;
pub mod step;
pub mod target;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{
    AnimationConfig, BubbleConfig, MissingTargetPolicy, OverlayConfig, PresenterConfig,
    TourSettings, SETTINGS_FORMAT_VERSION,
};
pub use controller::TourController;
pub use error::{ConfigurationError, Result, TourError};
pub use geometry::{
    ContainerFrame, Highlight, MaskPanel, MaskPanels, OverlayGeometryEngine, OverlayLayout,
    PANEL_EPSILON,
};
pub use presenter::{BindingKind, BindingPresenter};
pub use sequencer::{SequencerState, StepChange, StepSequencer};
pub use signal::{Signal, SubscriptionId};
pub use step::{Hook, Step, StepHooks};
pub use target::{TargetHandle, TargetId, TargetResolver, TourTarget};
pub use view::{ActivatableControl, ControlHandle, ControlLocator, OverlayView};
