// SPDX-License-Identifier: MIT OR Apache-2.0
//! egui front end for the guided tour.
//!
//! This crate provides:
//! - [`EguiOverlayView`], an [`OverlayView`](guided_tour_core::OverlayView) drawn with egui
//! - [`WidgetRegistry`], which turns egui widgets into tour targets and finds their buttons

pub mod overlay;
pub mod widgets;

pub use overlay::{EguiOverlayView, OverlayStyle};
pub use widgets::{ButtonControl, WidgetRegistry, WidgetTarget};
