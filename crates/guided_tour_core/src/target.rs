// SPDX-License-Identifier: MIT OR Apache-2.0
//! Target handles and key resolution.

use egui::Pos2;
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use uuid::Uuid;

/// Unique identifier for a tour target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetId(pub Uuid);

impl TargetId {
    /// Create a new random target ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TargetId {
    fn default() -> Self {
        Self::new()
    }
}

/// A rectangular UI element a step can highlight.
///
/// Implemented by the UI layer. The tour only reads it.
pub trait TourTarget {
    /// Stable identity, used by control locators to find the element again
    fn id(&self) -> TargetId;

    /// Corners in the shared reference space, in winding order.
    ///
    /// Rotated or skewed elements report their true corners; the overlay
    /// takes the bounding box of all four.
    fn corners(&self) -> [Pos2; 4];

    /// Whether the element is currently attached and visible
    fn is_live(&self) -> bool;

    /// Human-readable name for diagnostics
    fn name(&self) -> &str {
        ""
    }
}

/// Shared handle to a target
pub type TargetHandle = Rc<dyn TourTarget>;

/// Key-based lookup of targets
pub trait TargetResolver {
    /// Resolve a key, returning `None` when nothing matches
    fn resolve(&self, key: &str) -> Option<TargetHandle>;
}

/// Liveness check that treats an absent target as not live
pub fn is_live(target: Option<&TargetHandle>) -> bool {
    target.is_some_and(|t| t.is_live())
}
