// SPDX-License-Identifier: MIT OR Apache-2.0
//! Tour settings.
//!
//! This module holds every tunable of the overlay:
//! - Presenter policy for missing targets
//! - Overlay geometry (padding, offsets, margins)
//! - Pointer and text animation
//! - Bubble text sizing
//!
//! Settings are stored as RON.

use crate::error::{Result, TourError};
use egui::Vec2;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// What the presenter does when a step's target is absent or not live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MissingTargetPolicy {
    /// Stop the whole tour
    #[default]
    AutoStop,
    /// Keep going and show the step without a highlight
    Continue,
}

/// Presenter behavior
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenterConfig {
    /// Missing target handling
    pub missing_target: MissingTargetPolicy,
}

/// Overlay geometry settings. Offsets are in container units, y down.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Padding added around the target on every side
    pub padding: f32,
    /// Bubble offset from the hole center
    pub text_offset: [f32; 2],
    /// Pointer offset from the hole center
    pub pointer_offset: [f32; 2],
    /// Extra space kept between the bubble and the container edge
    pub bubble_margin: f32,
}

impl OverlayConfig {
    /// Bubble offset as a vector
    pub fn text_offset(&self) -> Vec2 {
        Vec2::from(self.text_offset)
    }

    /// Pointer offset as a vector
    pub fn pointer_offset(&self) -> Vec2 {
        Vec2::from(self.pointer_offset)
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            padding: 16.0,
            text_offset: [0.0, 140.0],
            pointer_offset: [80.0, 40.0],
            bubble_margin: 8.0,
        }
    }
}

/// Pointer bob and description blink
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Draw the pointer at all
    pub show_pointer: bool,
    /// Bob distance
    pub pointer_amplitude: f32,
    /// Bob angular speed (radians per second)
    pub pointer_speed: f32,
    /// Bob direction, normalized on use
    pub pointer_direction: [f32; 2],
    /// Pulse the description alpha
    pub blink_text: bool,
    /// Blink angular speed (radians per second)
    pub blink_speed: f32,
    /// Lowest description alpha
    pub blink_min_alpha: f32,
    /// Highest description alpha
    pub blink_max_alpha: f32,
}

impl AnimationConfig {
    /// Pointer displacement from its anchor after `time` seconds.
    ///
    /// A near-zero direction falls back to straight up.
    pub fn pointer_bob_offset(&self, time: f32) -> Vec2 {
        let dir = Vec2::from(self.pointer_direction);
        let dir = if dir.length_sq() < 0.0001 {
            Vec2::new(0.0, -1.0)
        } else {
            dir.normalized()
        };
        dir * ((time * self.pointer_speed).sin() * self.pointer_amplitude)
    }

    /// Description alpha after `time` seconds
    pub fn blink_alpha(&self, time: f32) -> f32 {
        if !self.blink_text {
            return self.blink_max_alpha;
        }
        let t = ((time * self.blink_speed).sin() + 1.0) * 0.5;
        egui::emath::lerp(self.blink_min_alpha..=self.blink_max_alpha, t)
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            show_pointer: true,
            pointer_amplitude: 12.0,
            pointer_speed: 3.5,
            pointer_direction: [0.0, -1.0],
            blink_text: true,
            blink_speed: 2.5,
            blink_min_alpha: 0.45,
            blink_max_alpha: 1.0,
        }
    }
}

/// Description bubble sizing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BubbleConfig {
    /// Narrowest text wrap width
    pub min_width: f32,
    /// Widest text wrap width
    pub max_width: f32,
    /// Maximum number of text rows
    pub max_lines: usize,
    /// Space left and right of the text
    pub horizontal_padding: f32,
    /// Space above and below the text
    pub vertical_padding: f32,
    /// Description font size
    pub font_size: f32,
}

impl BubbleConfig {
    /// Wrap width for text whose unwrapped width is `natural_width`
    pub fn wrap_width(&self, natural_width: f32) -> f32 {
        natural_width.clamp(self.min_width, self.max_width.max(self.min_width))
    }

    /// Full bubble size around text of the given size
    pub fn bubble_size(&self, text_size: Vec2) -> Vec2 {
        text_size + Vec2::new(self.horizontal_padding, self.vertical_padding) * 2.0
    }
}

impl Default for BubbleConfig {
    fn default() -> Self {
        Self {
            min_width: 260.0,
            max_width: 520.0,
            max_lines: 2,
            horizontal_padding: 24.0,
            vertical_padding: 12.0,
            font_size: 18.0,
        }
    }
}

/// All tour settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TourSettings {
    /// Format version
    pub version: u32,
    /// Presenter behavior
    pub presenter: PresenterConfig,
    /// Overlay geometry
    pub overlay: OverlayConfig,
    /// Animation
    pub animation: AnimationConfig,
    /// Bubble sizing
    pub bubble: BubbleConfig,
}

impl Default for TourSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            presenter: PresenterConfig::default(),
            overlay: OverlayConfig::default(),
            animation: AnimationConfig::default(),
            bubble: BubbleConfig::default(),
        }
    }
}

impl TourSettings {
    /// Parse settings from a RON string
    pub fn from_ron_str(content: &str) -> Result<Self> {
        let settings: TourSettings = ron::from_str(content)?;

        if settings.version > SETTINGS_FORMAT_VERSION {
            return Err(TourError::UnsupportedConfigVersion {
                found: settings.version,
                supported: SETTINGS_FORMAT_VERSION,
            });
        }

        Ok(settings)
    }

    /// Serialize settings to pretty RON
    pub fn to_ron_string(&self) -> Result<String> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, config)?)
    }

    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings = Self::from_ron_str(&content)?;
        tracing::debug!("Loaded tour settings from {}", path.display());
        Ok(settings)
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_ron_string()?)?;
        Ok(())
    }
}
