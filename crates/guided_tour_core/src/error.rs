// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for the tour.

use thiserror::Error;

/// Invalid input to a play call. The sequencer is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// Step and target lists differ in length
    #[error("Step count ({steps}) must equal target count ({targets})")]
    LengthMismatch {
        /// Number of steps supplied
        steps: usize,
        /// Number of targets or keys supplied
        targets: usize,
    },

    /// Key-based play without a registered resolver
    #[error("No target resolver registered; call set_resolver() first")]
    MissingResolver,
}

/// Tour errors
#[derive(Debug, Error)]
pub enum TourError {
    /// Rejected play call
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Settings file could not be read or written
    #[error("IO error: {0}")]
    ConfigIo(#[from] std::io::Error),

    /// Settings file is not valid RON
    #[error("Failed to parse settings: {0}")]
    ConfigParse(#[from] ron::error::SpannedError),

    /// Settings could not be serialized
    #[error("Failed to serialize settings: {0}")]
    ConfigSerialize(#[from] ron::Error),

    /// Settings written by a newer version
    #[error("Settings version {found} is newer than supported version {supported}")]
    UnsupportedConfigVersion {
        /// Version found in the file
        found: u32,
        /// Highest version this build understands
        supported: u32,
    },
}

/// Result type for tour operations
pub type Result<T> = std::result::Result<T, TourError>;
