//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`ConformError`] covers every failure mode of the decal
//! and framing subsystems:
//! - Missing print-area patch
//! - Empty candidate sets during projection
//! - Degenerate bounding volumes during camera framing
//! - Asset loading failures reported by the host
//! - Configuration errors
//!
//! None of these are fatal. Operations that fail return an error *without*
//! touching their inputs, and [`crate::pipeline`] turns each one into a
//! recovery path plus a log diagnostic.
//!
//! ```rust,ignore
//! use conform::errors::{ConformError, Result};
//!
//! fn frame() -> Result<()> {
//!     Err(ConformError::DegenerateBounds)
//! }
//! ```

use thiserror::Error;

/// The main error type for the crate.
#[derive(Error, Debug)]
pub enum ConformError {
    // ========================================================================
    // Decal Errors
    // ========================================================================
    /// No sub-mesh matches the reserved patch token.
    #[error("Print-area patch not found: {0}")]
    MissingPatch(String),

    /// The broad phase found no triangle near the patch.
    #[error("No candidate triangles near patch '{patch}'")]
    NoCandidates {
        /// Name of the patch mesh
        patch: String,
    },

    /// The patch's world matrix cannot be inverted.
    #[error("Singular world transform on mesh '{0}'")]
    SingularTransform(String),

    // ========================================================================
    // Framing Errors
    // ========================================================================
    /// A bounding box has non-finite or zero extent.
    #[error("Degenerate bounding box")]
    DegenerateBounds,

    // ========================================================================
    // Asset Errors
    // ========================================================================
    /// Mesh or texture failed to load on the host side.
    #[error("Asset load failure: {0}")]
    AssetLoad(String),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Alias for `Result<T, ConformError>`.
pub type Result<T> = std::result::Result<T, ConformError>;
