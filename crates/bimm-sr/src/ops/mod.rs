//! # Image Operations

/// Box-filter downscaling.
pub mod downscale;
