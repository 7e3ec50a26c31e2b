//! Compat code bridging ops `burn` does not provide.
//!
//! This module is crate-private.

/// Padding and cropping ops.
pub mod ops;
