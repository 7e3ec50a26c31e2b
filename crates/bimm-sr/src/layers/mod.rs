//! # Super-Resolution Layers

/// Convolution layers.
pub mod conv;

/// Flatten and dense layers.
pub mod dense;

/// Sub-pixel shuffling.
pub mod shuffle;
