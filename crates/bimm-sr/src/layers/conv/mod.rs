//! # Convolution Layers

/// Reflect-padded transposed convolution.
pub mod reflect_deconv;

/// Stride-aware "same" padded convolution.
pub mod same_conv;
