//! # Burn-Related Utilities

pub mod noise;
