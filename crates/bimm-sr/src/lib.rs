#![warn(missing_docs)]
//!# bimm-sr - Burn Super-Resolution Utilities
//!
//! Layer builders, pixel shuffling, downscaling, paired sample records,
//! and plotting for single-image super-resolution models.

/// Test-only macro import.
#[cfg(test)]
#[allow(unused_imports)]
#[macro_use]
extern crate hamcrest;

pub(crate) mod compat;

#[cfg(test)]
#[allow(dead_code)]
pub(crate) mod testing;

pub mod data;
pub mod layers;
pub mod ops;
pub mod utility;
pub mod viz;
