//! # Utility Support Functions
//!
//! This module exists to support developing `bimm-sr` modules.

pub mod burn;
