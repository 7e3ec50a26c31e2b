//! # Paired Sample Data
//!
//! Writing and reading low/high resolution training pairs.

/// Record-backed datasets and batching.
pub mod dataset;

/// Record format errors.
pub mod error;

/// `tf.train.Example` messages.
pub mod example;

/// Record generation.
pub mod generate;

/// Checksummed record framing.
pub mod records;

/// Paired sample schema.
pub mod sample;
