//! Utility types and functions for the exporter.
//!
//! This module contains fundamental types used throughout the library:
//! - [`Error`] / [`Result`] - Error handling
//! - Math type re-exports from glam and the matrix/number codec

mod error;
mod math;

pub use error::*;
pub use math::*;
