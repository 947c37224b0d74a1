//! Core types for Ladle.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod label;
pub mod price;

pub use email::{Email, EmailError};
pub use id::*;
pub use label::{Label, LabelError};
pub use price::{Price, PriceError};
