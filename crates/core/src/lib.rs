//! Ladle Core - Shared types library.
//!
//! This crate provides common types used across all Ladle components:
//! - `api` - The recipe-management HTTP service
//! - `integration-tests` - End-to-end API tests
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. Validation lives in the constructors, so a value of one of these
//! types is valid by construction wherever it flows.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, labels, and prices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
