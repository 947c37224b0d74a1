//! HTTP middleware and extractors for the API.

pub mod auth;

pub use auth::RequireUser;
