//! Service collaborators that are not database repositories.

pub mod images;

pub use images::ImageStore;
