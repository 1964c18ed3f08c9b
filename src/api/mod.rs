//! HTTP layer: request handlers and response shapes.
//!
//! Two read surfaces (the flat feed and the GraphQL endpoint) are thin
//! encodings of the same response models in [`models`]; business rules never
//! live here.

pub mod handlers;
pub mod models;
