//! Database layer for note persistence and access.
//!
//! Uses SQLx with PostgreSQL. Repository structs in [`handlers`] encapsulate
//! all SQL for one table each; [`models`] holds the row structures and insert
//! request types; [`errors`] categorizes database failures.
//!
//! Both tables are append-only. The submission service is the only writer,
//! and readers never touch these repositories directly - they go through
//! [`crate::submissions::Submissions`].

pub mod errors;
pub mod handlers;
pub mod models;
