//! Domain models.

pub mod auth;
pub mod student;
