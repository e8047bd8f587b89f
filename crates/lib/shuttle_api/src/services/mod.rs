//! Service layer between handlers and the store.

pub mod auth;
pub mod permissions;
pub mod students;
