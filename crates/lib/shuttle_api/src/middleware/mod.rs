//! Request middleware.

pub mod auth;
pub mod school_scope;
