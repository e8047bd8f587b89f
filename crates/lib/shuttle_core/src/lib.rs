//! # shuttle_core
//!
//! Core domain logic for Shuttle: token handling, school-scoped student and
//! guardian records, and the storage backends behind them.

pub mod auth;
pub mod migrate;
pub mod models;
pub mod store;
pub mod uuid;
pub mod validation;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
