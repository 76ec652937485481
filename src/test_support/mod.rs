//! Shared fixtures for unit and integration tests.

mod support;

pub use support::*;
