//! Shared test infrastructure for the journey tests

pub mod harness;
pub mod mocks;
