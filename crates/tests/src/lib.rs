//! Integration Tests for the MPIC Coordinator
//!
//! This crate contains the following test modules:
//!
//! - `remote_client_tests`: the HTTP perspective caller against mockito perspectives
//! - `dispatcher_tests`: concurrent fan-out, ordering and per-call timeouts
//! - `coordinator_tests`: full coordinations built from configuration
//! - `mock_infrastructure`: reusable mocks (mock perspectives, scripted caller, fixtures)
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --package tests
//! ```

#[cfg(test)]
mod remote_client_tests;


#[cfg(test)]
mod coordinator_tests;
