//! Testing utilities for factoryflow.
//!
//! This module provides:
//! - An in-memory control plane implementing [`crate::client::FactoryClient`]
//! - Sample requests and a wired-up service
//! - A polling helper that waits for a run to finish

mod fake;
mod fixtures;
mod polling;

pub use fake::InMemoryFactoryClient;
pub use fixtures::{
    sample_spec, test_client, test_config, TestService, SINK_LINKED_SERVICE,
    SOURCE_LINKED_SERVICE, STORAGE_ACCOUNT,
};
pub use polling::wait_for_terminal;
