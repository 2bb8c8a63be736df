//! Test Helper Utilities
//!
//! Shared utilities for testing atelier-site

#![allow(dead_code)]

pub mod fake_backend;
pub mod records;

// Re-export commonly used items
pub use fake_backend::FakeBackend;
pub use records::{artist_record, fact_record, record, review_record, service_record};
