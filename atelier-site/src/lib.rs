//! atelier-site library interface
//!
//! Data access for the artist representation site: backend client, record
//! validation, response cache, request throttle and the page loaders built
//! on top of them.

pub mod airtable;
pub mod cache;
pub mod data_access;
pub mod fallback;
pub mod pages;
pub mod source;
pub mod throttle;
pub mod validation;

pub use crate::airtable::{Backend, BackendError};
pub use crate::data_access::{DataAccessContext, DataAccessOptions};
pub use crate::pages::{PageLoader, PageOutcome};
pub use crate::source::{build_source, DataSource, FallbackSource, LiveSource, WithFallback};
