//! # Atelier Common Library
//!
//! Shared code for the Atelier site crates including:
//! - Domain entities (artists, reviews, services, quick facts)
//! - Configuration loading and credential resolution
//! - WCAG contrast calculations for artist theme colors
//! - Common error types

pub mod color;
pub mod config;
pub mod error;
pub mod models;

pub use color::{Rgb, TextPalette, WcagLevel};
pub use error::{Error, Result};
pub use models::{Artist, Attachment, FactIcon, QuickFact, Review, Service};
