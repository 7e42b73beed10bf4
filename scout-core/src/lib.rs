//! Scout Core - Shared data model and support utilities
//!
//! This crate defines the error taxonomy, the persisted job data model, and
//! the async helpers (timeouts, retries) used across the Scout system.

pub mod async_utils;
pub mod error;
pub mod types;

pub use async_utils::*;
pub use error::*;
pub use types::*;
