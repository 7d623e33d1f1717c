//! Database models for the Procurement Contract Management Platform
//!
//! The domain models live in the shared crate; this module re-exports them
//! for backend code that prefers crate-local paths.

pub use shared::models::*;
