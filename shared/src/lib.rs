//! Shared types and models for the Procurement Contract Management Platform
//!
//! This crate contains the domain types, status state machines, and pure
//! ledger/validation rules shared between the backend and its test suites.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
