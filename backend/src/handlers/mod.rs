//! HTTP handlers for the Procurement Contract Management Platform

pub mod contract;
pub mod currency;
pub mod file;
pub mod health;
pub mod inventory;
pub mod party;
pub mod payment;
pub mod product;
pub mod project;

pub use contract::*;
pub use currency::*;
pub use file::*;
pub use health::*;
pub use inventory::*;
pub use party::*;
pub use payment::*;
pub use product::*;
pub use project::*;
