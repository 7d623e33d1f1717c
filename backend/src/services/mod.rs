//! Business logic services for the Procurement Contract Management Platform

pub mod contract;
pub mod currency;
pub mod file;
pub mod inventory;
pub mod party;
pub mod payment;
pub mod product;
pub mod project;

pub use contract::ContractService;
pub use currency::CurrencyService;
pub use file::FileService;
pub use inventory::InventoryService;
pub use party::PartyService;
pub use payment::PaymentService;
pub use product::ProductService;
pub use project::ProjectService;
