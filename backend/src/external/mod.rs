//! Clients for external collaborators

pub mod storage;
