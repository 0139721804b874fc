//! Outbound adapters implementing the domain ports over real infrastructure.

pub mod cache;
pub mod persistence;
pub mod security;
