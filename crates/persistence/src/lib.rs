//! Persistence layer for the carpool backend.
//!
//! This crate contains:
//! - Database connection management and migrations
//! - Entity definitions (database row mappings)
//! - Repository implementations
//! - [`PgGateway`], the transactional implementation of the domain's storage contract

pub mod db;
pub mod entities;
pub mod gateway;
pub mod metrics;
pub mod repositories;

pub use gateway::PgGateway;
