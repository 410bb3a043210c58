//! Shared utilities for the carpool backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Password digests for event protection
//! - Event code generation and extraction from shareable links
//! - Common validation logic

pub mod crypto;
pub mod event_code;
pub mod validation;
