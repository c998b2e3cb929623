//! Core types shared across equivex facilities
//!
//! This crate provides foundational types used by both the error and the
//! logging facilities of the equivalency engine:
//!
//! - **Correlation types**: SessionId (one per top-level comparison)
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::SessionId;
