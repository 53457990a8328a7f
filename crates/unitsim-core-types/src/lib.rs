//! Core types shared across the UnitSim facilities
//!
//! This crate provides foundational types used by the error, logging and
//! engine crates:
//!
//! - **Correlation types**: SimId identifying one engine instance
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::SimId;
