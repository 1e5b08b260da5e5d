//! Use-case helpers over the graph store and calculation engine.
//!
//! # Responsibility
//! - Reset project, database and activity state.
//! - Build activities with their exchanges.
//! - Score a functional unit against several impact methods.
//!
//! # Invariants
//! - Helpers receive store and engine handles explicitly; none keeps state.
//! - Store errors surface unchanged to the caller.

pub mod activity_service;
pub mod impact_service;
pub mod reset_service;
