//! Domain model for the LCA process graph.
//!
//! # Responsibility
//! - Define activity, exchange and method records shared by repositories
//!   and services.
//! - Define the tabular result shape produced by impact scoring.
//!
//! # Invariants
//! - Every activity is identified by an `ActivityKey` (database + code).
//! - Exchanges always belong to exactly one output activity.

pub mod activity;
pub mod exchange;
pub mod impact;
pub mod method;
