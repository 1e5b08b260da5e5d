//! Convenience layer over an LCA graph store and calculation engine.
//!
//! Resets project/database/activity state, builds activities with their
//! exchanges, and scores a functional unit against several impact methods.

pub mod db;
pub mod engine;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use engine::{EngineError, EngineResult, LcaEngine, LcaSession};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::activity::{Activity, ActivityDraft, ActivityKey, ValidationError};
pub use model::exchange::{Exchange, ExchangeDraft, ExchangeId, ExchangeType};
pub use model::impact::{FunctionalUnit, ImpactRow, ImpactTable};
pub use model::method::{MethodKey, MethodMetadata};
pub use repo::activity_repo::{ActivityRepository, SqliteActivityRepository};
pub use repo::database_repo::{DatabaseRepository, SqliteDatabaseRepository};
pub use repo::method_repo::{MethodRepository, SqliteMethodRepository};
pub use repo::project_repo::{ProjectRepository, SqliteProjectRepository};
pub use repo::{RepoError, RepoResult, DEFAULT_PROJECT};
pub use service::activity_service::{
    create_new_activity, NewActivityRequest, DEFAULT_PRODUCT_AMOUNT,
};
pub use service::impact_service::{lca_results, ImpactError, ImpactResult};
pub use service::reset_service::{reset_activity, reset_database, reset_project, ResetOutcome};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
