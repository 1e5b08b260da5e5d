//! Store contracts and their SQLite binding.
//!
//! # Responsibility
//! - Define the graph-store contracts consumed by services
//!   (projects, databases, activities with exchanges, methods).
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Repositories report absent records with typed `*NotFound` errors.
//! - Write paths validate model records before SQL mutations.
//! - Database, activity and method handles are scoped to one project.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::activity::{ActivityKey, ValidationError};
use crate::model::method::MethodKey;
use rusqlite::{Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod activity_repo;
pub mod database_repo;
pub mod method_repo;
pub mod project_repo;

/// Project used when callers do not pick one.
pub const DEFAULT_PROJECT: &str = "default";

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for store persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Validation(ValidationError),
    ProjectNotFound(String),
    DatabaseNotFound(String),
    ActivityNotFound(ActivityKey),
    DuplicateActivity(ActivityKey),
    MethodNotFound(MethodKey),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::ProjectNotFound(name) => write!(f, "project not found: {name}"),
            Self::DatabaseNotFound(name) => write!(f, "database not found: {name}"),
            Self::ActivityNotFound(key) => write!(f, "activity not found: {key}"),
            Self::DuplicateActivity(key) => write!(f, "activity already exists: {key}"),
            Self::MethodNotFound(key) => write!(f, "method not registered: {key}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted store data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::InvalidData(value.to_string())
    }
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}

fn find_project_id(conn: &Connection, project: &str) -> RepoResult<Option<i64>> {
    let id = conn
        .query_row(
            "SELECT id FROM projects WHERE name = ?1;",
            [project],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}

/// Returns the project id, creating the project row on first use.
fn ensure_project(conn: &Connection, project: &str) -> RepoResult<i64> {
    conn.execute(
        "INSERT OR IGNORE INTO projects (name) VALUES (?1);",
        [project],
    )?;
    find_project_id(conn, project)?.ok_or_else(|| RepoError::ProjectNotFound(project.to_string()))
}

fn find_database_id(conn: &Connection, project: &str, database: &str) -> RepoResult<Option<i64>> {
    let id = conn
        .query_row(
            "SELECT d.id
             FROM databases d
             JOIN projects p ON p.id = d.project_id
             WHERE p.name = ?1 AND d.name = ?2;",
            [project, database],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}

fn require_database_id(conn: &Connection, project: &str, database: &str) -> RepoResult<i64> {
    find_database_id(conn, project, database)?
        .ok_or_else(|| RepoError::DatabaseNotFound(database.to_string()))
}
