//! Database registry contract and SQLite implementation.
//!
//! # Invariants
//! - Database names are unique within one project.
//! - Deleting a database cascades to its activities and their owned exchanges.

use super::{
    ensure_connection_ready, ensure_project, find_database_id, RepoError, RepoResult,
};
use rusqlite::{params, Connection};

/// Registry of activity collections inside one project.
pub trait DatabaseRepository {
    /// Registers the database when missing. Registering twice is a no-op.
    fn register_database(&self, name: &str) -> RepoResult<()>;
    fn database_exists(&self, name: &str) -> RepoResult<bool>;
    /// Lists database names in alphabetical order.
    fn list_databases(&self) -> RepoResult<Vec<String>>;
    /// Removes one database from the registry.
    ///
    /// Returns `RepoError::DatabaseNotFound` when it is not registered.
    fn delete_database(&self, name: &str) -> RepoResult<()>;
}

/// SQLite-backed database registry scoped to one project.
pub struct SqliteDatabaseRepository<'conn> {
    conn: &'conn Connection,
    project: String,
}

impl<'conn> SqliteDatabaseRepository<'conn> {
    /// Creates repository from migrated connection, creating `project` on first use.
    pub fn try_new(conn: &'conn Connection, project: impl Into<String>) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        let project = project.into();
        ensure_project(conn, &project)?;
        Ok(Self { conn, project })
    }

    pub fn project(&self) -> &str {
        &self.project
    }
}

impl DatabaseRepository for SqliteDatabaseRepository<'_> {
    fn register_database(&self, name: &str) -> RepoResult<()> {
        let project_id = ensure_project(self.conn, &self.project)?;
        self.conn.execute(
            "INSERT OR IGNORE INTO databases (project_id, name) VALUES (?1, ?2);",
            params![project_id, name],
        )?;
        Ok(())
    }

    fn database_exists(&self, name: &str) -> RepoResult<bool> {
        Ok(find_database_id(self.conn, &self.project, name)?.is_some())
    }

    fn list_databases(&self) -> RepoResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT d.name
             FROM databases d
             JOIN projects p ON p.id = d.project_id
             WHERE p.name = ?1
             ORDER BY d.name ASC;",
        )?;
        let names = stmt
            .query_map([self.project.as_str()], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(names)
    }

    fn delete_database(&self, name: &str) -> RepoResult<()> {
        let Some(database_id) = find_database_id(self.conn, &self.project, name)? else {
            return Err(RepoError::DatabaseNotFound(name.to_string()));
        };
        self.conn
            .execute("DELETE FROM databases WHERE id = ?1;", [database_id])?;
        Ok(())
    }
}
