//! Project registry contract and SQLite implementation.
//!
//! # Invariants
//! - Project names are unique per store.
//! - Deleting a project cascades to its databases, activities, exchanges
//!   and method registrations.

use super::{ensure_connection_ready, ensure_project, find_project_id, RepoError, RepoResult};
use rusqlite::Connection;

/// Registry of isolated project namespaces.
pub trait ProjectRepository {
    /// Creates the project when missing. Existing projects are left untouched.
    fn create_project(&self, name: &str) -> RepoResult<()>;
    fn project_exists(&self, name: &str) -> RepoResult<bool>;
    /// Lists project names in alphabetical order.
    fn list_projects(&self) -> RepoResult<Vec<String>>;
    /// Deletes one project and everything nested under it.
    ///
    /// Returns `RepoError::ProjectNotFound` when no such project exists.
    fn delete_project(&self, name: &str) -> RepoResult<()>;
}

/// SQLite-backed project registry.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn create_project(&self, name: &str) -> RepoResult<()> {
        ensure_project(self.conn, name)?;
        Ok(())
    }

    fn project_exists(&self, name: &str) -> RepoResult<bool> {
        Ok(find_project_id(self.conn, name)?.is_some())
    }

    fn list_projects(&self) -> RepoResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM projects ORDER BY name ASC;")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(names)
    }

    fn delete_project(&self, name: &str) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM projects WHERE name = ?1;", [name])?;
        if changed == 0 {
            return Err(RepoError::ProjectNotFound(name.to_string()));
        }
        Ok(())
    }
}
