//! Impact method registry contract and SQLite implementation.
//!
//! # Invariants
//! - Method keys are stored as JSON arrays; lookups compare the exact array.
//! - Registering an existing key replaces its metadata.

use super::{ensure_connection_ready, ensure_project, RepoResult};
use crate::model::method::{MethodKey, MethodMetadata};
use rusqlite::{params, Connection, OptionalExtension};

/// Registry mapping method identifiers to their metadata.
pub trait MethodRepository {
    fn register_method(&self, key: &MethodKey, metadata: &MethodMetadata) -> RepoResult<()>;
    fn get_method(&self, key: &MethodKey) -> RepoResult<Option<MethodMetadata>>;
    /// Lists registrations ordered by key.
    fn list_methods(&self) -> RepoResult<Vec<(MethodKey, MethodMetadata)>>;
}

/// SQLite-backed method registry scoped to one project.
pub struct SqliteMethodRepository<'conn> {
    conn: &'conn Connection,
    project: String,
}

impl<'conn> SqliteMethodRepository<'conn> {
    /// Creates repository from migrated connection, creating `project` on first use.
    pub fn try_new(conn: &'conn Connection, project: impl Into<String>) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        let project = project.into();
        ensure_project(conn, &project)?;
        Ok(Self { conn, project })
    }
}

impl MethodRepository for SqliteMethodRepository<'_> {
    fn register_method(&self, key: &MethodKey, metadata: &MethodMetadata) -> RepoResult<()> {
        let project_id = ensure_project(self.conn, &self.project)?;
        self.conn.execute(
            "INSERT INTO methods (project_id, method_key, unit, description)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (project_id, method_key) DO UPDATE SET
                unit = excluded.unit,
                description = excluded.description;",
            params![
                project_id,
                serde_json::to_string(key)?,
                metadata.unit,
                metadata.description,
            ],
        )?;
        Ok(())
    }

    fn get_method(&self, key: &MethodKey) -> RepoResult<Option<MethodMetadata>> {
        let metadata = self
            .conn
            .query_row(
                "SELECT m.unit, m.description
                 FROM methods m
                 JOIN projects p ON p.id = m.project_id
                 WHERE p.name = ?1 AND m.method_key = ?2;",
                params![self.project, serde_json::to_string(key)?],
                |row| {
                    Ok(MethodMetadata {
                        unit: row.get(0)?,
                        description: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(metadata)
    }

    fn list_methods(&self) -> RepoResult<Vec<(MethodKey, MethodMetadata)>> {
        let mut stmt = self.conn.prepare(
            "SELECT m.method_key, m.unit, m.description
             FROM methods m
             JOIN projects p ON p.id = m.project_id
             WHERE p.name = ?1;",
        )?;
        let mut rows = stmt.query([self.project.as_str()])?;
        let mut methods = Vec::new();
        while let Some(row) = rows.next()? {
            let key_text: String = row.get(0)?;
            let key: MethodKey = serde_json::from_str(&key_text)?;
            methods.push((
                key,
                MethodMetadata {
                    unit: row.get(1)?,
                    description: row.get(2)?,
                },
            ));
        }
        methods.sort_by(|(left, _), (right, _)| left.cmp(right));
        Ok(methods)
    }
}
