//! Activity and exchange contracts with SQLite implementation.
//!
//! # Responsibility
//! - Create, read, update and delete process nodes inside one project.
//! - Attach typed exchanges to their owning activity.
//!
//! # Invariants
//! - Activity listings are in creation order.
//! - Exchange inputs must exist when the exchange is written; later deletion
//!   of an input leaves the referencing exchange in place.
//! - Deleting an activity removes the exchanges it owns.

use super::{ensure_connection_ready, ensure_project, require_database_id, RepoError, RepoResult};
use crate::model::activity::{Activity, ActivityDraft, ActivityKey};
use crate::model::exchange::{Exchange, ExchangeDraft, ExchangeType};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

const ACTIVITY_SELECT_SQL: &str = "SELECT
    d.name AS database_name,
    a.code,
    a.name,
    a.unit,
    a.location,
    a.reference_product,
    a.production_amount,
    a.fields
FROM activities a
JOIN databases d ON d.id = a.database_id
JOIN projects p ON p.id = d.project_id";

/// Repository interface for process nodes and their exchanges.
pub trait ActivityRepository {
    /// Lists every activity of `database`.
    fn list_activities(&self, database: &str) -> RepoResult<Vec<Activity>>;
    fn get_activity(&self, key: &ActivityKey) -> RepoResult<Option<Activity>>;
    /// Persists a new activity.
    ///
    /// Uses `draft.code` when given, otherwise a generated identifier.
    fn create_activity(&self, database: &str, draft: &ActivityDraft) -> RepoResult<Activity>;
    /// Writes every attribute of an existing activity.
    fn save_activity(&self, activity: &Activity) -> RepoResult<()>;
    fn delete_activity(&self, key: &ActivityKey) -> RepoResult<()>;
    /// Persists a new exchange owned by `output`.
    fn create_exchange(&self, output: &ActivityKey, draft: &ExchangeDraft)
        -> RepoResult<Exchange>;
    /// Lists exchanges owned by `output` in creation order.
    fn list_exchanges(&self, output: &ActivityKey) -> RepoResult<Vec<Exchange>>;
}

/// SQLite-backed activity repository scoped to one project.
pub struct SqliteActivityRepository<'conn> {
    conn: &'conn Connection,
    project: String,
}

impl<'conn> SqliteActivityRepository<'conn> {
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

    fn find_activity_id(&self, key: &ActivityKey) -> RepoResult<Option<i64>> {
        let id = self
            .conn
            .query_row(
                "SELECT a.id
                 FROM activities a
                 JOIN databases d ON d.id = a.database_id
                 JOIN projects p ON p.id = d.project_id
                 WHERE p.name = ?1 AND d.name = ?2 AND a.code = ?3;",
                params![self.project, key.database, key.code],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    fn require_activity_id(&self, key: &ActivityKey) -> RepoResult<i64> {
        self.find_activity_id(key)?
            .ok_or_else(|| RepoError::ActivityNotFound(key.clone()))
    }
}

impl ActivityRepository for SqliteActivityRepository<'_> {
    fn list_activities(&self, database: &str) -> RepoResult<Vec<Activity>> {
        require_database_id(self.conn, &self.project, database)?;

        let mut stmt = self.conn.prepare(&format!(
            "{ACTIVITY_SELECT_SQL}
             WHERE p.name = ?1 AND d.name = ?2
             ORDER BY a.id ASC;"
        ))?;
        let mut rows = stmt.query(params![self.project, database])?;
        let mut activities = Vec::new();
        while let Some(row) = rows.next()? {
            activities.push(parse_activity_row(row)?);
        }
        Ok(activities)
    }

    fn get_activity(&self, key: &ActivityKey) -> RepoResult<Option<Activity>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ACTIVITY_SELECT_SQL}
             WHERE p.name = ?1 AND d.name = ?2 AND a.code = ?3;"
        ))?;
        let mut rows = stmt.query(params![self.project, key.database, key.code])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_activity_row(row)?));
        }
        Ok(None)
    }

    fn create_activity(&self, database: &str, draft: &ActivityDraft) -> RepoResult<Activity> {
        let code = draft
            .code
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().simple().to_string());
        let activity = draft.clone().into_activity(database, code);
        activity.validate()?;

        let database_id = require_database_id(self.conn, &self.project, database)?;
        if self.find_activity_id(&activity.key)?.is_some() {
            return Err(RepoError::DuplicateActivity(activity.key));
        }

        self.conn.execute(
            "INSERT INTO activities (
                database_id,
                code,
                name,
                unit,
                location,
                reference_product,
                production_amount,
                fields
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                database_id,
                activity.key.code,
                activity.name,
                activity.unit,
                activity.location,
                activity.reference_product,
                activity.production_amount,
                serde_json::to_string(&activity.fields)?,
            ],
        )?;

        Ok(activity)
    }

    fn save_activity(&self, activity: &Activity) -> RepoResult<()> {
        activity.validate()?;
        let activity_id = self.require_activity_id(&activity.key)?;

        self.conn.execute(
            "UPDATE activities
             SET
                name = ?1,
                unit = ?2,
                location = ?3,
                reference_product = ?4,
                production_amount = ?5,
                fields = ?6,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?7;",
            params![
                activity.name,
                activity.unit,
                activity.location,
                activity.reference_product,
                activity.production_amount,
                serde_json::to_string(&activity.fields)?,
                activity_id,
            ],
        )?;
        Ok(())
    }

    fn delete_activity(&self, key: &ActivityKey) -> RepoResult<()> {
        let activity_id = self.require_activity_id(key)?;
        self.conn
            .execute("DELETE FROM activities WHERE id = ?1;", [activity_id])?;
        Ok(())
    }

    fn create_exchange(
        &self,
        output: &ActivityKey,
        draft: &ExchangeDraft,
    ) -> RepoResult<Exchange> {
        draft.validate()?;
        let output_id = self.require_activity_id(output)?;
        self.require_activity_id(&draft.input)?;

        self.conn.execute(
            "INSERT INTO exchanges (
                output_id,
                input_database,
                input_code,
                amount,
                type
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                output_id,
                draft.input.database,
                draft.input.code,
                draft.amount,
                draft.kind.as_str(),
            ],
        )?;

        Ok(Exchange {
            id: self.conn.last_insert_rowid(),
            input: draft.input.clone(),
            output: output.clone(),
            amount: draft.amount,
            kind: draft.kind,
        })
    }

    fn list_exchanges(&self, output: &ActivityKey) -> RepoResult<Vec<Exchange>> {
        let output_id = self.require_activity_id(output)?;

        let mut stmt = self.conn.prepare(
            "SELECT id, input_database, input_code, amount, type
             FROM exchanges
             WHERE output_id = ?1
             ORDER BY id ASC;",
        )?;
        let mut rows = stmt.query([output_id])?;
        let mut exchanges = Vec::new();
        while let Some(row) = rows.next()? {
            exchanges.push(parse_exchange_row(row, output)?);
        }
        Ok(exchanges)
    }
}

fn parse_activity_row(row: &Row<'_>) -> RepoResult<Activity> {
    let database: String = row.get("database_name")?;
    let code: String = row.get("code")?;

    let fields_text: String = row.get("fields")?;
    let fields: BTreeMap<String, Value> = serde_json::from_str(&fields_text).map_err(|err| {
        RepoError::InvalidData(format!(
            "invalid fields json for activity ({database}, {code}): {err}"
        ))
    })?;

    let activity = Activity {
        key: ActivityKey::new(database, code),
        name: row.get("name")?,
        unit: row.get("unit")?,
        location: row.get("location")?,
        reference_product: row.get("reference_product")?,
        production_amount: row.get("production_amount")?,
        fields,
    };
    activity.validate()?;
    Ok(activity)
}

fn parse_exchange_row(row: &Row<'_>, output: &ActivityKey) -> RepoResult<Exchange> {
    let type_text: String = row.get("type")?;
    let kind = ExchangeType::parse(&type_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid exchange type `{type_text}` in exchanges.type"))
    })?;

    Ok(Exchange {
        id: row.get("id")?,
        input: ActivityKey::new(
            row.get::<_, String>("input_database")?,
            row.get::<_, String>("input_code")?,
        ),
        output: output.clone(),
        amount: row.get("amount")?,
        kind,
    })
}
