//! Activity domain model.
//!
//! # Responsibility
//! - Define the process node record and its stable key.
//! - Provide write-time validation shared by every store binding.
//!
//! # Invariants
//! - `code` is unique inside one database; `(database, code)` is global.
//! - `name` is display text and is not required to be unique.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Field name used by LCA tooling for the reference product.
pub const REFERENCE_PRODUCT_FIELD: &str = "reference product";
/// Field name used by LCA tooling for the production amount.
pub const PRODUCTION_AMOUNT_FIELD: &str = "production amount";

/// Stable identity of an activity: owning database plus in-database code.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActivityKey {
    pub database: String,
    pub code: String,
}

impl ActivityKey {
    pub fn new(database: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            code: code.into(),
        }
    }
}

impl Display for ActivityKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.database, self.code)
    }
}

/// Write-time validation failures for activities and exchanges.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmptyName,
    EmptyCode,
    EmptyDatabase,
    NonFiniteAmount { field: &'static str, value: f64 },
    ReservedField(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "activity name cannot be empty"),
            Self::EmptyCode => write!(f, "activity code cannot be empty"),
            Self::EmptyDatabase => write!(f, "database name cannot be empty"),
            Self::NonFiniteAmount { field, value } => {
                write!(f, "`{field}` must be a finite number, got {value}")
            }
            Self::ReservedField(key) => {
                write!(f, "`{key}` is a typed activity attribute, not a free-form field")
            }
        }
    }
}

impl Error for ValidationError {}

/// Persisted process node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub key: ActivityKey,
    pub name: String,
    pub unit: String,
    pub location: String,
    /// Name of the product this activity delivers, if declared.
    pub reference_product: Option<String>,
    /// Output amount matching the production exchange, if declared.
    pub production_amount: Option<f64>,
    /// Free-form attributes kept alongside the typed ones.
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
}

impl Activity {
    pub fn database(&self) -> &str {
        &self.key.database
    }

    pub fn code(&self) -> &str {
        &self.key.code
    }

    /// Reads a free-form field.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Sets a free-form field, returning the previous value.
    pub fn set_field(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(key.into(), value.into())
    }

    /// Checks the record before it is written.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.key.database.trim().is_empty() {
            return Err(ValidationError::EmptyDatabase);
        }
        if self.key.code.trim().is_empty() {
            return Err(ValidationError::EmptyCode);
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if let Some(amount) = self.production_amount {
            if !amount.is_finite() {
                return Err(ValidationError::NonFiniteAmount {
                    field: PRODUCTION_AMOUNT_FIELD,
                    value: amount,
                });
            }
        }
        // Typed attributes must not be shadowed by free-form copies.
        for reserved in [REFERENCE_PRODUCT_FIELD, PRODUCTION_AMOUNT_FIELD] {
            if self.fields.contains_key(reserved) {
                return Err(ValidationError::ReservedField(reserved.to_string()));
            }
        }
        Ok(())
    }
}

/// Input for creating an activity record.
///
/// When `code` is `None` the store assigns a generated identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityDraft {
    pub name: String,
    pub code: Option<String>,
    pub unit: String,
    pub location: String,
}

impl ActivityDraft {
    pub fn new(
        name: impl Into<String>,
        unit: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            code: None,
            unit: unit.into(),
            location: location.into(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Materializes the draft into a record under `database`.
    pub fn into_activity(self, database: impl Into<String>, code: String) -> Activity {
        Activity {
            key: ActivityKey::new(database, code),
            name: self.name,
            unit: self.unit,
            location: self.location,
            reference_product: None,
            production_amount: None,
            fields: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ActivityDraft, ActivityKey, ValidationError, REFERENCE_PRODUCT_FIELD};

    fn steel() -> super::Activity {
        ActivityDraft::new("steel production", "kilogram", "RER")
            .into_activity("foreground", "steel production".to_string())
    }

    #[test]
    fn key_display_shows_database_and_code() {
        let key = ActivityKey::new("biosphere3", "co2");
        assert_eq!(key.to_string(), "(biosphere3, co2)");
    }

    #[test]
    fn draft_materializes_without_product_metadata() {
        let activity = steel();
        assert_eq!(activity.database(), "foreground");
        assert_eq!(activity.code(), "steel production");
        assert!(activity.reference_product.is_none());
        assert!(activity.production_amount.is_none());
        assert!(activity.validate().is_ok());
    }

    #[test]
    fn validate_rejects_blank_name_and_non_finite_amount() {
        let mut activity = steel();
        activity.name = "  ".to_string();
        assert_eq!(activity.validate(), Err(ValidationError::EmptyName));

        let mut activity = steel();
        activity.production_amount = Some(f64::NAN);
        assert!(matches!(
            activity.validate(),
            Err(ValidationError::NonFiniteAmount { .. })
        ));
    }

    #[test]
    fn validate_rejects_reserved_free_form_fields() {
        let mut activity = steel();
        activity.set_field("comment", "from supplier sheet");
        assert!(activity.validate().is_ok());

        activity.set_field(REFERENCE_PRODUCT_FIELD, "steel");
        assert_eq!(
            activity.validate(),
            Err(ValidationError::ReservedField(
                REFERENCE_PRODUCT_FIELD.to_string()
            ))
        );
    }
}
