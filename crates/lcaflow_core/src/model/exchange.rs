//! Exchange domain model.
//!
//! # Responsibility
//! - Define typed, amount-weighted edges into an activity.
//!
//! # Invariants
//! - `output` is the owning activity.
//! - A production exchange has `input == output`.
//! - `amount` is always finite.

use crate::model::activity::{ActivityKey, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Row id assigned by the store.
pub type ExchangeId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeType {
    /// Consumption of another process's output.
    Technosphere,
    /// Elementary flow to or from the environment.
    Biosphere,
    /// Self-referential output declaration.
    Production,
}

impl ExchangeType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Technosphere => "technosphere",
            Self::Biosphere => "biosphere",
            Self::Production => "production",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "technosphere" => Some(Self::Technosphere),
            "biosphere" => Some(Self::Biosphere),
            "production" => Some(Self::Production),
            _ => None,
        }
    }
}

impl Display for ExchangeType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exchange {
    pub id: ExchangeId,
    pub input: ActivityKey,
    pub output: ActivityKey,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: ExchangeType,
}

/// Input for creating an exchange on an output activity.
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeDraft {
    pub input: ActivityKey,
    pub amount: f64,
    pub kind: ExchangeType,
}

impl ExchangeDraft {
    pub fn technosphere(input: ActivityKey, amount: f64) -> Self {
        Self {
            input,
            amount,
            kind: ExchangeType::Technosphere,
        }
    }

    pub fn biosphere(input: ActivityKey, amount: f64) -> Self {
        Self {
            input,
            amount,
            kind: ExchangeType::Biosphere,
        }
    }

    pub fn production(input: ActivityKey, amount: f64) -> Self {
        Self {
            input,
            amount,
            kind: ExchangeType::Production,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.amount.is_finite() {
            return Err(ValidationError::NonFiniteAmount {
                field: "amount",
                value: self.amount,
            });
        }
        if self.input.code.trim().is_empty() {
            return Err(ValidationError::EmptyCode);
        }
        Ok(())
    }
}
