//! Impact assessment method identifiers.
//!
//! # Responsibility
//! - Represent opaque method identifiers and their registered metadata.
//!
//! # Invariants
//! - A `MethodKey` is an ordered tuple of labels; order is significant.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Opaque identifier of a characterization scheme,
/// e.g. `("IPCC 2013", "climate change", "GWP 100a")`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MethodKey(Vec<String>);

impl MethodKey {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }
}

impl Display for MethodKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({})", self.0.join(", "))
    }
}

/// Metadata the store keeps for each registered method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodMetadata {
    pub unit: String,
    pub description: Option<String>,
}

impl MethodMetadata {
    pub fn new(unit: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
