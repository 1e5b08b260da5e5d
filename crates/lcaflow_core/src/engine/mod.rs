//! Calculation engine contract.
//!
//! # Responsibility
//! - Define the seam through which inventory and impact solving is delegated.
//!
//! # Invariants
//! - A session keeps its inventory result across `switch_method` calls;
//!   only characterization is redone per method.
//! - `lcia` is only meaningful after `lci` has succeeded.

use crate::model::impact::FunctionalUnit;
use crate::model::method::MethodKey;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type EngineResult<T> = Result<T, EngineError>;

/// Failure raised by a calculation engine.
#[derive(Debug)]
pub struct EngineError {
    message: String,
    source: Option<Box<dyn Error + Send + Sync + 'static>>,
}

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn Error + Send + Sync + 'static>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "calculation engine error: {}", self.message)
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_deref()
            .map(|err| err as &(dyn Error + 'static))
    }
}

/// Factory for calculation sessions.
pub trait LcaEngine {
    /// Prepares a calculation of `demand` characterized by `method`.
    fn start<'a>(
        &'a self,
        demand: &FunctionalUnit,
        method: &MethodKey,
    ) -> EngineResult<Box<dyn LcaSession + 'a>>;
}

/// One prepared calculation.
pub trait LcaSession {
    /// Solves the life-cycle inventory for the session demand.
    fn lci(&mut self) -> EngineResult<()>;
    /// Applies the active method to the inventory and returns the score.
    fn lcia(&mut self) -> EngineResult<f64>;
    /// Makes `method` the active characterization scheme.
    fn switch_method(&mut self, method: &MethodKey) -> EngineResult<()>;
}
