//! Multi-method impact scoring.
//!
//! # Responsibility
//! - Score one functional unit against an ordered list of methods.
//!
//! # Invariants
//! - Every method unit is resolved before the engine is touched.
//! - The inventory is solved exactly once per call.
//! - Table rows follow the input method order.

use crate::engine::{EngineError, LcaEngine};
use crate::model::impact::{FunctionalUnit, ImpactRow, ImpactTable};
use crate::model::method::MethodKey;
use crate::repo::method_repo::MethodRepository;
use crate::repo::RepoError;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type ImpactResult<T> = Result<T, ImpactError>;

/// Failure of a scoring call.
#[derive(Debug)]
pub enum ImpactError {
    /// The method list was empty.
    NoMethods,
    /// Method lookup failed, including unregistered methods.
    Repo(RepoError),
    Engine(EngineError),
}

impl Display for ImpactError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoMethods => write!(f, "at least one impact method is required"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Engine(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ImpactError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NoMethods => None,
            Self::Repo(err) => Some(err),
            Self::Engine(err) => Some(err),
        }
    }
}

impl From<RepoError> for ImpactError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<EngineError> for ImpactError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

/// Computes one score per method for `functional_unit`.
///
/// # Contract
/// - Fails with `ImpactError::NoMethods` on an empty method list.
/// - Fails with `RepoError::MethodNotFound` before any calculation when a
///   method is not registered.
/// - Runs `lci` once, then `lcia` per method, switching methods in between.
pub fn lca_results<M, E>(
    methods: &M,
    engine: &E,
    functional_unit: &FunctionalUnit,
    method_list: &[MethodKey],
) -> ImpactResult<ImpactTable>
where
    M: MethodRepository + ?Sized,
    E: LcaEngine + ?Sized,
{
    let Some((first, rest)) = method_list.split_first() else {
        return Err(ImpactError::NoMethods);
    };

    let units = method_list
        .iter()
        .map(|method| {
            methods
                .get_method(method)?
                .map(|metadata| metadata.unit)
                .ok_or_else(|| RepoError::MethodNotFound(method.clone()))
        })
        .collect::<Result<Vec<String>, RepoError>>()?;

    let started_at = Instant::now();
    let mut session = engine.start(functional_unit, first)?;
    session.lci()?;

    let mut scores = Vec::with_capacity(method_list.len());
    scores.push(session.lcia()?);
    for method in rest {
        session.switch_method(method)?;
        scores.push(session.lcia()?);
    }

    let rows = scores
        .into_iter()
        .zip(units)
        .zip(method_list)
        .map(|((score, unit), method)| ImpactRow {
            score,
            unit,
            method: method.clone(),
        })
        .collect();

    info!(
        "event=lca_results module=service status=ok methods={} demand_entries={} duration_ms={}",
        method_list.len(),
        functional_unit.len(),
        started_at.elapsed().as_millis()
    );
    Ok(ImpactTable::from_rows(rows))
}
