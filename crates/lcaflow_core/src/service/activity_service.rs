//! Activity construction helper.
//!
//! # Responsibility
//! - Replace any same-named activity, then build a new one with its
//!   technosphere, biosphere and production exchanges.
//!
//! # Invariants
//! - The new activity's code equals its name.
//! - The production exchange is self-referential and its amount equals the
//!   `production amount` attribute.
//! - Steps are not transactional: a failing exchange leaves the partially
//!   built activity in the store.

use crate::model::activity::{Activity, ActivityDraft, ActivityKey};
use crate::model::exchange::ExchangeDraft;
use crate::repo::activity_repo::ActivityRepository;
use crate::repo::RepoResult;
use crate::service::reset_service::reset_activity;
use log::info;

/// Production amount used when the caller does not set one.
pub const DEFAULT_PRODUCT_AMOUNT: f64 = 1.0;

/// Everything needed to build one activity.
#[derive(Debug, Clone, PartialEq)]
pub struct NewActivityRequest {
    pub name: String,
    pub unit: String,
    pub location: String,
    /// Target database; must already be registered.
    pub database: String,
    /// Technosphere inputs as `(input, amount)` pairs.
    pub exchanges: Vec<(ActivityKey, f64)>,
    /// Elementary flows as `(flow, amount)` pairs.
    pub biosphere_exchanges: Vec<(ActivityKey, f64)>,
    pub amount_product: f64,
    /// Reference product name; empty means "same as `name`".
    pub name_product: String,
}

impl NewActivityRequest {
    pub fn new(
        name: impl Into<String>,
        unit: impl Into<String>,
        location: impl Into<String>,
        exchanges: Vec<(ActivityKey, f64)>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            location: location.into(),
            database: database.into(),
            exchanges,
            biosphere_exchanges: Vec::new(),
            amount_product: DEFAULT_PRODUCT_AMOUNT,
            name_product: String::new(),
        }
    }

    pub fn with_biosphere_exchanges(mut self, biosphere_exchanges: Vec<(ActivityKey, f64)>) -> Self {
        self.biosphere_exchanges = biosphere_exchanges;
        self
    }

    pub fn with_amount_product(mut self, amount_product: f64) -> Self {
        self.amount_product = amount_product;
        self
    }

    pub fn with_name_product(mut self, name_product: impl Into<String>) -> Self {
        self.name_product = name_product.into();
        self
    }

    /// Reference product after applying the empty-name default.
    pub fn resolved_name_product(&self) -> &str {
        if self.name_product.is_empty() {
            &self.name
        } else {
            &self.name_product
        }
    }
}

/// Builds a new activity, replacing any activity with the same name.
///
/// # Contract
/// - All activities named `request.name` in `request.database` are deleted first.
/// - The new activity uses `request.name` as its code.
/// - Exchanges are written in request order: technosphere, biosphere, production.
/// - Returns the activity as persisted after the final write.
pub fn create_new_activity<A: ActivityRepository + ?Sized>(
    activities: &A,
    request: &NewActivityRequest,
) -> RepoResult<Activity> {
    reset_activity(activities, &request.database, &request.name)?;

    let draft = ActivityDraft::new(
        request.name.as_str(),
        request.unit.as_str(),
        request.location.as_str(),
    )
    .with_code(request.name.as_str());
    let mut activity = activities.create_activity(&request.database, &draft)?;

    for (input, amount) in &request.exchanges {
        activities.create_exchange(
            &activity.key,
            &ExchangeDraft::technosphere(input.clone(), *amount),
        )?;
    }
    for (input, amount) in &request.biosphere_exchanges {
        activities.create_exchange(
            &activity.key,
            &ExchangeDraft::biosphere(input.clone(), *amount),
        )?;
    }

    activities.create_exchange(
        &activity.key,
        &ExchangeDraft::production(activity.key.clone(), request.amount_product),
    )?;

    activity.reference_product = Some(request.resolved_name_product().to_string());
    activity.production_amount = Some(request.amount_product);
    activities.save_activity(&activity)?;

    info!(
        "event=activity_create module=service status=ok database={} code={} technosphere={} biosphere={}",
        activity.key.database,
        activity.key.code,
        request.exchanges.len(),
        request.biosphere_exchanges.len()
    );
    Ok(activity)
}
