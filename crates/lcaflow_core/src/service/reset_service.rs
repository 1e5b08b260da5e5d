//! Idempotent reset helpers.
//!
//! # Invariants
//! - Every reset checks for existence before deleting, so repeated calls
//!   succeed and report `ResetOutcome::Absent`.
//! - Activity reset removes all same-named activities, not only the first.

use crate::model::activity::Activity;
use crate::repo::activity_repo::ActivityRepository;
use crate::repo::database_repo::DatabaseRepository;
use crate::repo::project_repo::ProjectRepository;
use crate::repo::RepoResult;
use log::info;

/// Result of a reset call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetOutcome {
    /// The target existed and was deleted.
    Deleted,
    /// Nothing matched; the store was left untouched.
    Absent,
}

/// Deletes project `name` and everything under it, if present.
pub fn reset_project<P: ProjectRepository + ?Sized>(
    projects: &P,
    name: &str,
) -> RepoResult<ResetOutcome> {
    let outcome = if projects.project_exists(name)? {
        projects.delete_project(name)?;
        ResetOutcome::Deleted
    } else {
        ResetOutcome::Absent
    };
    info!("event=project_reset module=service status=ok project={name} outcome={outcome:?}");
    Ok(outcome)
}

/// Removes database `name` from the registry, if registered.
pub fn reset_database<D: DatabaseRepository + ?Sized>(
    databases: &D,
    name: &str,
) -> RepoResult<ResetOutcome> {
    let outcome = if databases.database_exists(name)? {
        databases.delete_database(name)?;
        ResetOutcome::Deleted
    } else {
        ResetOutcome::Absent
    };
    info!("event=database_reset module=service status=ok database={name} outcome={outcome:?}");
    Ok(outcome)
}

/// Deletes every activity of `database` whose name equals `name`.
///
/// Returns how many activities were deleted. Exchanges in other activities
/// that used a deleted activity as input are not touched.
pub fn reset_activity<A: ActivityRepository + ?Sized>(
    activities: &A,
    database: &str,
    name: &str,
) -> RepoResult<usize> {
    let matches: Vec<Activity> = activities
        .list_activities(database)?
        .into_iter()
        .filter(|activity| activity.name == name)
        .collect();

    for activity in &matches {
        activities.delete_activity(&activity.key)?;
    }

    info!(
        "event=activity_reset module=service status=ok database={database} deleted={}",
        matches.len()
    );
    Ok(matches.len())
}
