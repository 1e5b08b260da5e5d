use lcaflow_core::db::open_db_in_memory;
use lcaflow_core::{
    reset_activity, reset_database, reset_project, ActivityDraft, ActivityKey,
    ActivityRepository, DatabaseRepository, ExchangeDraft, ProjectRepository, RepoError,
    ResetOutcome, SqliteActivityRepository, SqliteDatabaseRepository, SqliteProjectRepository,
};
use rusqlite::Connection;

const PROJECT: &str = "reset tests";

fn register(conn: &Connection, database: &str) {
    SqliteDatabaseRepository::try_new(conn, PROJECT)
        .unwrap()
        .register_database(database)
        .unwrap();
}

fn names_in(activities: &SqliteActivityRepository<'_>, database: &str) -> Vec<String> {
    activities
        .list_activities(database)
        .unwrap()
        .into_iter()
        .map(|activity| activity.name)
        .collect()
}

#[test]
fn reset_project_twice_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    register(&conn, "fg");
    let projects = SqliteProjectRepository::try_new(&conn).unwrap();

    assert_eq!(reset_project(&projects, PROJECT).unwrap(), ResetOutcome::Deleted);
    assert_eq!(reset_project(&projects, PROJECT).unwrap(), ResetOutcome::Absent);
    assert!(!projects.project_exists(PROJECT).unwrap());
}

#[test]
fn reset_project_cascades_to_nested_databases() {
    let conn = open_db_in_memory().unwrap();
    register(&conn, "fg");
    let projects = SqliteProjectRepository::try_new(&conn).unwrap();

    reset_project(&projects, PROJECT).unwrap();

    let databases: i64 = conn
        .query_row("SELECT COUNT(*) FROM databases;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(databases, 0);
}

#[test]
fn reset_project_leaves_other_projects_alone() {
    let conn = open_db_in_memory().unwrap();
    register(&conn, "fg");
    let projects = SqliteProjectRepository::try_new(&conn).unwrap();
    projects.create_project("keep").unwrap();

    reset_project(&projects, PROJECT).unwrap();

    assert_eq!(projects.list_projects().unwrap(), vec!["keep"]);
}

#[test]
fn reset_database_twice_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    register(&conn, "fg");
    let databases = SqliteDatabaseRepository::try_new(&conn, PROJECT).unwrap();

    assert_eq!(reset_database(&databases, "fg").unwrap(), ResetOutcome::Deleted);
    assert_eq!(reset_database(&databases, "fg").unwrap(), ResetOutcome::Absent);
    assert!(!databases.database_exists("fg").unwrap());
}

#[test]
fn reset_database_removes_its_activities() {
    let conn = open_db_in_memory().unwrap();
    register(&conn, "fg");
    let activities = SqliteActivityRepository::try_new(&conn, PROJECT).unwrap();
    let steel = activities
        .create_activity("fg", &ActivityDraft::new("steel", "kilogram", "RER"))
        .unwrap();
    let databases = SqliteDatabaseRepository::try_new(&conn, PROJECT).unwrap();

    reset_database(&databases, "fg").unwrap();

    assert!(activities.get_activity(&steel.key).unwrap().is_none());
    register(&conn, "fg");
    assert!(names_in(&activities, "fg").is_empty());
}

#[test]
fn reset_activity_removes_every_same_named_activity() {
    let conn = open_db_in_memory().unwrap();
    register(&conn, "fg");
    let activities = SqliteActivityRepository::try_new(&conn, PROJECT).unwrap();
    for code in ["x-1", "x-2"] {
        activities
            .create_activity("fg", &ActivityDraft::new("X", "unit", "GLO").with_code(code))
            .unwrap();
    }
    activities
        .create_activity("fg", &ActivityDraft::new("Y", "unit", "GLO").with_code("y"))
        .unwrap();

    assert_eq!(reset_activity(&activities, "fg", "X").unwrap(), 2);
    assert_eq!(names_in(&activities, "fg"), vec!["Y"]);
    assert_eq!(reset_activity(&activities, "fg", "X").unwrap(), 0);
}

#[test]
fn reset_activity_only_touches_the_given_database() {
    let conn = open_db_in_memory().unwrap();
    register(&conn, "fg");
    register(&conn, "bg");
    let activities = SqliteActivityRepository::try_new(&conn, PROJECT).unwrap();
    activities
        .create_activity("fg", &ActivityDraft::new("X", "unit", "GLO").with_code("x"))
        .unwrap();
    activities
        .create_activity("bg", &ActivityDraft::new("X", "unit", "GLO").with_code("x"))
        .unwrap();

    reset_activity(&activities, "fg", "X").unwrap();

    assert!(names_in(&activities, "fg").is_empty());
    assert_eq!(names_in(&activities, "bg"), vec!["X"]);
}

#[test]
fn reset_activity_leaves_referencing_exchanges_dangling() {
    let conn = open_db_in_memory().unwrap();
    register(&conn, "fg");
    let activities = SqliteActivityRepository::try_new(&conn, PROJECT).unwrap();
    let ore = activities
        .create_activity("fg", &ActivityDraft::new("iron ore", "kilogram", "GLO").with_code("ore"))
        .unwrap();
    let steel = activities
        .create_activity("fg", &ActivityDraft::new("steel", "kilogram", "RER").with_code("steel"))
        .unwrap();
    activities
        .create_exchange(&steel.key, &ExchangeDraft::technosphere(ore.key.clone(), 1.4))
        .unwrap();

    reset_activity(&activities, "fg", "iron ore").unwrap();

    let exchanges = activities.list_exchanges(&steel.key).unwrap();
    assert_eq!(exchanges.len(), 1);
    assert_eq!(exchanges[0].input, ActivityKey::new("fg", "ore"));
    assert!(activities.get_activity(&exchanges[0].input).unwrap().is_none());
}

#[test]
fn reset_activity_on_unknown_database_reports_store_error() {
    let conn = open_db_in_memory().unwrap();
    let activities = SqliteActivityRepository::try_new(&conn, PROJECT).unwrap();

    let err = reset_activity(&activities, "nowhere", "X").unwrap_err();
    assert!(matches!(err, RepoError::DatabaseNotFound(_)));
}
