use lcaflow_core::db::open_db_in_memory;
use lcaflow_core::{
    lca_results, ActivityKey, EngineError, EngineResult, FunctionalUnit, ImpactError, LcaEngine,
    LcaSession, MethodKey, MethodMetadata, MethodRepository, RepoError, SqliteMethodRepository,
    DEFAULT_PROJECT,
};
use std::cell::RefCell;
use std::collections::HashMap;

/// Engine double: score = total demand * method factor.
struct RecordingEngine {
    factors: HashMap<MethodKey, f64>,
    calls: RefCell<Vec<String>>,
}

impl RecordingEngine {
    fn new(factors: &[(&MethodKey, f64)]) -> Self {
        Self {
            factors: factors
                .iter()
                .map(|(key, factor)| ((*key).clone(), *factor))
                .collect(),
            calls: RefCell::new(Vec::new()),
        }
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn count(&self, prefix: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }
}

struct RecordingSession<'a> {
    engine: &'a RecordingEngine,
    demand_total: f64,
    method: MethodKey,
    inventory: Option<f64>,
}

impl LcaEngine for RecordingEngine {
    fn start<'a>(
        &'a self,
        demand: &FunctionalUnit,
        method: &MethodKey,
    ) -> EngineResult<Box<dyn LcaSession + 'a>> {
        self.record(format!("start {method}"));
        if demand.is_empty() {
            return Err(EngineError::new("demand vector is empty"));
        }
        Ok(Box::new(RecordingSession {
            engine: self,
            demand_total: demand.iter().map(|(_, amount)| amount).sum(),
            method: method.clone(),
            inventory: None,
        }))
    }
}

impl LcaSession for RecordingSession<'_> {
    fn lci(&mut self) -> EngineResult<()> {
        self.engine.record("lci".to_string());
        self.inventory = Some(self.demand_total);
        Ok(())
    }

    fn lcia(&mut self) -> EngineResult<f64> {
        self.engine.record(format!("lcia {}", self.method));
        let inventory = self
            .inventory
            .ok_or_else(|| EngineError::new("inventory not solved"))?;
        let factor = self
            .engine
            .factors
            .get(&self.method)
            .ok_or_else(|| EngineError::new(format!("no factors for {}", self.method)))?;
        Ok(inventory * factor)
    }

    fn switch_method(&mut self, method: &MethodKey) -> EngineResult<()> {
        self.engine.record(format!("switch {method}"));
        self.method = method.clone();
        Ok(())
    }
}

fn method(label: &str) -> MethodKey {
    MethodKey::new(["test", label])
}

fn steel_demand() -> FunctionalUnit {
    FunctionalUnit::single(ActivityKey::new("fg", "steel"), 2.0)
}

fn register(methods: &SqliteMethodRepository<'_>, key: &MethodKey, unit: &str) {
    methods
        .register_method(key, &MethodMetadata::new(unit))
        .unwrap();
}

#[test]
fn three_methods_yield_three_rows_with_one_inventory_solve() {
    let conn = open_db_in_memory().unwrap();
    let methods = SqliteMethodRepository::try_new(&conn, DEFAULT_PROJECT).unwrap();
    let (m1, m2, m3) = (method("gwp"), method("acidification"), method("water"));
    register(&methods, &m1, "kg CO2-Eq");
    register(&methods, &m2, "mol H+-Eq");
    register(&methods, &m3, "m3");
    let engine = RecordingEngine::new(&[(&m1, 1.5), (&m2, 0.01), (&m3, 3.0)]);

    let table = lca_results(
        &methods,
        &engine,
        &steel_demand(),
        &[m1.clone(), m2.clone(), m3.clone()],
    )
    .unwrap();

    assert_eq!(table.len(), 3);
    assert_eq!(table.methods(), vec![&m1, &m2, &m3]);
    assert_eq!(table.units(), vec!["kg CO2-Eq", "mol H+-Eq", "m3"]);
    assert_eq!(table.scores(), vec![3.0, 0.02, 6.0]);
    assert_eq!(engine.count("start"), 1);
    assert_eq!(engine.count("lci"), 1);
    assert_eq!(engine.count("lcia"), 3);
}

#[test]
fn engine_calls_follow_method_order() {
    let conn = open_db_in_memory().unwrap();
    let methods = SqliteMethodRepository::try_new(&conn, DEFAULT_PROJECT).unwrap();
    let (m1, m2) = (method("gwp"), method("water"));
    register(&methods, &m1, "kg CO2-Eq");
    register(&methods, &m2, "m3");
    let engine = RecordingEngine::new(&[(&m1, 1.0), (&m2, 1.0)]);

    lca_results(&methods, &engine, &steel_demand(), &[m1.clone(), m2.clone()]).unwrap();

    assert_eq!(
        engine.calls(),
        vec![
            format!("start {m1}"),
            "lci".to_string(),
            format!("lcia {m1}"),
            format!("switch {m2}"),
            format!("lcia {m2}"),
        ]
    );
}

#[test]
fn rows_keep_input_order_without_sorting() {
    let conn = open_db_in_memory().unwrap();
    let methods = SqliteMethodRepository::try_new(&conn, DEFAULT_PROJECT).unwrap();
    let (m1, m2) = (method("a-first"), method("b-second"));
    register(&methods, &m1, "u1");
    register(&methods, &m2, "u2");
    let engine = RecordingEngine::new(&[(&m1, 1.0), (&m2, 10.0)]);

    let table = lca_results(&methods, &engine, &steel_demand(), &[m2.clone(), m1.clone()]).unwrap();

    assert_eq!(table.methods(), vec![&m2, &m1]);
    assert_eq!(table.units(), vec!["u2", "u1"]);
    assert_eq!(table.scores(), vec![20.0, 2.0]);
}

#[test]
fn repeated_method_produces_repeated_rows() {
    let conn = open_db_in_memory().unwrap();
    let methods = SqliteMethodRepository::try_new(&conn, DEFAULT_PROJECT).unwrap();
    let m1 = method("gwp");
    register(&methods, &m1, "kg CO2-Eq");
    let engine = RecordingEngine::new(&[(&m1, 1.0)]);

    let table = lca_results(&methods, &engine, &steel_demand(), &[m1.clone(), m1.clone()]).unwrap();

    assert_eq!(table.len(), 2);
    assert_eq!(engine.count("lci"), 1);
}

#[test]
fn unregistered_method_aborts_before_engine_runs() {
    let conn = open_db_in_memory().unwrap();
    let methods = SqliteMethodRepository::try_new(&conn, DEFAULT_PROJECT).unwrap();
    let (known, unknown) = (method("gwp"), method("unknown"));
    register(&methods, &known, "kg CO2-Eq");
    let engine = RecordingEngine::new(&[(&known, 1.0)]);

    let err = lca_results(
        &methods,
        &engine,
        &steel_demand(),
        &[known.clone(), unknown.clone()],
    )
    .unwrap_err();

    assert!(matches!(err, ImpactError::Repo(RepoError::MethodNotFound(key)) if key == unknown));
    assert!(engine.calls().is_empty());
}

#[test]
fn empty_method_list_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let methods = SqliteMethodRepository::try_new(&conn, DEFAULT_PROJECT).unwrap();
    let engine = RecordingEngine::new(&[]);

    let err = lca_results(&methods, &engine, &steel_demand(), &[]).unwrap_err();

    assert!(matches!(err, ImpactError::NoMethods));
    assert!(engine.calls().is_empty());
}

#[test]
fn engine_failures_propagate() {
    let conn = open_db_in_memory().unwrap();
    let methods = SqliteMethodRepository::try_new(&conn, DEFAULT_PROJECT).unwrap();
    let m1 = method("gwp");
    register(&methods, &m1, "kg CO2-Eq");
    let engine = RecordingEngine::new(&[(&m1, 1.0)]);

    let err = lca_results(&methods, &engine, &FunctionalUnit::new(), &[m1]).unwrap_err();

    match err {
        ImpactError::Engine(engine_err) => assert_eq!(engine_err.message(), "demand vector is empty"),
        other => panic!("unexpected error: {other}"),
    }
}
