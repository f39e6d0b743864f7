use devprobe::core::registry::{Check, CheckRegistry, UNKNOWN_CHECK};
use devprobe::core::report::{CheckResult, DiagnosticReport};
use devprobe::core::types::CheckError;
use serde_json::{json, Value};

/// Minimal target for registry behavior independent of either facet
struct Counter {
    value: i64,
}

struct Double;

#[async_trait::async_trait]
impl Check<Counter> for Double {
    fn name(&self) -> &'static str {
        "double"
    }

    fn label(&self) -> &'static str {
        "Double It"
    }

    async fn run(&self, target: &Counter) -> Result<Value, CheckError> {
        Ok(json!(target.value * 2))
    }
}

struct Positive;

#[async_trait::async_trait]
impl Check<Counter> for Positive {
    fn name(&self) -> &'static str {
        "positive"
    }

    fn label(&self) -> &'static str {
        "Positive"
    }

    async fn run(&self, target: &Counter) -> Result<Value, CheckError> {
        if target.value > 0 {
            Ok(json!(true))
        } else {
            Err(CheckError::Assertion(format!("{} is not positive", target.value)))
        }
    }
}

struct Boom;

#[async_trait::async_trait]
impl Check<Counter> for Boom {
    fn name(&self) -> &'static str {
        "boom"
    }

    fn label(&self) -> &'static str {
        "Boom"
    }

    async fn run(&self, _target: &Counter) -> Result<Value, CheckError> {
        panic!("{}", String::from("owned panic message"));
    }
}

fn registry() -> CheckRegistry<Counter> {
    CheckRegistry::new().with(Double).with(Positive).with(Boom)
}

#[test]
fn test_registration_order_and_lookup() {
    let registry = registry();

    assert_eq!(registry.names(), vec!["double", "positive", "boom"]);
    assert_eq!(registry.len(), 3);
    assert!(registry.contains("positive"));
    assert!(!registry.contains("Positive"));
    assert_eq!(registry.get("double").unwrap().label(), "Double It");
}

#[test]
fn test_reregistering_replaces_without_duplicating() {
    let mut registry = registry();
    registry.register(Double);

    assert_eq!(registry.len(), 3);
    assert_eq!(registry.names(), vec!["double", "positive", "boom"]);
}

#[tokio::test]
async fn test_dispatch_outcomes() {
    let registry = registry();
    let target = Counter { value: -3 };

    let ok = registry.dispatch("double", &target).await;
    assert_eq!(ok, CheckResult::passed("Double It", json!(-6)));

    let failed = registry.dispatch("positive", &target).await;
    assert_eq!(failed, CheckResult::failed("positive", "-3 is not positive"));

    let unknown = registry.dispatch("triple", &target).await;
    assert_eq!(unknown, CheckResult::failed("triple", UNKNOWN_CHECK));
}

#[tokio::test]
async fn test_panic_is_contained() {
    let registry = registry();
    let report = registry
        .run_all(&Counter { value: 1 }, &["boom", "double"])
        .await;

    assert_eq!(
        report.results()[0],
        CheckResult::failed("boom", "Check panicked: owned panic message")
    );
    assert!(report.results()[1].success());
}

#[tokio::test]
async fn test_run_all_empty_request() {
    let requested: Vec<String> = Vec::new();
    let report = registry().run_all(&Counter { value: 1 }, &requested).await;
    assert!(report.is_empty());
    assert!(report.all_passed());
}

#[test]
fn test_result_wire_shapes() {
    let passed = CheckResult::passed("List Databases", json!({ "count": 0 }));
    let failed = CheckResult::failed("list-databases", "not authorized");

    assert_eq!(
        serde_json::to_value(&passed).unwrap(),
        json!({ "test": "List Databases", "success": true, "data": { "count": 0 } })
    );
    assert_eq!(
        serde_json::to_value(&failed).unwrap(),
        json!({ "test": "list-databases", "success": false, "error": "not authorized" })
    );
}

#[test]
fn test_report_accessors() {
    let mut report = DiagnosticReport::new();
    report.push(CheckResult::passed("A", json!(1)));
    report.push(CheckResult::failed("b", "bad"));
    report.push(CheckResult::failed("c", "worse"));

    assert_eq!(report.len(), 3);
    assert!(!report.all_passed());
    let failed: Vec<&str> = report.failures().map(|r| r.test()).collect();
    assert_eq!(failed, vec!["b", "c"]);
    assert_eq!(report.into_results().len(), 3);
}
