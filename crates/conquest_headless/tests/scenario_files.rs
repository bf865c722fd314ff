//! Scenario files on disk through the runner entry points.

use conquest_core::ai::PlannerConfig;
use conquest_headless::{
    plan_to_json, run_batch, run_plan, validate_scenario, BatchConfig, Scenario,
};
use conquest_test_utils::fixtures::players::{BLUE, RED};
use conquest_test_utils::fixtures::{capped_snapshot, standard_snapshot};

#[test]
fn test_saved_scenario_plans_like_the_original() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("strip.ron");
    let scenario = Scenario::new("Strip", capped_snapshot(40, 2))
        .with_planner(PlannerConfig::seeded(21));
    scenario.save(&path).unwrap();

    let loaded = Scenario::load(&path).unwrap();
    assert_eq!(loaded, scenario);
    assert_eq!(
        run_plan(&loaded, RED, None).unwrap(),
        run_plan(&scenario, RED, None).unwrap()
    );
}

#[test]
fn test_validate_then_plan_then_batch() {
    let scenario = Scenario::new("Strip", standard_snapshot(30));
    let report = validate_scenario(&scenario).unwrap();
    assert!(report.is_clean());

    let json = plan_to_json(&scenario, BLUE, Some(8)).unwrap();
    assert!(json.contains("\"player\""));

    let results = run_batch(&scenario, BatchConfig::new(3).with_seed(100));
    assert!(results.errors.is_empty());
    assert_eq!(results.plans.len(), 6);
    assert!(results.plans.iter().all(|p| p.spent <= 30));
}

#[test]
fn test_corrupt_file_is_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.ron");
    std::fs::write(&path, "Scenario(name: ").unwrap();
    assert!(matches!(
        Scenario::load(&path),
        Err(conquest_headless::ScenarioError::ParseError(_))
    ));
}
