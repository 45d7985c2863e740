use cbs_planner::adapters::outbound::{BuiltinScenarios, FilesystemScenarioSource, ScenarioCatalog};
use cbs_planner::domains::mapf::{Cell, Grid, Scenario, ScenarioSource};
use cbs_planner::DomainError;
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;

const TWO_ROOMS: &str = r#"
map = [
    "...#...",
    ".......",
    "...#...",
]

[[agents]]
start = [0, 0]
goal = [2, 6]

[[agents]]
start = [2, 0]
goal = [0, 6]
"#;

#[test]
fn loads_scenarios_by_name_and_lists_them() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("two-rooms.toml"), TWO_ROOMS).unwrap();
    fs::write(dir.path().join("notes.txt"), "not a scenario").unwrap();

    let source = FilesystemScenarioSource::new(Some(dir.path().to_path_buf()));
    assert_eq!(source.list_scenarios().unwrap(), vec!["two-rooms".to_string()]);

    let scenario = source.load_scenario("two-rooms").unwrap();
    assert_eq!(scenario.name, "two-rooms");
    assert_eq!(scenario.grid.cols(), 7);
    assert_eq!(scenario.agents[1].goal, Cell::new(0, 6));
}

#[test]
fn missing_directory_lists_nothing() {
    let dir = tempdir().unwrap();
    let source = FilesystemScenarioSource::new(Some(dir.path().join("nowhere")));
    assert!(source.list_scenarios().unwrap().is_empty());
    match source.load_scenario("two-rooms") {
        Err(DomainError::ScenarioNotFound { name }) => assert_eq!(name, "two-rooms"),
        other => panic!("Expected ScenarioNotFound, got {:?}", other),
    }
}

#[test]
fn saved_scenarios_load_back() {
    let dir = tempdir().unwrap();
    let source = FilesystemScenarioSource::new(Some(dir.path().join("saved")));
    let scenario = Scenario::new(
        "square",
        Grid::open(3, 3),
        [(Cell::new(0, 0), Cell::new(2, 2)), (Cell::new(2, 2), Cell::new(0, 0))],
    )
    .unwrap();

    let path = source.save_scenario(&scenario).unwrap();
    assert!(path.ends_with("square.toml"));
    assert_eq!(source.load_scenario("square").unwrap(), scenario);
}

#[test]
fn invalid_files_are_rejected() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("walled.toml"),
        "map = [\"#.\"]\n[[agents]]\nstart = [0, 0]\ngoal = [0, 1]\n",
    )
    .unwrap();
    fs::write(dir.path().join("garbled.toml"), "map = [\"a\"]").unwrap();

    let source = FilesystemScenarioSource::new(Some(dir.path().to_path_buf()));
    assert!(matches!(
        source.load_scenario("walled"),
        Err(DomainError::InvalidInstance { .. })
    ));
    assert!(matches!(
        source.load_scenario("garbled"),
        Err(DomainError::ScenarioParse(_))
    ));
}

#[test]
fn catalog_prefers_disk_over_builtins() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("head-on.toml"),
        "name = \"head-on\"\nmap = [\"...\"]\n[[agents]]\nstart = [0, 0]\ngoal = [0, 2]\n",
    )
    .unwrap();

    let catalog = ScenarioCatalog::new(vec![
        Arc::new(FilesystemScenarioSource::new(Some(dir.path().to_path_buf()))),
        Arc::new(BuiltinScenarios::new()),
    ]);

    let overridden = catalog.load_scenario("head-on").unwrap();
    assert_eq!(overridden.agents.len(), 1);
    assert_eq!(catalog.load_scenario("corridor").unwrap().agents.len(), 2);
    assert!(catalog.load_scenario("maze").is_err());

    let names = catalog.list_scenarios().unwrap();
    assert_eq!(names.iter().filter(|n| n.as_str() == "head-on").count(), 1);
    assert!(names.contains(&"warehouse".to_string()));
}

#[test]
fn bundled_scenario_files_are_valid() {
    let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("resources/scenarios");
    let source = FilesystemScenarioSource::new(Some(dir));
    let names = source.list_scenarios().unwrap();
    assert!(!names.is_empty());
    for name in names {
        source.load_scenario(&name).unwrap();
    }
}
