//! Loading workspace description files from disk.

use std::fs;

use logik::core::config::ConfigError;
use logik::core::description::{DEFAULT_ICON, load_workspace};
use logik::core::hierarchy::Hierarchy;
use logik::core::registry::ComponentRegistry;
use logik::core::tree::{TreeError, TreeSource};
use tempfile::TempDir;

const GATES_TOML: &str = r#"
[[folders]]
name = "Gates"
entries = [
    { name = "AND", icon = "chip" },
    { name = "OR" },
]

[[folders]]
name = "Empty"

[hierarchy]
root = "top"

[[hierarchy.nodes]]
id = "top"
name = "Adder"
children = ["ha1", "ha2"]

[[hierarchy.nodes]]
id = "ha1"
name = "Half adder"
children = ["x1"]

[[hierarchy.nodes]]
id = "ha2"
name = "Half adder"

[[hierarchy.nodes]]
id = "x1"
name = "XOR"
"#;

const GATES_JSON: &str = r#"{
  "folders": [{ "name": "Gates", "entries": [{ "name": "NOT" }] }],
  "hierarchy": {
    "root": "top",
    "nodes": [
      { "id": "top", "name": "Inverter", "children": ["n"] },
      { "id": "n", "name": "NOT", "icon": "chip" }
    ]
  }
}"#;

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_load_toml_workspace() {
    let dir = TempDir::new().unwrap();
    let workspace = load_workspace(&write(&dir, "adder.toml", GATES_TOML)).unwrap();

    let registry = ComponentRegistry::build(&workspace.folders);
    assert_eq!(registry.folders().len(), 2);
    assert_eq!(registry.entry_count(), 2);
    let or = registry.folders()[0].entries()[1].id;
    assert_eq!(registry.entry(or).unwrap().icon, DEFAULT_ICON);
    assert!(registry.folders()[1].entries().is_empty());

    let hierarchy = Hierarchy::build(&workspace.hierarchy);
    let names: Vec<_> = hierarchy
        .flatten()
        .into_iter()
        .map(|(depth, id)| (depth, hierarchy.label(id).unwrap().to_string()))
        .collect();
    assert_eq!(
        names,
        [
            (0, "Adder".to_string()),
            (1, "Half adder".to_string()),
            (2, "XOR".to_string()),
            (1, "Half adder".to_string()),
        ]
    );
}

#[test]
fn test_load_json_workspace() {
    let dir = TempDir::new().unwrap();
    let workspace = load_workspace(&write(&dir, "inverter.json", GATES_JSON)).unwrap();
    assert_eq!(workspace.folders[0].entries[0].name, "NOT");
    assert_eq!(workspace.hierarchy.children[0].icon, "chip");
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let result = load_workspace(&dir.path().join("nope.toml"));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn test_syntax_errors_are_reported_per_format() {
    let dir = TempDir::new().unwrap();
    let toml = load_workspace(&write(&dir, "bad.toml", "[hierarchy\nroot = 1"));
    assert!(matches!(toml, Err(ConfigError::Parse(_))));
    let json = load_workspace(&write(&dir, "bad.json", "{\"hierarchy\": "));
    assert!(matches!(json, Err(ConfigError::Json(_))));
}

#[test]
fn test_cyclic_hierarchy_is_malformed() {
    let dir = TempDir::new().unwrap();
    let cyclic = r#"
[hierarchy]
root = "a"

[[hierarchy.nodes]]
id = "a"
name = "A"
children = ["b"]

[[hierarchy.nodes]]
id = "b"
name = "B"
children = ["a"]
"#;
    let result = load_workspace(&write(&dir, "cycle.toml", cyclic));
    assert!(matches!(
        result,
        Err(ConfigError::Description(TreeError::MalformedDescription(_)))
    ));
}
