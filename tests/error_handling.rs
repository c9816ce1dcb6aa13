use std::io::Write;
use std::time::Duration;

use tempfile::NamedTempFile;

use pipedag::config::load_and_validate;
use pipedag::errors::{ConfigError, GraphError};
use pipedag::plugins::builtin_registry;
use pipedag::{ExecutionMode, ExecutorOptions};

fn manifest_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn test_cycle_returns_structured_error() {
    let file = manifest_file(
        r#"
[[plugin]]
name = "A"
after = ["B"]

[[plugin]]
name = "B"
after = ["A"]
"#,
    );

    match load_and_validate(file.path()) {
        Err(ConfigError::Graph(GraphError::Cycle(members))) => {
            assert_eq!(members, vec!["A", "B"]);
        }
        Err(e) => panic!("Expected cycle error, got: {e:?}"),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_unknown_dependency_returns_graph_error() {
    let file = manifest_file(
        r#"
[[plugin]]
name = "A"
after = ["NonExistent"]
"#,
    );

    let err = load_and_validate(file.path()).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Graph(GraphError::UnknownDependency { ref task, ref dependency })
            if task == "A" && dependency == "NonExistent"
    ));
    assert!(err.to_string().contains("NonExistent"));
}

#[test]
fn test_duplicate_plugin_name() {
    let file = manifest_file(
        r#"
[[plugin]]
name = "gaps"

[[plugin]]
name = "gaps"
"#,
    );

    let err = load_and_validate(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Graph(GraphError::DuplicateName(ref n)) if n == "gaps"));
}

#[test]
fn test_empty_manifest_is_rejected() {
    let file = manifest_file("[config]\nmode = \"sequential\"\n");

    match load_and_validate(file.path()) {
        Err(ConfigError::Invalid(msg)) => assert!(msg.contains("at least one")),
        other => panic!("Expected Invalid, got: {other:?}"),
    }
}

#[test]
fn test_invalid_global_settings() {
    let file = manifest_file(
        r#"
[config]
max_workers = 0

[[plugin]]
name = "A"
"#,
    );
    let err = load_and_validate(file.path()).unwrap_err();
    assert!(err.to_string().contains("max_workers"));

    let file = manifest_file(
        r#"
[config]
task_timeout = "soon"

[[plugin]]
name = "A"
"#,
    );
    let err = load_and_validate(file.path()).unwrap_err();
    assert!(err.to_string().contains("task_timeout"));
}

#[test]
fn test_unknown_mode_is_a_toml_error() {
    let file = manifest_file(
        r#"
[config]
mode = "turbo"

[[plugin]]
name = "A"
"#,
    );
    assert!(matches!(
        load_and_validate(file.path()),
        Err(ConfigError::Toml(_))
    ));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("Pipeline.toml");
    assert!(matches!(load_and_validate(&missing), Err(ConfigError::Io(_))));
}

#[test]
fn test_settings_and_defaults() {
    let file = manifest_file(
        r#"
[config]
task_timeout = "2s"

[[plugin]]
name = "transcript"

[[plugin]]
name = "gaps"
uses = "turn_gaps"
after = ["transcript"]
options = { min_gap = 0.5 }
"#,
    );

    let manifest = load_and_validate(file.path()).unwrap();
    assert_eq!(
        manifest.executor_options(),
        ExecutorOptions {
            mode: ExecutionMode::Parallel,
            max_workers: 4,
            task_timeout: Some(Duration::from_secs(2)),
        }
    );
    assert_eq!(manifest.plugins[0].kind(), "transcript");
    assert_eq!(manifest.plugins[1].kind(), "turn_gaps");
    assert_eq!(
        manifest.descriptors().map(|d| d.name).collect::<Vec<_>>(),
        vec!["transcript", "gaps"]
    );
}

#[test]
fn test_bad_plugin_options_name_the_plugin() {
    let file = manifest_file(
        r#"
[[plugin]]
name = "transcript"

[[plugin]]
name = "pauses"
uses = "turn_gaps"
after = ["transcript"]
options = { min_gap = "long" }
"#,
    );

    let manifest = load_and_validate(file.path()).unwrap();
    match builtin_registry().build_pipeline(&manifest) {
        Err(ConfigError::PluginFactory { plugin, source }) => {
            assert_eq!(plugin, "pauses");
            assert!(source.to_string().contains("min_gap"));
        }
        other => panic!("Expected PluginFactory error, got: {other:?}"),
    }
}

#[test]
fn test_oversized_timeout_is_rejected() {
    let file = manifest_file(
        r#"
[config]
task_timeout = "18446744073709551615h"

[[plugin]]
name = "A"
"#,
    );
    let err = load_and_validate(file.path()).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("task_timeout"), "{msg}");
    assert!(msg.contains("too large"), "{msg}");
}
