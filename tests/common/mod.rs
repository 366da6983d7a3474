//! Common test utilities

#![allow(dead_code)]

use rsdk::settings::{InMemorySettings, Setting};
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary extension directory with task files and a settings file
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("extensions")).unwrap();
        Workspace { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn extension_dir(&self) -> PathBuf {
        self.path().join("extensions")
    }

    /// Write `extensions/<bundle>/Tasks/<name>.yaml`
    pub fn write_task(&self, bundle: &str, name: &str, yaml: &str) -> PathBuf {
        let tasks_dir = self.extension_dir().join(bundle).join("Tasks");
        fs::create_dir_all(&tasks_dir).unwrap();
        let path = tasks_dir.join(format!("{}.yaml", name));
        fs::write(&path, yaml).unwrap();
        path
    }

    /// Write `settings.yml` pointing at the extension directory, plus `extra` lines
    pub fn write_settings(&self, extra: &str) -> PathBuf {
        let path = self.path().join("settings.yml");
        let contents = format!(
            "extension_dirs:\n  - {}\n{}",
            self.extension_dir().display(),
            extra
        );
        fs::write(&path, contents).unwrap();
        path
    }

    /// Settings pointing at the extension directory
    pub fn settings(&self) -> InMemorySettings {
        InMemorySettings::new().with_setting(Setting::new(
            "extension_dirs",
            Value::Sequence(vec![Value::String(
                self.extension_dir().display().to_string(),
            )]),
        ))
    }

    /// Write the hello bundle: two staged tasks and a set over them
    pub fn write_hello_bundle(&self) {
        self.write_task("Hello", "stage_a", STAGE_A);
        self.write_task("Hello", "stage_b", STAGE_B);
        self.write_task("Hello", "hello_set", HELLO_SET);
    }
}

pub const STAGE_A: &str = r#"
id: stage_a
type: local_cli
short_description: First stage
version: 0.1.0
command: echo %greeting% from a
stage: build
tags: [tagA]
placeholders:
  - name: "%greeting%"
    value_resolver: STATIC
    optional: true
    configuration:
      defaultValue: hello
"#;

pub const STAGE_B: &str = r#"
id: stage_b
type: local_cli
short_description: Second stage
version: 0.1.0
command: echo %target% from b
stage: deploy
tags: [tagB]
placeholders:
  - name: "%target%"
    value_resolver: SETTING
    optional: true
    configuration:
      setting: project_dir
lifecycle:
  INITIALIZED:
    commands:
      - command: mkdir -p %target%
    placeholders:
      - name: "%target%"
        value_resolver: SETTING
        optional: true
        configuration:
          setting: project_dir
    files:
      - path: README.md
        content: hello
"#;

pub const HELLO_SET: &str = r#"
id: hello:set
type: task_set
short_description: Greets every stage
version: 0.1.0
stages: [build, deploy]
tasks:
  - id: stage_a
    tags: [tagA]
    stop_on_error: true
  - id: stage_b
    tags: [tagB]
  - id: does_not_exist
"#;
