// ABOUTME: Common utilities and helpers for integration tests
// ABOUTME: Builds temporary template sites, step models and in-memory wizards

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::fs;

use trailhead::steps::{ProceedGate, StepDefinition, StepModel, UserPath, Visibility};
use trailhead::storage::MemoryStore;
use trailhead::template::{FileSource, TemplateEngine};
use trailhead::wizard::{Wizard, DEFAULT_STORAGE_KEY};

pub struct TestEnvironment {
    pub temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn state_dir(&self) -> PathBuf {
        self.path().join("state")
    }

    pub async fn write_file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .expect("Failed to create directory");
        }
        fs::write(&path, content)
            .await
            .expect("Failed to write file");
        path
    }

    pub async fn write_template(&self, name: &str, content: &str) -> PathBuf {
        self.write_file(&format!("templates/{}.html", name), content)
            .await
    }

    /// Config file pointing state and templates into this environment
    pub async fn write_config(&self) -> PathBuf {
        let config = format!(
            "state_dir: {}\ntemplates:\n  root: {}\ntemplate_vars:\n  event: Eurovision\nlogging:\n  level: error\n  format: compact\n",
            self.state_dir().display(),
            self.path().display()
        );
        self.write_file("trailhead.yaml", &config).await
    }

    pub fn engine(&self) -> TemplateEngine {
        TemplateEngine::new(Arc::new(FileSource::new(self.path())))
    }
}

/// The six onboarding steps with minimal templates for each
pub const ONBOARDING_TEMPLATES: [(&str, &str); 6] = [
    (
        "welcome",
        r#"<p data-if="userPath_new">New</p><p data-if="userPath_existing">Existing</p>"#,
    ),
    (
        "account",
        r#"<ul><li data-checklist-item data-task-id="account_created" data-label="Create account" data-required="true"></li></ul>"#,
    ),
    ("attribution", r#"<p>Credit for <span data-text="event">?</span></p>"#),
    (
        "userpage",
        r#"<ul><li data-checklist-item data-task-id="userpage_opened" data-label="Open"></li></ul>"#,
    ),
    (
        "upload",
        r#"<ul><li data-checklist-item data-task-id="photo_uploaded" data-label="Upload" data-required="true"></li></ul>"#,
    ),
    ("complete", r#"<p><b data-text="totalSteps">0</b> steps</p>"#),
];

pub async fn write_onboarding_templates(env: &TestEnvironment) {
    for (name, content) in ONBOARDING_TEMPLATES {
        env.write_template(name, content).await;
    }
}

pub fn onboarding_wizard(store: MemoryStore) -> Wizard<MemoryStore> {
    Wizard::load(StepModel::onboarding(), store, DEFAULT_STORAGE_KEY)
}

/// A three step model whose middle step only shows on the `existing` path
pub fn branching_model() -> StepModel {
    StepModel::new(vec![
        StepDefinition::new("start", "Start", "Start", "start").proceed_when(ProceedGate::PathChosen),
        StepDefinition::new("returning", "Returning", "Returning", "returning")
            .requires(["profile_checked"])
            .visible_when(Visibility::Path {
                paths: vec![UserPath::Existing],
                unset: false,
            }),
        StepDefinition::new("done", "Done", "Done", "done").proceed_when(ProceedGate::Always),
    ])
    .expect("Branching model should be valid")
}
