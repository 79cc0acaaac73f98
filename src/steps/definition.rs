// ABOUTME: Step definition types and their declarative predicates
// ABOUTME: Visibility and proceed gates are pure functions of an explicitly passed wizard state

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::StepError;
use crate::wizard::WizardState;

/// The branch chosen on the welcome step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserPath {
    New,
    Existing,
}

impl UserPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserPath::New => "new",
            UserPath::Existing => "existing",
        }
    }
}

impl fmt::Display for UserPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserPath {
    type Err = StepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(UserPath::New),
            "existing" => Ok(UserPath::Existing),
            other => Err(StepError::InvalidPath(other.to_string())),
        }
    }
}

/// Decides whether a step applies to the current state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "when", rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Always,
    /// Visible while the chosen path is one of `paths`. With `unset`, also
    /// visible before any path has been chosen.
    Path {
        #[serde(default)]
        paths: Vec<UserPath>,
        #[serde(default)]
        unset: bool,
    },
}

impl Visibility {
    pub fn evaluate(&self, state: &WizardState) -> bool {
        match self {
            Visibility::Always => true,
            Visibility::Path { paths, unset } => match state.user_path {
                None => *unset,
                Some(path) => paths.contains(&path),
            },
        }
    }
}

/// Decides whether forward navigation may happen without confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProceedGate {
    Always,
    PathChosen,
    #[default]
    StepComplete,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDefinition {
    pub id: String,
    pub title: String,
    pub short_label: String,
    pub template: String,
    #[serde(default)]
    pub required_tasks: Vec<String>,
    #[serde(default)]
    pub visible: Visibility,
    #[serde(default)]
    pub proceed: ProceedGate,
}

impl StepDefinition {
    pub fn new(id: &str, title: &str, short_label: &str, template: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            short_label: short_label.to_string(),
            template: template.to_string(),
            required_tasks: Vec::new(),
            visible: Visibility::Always,
            proceed: ProceedGate::StepComplete,
        }
    }

    pub fn requires<I, T>(mut self, tasks: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.required_tasks = tasks.into_iter().map(Into::into).collect();
        self
    }

    pub fn visible_when(mut self, visible: Visibility) -> Self {
        self.visible = visible;
        self
    }

    pub fn proceed_when(mut self, proceed: ProceedGate) -> Self {
        self.proceed = proceed;
        self
    }

    pub fn is_visible(&self, state: &WizardState) -> bool {
        self.visible.evaluate(state)
    }

    /// Every required task is set; vacuously true without required tasks.
    pub fn is_complete(&self, state: &WizardState) -> bool {
        self.required_tasks
            .iter()
            .all(|task_id| state.tasks.get(task_id))
    }

    pub fn can_proceed(&self, state: &WizardState) -> bool {
        match self.proceed {
            ProceedGate::Always => true,
            ProceedGate::PathChosen => state.user_path.is_some(),
            ProceedGate::StepComplete => self.is_complete(state),
        }
    }
}
