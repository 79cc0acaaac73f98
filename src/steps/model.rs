// ABOUTME: Ordered step model and its loading from YAML configuration
// ABOUTME: Provides the built-in onboarding steps and index/id lookups

use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::{debug, warn};

use super::definition::{ProceedGate, StepDefinition, UserPath, Visibility};
use super::error::{Result, StepError};
use super::validation::StepValidator;

/// Step definitions as written in a steps file, before validation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StepList {
    #[serde(default)]
    pub steps: Vec<StepDefinition>,
}

/// Fixed, ordered list of steps. Never empty: every constructor and
/// deserialization runs the validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StepList")]
pub struct StepModel {
    steps: Vec<StepDefinition>,
}

impl StepModel {
    /// Build a model from definitions, rejecting structurally invalid ones.
    pub fn new(steps: Vec<StepDefinition>) -> Result<Self> {
        let model = Self { steps };
        let report = StepValidator::new().validate(&model);

        for warning in &report.warnings {
            warn!("Step model: {}", warning);
        }

        match report.errors.into_iter().next() {
            Some(error) => Err(StepError::ValidationError(error)),
            None => Ok(model),
        }
    }

    /// Wrap definitions without validating them, for reporting on
    /// models that may be broken
    pub(crate) fn unchecked(steps: Vec<StepDefinition>) -> Self {
        Self { steps }
    }

    /// Parse a model from YAML of the form `steps: [...]`
    pub fn from_yaml(content: &str) -> Result<Self> {
        let list: StepList = serde_yaml::from_str(content)?;
        Self::new(list.steps)
    }

    /// Load a model from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).await?;
        debug!("Loaded step model from {}", path.as_ref().display());
        Self::from_yaml(&content)
    }

    /// The six-step contributor onboarding flow
    pub fn onboarding() -> Self {
        let steps = vec![
            StepDefinition::new("welcome", "Welcome to WikiPortraits", "Welcome", "welcome")
                .proceed_when(ProceedGate::PathChosen),
            StepDefinition::new("account", "Create a Wikimedia Account", "Account", "account")
                .requires(["account_created"])
                .visible_when(Visibility::Path {
                    paths: vec![UserPath::New],
                    unset: true,
                }),
            StepDefinition::new(
                "attribution",
                "Set Your Attribution Name",
                "Attribution",
                "attribution",
            )
            .proceed_when(ProceedGate::Always),
            StepDefinition::new(
                "userpage",
                "Create or Update Your User Page",
                "User Page",
                "userpage",
            )
            .requires(["userpage_opened", "userpage_intro", "userpage_save"]),
            StepDefinition::new("upload", "Upload Your First Photos", "Upload", "upload")
                .requires(["licensing_read", "photo_uploaded"]),
            StepDefinition::new("complete", "You're Ready!", "Complete", "complete")
                .proceed_when(ProceedGate::Always),
        ];

        Self { steps }
    }

    pub fn steps(&self) -> &[StepDefinition] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&StepDefinition> {
        self.steps.get(index)
    }

    pub fn find(&self, id: &str) -> Option<&StepDefinition> {
        self.steps.iter().find(|step| step.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.steps.iter().position(|step| step.id == id)
    }

    pub fn last_index(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StepDefinition> {
        self.steps.iter()
    }

    /// Serialize the model back to YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(StepError::YamlError)
    }
}

impl Default for StepModel {
    fn default() -> Self {
        Self::onboarding()
    }
}

impl TryFrom<StepList> for StepModel {
    type Error = StepError;

    fn try_from(list: StepList) -> Result<Self> {
        Self::new(list.steps)
    }
}

impl TryFrom<Vec<StepDefinition>> for StepModel {
    type Error = StepError;

    fn try_from(steps: Vec<StepDefinition>) -> Result<Self> {
        Self::new(steps)
    }
}
