// ABOUTME: Persisted wizard state and the task registry
// ABOUTME: Serialized as one JSON blob with the currentStep/userPath/tasks/customData layout

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::steps::UserPath;

/// Task id to completion flag. Absent ids read as incomplete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskRegistry {
    flags: BTreeMap<String, bool>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, task_id: &str) -> bool {
        self.flags.get(task_id).copied().unwrap_or(false)
    }

    pub fn set(&mut self, task_id: &str, value: bool) {
        self.flags.insert(task_id.to_string(), value);
    }

    /// Number of tasks currently marked complete
    pub fn completed_count(&self) -> usize {
        self.flags.values().filter(|done| **done).count()
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &bool)> {
        self.flags.iter()
    }

    pub fn as_map(&self) -> &BTreeMap<String, bool> {
        &self.flags
    }
}

impl<K: Into<String>> FromIterator<(K, bool)> for TaskRegistry {
    fn from_iter<I: IntoIterator<Item = (K, bool)>>(iter: I) -> Self {
        Self {
            flags: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WizardState {
    pub current_step: usize,
    pub user_path: Option<UserPath>,
    pub tasks: TaskRegistry,
    pub custom_data: Map<String, Value>,
}

impl WizardState {
    pub fn fresh() -> Self {
        Self::default()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(blob: &str) -> serde_json::Result<Self> {
        serde_json::from_str(blob)
    }
}
