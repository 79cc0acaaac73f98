// ABOUTME: Template context handed to the directive engine for one render
// ABOUTME: Projects path flags, task flags and derived counts into a JSON data object

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::error::Result;

/// Read-only snapshot a step template is rendered against. Rebuilt for
/// every render, never stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateContext {
    pub user_path_new: bool,
    pub user_path_existing: bool,
    pub tasks: BTreeMap<String, bool>,
    pub total_steps: usize,
    pub completed_tasks: usize,
    /// Extra values from configuration; built-in keys take precedence
    pub variables: BTreeMap<String, String>,
}

impl TemplateContext {
    pub fn set_variable(&mut self, key: String, value: String) {
        self.variables.insert(key, value);
    }

    pub fn get_variable(&self, key: &str) -> Option<&String> {
        self.variables.get(key)
    }

    pub fn extend_variables(&mut self, vars: impl IntoIterator<Item = (String, String)>) {
        self.variables.extend(vars);
    }

    /// Convert context to the JSON object the directives read from
    pub fn to_json(&self) -> Result<Value> {
        let mut data: Map<String, Value> = self
            .variables
            .iter()
            .map(|(key, value)| (key.clone(), Value::String(value.clone())))
            .collect();

        data.insert("userPath_new".to_string(), Value::Bool(self.user_path_new));
        data.insert(
            "userPath_existing".to_string(),
            Value::Bool(self.user_path_existing),
        );
        data.insert("tasks".to_string(), serde_json::to_value(&self.tasks)?);
        data.insert("totalSteps".to_string(), Value::from(self.total_steps));
        data.insert(
            "completedTasks".to_string(),
            Value::from(self.completed_tasks),
        );

        Ok(Value::Object(data))
    }
}
