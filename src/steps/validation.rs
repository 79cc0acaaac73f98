// ABOUTME: Structural validation of step models
// ABOUTME: Checks ids, template references and the always-reachable first and last steps

use std::collections::HashSet;

use super::definition::{ProceedGate, Visibility};
use super::error::ValidationError;
use super::model::StepModel;

#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<String>,
    pub is_valid: bool,
}

pub struct StepValidator {
    strict_mode: bool,
}

impl StepValidator {
    pub fn new() -> Self {
        Self { strict_mode: false }
    }

    /// In strict mode warnings are reported as invalid too
    pub fn with_strict_mode(mut self, strict: bool) -> Self {
        self.strict_mode = strict;
        self
    }

    /// Validate a complete step model
    pub fn validate(&self, model: &StepModel) -> ValidationReport {
        let mut report = ValidationReport::new();

        if model.is_empty() {
            report.errors.push(ValidationError::EmptyModel);
            report.is_valid = false;
            return report;
        }

        self.validate_fields(model, &mut report);
        self.validate_endpoints(model, &mut report);
        self.check_required_tasks(model, &mut report);

        report.is_valid =
            report.errors.is_empty() && !(self.strict_mode && !report.warnings.is_empty());
        report
    }

    fn validate_fields(&self, model: &StepModel, report: &mut ValidationReport) {
        let mut seen = HashSet::new();

        for step in model.iter() {
            if step.id.trim().is_empty() {
                report.errors.push(ValidationError::EmptyField {
                    step: step.title.clone(),
                    field: "id".to_string(),
                });
                continue;
            }

            if !seen.insert(step.id.as_str()) {
                report.errors.push(ValidationError::DuplicateStep {
                    step: step.id.clone(),
                });
            }

            for (field, value) in [
                ("title", &step.title),
                ("short_label", &step.short_label),
                ("template", &step.template),
            ] {
                if value.trim().is_empty() {
                    report.errors.push(ValidationError::EmptyField {
                        step: step.id.clone(),
                        field: field.to_string(),
                    });
                }
            }
        }
    }

    /// The wizard starts on the first step and finishes on the last one,
    /// so both must be reachable from any state.
    fn validate_endpoints(&self, model: &StepModel, report: &mut ValidationReport) {
        if let Some(first) = model.get(0) {
            if first.visible != Visibility::Always {
                report.errors.push(ValidationError::FirstStepHidden {
                    step: first.id.clone(),
                });
            }
        }

        if let Some(last) = model.get(model.last_index()) {
            if last.visible != Visibility::Always {
                report.errors.push(ValidationError::LastStepHidden {
                    step: last.id.clone(),
                });
            }
            if last.proceed != ProceedGate::Always {
                report.errors.push(ValidationError::LastStepGated {
                    step: last.id.clone(),
                });
            }
        }
    }

    fn check_required_tasks(&self, model: &StepModel, report: &mut ValidationReport) {
        for step in model.iter() {
            let mut tasks = HashSet::new();
            for task_id in &step.required_tasks {
                if task_id.trim().is_empty() {
                    report
                        .warnings
                        .push(format!("Step '{}' lists an empty task id", step.id));
                } else if !tasks.insert(task_id.as_str()) {
                    report.warnings.push(format!(
                        "Step '{}' lists task '{}' more than once",
                        step.id, task_id
                    ));
                }
            }

            match step.proceed {
                ProceedGate::Always if !step.required_tasks.is_empty() => {
                    report.warnings.push(format!(
                        "Step '{}' has required tasks but never gates navigation on them",
                        step.id
                    ));
                }
                ProceedGate::StepComplete if step.required_tasks.is_empty() => {
                    report.warnings.push(format!(
                        "Step '{}' gates on completion but requires no tasks",
                        step.id
                    ));
                }
                _ => {}
            }
        }
    }
}

impl Default for StepValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
            is_valid: true,
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}
