// ABOUTME: View models for the step indicator, navigation buttons and path options
// ABOUTME: Pure projections of a wizard; callers decide how to draw them

use serde::Serialize;

use crate::steps::UserPath;
use crate::storage::StateStore;
use crate::wizard::{StepStatus, Wizard};

pub const COMPLETED_ICON: &str = "✓";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndicatorItem {
    pub index: usize,
    pub step_id: String,
    pub label: String,
    pub status: StepStatus,
    /// Hidden under the current path
    pub skipped: bool,
    pub number: usize,
    pub icon: String,
    pub aria_label: String,
    pub clickable: bool,
}

/// One entry per defined step, hidden ones included and marked skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepIndicator {
    pub items: Vec<IndicatorItem>,
}

impl StepIndicator {
    pub fn from_wizard<S: StateStore>(wizard: &Wizard<S>) -> Self {
        let current = wizard.current_index();
        let visible_ids: Vec<&str> = wizard
            .visible_steps()
            .iter()
            .map(|step| step.id.as_str())
            .collect();

        let items = wizard
            .model()
            .iter()
            .enumerate()
            .map(|(index, step)| {
                let status = wizard.step_status(index);
                let skipped = !wizard.is_step_visible(index);
                let number = visible_ids
                    .iter()
                    .position(|id| *id == step.id)
                    .map_or(index + 1, |position| position + 1);

                let icon = if status == StepStatus::Completed {
                    COMPLETED_ICON.to_string()
                } else {
                    number.to_string()
                };

                let mut aria_label = format!("Step {}: {}", number, step.short_label);
                if skipped {
                    aria_label.push_str(" (skipped)");
                }

                IndicatorItem {
                    index,
                    step_id: step.id.clone(),
                    label: step.short_label.clone(),
                    status,
                    skipped,
                    number,
                    icon,
                    aria_label,
                    clickable: index <= current && !skipped,
                }
            })
            .collect();

        Self { items }
    }

    pub fn active(&self) -> Option<&IndicatorItem> {
        self.items
            .iter()
            .find(|item| item.status == StepStatus::Active)
    }

    /// One-line text rendering, e.g. `[✓ Welcome] [2 Account] ...`
    pub fn to_line(&self) -> String {
        self.items
            .iter()
            .map(|item| {
                let marker = match (item.skipped, item.status) {
                    (true, _) => "~",
                    (false, StepStatus::Active) => ">",
                    (false, StepStatus::Visited) => "!",
                    _ => "",
                };
                format!("[{}{} {}]", marker, item.icon, item.label)
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationButtons {
    pub back_disabled: bool,
    pub next_label: &'static str,
    pub next_disabled: bool,
}

impl NavigationButtons {
    pub fn from_wizard<S: StateStore>(wizard: &Wizard<S>) -> Self {
        let last = wizard.is_last_step();
        Self {
            back_disabled: wizard.is_first_step(),
            next_label: if last { "Finish" } else { "Next" },
            next_disabled: last,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathOption {
    pub path: UserPath,
    /// Element id of the option in the welcome template
    pub element_id: &'static str,
    pub selected: bool,
}

impl PathOption {
    pub fn aria_pressed(&self) -> &'static str {
        if self.selected {
            "true"
        } else {
            "false"
        }
    }
}

pub fn path_options<S: StateStore>(wizard: &Wizard<S>) -> Vec<PathOption> {
    [(UserPath::New, "pathNew"), (UserPath::Existing, "pathExisting")]
        .into_iter()
        .map(|(path, element_id)| PathOption {
            path,
            element_id,
            selected: wizard.user_path() == Some(path),
        })
        .collect()
}
