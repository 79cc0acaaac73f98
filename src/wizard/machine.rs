// ABOUTME: Wizard state machine over a state-dependent sequence of visible steps
// ABOUTME: Handles task flags, path choice, gated navigation, persistence and reset

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, error, info, warn};

use super::confirm::{Confirmation, ConfirmationGate};
use super::refresh::{PendingRefresh, Refresh, RefreshScheduler};
use super::state::WizardState;
use crate::steps::{StepDefinition, StepModel, UserPath};
use crate::storage::StateStore;
use crate::template::TemplateContext;

pub const DEFAULT_STORAGE_KEY: &str = "wikiportraits_wizard_state";

/// Tasks implied by the path choice on the welcome step.
pub const ACCOUNT_TASKS: [&str; 2] = ["account_created", "email_verified"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Completed,
    Visited,
    Active,
    Pending,
}

impl StepStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::Completed => "completed",
            StepStatus::Visited => "visited",
            StepStatus::Active => "active",
            StepStatus::Pending => "pending",
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Moved { from: usize, to: usize },
    /// The caller declined the incomplete-tasks confirmation
    Declined,
    /// No visible step in that direction
    Boundary,
}

pub struct Wizard<S: StateStore> {
    model: StepModel,
    store: S,
    storage_key: String,
    state: WizardState,
    refresh: RefreshScheduler,
    epoch: u64,
}

impl<S: StateStore> Wizard<S> {
    /// Start from fresh state without reading the store
    pub fn new(model: StepModel, store: S) -> Self {
        Self {
            model,
            store,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            state: WizardState::fresh(),
            refresh: RefreshScheduler::new(),
            epoch: 0,
        }
    }

    /// Restore the persisted state, falling back to fresh state when the
    /// entry is missing or unreadable.
    pub fn load(model: StepModel, store: S, storage_key: impl Into<String>) -> Self {
        let storage_key = storage_key.into();
        let state = Self::read_state(&store, &storage_key);

        let mut wizard = Self {
            model,
            store,
            storage_key,
            state,
            refresh: RefreshScheduler::new(),
            epoch: 0,
        };
        wizard.settle();
        wizard.refresh.schedule_full();
        wizard
    }

    fn read_state(store: &S, key: &str) -> WizardState {
        match store.get(key) {
            Ok(Some(blob)) => match WizardState::from_json(&blob) {
                Ok(state) => {
                    debug!("Restored wizard state from '{}'", key);
                    state
                }
                Err(e) => {
                    error!("Failed to load saved state: {}", e);
                    WizardState::fresh()
                }
            },
            Ok(None) => {
                debug!("No saved state under '{}', starting fresh", key);
                WizardState::fresh()
            }
            Err(e) => {
                error!("Failed to read saved state: {}", e);
                WizardState::fresh()
            }
        }
    }

    /// Bring a restored index back onto a visible, in-range step
    fn settle(&mut self) {
        let index = self.state.current_step;

        if index >= self.model.len() {
            warn!(
                "Saved step index {} is out of range for {} steps, restarting at 0",
                index,
                self.model.len()
            );
            self.state.current_step = 0;
        } else if !self.is_step_visible(index) {
            let settled = self
                .find_next_visible_step(index, Direction::Forward)
                .unwrap_or(0);
            debug!("Saved step {} is hidden, moving to {}", index, settled);
            self.state.current_step = settled;
        }
    }

    fn persist(&self) {
        let blob = match self.state.to_json() {
            Ok(blob) => blob,
            Err(e) => {
                error!("Failed to serialize wizard state: {}", e);
                return;
            }
        };

        if let Err(e) = self.store.set(&self.storage_key, &blob) {
            error!("Failed to save wizard state: {}", e);
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn model(&self) -> &StepModel {
        &self.model
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub fn current_index(&self) -> usize {
        self.state.current_step
    }

    pub fn current_step(&self) -> &StepDefinition {
        // current_step is kept in range by settle/go_to_step/reset
        &self.model.steps()[self.state.current_step]
    }

    pub fn user_path(&self) -> Option<UserPath> {
        self.state.user_path
    }

    /// Bumped on every navigation; renders started under an older epoch are stale
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn set_task(&mut self, task_id: &str, value: bool) {
        self.state.tasks.set(task_id, value);
        self.persist();
        debug!("Task '{}' set to {}", task_id, value);

        self.refresh.schedule(Refresh::Indicator);
        self.refresh.schedule(Refresh::Buttons);
        self.refresh.schedule(Refresh::ChecklistItem {
            task_id: task_id.to_string(),
            checked: value,
        });
    }

    pub fn task(&self, task_id: &str) -> bool {
        self.state.tasks.get(task_id)
    }

    pub fn set_custom_data(&mut self, key: &str, value: Value) {
        self.state.custom_data.insert(key.to_string(), value);
        self.persist();
    }

    pub fn custom_data(&self, key: &str) -> Option<&Value> {
        self.state.custom_data.get(key)
    }

    /// Unknown steps count as complete.
    pub fn is_step_complete(&self, step_id: &str) -> bool {
        self.model
            .find(step_id)
            .map_or(true, |step| step.is_complete(&self.state))
    }

    pub fn is_step_visible(&self, index: usize) -> bool {
        self.model
            .get(index)
            .is_some_and(|step| step.is_visible(&self.state))
    }

    pub fn visible_steps(&self) -> Vec<&StepDefinition> {
        self.model
            .iter()
            .filter(|step| step.is_visible(&self.state))
            .collect()
    }

    pub fn step_status(&self, index: usize) -> StepStatus {
        let current = self.state.current_step;
        if index < current {
            let complete = self
                .model
                .get(index)
                .map_or(true, |step| self.is_step_complete(&step.id));
            if complete {
                StepStatus::Completed
            } else {
                StepStatus::Visited
            }
        } else if index == current {
            StepStatus::Active
        } else {
            StepStatus::Pending
        }
    }

    pub fn can_proceed(&self) -> bool {
        self.current_step().can_proceed(&self.state)
    }

    pub fn is_first_step(&self) -> bool {
        self.state.current_step == 0
    }

    pub fn is_last_step(&self) -> bool {
        self.state.current_step == self.model.last_index()
    }

    /// First visible step strictly after (or before) `from`
    pub fn find_next_visible_step(&self, from: usize, direction: Direction) -> Option<usize> {
        let mut index = from;
        loop {
            index = match direction {
                Direction::Forward => index.checked_add(1)?,
                Direction::Backward => index.checked_sub(1)?,
            };
            if index >= self.model.len() {
                return None;
            }
            if self.is_step_visible(index) {
                return Some(index);
            }
        }
    }

    /// Jump to a visible step. Returns false, leaving state untouched, for
    /// an out-of-range or hidden target.
    pub fn go_to_step(&mut self, index: usize) -> bool {
        if !self.is_step_visible(index) {
            debug!("Ignoring navigation to unavailable step {}", index);
            return false;
        }

        self.state.current_step = index;
        self.epoch += 1;
        self.persist();
        self.refresh.schedule_full();

        info!("Moved to step {} ({})", index, self.current_step().id);
        true
    }

    pub fn next_step<G: ConfirmationGate + ?Sized>(&mut self, gate: &mut G) -> Navigation {
        if !self.can_proceed() && !gate.confirm(Confirmation::IncompleteTasks) {
            debug!("Forward navigation declined at step {}", self.current_index());
            return Navigation::Declined;
        }

        self.move_to_neighbour(Direction::Forward)
    }

    pub fn prev_step(&mut self) -> Navigation {
        self.move_to_neighbour(Direction::Backward)
    }

    fn move_to_neighbour(&mut self, direction: Direction) -> Navigation {
        let from = self.state.current_step;
        match self.find_next_visible_step(from, direction) {
            Some(to) => {
                self.go_to_step(to);
                Navigation::Moved { from, to }
            }
            None => Navigation::Boundary,
        }
    }

    /// Wipe persisted progress after confirmation and start over
    pub fn reset<G: ConfirmationGate + ?Sized>(&mut self, gate: &mut G) -> bool {
        if !gate.confirm(Confirmation::Reset) {
            return false;
        }

        if let Err(e) = self.store.clear(&self.storage_key) {
            error!("Failed to clear saved state: {}", e);
        }

        self.state = WizardState::fresh();
        self.epoch += 1;
        self.settle();
        self.refresh.schedule_full();

        info!("Wizard state reset");
        true
    }

    /// Record the path choice. `Existing` marks the account tasks done and
    /// `New` clears them, every time the path is chosen.
    pub fn select_path(&mut self, path: UserPath) {
        self.state.user_path = Some(path);

        let implied = path == UserPath::Existing;
        for task_id in ACCOUNT_TASKS {
            self.state.tasks.set(task_id, implied);
        }

        // The new path may hide the step the user is on
        let moved = !self.is_step_visible(self.state.current_step);
        if moved {
            let from = self.state.current_step;
            self.settle();
            self.epoch += 1;
            debug!(
                "Step {} is hidden on path '{}', moved to {}",
                from, path, self.state.current_step
            );
        }

        self.persist();
        info!("Selected path '{}'", path);

        self.refresh.schedule(Refresh::PathOptions);
        if moved {
            self.refresh.schedule_full();
        } else {
            self.refresh.schedule(Refresh::Indicator);
            self.refresh.schedule(Refresh::Buttons);
        }
    }

    /// Drain the refresh requested since the last tick
    pub fn take_refresh(&mut self) -> Option<PendingRefresh> {
        self.refresh.take()
    }

    /// Read-only projection of the state for rendering the current step
    pub fn template_context(&self, variables: &BTreeMap<String, String>) -> TemplateContext {
        TemplateContext {
            user_path_new: self.state.user_path == Some(UserPath::New),
            user_path_existing: self.state.user_path == Some(UserPath::Existing),
            tasks: self.state.tasks.as_map().clone(),
            // Welcome and completion steps are not counted
            total_steps: self.visible_steps().len().saturating_sub(2),
            completed_tasks: self.state.tasks.completed_count(),
            variables: variables.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::wizard::AutoConfirm;

    fn wizard() -> Wizard<MemoryStore> {
        Wizard::load(StepModel::onboarding(), MemoryStore::new(), DEFAULT_STORAGE_KEY)
    }

    #[test]
    fn test_fresh_wizard() {
        let wizard = wizard();
        assert_eq!(wizard.current_index(), 0);
        assert_eq!(wizard.user_path(), None);
        assert!(wizard.state().tasks.is_empty());
        assert_eq!(wizard.visible_steps().len(), 6);
        assert!(!wizard.can_proceed());
    }

    #[test]
    fn test_unknown_and_taskless_steps_are_complete() {
        let wizard = wizard();
        assert!(wizard.is_step_complete("no_such_step"));
        assert!(wizard.is_step_complete("attribution"));
        assert!(!wizard.is_step_complete("userpage"));
    }

    #[test]
    fn test_step_status() {
        let mut wizard = wizard();
        wizard.select_path(UserPath::New);
        wizard.set_task("account_created", true);
        assert!(wizard.go_to_step(3));

        assert_eq!(wizard.step_status(0), StepStatus::Completed);
        assert_eq!(wizard.step_status(1), StepStatus::Completed);
        assert_eq!(wizard.step_status(2), StepStatus::Completed);
        assert_eq!(wizard.step_status(3), StepStatus::Active);
        assert_eq!(wizard.step_status(4), StepStatus::Pending);

        assert!(wizard.go_to_step(5));
        assert_eq!(wizard.step_status(3), StepStatus::Visited);
        assert_eq!(wizard.step_status(4), StepStatus::Visited);
    }

    #[test]
    fn test_go_to_step_rejects_invalid_targets() {
        let mut wizard = wizard();
        wizard.select_path(UserPath::Existing);
        let before = wizard.state().clone();
        let epoch = wizard.epoch();

        assert!(!wizard.go_to_step(6));
        assert!(!wizard.go_to_step(usize::MAX));
        assert!(!wizard.go_to_step(1));

        assert_eq!(wizard.state(), &before);
        assert_eq!(wizard.epoch(), epoch);
    }

    #[test]
    fn test_next_step_gate() {
        let mut wizard = wizard();

        let mut asked = Vec::new();
        let mut decline = |request: Confirmation| {
            asked.push(request);
            false
        };
        assert_eq!(wizard.next_step(&mut decline), Navigation::Declined);
        assert_eq!(asked, vec![Confirmation::IncompleteTasks]);
        assert_eq!(wizard.current_index(), 0);

        assert_eq!(
            wizard.next_step(&mut AutoConfirm(true)),
            Navigation::Moved { from: 0, to: 1 }
        );
    }

    #[test]
    fn test_gate_not_consulted_when_step_can_proceed() {
        let mut wizard = wizard();
        wizard.select_path(UserPath::New);

        let mut never = |_: Confirmation| -> bool { panic!("gate should not be asked") };
        assert_eq!(
            wizard.next_step(&mut never),
            Navigation::Moved { from: 0, to: 1 }
        );
    }

    #[test]
    fn test_existing_path_skips_account_step() {
        let mut wizard = wizard();
        wizard.select_path(UserPath::Existing);

        assert_eq!(
            wizard.next_step(&mut AutoConfirm(false)),
            Navigation::Moved { from: 0, to: 2 }
        );
        assert_eq!(wizard.current_step().id, "attribution");

        assert_eq!(wizard.prev_step(), Navigation::Moved { from: 2, to: 0 });
        assert_eq!(wizard.prev_step(), Navigation::Boundary);
    }

    #[test]
    fn test_next_step_at_end_is_boundary() {
        let mut wizard = wizard();
        wizard.select_path(UserPath::Existing);
        assert!(wizard.go_to_step(5));
        assert!(wizard.is_last_step());

        assert_eq!(wizard.next_step(&mut AutoConfirm(true)), Navigation::Boundary);
        assert_eq!(wizard.current_index(), 5);
    }

    #[test]
    fn test_select_path_moves_off_hidden_step() {
        let store = MemoryStore::new();
        let mut wizard = Wizard::load(StepModel::onboarding(), store.clone(), DEFAULT_STORAGE_KEY);
        wizard.select_path(UserPath::New);
        assert_eq!(
            wizard.next_step(&mut AutoConfirm(true)),
            Navigation::Moved { from: 0, to: 1 }
        );
        assert_eq!(wizard.current_step().id, "account");
        wizard.take_refresh();
        let epoch = wizard.epoch();

        wizard.select_path(UserPath::Existing);
        assert_eq!(wizard.current_step().id, "attribution");
        assert!(wizard.is_step_visible(wizard.current_index()));
        assert!(wizard.epoch() > epoch);

        let pending = wizard.take_refresh().unwrap();
        assert!(pending.content);
        assert!(pending.path_options);

        let reopened = Wizard::load(StepModel::onboarding(), store, DEFAULT_STORAGE_KEY);
        assert_eq!(reopened.current_index(), 2);
    }

    #[test]
    fn test_select_path_keeps_visible_step() {
        let mut wizard = wizard();
        wizard.select_path(UserPath::Existing);
        assert!(wizard.go_to_step(2));
        wizard.take_refresh();
        let epoch = wizard.epoch();

        wizard.select_path(UserPath::New);
        assert_eq!(wizard.current_index(), 2);
        assert_eq!(wizard.epoch(), epoch);
        assert!(!wizard.take_refresh().unwrap().content);
    }

    #[test]
    fn test_select_path_overwrites_account_tasks() {
        let mut wizard = wizard();

        wizard.select_path(UserPath::Existing);
        assert!(wizard.task("account_created"));
        assert!(wizard.task("email_verified"));

        wizard.select_path(UserPath::New);
        assert!(!wizard.task("account_created"));
        assert!(!wizard.task("email_verified"));

        wizard.set_task("account_created", true);
        wizard.select_path(UserPath::New);
        assert!(!wizard.task("account_created"));
    }

    #[test]
    fn test_set_task_schedules_coalesced_refresh() {
        let mut wizard = wizard();
        wizard.take_refresh();

        wizard.set_task("userpage_opened", true);
        wizard.set_task("userpage_intro", true);

        let pending = wizard.take_refresh().unwrap();
        assert!(pending.indicator && pending.buttons);
        assert!(!pending.content);
        assert_eq!(pending.checklist.len(), 2);
        assert!(wizard.take_refresh().is_none());
    }

    #[test]
    fn test_reset_requires_confirmation() {
        let mut wizard = wizard();
        wizard.select_path(UserPath::Existing);
        wizard.set_custom_data("username", Value::from("Alice"));

        assert!(!wizard.reset(&mut AutoConfirm(false)));
        assert_eq!(wizard.user_path(), Some(UserPath::Existing));

        assert!(wizard.reset(&mut AutoConfirm(true)));
        assert_eq!(wizard.state(), &WizardState::fresh());
        assert!(wizard.custom_data("username").is_none());
    }

    #[test]
    fn test_template_context_projection() {
        let mut wizard = wizard();
        wizard.select_path(UserPath::Existing);
        wizard.set_task("licensing_read", false);

        let context = wizard.template_context(&BTreeMap::new());
        assert!(context.user_path_existing);
        assert!(!context.user_path_new);
        assert_eq!(context.total_steps, 3);
        assert_eq!(context.completed_tasks, 2);
        assert_eq!(context.tasks.get("licensing_read"), Some(&false));
    }
}
