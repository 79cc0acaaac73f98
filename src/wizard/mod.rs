// ABOUTME: Wizard state machine module for trailhead
// ABOUTME: Exports the persisted state, task registry, navigation, confirmation and refresh types

pub mod confirm;
pub mod machine;
pub mod refresh;
pub mod state;

pub use confirm::{AutoConfirm, Confirmation, ConfirmationGate};
pub use machine::{
    Direction, Navigation, StepStatus, Wizard, ACCOUNT_TASKS, DEFAULT_STORAGE_KEY,
};
pub use refresh::{PendingRefresh, Refresh, RefreshScheduler};
pub use state::{TaskRegistry, WizardState};
