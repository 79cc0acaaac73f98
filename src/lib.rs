// ABOUTME: Main library module for the trailhead onboarding wizard
// ABOUTME: Exports all core modules and provides the public API

pub mod cli;
pub mod steps;
pub mod storage;
pub mod template;
pub mod view;
pub mod wizard;

// Re-export commonly used types
pub use cli::{App, Args, Config};
pub use steps::{StepDefinition, StepModel, StepValidator, UserPath};
pub use storage::{FileStore, MemoryStore, StateStore};
pub use template::{TemplateContext, TemplateEngine};
pub use view::{StepIndicator, StepRenderer};
pub use wizard::{Wizard, WizardState};

// Error handling
pub type Result<T> = anyhow::Result<T>;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
