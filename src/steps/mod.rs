// ABOUTME: Step model module for the trailhead wizard
// ABOUTME: Exports step definitions, declarative predicates, model loading and validation

pub mod definition;
pub mod error;
pub mod model;
pub mod validation;

pub use definition::{ProceedGate, StepDefinition, UserPath, Visibility};
pub use error::{Result, StepError, ValidationError};
pub use model::{StepList, StepModel};
pub use validation::{StepValidator, ValidationReport};
