// ABOUTME: Template directive engine module for trailhead
// ABOUTME: Loads HTML templates and materializes data-* directives against a data context

pub mod context;
pub mod directives;
pub mod dom;
pub mod engine;
pub mod error;
pub mod source;

pub use context::TemplateContext;
pub use engine::{TemplateEngine, DEFAULT_COMPONENT_DIR, DEFAULT_TEMPLATE_DIR};
pub use error::{Result, TemplateError};
pub use source::{source_for, FileSource, HttpSource, TemplateSource};
