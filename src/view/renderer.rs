// ABOUTME: Renders the current wizard step through the template engine
// ABOUTME: Tags every render with step and navigation epoch so stale results can be dropped

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error};

use crate::storage::StateStore;
use crate::template::{TemplateContext, TemplateEngine, DEFAULT_TEMPLATE_DIR};
use crate::wizard::Wizard;

pub const LOAD_ERROR_MARKUP: &str =
    "<p>Error loading step content. Please refresh the page.</p>";

/// Everything needed to render one step, captured before the async load.
#[derive(Debug, Clone)]
pub struct RenderTicket {
    pub step_index: usize,
    pub epoch: u64,
    pub template: String,
    pub context: TemplateContext,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedStep {
    pub step_index: usize,
    pub epoch: u64,
    pub html: String,
    /// The template failed to load or render and `html` is the error notice
    pub failed: bool,
}

pub struct StepRenderer {
    engine: Arc<TemplateEngine>,
    directory: String,
    variables: BTreeMap<String, String>,
}

impl StepRenderer {
    pub fn new(engine: Arc<TemplateEngine>) -> Self {
        Self {
            engine,
            directory: DEFAULT_TEMPLATE_DIR.to_string(),
            variables: BTreeMap::new(),
        }
    }

    pub fn with_directory(mut self, directory: impl Into<String>) -> Self {
        self.directory = directory.into();
        self
    }

    pub fn with_variables(mut self, variables: BTreeMap<String, String>) -> Self {
        self.variables = variables;
        self
    }

    pub fn engine(&self) -> &TemplateEngine {
        &self.engine
    }

    pub fn begin<S: StateStore>(&self, wizard: &Wizard<S>) -> RenderTicket {
        RenderTicket {
            step_index: wizard.current_index(),
            epoch: wizard.epoch(),
            template: wizard.current_step().template.clone(),
            context: wizard.template_context(&self.variables),
        }
    }

    /// Load and render a ticket. Failures are logged and replaced by the
    /// error notice; this never fails.
    pub async fn render(&self, ticket: RenderTicket) -> RenderedStep {
        let result = self
            .engine
            .load_and_render(&ticket.template, &self.directory, &ticket.context)
            .await;

        let (html, failed) = match result {
            Ok(html) => (html, false),
            Err(e) => {
                error!("Failed to render step {}: {}", ticket.step_index, e);
                (LOAD_ERROR_MARKUP.to_string(), true)
            }
        };

        RenderedStep {
            step_index: ticket.step_index,
            epoch: ticket.epoch,
            html,
            failed,
        }
    }

    /// Whether a finished render still matches where the wizard is
    pub fn accepts<S: StateStore>(&self, wizard: &Wizard<S>, rendered: &RenderedStep) -> bool {
        let current = rendered.step_index == wizard.current_index() && rendered.epoch == wizard.epoch();
        if !current {
            debug!(
                "Discarding stale render of step {} (epoch {}, now step {} epoch {})",
                rendered.step_index,
                rendered.epoch,
                wizard.current_index(),
                wizard.epoch()
            );
        }
        current
    }

    pub async fn render_current<S: StateStore>(&self, wizard: &Wizard<S>) -> RenderedStep {
        let ticket = self.begin(wizard);
        self.render(ticket).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::{StepModel, UserPath};
    use crate::storage::MemoryStore;
    use crate::template::FileSource;
    use crate::wizard::{AutoConfirm, DEFAULT_STORAGE_KEY};
    use std::path::Path;
    use tempfile::{tempdir, TempDir};

    fn write(root: &Path, path: &str, content: &str) {
        let full = root.join(path);
        std::fs::create_dir_all(full.parent().unwrap()).unwrap();
        std::fs::write(full, content).unwrap();
    }

    fn renderer() -> (TempDir, StepRenderer) {
        let temp_dir = tempdir().unwrap();
        write(
            temp_dir.path(),
            "templates/welcome.html",
            r#"<p data-if="userPath_new">New here</p><p data-if="userPath_existing">Welcome back</p>"#,
        );
        write(
            temp_dir.path(),
            "templates/attribution.html",
            r#"<h2>Attribution for <span data-text="event">an event</span></h2>"#,
        );
        let engine = TemplateEngine::new(Arc::new(FileSource::new(temp_dir.path())));
        let mut variables = BTreeMap::new();
        variables.insert("event".to_string(), "Eurovision".to_string());
        let renderer = StepRenderer::new(Arc::new(engine)).with_variables(variables);
        (temp_dir, renderer)
    }

    fn wizard() -> Wizard<MemoryStore> {
        Wizard::load(StepModel::onboarding(), MemoryStore::new(), DEFAULT_STORAGE_KEY)
    }

    #[tokio::test]
    async fn test_render_current_step() {
        let (_temp_dir, renderer) = renderer();
        let mut wizard = wizard();
        wizard.select_path(UserPath::Existing);

        let rendered = renderer.render_current(&wizard).await;
        assert!(!rendered.failed);
        assert_eq!(rendered.html, "<p>Welcome back</p>");
        assert!(renderer.accepts(&wizard, &rendered));

        wizard.next_step(&mut AutoConfirm(true));
        let rendered = renderer.render_current(&wizard).await;
        assert_eq!(rendered.html, "<h2>Attribution for <span>Eurovision</span></h2>");
    }

    #[tokio::test]
    async fn test_missing_template_renders_error_notice() {
        let (_temp_dir, renderer) = renderer();
        let mut wizard = wizard();
        wizard.select_path(UserPath::New);
        wizard.next_step(&mut AutoConfirm(true));
        assert_eq!(wizard.current_step().id, "account");

        let rendered = renderer.render_current(&wizard).await;
        assert!(rendered.failed);
        assert_eq!(rendered.html, LOAD_ERROR_MARKUP);
    }

    #[tokio::test]
    async fn test_stale_render_is_rejected() {
        let (_temp_dir, renderer) = renderer();
        let mut wizard = wizard();
        wizard.select_path(UserPath::Existing);

        let ticket = renderer.begin(&wizard);
        wizard.next_step(&mut AutoConfirm(true));
        let rendered = renderer.render(ticket).await;
        assert!(!renderer.accepts(&wizard, &rendered));

        // Navigating away and back still invalidates the older render
        let ticket = renderer.begin(&wizard);
        wizard.prev_step();
        wizard.next_step(&mut AutoConfirm(true));
        let rendered = renderer.render(ticket).await;
        assert_eq!(rendered.step_index, wizard.current_index());
        assert!(!renderer.accepts(&wizard, &rendered));
    }
}
