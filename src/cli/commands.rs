// ABOUTME: Command implementations for the trailhead CLI
// ABOUTME: Opens the persisted wizard, applies one action and prints the refreshed view

use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

use super::config::Config;
use crate::steps::{StepList, StepModel, StepValidator, UserPath};
use crate::storage::FileStore;
use crate::template::{source_for, TemplateEngine};
use crate::view::{path_options, NavigationButtons, StepIndicator, StepRenderer};
use crate::wizard::{AutoConfirm, Confirmation, ConfirmationGate, Navigation, Wizard};

/// Asks on stderr and reads a y/N answer from stdin
pub struct PromptGate;

impl ConfirmationGate for PromptGate {
    fn confirm(&mut self, request: Confirmation) -> bool {
        let mut stderr = io::stderr();
        if write!(stderr, "{} [y/N] ", request.message()).is_err() || stderr.flush().is_err() {
            return false;
        }

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

fn gate_for(yes: bool) -> Box<dyn ConfirmationGate> {
    if yes {
        Box::new(AutoConfirm(true))
    } else {
        Box::new(PromptGate)
    }
}

/// A wizard opened from its persisted state plus the renderer for its steps
pub struct Session {
    pub wizard: Wizard<FileStore>,
    pub renderer: StepRenderer,
}

impl Session {
    pub async fn open(config: &Config) -> Result<Self> {
        let model = load_model(config.steps_file.as_deref()).await?;
        let store = FileStore::new(&config.state_dir);
        debug!("Using state directory {}", config.state_dir.display());

        let mut wizard = Wizard::load(model, store, config.storage_key.clone());
        // The initial full refresh is for interactive views
        wizard.take_refresh();

        let engine = build_engine(config)?;
        let renderer = StepRenderer::new(Arc::new(engine))
            .with_directory(config.templates.directory.clone())
            .with_variables(config.template_vars.clone());

        Ok(Self { wizard, renderer })
    }

    /// Print whatever the last action asked to repaint
    pub async fn print_refresh(&mut self) -> Result<()> {
        let Some(pending) = self.wizard.take_refresh() else {
            return Ok(());
        };

        if pending.path_options {
            for option in path_options(&self.wizard) {
                let mark = if option.selected { "x" } else { " " };
                println!("({}) {}", mark, option.path);
            }
        }

        for (task_id, checked) in &pending.checklist {
            let mark = if *checked { "x" } else { " " };
            println!("[{}] {}", mark, task_id);
        }

        if pending.indicator {
            println!("{}", StepIndicator::from_wizard(&self.wizard).to_line());
        }

        if pending.content {
            println!("{}", step_heading(&self.wizard));
        }

        if pending.buttons {
            println!("{}", buttons_line(&NavigationButtons::from_wizard(&self.wizard)));
        }

        Ok(())
    }
}

async fn load_model(steps_file: Option<&Path>) -> Result<StepModel> {
    match steps_file {
        Some(path) => StepModel::from_file(path)
            .await
            .map_err(|e| anyhow!("Failed to load steps from {}: {}", path.display(), e)),
        None => Ok(StepModel::onboarding()),
    }
}

fn build_engine(config: &Config) -> Result<TemplateEngine> {
    let source = source_for(&config.templates.root)
        .map_err(|e| anyhow!("Invalid template root: {}", e))?;
    Ok(TemplateEngine::new(Arc::from(source)).with_base_path(config.templates.base.clone()))
}

fn step_heading(wizard: &Wizard<FileStore>) -> String {
    let visible = wizard.visible_steps();
    let step = wizard.current_step();
    let position = visible
        .iter()
        .position(|visible_step| visible_step.id == step.id)
        .map_or(wizard.current_index() + 1, |position| position + 1);
    format!("Step {} of {}: {}", position, visible.len(), step.title)
}

fn buttons_line(buttons: &NavigationButtons) -> String {
    let back = if buttons.back_disabled { "(Back)" } else { "[Back]" };
    let next = if buttons.next_disabled {
        format!("({})", buttons.next_label)
    } else {
        format!("[{}]", buttons.next_label)
    };
    format!("{} {}", back, next)
}

/// Show indicator, current step, its tasks and the navigation buttons
pub async fn show_status(config: &Config) -> Result<()> {
    let session = Session::open(config).await?;
    let wizard = &session.wizard;

    println!("{}", StepIndicator::from_wizard(wizard).to_line());
    println!("{}", step_heading(wizard));

    if let Some(path) = wizard.user_path() {
        println!("  Path: {}", path);
    }

    let step = wizard.current_step();
    for task_id in &step.required_tasks {
        let mark = if wizard.task(task_id) { "x" } else { " " };
        println!("  [{}] {}", mark, task_id);
    }
    if !wizard.can_proceed() {
        println!("  Some recommended tasks are not completed.");
    }

    println!("{}", buttons_line(&NavigationButtons::from_wizard(wizard)));
    Ok(())
}

/// Render the current step's markup to stdout
pub async fn show_step(config: &Config) -> Result<()> {
    let session = Session::open(config).await?;
    let rendered = session.renderer.render_current(&session.wizard).await;

    if session.renderer.accepts(&session.wizard, &rendered) {
        println!("{}", rendered.html);
    }
    Ok(())
}

pub async fn next_step(yes: bool, config: &Config) -> Result<()> {
    let mut session = Session::open(config).await?;
    let mut gate = gate_for(yes);

    match session.wizard.next_step(&mut *gate) {
        Navigation::Moved { from, to } => {
            info!("Advanced from step {} to {}", from, to);
            session.print_refresh().await
        }
        Navigation::Declined => {
            println!("Staying on {}", step_heading(&session.wizard));
            Ok(())
        }
        Navigation::Boundary => {
            println!("Already at the last step");
            Ok(())
        }
    }
}

pub async fn previous_step(config: &Config) -> Result<()> {
    let mut session = Session::open(config).await?;

    match session.wizard.prev_step() {
        Navigation::Moved { .. } => session.print_refresh().await,
        _ => {
            println!("Already at the first step");
            Ok(())
        }
    }
}

pub async fn goto_step(index: usize, config: &Config) -> Result<()> {
    let mut session = Session::open(config).await?;

    if !session.wizard.go_to_step(index) {
        return Err(anyhow!("Step {} is not available", index));
    }
    session.print_refresh().await
}

pub async fn choose_path(path: String, config: &Config) -> Result<()> {
    let path = UserPath::from_str(&path)?;
    let mut session = Session::open(config).await?;

    session.wizard.select_path(path);
    session.print_refresh().await
}

pub async fn set_task(id: String, unset: bool, config: &Config) -> Result<()> {
    let mut session = Session::open(config).await?;

    session.wizard.set_task(&id, !unset);
    session.print_refresh().await
}

pub async fn set_data(key: String, value: String, config: &Config) -> Result<()> {
    let mut session = Session::open(config).await?;

    let value = serde_json::from_str(&value).unwrap_or(Value::String(value));
    session.wizard.set_custom_data(&key, value.clone());
    println!("{} = {}", key, value);
    Ok(())
}

pub async fn reset(yes: bool, config: &Config) -> Result<()> {
    let mut session = Session::open(config).await?;
    let mut gate = gate_for(yes);

    if session.wizard.reset(&mut *gate) {
        println!("Progress cleared");
        session.print_refresh().await
    } else {
        println!("Reset cancelled");
        Ok(())
    }
}

/// Resolve data-component placeholders in a page and print the result
pub async fn load_components(page: PathBuf, config: &Config) -> Result<()> {
    let markup = tokio::fs::read_to_string(&page)
        .await
        .with_context(|| format!("Failed to read page {}", page.display()))?;

    let engine = build_engine(config)?;
    let html = engine
        .load_components(&markup)
        .await
        .map_err(|e| anyhow!("Failed to resolve components: {}", e))?;

    println!("{}", html);
    Ok(())
}

/// Validate a step model file
pub async fn validate_steps(steps: Option<PathBuf>, strict: bool, config: &Config) -> Result<()> {
    let (model, origin) = match steps.or_else(|| config.steps_file.clone()) {
        Some(path) => {
            let content = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let list: StepList = serde_yaml::from_str(&content)
                .map_err(|e| anyhow!("Failed to parse {}: {}", path.display(), e))?;
            (StepModel::unchecked(list.steps), path.display().to_string())
        }
        None => (StepModel::onboarding(), "built-in onboarding".to_string()),
    };

    info!("Validating step model: {}", origin);
    let report = StepValidator::new().with_strict_mode(strict).validate(&model);

    if report.has_warnings() {
        for warning in &report.warnings {
            println!("  warning: {}", warning);
        }
    }

    if report.has_errors() {
        for error in &report.errors {
            println!("  error: {}", error);
        }
    }

    if !report.is_valid {
        return Err(anyhow!("Step model '{}' is invalid", origin));
    }

    println!("✓ Step model '{}' is valid", origin);
    println!("  Steps: {}", model.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn config_in(dir: &Path) -> Config {
        Config {
            state_dir: dir.join("state"),
            ..Config::default()
        }
    }

    #[test]
    fn test_buttons_line() {
        let buttons = NavigationButtons {
            back_disabled: true,
            next_label: "Next",
            next_disabled: false,
        };
        assert_eq!(buttons_line(&buttons), "(Back) [Next]");
    }

    #[tokio::test]
    async fn test_session_persists_between_opens() {
        let temp_dir = tempdir().unwrap();
        let config = config_in(temp_dir.path());

        choose_path("existing".to_string(), &config).await.unwrap();
        next_step(true, &config).await.unwrap();

        let session = Session::open(&config).await.unwrap();
        assert_eq!(session.wizard.current_step().id, "attribution");
        assert!(session.wizard.task("account_created"));
    }

    #[tokio::test]
    async fn test_goto_hidden_step_fails() {
        let temp_dir = tempdir().unwrap();
        let config = config_in(temp_dir.path());

        choose_path("existing".to_string(), &config).await.unwrap();
        assert!(goto_step(1, &config).await.is_err());
        assert!(goto_step(99, &config).await.is_err());
    }

    #[tokio::test]
    async fn test_set_data_accepts_plain_text() {
        let temp_dir = tempdir().unwrap();
        let config = config_in(temp_dir.path());

        set_data("event".to_string(), "Eurovision".to_string(), &config)
            .await
            .unwrap();
        set_data("year".to_string(), "2025".to_string(), &config)
            .await
            .unwrap();

        let session = Session::open(&config).await.unwrap();
        assert_eq!(session.wizard.custom_data("event"), Some(&Value::from("Eurovision")));
        assert_eq!(session.wizard.custom_data("year"), Some(&Value::from(2025)));
    }

    #[tokio::test]
    async fn test_validate_rejects_bad_model() {
        let temp_dir = tempdir().unwrap();
        let config = config_in(temp_dir.path());
        let steps = temp_dir.path().join("steps.yaml");
        std::fs::write(
            &steps,
            "steps:\n  - id: only\n    title: Only\n    short_label: Only\n    template: only\n",
        )
        .unwrap();

        // A single gated step cannot be the proceedable last step
        assert!(validate_steps(Some(steps), false, &config).await.is_err());
        assert!(validate_steps(None, false, &config).await.is_ok());
    }

    #[tokio::test]
    async fn test_validate_reports_empty_model() {
        let temp_dir = tempdir().unwrap();
        let config = config_in(temp_dir.path());
        let steps = temp_dir.path().join("empty.yaml");
        std::fs::write(&steps, "steps: []\n").unwrap();

        let err = validate_steps(Some(steps), false, &config).await.unwrap_err();
        assert!(err.to_string().contains("is invalid"));
    }
}
