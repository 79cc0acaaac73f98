// ABOUTME: Main application orchestration for the trailhead CLI
// ABOUTME: Coordinates between CLI arguments, configuration, and command execution

use anyhow::Result;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use super::commands;
use super::{Args, Commands, Config};

pub struct App {
    config: Config,
}

impl App {
    /// Create a new application instance
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Initialize logging based on configuration. Logs go to stderr so
    /// rendered markup on stdout stays clean.
    pub fn init_logging(&self, verbose: bool, no_color: bool) -> Result<()> {
        let log_level = if verbose {
            "debug"
        } else {
            &self.config.logging.level
        };

        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

        match self.config.logging.format.as_str() {
            "compact" => {
                tracing_subscriber::fmt()
                    .compact()
                    .with_env_filter(env_filter)
                    .with_writer(std::io::stderr)
                    .with_ansi(!no_color)
                    .with_target(false)
                    .init();
            }
            _ => {
                tracing_subscriber::fmt()
                    .with_env_filter(env_filter)
                    .with_writer(std::io::stderr)
                    .with_ansi(!no_color)
                    .with_target(false)
                    .init();
            }
        }

        debug!("Logging initialized with level: {}", log_level);
        Ok(())
    }

    /// Run the application with parsed arguments
    pub async fn run(&mut self, args: Args) -> Result<()> {
        self.init_logging(args.verbose, args.no_color)?;

        info!("Starting trailhead v{}", env!("CARGO_PKG_VERSION"));
        debug!("Configuration loaded from: {:?}", args.config);

        let variables = Args::parse_variables(&args.vars)?;
        self.config.merge_variables(variables);

        let config = &self.config;
        match args.command {
            Commands::Status => commands::show_status(config).await,
            Commands::Show => commands::show_step(config).await,
            Commands::Next { yes } => commands::next_step(yes, config).await,
            Commands::Back => commands::previous_step(config).await,
            Commands::Goto { index } => commands::goto_step(index, config).await,
            Commands::Path { path } => commands::choose_path(path, config).await,
            Commands::Task { id, unset } => commands::set_task(id, unset, config).await,
            Commands::Data { key, value } => commands::set_data(key, value, config).await,
            Commands::Reset { yes } => commands::reset(yes, config).await,
            Commands::Components { page } => commands::load_components(page, config).await,
            Commands::Validate { steps, strict } => {
                commands::validate_steps(steps, strict, config).await
            }
        }
    }

    /// Create application from parsed arguments
    pub fn from_args(args: &Args) -> Result<Self> {
        let config = Config::load(args.config.clone())?;
        Ok(Self::new(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_app_creation() {
        let app = App::new(Config::default());
        assert_eq!(app.config().logging.format, "pretty");
    }

    #[test]
    fn test_app_from_args_with_config_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("trailhead.yaml");

        fs::write(
            &config_path,
            r#"
storage_key: onboarding_test
logging:
  level: debug
  format: compact
"#,
        )
        .unwrap();

        let args = <Args as clap::Parser>::try_parse_from([
            "trailhead",
            "--config",
            config_path.to_str().unwrap(),
            "status",
        ])
        .unwrap();
        let app = App::from_args(&args).unwrap();
        assert_eq!(app.config().storage_key, "onboarding_test");
        assert_eq!(app.config().logging.level, "debug");
    }
}
