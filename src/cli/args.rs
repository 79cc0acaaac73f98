// ABOUTME: Command line argument definitions and parsing using Clap
// ABOUTME: Defines the main CLI structure and subcommands for trailhead

use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "trailhead")]
#[command(about = "A resumable onboarding wizard driven by declarative HTML step templates")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Path to configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Disable colored output")]
    pub no_color: bool,

    #[arg(long = "var", global = true, help = "Extra template variables (key=value)")]
    pub vars: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the step indicator, current step and navigation buttons
    Status,

    /// Render the current step's template to stdout
    Show,

    /// Move to the next visible step
    Next {
        #[arg(short, long, help = "Continue without confirming incomplete tasks")]
        yes: bool,
    },

    /// Move to the previous visible step
    Back,

    /// Jump to a step by index
    Goto {
        #[arg(help = "Zero-based step index")]
        index: usize,
    },

    /// Choose the onboarding path (new or existing)
    Path {
        #[arg(help = "new or existing")]
        path: String,
    },

    /// Mark a task complete, or incomplete with --unset
    Task {
        #[arg(help = "Task identifier")]
        id: String,

        #[arg(long, help = "Mark the task as not done")]
        unset: bool,
    },

    /// Store a custom data value
    Data {
        #[arg(help = "Data key")]
        key: String,

        #[arg(help = "JSON value; plain text is stored as a string")]
        value: String,
    },

    /// Discard all progress and start over
    Reset {
        #[arg(short, long, help = "Skip the confirmation prompt")]
        yes: bool,
    },

    /// Resolve data-component placeholders in an HTML page
    Components {
        #[arg(help = "Path to the HTML page")]
        page: PathBuf,
    },

    /// Validate a step model file
    Validate {
        #[arg(help = "Path to steps YAML file; the configured model when omitted")]
        steps: Option<PathBuf>,

        #[arg(long, help = "Treat warnings as errors")]
        strict: bool,
    },
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parse variables from key=value format
    pub fn parse_variables(vars: &[String]) -> anyhow::Result<BTreeMap<String, String>> {
        let mut variables = BTreeMap::new();

        for var in vars {
            if let Some((key, value)) = var.split_once('=') {
                variables.insert(key.to_string(), value.to_string());
            } else {
                return Err(anyhow::anyhow!(
                    "Invalid variable format '{}'. Expected 'key=value'",
                    var
                ));
            }
        }

        Ok(variables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_variables() {
        let vars = vec![
            "event=Eurovision 2025".to_string(),
            "contact=a=b".to_string(),
        ];

        let parsed = Args::parse_variables(&vars).unwrap();

        assert_eq!(parsed.get("event"), Some(&"Eurovision 2025".to_string()));
        assert_eq!(parsed.get("contact"), Some(&"a=b".to_string()));
    }

    #[test]
    fn test_parse_variables_invalid() {
        let vars = vec!["invalid_format".to_string()];
        let result = Args::parse_variables(&vars);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_subcommands() {
        let args = Args::try_parse_from(["trailhead", "next", "--yes"]).unwrap();
        assert!(matches!(args.command, Commands::Next { yes: true }));

        let args = Args::try_parse_from(["trailhead", "--verbose", "task", "photo_uploaded", "--unset"])
            .unwrap();
        assert!(args.verbose);
        assert!(matches!(args.command, Commands::Task { unset: true, .. }));

        assert!(Args::try_parse_from(["trailhead", "goto", "two"]).is_err());
    }
}
