//! Init command

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use anchorlog_core::config::{
    default_config_toml, load_config, DEFAULT_CONFIG_TEMPLATE, DEFAULT_CONFIG_TOML,
    DEFAULT_CONFIG_YAML,
};

use crate::cli::{output, Cli, OutputFormat};

/// Write a default configuration file
#[derive(Debug, Args)]
pub struct InitCommand {
    /// Force overwrite existing configuration
    #[arg(short, long)]
    pub force: bool,

    /// Write TOML instead of YAML
    #[arg(long)]
    pub toml: bool,

    /// Output file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl InitCommand {
    /// Execute the init command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(force = self.force, toml = self.toml, "executing init command");
        let cwd = std::env::current_dir()?;
        let default_name = if self.toml {
            DEFAULT_CONFIG_TOML
        } else {
            DEFAULT_CONFIG_YAML
        };
        let config_path = cwd.join(self.output.clone().unwrap_or_else(|| default_name.into()));

        if config_path.exists() && !self.force {
            anyhow::bail!(
                "Configuration file already exists at {}. Use --force to overwrite.",
                config_path.display()
            );
        }

        let content = if self.toml {
            default_config_toml()
        } else {
            DEFAULT_CONFIG_TEMPLATE.to_string()
        };
        std::fs::write(&config_path, &content)?;

        // Whatever was written must load back
        load_config(&config_path)?;

        match cli.format {
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({ "config": config_path.display().to_string() })
                );
            }
            OutputFormat::Text if cli.quiet => {}
            OutputFormat::Text => {
                output::success(&format!(
                    "Created configuration at {}",
                    output::path_style().apply_to(config_path.display())
                ));
                println!();
                println!("Next steps:");
                println!("  1. Edit {} to match your project", config_path.display());
                println!(
                    "  2. Run {} to update the changelog",
                    output::path_style().apply_to("anchorlog generate --release-version <VERSION>")
                );
            }
        }

        Ok(())
    }
}
