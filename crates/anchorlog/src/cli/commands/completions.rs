//! Shell completions generation command

use std::io;
use std::path::PathBuf;

use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};
use tracing::info;

use crate::cli::{output, Cli};

const BIN_NAME: &str = "anchorlog";

/// Generate shell completions
#[derive(Debug, Args)]
pub struct CompletionsCommand {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,

    /// Output to file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl CompletionsCommand {
    /// Execute the completions command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(shell = ?self.shell, "executing completions command");
        let mut cmd = Cli::command();

        match &self.output {
            Some(output_path) => {
                let mut file = std::fs::File::create(output_path)?;
                generate(self.shell, &mut cmd, BIN_NAME, &mut file);

                if !cli.quiet {
                    output::success(&format!(
                        "Completions written to {}",
                        output::path_style().apply_to(output_path.display())
                    ));
                }
            }
            None => generate(self.shell, &mut cmd, BIN_NAME, &mut io::stdout()),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_completions_written_to_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("anchorlog.bash");
        let cli = Cli::try_parse_from([
            "anchorlog",
            "-q",
            "completions",
            "bash",
            "--output",
            path.to_str().unwrap(),
        ])
        .unwrap();
        cli.execute().unwrap();

        let script = std::fs::read_to_string(&path).unwrap();
        assert!(script.contains("anchorlog"));
        assert!(script.contains("generate"));
    }

    #[test]
    fn test_shell_names_parse() {
        for shell in ["bash", "zsh", "fish", "powershell", "elvish"] {
            let cli = Cli::try_parse_from(["anchorlog", "completions", shell]).unwrap();
            assert!(matches!(cli.command, crate::cli::Commands::Completions(_)));
        }
    }
}
