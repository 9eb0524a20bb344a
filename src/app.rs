//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing and delegates to appropriate command handlers.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;

use crate::commands::{self, ListenOptions};
use crate::logging;
use crate::setup;

/// A terminal microphone visualizer drawing one loudness-reactive waveform line
#[derive(Parser)]
#[command(name = "micwave")]
#[command(version)]
#[command(about = "A terminal microphone visualizer drawing one loudness-reactive waveform line")]
#[command(
    long_about = "A terminal microphone visualizer drawing one loudness-reactive waveform line.\n\nDEFAULT COMMAND:\n    If no command is specified, 'listen' is used by default.\n    Listen options (-d, -s) can be used without explicitly saying 'listen'.\n\nEXAMPLES:\n    # Visualize the default microphone\n    $ micwave\n\n    # Use input device #2 from 'micwave list-devices'\n    $ micwave -d 2\n\n    # React more strongly to quiet input\n    $ micwave listen --sensitivity 4"
)]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/micwave/micwave.toml\n    Logs:               ~/.local/state/micwave/micwave.log.*"
)]
struct Cli {
    /// Input device: "default", an ID from list-devices, or a device name (listen default command)
    #[arg(short, long, value_name = "DEVICE", global = true)]
    device: Option<String>,

    /// Multiplier applied to the mean magnitude before smoothing (listen default command)
    #[arg(short, long, value_name = "FACTOR", global = true)]
    sensitivity: Option<f32>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Visualize the microphone in real time (default)
    ///
    /// Press q, Escape or Ctrl+C to quit.
    #[command(visible_alias = "l")]
    Listen,

    /// Open configuration file in your preferred editor
    ///
    /// Uses $EDITOR environment variable or falls back to nano/vi.
    #[command(visible_alias = "c")]
    Config,

    /// List available audio input devices
    ///
    /// Shows device IDs, names, and configurations to help configure
    /// the correct input device in micwave.toml.
    #[command(name = "list-devices")]
    ListDevices,

    /// Show recent log entries from the application
    ///
    /// Display the last 50 lines of the most recent log file.
    Logs,

    /// Generate shell completion script
    ///
    /// Examples:
    ///   micwave completions bash > micwave.bash
    ///   micwave completions zsh > _micwave
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the main application based on command-line arguments.
///
/// # Errors
/// - If logging initialization fails
/// - If first-run setup fails
/// - If command execution fails
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Commands that need neither logging nor a config file
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "micwave", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::ListDevices) => return commands::handle_list_devices(),
        Some(Commands::Logs) => return commands::handle_logs(),
        _ => {}
    }

    logging::init_logging()?;
    setup::ensure_config()?;

    match cli.command {
        None | Some(Commands::Listen) => {
            commands::handle_listen(ListenOptions {
                device: cli.device,
                sensitivity: cli.sensitivity,
            })
            .await?;
        }
        Some(Commands::Config) => commands::handle_config()?,
        Some(Commands::Completions { .. }) | Some(Commands::ListDevices) | Some(Commands::Logs) => {
            unreachable!("These commands are handled earlier")
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_command_accepts_listen_options() {
        let cli = Cli::try_parse_from(["micwave", "-d", "2", "-s", "3.5"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.device.as_deref(), Some("2"));
        assert_eq!(cli.sensitivity, Some(3.5));
    }

    #[test]
    fn test_listen_alias() {
        let cli = Cli::try_parse_from(["micwave", "l", "--device", "USB Mic"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Listen)));
        assert_eq!(cli.device.as_deref(), Some("USB Mic"));
    }
}
