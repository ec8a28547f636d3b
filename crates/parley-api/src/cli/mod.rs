//! CLI command definitions for the `parley` binary.
//!
//! Uses clap derive macros for argument parsing. Each invocation is one
//! request: session state such as the active mode is passed explicitly.

pub mod ask;
pub mod balance;
pub mod modes;
pub mod providers;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use parley_types::llm::ProviderId;

/// Ask one or more LLM providers and get a single merged reply.
#[derive(Parser)]
#[command(name = "parley", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug, -vvv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true, env = "PARLEY_OTEL")]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask a single chat provider.
    Ask {
        /// The prompt to send.
        prompt: String,

        /// Provider to ask (openai, anthropic).
        #[arg(short, long, default_value = "openai")]
        provider: ProviderId,

        #[command(flatten)]
        request: RequestArgs,
    },

    /// Ask every chat provider at once and show the answers side by side.
    Compare {
        /// The prompt to send.
        prompt: String,

        #[command(flatten)]
        request: RequestArgs,
    },

    /// Generate an image from a text prompt.
    Image {
        /// Description of the image.
        prompt: String,

        /// Conversation owner recorded in the history log.
        #[arg(long, default_value = "cli", env = "PARLEY_USER")]
        user: String,
    },

    /// List available chat modes.
    Modes,

    /// Show usage and estimated spend per provider.
    Balance,

    /// Show configured providers and models.
    Providers,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Options shared by chat requests.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct RequestArgs {
    /// Chat mode to apply (see `parley modes`). `reset` or `none` clears it.
    #[arg(short, long)]
    pub mode: Option<String>,

    /// Image file to attach to the prompt.
    #[arg(short, long)]
    pub attach: Option<PathBuf>,

    /// Conversation owner recorded in the history log.
    #[arg(long, default_value = "cli", env = "PARLEY_USER")]
    pub user: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ask_with_provider_alias() {
        let cli = Cli::try_parse_from(["parley", "ask", "hello", "-p", "claude", "--mode", "pirate"])
            .unwrap();
        match cli.command {
            Commands::Ask {
                prompt,
                provider,
                request,
            } => {
                assert_eq!(prompt, "hello");
                assert_eq!(provider, ProviderId::Anthropic);
                assert_eq!(request.mode.as_deref(), Some("pirate"));
                assert!(request.attach.is_none());
            }
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn test_parse_compare_with_attachment_and_global_json() {
        let cli = Cli::try_parse_from(["parley", "compare", "what is this?", "-a", "cat.png", "--json"])
            .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Compare { request, .. } => {
                assert_eq!(request.attach, Some(PathBuf::from("cat.png")));
            }
            _ => panic!("expected compare"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_provider() {
        assert!(Cli::try_parse_from(["parley", "ask", "hi", "-p", "gemini"]).is_err());
    }
}
