//! Parley CLI entry point.
//!
//! Binary name: `parley`
//!
//! Parses CLI arguments, installs tracing, loads configuration and wires the
//! dispatch orchestrator, then runs the selected command.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    parley_observe::tracing_setup::init_tracing(cli.verbose, cli.quiet, cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;

    parley_observe::tracing_setup::shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "parley", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init().await?;

    match cli.command {
        Commands::Ask {
            prompt,
            provider,
            request,
        } => {
            cli::ask::ask(&state, prompt, provider, &request, cli.json).await?;
        }

        Commands::Compare { prompt, request } => {
            cli::ask::compare(&state, prompt, &request, cli.json).await?;
        }

        Commands::Image { prompt, user } => {
            cli::ask::image(&state, prompt, &user, cli.json).await?;
        }

        Commands::Modes => {
            cli::modes::list_modes(&state, cli.json)?;
        }

        Commands::Balance => {
            cli::balance::balance(&state, cli.json).await?;
        }

        Commands::Providers => {
            cli::providers::list_providers(&state, cli.json)?;
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}
