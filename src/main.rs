// llm - command-line client for OpenAI-compatible endpoints
// Main entry point

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use llm::cli::{print_logs, run_model, Cli, Command};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Model(args) => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            run_model(&args, std::io::stdin().lock(), &mut out)
                .await
                .with_context(|| format!("Failed to run model '{}'", args.model_id))?;
        }
        Command::Logs(args) => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            print_logs(&args, &mut out).context("Failed to print logs")?;
        }
    }

    Ok(())
}

/// Diagnostics go to stderr so stdout carries only the answer or transcript.
/// `RUST_LOG` overrides the verbosity flag.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
