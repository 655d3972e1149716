//! storyloom - story-handler runtime for live chat stories
//!
//! Usage:
//!   storyloom handlers list                      List registered handlers
//!   storyloom prompt --story s1 "hello"          Render the prompt for an input
//!   storyloom turn --story s1 --response '...'   Run and save a scripted turn
//!   storyloom history s1                         Show recent messages
//!   storyloom --help                             Show all commands

use anyhow::Result;
use clap::Parser;

use storyloom::cli::output::OutputMode;
use storyloom::cli::Cli;
use storyloom::init::AppContext;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Tracing to stderr so stdout stays parseable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("storyloom=info".parse()?),
        )
        .init();

    let mode = OutputMode::from_flags(cli.json, cli.md);

    let ctx = AppContext::new(cli.data_path.clone()).await?;
    storyloom::cli::execute(&cli.command, &ctx, mode).await?;

    Ok(())
}
