use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use cs_cli::{run_check, run_play};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "chatscript-player")]
#[command(about = "ChatScript scene player CLI")]
struct Cli {
    #[command(subcommand)]
    command: Mode,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// Play a chat script in the terminal, resolving choices from stdin.
    Play(PlayArgs),
    /// Parse a chat script and report the first syntax error, if any.
    Check(CheckArgs),
}

#[derive(Debug, Args)]
struct PlayArgs {
    script: PathBuf,
    /// Pacing pause after each text or image bubble, in milliseconds.
    #[arg(long = "settle-delay-ms")]
    settle_delay_ms: Option<u64>,
}

#[derive(Debug, Args)]
struct CheckArgs {
    script: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("{error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    match cli.command {
        Mode::Play(args) => {
            run_play(
                &args.script,
                args.settle_delay_ms.map(Duration::from_millis),
            )
            .await
        }
        Mode::Check(args) => run_check(&args.script),
    }
}
