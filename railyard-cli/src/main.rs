//! Railyard CLI — keep a train of dependent branches merged, pushed, and
//! mirrored as linked GitHub pull requests.

mod commands;
mod error;
mod prompt;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::RunArgs;

/// Railyard: manage chains of dependent feature branches
#[derive(Parser, Debug)]
#[command(name = "railyard")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    run: RunArgs,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(err) = cli.run.execute().await {
        eprintln!("An error occurred. Was there a conflict, perhaps?");
        eprintln!("error: {}", err);
        std::process::exit(err.exit_code());
    }
}
