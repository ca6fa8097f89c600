mod bench;
mod uci;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run a fixed-depth search over the bench suite and report node counts
    Bench {
        #[arg(short, long, default_value_t = 8)]
        depth: usize,
    },
}

fn main() -> anyhow::Result<()> {
    match Cli::parse().command {
        Some(Command::Bench { depth }) => bench::run(depth),
        None => uci::EngineController::new().run(),
    }
}
