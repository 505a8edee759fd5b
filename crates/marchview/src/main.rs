mod cli;
mod paths;
mod run;

use clap::Parser;

fn main() -> anyhow::Result<()> {
    run::run(cli::Cli::parse())
}
