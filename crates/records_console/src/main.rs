use clap::Parser;
use records_console::app;
use records_console::cli::Cli;

fn main() -> anyhow::Result<()> {
    app::run(Cli::parse())
}
