use anyhow::Result;
use asset_loader::app;
use asset_loader::cli::Cli;
use clap::Parser;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    app::run(&cli)
}
