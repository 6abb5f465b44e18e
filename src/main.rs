use anyhow::Result;
use blockgen_core::cli::Args;
use clap::Parser;

fn main() -> Result<()> {
    let args = Args::parse();
    blockgen_core::run_cli(&args)
}
