//! CLI entry point for photomosaic generation

use clap::Parser;
use photomosaic::io::cli::{Cli, FileProcessor};

fn main() -> photomosaic::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let mut processor = FileProcessor::new(cli);
    processor.process()
}
