// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Command-line entry point.

use clap::Parser;

use yolo_stream::cli::args::{Cli, Commands};
use yolo_stream::cli::detect::run_detection;

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Detect(args) => run_detection(&args),
    }
}
