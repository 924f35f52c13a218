//! CLI for osentropy: pull, probe and sanity-check OS randomness.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "osentropy")]
#[command(about = "osentropy: OS-backed randomness, strong or weak, or a clear failure")]
#[command(version = osentropy_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write OS random bytes to stdout
    Fill {
        /// Number of bytes to produce
        #[arg(long, default_value = "32")]
        bytes: usize,

        /// Wait for the OS generator to be seeded (may block at early boot)
        #[arg(long)]
        strong: bool,

        /// Output format
        #[arg(long, default_value = "hex", value_parser = ["raw", "hex"])]
        format: String,
    },

    /// Try each platform channel on its own, for both strengths
    Probe {
        /// Bytes requested from each channel
        #[arg(long, default_value = "64")]
        bytes: usize,

        /// Skip strong requests (they block on an unseeded host)
        #[arg(long)]
        weak_only: bool,
    },

    /// Fill a large buffer and run the statistical smoke battery on it
    Check {
        /// Number of bytes to test
        #[arg(long, default_value = "1048576")]
        bytes: usize,

        /// Test strong output instead of weak
        #[arg(long)]
        strong: bool,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fill {
            bytes,
            strong,
            format,
        } => commands::fill::run(bytes, strong, &format),
        Commands::Probe { bytes, weak_only } => commands::probe::run(bytes, weak_only),
        Commands::Check { bytes, strong } => commands::check::run(bytes, strong),
    }
}
