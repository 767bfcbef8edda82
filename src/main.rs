use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

/// qrvid — hide arbitrary bytes in an ordinary video, one QR code per frame.
#[derive(Parser)]
#[command(name = "qrvid", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a file into a carrier video
    Encode {
        /// Input file path
        #[arg(short, long)]
        input: PathBuf,

        /// Output video path (.mp4)
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Decode a carrier video back into the original file
    Decode {
        /// Input video path (.mp4)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Encode { input, output } => {
            let payload = fs::read(&input)
                .with_context(|| format!("failed to read input {}", input.display()))?;
            qrvid::encode_file(&output, &payload)
                .with_context(|| format!("failed to encode to {}", output.display()))?;
        }

        Commands::Decode { input, output } => {
            let payload = qrvid::decode_file(&input)
                .with_context(|| format!("failed to decode {}", input.display()))?;
            fs::write(&output, &payload)
                .with_context(|| format!("failed to write output {}", output.display()))?;
        }
    }

    Ok(())
}
