//! hbwire - Thrift binary wire tooling
//!
//! Decodes captured Thrift binary messages and lists their top-level fields.

mod inspect;

use clap::{Parser, Subcommand};
use hbwire_client::ClientConfig;
use inspect::InspectOptions;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hbwire")]
#[command(about = "Thrift binary wire protocol tooling")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a captured message and list its top-level fields
    Inspect {
        /// File holding the raw bytes of one or more messages
        file: PathBuf,

        /// Capture is length-prefixed (framed transport)
        #[arg(long)]
        framed: bool,

        /// Require versioned message headers
        #[arg(long)]
        strict: bool,

        /// Maximum nesting depth when skipping field values
        #[arg(long, env = "HBWIRE_MAX_SKIP_DEPTH")]
        max_depth: Option<usize>,

        /// Maximum bytes primitive reads may consume
        #[arg(long)]
        read_length: Option<usize>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Settings from HBWIRE_CONFIG and the environment, refined by flags.
    let config = ClientConfig::load()?;

    match cli.command {
        Commands::Inspect {
            file,
            framed,
            strict,
            max_depth,
            read_length,
        } => {
            let mut options = InspectOptions::from(&config);
            options.framed |= framed;
            options.protocol.strict_read |= strict;
            if let Some(depth) = max_depth {
                options.protocol.max_skip_depth = depth;
            }
            if read_length.is_some() {
                options.protocol.read_length = read_length;
            }

            let capture = std::fs::read(&file)?;
            tracing::debug!("Read {} bytes from {}", capture.len(), file.display());

            let report = inspect::inspect(&capture, &options)?;
            print!("{}", report);
        }
    }

    Ok(())
}
