//! tunegen - train a melody Markov chain on a corpus and generate new tunes
//!
//! Subcommands:
//! - `tunegen generate` - Train on the corpus, generate a melody, write MIDI
//! - `tunegen inspect` - Train and print the learned distributions
//! - `tunegen config` - Print the resolved configuration as TOML

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::filter::Directive;
use tuneconf::TuneConfig;

mod commands;

#[derive(Parser)]
#[command(name = "tunegen")]
#[command(about = "Markov chain melody generator")]
#[command(version)]
struct Cli {
    /// Config file used in place of ./tunechain.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level regardless of config
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train on a corpus and generate a melody
    Generate {
        /// Corpus CSV (pitch, duration rows)
        #[arg(short, long)]
        corpus: Option<PathBuf>,

        /// Number of notes to generate
        #[arg(short, long)]
        length: Option<usize>,

        /// RNG seed for a reproducible melody
        #[arg(short, long)]
        seed: Option<u64>,

        /// Where to write the generated MIDI file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write the training melody as MIDI
        #[arg(long)]
        original: Option<PathBuf>,

        /// Initial distribution estimate: frequency or sequence-start
        #[arg(long)]
        initial: Option<String>,

        /// Print the melody as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Train on a corpus and print the learned distributions
    Inspect {
        /// Corpus CSV (pitch, duration rows)
        #[arg(short, long)]
        corpus: Option<PathBuf>,

        /// Initial distribution estimate: frequency or sequence-start
        #[arg(long)]
        initial: Option<String>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the resolved configuration
    Config {
        /// List the files and env vars that contributed
        #[arg(long)]
        show_sources: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, sources) = TuneConfig::load_with_sources_from(cli.config.as_deref())
        .context("Failed to load configuration")?;

    let directive: Directive = if cli.verbose {
        tracing::Level::DEBUG.into()
    } else {
        config
            .telemetry
            .log_level
            .parse()
            .unwrap_or_else(|_| tracing::Level::INFO.into())
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(directive))
        .init();

    match cli.command {
        Commands::Generate {
            corpus,
            length,
            seed,
            output,
            original,
            initial,
            json,
        } => {
            commands::generate(
                &config,
                commands::GenerateArgs {
                    corpus,
                    length,
                    seed,
                    output,
                    original,
                    initial,
                    json,
                },
            )?;
        }
        Commands::Inspect {
            corpus,
            initial,
            json,
        } => {
            commands::inspect(&config, corpus, initial.as_deref(), json)?;
        }
        Commands::Config { show_sources } => {
            commands::show_config(&config, show_sources.then_some(&sources));
        }
    }

    Ok(())
}
