//! CLI command implementations

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;
use tune_corpus::{melody_to_midi, melody_to_text, read_corpus, Corpus, RenderOptions};
use tuneconf::{ConfigSources, TuneConfig};
use tunechain::{ChainSummary, InitialEstimate, MarkovChain, State};

/// Options for `tunegen generate`; unset values come from config.
#[derive(Debug, Default)]
pub struct GenerateArgs {
    pub corpus: Option<PathBuf>,
    pub length: Option<usize>,
    pub seed: Option<u64>,
    pub output: Option<PathBuf>,
    pub original: Option<PathBuf>,
    pub initial: Option<String>,
    pub json: bool,
}

/// Result of a generate run, before anything is printed.
#[derive(Debug)]
pub struct Generated {
    pub melody: Vec<State>,
    pub midi_path: PathBuf,
    pub original_path: Option<PathBuf>,
}

/// Train a chain on the configured (or given) corpus.
fn train_chain(
    config: &TuneConfig,
    corpus: Option<&Path>,
    initial: Option<&str>,
    seed: Option<u64>,
) -> Result<(Corpus, MarkovChain)> {
    let corpus_path = corpus.unwrap_or(&config.paths.corpus);
    let corpus = read_corpus(corpus_path)
        .with_context(|| format!("Failed to load corpus {}", corpus_path.display()))?;

    let estimate: InitialEstimate = initial
        .unwrap_or(&config.generate.initial)
        .parse()
        .map_err(anyhow::Error::msg)?;

    let chain = match seed.or(config.generate.seed) {
        Some(seed) => MarkovChain::seeded(corpus.catalogue.clone(), seed),
        None => MarkovChain::from_os_rng(corpus.catalogue.clone()),
    };
    let mut chain = chain.with_initial_estimate(estimate);
    chain
        .train(&corpus.notes)
        .context("Failed to train on corpus")?;

    Ok((corpus, chain))
}

fn render_options(config: &TuneConfig, title: &str) -> RenderOptions {
    RenderOptions {
        tempo_bpm: config.render.tempo_bpm,
        ticks_per_quarter: config.render.ticks_per_quarter,
        velocity: config.render.velocity,
        program: config.render.program,
        title: title.to_string(),
    }
}

fn write_midi(path: &Path, melody: &[State], options: &RenderOptions) -> Result<()> {
    let bytes = melody_to_midi(melody, options)
        .with_context(|| format!("Failed to render {}", path.display()))?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), notes = melody.len(), "wrote midi");
    Ok(())
}

/// Train, generate, and write MIDI files.
pub fn run_generate(config: &TuneConfig, args: &GenerateArgs) -> Result<Generated> {
    let (corpus, mut chain) = train_chain(
        config,
        args.corpus.as_deref(),
        args.initial.as_deref(),
        args.seed,
    )?;

    let length = config.melody_length(args.length);
    let melody = chain.generate(length).context("Failed to generate melody")?;

    let midi_path = args
        .output
        .clone()
        .unwrap_or_else(|| config.paths.output_dir.join("generated.mid"));
    write_midi(&midi_path, &melody, &render_options(config, "Generated"))?;

    if let Some(path) = &args.original {
        write_midi(path, &corpus.notes, &render_options(config, "Original"))?;
    }

    Ok(Generated {
        melody,
        midi_path,
        original_path: args.original.clone(),
    })
}

pub fn generate(config: &TuneConfig, args: GenerateArgs) -> Result<()> {
    let generated = run_generate(config, &args)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&generated.melody)?);
    } else {
        print!("{}", melody_to_text(&generated.melody));
        eprintln!("wrote {}", generated.midi_path.display());
        if let Some(path) = &generated.original_path {
            eprintln!("wrote {}", path.display());
        }
    }

    Ok(())
}

/// Learned distributions, non-zero entries only.
#[derive(Debug, Serialize)]
pub struct InspectReport {
    pub initial_estimate: String,
    pub summary: ChainSummary,
    pub initial: Vec<(String, f64)>,
    pub transitions: Vec<TransitionRow>,
}

#[derive(Debug, Serialize)]
pub struct TransitionRow {
    pub from: String,
    pub to: Vec<(String, f64)>,
}

pub fn build_report(chain: &MarkovChain) -> Result<InspectReport> {
    let (summary, initial, matrix) = match (
        chain.summary(),
        chain.initial_distribution(),
        chain.transition_matrix(),
    ) {
        (Some(s), Some(i), Some(m)) => (s, i, m),
        _ => return Err(tunechain::Error::NotTrained.into()),
    };
    let catalogue = chain.catalogue();

    let initial = catalogue
        .iter()
        .zip(initial)
        .filter(|&(_, &p)| p > 0.0)
        .map(|(s, &p)| (s.to_string(), p))
        .collect();

    let transitions = catalogue
        .iter()
        .zip(matrix.rows())
        .filter_map(|(from, row)| {
            let to: Vec<_> = catalogue
                .iter()
                .zip(row)
                .filter(|&(_, &p)| p > 0.0)
                .map(|(s, &p)| (s.to_string(), p))
                .collect();
            (!to.is_empty()).then(|| TransitionRow {
                from: from.to_string(),
                to,
            })
        })
        .collect();

    Ok(InspectReport {
        initial_estimate: chain.initial_estimate().to_string(),
        summary,
        initial,
        transitions,
    })
}

pub fn inspect(
    config: &TuneConfig,
    corpus: Option<PathBuf>,
    initial: Option<&str>,
    json: bool,
) -> Result<()> {
    let (_, chain) = train_chain(config, corpus.as_deref(), initial, None)?;
    let report = build_report(&chain)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} states, {} start states, {} transitions ({} estimate)",
        report.summary.states,
        report.summary.start_states,
        report.summary.transitions,
        report.initial_estimate
    );
    println!("\ninitial:");
    for (state, p) in &report.initial {
        println!("  {:<10} {:.4}", state, p);
    }
    println!("\ntransitions:");
    for row in &report.transitions {
        let targets: Vec<String> = row
            .to
            .iter()
            .map(|(s, p)| format!("{} {:.4}", s, p))
            .collect();
        println!("  {:<10} -> {}", row.from, targets.join(", "));
    }
    if !report.summary.absorbing.is_empty() {
        let absorbing: Vec<String> = report
            .summary
            .absorbing
            .iter()
            .map(ToString::to_string)
            .collect();
        println!("\nabsorbing: {}", absorbing.join(", "));
    }

    Ok(())
}

pub fn show_config(config: &TuneConfig, sources: Option<&ConfigSources>) {
    if let Some(sources) = sources {
        if sources.files.is_empty() {
            println!("# no config files found, using defaults");
        }
        for path in &sources.files {
            println!("# file: {}", path.display());
        }
        for var in &sources.env_overrides {
            println!("# env: {}", var);
        }
        println!();
    }
    print!("{}", config.to_toml());
}

#[cfg(test)]
mod tests {
    use super::*;
    use midly::{MidiMessage, Smf, TrackEventKind};

    const CSV: &str = "pitch,duration\nC4,1\nD4,1\nE4,0.5\nC4,1\nD4,1\nG4,2\n";

    fn setup() -> (tempfile::TempDir, TuneConfig) {
        let dir = tempfile::tempdir().unwrap();
        let corpus = dir.path().join("pitches.csv");
        std::fs::write(&corpus, CSV).unwrap();

        let mut config = TuneConfig::default();
        config.paths.corpus = corpus;
        config.paths.output_dir = dir.path().join("out");
        (dir, config)
    }

    fn count_note_ons(path: &Path) -> usize {
        let bytes = std::fs::read(path).unwrap();
        let smf = Smf::parse(&bytes).unwrap();
        smf.tracks[1]
            .iter()
            .filter(|e| {
                matches!(
                    e.kind,
                    TrackEventKind::Midi {
                        message: MidiMessage::NoteOn { .. },
                        ..
                    }
                )
            })
            .count()
    }

    #[test]
    fn generate_writes_midi_to_output_dir() {
        let (dir, config) = setup();
        let args = GenerateArgs {
            length: Some(24),
            seed: Some(3),
            ..Default::default()
        };

        let generated = run_generate(&config, &args).unwrap();
        assert_eq!(generated.melody.len(), 24);
        assert_eq!(generated.midi_path, dir.path().join("out/generated.mid"));
        assert_eq!(count_note_ons(&generated.midi_path), 24);
    }

    #[test]
    fn generate_writes_original_when_asked() {
        let (dir, config) = setup();
        let original = dir.path().join("original.mid");
        let args = GenerateArgs {
            seed: Some(1),
            original: Some(original.clone()),
            ..Default::default()
        };

        run_generate(&config, &args).unwrap();
        assert_eq!(count_note_ons(&original), 6);
    }

    #[test]
    fn same_seed_same_melody() {
        let (_dir, config) = setup();
        let args = GenerateArgs {
            seed: Some(99),
            ..Default::default()
        };
        let a = run_generate(&config, &args).unwrap();
        let b = run_generate(&config, &args).unwrap();
        assert_eq!(a.melody, b.melody);
    }

    #[test]
    fn length_is_capped_by_config() {
        let (_dir, mut config) = setup();
        config.generate.max_length = 8;
        let args = GenerateArgs {
            length: Some(1000),
            seed: Some(5),
            ..Default::default()
        };
        assert_eq!(run_generate(&config, &args).unwrap().melody.len(), 8);
    }

    #[test]
    fn unknown_initial_estimate_is_rejected() {
        let (_dir, config) = setup();
        let args = GenerateArgs {
            initial: Some("uniform".to_string()),
            ..Default::default()
        };
        assert!(run_generate(&config, &args).is_err());
    }

    #[test]
    fn missing_corpus_names_the_path() {
        let (_dir, config) = setup();
        let args = GenerateArgs {
            corpus: Some(PathBuf::from("/no/such/corpus.csv")),
            ..Default::default()
        };
        let err = run_generate(&config, &args).unwrap_err();
        assert!(format!("{err:#}").contains("/no/such/corpus.csv"));
    }

    #[test]
    fn report_lists_nonzero_entries() {
        let (_dir, config) = setup();
        let (_, chain) = train_chain(&config, None, Some("sequence-start"), Some(0)).unwrap();
        let report = build_report(&chain).unwrap();

        assert_eq!(report.initial_estimate, "sequence-start");
        assert_eq!(report.initial, vec![("C4/1".to_string(), 1.0)]);
        assert_eq!(report.summary.states, 4);
        // G4/2 ends the corpus and has no successor
        assert_eq!(report.transitions.len(), 3);
        assert_eq!(report.summary.absorbing, vec![State::new("G4", 2.0).unwrap()]);

        let from_d4 = report
            .transitions
            .iter()
            .find(|row| row.from == "D4/1")
            .unwrap();
        assert_eq!(
            from_d4.to,
            vec![("E4/0.5".to_string(), 0.5), ("G4/2".to_string(), 0.5)]
        );
    }
}
