pub mod corpus;
pub mod pitch;
pub mod render;

pub use corpus::{parse_corpus, read_corpus, Corpus};
pub use pitch::midi_number;
pub use render::{melody_to_midi, melody_to_text, RenderOptions};

use std::path::PathBuf;

/// Errors from corpus loading and rendering.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read corpus {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("corpus line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("invalid pitch name '{0}'")]
    InvalidPitch(String),

    #[error(transparent)]
    Chain(#[from] tunechain::Error),

    #[error("render error: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, Error>;
