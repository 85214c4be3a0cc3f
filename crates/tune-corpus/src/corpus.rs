//! Melody corpora stored as two-column CSV.
//!
//! ```text
//! pitch,duration
//! C4,1
//! E4,0.5
//! G4,1/3
//! ```
//!
//! The first line is a header and is skipped. Column one is the pitch name,
//! column two the duration in quarter lengths (decimal or `n/d`). Further
//! columns are ignored, as are blank lines.

use std::path::Path;

use tracing::{debug, info};
use tunechain::{Catalogue, State};

use crate::pitch::midi_number;
use crate::{Error, Result};

/// A training melody plus the catalogue of every state that occurs in it.
#[derive(Debug, Clone)]
pub struct Corpus {
    /// States in file order.
    pub notes: Vec<State>,
    /// Distinct states in first-seen order.
    pub catalogue: Catalogue<State>,
}

impl Corpus {
    pub fn from_notes(notes: Vec<State>) -> Self {
        let catalogue = Catalogue::dedup(notes.iter().cloned());
        Self { notes, catalogue }
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

/// Load a corpus from a CSV file.
pub fn read_corpus(path: &Path) -> Result<Corpus> {
    let contents = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let corpus = parse_corpus(&contents)?;
    info!(
        path = %path.display(),
        notes = corpus.len(),
        states = corpus.catalogue.len(),
        "loaded corpus"
    );
    Ok(corpus)
}

/// Parse corpus CSV text. Line numbers in errors are 1-based.
pub fn parse_corpus(contents: &str) -> Result<Corpus> {
    let mut notes = Vec::new();

    for (i, line) in contents.lines().enumerate().skip(1) {
        let line_no = i + 1;
        if line.trim().is_empty() {
            continue;
        }

        let mut fields = line.split(',').map(unquote);
        let pitch = fields.next().unwrap_or_default();
        if pitch.is_empty() {
            return Err(Error::Parse {
                line: line_no,
                message: "missing pitch".to_string(),
            });
        }
        midi_number(pitch).map_err(|e| Error::Parse {
            line: line_no,
            message: e.to_string(),
        })?;
        let duration_field = fields.next().ok_or_else(|| Error::Parse {
            line: line_no,
            message: "missing duration column".to_string(),
        })?;
        let duration = parse_duration(duration_field).map_err(|message| Error::Parse {
            line: line_no,
            message,
        })?;

        let state = State::new(pitch, duration).map_err(|e| Error::Parse {
            line: line_no,
            message: e.to_string(),
        })?;
        notes.push(state);
    }

    debug!(notes = notes.len(), "parsed corpus");
    Ok(Corpus::from_notes(notes))
}

fn unquote(field: &str) -> &str {
    let field = field.trim();
    field
        .strip_prefix('"')
        .and_then(|f| f.strip_suffix('"'))
        .unwrap_or(field)
        .trim()
}

/// Parse a quarter-length value: `1`, `0.5`, or a fraction such as `1/3`.
pub fn parse_duration(text: &str) -> std::result::Result<f64, String> {
    let text = text.trim();
    if let Some((num, den)) = text.split_once('/') {
        let num: f64 = num
            .trim()
            .parse()
            .map_err(|_| format!("invalid duration '{text}'"))?;
        let den: f64 = den
            .trim()
            .parse()
            .map_err(|_| format!("invalid duration '{text}'"))?;
        if den == 0.0 {
            return Err(format!("invalid duration '{text}': zero denominator"));
        }
        Ok(num / den)
    } else {
        text.parse()
            .map_err(|_| format!("invalid duration '{text}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn st(pitch: &str, duration: f64) -> State {
        State::new(pitch, duration).unwrap()
    }

    #[test]
    fn parses_notes_and_builds_catalogue() {
        let csv = "pitch,duration\nC4,1\nE4,0.5\nC4,1\nG4,2\n";
        let corpus = parse_corpus(csv).unwrap();

        assert_eq!(
            corpus.notes,
            vec![st("C4", 1.0), st("E4", 0.5), st("C4", 1.0), st("G4", 2.0)]
        );
        assert_eq!(
            corpus.catalogue.states(),
            &[st("C4", 1.0), st("E4", 0.5), st("G4", 2.0)]
        );
    }

    #[test]
    fn header_only_is_empty() {
        let corpus = parse_corpus("pitch,duration\n").unwrap();
        assert!(corpus.is_empty());
        assert!(corpus.catalogue.is_empty());
    }

    #[test]
    fn tolerates_blank_lines_quotes_and_extra_columns() {
        let csv = "pitch,duration,velocity\n\n\"F#4\", 1.5 ,90\r\n  \nB-3,0.25\n";
        let corpus = parse_corpus(csv).unwrap();
        assert_eq!(corpus.notes, vec![st("F#4", 1.5), st("B-3", 0.25)]);
    }

    #[test]
    fn fractional_durations() {
        let corpus = parse_corpus("p,d\nC4,1/3\nD4,2/3\n").unwrap();
        assert!((corpus.notes[0].duration.get() - 1.0 / 3.0).abs() < 1e-12);
        assert!((corpus.notes[1].duration.get() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn bad_rows_report_line_numbers() {
        let err = parse_corpus("pitch,duration\nC4,1\nD4\n").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 3, .. }), "{err}");

        let err = parse_corpus("pitch,duration\nC4,abc\n").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }), "{err}");

        let err = parse_corpus("pitch,duration\nC4,0\n").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }), "{err}");

        let err = parse_corpus("pitch,duration\nC4,1/0\n").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }), "{err}");

        let err = parse_corpus("pitch,duration\n,1\n").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }), "{err}");

        let err = parse_corpus("pitch,duration\nC4,1\nH2,1\n").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 3, .. }), "{err}");
    }

    #[test]
    fn read_missing_file_is_io_error() {
        let err = read_corpus(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
