use serde::{Deserialize, Serialize};
use tunechain::State;

use crate::pitch::midi_number;
use crate::{Error, Result};

/// Options for rendering a melody to MIDI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Default: 120.
    pub tempo_bpm: u16,
    /// Default: 480.
    pub ticks_per_quarter: u16,
    /// Note-on velocity (1-127). Default: 80.
    pub velocity: u8,
    /// GM program for the melody track. Default: 0 (piano).
    pub program: u8,
    /// Track name written into the melody track.
    pub title: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            tempo_bpm: 120,
            ticks_per_quarter: 480,
            velocity: 80,
            program: 0,
            title: "Melody".to_string(),
        }
    }
}

/// Write a melody to Standard MIDI File format 1 bytes.
///
/// Track 0: tempo. Track 1: the melody on channel 0, notes back to back,
/// each lasting its quarter-length duration.
pub fn melody_to_midi(melody: &[State], options: &RenderOptions) -> Result<Vec<u8>> {
    if options.tempo_bpm == 0 {
        return Err(Error::Render("tempo must be greater than zero".to_string()));
    }
    if options.ticks_per_quarter == 0 || options.ticks_per_quarter > 0x7FFF {
        return Err(Error::Render(format!(
            "ticks per quarter {} out of range",
            options.ticks_per_quarter
        )));
    }

    let tracks = vec![
        build_tempo_track(options.tempo_bpm),
        build_melody_track(melody, options)?,
    ];
    Ok(build_midi_file(options.ticks_per_quarter, &tracks))
}

/// One `pitch duration` line per note.
pub fn melody_to_text(melody: &[State]) -> String {
    let mut out = String::new();
    for state in melody {
        out.push_str(&format!("{} {}\n", state.pitch, state.duration));
    }
    out
}

fn build_tempo_track(bpm: u16) -> Vec<u8> {
    let usec = 60_000_000 / u32::from(bpm);
    let mut track_data = Vec::new();
    write_vlq(&mut track_data, 0);
    track_data.extend_from_slice(&[
        0xFF,
        0x51,
        0x03,
        (usec >> 16) as u8,
        (usec >> 8) as u8,
        usec as u8,
    ]);
    // 4/4
    write_vlq(&mut track_data, 0);
    track_data.extend_from_slice(&[0xFF, 0x58, 0x04, 4, 2, 0x18, 0x08]);

    write_vlq(&mut track_data, 0);
    track_data.extend_from_slice(&[0xFF, 0x2F, 0x00]);
    track_data
}

fn build_melody_track(melody: &[State], options: &RenderOptions) -> Result<Vec<u8>> {
    let mut track_data = Vec::new();

    let name_bytes = options.title.as_bytes();
    write_vlq(&mut track_data, 0);
    track_data.extend_from_slice(&[0xFF, 0x03]);
    write_vlq(&mut track_data, name_bytes.len() as u32);
    track_data.extend_from_slice(name_bytes);

    write_vlq(&mut track_data, 0);
    track_data.extend_from_slice(&[0xC0, options.program & 0x7F]);

    let velocity = options.velocity.clamp(1, 127);
    let tpq = f64::from(options.ticks_per_quarter);
    // rounding per note, so accumulate exact onsets and diff them
    let mut onset_quarters = 0.0;
    let mut last_tick = 0u64;

    for state in melody {
        let pitch = midi_number(&state.pitch)?;
        let onset = (onset_quarters * tpq).round() as u64;
        onset_quarters += state.duration.get();
        let offset = ((onset_quarters * tpq).round() as u64).max(onset + 1);

        write_vlq(&mut track_data, delta(onset, last_tick)?);
        track_data.extend_from_slice(&[0x90, pitch, velocity]);
        write_vlq(&mut track_data, delta(offset, onset)?);
        track_data.extend_from_slice(&[0x80, pitch, 0]);
        last_tick = offset;
    }

    write_vlq(&mut track_data, 0);
    track_data.extend_from_slice(&[0xFF, 0x2F, 0x00]);
    Ok(track_data)
}

/// Delta time between two ticks, bounded by the 28-bit VLQ range.
fn delta(tick: u64, previous: u64) -> Result<u32> {
    let d = tick.saturating_sub(previous);
    if d > 0x0FFF_FFFF {
        return Err(Error::Render(format!("delta time {d} exceeds MIDI range")));
    }
    Ok(d as u32)
}

/// Assemble a complete MIDI file from track data blobs.
fn build_midi_file(ppq: u16, tracks: &[Vec<u8>]) -> Vec<u8> {
    let mut buf = Vec::new();

    buf.extend_from_slice(b"MThd");
    buf.extend_from_slice(&6u32.to_be_bytes());
    buf.extend_from_slice(&1u16.to_be_bytes()); // format 1
    buf.extend_from_slice(&(tracks.len() as u16).to_be_bytes());
    buf.extend_from_slice(&ppq.to_be_bytes());

    for track_data in tracks {
        buf.extend_from_slice(b"MTrk");
        buf.extend_from_slice(&(track_data.len() as u32).to_be_bytes());
        buf.extend_from_slice(track_data);
    }

    buf
}

/// Write a variable-length quantity to a byte buffer.
fn write_vlq(buf: &mut Vec<u8>, mut value: u32) {
    let mut bytes = vec![(value & 0x7F) as u8];
    value >>= 7;
    while value > 0 {
        bytes.push((value & 0x7F) as u8 | 0x80);
        value >>= 7;
    }
    bytes.reverse();
    buf.extend_from_slice(&bytes);
}
