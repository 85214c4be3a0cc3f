use crate::{Error, Result};

/// Convert a pitch name with octave to a MIDI note number.
///
/// Accepts a letter A-G, any number of accidentals (`#` sharp, `b` or `-`
/// flat), then an octave 0-9. `C4` is middle C (60). The `-` flat matches
/// the spelling music21 exports (`B-3`), so negative octaves are not
/// supported.
pub fn midi_number(name: &str) -> Result<u8> {
    let invalid = || Error::InvalidPitch(name.to_string());
    let trimmed = name.trim();
    let mut chars = trimmed.chars();

    let letter = chars.next().ok_or_else(invalid)?;
    let pitch_class: i32 = match letter.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return Err(invalid()),
    };

    let rest = chars.as_str();
    let octave_start = rest
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(invalid)?;
    let (accidentals, octave) = rest.split_at(octave_start);

    let mut alter = 0i32;
    for c in accidentals.chars() {
        match c {
            '#' => alter += 1,
            'b' | '-' => alter -= 1,
            _ => return Err(invalid()),
        }
    }

    let octave: i32 = octave.parse().map_err(|_| invalid())?;
    if octave > 9 {
        return Err(invalid());
    }

    let number = (octave + 1) * 12 + pitch_class + alter;
    u8::try_from(number)
        .ok()
        .filter(|n| *n <= 127)
        .ok_or_else(invalid)
}
