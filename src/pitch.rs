//! Pitch classes in 12-TET.

use std::fmt;

use serde::Serialize;

use crate::error::{AnalysisError, Result};

/// A pitch class in 12-TET, \(0..=11\).
///
/// Mapping (sharp spelling):
/// - 0=C, 1=C#, 2=D, 3=D#, 4=E, 5=F, 6=F#, 7=G, 8=G#, 9=A, 10=A#, 11=B
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PitchClass(pub u8);

impl PitchClass {
    /// Parse a note spelling into a pitch class.
    ///
    /// Accepts enharmonic spellings, Unicode accidentals and lower-case letters:
    /// `C`, `C#`, `Db`, `E♭`, `Fb`, `B#`, `Cb`, `bb`.
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        match split_note_prefix(trimmed) {
            Some((pc, rest)) if rest.is_empty() => Ok(pc),
            _ => Err(AnalysisError::InvalidKey(s.to_string())),
        }
    }

    /// Display in a canonical sharp spelling.
    pub fn display_sharp(self) -> &'static str {
        SHARP_NAMES[(self.0 % 12) as usize]
    }

    /// Transpose by a signed number of semitones.
    pub fn transpose(self, semitones: i32) -> Self {
        PitchClass(mod12(self.0 as i32 + semitones))
    }

    /// Ascending distance from `self` up to `other`, in `0..12`.
    pub fn interval_to(self, other: PitchClass) -> u8 {
        mod12(other.0 as i32 - self.0 as i32)
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_sharp())
    }
}

const SHARP_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Read a leading note name (letter plus accidentals) off `s`.
///
/// Returns the pitch class and the unconsumed remainder, or `None` when `s`
/// does not start with `A`..=`G` in either case. After the letter, `b` is always
/// a flat, so `bb` is B-flat.
pub(crate) fn split_note_prefix(s: &str) -> Option<(PitchClass, &str)> {
    let mut chars = s.char_indices();
    let (_, letter) = chars.next()?;
    let base = match letter {
        'C' | 'c' => 0i32,
        'D' | 'd' => 2,
        'E' | 'e' => 4,
        'F' | 'f' => 5,
        'G' | 'g' => 7,
        'A' | 'a' => 9,
        'B' | 'b' => 11,
        _ => return None,
    };

    let mut acc = 0i32;
    let mut end = letter.len_utf8();
    for (i, c) in chars {
        match c {
            '#' | '♯' => acc += 1,
            'b' | '♭' => acc -= 1,
            _ => break,
        }
        end = i + c.len_utf8();
    }

    Some((PitchClass(mod12(base + acc)), &s[end..]))
}

pub(crate) fn mod12(x: i32) -> u8 {
    x.rem_euclid(12) as u8
}
