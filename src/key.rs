//! Keys and the scale catalog.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::chord::QualityClass;
use crate::error::{AnalysisError, Result};
use crate::pitch::{mod12, split_note_prefix, PitchClass};

/// Major vs minor key mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyMode {
    /// Ionian.
    Major,
    /// Natural minor for degrees and numerals; harmonic/melodic alterations for membership.
    Minor,
}

impl KeyMode {
    pub fn as_str(self) -> &'static str {
        match self {
            KeyMode::Major => "major",
            KeyMode::Minor => "minor",
        }
    }

    pub fn opposite(self) -> KeyMode {
        match self {
            KeyMode::Major => KeyMode::Minor,
            KeyMode::Minor => KeyMode::Major,
        }
    }
}

impl FromStr for KeyMode {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "maj" | "major" | "ionian" => Ok(KeyMode::Major),
            "m" | "min" | "minor" | "aeolian" => Ok(KeyMode::Minor),
            _ => Err(AnalysisError::InvalidKey(s.to_string())),
        }
    }
}

/// A key as (tonic pitch class, mode).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
    /// Tonic pitch class (0=C, …, 11=B).
    pub tonic: PitchClass,
    pub mode: KeyMode,
}

const MAJOR_STEPS: [i32; 7] = [0, 2, 4, 5, 7, 9, 11];
const MINOR_STEPS: [i32; 7] = [0, 2, 3, 5, 7, 8, 10];

// Conventional key-signature spelling per tonic pitch class.
const MAJOR_KEY_NAMES: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "F#", "G", "Ab", "A", "Bb", "B",
];
const MINOR_KEY_NAMES: [&str; 12] = [
    "C", "C#", "D", "Eb", "E", "F", "F#", "G", "G#", "A", "Bb", "B",
];

impl Key {
    pub fn new(tonic: PitchClass, mode: KeyMode) -> Self {
        Key { tonic, mode }
    }

    pub fn major(tonic: PitchClass) -> Self {
        Key::new(tonic, KeyMode::Major)
    }

    pub fn minor(tonic: PitchClass) -> Self {
        Key::new(tonic, KeyMode::Minor)
    }

    /// Tonic spelled the way the key signature would spell it.
    pub fn root_name(self) -> &'static str {
        let i = (self.tonic.0 % 12) as usize;
        match self.mode {
            KeyMode::Major => MAJOR_KEY_NAMES[i],
            KeyMode::Minor => MINOR_KEY_NAMES[i],
        }
    }

    /// Cache key, e.g. `C:major`.
    pub fn scale_id(self) -> String {
        format!("{}:{}", self.root_name(), self.mode.as_str())
    }

    /// Diatonic scale pitch classes, starting from tonic.
    pub fn diatonic_scale(self) -> [PitchClass; 7] {
        let steps = match self.mode {
            KeyMode::Major => MAJOR_STEPS,
            KeyMode::Minor => MINOR_STEPS,
        };
        steps.map(|d| self.tonic.transpose(d))
    }

    /// The membership set used for key scoring.
    ///
    /// Major keys: the seven diatonic notes. Minor keys: the natural minor scale
    /// followed by the raised 6th and raised 7th (melodic/harmonic alterations).
    pub fn scale_notes(self) -> Vec<PitchClass> {
        let mut notes = self.diatonic_scale().to_vec();
        if self.mode == KeyMode::Minor {
            notes.push(self.raised_sixth());
            notes.push(self.leading_tone());
        }
        notes
    }

    /// 1-based degree of `pc` in the natural scale.
    pub fn degree_of(self, pc: PitchClass) -> Option<u8> {
        self.diatonic_scale()
            .iter()
            .position(|&d| d == pc)
            .map(|i| i as u8 + 1)
    }

    /// Raised 7th of a minor key (harmonic-minor leading tone).
    pub fn leading_tone(self) -> PitchClass {
        self.tonic.transpose(11)
    }

    /// Raised 6th of a minor key (melodic minor).
    pub fn raised_sixth(self) -> PitchClass {
        self.tonic.transpose(9)
    }

    /// Pitch class of a 1-based natural-scale degree.
    pub fn degree_pitch(self, degree: u8) -> Option<PitchClass> {
        let i = usize::from(degree.checked_sub(1)?);
        self.diatonic_scale().get(i).copied()
    }

    /// Relative major/minor: C major <-> A minor.
    pub fn relative(self) -> Key {
        match self.mode {
            // Down a minor third == +9 mod 12.
            KeyMode::Major => Key::minor(PitchClass(mod12(self.tonic.0 as i32 + 9))),
            KeyMode::Minor => Key::major(PitchClass(mod12(self.tonic.0 as i32 + 3))),
        }
    }

    /// Parallel key: same tonic, opposite mode.
    pub fn parallel(self) -> Key {
        Key::new(self.tonic, self.mode.opposite())
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.root_name(), self.mode.as_str())
    }
}

impl Serialize for Key {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Accepts `C major`, `A minor`, `C:maj`, `A:min`, `Am`, `Bb`, `F#m`.
impl FromStr for Key {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || AnalysisError::InvalidKey(s.to_string());
        let (tonic, rest) = split_note_prefix(s.trim()).ok_or_else(invalid)?;
        let rest = rest.trim_start_matches(':').trim();
        // A bare `m` is minor; `M` is major. Everything else is case-insensitive.
        let mode = match rest {
            "m" => KeyMode::Minor,
            "M" => KeyMode::Major,
            other => other.parse().map_err(|_| invalid())?,
        };
        Ok(Key::new(tonic, mode))
    }
}

/// Expected triad quality on each natural-scale degree.
pub fn diatonic_triad_quality(mode: KeyMode, deg: u8) -> QualityClass {
    match (mode, deg) {
        // Major: I ii iii IV V vi vii°
        (KeyMode::Major, 1) => QualityClass::Major,
        (KeyMode::Major, 2) => QualityClass::Minor,
        (KeyMode::Major, 3) => QualityClass::Minor,
        (KeyMode::Major, 4) => QualityClass::Major,
        (KeyMode::Major, 5) => QualityClass::Major,
        (KeyMode::Major, 6) => QualityClass::Minor,
        (KeyMode::Major, 7) => QualityClass::Diminished,
        // Natural minor: i ii° III iv v VI VII
        (KeyMode::Minor, 1) => QualityClass::Minor,
        (KeyMode::Minor, 2) => QualityClass::Diminished,
        (KeyMode::Minor, 3) => QualityClass::Major,
        (KeyMode::Minor, 4) => QualityClass::Minor,
        (KeyMode::Minor, 5) => QualityClass::Minor,
        (KeyMode::Minor, 6) => QualityClass::Major,
        (KeyMode::Minor, 7) => QualityClass::Major,
        _ => QualityClass::Major,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> Key {
        s.parse().unwrap()
    }

    #[test]
    fn parses_common_key_spellings() {
        assert_eq!(key("C major"), Key::major(PitchClass(0)));
        assert_eq!(key("A:min"), Key::minor(PitchClass(9)));
        assert_eq!(key("Am"), Key::minor(PitchClass(9)));
        assert_eq!(key("Bb"), Key::major(PitchClass(10)));
        assert_eq!(key("F# minor"), Key::minor(PitchClass(6)));
        assert!("H major".parse::<Key>().is_err());
        assert!("C lydian".parse::<Key>().is_err());
    }

    #[test]
    fn displays_with_key_signature_spelling() {
        assert_eq!(Key::major(PitchClass(10)).to_string(), "Bb major");
        assert_eq!(Key::minor(PitchClass(8)).to_string(), "G# minor");
        assert_eq!(Key::major(PitchClass(1)).to_string(), "Db major");
        assert_eq!(Key::minor(PitchClass(9)).scale_id(), "A:minor");
    }

    #[test]
    fn relative_and_parallel() {
        let c = key("C major");
        assert_eq!(c.relative(), key("A minor"));
        assert_eq!(c.relative().relative(), c);
        assert_eq!(c.parallel(), key("C minor"));
    }

    #[test]
    fn minor_scale_notes_include_alterations() {
        let am = key("A minor");
        let notes = am.scale_notes();
        assert_eq!(notes.len(), 9);
        assert!(notes.contains(&PitchClass::parse("G#").unwrap()));
        assert!(notes.contains(&PitchClass::parse("F#").unwrap()));
        assert_eq!(key("C major").scale_notes().len(), 7);
    }

    #[test]
    fn degrees_in_natural_scale() {
        let c = key("C major");
        assert_eq!(c.degree_of(PitchClass(7)), Some(5));
        assert_eq!(c.degree_of(PitchClass(10)), None);
        assert_eq!(c.degree_pitch(6), Some(PitchClass(9)));
        assert_eq!(c.degree_pitch(0), None);
        assert_eq!(key("A minor").degree_of(PitchClass(8)), None);
    }
}
