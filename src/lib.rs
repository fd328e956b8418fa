//! `harmonia-progression`: key, roman-numeral and genre inference for chord progressions.
//!
//! Input is chord-symbol text (`"Dm7"`, `"Bbmaj7"`, `"C/E"`). Output is a key, a roman-numeral
//! reading of every chord, cadences, secondary dominants, borrowed chords, named progressions
//! and a ranked list of genres the progression resembles.
//!
//! ## Public invariants (must not change without a major version bump)
//!
//! - **Pitch-class semantics**: all note spellings reduce to 12-TET pitch classes.
//!   `C#` and `Db` are the same value in this crate's public types.
//! - **Deterministic**: the same inputs yield the same outputs (ordering included).
//!   Key ties resolve to majors before minors, then fewer accidentals.
//! - **Casing encodes quality**: upper case for major, dominant and augmented (`+`), lower case
//!   for minor, lower case with `°` for diminished. Degrees are always `1..=7`.
//! - **Fail fast, except genres**: [`detect_key`], [`roman_numerals`] and
//!   [`analyze_progression`] return [`AnalysisError`]; [`detect_genre`] never fails and
//!   degrades to a single `unknown` result.
//!
//! ## Swappable parts (intentionally incomplete / likely to evolve)
//!
//! - **Key scoring weights** (diatonic points, tonic bonuses, V→vi bonus).
//! - **The genre pattern catalog** and its weights.
//! - **Window geometry** for long progressions ([`AnalyzerConfig`]).
//! - **Enharmonic spelling** of reported roots (conventional key spellings only).
//!
//! ## What this crate is not
//!
//! - No audio, no MIDI, no real-time input
//! - No modulation tracking: one key per progression
//! - No voicing, chord building or substitution suggestions
//!
//! ```
//! use harmonia_progression::{analyze_progression, AnalyzeOptions};
//!
//! let report = analyze_progression(&["C", "F", "G", "C"], &AnalyzeOptions::default()).unwrap();
//! assert_eq!(report.key.to_string(), "C major");
//! assert_eq!(report.romans(), ["I", "IV", "V", "I"]);
//! ```

mod analysis;
mod cache;
mod chord;
mod config;
mod detect;
mod error;
pub mod genre;
mod harmony;
mod key;
mod pitch;
mod roman;

pub use analysis::{AnalyzeOptions, Analyzer, ChordAnalysis, ProgressionAnalysis};
pub use cache::{CacheStats, ScaleCache, DEFAULT_SCALE_CACHE_CAPACITY};
pub use chord::{ChordQuality, ChordToken, QualityClass};
pub use config::AnalyzerConfig;
pub use detect::{KeyCandidate, KeyDetection, KeyDetector};
pub use error::{AnalysisError, Result};
pub use genre::{
    Genre, GenreClassifier, GenreDetectionResult, GenreOptions, GenrePattern, Windowing,
    GENRE_PATTERNS,
};
pub use harmony::{
    detect_borrowed_chords, detect_cadences, detect_secondary_dominants, is_loopable,
    match_common_patterns, BorrowedChord, Cadence, CadenceKind, CadenceStrength, CommonPattern,
    HarmonicFunction, SecondaryDominant,
};
pub use key::{diatonic_triad_quality, Key, KeyMode};
pub use pitch::PitchClass;
pub use roman::{roman_for_degree, roman_numeral, RomanNumeral};

/// Most likely key for `chords`.
///
/// Fails with [`AnalysisError::EmptyProgression`] or [`AnalysisError::InvalidChord`].
pub fn detect_key<S: AsRef<str>>(chords: &[S]) -> Result<KeyDetection> {
    Analyzer::default().detect_key(chords)
}

/// Roman numerals for `chords` in the key `root` / `mode`.
///
/// `root` is a note name (`"C"`, `"F#"`, `"Bb"`).
pub fn roman_numerals<S: AsRef<str>>(
    chords: &[S],
    root: &str,
    mode: KeyMode,
) -> Result<Vec<RomanNumeral>> {
    let tonic = PitchClass::parse(root)?;
    Analyzer::default().roman_numerals(chords, Key::new(tonic, mode))
}

/// Full report for `chords`.
pub fn analyze_progression<S: AsRef<str>>(
    chords: &[S],
    options: &AnalyzeOptions,
) -> Result<ProgressionAnalysis> {
    Analyzer::default().analyze(chords, options)
}

/// Ranked genres for `chords`, best first. Never fails.
pub fn detect_genre<S: AsRef<str>>(
    chords: &[S],
    options: &GenreOptions,
) -> Vec<GenreDetectionResult> {
    Analyzer::default().detect_genre(chords, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_functions_match_the_engine() {
        let chords = ["Am", "Dm", "E7", "Am"];
        let found = detect_key(&chords).unwrap();
        assert_eq!(found.key.to_string(), "A minor");
        assert_eq!(found.root, "A");
        assert_eq!(found.scale_type, KeyMode::Minor);

        let numerals = roman_numerals(&chords, "A", KeyMode::Minor).unwrap();
        let labels: Vec<&str> = numerals.iter().map(|n| n.roman.as_str()).collect();
        assert_eq!(labels, ["i", "iv", "V7", "i"]);
    }

    #[test]
    fn bad_root_is_an_invalid_key() {
        assert!(matches!(
            roman_numerals(&["C"], "X", KeyMode::Major),
            Err(AnalysisError::InvalidKey(_))
        ));
    }

    #[test]
    fn genre_never_fails() {
        let results = detect_genre(&["not", "chords"], &GenreOptions::default());
        assert_eq!(results, vec![GenreDetectionResult::unknown()]);
    }
}
