//! Progression analysis: one report per call, composed from every analyzer.

use serde::Serialize;

use crate::chord::{ChordToken, QualityClass};
use crate::config::AnalyzerConfig;
use crate::detect::{KeyDetection, KeyDetector};
use crate::error::{AnalysisError, Result};
use crate::genre::{Genre, GenreClassifier, GenreDetectionResult, GenreOptions, Windowing};
use crate::harmony::{
    detect_borrowed_chords, detect_cadences, detect_secondary_dominants, is_loopable,
    match_common_patterns, BorrowedChord, Cadence, CommonPattern, HarmonicFunction,
    SecondaryDominant,
};
use crate::key::Key;
use crate::roman::{self, RomanNumeral};

/// Options for [`Analyzer::analyze`].
#[derive(Debug, Clone, Copy)]
pub struct AnalyzeOptions {
    /// Analyze in this key instead of detecting one.
    pub key: Option<Key>,
    /// If true, attach genre evidence to the report.
    pub include_genres: bool,
    /// Restrict genre evidence to one genre.
    pub genre_hint: Option<Genre>,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            key: None,
            include_genres: true,
            genre_hint: None,
        }
    }
}

/// One chord's reading in the analysis key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChordAnalysis {
    pub chord: String,
    pub roman: String,
    pub degree: u8,
    pub quality: QualityClass,
    pub function: HarmonicFunction,
}

/// Everything known about a progression.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionAnalysis {
    pub key: Key,
    /// Share of diatonic chords in `key`, 0.0..=1.0.
    pub confidence: f64,
    pub chords: Vec<ChordAnalysis>,
    pub cadences: Vec<Cadence>,
    pub secondary_dominants: Vec<SecondaryDominant>,
    pub borrowed_chords: Vec<BorrowedChord>,
    pub patterns: Vec<CommonPattern>,
    /// Empty when genres were not requested.
    pub genre_patterns: Vec<GenreDetectionResult>,
    pub loopable: bool,
}

impl ProgressionAnalysis {
    /// Roman labels in chord order.
    pub fn romans(&self) -> Vec<&str> {
        self.chords.iter().map(|c| c.roman.as_str()).collect()
    }
}

/// The analysis engine.
///
/// Owns the key detector (and so its scale cache) and the genre classifier. Safe to share
/// across threads; every method takes `&self`.
#[derive(Debug)]
pub struct Analyzer {
    detector: KeyDetector,
    genres: GenreClassifier,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(AnalyzerConfig::default())
    }
}

impl Analyzer {
    /// Engine sized and windowed by `config`.
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            detector: KeyDetector::new(config.scale_cache_capacity, config.key_alternatives),
            genres: GenreClassifier::new(Windowing::from(&config)),
        }
    }

    /// The shared key detector, e.g. for its cache statistics.
    pub fn detector(&self) -> &KeyDetector {
        &self.detector
    }

    /// Most likely key for a progression.
    pub fn detect_key<S: AsRef<str>>(&self, chords: &[S]) -> Result<KeyDetection> {
        if chords.is_empty() {
            return Err(AnalysisError::EmptyProgression);
        }
        let tokens = ChordToken::parse_all(chords)?;
        self.detector.detect(&tokens)
    }

    /// Roman numerals for every chord in a fixed key.
    pub fn roman_numerals<S: AsRef<str>>(&self, chords: &[S], key: Key) -> Result<Vec<RomanNumeral>> {
        let tokens = ChordToken::parse_all(chords)?;
        roman::roman_numerals(&tokens, key)
    }

    /// Full report. Fails on empty input or any unparsable chord; genre evidence never fails.
    pub fn analyze<S: AsRef<str>>(
        &self,
        chords: &[S],
        options: &AnalyzeOptions,
    ) -> Result<ProgressionAnalysis> {
        if chords.is_empty() {
            return Err(AnalysisError::EmptyProgression);
        }
        let tokens = ChordToken::parse_all(chords)?;

        let (key, confidence) = match options.key {
            Some(key) => {
                let scored = self.detector.score_key(&tokens, key);
                let ratio = (scored.diatonic_count as f64 / tokens.len() as f64).min(1.0);
                (key, ratio)
            }
            None => {
                let found = self.detector.detect(&tokens)?;
                (found.key, found.confidence)
            }
        };
        log::debug!("analyzing {} chords in {key}", tokens.len());

        let numerals = roman::roman_numerals(&tokens, key)?;
        let chord_analyses = tokens
            .iter()
            .zip(&numerals)
            .map(|(token, numeral)| ChordAnalysis {
                chord: token.symbol.clone(),
                roman: numeral.roman.clone(),
                degree: numeral.degree,
                quality: numeral.quality,
                function: HarmonicFunction::from_degree(numeral.degree),
            })
            .collect();

        let genre_patterns = if options.include_genres {
            let genre_options = GenreOptions {
                genre: options.genre_hint,
            };
            self.genres.classify(&self.detector, chords, &genre_options)
        } else {
            Vec::new()
        };

        Ok(ProgressionAnalysis {
            key,
            confidence,
            chords: chord_analyses,
            cadences: detect_cadences(&tokens, &numerals),
            secondary_dominants: detect_secondary_dominants(&tokens, &numerals, key),
            borrowed_chords: detect_borrowed_chords(&tokens, &numerals, key),
            patterns: match_common_patterns(&numerals),
            genre_patterns,
            loopable: is_loopable(&numerals),
        })
    }

    /// Ranked genres. Never fails; see [`GenreClassifier::classify`].
    pub fn detect_genre<S: AsRef<str>>(
        &self,
        chords: &[S],
        options: &GenreOptions,
    ) -> Vec<GenreDetectionResult> {
        self.genres.classify(&self.detector, chords, options)
    }
}
