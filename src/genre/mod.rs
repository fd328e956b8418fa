//! Genre inference from roman-numeral pattern evidence.
//!
//! The classifier never trusts a single key. It reads the progression under every
//! plausible key (detector winner, opening chord, closing chord, resolution of a
//! trailing dominant, plus each one's relative) and matches the weighted catalog
//! against all of those readings. Long inputs are cut into overlapping windows.

pub mod catalog;

use std::ops::Range;

use serde::Serialize;

use crate::chord::{ChordToken, QualityClass};
use crate::config::AnalyzerConfig;
use crate::detect::KeyDetector;
use crate::error::{AnalysisError, Result};
use crate::harmony::contains_run;
use crate::key::Key;
use crate::roman::{roman_numeral, split_numeral};

pub use catalog::{Genre, GenrePattern, GENRE_PATTERNS};

/// Per-call genre options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenreOptions {
    /// Only score patterns from this genre.
    pub genre: Option<Genre>,
}

/// One ranked genre.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenreDetectionResult {
    pub genre: Genre,
    /// 0.0..=1.0.
    pub confidence: f64,
    pub matched_patterns: Vec<GenrePattern>,
}

impl GenreDetectionResult {
    pub fn unknown() -> Self {
        Self {
            genre: Genre::Unknown,
            confidence: 0.0,
            matched_patterns: Vec::new(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.genre == Genre::Unknown
    }
}

/// Window geometry for long progressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Windowing {
    pub whole_threshold: usize,
    pub size: usize,
    pub stride: usize,
    pub min_trailing: usize,
}

impl From<&AnalyzerConfig> for Windowing {
    fn from(config: &AnalyzerConfig) -> Self {
        Self {
            whole_threshold: config.whole_threshold,
            size: config.window_size.max(1),
            stride: config.window_stride.max(1),
            min_trailing: config.min_trailing_window,
        }
    }
}

impl Default for Windowing {
    fn default() -> Self {
        Self::from(&AnalyzerConfig::default())
    }
}

impl Windowing {
    /// Index ranges to analyze for a progression of `len` chords.
    ///
    /// Full windows start every `stride` chords while they fit. Chords left after the
    /// last full window open one more window at the next stride start, unless fewer
    /// than `min_trailing` remain, in which case the last window is stretched to the end.
    pub fn windows(&self, len: usize) -> Vec<Range<usize>> {
        if len == 0 {
            return Vec::new();
        }
        if len <= self.whole_threshold || len <= self.size {
            return vec![0..len];
        }

        let mut out: Vec<Range<usize>> = Vec::new();
        let mut start = 0;
        while start + self.size <= len {
            out.push(start..start + self.size);
            start += self.stride;
        }

        let covered = out.last().map_or(0, |w| w.end);
        let remaining = len - covered;
        if remaining > 0 {
            match out.last_mut() {
                Some(last) if remaining < self.min_trailing => last.end = len,
                _ => out.push(start.min(covered)..len),
            }
        }
        out
    }
}

/// Ranks genres for a progression.
#[derive(Debug, Clone, Default)]
pub struct GenreClassifier {
    windowing: Windowing,
}

impl GenreClassifier {
    pub fn new(windowing: Windowing) -> Self {
        Self { windowing }
    }

    /// Best-effort classification. Empty input, any unparsable chord, or no matches
    /// all yield a single `unknown` result.
    pub fn classify<S: AsRef<str>>(
        &self,
        detector: &KeyDetector,
        chords: &[S],
        options: &GenreOptions,
    ) -> Vec<GenreDetectionResult> {
        match self.try_classify(detector, chords, options) {
            Ok(results) if !results.is_empty() => results,
            Ok(_) => vec![GenreDetectionResult::unknown()],
            Err(e) => {
                log::debug!("genre detection degraded to unknown: {e}");
                vec![GenreDetectionResult::unknown()]
            }
        }
    }

    fn try_classify<S: AsRef<str>>(
        &self,
        detector: &KeyDetector,
        chords: &[S],
        options: &GenreOptions,
    ) -> Result<Vec<GenreDetectionResult>> {
        let tokens = ChordToken::parse_all(chords)?;
        if tokens.is_empty() {
            return Err(AnalysisError::EmptyProgression);
        }

        let keys = candidate_keys(detector, &tokens)?;
        let windows = self.windowing.windows(tokens.len());
        log::debug!(
            "genre: {} chords, {} window(s), candidate keys [{}]",
            tokens.len(),
            windows.len(),
            keys.iter().map(Key::to_string).collect::<Vec<_>>().join(", ")
        );

        let readings = readings(&tokens, &windows, &keys);
        Ok(rank(&readings, options))
    }
}

/// Keys worth reading the progression in, deduplicated, in discovery order.
pub fn candidate_keys(detector: &KeyDetector, tokens: &[ChordToken]) -> Result<Vec<Key>> {
    let (Some(first), Some(last)) = (tokens.first(), tokens.last()) else {
        return Err(AnalysisError::EmptyProgression);
    };

    let mut seeds = vec![
        detector.detect(tokens)?.key,
        implied_key(first),
        implied_key(last),
    ];
    if last.quality.class() == QualityClass::Dominant {
        // A trailing dominant seventh points a fourth up.
        seeds.push(Key::major(last.tonic.transpose(5)));
    }

    let mut keys: Vec<Key> = Vec::new();
    for seed in seeds {
        for key in [seed, seed.relative()] {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
    }
    Ok(keys)
}

/// The key a chord would be the tonic of: minor for minor/diminished chords.
fn implied_key(token: &ChordToken) -> Key {
    match token.quality.class() {
        QualityClass::Minor | QualityClass::Diminished => Key::minor(token.tonic),
        _ => Key::major(token.tonic),
    }
}

/// Roman-numeral token lists for every (window, key) pair that converts cleanly.
fn readings(tokens: &[ChordToken], windows: &[Range<usize>], keys: &[Key]) -> Vec<Vec<String>> {
    let mut out = Vec::with_capacity(windows.len() * keys.len());
    for window in windows {
        let slice = &tokens[window.clone()];
        for &key in keys {
            let reading: Option<Vec<String>> = slice
                .iter()
                .map(|t| roman_numeral(t, key).ok().map(|r| r.roman))
                .collect();
            match reading {
                Some(r) => {
                    log::trace!("{key} {window:?}: {}", r.join("-"));
                    out.push(r);
                }
                None => log::trace!("{key} {window:?}: skipped"),
            }
        }
    }
    out
}

/// A pattern token without an extension accepts any extension; one with an
/// extension must match exactly.
pub fn token_matches(have: &str, want: &str) -> bool {
    let (want_numeral, want_ext) = split_numeral(want);
    if want_ext.is_empty() {
        split_numeral(have).0 == want_numeral
    } else {
        have == want
    }
}

/// Whether `pattern` occurs as a contiguous run in any reading.
pub fn pattern_matches(pattern: &str, readings: &[Vec<String>]) -> bool {
    let needle: Vec<&str> = pattern.split('-').collect();
    readings.iter().any(|reading| {
        let hay: Vec<&str> = reading.iter().map(String::as_str).collect();
        contains_run(&hay, &needle, token_matches)
    })
}

fn rank(readings: &[Vec<String>], options: &GenreOptions) -> Vec<GenreDetectionResult> {
    let mut by_genre: Vec<(Genre, Vec<GenrePattern>)> = Vec::new();

    for pattern in GENRE_PATTERNS {
        if options.genre.is_some_and(|g| g != pattern.genre) {
            continue;
        }
        if !pattern_matches(pattern.pattern, readings) {
            continue;
        }
        match by_genre.iter_mut().find(|(g, _)| *g == pattern.genre) {
            Some((_, matched)) => matched.push(pattern.clone()),
            None => by_genre.push((pattern.genre, vec![pattern.clone()])),
        }
    }

    let mut results: Vec<GenreDetectionResult> = by_genre
        .into_iter()
        .map(|(genre, matched_patterns)| GenreDetectionResult {
            genre,
            confidence: confidence(&matched_patterns),
            matched_patterns,
        })
        .collect();
    // Stable: ties keep discovery order.
    results.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    results
}

/// Mean weight over ten, capped at 1.0.
fn confidence(matched: &[GenrePattern]) -> f64 {
    if matched.is_empty() {
        return 0.0;
    }
    let total: u32 = matched.iter().map(|p| u32::from(p.weight)).sum();
    (f64::from(total) / (matched.len() as f64 * 10.0)).min(1.0)
}
