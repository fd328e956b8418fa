//! Key detection: score all 24 major/minor keys against a chord sequence.

use std::sync::{Mutex, MutexGuard};

use serde::Serialize;

use crate::cache::{CacheStats, ScaleCache};
use crate::chord::{ChordToken, QualityClass};
use crate::error::{AnalysisError, Result};
use crate::key::{diatonic_triad_quality, Key, KeyMode};
use crate::pitch::PitchClass;

const DIATONIC_POINTS: i32 = 2;
const NON_DIATONIC_PENALTY: i32 = 1;
const OPENING_TONIC_BONUS: i32 = 4;
const CLOSING_TONIC_BONUS: i32 = 2;
const DECEPTIVE_MOTION_BONUS: i32 = 3;

// Enumeration order doubles as the tie-break: majors before minors, then
// fewer accidentals (circle-of-fifths distance from C major / A minor).
const MAJOR_ORDER: [u8; 12] = [0, 7, 5, 2, 10, 9, 3, 4, 8, 11, 1, 6];
const MINOR_ORDER: [u8; 12] = [9, 4, 2, 11, 7, 6, 0, 1, 5, 8, 10, 3];

/// All 24 candidate keys in tie-break order.
pub fn candidate_keys() -> impl Iterator<Item = Key> {
    MAJOR_ORDER
        .iter()
        .map(|&pc| Key::major(PitchClass(pc)))
        .chain(MINOR_ORDER.iter().map(|&pc| Key::minor(PitchClass(pc))))
}

/// One scored key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyCandidate {
    pub key: Key,
    pub score: i32,
    pub diatonic_count: usize,
}

/// The winning key for a progression.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyDetection {
    /// Displays as e.g. `C major`.
    pub key: Key,
    /// `diatonic_count / total_chords`, capped at 1.0.
    pub confidence: f64,
    pub root: String,
    pub scale_type: KeyMode,
    pub diatonic_count: usize,
    pub total_chords: usize,
    pub score: i32,
    /// Runner-up keys, best first.
    pub alternatives: Vec<KeyCandidate>,
}

/// Scores keys with a diatonic-membership heuristic.
///
/// Holds its own scale-note cache behind a lock, so one detector can be shared
/// across threads.
#[derive(Debug)]
pub struct KeyDetector {
    cache: Mutex<ScaleCache>,
    alternatives: usize,
}

impl KeyDetector {
    /// Detector with its own scale cache; reports `alternatives` runner-up keys.
    pub fn new(cache_capacity: usize, alternatives: usize) -> Self {
        Self {
            cache: Mutex::new(ScaleCache::new(cache_capacity)),
            alternatives,
        }
    }

    fn cache(&self) -> MutexGuard<'_, ScaleCache> {
        // The cache holds no invariants a panicking reader could break.
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Scale-cache occupancy and hit counts so far.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache().stats()
    }

    /// Pick the best of the 24 keys.
    pub fn detect(&self, tokens: &[ChordToken]) -> Result<KeyDetection> {
        if tokens.is_empty() {
            return Err(AnalysisError::EmptyProgression);
        }

        let mut scored: Vec<KeyCandidate> = candidate_keys()
            .map(|key| self.score_key(tokens, key))
            .collect();
        for c in &scored {
            log::trace!("{}: score {} ({} diatonic)", c.key, c.score, c.diatonic_count);
        }

        // Stable: equal scores keep enumeration order.
        scored.sort_by(|a, b| b.score.cmp(&a.score));
        let mut ranked = scored.into_iter();
        let best = ranked.next().ok_or(AnalysisError::EmptyProgression)?;
        let alternatives: Vec<KeyCandidate> = ranked.take(self.alternatives).collect();

        let total = tokens.len();
        let confidence = (best.diatonic_count as f64 / total as f64).min(1.0);
        log::debug!(
            "detected {} (score {}, {}/{} diatonic)",
            best.key,
            best.score,
            best.diatonic_count,
            total
        );
        log::trace!("{:?}", self.cache_stats());

        Ok(KeyDetection {
            key: best.key,
            confidence,
            root: best.key.root_name().to_string(),
            scale_type: best.key.mode,
            diatonic_count: best.diatonic_count,
            total_chords: total,
            score: best.score,
            alternatives,
        })
    }

    /// Score a single key against the progression.
    pub fn score_key(&self, tokens: &[ChordToken], key: Key) -> KeyCandidate {
        let scale = self.cache().scale_notes(key);

        let diatonic_count = tokens
            .iter()
            .filter(|t| is_diatonic_in(t, key, &scale))
            .count();
        let non_diatonic = tokens.len() - diatonic_count;

        let mut score =
            DIATONIC_POINTS * diatonic_count as i32 - NON_DIATONIC_PENALTY * non_diatonic as i32;

        if tokens.first().map(|t| t.tonic) == Some(key.tonic) {
            score += OPENING_TONIC_BONUS;
        }
        if tokens.last().map(|t| t.tonic) == Some(key.tonic) {
            score += CLOSING_TONIC_BONUS;
        }
        if key.mode == KeyMode::Major {
            score += DECEPTIVE_MOTION_BONUS * deceptive_motions(tokens, key) as i32;
        }

        KeyCandidate {
            key,
            score,
            diatonic_count,
        }
    }

    /// Whether `token` belongs to `key` by root and quality.
    pub fn is_diatonic(&self, token: &ChordToken, key: Key) -> bool {
        let scale = self.cache().scale_notes(key);
        is_diatonic_in(token, key, &scale)
    }
}

impl Default for KeyDetector {
    fn default() -> Self {
        let config = crate::AnalyzerConfig::default();
        Self::new(config.scale_cache_capacity, config.key_alternatives)
    }
}

fn is_diatonic_in(token: &ChordToken, key: Key, scale: &[PitchClass]) -> bool {
    if !scale.contains(&token.tonic) {
        return false;
    }
    let class = token.quality.class();

    if key.mode == KeyMode::Minor
        && (token.tonic == key.leading_tone() || token.tonic == key.raised_sixth())
    {
        // vii° (harmonic) and #vi° (melodic).
        return class == QualityClass::Diminished;
    }

    let Some(degree) = key.degree_of(token.tonic) else {
        return false;
    };
    let expected = diatonic_triad_quality(key.mode, degree);

    match class {
        QualityClass::Dominant => degree == 5,
        QualityClass::Augmented => false,
        // Harmonic-minor V.
        QualityClass::Major if key.mode == KeyMode::Minor && degree == 5 => true,
        _ => class == expected,
    }
}

/// Count V -> vi root motions in `key`.
fn deceptive_motions(tokens: &[ChordToken], key: Key) -> usize {
    let (Some(five), Some(six)) = (key.degree_pitch(5), key.degree_pitch(6)) else {
        return 0;
    };
    tokens
        .windows(2)
        .filter(|w| w[0].tonic == five && w[1].tonic == six)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(symbols: &[&str]) -> Vec<ChordToken> {
        ChordToken::parse_all(symbols).unwrap()
    }

    fn key(s: &str) -> Key {
        s.parse().unwrap()
    }

    #[test]
    fn enumerates_twenty_four_distinct_keys() {
        let keys: Vec<Key> = candidate_keys().collect();
        assert_eq!(keys.len(), 24);
        for (i, k) in keys.iter().enumerate() {
            assert!(!keys[i + 1..].contains(k), "duplicate {k}");
        }
        assert_eq!(keys[0], key("C major"));
        assert_eq!(keys[12], key("A minor"));
    }

    #[test]
    fn empty_progression_is_an_error() {
        let d = KeyDetector::default();
        assert_eq!(d.detect(&[]), Err(AnalysisError::EmptyProgression));
    }

    #[test]
    fn one_four_five_one_is_c_major() {
        let d = KeyDetector::default();
        let det = d.detect(&tokens(&["C", "F", "G", "C"])).unwrap();
        assert_eq!(det.key.to_string(), "C major");
        assert_eq!(det.root, "C");
        assert_eq!(det.scale_type, KeyMode::Major);
        assert_eq!(det.diatonic_count, 4);
        assert_eq!(det.total_chords, 4);
        assert_eq!(det.confidence, 1.0);
        // 4 diatonic * 2 + opening 4 + closing 2
        assert_eq!(det.score, 14);
        assert_eq!(det.alternatives.len(), 3);
    }

    #[test]
    fn opening_tonic_separates_relative_minor() {
        let d = KeyDetector::default();
        let det = d.detect(&tokens(&["Am", "Dm", "E", "Am"])).unwrap();
        assert_eq!(det.key, key("A minor"));
    }

    #[test]
    fn deceptive_motion_bonus_only_in_major() {
        let d = KeyDetector::default();
        let prog = tokens(&["C", "G", "Am", "F"]);
        let c = d.score_key(&prog, key("C major"));
        // 4 * 2 + opening 4 + one V -> vi
        assert_eq!(c.score, 15);
        let a = d.score_key(&prog, key("A minor"));
        assert_eq!(a.score, 8);
    }

    #[test]
    fn dominant_sevenths_only_on_five() {
        let d = KeyDetector::default();
        let c = key("C major");
        assert!(d.is_diatonic(&ChordToken::parse("G7").unwrap(), c));
        assert!(!d.is_diatonic(&ChordToken::parse("C7").unwrap(), c));
        assert!(!d.is_diatonic(&ChordToken::parse("D").unwrap(), c));
        assert!(d.is_diatonic(&ChordToken::parse("Bdim").unwrap(), c));

        let a = key("A minor");
        assert!(d.is_diatonic(&ChordToken::parse("E7").unwrap(), a));
        assert!(d.is_diatonic(&ChordToken::parse("E").unwrap(), a));
        assert!(d.is_diatonic(&ChordToken::parse("G#dim").unwrap(), a));
        assert!(!d.is_diatonic(&ChordToken::parse("G#").unwrap(), a));
    }

    #[test]
    fn ties_prefer_major_then_fewer_accidentals() {
        let d = KeyDetector::default();

        // C major and C minor both score 7.
        let prog = tokens(&["C", "Cm"]);
        assert_eq!(d.score_key(&prog, key("C major")).score, 7);
        assert_eq!(d.score_key(&prog, key("C minor")).score, 7);
        assert_eq!(d.detect(&prog).unwrap().key, key("C major"));

        // C major and G major both score 9; C has fewer accidentals.
        let prog = tokens(&["G", "Am", "G7"]);
        assert_eq!(d.score_key(&prog, key("C major")).score, 9);
        assert_eq!(d.score_key(&prog, key("G major")).score, 9);
        assert_eq!(d.detect(&prog).unwrap().key, key("C major"));

        // G major (one sharp) before D major (two).
        let det = d.detect(&tokens(&["D7", "D7"])).unwrap();
        assert_eq!(det.key, key("G major"));
    }

    #[test]
    fn confidence_is_diatonic_ratio() {
        let d = KeyDetector::default();
        let det = d
            .detect(&tokens(&["C", "F", "G", "C", "Eb", "Ab"]))
            .unwrap();
        let expected = det.diatonic_count as f64 / 6.0;
        assert!((det.confidence - expected).abs() < 1e-12);
        assert!((0.0..=1.0).contains(&det.confidence));
    }

    #[test]
    fn populates_cache_up_to_capacity() {
        let d = KeyDetector::new(10, 0);
        d.detect(&tokens(&["C", "G"])).unwrap();
        let stats = d.cache_stats();
        assert_eq!(stats.entries, 10);
        assert_eq!(stats.capacity, 10);
        // 24 keys scored, none fit without evicting.
        assert_eq!(stats.misses, 24);
    }
}
