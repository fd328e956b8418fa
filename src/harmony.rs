//! Analyzers over a roman-numeral sequence: harmonic function, cadences,
//! secondary dominants, borrowed chords and named common progressions.

use serde::Serialize;

use crate::chord::{ChordToken, QualityClass};
use crate::key::{diatonic_triad_quality, Key, KeyMode};
use crate::roman::{plain_numeral, split_numeral, RomanNumeral};

/// Function of a scale degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HarmonicFunction {
    Tonic,
    Subdominant,
    Dominant,
    Deceptive,
    Passing,
}

impl HarmonicFunction {
    pub fn from_degree(degree: u8) -> Self {
        match degree {
            1 => HarmonicFunction::Tonic,
            2 | 4 => HarmonicFunction::Subdominant,
            5 => HarmonicFunction::Dominant,
            6 => HarmonicFunction::Deceptive,
            _ => HarmonicFunction::Passing,
        }
    }
}

/// Cadence shapes, matched on natural scale degrees only: a chromatic root such as
/// `♭V` never stands in for V.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CadenceKind {
    /// V -> I.
    Authentic,
    /// IV -> I.
    Plagal,
    /// V -> vi.
    Deceptive,
    /// Anything -> V at the very end.
    Half,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CadenceStrength {
    Strong,
    Weak,
}

/// A two-chord resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cadence {
    pub kind: CadenceKind,
    pub strength: CadenceStrength,
    /// The two chord symbols, in order.
    pub chords: [String; 2],
    /// Index of the resolution chord (the second of the pair).
    pub position: usize,
}

/// Scan consecutive pairs for cadential motion. A half cadence only counts on the final pair.
pub fn detect_cadences(tokens: &[ChordToken], numerals: &[RomanNumeral]) -> Vec<Cadence> {
    let last_pair = numerals.len().saturating_sub(1);
    let mut out = Vec::new();

    for i in 1..numerals.len().min(tokens.len()) {
        let from = natural_degree(&numerals[i - 1]);
        let to = natural_degree(&numerals[i]);
        let found = match (from, to) {
            (Some(5), Some(1)) => Some((CadenceKind::Authentic, CadenceStrength::Strong)),
            (Some(4), Some(1)) => Some((CadenceKind::Plagal, CadenceStrength::Weak)),
            (Some(5), Some(6)) => Some((CadenceKind::Deceptive, CadenceStrength::Weak)),
            (_, Some(5)) if i == last_pair => Some((CadenceKind::Half, CadenceStrength::Weak)),
            _ => None,
        };
        if let Some((kind, strength)) = found {
            out.push(Cadence {
                kind,
                strength,
                chords: [tokens[i - 1].symbol.clone(), tokens[i].symbol.clone()],
                position: i,
            });
        }
    }
    out
}

// Degree of a numeral with no accidental; `♭V` has none.
fn natural_degree(numeral: &RomanNumeral) -> Option<u8> {
    let (label, _) = split_numeral(&numeral.roman);
    (!label.starts_with(&['♭', '♯'][..])).then_some(numeral.degree)
}

/// A dominant-quality chord resolving down a fifth to something other than the tonic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecondaryDominant {
    pub chord: String,
    pub target_chord: String,
    /// e.g. `V7/vi`.
    pub roman_notation: String,
    pub position: usize,
}

pub fn detect_secondary_dominants(
    tokens: &[ChordToken],
    numerals: &[RomanNumeral],
    key: Key,
) -> Vec<SecondaryDominant> {
    let mut out = Vec::new();
    for i in 0..tokens.len().saturating_sub(1) {
        let (chord, next) = (&tokens[i], &tokens[i + 1]);
        if !chord.quality.is_dominant_family() {
            continue;
        }
        // If chord is V of X, then X = chord root + 5 (mod 12).
        if next.tonic != chord.tonic.transpose(5) || next.tonic == key.tonic {
            continue;
        }
        let Some(target) = numerals.get(i + 1) else {
            continue;
        };
        out.push(SecondaryDominant {
            chord: chord.symbol.clone(),
            target_chord: next.symbol.clone(),
            roman_notation: format!("V7/{}", plain_numeral(&target.roman)),
            position: i,
        });
    }
    out
}

/// A chord taken from the parallel key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowedChord {
    pub chord: String,
    pub roman: String,
    pub borrowed_from: Key,
    pub position: usize,
}

/// Chords whose root or quality leaves the key while every tone fits the parallel key.
///
/// Dominant-function chords native to the key (major V7; minor V, V7 and vii° from
/// harmonic minor) are never reported.
pub fn detect_borrowed_chords(
    tokens: &[ChordToken],
    numerals: &[RomanNumeral],
    key: Key,
) -> Vec<BorrowedChord> {
    let tonic_scale = key.diatonic_scale();
    let parallel = key.parallel();
    let parallel_scale = parallel.diatonic_scale();

    let mut out = Vec::new();
    for (i, (token, numeral)) in tokens.iter().zip(numerals).enumerate() {
        if token.notes.is_empty() || is_native_dominant(token, key) {
            continue;
        }
        let class = token.quality.class();
        let root_absent = !tonic_scale.contains(&token.tonic);
        let quality_mismatch = key
            .degree_of(token.tonic)
            .is_some_and(|deg| class != diatonic_triad_quality(key.mode, deg));
        let fits_parallel = token.notes.iter().all(|pc| parallel_scale.contains(pc));

        if (root_absent || quality_mismatch) && fits_parallel {
            out.push(BorrowedChord {
                chord: token.symbol.clone(),
                roman: numeral.roman.clone(),
                borrowed_from: parallel,
                position: i,
            });
        }
    }
    out
}

fn is_native_dominant(token: &ChordToken, key: Key) -> bool {
    let class = token.quality.class();
    let on_five = key.degree_pitch(5) == Some(token.tonic);
    match key.mode {
        KeyMode::Major => on_five && class == QualityClass::Dominant,
        KeyMode::Minor => {
            (on_five && matches!(class, QualityClass::Major | QualityClass::Dominant))
                || (token.tonic == key.leading_tone() && class == QualityClass::Diminished)
        }
    }
}

/// A named progression found in the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommonPattern {
    pub name: &'static str,
    pub pattern: &'static str,
    pub description: &'static str,
}

const COMMON_PROGRESSIONS: &[CommonPattern] = &[
    CommonPattern {
        name: "Three-chord trick",
        pattern: "I-IV-V",
        description: "Tonic, subdominant and dominant in ascending order",
    },
    CommonPattern {
        name: "Full cadence",
        pattern: "I-IV-V-I",
        description: "Tonic, subdominant, dominant and back home",
    },
    CommonPattern {
        name: "ii-V-I",
        pattern: "ii-V-I",
        description: "Predominant to dominant to tonic; the backbone of jazz harmony",
    },
    CommonPattern {
        name: "Axis progression",
        pattern: "I-V-vi-IV",
        description: "The most common four-chord pop loop",
    },
    CommonPattern {
        name: "Axis progression (minor start)",
        pattern: "vi-IV-I-V",
        description: "Rotation of the axis loop that opens on the relative minor",
    },
    CommonPattern {
        name: "Fifties progression",
        pattern: "I-vi-IV-V",
        description: "Doo-wop changes",
    },
    CommonPattern {
        name: "Turnaround",
        pattern: "I-vi-ii-V",
        description: "Circle-of-fifths turnaround back to the tonic",
    },
    CommonPattern {
        name: "Circle progression",
        pattern: "vi-ii-V-I",
        description: "Root motion by descending fifths into the tonic",
    },
    CommonPattern {
        name: "Minor ii-V-i",
        pattern: "ii°-V-i",
        description: "Half-diminished predominant resolving through the dominant to a minor tonic",
    },
    CommonPattern {
        name: "Andalusian cadence",
        pattern: "i-VII-VI-V",
        description: "Descending tetrachord in minor ending on the dominant",
    },
    CommonPattern {
        name: "Mixolydian vamp",
        pattern: "I-♭VII-IV",
        description: "Flat-seven double plagal motion",
    },
    CommonPattern {
        name: "Aeolian cadence",
        pattern: "♭VI-♭VII-I",
        description: "Borrowed flat-six and flat-seven rising to the tonic",
    },
    CommonPattern {
        name: "Pachelbel progression",
        pattern: "I-V-vi-iii-IV-I-IV-V",
        description: "The Canon in D ground bass",
    },
    CommonPattern {
        name: "Plagal cadence",
        pattern: "IV-I",
        description: "Subdominant to tonic, the 'amen' cadence",
    },
    CommonPattern {
        name: "Perfect cadence",
        pattern: "V-I",
        description: "Dominant to tonic",
    },
];

/// Named progressions occurring as contiguous runs of the extension-stripped numerals.
pub fn match_common_patterns(numerals: &[RomanNumeral]) -> Vec<CommonPattern> {
    let stripped: Vec<&str> = numerals.iter().map(|n| split_numeral(&n.roman).0).collect();

    let mut out: Vec<CommonPattern> = Vec::new();
    for candidate in COMMON_PROGRESSIONS {
        let needle: Vec<&str> = candidate.pattern.split('-').collect();
        if contains_run(&stripped, &needle, |have, want| have == want)
            && !out.iter().any(|p| p.name == candidate.name)
        {
            out.push(candidate.clone());
        }
    }
    out
}

/// True if `needle` occurs as a contiguous run in `haystack` under `eq(have, want)`.
pub(crate) fn contains_run<F>(haystack: &[&str], needle: &[&str], eq: F) -> bool
where
    F: Fn(&str, &str) -> bool,
{
    if needle.is_empty() || needle.len() > haystack.len() {
        return false;
    }
    haystack
        .windows(needle.len())
        .any(|w| w.iter().zip(needle).all(|(have, want)| eq(have, want)))
}

/// Opens on the tonic and closes on the tonic or the dominant.
pub fn is_loopable(numerals: &[RomanNumeral]) -> bool {
    match (numerals.first(), numerals.last()) {
        (Some(first), Some(last)) => first.degree == 1 && (last.degree == 5 || last.degree == 1),
        _ => false,
    }
}
