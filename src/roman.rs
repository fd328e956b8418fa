//! Roman-numeral labels for chords in a fixed key.
//!
//! Diatonic roots take their natural-scale degree. Other roots are placed by
//! chromatic distance from the tonic and carry a `♭` when they sit below a
//! major-scale degree, so borrowed and chromatic chords still get a label.

use serde::Serialize;

use crate::chord::{ChordToken, QualityClass};
use crate::error::{AnalysisError, Result};
use crate::key::Key;

/// A chord's label in a key.
///
/// Casing follows `quality`: upper case for major, dominant and augmented (`+`),
/// lower case for minor, lower case with `°` for diminished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RomanNumeral {
    /// Full label, e.g. `ii7`, `V7`, `♭VIImaj7`.
    pub roman: String,
    /// 1..=7.
    pub degree: u8,
    pub quality: QualityClass,
}

// Semitones above the tonic -> (degree, accidental).
const CHROMATIC_DEGREES: [(u8, &str); 12] = [
    (1, ""),
    (2, "♭"),
    (2, ""),
    (3, "♭"),
    (3, ""),
    (4, ""),
    (5, "♭"),
    (5, ""),
    (6, "♭"),
    (6, ""),
    (7, "♭"),
    (7, ""),
];

const EXTENSION_PRIORITY: [&str; 5] = ["13", "11", "9", "7", "6"];

/// Label one chord in `key`.
pub fn roman_numeral(token: &ChordToken, key: Key) -> Result<RomanNumeral> {
    let (degree, accidental) = match key.degree_of(token.tonic) {
        Some(deg) => (deg, ""),
        None => chromatic_degree(key.tonic.interval_to(token.tonic))?,
    };
    let quality = token.quality.class();
    let roman = format!(
        "{accidental}{}{}",
        roman_for_degree(degree, quality),
        extension_suffix(token)
    );
    Ok(RomanNumeral {
        roman,
        degree,
        quality,
    })
}

/// Label every chord in `key`, failing on the first miss.
pub fn roman_numerals(tokens: &[ChordToken], key: Key) -> Result<Vec<RomanNumeral>> {
    tokens.iter().map(|t| roman_numeral(t, key)).collect()
}

fn chromatic_degree(distance: u8) -> Result<(u8, &'static str)> {
    CHROMATIC_DEGREES
        .get(usize::from(distance))
        .copied()
        .ok_or(AnalysisError::UnknownScaleDegree(distance))
}

/// Base numeral for a degree with quality casing, no extension.
pub fn roman_for_degree(deg: u8, quality: QualityClass) -> String {
    let base = match deg {
        1 => "I",
        2 => "II",
        3 => "III",
        4 => "IV",
        5 => "V",
        6 => "VI",
        7 => "VII",
        _ => "?",
    };
    match quality {
        QualityClass::Major | QualityClass::Dominant => base.to_string(),
        QualityClass::Minor => base.to_ascii_lowercase(),
        QualityClass::Diminished => format!("{}°", base.to_ascii_lowercase()),
        QualityClass::Augmented => format!("{}+", base),
    }
}

/// Extension read from the symbol's quality text.
///
/// Major-seventh spellings win first so `mMaj7` is not read as a minor seventh;
/// then the highest numeric extension present; then the chord's structure.
/// Altered and added tones are not part of the quality text, so `G7b13` is `V7`.
pub fn extension_suffix(token: &ChordToken) -> String {
    let suffix = token.quality_text.as_str();

    if let Some(number) = major_seventh_extension(suffix) {
        return format!("maj{number}");
    }
    if let Some(ext) = EXTENSION_PRIORITY.iter().find(|e| suffix.contains(*e)) {
        return ext.to_string();
    }
    token.structural_extension().unwrap_or("").to_string()
}

fn major_seventh_extension(suffix: &str) -> Option<String> {
    let after = |i: usize| -> String {
        suffix[i..].chars().take_while(|c| c.is_ascii_digit()).collect()
    };

    if let Some(i) = suffix.find("maj").or_else(|| suffix.find("Maj")) {
        let digits = after(i + 3);
        return (!digits.is_empty()).then_some(digits);
    }
    if let Some(i) = suffix.find('M') {
        let digits = after(i + 1);
        return (!digits.is_empty()).then_some(digits);
    }
    if let Some(i) = suffix.find('Δ') {
        let digits = after(i + 'Δ'.len_utf8());
        return Some(if digits.is_empty() { "7".to_string() } else { digits });
    }
    None
}

/// Split a label into its numeral (accidental, letters, `°`/`+`) and extension.
///
/// `♭VIImaj7` -> (`♭VII`, `maj7`); `ii°7` -> (`ii°`, `7`); `V` -> (`V`, ``).
pub fn split_numeral(label: &str) -> (&str, &str) {
    let mut end = 0;
    let mut seen_letter = false;
    for (i, c) in label.char_indices() {
        let keep = match c {
            '♭' | '♯' | 'b' | '#' if !seen_letter => true,
            'I' | 'V' | 'i' | 'v' => {
                seen_letter = true;
                true
            }
            '°' | '+' | 'ø' if seen_letter => true,
            _ => false,
        };
        if !keep {
            break;
        }
        end = i + c.len_utf8();
    }
    label.split_at(end)
}

/// The numeral with extension and accidental removed: `♭VII7` -> `VII`.
pub fn plain_numeral(label: &str) -> &str {
    let (numeral, _) = split_numeral(label);
    numeral.trim_start_matches(&['♭', '♯', 'b', '#'][..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::PitchClass;

    fn rn(symbol: &str, key: &str) -> RomanNumeral {
        let key: Key = key.parse().unwrap();
        roman_numeral(&ChordToken::parse(symbol).unwrap(), key).unwrap()
    }

    fn label(symbol: &str, key: &str) -> String {
        rn(symbol, key).roman
    }

    #[test]
    fn diatonic_triads_in_c_major() {
        let labels: Vec<String> = ["C", "Dm", "Em", "F", "G", "Am", "Bdim"]
            .iter()
            .map(|s| label(s, "C major"))
            .collect();
        assert_eq!(labels, ["I", "ii", "iii", "IV", "V", "vi", "vii°"]);
    }

    #[test]
    fn sevenths_and_extensions() {
        assert_eq!(label("Dm7", "C major"), "ii7");
        assert_eq!(label("G7", "C major"), "V7");
        assert_eq!(label("Cmaj7", "C major"), "Imaj7");
        assert_eq!(label("CM7", "C major"), "Imaj7");
        assert_eq!(label("CΔ", "C major"), "Imaj7");
        assert_eq!(label("Fmaj9", "C major"), "IVmaj9");
        assert_eq!(label("G13", "C major"), "V13");
        assert_eq!(label("Dm11", "C major"), "ii11");
        assert_eq!(label("G9", "C major"), "V9");
        assert_eq!(label("Am6", "C major"), "vi6");
        assert_eq!(label("Bm7b5", "C major"), "vii°7");
        assert_eq!(label("Bø", "C major"), "vii°7");
        assert_eq!(label("Cmaj", "C major"), "I");
    }

    #[test]
    fn altered_tones_do_not_change_the_extension() {
        assert_eq!(label("G7b13", "C major"), "V7");
        assert_eq!(label("G7alt", "C major"), "V7");
        assert_eq!(label("Cmaj7#11", "C major"), "Imaj7");
        assert_eq!(label("Dm7b9", "C major"), "ii7");
        assert_eq!(label("G9sus4", "C major"), "V9");
        assert_eq!(label("Cadd9", "C major"), "I");
        assert_eq!(label("Cm(add9)", "C minor"), "i");
    }

    #[test]
    fn minor_major_seventh_is_not_read_as_minor_seventh() {
        assert_eq!(label("AmMaj7", "A minor"), "imaj7");
        assert_eq!(label("Am(maj7)", "A minor"), "imaj7");
    }

    #[test]
    fn chromatic_roots_get_flats() {
        assert_eq!(label("Bb", "C major"), "♭VII");
        assert_eq!(label("Ab", "C major"), "♭VI");
        assert_eq!(label("Eb", "C major"), "♭III");
        assert_eq!(label("Db7", "C major"), "♭II7");
        assert_eq!(label("F#dim", "C major"), "♭v°");
        assert_eq!(label("D", "C major"), "II");
        assert_eq!(label("E7", "C major"), "III7");
        assert_eq!(label("Fm", "C major"), "iv");
    }

    #[test]
    fn minor_keys_use_the_natural_scale() {
        assert_eq!(label("Am", "A minor"), "i");
        assert_eq!(label("G", "A minor"), "VII");
        assert_eq!(label("F", "A minor"), "VI");
        assert_eq!(label("E7", "A minor"), "V7");
        assert_eq!(label("G#dim", "A minor"), "vii°");
        assert_eq!(rn("G#dim", "A minor").degree, 7);
    }

    #[test]
    fn casing_matches_quality() {
        let aug = rn("Caug", "C major");
        assert_eq!(aug.roman, "I+");
        assert_eq!(aug.quality, QualityClass::Augmented);

        let dom = rn("G7", "C major");
        assert_eq!(dom.quality, QualityClass::Dominant);
        assert!(dom.roman.starts_with('V'));

        let dim = rn("Bdim", "C major");
        assert!(dim.roman.ends_with('°'));
    }

    #[test]
    fn every_root_gets_a_degree_in_range() {
        for key in ["C major", "A minor", "F# major", "Eb minor"] {
            for pc in 0..12 {
                let sym = format!("{}m7", PitchClass(pc).display_sharp());
                let r = rn(&sym, key);
                assert!((1..=7).contains(&r.degree), "{sym} in {key}: {r:?}");
            }
        }
    }

    #[test]
    fn chromatic_table_rejects_out_of_range() {
        assert_eq!(chromatic_degree(12), Err(AnalysisError::UnknownScaleDegree(12)));
    }

    #[test]
    fn splits_numerals() {
        assert_eq!(split_numeral("♭VIImaj7"), ("♭VII", "maj7"));
        assert_eq!(split_numeral("ii°7"), ("ii°", "7"));
        assert_eq!(split_numeral("III+7"), ("III+", "7"));
        assert_eq!(split_numeral("V"), ("V", ""));
        assert_eq!(split_numeral("vi6"), ("vi", "6"));
        assert_eq!(plain_numeral("♭VII7"), "VII");
        assert_eq!(plain_numeral("vi"), "vi");
    }
}
