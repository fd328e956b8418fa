use harmonia_progression::{
    analyze_progression, detect_key, roman_numerals, AnalysisError, AnalyzeOptions, Analyzer,
    CadenceKind, KeyMode, QualityClass,
};

const PROGRESSIONS: &[&[&str]] = &[
    &["C", "F", "G", "C"],
    &["C", "G", "Am", "F"],
    &["Dm7", "G7", "Cmaj7"],
    &["Am", "Dm", "E7", "Am"],
    &["E", "B7", "C#m", "A", "E"],
    &["Bb", "Eb", "F7", "Gm", "Cm7", "F", "Bb"],
    &["C", "Ab", "Bb", "C"],
    &["F#m", "D", "A", "E", "C#7"],
    &["Cmaj7", "Fmaj7", "Bø", "E7", "Am"],
    &["C", "C#dim7", "Dm7", "G7sus4", "C6"],
];

#[test]
fn test_key_confidence_is_diatonic_ratio() {
    for &chords in PROGRESSIONS {
        let found = detect_key(chords).unwrap();
        assert!((0.0..=1.0).contains(&found.confidence), "{chords:?}");
        assert_eq!(found.total_chords, chords.len());
        let expected = (found.diatonic_count as f64 / chords.len() as f64).min(1.0);
        assert!((found.confidence - expected).abs() < 1e-12, "{chords:?}");
    }
}

#[test]
fn test_key_detection_examples() {
    assert_eq!(detect_key(&["C", "F", "G", "C"]).unwrap().key.to_string(), "C major");
    assert_eq!(detect_key(&["C", "G", "Am", "F"]).unwrap().key.to_string(), "C major");
    assert_eq!(detect_key(&["Am", "Dm", "E7", "Am"]).unwrap().key.to_string(), "A minor");
    assert_eq!(detect_key(&["E", "B7", "C#m", "A", "E"]).unwrap().key.to_string(), "E major");
}

#[test]
fn test_key_detection_is_deterministic() {
    for &chords in PROGRESSIONS {
        assert_eq!(detect_key(chords).unwrap(), detect_key(chords).unwrap());
    }
}

#[test]
fn test_key_detection_errors() {
    let empty: [&str; 0] = [];
    assert_eq!(detect_key(&empty).unwrap_err(), AnalysisError::EmptyProgression);
    assert_eq!(
        detect_key(&["C", "Xm"]).unwrap_err(),
        AnalysisError::InvalidChord("Xm".to_string())
    );
}

#[test]
fn test_roman_numerals_cover_every_chord() {
    for &chords in PROGRESSIONS {
        for (root, mode) in [("C", KeyMode::Major), ("A", KeyMode::Minor), ("Eb", KeyMode::Major)] {
            let numerals = roman_numerals(chords, root, mode).unwrap();
            assert_eq!(numerals.len(), chords.len());
            for n in &numerals {
                assert!((1..=7).contains(&n.degree), "{n:?}");
            }
        }
    }
}

#[test]
fn test_roman_casing_invariant() {
    let symbols = [
        "C", "Cm", "Cdim", "Caug", "C7", "Cm7", "Cmaj7", "Cm7b5", "Cdim7", "C+7", "Csus4", "C6",
        "Cm6", "C9", "Cm11", "C13", "CmMaj7", "C5",
    ];
    for root in ["C", "D", "F#", "Bb"] {
        for mode in [KeyMode::Major, KeyMode::Minor] {
            let numerals = roman_numerals(&symbols, root, mode).unwrap();
            for n in numerals {
                let letters: String = n
                    .roman
                    .chars()
                    .filter(|c| matches!(c, 'I' | 'V' | 'i' | 'v'))
                    .collect();
                match n.quality {
                    QualityClass::Minor => {
                        assert_eq!(letters, letters.to_lowercase(), "{n:?}");
                        assert!(!n.roman.contains('°'), "{n:?}");
                    }
                    QualityClass::Diminished => {
                        assert_eq!(letters, letters.to_lowercase(), "{n:?}");
                        assert!(n.roman.contains('°'), "{n:?}");
                    }
                    QualityClass::Augmented => {
                        assert_eq!(letters, letters.to_uppercase(), "{n:?}");
                        assert!(n.roman.contains('+'), "{n:?}");
                    }
                    QualityClass::Major | QualityClass::Dominant => {
                        assert_eq!(letters, letters.to_uppercase(), "{n:?}");
                    }
                }
            }
        }
    }
}

#[test]
fn test_roman_numerals_reject_bad_chords() {
    assert_eq!(
        roman_numerals(&["C", "Cqq"], "C", KeyMode::Major).unwrap_err(),
        AnalysisError::InvalidChord("Cqq".to_string())
    );
}

#[test]
fn test_analyze_one_four_five_one() {
    let report = analyze_progression(&["C", "F", "G", "C"], &AnalyzeOptions::default()).unwrap();
    assert_eq!(report.key.to_string(), "C major");
    assert_eq!(report.romans(), ["I", "IV", "V", "I"]);

    let authentic: Vec<_> = report
        .cadences
        .iter()
        .filter(|c| c.kind == CadenceKind::Authentic)
        .collect();
    assert_eq!(authentic.len(), 1);
    assert_eq!(authentic[0].chords, ["G".to_string(), "C".to_string()]);
    assert!(report.loopable);
    assert!(report.patterns.iter().any(|p| p.pattern == "I-IV-V-I"));
}

#[test]
fn test_analyze_reports_chromatic_colour() {
    let report = analyze_progression(
        &["C", "A7", "Dm", "G7", "C", "Fm", "C"],
        &AnalyzeOptions::default(),
    )
    .unwrap();
    assert_eq!(report.key.to_string(), "C major");

    let secondary: Vec<&str> = report
        .secondary_dominants
        .iter()
        .map(|s| s.roman_notation.as_str())
        .collect();
    assert_eq!(secondary, ["V7/ii"]);

    let borrowed: Vec<&str> = report.borrowed_chords.iter().map(|b| b.chord.as_str()).collect();
    assert_eq!(borrowed, ["Fm"]);
}

#[test]
fn test_analyze_accepts_altered_and_lower_case_symbols() {
    let report =
        analyze_progression(&["Dm7", "G7b13", "Cmaj7#11"], &AnalyzeOptions::default()).unwrap();
    assert_eq!(report.key.to_string(), "C major");
    assert_eq!(report.romans(), ["ii7", "V7", "Imaj7"]);

    let symbols = ["G9sus4", "G7alt", "Dm7b9", "Cm(add9)", "Cmaj7#5", "C7b9#11", "Cadd11", "c"];
    let numerals = roman_numerals(&symbols, "C", KeyMode::Major).unwrap();
    assert_eq!(numerals.len(), symbols.len());

    let lower = detect_key(&["c", "f", "g7", "c"]).unwrap();
    assert_eq!(lower.key.to_string(), "C major");
}

#[test]
fn test_chromatic_root_is_not_a_cadence() {
    let report = analyze_progression(&["C", "F#", "C"], &AnalyzeOptions::default()).unwrap();
    assert_eq!(report.romans(), ["I", "♭V", "I"]);
    assert!(report.cadences.is_empty());
}

#[test]
fn test_analyze_errors() {
    let empty: Vec<String> = Vec::new();
    assert_eq!(
        analyze_progression(&empty, &AnalyzeOptions::default()).unwrap_err(),
        AnalysisError::EmptyProgression
    );
    assert!(matches!(
        analyze_progression(&["C", "?"], &AnalyzeOptions::default()),
        Err(AnalysisError::InvalidChord(_))
    ));
}

#[test]
fn test_analyzer_is_shareable_across_threads() {
    let analyzer = Analyzer::default();
    let expected = analyzer.detect_key(&["C", "G", "Am", "F"]).unwrap();

    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..10 {
                    let found = analyzer.detect_key(&["C", "G", "Am", "F"]).unwrap();
                    assert_eq!(found, expected);
                }
            });
        }
    });
}

#[test]
fn test_report_serializes_to_json() {
    let report = analyze_progression(&["Dm7", "G7", "Cmaj7"], &AnalyzeOptions::default()).unwrap();
    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["key"], "C major");
    assert_eq!(value["chords"][0]["roman"], "ii7");
    assert_eq!(value["chords"][1]["function"], "dominant");
    assert_eq!(value["genrePatterns"][0]["genre"], "jazz");
    assert!(value["secondaryDominants"].is_array());
}
