//! Chord-symbol adapter.
//!
//! Turns text like `Dm7`, `G7b13`, `Cm(add9)` or `C/E` into a [`ChordToken`] once, at
//! the crate boundary. Everything downstream switches over [`ChordQuality`] /
//! [`QualityClass`] rather than re-reading the symbol.
//!
//! A suffix is read in parts: an optional base quality marker, one numeric extension,
//! then any number of `sus`, `add` and altered-tone modifiers. Modifiers only add
//! intervals (or move the fifth); the typed quality stays one of a closed set.

use serde::Serialize;

use crate::error::{AnalysisError, Result};
use crate::pitch::{split_note_prefix, PitchClass};

/// Closed set of chord qualities the adapter recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChordQuality {
    /// Major triad (`C`, `CM`, `Cmaj`).
    Major,
    /// Minor triad (`Cm`, `Cmin`, `C-`).
    Minor,
    /// Diminished triad (`Cdim`, `C°`).
    Diminished,
    /// Augmented triad (`Caug`, `C+`).
    Augmented,
    /// Root and fifth only (`C5`).
    Power,
    /// Suspended second (`Csus2`).
    Sus2,
    /// Suspended fourth (`Csus4`, `Csus`).
    Sus4,
    /// Major triad with added sixth (`C6`, `C6/9`).
    Major6,
    /// Minor triad with added sixth (`Cm6`).
    Minor6,
    /// Dominant seventh and its extensions (`C7`, `C9`, `C13`, `C7alt`).
    Dominant7,
    /// Dominant seventh with the third replaced by a fourth or second (`C7sus4`, `C9sus4`).
    Dominant7Sus4,
    /// Augmented triad with a minor seventh (`C+7`, `C7#5`).
    Augmented7,
    /// Major seventh (`Cmaj7`, `CΔ`, `Cmaj9`), including `maj7#5`.
    Major7,
    /// Minor seventh (`Cm7`, `Cm9`).
    Minor7,
    /// Minor triad with a major seventh (`CmMaj7`, `Cm(maj7)`).
    MinorMajor7,
    /// Half-diminished seventh (`Cm7b5`, `Cø`).
    HalfDiminished7,
    /// Fully diminished seventh (`Cdim7`, `C°7`).
    Diminished7,
}

/// The coarse quality that drives roman-numeral casing and diatonic checks.
///
/// - `Major`, `Dominant`, `Augmented` render upper case
/// - `Minor` renders lower case
/// - `Diminished` renders lower case with `°`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityClass {
    Major,
    Minor,
    Diminished,
    Augmented,
    Dominant,
}

impl ChordQuality {
    /// Collapse to the class used for casing and diatonic membership.
    pub fn class(self) -> QualityClass {
        use ChordQuality::*;
        match self {
            Major | Power | Sus2 | Sus4 | Major6 | Major7 => QualityClass::Major,
            Minor | Minor6 | Minor7 | MinorMajor7 => QualityClass::Minor,
            Diminished | HalfDiminished7 | Diminished7 => QualityClass::Diminished,
            Augmented | Augmented7 => QualityClass::Augmented,
            Dominant7 | Dominant7Sus4 => QualityClass::Dominant,
        }
    }

    /// True for chords built on a seventh.
    pub fn has_seventh(self) -> bool {
        use ChordQuality::*;
        matches!(
            self,
            Dominant7
                | Dominant7Sus4
                | Augmented7
                | Major7
                | Minor7
                | MinorMajor7
                | HalfDiminished7
                | Diminished7
        )
    }

    /// True for the major-seventh family (`maj7`, `mMaj7`), which never acts as a dominant.
    pub fn is_major_seventh(self) -> bool {
        matches!(self, ChordQuality::Major7 | ChordQuality::MinorMajor7)
    }

    /// Dominant function candidates: dominant and augmented chords, plus any
    /// seventh chord outside the major-seventh family.
    pub fn is_dominant_family(self) -> bool {
        matches!(
            self.class(),
            QualityClass::Dominant | QualityClass::Augmented
        ) || (self.has_seventh() && !self.is_major_seventh())
    }
}

/// One parsed chord symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChordToken {
    /// The symbol as written (trimmed).
    pub symbol: String,
    /// Root pitch class.
    pub tonic: PitchClass,
    pub quality: ChordQuality,
    /// Quality marker and extension as written, without `sus`/`add`/altered tones or
    /// parentheses: `G7b13` -> `7`, `Am(maj7)` -> `mmaj7`.
    pub quality_text: String,
    /// Chord tones as pitch classes, root first, bass appended when it is not a chord tone.
    pub notes: Vec<PitchClass>,
    /// Semitones above the root, extensions past the octave kept as-is
    /// (13 = ♭9, 14 = 9, 15 = ♯9, 17 = 11, 18 = ♯11, 20 = ♭13, 21 = 13).
    pub intervals: Vec<u8>,
    /// Slash bass, if any.
    pub bass: Option<PitchClass>,
}

impl ChordToken {
    /// Parse one chord symbol.
    ///
    /// The root letter may be upper or lower case. A trailing `/X` is a bass note only
    /// when `X` spells a note, so `C6/9` stays a six-nine chord.
    pub fn parse(symbol: &str) -> Result<Self> {
        let symbol = symbol.trim();
        let invalid = || AnalysisError::InvalidChord(symbol.to_string());

        let (tonic, suffix) = split_note_prefix(symbol).ok_or_else(invalid)?;

        let (head, bass) = match suffix.rsplit_once('/') {
            Some((head, tail)) => match split_note_prefix(tail) {
                Some((pc, "")) => (head, Some(pc)),
                _ => (suffix, None),
            },
            None => (suffix, None),
        };

        let spelling = Spelling::read(head).ok_or_else(invalid)?;
        let intervals = spelling.intervals();

        let mut notes: Vec<PitchClass> = Vec::with_capacity(intervals.len() + 1);
        for &iv in &intervals {
            let pc = tonic.transpose(iv as i32);
            if !notes.contains(&pc) {
                notes.push(pc);
            }
        }
        if let Some(b) = bass {
            if !notes.contains(&b) {
                notes.push(b);
            }
        }

        Ok(ChordToken {
            symbol: symbol.to_string(),
            tonic,
            quality: spelling.quality(),
            quality_text: spelling.text,
            notes,
            intervals,
            bass,
        })
    }

    /// Parse every symbol, failing on the first bad one.
    pub fn parse_all<S: AsRef<str>>(symbols: &[S]) -> Result<Vec<Self>> {
        symbols.iter().map(|s| Self::parse(s.as_ref())).collect()
    }

    /// Extension implied by the chord's structure (`"13"`, `"11"`, `"9"`, `"7"`, `"6"`).
    ///
    /// Added tones on a chord without a seventh (`add9`, `add11`) are not extensions.
    pub fn structural_extension(&self) -> Option<&'static str> {
        if !self.quality.has_seventh() {
            return matches!(self.quality, ChordQuality::Major6 | ChordQuality::Minor6)
                .then_some("6");
        }
        let has = |iv: u8| self.intervals.contains(&iv);
        Some(if has(21) {
            "13"
        } else if has(17) {
            "11"
        } else if has(14) {
            "9"
        } else {
            "7"
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Third {
    Major,
    Minor,
    Sus2,
    Sus4,
    Omitted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fifth {
    Perfect,
    Flat,
    Sharp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Seventh {
    Minor,
    Major,
    Diminished,
}

const EXTENSIONS: &[&str] = &["13", "11", "69", "6/9", "9", "7", "6"];
const SEVENTH_EXTENSIONS: &[&str] = &["13", "11", "9", "7"];
const MAJOR_SEVENTH_MARKERS: &[&str] = &["maj", "Maj", "M", "Δ"];
const ACCIDENTALS: &[&str] = &["b", "♭", "-", "#", "♯", "+"];

// ♭9 ♯9 ♯11 ♭13
const ALTERED_TONES: [u8; 4] = [13, 15, 18, 20];

/// Chord structure accumulated while reading a suffix left to right.
#[derive(Debug)]
struct Spelling {
    third: Third,
    fifth: Fifth,
    seventh: Option<Seventh>,
    sixth: bool,
    // `dim`/`°` seen: a bare 7 is then a diminished seventh.
    diminished: bool,
    extension_read: bool,
    tensions: Vec<u8>,
    text: String,
}

impl Spelling {
    fn read(suffix: &str) -> Option<Self> {
        let mut sp = Spelling {
            third: Third::Major,
            fifth: Fifth::Perfect,
            seventh: None,
            sixth: false,
            diminished: false,
            extension_read: false,
            tensions: Vec::new(),
            text: String::new(),
        };

        if suffix == "5" {
            sp.third = Third::Omitted;
            sp.text.push('5');
            return Some(sp);
        }

        let mut rest = sp.read_base(suffix);
        loop {
            rest = rest.trim_start_matches(&['(', ')', ',', ' '][..]);
            if rest.is_empty() {
                return Some(sp);
            }
            rest = sp.read_modifier(rest)?;
        }
    }

    /// Leading quality marker, if any. Never fails: an unmarked suffix is major.
    fn read_base<'a>(&mut self, s: &'a str) -> &'a str {
        if let Some((marker, rest)) = take(s, &["ø"]) {
            self.text.push_str(marker);
            self.third = Third::Minor;
            self.fifth = Fifth::Flat;
            self.seventh = Some(Seventh::Minor);
            return rest;
        }
        if let Some((marker, rest)) = take(s, &["dim", "°", "o"]) {
            self.text.push_str(marker);
            self.third = Third::Minor;
            self.fifth = Fifth::Flat;
            self.diminished = true;
            return rest;
        }
        if let Some((marker, rest)) = take(s, &["aug", "+"]) {
            self.text.push_str(marker);
            self.fifth = Fifth::Sharp;
            return rest;
        }
        if let Some((marker, rest)) = take(s, MAJOR_SEVENTH_MARKERS) {
            // Bare `maj`/`M` is a plain major triad; `Δ` always means maj7.
            return self.read_major_seventh(marker, rest, marker == "Δ");
        }
        if let Some((marker, rest)) = take(s, &["min", "m", "-"]) {
            self.text.push_str(marker);
            self.third = Third::Minor;
            return rest;
        }
        s
    }

    fn read_modifier<'a>(&mut self, s: &'a str) -> Option<&'a str> {
        if let Some((sus, rest)) = take(s, &["sus4", "sus2", "sus"]) {
            self.third = if sus == "sus2" { Third::Sus2 } else { Third::Sus4 };
            return Some(rest);
        }
        if let Some((_, rest)) = take(s, &["add"]) {
            let (tone, rest) = take(rest, &["13", "11", "9", "6", "4", "2"])?;
            self.tensions.push(match tone {
                "13" => 21,
                "11" => 17,
                "9" => 14,
                "6" => 9,
                "4" => 5,
                _ => 2,
            });
            return Some(rest);
        }
        if let Some((_, rest)) = take(s, &["alt"]) {
            self.seventh.get_or_insert(Seventh::Minor);
            self.tensions.extend(ALTERED_TONES);
            return Some(rest);
        }
        if let Some((marker, rest)) = take(s, MAJOR_SEVENTH_MARKERS) {
            // After a minor marker: `mMaj7`, `m(maj7)`.
            return Some(self.read_major_seventh(marker, rest, true));
        }
        if let Some((accidental, rest)) = take(s, ACCIDENTALS) {
            let sharp = matches!(accidental, "#" | "♯" | "+");
            let (degree, rest) = take(rest, &["13", "11", "9", "5"])?;
            match (sharp, degree) {
                (false, "5") => self.fifth = Fifth::Flat,
                (true, "5") => self.fifth = Fifth::Sharp,
                (false, "9") => self.tensions.push(13),
                (true, "9") => self.tensions.push(15),
                (true, "11") => self.tensions.push(18),
                (false, "13") => self.tensions.push(20),
                _ => return None,
            }
            return Some(rest);
        }
        if !self.extension_read {
            if let Some((number, rest)) = take(s, EXTENSIONS) {
                self.read_extension(number);
                return Some(rest);
            }
        }
        None
    }

    fn read_major_seventh<'a>(
        &mut self,
        marker: &'static str,
        s: &'a str,
        implied: bool,
    ) -> &'a str {
        self.text.push_str(marker);
        match take(s, SEVENTH_EXTENSIONS) {
            Some((number, rest)) if !self.extension_read => {
                self.text.push_str(number);
                self.seventh = Some(Seventh::Major);
                self.extension_read = true;
                self.stack_tensions(number);
                rest
            }
            _ => {
                if implied {
                    self.seventh = Some(Seventh::Major);
                }
                s
            }
        }
    }

    fn read_extension(&mut self, number: &'static str) {
        self.extension_read = true;
        self.text.push_str(number);
        match number {
            "6" => self.sixth = true,
            "69" | "6/9" => {
                self.sixth = true;
                self.tensions.push(14);
            }
            _ => {
                if self.seventh.is_none() {
                    self.seventh = Some(if self.diminished {
                        Seventh::Diminished
                    } else {
                        Seventh::Minor
                    });
                }
                self.stack_tensions(number);
            }
        }
    }

    // 9ths, 11ths and 13ths carry the 9 below them.
    fn stack_tensions(&mut self, number: &str) {
        match number {
            "9" => self.tensions.push(14),
            "11" => self.tensions.extend([14, 17]),
            "13" => self.tensions.extend([14, 21]),
            _ => {}
        }
    }

    fn quality(&self) -> ChordQuality {
        use ChordQuality::*;
        match (self.third, self.fifth, self.seventh) {
            (Third::Omitted, _, _) => Power,
            (Third::Sus2 | Third::Sus4, _, Some(Seventh::Minor)) => Dominant7Sus4,
            (Third::Sus2 | Third::Sus4, _, Some(Seventh::Major)) => Major7,
            (Third::Sus2, _, _) => Sus2,
            (Third::Sus4, _, _) => Sus4,
            (Third::Minor, Fifth::Flat, Some(Seventh::Minor)) => HalfDiminished7,
            (Third::Minor, Fifth::Flat, Some(Seventh::Diminished)) => Diminished7,
            (Third::Minor, Fifth::Flat, None) => Diminished,
            (Third::Minor, _, Some(Seventh::Major)) => MinorMajor7,
            (Third::Minor, _, Some(_)) => Minor7,
            (Third::Minor, _, None) if self.sixth => Minor6,
            (Third::Minor, _, None) => Minor,
            (Third::Major, _, Some(Seventh::Major)) => Major7,
            (Third::Major, Fifth::Sharp, Some(_)) => Augmented7,
            (Third::Major, _, Some(_)) => Dominant7,
            (Third::Major, Fifth::Sharp, None) => Augmented,
            (Third::Major, _, None) if self.sixth => Major6,
            (Third::Major, _, None) => Major,
        }
    }

    fn intervals(&self) -> Vec<u8> {
        let mut out = vec![0];
        match self.third {
            Third::Major => out.push(4),
            Third::Minor => out.push(3),
            Third::Sus2 => out.push(2),
            Third::Sus4 => out.push(5),
            Third::Omitted => {}
        }
        out.push(match self.fifth {
            Fifth::Perfect => 7,
            Fifth::Flat => 6,
            Fifth::Sharp => 8,
        });
        if self.sixth {
            out.push(9);
        }
        if let Some(seventh) = self.seventh {
            out.push(match seventh {
                Seventh::Minor => 10,
                Seventh::Major => 11,
                Seventh::Diminished => 9,
            });
        }
        for &t in &self.tensions {
            if !out.contains(&t) {
                out.push(t);
            }
        }
        out
    }
}

fn take<'a>(s: &'a str, options: &[&'static str]) -> Option<(&'static str, &'a str)> {
    options
        .iter()
        .find_map(|&o| s.strip_prefix(o).map(|rest| (o, rest)))
}
