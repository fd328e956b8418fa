//! Static genre pattern catalog.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::AnalysisError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Genre {
    Pop,
    Rock,
    Jazz,
    Blues,
    Classical,
    Folk,
    Country,
    Gospel,
    Rnb,
    Latin,
    /// Sentinel for "no evidence".
    Unknown,
}

impl Genre {
    pub const ALL: [Genre; 10] = [
        Genre::Pop,
        Genre::Rock,
        Genre::Jazz,
        Genre::Blues,
        Genre::Classical,
        Genre::Folk,
        Genre::Country,
        Genre::Gospel,
        Genre::Rnb,
        Genre::Latin,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Genre::Pop => "pop",
            Genre::Rock => "rock",
            Genre::Jazz => "jazz",
            Genre::Blues => "blues",
            Genre::Classical => "classical",
            Genre::Folk => "folk",
            Genre::Country => "country",
            Genre::Gospel => "gospel",
            Genre::Rnb => "rnb",
            Genre::Latin => "latin",
            Genre::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Genre {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        let wanted = match wanted.as_str() {
            "r&b" | "r-n-b" | "soul" => "rnb",
            other => other,
        };
        Genre::ALL
            .iter()
            .chain(std::iter::once(&Genre::Unknown))
            .copied()
            .find(|g| g.as_str() == wanted)
            .ok_or_else(|| AnalysisError::InvalidGenre(s.to_string()))
    }
}

/// One weighted roman-numeral template.
///
/// Tokens without an extension match any extension in the input; tokens with one
/// (`I7`, `Imaj7`) must match exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenrePattern {
    pub pattern: &'static str,
    pub genre: Genre,
    /// 1..=10.
    pub weight: u8,
    pub description: &'static str,
    pub examples: &'static [&'static str],
    pub era: &'static str,
}

macro_rules! pattern {
    ($pattern:expr, $genre:ident, $weight:expr, $desc:expr, [$($ex:expr),* $(,)?], $era:expr) => {
        GenrePattern {
            pattern: $pattern,
            genre: Genre::$genre,
            weight: $weight,
            description: $desc,
            examples: &[$($ex),*],
            era: $era,
        }
    };
}

pub const GENRE_PATTERNS: &[GenrePattern] = &[
    // Pop
    pattern!("I-V-vi-IV", Pop, 10, "Axis progression",
        ["Let It Be", "Don't Stop Believin'", "With or Without You"], "1960s-present"),
    pattern!("vi-IV-I-V", Pop, 9, "Axis progression starting on the relative minor",
        ["Zombie", "Someone Like You"], "1990s-present"),
    pattern!("I-vi-IV-V", Pop, 9, "Fifties doo-wop progression",
        ["Stand By Me", "Earth Angel", "Every Breath You Take"], "1950s-1960s"),
    pattern!("IV-I-V-vi", Pop, 8, "Axis progression starting on the subdominant",
        ["Grenade", "Cheap Thrills"], "2000s-present"),
    pattern!("I-IV-vi-V", Pop, 7, "Ballad variant of the axis loop",
        ["Complicated"], "1990s-present"),
    pattern!("IV-V-iii-vi", Pop, 8, "Royal road progression",
        ["Just the Way You Are (J-pop usage)"], "1980s-present"),
    pattern!("i-VI-III-VII", Pop, 8, "Minor-key axis loop",
        ["Apologize", "Numb"], "2000s-present"),
    // Rock
    pattern!("I-♭VII-IV-I", Rock, 9, "Mixolydian vamp",
        ["Sweet Child O' Mine", "Hey Jude (coda)"], "1960s-present"),
    pattern!("I-♭VII-IV", Rock, 8, "Double plagal motion",
        ["Sweet Home Alabama", "Gloria"], "1960s-1980s"),
    pattern!("i-VII-VI-VII", Rock, 9, "Aeolian rock loop",
        ["All Along the Watchtower", "Stairway to Heaven (outro)"], "1960s-present"),
    pattern!("♭VI-♭VII-I", Rock, 8, "Aeolian cadence",
        ["Mario theme cadence", "Running Up That Hill"], "1980s-present"),
    pattern!("I-♭III-IV-I", Rock, 7, "Blues-rock riff",
        ["Smoke on the Water", "Iron Man"], "1970s"),
    pattern!("I-IV-V-IV", Rock, 9, "Garage rock changes",
        ["Louie Louie", "La Bamba", "Twist and Shout"], "1950s-1960s"),
    pattern!("I-V-♭VII-IV", Rock, 7, "Anthemic rock descent",
        ["Born to Run"], "1970s-1990s"),
    // Jazz
    pattern!("ii-V-I", Jazz, 10, "ii-V-I turnaround",
        ["Autumn Leaves", "Satin Doll", "Tune Up"], "1930s-present"),
    pattern!("ii7-V7-Imaj7", Jazz, 10, "ii-V-I with full seventh chords",
        ["Autumn Leaves", "Fly Me to the Moon"], "1930s-present"),
    pattern!("I-vi-ii-V", Jazz, 9, "Rhythm changes turnaround",
        ["I Got Rhythm", "Blue Moon"], "1930s-present"),
    pattern!("iii-vi-ii-V", Jazz, 9, "Extended circle-of-fifths turnaround",
        ["Stella by Starlight", "All the Things You Are"], "1940s-present"),
    pattern!("ii°-V-i", Jazz, 9, "Minor ii-V-i",
        ["Blue Bossa", "Autumn Leaves (minor section)"], "1940s-present"),
    pattern!("Imaj7-vi7-ii7-V7", Jazz, 9, "Seventh-chord turnaround",
        ["Misty", "Heart and Soul"], "1940s-present"),
    pattern!("ii-♭II-I", Jazz, 9, "Tritone substitution",
        ["The Girl from Ipanema", "Satin Doll"], "1940s-present"),
    pattern!("iv-♭VII7-I", Jazz, 8, "Backdoor progression",
        ["Lady Bird", "Just Friends"], "1940s-present"),
    pattern!("I-♭ii°-ii-V", Jazz, 7, "Passing diminished turnaround",
        ["Stompin' at the Savoy"], "1930s-1950s"),
    // Blues
    pattern!("I7-IV7-I7-V7", Blues, 10, "Dominant-seventh blues changes",
        ["Sweet Home Chicago", "Pride and Joy"], "1920s-present"),
    pattern!("I7-IV7-I7", Blues, 9, "Blues tonic-subdominant shuttle",
        ["Hoochie Coochie Man", "Red House"], "1920s-present"),
    pattern!("V7-IV7-I7", Blues, 10, "Blues turnaround",
        ["The Thrill Is Gone", "Crossroads"], "1920s-present"),
    pattern!("I-I-I-I-IV-IV-I-I-V-IV-I-V", Blues, 10, "Twelve-bar blues",
        ["Johnny B. Goode", "Hound Dog", "Rock Around the Clock"], "1910s-present"),
    pattern!("I-IV-I-V-IV-I", Blues, 8, "Compressed twelve-bar form",
        ["Kansas City"], "1940s-present"),
    pattern!("i7-iv7-i7", Blues, 8, "Minor blues",
        ["The Thrill Is Gone", "Mr. P.C."], "1950s-present"),
    // Classical
    pattern!("I-IV-V-I", Classical, 9, "Authentic cadence through the subdominant",
        ["Hymn cadences", "Bach chorales"], "Baroque-Romantic"),
    pattern!("I-ii-V-I", Classical, 8, "Predominant-dominant-tonic cadence",
        ["Mozart sonatas"], "Classical"),
    pattern!("IV-V-I", Classical, 8, "Perfect cadence",
        ["Bach chorales"], "Baroque-Romantic"),
    pattern!("i-iv-V-i", Classical, 9, "Minor authentic cadence",
        ["Moonlight Sonata", "Bach minor preludes"], "Baroque-Romantic"),
    pattern!("I-V-vi-iii-IV-I-IV-V", Classical, 10, "Pachelbel's Canon",
        ["Canon in D", "Basket Case"], "Baroque"),
    pattern!("vi-ii-V-I", Classical, 8, "Circle of fifths",
        ["Vivaldi concertos", "Fly Me to the Moon"], "Baroque-present"),
    pattern!("I-IV-V-vi", Classical, 7, "Deceptive cadence",
        ["Bach chorales"], "Baroque-Romantic"),
    // Folk
    pattern!("I-IV-I-V", Folk, 8, "Folk three-chord song",
        ["This Land Is Your Land", "Blowin' in the Wind"], "1930s-present"),
    pattern!("I-V-IV-I", Folk, 7, "Folk return to the tonic",
        ["Leaving on a Jet Plane"], "1950s-present"),
    pattern!("i-VII-i", Folk, 7, "Modal folk shuttle",
        ["Scarborough Fair", "Drunken Sailor"], "Traditional"),
    pattern!("i-VII-VI-i", Folk, 7, "Aeolian folk descent",
        ["The House of the Rising Sun (verse)"], "Traditional"),
    // Country
    pattern!("I-IV-I-V-I", Country, 8, "Country two-step",
        ["I Walk the Line", "Folsom Prison Blues"], "1940s-present"),
    pattern!("I-I7-IV", Country, 8, "Tonic seventh into the subdominant",
        ["Jambalaya", "Your Cheatin' Heart"], "1940s-1970s"),
    pattern!("I-II7-V7-I", Country, 8, "Ragtime V-of-V changes",
        ["Alice's Restaurant", "Salty Dog"], "1920s-present"),
    // Gospel
    pattern!("IV-iv-I", Gospel, 8, "Minor plagal cadence",
        ["Amazing Grace (gospel voicing)", "Something"], "1900s-present"),
    pattern!("I-I7-IV-iv-I", Gospel, 9, "Gospel plagal cadence",
        ["Oh Happy Day", "Lean on Me"], "1950s-present"),
    pattern!("IV-♭v°-I", Gospel, 7, "Chromatic passing diminished",
        ["Precious Lord"], "1930s-present"),
    // R&B
    pattern!("IVmaj7-III7-vi7", Rnb, 9, "Just the Two of Us progression",
        ["Just the Two of Us", "Lovely Day"], "1980s-present"),
    pattern!("vi7-ii7-V7", Rnb, 7, "Neo-soul turnaround",
        ["Ain't No Sunshine"], "1970s-present"),
    pattern!("Imaj7-IVmaj7", Rnb, 6, "Major-seventh soul vamp",
        ["Sunday Morning"], "1970s-present"),
    // Latin
    pattern!("i-VII-VI-V", Latin, 10, "Andalusian cadence",
        ["Hit the Road Jack", "Malagueña", "Sultans of Swing"], "Traditional-present"),
    pattern!("i-♭II-i", Latin, 8, "Phrygian vamp",
        ["Flamenco falsetas", "Misirlou"], "Traditional-present"),
    pattern!("i-iv-VII-III", Latin, 7, "Bolero minor circle",
        ["Bésame Mucho"], "1940s-present"),
];
