//! Minimal CLI for `harmonia-progression`.
//!
//! A debugging lens over the library: every subcommand maps to one public entry point.
//! Set `RUST_LOG=debug` (or `trace`) to see key scores, candidate keys and windows.

use clap::Parser;
use serde::Serialize;

use harmonia_progression::{
    AnalyzeOptions, Analyzer, CacheStats, Genre, GenreDetectionResult, GenreOptions, Key,
    KeyDetection, ProgressionAnalysis, RomanNumeral,
};

#[derive(Debug, Parser)]
#[command(name = "harmonia")]
#[command(about = "Key, roman-numeral and genre inference for chord progressions.")]
struct Cli {
    /// Emit the report as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, clap::Subcommand)]
enum Command {
    /// Detect the most likely key.
    Key {
        /// Chord symbols, whitespace- or comma-separated: `"C F G C"`.
        #[arg(long)]
        chords: String,
    },

    /// Roman numerals in a given key.
    Roman {
        /// Key, e.g. `C major`, `A:min`, `Bb`, `F#m`.
        #[arg(long)]
        key: String,

        #[arg(long)]
        chords: String,
    },

    /// Full progression report.
    Analyze {
        #[arg(long)]
        chords: String,

        /// Analyze in this key instead of detecting one.
        #[arg(long)]
        key: Option<String>,

        /// Skip genre evidence.
        #[arg(long, default_value_t = false)]
        no_genres: bool,
    },

    /// Rank genres the progression resembles.
    Genre {
        #[arg(long)]
        chords: String,

        /// Only score patterns from this genre.
        #[arg(long)]
        genre: Option<String>,
    },
}

fn main() -> Result<(), String> {
    env_logger::init();
    let cli = Cli::parse();
    let analyzer = Analyzer::default();

    match cli.cmd {
        Command::Key { chords } => {
            let chords = split_chords(&chords)?;
            let detection = analyzer.detect_key(&chords).map_err(|e| e.to_string())?;
            let report = KeyReport {
                detection,
                scale_cache: analyzer.detector().cache_stats(),
            };
            emit(cli.json, &report, print_key)?;
        }
        Command::Roman { key, chords } => {
            let key = parse_key(&key)?;
            let chords = split_chords(&chords)?;
            let numerals = analyzer
                .roman_numerals(&chords, key)
                .map_err(|e| e.to_string())?;
            let report = RomanReport {
                key,
                chords: &chords,
                numerals,
            };
            emit(cli.json, &report, print_romans)?;
        }
        Command::Analyze {
            chords,
            key,
            no_genres,
        } => {
            let chords = split_chords(&chords)?;
            let options = AnalyzeOptions {
                key: key.as_deref().map(parse_key).transpose()?,
                include_genres: !no_genres,
                genre_hint: None,
            };
            let report = analyzer
                .analyze(&chords, &options)
                .map_err(|e| e.to_string())?;
            emit(cli.json, &report, print_analysis)?;
        }
        Command::Genre { chords, genre } => {
            let chords = split_chords(&chords)?;
            let options = GenreOptions {
                genre: genre.as_deref().map(parse_genre).transpose()?,
            };
            let results = analyzer.detect_genre(&chords, &options);
            emit(cli.json, &results, |r: &Vec<GenreDetectionResult>| print_genres(r))?;
        }
    };

    Ok(())
}

#[derive(Debug, Serialize)]
struct RomanReport<'a> {
    key: Key,
    chords: &'a [String],
    numerals: Vec<RomanNumeral>,
}

fn emit<T: Serialize>(json: bool, value: &T, human: impl Fn(&T)) -> Result<(), String> {
    if json {
        let s = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
        println!("{s}");
    } else {
        human(value);
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct KeyReport {
    #[serde(flatten)]
    detection: KeyDetection,
    scale_cache: CacheStats,
}

fn print_key(report: &KeyReport) {
    let found = &report.detection;
    println!("Key: {}", found.key);
    println!(
        "Confidence: {:.2} ({}/{} diatonic, score {})",
        found.confidence, found.diatonic_count, found.total_chords, found.score
    );
    if !found.alternatives.is_empty() {
        println!("Alternatives:");
        for alt in &found.alternatives {
            println!("- {} (score {})", alt.key, alt.score);
        }
    }
    let cache = &report.scale_cache;
    println!(
        "Scale cache: {}/{} entries, {} hits, {} misses",
        cache.entries, cache.capacity, cache.hits, cache.misses
    );
}

fn print_romans(report: &RomanReport<'_>) {
    println!("Key: {}", report.key);
    for (chord, numeral) in report.chords.iter().zip(&report.numerals) {
        println!("{chord:>8}  {}", numeral.roman);
    }
}

fn print_analysis(report: &ProgressionAnalysis) {
    println!("Key: {} (confidence {:.2})", report.key, report.confidence);
    for c in &report.chords {
        println!("{:>8}  {:<8} {:?}", c.chord, c.roman, c.function);
    }
    if !report.cadences.is_empty() {
        println!("Cadences:");
        for c in &report.cadences {
            println!(
                "- at {}: {:?} ({:?}) {} → {}",
                c.position, c.kind, c.strength, c.chords[0], c.chords[1]
            );
        }
    }
    if !report.secondary_dominants.is_empty() {
        println!("Secondary dominants:");
        for s in &report.secondary_dominants {
            println!("- {} → {}: {}", s.chord, s.target_chord, s.roman_notation);
        }
    }
    if !report.borrowed_chords.is_empty() {
        println!("Borrowed chords:");
        for b in &report.borrowed_chords {
            println!("- {} ({}) from {}", b.chord, b.roman, b.borrowed_from);
        }
    }
    if !report.patterns.is_empty() {
        println!("Patterns:");
        for p in &report.patterns {
            println!("- {} ({})", p.name, p.pattern);
        }
    }
    println!("Loopable: {}", report.loopable);
    if !report.genre_patterns.is_empty() {
        print_genres(&report.genre_patterns);
    }
}

fn print_genres(results: &[GenreDetectionResult]) {
    println!("Genres:");
    for r in results {
        println!("- {} ({:.2})", r.genre, r.confidence);
        for p in &r.matched_patterns {
            println!("  {} [{}] {}", p.pattern, p.weight, p.description);
        }
    }
}

fn split_chords(s: &str) -> Result<Vec<String>, String> {
    let chords: Vec<String> = s
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    if chords.is_empty() {
        return Err("empty --chords; expected e.g. \"C F G C\"".to_string());
    }
    Ok(chords)
}

fn parse_key(s: &str) -> Result<Key, String> {
    s.parse::<Key>()
        .map_err(|e| format!("{e}; expected e.g. \"C major\" or \"A:min\""))
}

fn parse_genre(s: &str) -> Result<Genre, String> {
    s.parse::<Genre>().map_err(|e| e.to_string())
}
