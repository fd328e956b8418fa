//! Engine configuration.

use crate::cache::DEFAULT_SCALE_CACHE_CAPACITY;

/// Tunables shared by every stage of an [`crate::Analyzer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyzerConfig {
    /// Capacity of the key detector's scale-note LRU.
    pub scale_cache_capacity: usize,
    /// Runner-up keys reported alongside the winner.
    pub key_alternatives: usize,
    /// Progressions up to this length are classified whole.
    pub whole_threshold: usize,
    /// Chords per window for longer progressions.
    pub window_size: usize,
    /// Chords between consecutive window starts.
    pub window_stride: usize,
    /// Leftover chords below this count extend the last window instead of opening a new one.
    pub min_trailing_window: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            scale_cache_capacity: DEFAULT_SCALE_CACHE_CAPACITY,
            key_alternatives: 3,
            whole_threshold: 16,
            window_size: 12,
            window_stride: 6,
            min_trailing_window: 4,
        }
    }
}
