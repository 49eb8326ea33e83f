//! Optional AI text-boundary analysis.
//!
//! The analyzer is an external service. Controllers only call it through
//! [`TextBoundaryAnalyzer`], on a bounded window of the buffer, and only after
//! the gating checks in the selection controller pass.

use std::time::{Duration, Instant};

/// Minimum time between two caret adjustments by the analyzer.
pub const AI_ANALYSIS_INTERVAL: Duration = Duration::from_millis(300);
/// Code units taken on each side of the touched index for analysis.
pub const AI_TEXT_RANGE: i32 = 50;

/// Smart caret and word-boundary detection.
///
/// Indices are local to the `content` window handed in.
pub trait TextBoundaryAnalyzer: Send + Sync {
    /// Returns a possibly adjusted caret index for a press at `index`.
    fn adjust_cursor_position(
        &self,
        index: i32,
        content: &[u16],
        last_time: Option<Instant>,
        now: Instant,
    ) -> i32;

    /// Returns a smart word range around `index`, or `None` to fall back to
    /// the paragraph's own word boundary.
    fn adjust_word_selection(&self, index: i32, content: &[u16]) -> Option<(i32, i32)>;
}

/// What kind of gesture moved the caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaretUpdateType {
    /// Single tap or click.
    #[default]
    Pressed,
    /// Double tap or click.
    DoubleClick,
    /// Long press.
    LongPressed,
    /// Moved by a handle drag.
    HandleMove,
    /// Moved by the keyboard or programmatically.
    Input,
    /// Moved while a mouse button is held.
    Event,
}

/// A slice of the buffer around an index, with its absolute start.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisWindow {
    /// The windowed text.
    pub text: Vec<u16>,
    /// Absolute index of `text[0]`.
    pub start: i32,
    /// The requested index, relative to `start`.
    pub local_index: i32,
}

impl AnalysisWindow {
    /// Translates a window-local index back to a buffer index.
    pub fn to_absolute(&self, local: i32) -> i32 {
        self.start + local
    }
}

/// `true` if the code unit reads as a word separator for gating purposes.
pub fn is_separator(unit: u16) -> bool {
    char::from_u32(u32::from(unit))
        .is_some_and(|c| c.is_whitespace() || c.is_ascii_punctuation())
}
