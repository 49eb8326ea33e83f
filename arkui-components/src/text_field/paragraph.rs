//! The laid-out paragraph seen by the controllers.
//!
//! Shaping and line breaking belong to the typesetting engine. Controllers
//! only ask a [`Paragraph`] to map between text offsets and text-local
//! coordinates. [`MonospaceParagraph`] is a grid implementation used by
//! headless hosts and tests.

use std::{ops::Range, sync::Arc};

use arkui_core::{OffsetF, RectF};
use smallvec::SmallVec;
use unicode_segmentation::UnicodeSegmentation;

use super::emoji::{cluster_ranges, from_utf16};

/// Which side of a line break an ambiguous offset belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAffinity {
    /// The end of the previous line.
    Upstream,
    /// The start of the next line.
    #[default]
    Downstream,
}

/// Caret position for an offset.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CaretMetrics {
    /// Top of the caret, text-local.
    pub offset: OffsetF,
    /// Caret height.
    pub height: f32,
}

/// Geometry of one laid-out line.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LineMetrics {
    /// Left of the line's ink.
    pub x: f32,
    /// Top of the line.
    pub y: f32,
    /// Advance of the line's content.
    pub width: f32,
    /// Line height.
    pub height: f32,
}

/// Selection boxes for a range, usually one per line.
pub type RangeRects = SmallVec<[RectF; 4]>;

/// A laid-out paragraph. Offsets are UTF-16 code units, coordinates are
/// text-local.
pub trait Paragraph: Send + Sync {
    /// Offset nearest to `offset`. Selection positions pick the glyph under
    /// the point instead of the nearest caret stop.
    fn glyph_index_by_coordinate(&self, offset: OffsetF, is_selection_pos: bool) -> i32;
    /// Where the caret is drawn for `index`.
    fn caret_metrics_by_position(&self, index: i32, affinity: TextAffinity)
    -> Option<CaretMetrics>;
    /// Word around `index` as a half-open range.
    fn word_boundary(&self, index: i32) -> Option<(i32, i32)>;
    /// The line under `offset`, clamped to the first/last line.
    fn line_metrics_by_coordinate(&self, offset: OffsetF) -> Option<LineMetrics>;
    /// Selection boxes covering `[start, end)`.
    fn rects_for_range(&self, start: i32, end: i32) -> RangeRects;
    /// Advance of the glyph at `index`, 0 past the end.
    fn character_width(&self, index: i32) -> f32;
    /// Total height.
    fn height(&self) -> f32;
    /// Width of the longest line.
    fn width(&self) -> f32;
    /// Number of lines.
    fn line_count(&self) -> usize;
    /// Laid-out text length in code units.
    fn text_len(&self) -> i32;
}

/// Lays out text into a [`Paragraph`].
pub trait ParagraphBuilder: Send + Sync {
    /// Lays out `text` for a box `max_width` wide.
    fn build(&self, text: &[u16], max_width: f32) -> Arc<dyn Paragraph>;
}

#[derive(Debug, Clone)]
struct GridLine {
    start: usize,
    end: usize,
    cells: Vec<Range<usize>>,
}

/// A grid paragraph: every grapheme cluster takes one cell of
/// `char_width`, `\n` breaks the line, and lines optionally wrap after
/// `max_columns` cells.
#[derive(Debug, Clone)]
pub struct MonospaceParagraph {
    text: Vec<u16>,
    char_width: f32,
    line_height: f32,
    lines: Vec<GridLine>,
}

impl MonospaceParagraph {
    /// Lays out `text` on the grid.
    pub fn new(text: &[u16], char_width: f32, line_height: f32, max_columns: Option<usize>) -> Self {
        let max_columns = max_columns.map(|columns| columns.max(1));
        let mut lines = Vec::new();
        let mut current = GridLine {
            start: 0,
            end: 0,
            cells: Vec::new(),
        };
        for range in cluster_ranges(text) {
            let is_break = text[range.clone()].last() == Some(&u16::from(b'\n'));
            if is_break {
                current.end = range.start;
                lines.push(current);
                current = GridLine {
                    start: range.end,
                    end: range.end,
                    cells: Vec::new(),
                };
                continue;
            }
            if max_columns.is_some_and(|columns| current.cells.len() >= columns) {
                current.end = range.start;
                lines.push(current);
                current = GridLine {
                    start: range.start,
                    end: range.start,
                    cells: Vec::new(),
                };
            }
            current.end = range.end;
            current.cells.push(range);
        }
        lines.push(current);
        Self {
            text: text.to_vec(),
            char_width,
            line_height,
            lines,
        }
    }

    /// Convenience constructor from a `&str`.
    pub fn from_text(text: &str, char_width: f32, line_height: f32) -> Self {
        let wide: Vec<u16> = text.encode_utf16().collect();
        Self::new(&wide, char_width, line_height, None)
    }

    fn line_for_index(&self, index: usize, affinity: TextAffinity) -> usize {
        let mut found = 0;
        for (line_no, line) in self.lines.iter().enumerate() {
            if index < line.start {
                break;
            }
            found = line_no;
            if index < line.end {
                break;
            }
            if index == line.end {
                let next_starts_here = self
                    .lines
                    .get(line_no + 1)
                    .is_some_and(|next| next.start == index);
                if !(next_starts_here && affinity == TextAffinity::Downstream) {
                    break;
                }
            }
        }
        found
    }

    fn line_for_y(&self, y: f32) -> usize {
        if y <= 0.0 || self.line_height <= 0.0 {
            return 0;
        }
        ((y / self.line_height) as usize).min(self.lines.len().saturating_sub(1))
    }

    fn column_in_line(line: &GridLine, index: usize) -> usize {
        line.cells.iter().take_while(|cell| cell.end <= index).count()
    }

    fn index_at_column(line: &GridLine, column: usize) -> usize {
        line.cells.get(column).map_or(line.end, |cell| cell.start)
    }
}

impl Paragraph for MonospaceParagraph {
    fn glyph_index_by_coordinate(&self, offset: OffsetF, is_selection_pos: bool) -> i32 {
        let Some(line) = self.lines.get(self.line_for_y(offset.y)) else {
            return 0;
        };
        let cells = if self.char_width > 0.0 {
            (offset.x / self.char_width).max(0.0)
        } else {
            0.0
        };
        let column = if is_selection_pos {
            cells.floor() as usize
        } else {
            cells.round() as usize
        };
        Self::index_at_column(line, column.min(line.cells.len())) as i32
    }

    fn caret_metrics_by_position(
        &self,
        index: i32,
        affinity: TextAffinity,
    ) -> Option<CaretMetrics> {
        let index = usize::try_from(index).ok()?.min(self.text.len());
        let line_no = self.line_for_index(index, affinity);
        let line = self.lines.get(line_no)?;
        let column = Self::column_in_line(line, index.min(line.end));
        Some(CaretMetrics {
            offset: OffsetF::new(
                column as f32 * self.char_width,
                line_no as f32 * self.line_height,
            ),
            height: self.line_height,
        })
    }

    fn word_boundary(&self, index: i32) -> Option<(i32, i32)> {
        if self.text.is_empty() {
            return None;
        }
        let index = usize::try_from(index).ok()?.min(self.text.len() - 1);
        let decoded = from_utf16(&self.text);
        let mut offset = 0usize;
        for word in decoded.split_word_bounds() {
            let len = word.encode_utf16().count();
            if index < offset + len {
                return Some((offset as i32, (offset + len) as i32));
            }
            offset += len;
        }
        None
    }

    fn line_metrics_by_coordinate(&self, offset: OffsetF) -> Option<LineMetrics> {
        let line_no = self.line_for_y(offset.y);
        let line = self.lines.get(line_no)?;
        Some(LineMetrics {
            x: 0.0,
            y: line_no as f32 * self.line_height,
            width: line.cells.len() as f32 * self.char_width,
            height: self.line_height,
        })
    }

    fn rects_for_range(&self, start: i32, end: i32) -> RangeRects {
        let start = start.clamp(0, self.text.len() as i32) as usize;
        let end = end.clamp(0, self.text.len() as i32) as usize;
        let (start, end) = (start.min(end), start.max(end));
        let mut rects = RangeRects::new();
        if start == end {
            return rects;
        }
        for (line_no, line) in self.lines.iter().enumerate() {
            if line.end < start || line.start >= end {
                continue;
            }
            let from = Self::column_in_line(line, start.max(line.start));
            let to = Self::column_in_line(line, end.min(line.end));
            // a selected line break still shows a sliver
            let width = if to == from {
                if end > line.end {
                    self.char_width / 2.0
                } else {
                    continue;
                }
            } else {
                (to - from) as f32 * self.char_width
            };
            rects.push(RectF::new(
                from as f32 * self.char_width,
                line_no as f32 * self.line_height,
                width,
                self.line_height,
            ));
        }
        rects
    }

    fn character_width(&self, index: i32) -> f32 {
        match usize::try_from(index) {
            Ok(index) if index < self.text.len() && self.text[index] != u16::from(b'\n') => {
                self.char_width
            }
            _ => 0.0,
        }
    }

    fn height(&self) -> f32 {
        self.lines.len() as f32 * self.line_height
    }

    fn width(&self) -> f32 {
        self.lines
            .iter()
            .map(|line| line.cells.len())
            .max()
            .unwrap_or(0) as f32
            * self.char_width
    }

    fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn text_len(&self) -> i32 {
        self.text.len() as i32
    }
}

/// Builds [`MonospaceParagraph`]s, wrapping to the box width when `wrap` is
/// set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceParagraphBuilder {
    /// Cell width.
    pub char_width: f32,
    /// Line height.
    pub line_height: f32,
    /// Soft-wrap lines at the box width.
    pub wrap: bool,
}

impl ParagraphBuilder for MonospaceParagraphBuilder {
    fn build(&self, text: &[u16], max_width: f32) -> Arc<dyn Paragraph> {
        let max_columns = (self.wrap && self.char_width > 0.0)
            .then(|| (max_width / self.char_width).floor().max(1.0) as usize);
        Arc::new(MonospaceParagraph::new(
            text,
            self.char_width,
            self.line_height,
            max_columns,
        ))
    }
}
