//! Plain value types shared by the controllers.

use arkui_core::{OffsetF, RectF};

use super::emoji::{self, from_utf16, to_utf16};

/// A snapshot of a field's text and caret, as exchanged with an IME.
///
/// `caret_position` counts UTF-16 code units.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextEditingValue {
    /// Full text.
    pub text: String,
    /// Caret offset in UTF-16 code units.
    pub caret_position: usize,
}

impl TextEditingValue {
    /// Creates a value, clamping the caret into the text.
    pub fn new(text: impl Into<String>, caret_position: usize) -> Self {
        let text = text.into();
        let len = text.encode_utf16().count();
        Self {
            text,
            caret_position: caret_position.min(len),
        }
    }

    fn wide(&self) -> Vec<u16> {
        to_utf16(&self.text)
    }

    /// Length in UTF-16 code units.
    pub fn len(&self) -> usize {
        self.text.encode_utf16().count()
    }

    /// `true` when there is no text.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Moves the caret one grapheme cluster left. Stays at 0.
    pub fn cursor_move_left(&mut self) {
        let wide = self.wide();
        let caret = self.caret_position.min(wide.len());
        self.caret_position = emoji::cluster_before(&wide, caret).map_or(0, |range| range.start);
    }

    /// Moves the caret one grapheme cluster right. Stays at the end.
    pub fn cursor_move_right(&mut self) {
        let wide = self.wide();
        let caret = self.caret_position.min(wide.len());
        self.caret_position = emoji::cluster_at(&wide, caret).map_or(wide.len(), |range| range.end);
    }

    /// Text before the caret.
    pub fn text_before_cursor(&self) -> String {
        let wide = self.wide();
        from_utf16(&wide[..self.caret_position.min(wide.len())])
    }

    /// Text after the caret.
    pub fn text_after_cursor(&self) -> String {
        let wide = self.wide();
        from_utf16(&wide[self.caret_position.min(wide.len())..])
    }

    /// Text between two offsets, in either order.
    pub fn selected_text(&self, start: usize, end: usize) -> String {
        let wide = self.wide();
        let (start, end) = (start.min(end).min(wide.len()), start.max(end).min(wide.len()));
        from_utf16(&wide[start..end])
    }
}

/// One selection handle: its buffer index and where it is drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HandleInfo {
    /// Buffer index in UTF-16 code units.
    pub index: i32,
    /// Handle rectangle in field-local coordinates.
    pub rect: RectF,
}

impl HandleInfo {
    /// Moves the rectangle without resizing it.
    pub fn update_offset(&mut self, offset: OffsetF) {
        self.rect.set_offset(offset);
    }

    /// Shifts the rectangle by `delta`.
    pub fn add_offset(&mut self, delta: OffsetF) {
        self.rect = self.rect.translate(delta);
    }
}

/// The caret: index, drawn rectangle, and the rectangle before any
/// temporary adjustment such as a floating caret.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CaretInfo {
    /// Buffer index in UTF-16 code units.
    pub index: i32,
    /// Caret rectangle in field-local coordinates.
    pub rect: RectF,
    /// Rectangle at the caret's real index.
    pub original_rect: RectF,
}

impl CaretInfo {
    /// Moves the rectangle without resizing it.
    pub fn update_offset(&mut self, offset: OffsetF) {
        self.rect.set_offset(offset);
    }
}
