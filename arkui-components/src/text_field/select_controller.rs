//! Caret and selection-handle geometry.
//!
//! [`TextSelectController`] owns three indices (caret, first handle, second
//! handle) and the rectangles they are drawn at. Rectangles are field-local:
//! the paragraph reports text-local metrics and the controller adds the
//! host's text rect offset. The text rect itself is the scroll state; moving
//! a handle into view shifts the text rect through the host.
//!
//! "First" and "second" follow the gesture, not the buffer order.
//! [`start_index`](TextSelectController::start_index) and
//! [`end_index`](TextSelectController::end_index) give the ordered range.

use std::{
    sync::{Arc, Weak},
    time::Instant,
};

use arkui_core::{
    Clock, OffsetF, RectF, TextFieldTheme,
    geometry::{greater_not_equal, less_not_equal},
};
use parking_lot::RwLock;
use tracing::debug;

use super::{
    ai::{AI_ANALYSIS_INTERVAL, CaretUpdateType, TextBoundaryAnalyzer, is_separator},
    content_controller::ContentController,
    editing_value::{CaretInfo, HandleInfo},
    emoji,
    host::{TextEditHost, clamp_text_rect},
    paragraph::{Paragraph, RangeRects, TextAffinity},
};

/// API level from which selection changes are reported without focus.
const UNFOCUSED_SELECT_EVENT_API_VERSION: u32 = 12;

/// Caret and selection state of one field.
pub struct TextSelectController {
    host: Weak<dyn TextEditHost>,
    content: Weak<RwLock<ContentController>>,
    paragraph: Option<Arc<dyn Paragraph>>,
    theme: TextFieldTheme,
    clock: Arc<dyn Clock>,
    caret_info: CaretInfo,
    caret_affinity: TextAffinity,
    first_handle_info: HandleInfo,
    second_handle_info: HandleInfo,
    reported: Option<(i32, i32)>,
    last_ai_pos_time: Option<Instant>,
    caret_update_type: CaretUpdateType,
}

impl TextSelectController {
    /// Creates a controller for the buffer `content` owned by `host`.
    pub fn new(
        host: Weak<dyn TextEditHost>,
        content: Weak<RwLock<ContentController>>,
        theme: TextFieldTheme,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            host,
            content,
            paragraph: None,
            theme,
            clock,
            caret_info: CaretInfo::default(),
            caret_affinity: TextAffinity::Downstream,
            first_handle_info: HandleInfo::default(),
            second_handle_info: HandleInfo::default(),
            reported: None,
            last_ai_pos_time: None,
            caret_update_type: CaretUpdateType::Pressed,
        }
    }

    /// Installs the paragraph laid out for the current buffer.
    pub fn set_paragraph(&mut self, paragraph: Option<Arc<dyn Paragraph>>) {
        self.paragraph = paragraph;
    }

    /// The current paragraph.
    pub fn paragraph(&self) -> Option<&Arc<dyn Paragraph>> {
        self.paragraph.as_ref()
    }

    /// Records what kind of gesture drives the next caret update. Only
    /// presses are refined by the AI analyzer.
    pub fn set_caret_update_type(&mut self, kind: CaretUpdateType) {
        self.caret_update_type = kind;
    }

    /// The gesture kind driving caret updates.
    pub fn caret_update_type(&self) -> CaretUpdateType {
        self.caret_update_type
    }

    fn host(&self) -> Option<Arc<dyn TextEditHost>> {
        let host = self.host.upgrade();
        if host.is_none() {
            debug!("text edit host dropped, selection update skipped");
        }
        host
    }

    fn content_len(&self) -> i32 {
        self.content
            .upgrade()
            .map_or(0, |content| content.read().len() as i32)
    }

    fn clamp_index(&self, index: i32) -> i32 {
        index.clamp(0, self.content_len())
    }

    /// Caret index.
    pub fn caret_index(&self) -> i32 {
        self.caret_info.index
    }

    /// Caret rectangle, field-local.
    pub fn caret_rect(&self) -> RectF {
        self.caret_info.rect
    }

    /// Full caret state.
    pub fn caret_info(&self) -> CaretInfo {
        self.caret_info
    }

    /// Affinity used for the last caret rectangle.
    pub fn caret_affinity(&self) -> TextAffinity {
        self.caret_affinity
    }

    /// First handle.
    pub fn first_handle_info(&self) -> HandleInfo {
        self.first_handle_info
    }

    /// Second handle.
    pub fn second_handle_info(&self) -> HandleInfo {
        self.second_handle_info
    }

    /// First handle index.
    pub fn first_handle_index(&self) -> i32 {
        self.first_handle_info.index
    }

    /// Second handle index.
    pub fn second_handle_index(&self) -> i32 {
        self.second_handle_info.index
    }

    /// Lower end of the selection.
    pub fn start_index(&self) -> i32 {
        self.first_handle_info.index.min(self.second_handle_info.index)
    }

    /// Upper end of the selection.
    pub fn end_index(&self) -> i32 {
        self.first_handle_info.index.max(self.second_handle_info.index)
    }

    /// `true` when the first handle sits after the second.
    pub fn has_reverse(&self) -> bool {
        self.first_handle_info.index > self.second_handle_info.index
    }

    /// A non-empty selection exists.
    pub fn is_selected(&self) -> bool {
        self.first_handle_info.index >= 0
            && self.second_handle_info.index >= 0
            && self.first_handle_info.index != self.second_handle_info.index
    }

    /// The whole, non-empty buffer is selected.
    pub fn is_selected_all(&self) -> bool {
        let len = self.content_len();
        self.is_selected() && self.start_index() == 0 && self.end_index() == len
    }

    /// Collapses everything to `index`, clamped into the buffer.
    pub fn update_caret_index(&mut self, index: i32) {
        let index = self.clamp_index(index);
        self.caret_info.index = index;
        self.first_handle_info.index = index;
        self.second_handle_info.index = index;
    }

    /// Sets both handle indices. The caret follows the later one.
    pub fn update_handle_index(&mut self, first: i32, second: i32) {
        self.first_handle_info.index = self.clamp_index(first);
        self.second_handle_info.index = self.clamp_index(second);
        self.caret_info.index = self.first_handle_info.index.max(self.second_handle_info.index);
    }

    /// Drops the selection, keeping the caret.
    pub fn reset_handles(&mut self) {
        let caret = self.caret_info.index;
        self.first_handle_info.index = caret;
        self.second_handle_info.index = caret;
        self.first_handle_info.rect = self.caret_info.rect;
        self.second_handle_info.rect = self.caret_info.rect;
    }

    /// Resets all indices and rectangles to the start of the buffer.
    pub fn reset_info(&mut self) {
        self.caret_info = CaretInfo::default();
        self.first_handle_info = HandleInfo::default();
        self.second_handle_info = HandleInfo::default();
        self.caret_info.rect = self.empty_caret_rect();
        self.caret_info.original_rect = self.caret_info.rect;
    }

    /// Buffer index under a field-local point. Always 0 for an empty buffer.
    pub fn convert_touch_offset_to_position(
        &self,
        local_offset: OffsetF,
        is_selection_pos: bool,
    ) -> i32 {
        if self.content_len() == 0 {
            return 0;
        }
        let (Some(host), Some(paragraph)) = (self.host(), self.paragraph.as_ref()) else {
            return 0;
        };
        let text = host.text_rect();
        let index = paragraph.glyph_index_by_coordinate(local_offset - text.offset(), is_selection_pos);
        self.clamp_index(index)
    }

    fn caret_rect_for(&self, index: i32, affinity: TextAffinity, width: f32) -> Option<RectF> {
        if self.content_len() == 0 {
            let mut rect = self.empty_caret_rect();
            rect.width = width;
            return Some(rect);
        }
        let host = self.host()?;
        let metrics = self.paragraph.as_ref()?.caret_metrics_by_position(index, affinity)?;
        let text = host.text_rect();
        Some(RectF::new(
            metrics.offset.x + text.x,
            metrics.offset.y + text.y,
            width,
            metrics.height,
        ))
    }

    fn handle_rect_for(&self, index: i32, affinity: TextAffinity) -> Option<RectF> {
        self.caret_rect_for(index, affinity, self.theme.handle_line_width_px())
    }

    fn empty_caret_rect(&self) -> RectF {
        let Some(host) = self.host() else {
            return RectF::ZERO;
        };
        let content = host.content_rect();
        let line_height = host.preferred_line_height();
        let y = if host.is_text_area() {
            content.top()
        } else {
            content.top() + ((content.height - line_height) / 2.0).max(0.0)
        };
        RectF::new(content.left(), y, self.theme.cursor_width_px(), line_height)
    }

    /// Caret rect for `index`, on whichever side of a soft line break the
    /// touch point is.
    fn caret_rect_near_touch(&mut self, index: i32, local_offset: OffsetF) -> Option<RectF> {
        let width = self.theme.cursor_width_px();
        let downstream = self.caret_rect_for(index, TextAffinity::Downstream, width)?;
        let upstream = self.caret_rect_for(index, TextAffinity::Upstream, width)?;
        let touch_on_upstream_line =
            local_offset.y >= upstream.top() && local_offset.y < upstream.bottom();
        if upstream != downstream && touch_on_upstream_line {
            self.caret_affinity = TextAffinity::Upstream;
            Some(upstream)
        } else {
            self.caret_affinity = TextAffinity::Downstream;
            Some(downstream)
        }
    }

    /// `true` if the point lies past the end of its line.
    pub fn is_touch_at_line_end(&self, local_offset: OffsetF) -> bool {
        let (Some(host), Some(paragraph)) = (self.host(), self.paragraph.as_ref()) else {
            return false;
        };
        let touch = local_offset - host.text_rect().offset();
        paragraph
            .line_metrics_by_coordinate(touch)
            .is_some_and(|line| greater_not_equal(touch.x, line.x + line.width))
    }

    fn is_click_at_boundary(&self, index: i32, local_offset: OffsetF, text: &[u16]) -> bool {
        let len = text.len() as i32;
        if index <= 0 || index >= len {
            return true;
        }
        let before = text[(index - 1) as usize];
        let after = text[index as usize];
        is_separator(before) || is_separator(after) || self.is_touch_at_line_end(local_offset)
    }

    fn need_ai_analysis(
        &self,
        index: i32,
        kind: CaretUpdateType,
        local_offset: OffsetF,
        now: Instant,
    ) -> Option<Arc<dyn TextBoundaryAnalyzer>> {
        let host = self.host()?;
        let analyzer = host.boundary_analyzer()?;
        let content = self.content.upgrade()?;
        let content = content.read();
        if content.is_empty() {
            return None;
        }
        match kind {
            CaretUpdateType::Pressed => {
                if let Some(last) = self.last_ai_pos_time {
                    if now.saturating_duration_since(last) < AI_ANALYSIS_INTERVAL {
                        debug!(index, "ai caret analysis rate limited");
                        return None;
                    }
                }
                if self.is_click_at_boundary(index, local_offset, content.wide_text()) {
                    return None;
                }
            }
            CaretUpdateType::DoubleClick => {}
            _ => return None,
        }
        if host.is_password() || content.is_index_before_or_in_emoji(index) {
            return None;
        }
        Some(analyzer)
    }

    fn adjust_cursor_position(&mut self, index: i32, local_offset: OffsetF) -> i32 {
        if self.caret_update_type != CaretUpdateType::Pressed {
            return index;
        }
        let now = self.clock.now();
        let Some(analyzer) =
            self.need_ai_analysis(index, CaretUpdateType::Pressed, local_offset, now)
        else {
            return index;
        };
        let Some(content) = self.content.upgrade() else {
            return index;
        };
        let window = content.read().selected_limit_value(index);
        let local = analyzer.adjust_cursor_position(
            window.local_index,
            &window.text,
            self.last_ai_pos_time,
            now,
        );
        self.last_ai_pos_time = Some(now);
        let adjusted = self.clamp_index(window.to_absolute(local));
        debug!(index, adjusted, "ai caret analysis");
        adjusted
    }

    fn adjust_word_selection(&self, index: i32, local_offset: OffsetF) -> Option<(i32, i32)> {
        let now = self.clock.now();
        let analyzer =
            self.need_ai_analysis(index, CaretUpdateType::DoubleClick, local_offset, now)?;
        let content = self.content.upgrade()?;
        let window = content.read().selected_limit_value(index);
        let (start, end) = analyzer.adjust_word_selection(window.local_index, &window.text)?;
        let start = self.clamp_index(window.to_absolute(start));
        let end = self.clamp_index(window.to_absolute(end));
        debug!(index, start, end, "ai word selection");
        (start < end).then_some((start, end))
    }

    /// Places the caret under a field-local touch point.
    ///
    /// The index may be refined by the AI analyzer. With `move_content` the
    /// text scrolls so the caret stays visible. With `float_caret` the drawn
    /// caret follows the touch x within its line while `original_rect` keeps
    /// the caret at its index.
    pub fn update_caret_info_by_offset(
        &mut self,
        local_offset: OffsetF,
        move_content: bool,
        float_caret: bool,
    ) {
        let index = self.convert_touch_offset_to_position(local_offset, false);
        let index = self.adjust_cursor_position(index, local_offset);
        self.update_caret_index(index);

        if self.content_len() == 0 {
            self.caret_info.rect = self.empty_caret_rect();
            self.caret_info.original_rect = self.caret_info.rect;
            self.fire_select_event();
            return;
        }
        let Some(mut rect) = self.caret_rect_near_touch(self.caret_info.index, local_offset) else {
            return;
        };
        self.move_handle_to_content_rect(&mut rect, 0.0, move_content);
        self.caret_info.rect = rect;
        self.caret_info.original_rect = rect;
        if float_caret {
            self.caret_info.rect = self.floating_caret_rect(rect, local_offset);
        }
        self.fire_select_event();
    }

    fn floating_caret_rect(&self, rect: RectF, local_offset: OffsetF) -> RectF {
        let (Some(host), Some(paragraph)) = (self.host(), self.paragraph.as_ref()) else {
            return rect;
        };
        let text = host.text_rect();
        let Some(line) = paragraph.line_metrics_by_coordinate(local_offset - text.offset()) else {
            return rect;
        };
        let left = line.x + text.x;
        let right = (left + line.width).max(left);
        RectF::new(local_offset.x.clamp(left, right), rect.y, rect.width, rect.height)
    }

    /// Places the caret at the touched index, letting it sit past the end of
    /// the line when the touch is there.
    pub fn move_caret_anywhere(&mut self, local_offset: OffsetF) {
        let index = self.convert_touch_offset_to_position(local_offset, false);
        self.update_caret_index(index);
        let Some(real) = self.caret_rect_near_touch(self.caret_info.index, local_offset) else {
            return;
        };
        let mut rect = real;
        if self.content_len() > 0 && self.is_touch_at_line_end(local_offset) {
            rect.x = local_offset.x;
        }
        self.adjust_handle_at_edge(&mut rect);
        self.caret_info.rect = rect;
        self.caret_info.original_rect = real;
        self.fire_select_event();
    }

    /// Moves the caret to `index`, collapsing any selection.
    ///
    /// When the text changed and overflows the content, one character of
    /// extra room is kept to the right of the caret.
    pub fn move_caret_to_content_rect(
        &mut self,
        index: i32,
        affinity: TextAffinity,
        is_editor_value_changed: bool,
        move_content: bool,
    ) {
        if self.host().is_none() {
            return;
        }
        self.update_caret_index(index);
        let index = self.caret_info.index;
        self.caret_affinity = affinity;
        let Some(mut rect) = self.caret_rect_for(index, affinity, self.theme.cursor_width_px())
        else {
            return;
        };
        let mut boundary_adjustment = 0.0;
        if is_editor_value_changed {
            if let (Some(host), Some(paragraph)) = (self.host(), self.paragraph.as_ref()) {
                if greater_not_equal(host.text_rect().width, host.content_rect().width) {
                    boundary_adjustment = paragraph.character_width(index);
                }
            }
        }
        self.move_handle_to_content_rect(&mut rect, boundary_adjustment, move_content);
        self.caret_info.rect = rect;
        self.caret_info.original_rect = rect;
        self.first_handle_info.rect = rect;
        self.second_handle_info.rect = rect;
        self.fire_select_event();
    }

    /// Recomputes the caret rectangle at its current index.
    pub fn update_caret_offset(&mut self, affinity: TextAffinity) {
        let Some(mut rect) =
            self.caret_rect_for(self.caret_info.index, affinity, self.theme.cursor_width_px())
        else {
            return;
        };
        self.caret_affinity = affinity;
        self.adjust_handle_at_edge(&mut rect);
        self.caret_info.rect = rect;
        self.caret_info.original_rect = rect;
    }

    /// Word range under a field-local point, for double click and long
    /// press.
    ///
    /// Tries the AI analyzer (not for mouse input), then the paragraph's
    /// word boundary, then the single grapheme cluster under the point.
    pub fn get_select_range_by_offset(&self, local_offset: OffsetF) -> (i32, i32) {
        let len = self.content_len();
        let (Some(host), Some(paragraph), Some(content)) =
            (self.host(), self.paragraph.as_ref(), self.content.upgrade())
        else {
            return (0, 0);
        };
        if len == 0 {
            return (0, 0);
        }
        let mut pos = self.convert_touch_offset_to_position(local_offset, true);
        // keep the last character selectable
        if pos >= len {
            pos = len - 1;
        }
        if !host.is_using_mouse() {
            if let Some(range) = self.adjust_word_selection(pos, local_offset) {
                return range;
            }
        }
        if let Some((start, end)) = paragraph.word_boundary(pos) {
            if start < end {
                return (self.clamp_index(start), self.clamp_index(end));
            }
        }
        let content = content.read();
        let cluster = emoji::grapheme_cluster_length(content.wide_text(), pos as usize, true);
        (pos, (pos + cluster as i32).min(len))
    }

    /// Paragraph range under a field-local point, bounded by `\n` or the
    /// buffer ends.
    pub fn get_select_paragraph_by_offset(&self, local_offset: OffsetF) -> (i32, i32) {
        let Some(content) = self.content.upgrade() else {
            return (0, 0);
        };
        let pos = self.convert_touch_offset_to_position(local_offset, true);
        let content = content.read();
        let text = content.wide_text();
        let pos = (pos.max(0) as usize).min(text.len());
        let newline = u16::from(b'\n');
        let start = text[..pos]
            .iter()
            .rposition(|&unit| unit == newline)
            .map_or(0, |found| found + 1);
        let end = text[pos..]
            .iter()
            .position(|&unit| unit == newline)
            .map_or(text.len(), |found| pos + found);
        (start as i32, end as i32)
    }

    fn apply_range(&mut self, start: i32, end: i32) {
        self.update_handle_index(start, end);
        if self.is_selected() {
            self.move_first_handle_to_content_rect(self.first_handle_info.index, true, true);
            self.move_second_handle_to_content_rect(self.second_handle_info.index, true, true);
        } else {
            self.move_caret_to_content_rect(
                self.caret_info.index,
                TextAffinity::Downstream,
                false,
                true,
            );
        }
    }

    /// Selects the word under a field-local point.
    pub fn update_select_by_offset(&mut self, local_offset: OffsetF) {
        if self.paragraph.is_none() || self.content_len() == 0 {
            return;
        }
        let (start, end) = self.get_select_range_by_offset(local_offset);
        self.apply_range(start, end);
    }

    /// Selects the paragraph under a field-local point.
    pub fn update_select_paragraph_by_offset(&mut self, local_offset: OffsetF) {
        if self.paragraph.is_none() || self.content_len() == 0 {
            return;
        }
        let (start, end) = self.get_select_paragraph_by_offset(local_offset);
        self.apply_range(start, end);
    }

    /// Extends the selection to a mouse position; the first handle stays.
    pub fn update_second_handle_info_by_mouse_offset(&mut self, local_offset: OffsetF) {
        let index = self.convert_touch_offset_to_position(local_offset, false);
        self.move_second_handle_to_content_rect(index, true, true);
        self.caret_info.index = self.second_handle_info.index;
        let affinity = if self.has_reverse() {
            TextAffinity::Downstream
        } else {
            TextAffinity::Upstream
        };
        self.update_caret_offset(affinity);
    }

    /// Extends the selection to `index` from the keyboard.
    pub fn move_second_handle_by_keyboard(&mut self, index: i32) {
        self.move_second_handle_to_content_rect(index, true, true);
        self.caret_info.index = self.second_handle_info.index;
        let affinity = if self.has_reverse() {
            TextAffinity::Downstream
        } else {
            TextAffinity::Upstream
        };
        self.update_caret_offset(affinity);
    }

    fn first_affinity(&self) -> TextAffinity {
        if self.has_reverse() {
            TextAffinity::Upstream
        } else {
            TextAffinity::Downstream
        }
    }

    fn second_affinity(&self) -> TextAffinity {
        if self.has_reverse() {
            TextAffinity::Downstream
        } else {
            TextAffinity::Upstream
        }
    }

    /// Moves the first handle to `index` and refreshes the second handle.
    pub fn move_first_handle_to_content_rect(
        &mut self,
        index: i32,
        move_handle: bool,
        move_content: bool,
    ) {
        if self.host().is_none() {
            return;
        }
        self.first_handle_info.index = self.clamp_index(index);
        if let Some(mut rect) = self.handle_rect_for(self.first_handle_info.index, self.first_affinity()) {
            if move_handle {
                self.move_handle_to_content_rect(&mut rect, 0.0, move_content);
            } else {
                self.adjust_handle_at_edge(&mut rect);
            }
            self.first_handle_info.rect = rect;
        }
        self.caret_info.index = self.first_handle_info.index.max(self.second_handle_info.index);
        self.update_second_handle_offset();
        self.fire_select_event();
    }

    /// Moves the second handle to `index` and refreshes the first handle.
    pub fn move_second_handle_to_content_rect(
        &mut self,
        index: i32,
        move_handle: bool,
        move_content: bool,
    ) {
        if self.host().is_none() {
            return;
        }
        self.second_handle_info.index = self.clamp_index(index);
        if let Some(mut rect) =
            self.handle_rect_for(self.second_handle_info.index, self.second_affinity())
        {
            if move_handle {
                self.move_handle_to_content_rect(&mut rect, 0.0, move_content);
            } else {
                self.adjust_handle_at_edge(&mut rect);
            }
            self.second_handle_info.rect = rect;
        }
        self.caret_info.index = self.first_handle_info.index.max(self.second_handle_info.index);
        self.update_first_handle_offset();
        self.fire_select_event();
    }

    fn update_first_handle_offset(&mut self) {
        if let Some(mut rect) = self.handle_rect_for(self.first_handle_info.index, self.first_affinity()) {
            self.adjust_handle_at_edge(&mut rect);
            self.first_handle_info.rect = rect;
        }
    }

    fn update_second_handle_offset(&mut self) {
        if let Some(mut rect) =
            self.handle_rect_for(self.second_handle_info.index, self.second_affinity())
        {
            self.adjust_handle_at_edge(&mut rect);
            self.second_handle_info.rect = rect;
        }
    }

    /// Recomputes both handle rectangles from their indices.
    pub fn calculate_handle_offset(&mut self) {
        self.update_first_handle_offset();
        self.update_second_handle_offset();
    }

    /// Scrolls the text so `handle_rect` is inside the content rect, moving
    /// the rect along, then clamps the rect with
    /// [`adjust_handle_at_edge`](Self::adjust_handle_at_edge).
    ///
    /// Text areas scroll vertically, single-line fields horizontally. The
    /// text never scrolls past its ends.
    pub fn move_handle_to_content_rect(
        &self,
        handle_rect: &mut RectF,
        boundary_adjustment: f32,
        move_content: bool,
    ) {
        let Some(host) = self.host() else {
            return;
        };
        if move_content {
            let content = host.content_rect();
            let text = host.text_rect();
            let mut delta = OffsetF::ZERO;
            if host.is_text_area() {
                if greater_not_equal(text.height, content.height) {
                    if less_not_equal(handle_rect.top(), content.top()) {
                        delta.y = content.top() - handle_rect.top();
                    } else if greater_not_equal(handle_rect.bottom(), content.bottom()) {
                        delta.y = content.bottom() - handle_rect.bottom();
                    }
                }
            } else if greater_not_equal(text.width, content.width) {
                if less_not_equal(handle_rect.left(), content.left()) {
                    delta.x = content.left() - handle_rect.left();
                } else if greater_not_equal(
                    handle_rect.right() + boundary_adjustment,
                    content.right(),
                ) {
                    delta.x = content.right() - handle_rect.right() - boundary_adjustment;
                }
            }
            if delta != OffsetF::ZERO {
                let moved = clamp_text_rect(text.translate(delta), content);
                let applied = moved.offset() - text.offset();
                *handle_rect = handle_rect.translate(applied);
                host.set_text_rect(moved);
                debug!(dx = applied.x, dy = applied.y, "text scrolled to keep handle visible");
            }
        }
        self.adjust_handle_at_edge(handle_rect);
    }

    /// Clamps a handle rectangle horizontally into the content rect and
    /// never left of the text's left edge.
    pub fn adjust_handle_at_edge(&self, handle_rect: &mut RectF) {
        let Some(host) = self.host() else {
            return;
        };
        let content = host.content_rect();
        let text = host.text_rect();
        if greater_not_equal(handle_rect.right(), content.right()) {
            handle_rect.x = content.right() - handle_rect.width;
        }
        if less_not_equal(handle_rect.left(), content.left()) {
            handle_rect.x = content.left();
        }
        if less_not_equal(handle_rect.left(), text.left()) {
            handle_rect.x = text.left();
        }
    }

    /// Selection boxes of the current range, field-local.
    pub fn selection_rects(&self) -> RangeRects {
        let (Some(host), Some(paragraph)) = (self.host(), self.paragraph.as_ref()) else {
            return RangeRects::new();
        };
        let offset = host.text_rect().offset();
        paragraph
            .rects_for_range(self.start_index(), self.end_index())
            .into_iter()
            .map(|rect| rect.translate(offset))
            .collect()
    }

    /// Reports the selection to the host if it changed since the last
    /// report. Unfocused fields only report on newer API levels.
    pub fn fire_select_event(&mut self) {
        let current = (self.first_handle_info.index, self.second_handle_info.index);
        if self.reported == Some(current) {
            return;
        }
        let Some(host) = self.host() else {
            return;
        };
        if !host.is_focused() && host.api_version() < UNFOCUSED_SELECT_EVENT_API_VERSION {
            return;
        }
        self.reported = Some(current);
        host.on_selection_change(current.0.min(current.1), current.0.max(current.1));
    }
}
