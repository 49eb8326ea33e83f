//! A text field: the buffer, selection and overlay controllers of one
//! field, and the host they call back into.

use std::{
    fmt,
    ops::Range,
    sync::{
        Arc, Weak,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

use arkui_core::{Clock, OffsetF, RectF, TaskExecutor, TextFieldTheme};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use super::{
    CopyOptions, TextFieldProperties,
    ai::{CaretUpdateType, TextBoundaryAnalyzer},
    auto_fill::{AutoFillService, AutoFillType},
    content_controller::ContentController,
    decorator::{CounterDecorator, CounterState, ErrorDecorator},
    edit_queue::{EditOperation, EditQueue, EditQueueError},
    emoji,
    host::{OverlayCapabilities, SelectOverlayHost, TextEditHost, clamp_text_rect},
    input_filter::FilterSettings,
    paragraph::{Paragraph, ParagraphBuilder, TextAffinity},
    select_controller::TextSelectController,
    select_overlay::{
        OverlayCloseReason, OverlayRequest, OverlaySource, SelectOverlayInfo, SelectOverlayProxy,
        TextFieldSelectOverlay,
    },
};

/// Longest gap between two clicks of a double or triple click.
pub const MULTI_CLICK_INTERVAL: Duration = Duration::from_millis(500);
/// Farthest two clicks of a double or triple click may be apart, in pixels.
pub const MULTI_CLICK_DISTANCE: f32 = 5.0;

/// How many clicks in a row a click completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickKind {
    /// Places the caret.
    Single,
    /// Selects a word.
    Double,
    /// Selects a paragraph.
    Triple,
}

#[derive(Debug, Default)]
struct ClickTracker {
    last: Option<(Instant, OffsetF)>,
    count: u32,
}

impl ClickTracker {
    fn classify(&mut self, now: Instant, position: OffsetF) -> ClickKind {
        let chained = self.last.is_some_and(|(time, last)| {
            now.saturating_duration_since(time) < MULTI_CLICK_INTERVAL
                && last.distance_to(position) < MULTI_CLICK_DISTANCE
        });
        self.count = if chained { self.count % 3 + 1 } else { 1 };
        self.last = Some((now, position));
        match self.count {
            1 => ClickKind::Single,
            2 => ClickKind::Double,
            _ => ClickKind::Triple,
        }
    }
}

type TextCallback = Arc<dyn Fn(&str) + Send + Sync>;
type RangeCallback = Arc<dyn Fn(i32, i32) + Send + Sync>;

/// Application callbacks of a field.
///
/// `on_input_filter_error` and `on_selection_change` run while the field
/// updates its state and must not call back into the field.
#[derive(Clone, Default)]
pub struct TextFieldEvents {
    on_change: Option<TextCallback>,
    on_input_filter_error: Option<TextCallback>,
    on_selection_change: Option<RangeCallback>,
}

impl fmt::Debug for TextFieldEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextFieldEvents")
            .field("on_change", &self.on_change.is_some())
            .field("on_input_filter_error", &self.on_input_filter_error.is_some())
            .field("on_selection_change", &self.on_selection_change.is_some())
            .finish()
    }
}

impl TextFieldEvents {
    /// Called with the new text after a frame's edits changed it.
    pub fn on_change<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.on_change = Some(Arc::new(f));
        self
    }

    /// Called with the characters an input filter dropped.
    pub fn on_input_filter_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.on_input_filter_error = Some(Arc::new(f));
        self
    }

    /// Called with the ordered selection range when it changes.
    pub fn on_selection_change<F>(mut self, f: F) -> Self
    where
        F: Fn(i32, i32) + Send + Sync + 'static,
    {
        self.on_selection_change = Some(Arc::new(f));
        self
    }
}

/// Platform services a field depends on.
#[derive(Clone)]
pub struct TextFieldServices {
    /// Text layout.
    pub paragraph_builder: Arc<dyn ParagraphBuilder>,
    /// Delayed work, such as auto-scroll ticks.
    pub executor: Arc<dyn TaskExecutor>,
    /// Time source for click classification and AI throttling.
    pub clock: Arc<dyn Clock>,
    /// Draws handles and the selection menu.
    pub overlay_proxy: Option<Arc<dyn SelectOverlayProxy>>,
    /// System auto-fill.
    pub auto_fill: Option<Arc<dyn AutoFillService>>,
    /// Word and caret refinement.
    pub analyzer: Option<Arc<dyn TextBoundaryAnalyzer>>,
    /// Optional menu capabilities of the device.
    pub capabilities: OverlayCapabilities,
}

impl TextFieldServices {
    /// Services with no overlay, auto-fill or analyzer.
    pub fn new(
        paragraph_builder: Arc<dyn ParagraphBuilder>,
        executor: Arc<dyn TaskExecutor>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            paragraph_builder,
            executor,
            clock,
            overlay_proxy: None,
            auto_fill: None,
            analyzer: None,
            capabilities: OverlayCapabilities::default(),
        }
    }

    /// Sets the overlay subsystem.
    pub fn with_overlay_proxy(mut self, proxy: Arc<dyn SelectOverlayProxy>) -> Self {
        self.overlay_proxy = Some(proxy);
        self
    }

    /// Sets the auto-fill service.
    pub fn with_auto_fill(mut self, service: Arc<dyn AutoFillService>) -> Self {
        self.auto_fill = Some(service);
        self
    }

    /// Sets the AI analyzer.
    pub fn with_analyzer(mut self, analyzer: Arc<dyn TextBoundaryAnalyzer>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    /// Sets the device capabilities.
    pub fn with_capabilities(mut self, capabilities: OverlayCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }
}

struct DetachedOverlay;

impl SelectOverlayProxy for DetachedOverlay {
    fn show(&self, _info: &SelectOverlayInfo) {}
    fn update(&self, _info: &SelectOverlayInfo) {}
    fn close(&self, _reason: OverlayCloseReason) {}
}

/// One text input or text area.
///
/// Edits are queued by [`insert_value`](Self::insert_value) and friends and
/// applied by [`flush_edits`](Self::flush_edits), once per frame. Gestures
/// apply immediately.
pub struct TextFieldPattern {
    this: Weak<TextFieldPattern>,
    properties: RwLock<TextFieldProperties>,
    theme: TextFieldTheme,
    services: TextFieldServices,
    events: RwLock<TextFieldEvents>,
    content: Arc<RwLock<ContentController>>,
    select: Arc<RwLock<TextSelectController>>,
    overlay: Arc<Mutex<TextFieldSelectOverlay>>,
    edits: Mutex<EditQueue>,
    preview: Mutex<Option<Range<usize>>>,
    content_rect: Mutex<RectF>,
    text_rect: Mutex<RectF>,
    focused: AtomicBool,
    using_mouse: AtomicBool,
    paste_available: AtomicBool,
    caret_twinkling: AtomicBool,
    magnifier: Mutex<Option<OffsetF>>,
    clicks: Mutex<ClickTracker>,
    error: Mutex<ErrorDecorator>,
}

impl TextFieldPattern {
    /// Creates an empty, unfocused field.
    pub fn new(
        properties: TextFieldProperties,
        theme: TextFieldTheme,
        services: TextFieldServices,
    ) -> Arc<Self> {
        Arc::new_cyclic(|this: &Weak<Self>| {
            let edit_host: Weak<dyn TextEditHost> = this.clone();
            let overlay_host: Weak<dyn SelectOverlayHost> = this.clone();
            let content = Arc::new(RwLock::new(ContentController::new(edit_host.clone())));
            let select = Arc::new(RwLock::new(TextSelectController::new(
                edit_host,
                Arc::downgrade(&content),
                theme.clone(),
                Arc::clone(&services.clock),
            )));
            let proxy = services
                .overlay_proxy
                .clone()
                .unwrap_or_else(|| Arc::new(DetachedOverlay) as Arc<dyn SelectOverlayProxy>);
            let overlay = TextFieldSelectOverlay::new(overlay_host, proxy, theme.clone());
            let line_height = theme.default_line_height;
            Self {
                this: this.clone(),
                properties: RwLock::new(properties),
                theme,
                services,
                events: RwLock::new(TextFieldEvents::default()),
                content,
                select,
                overlay,
                edits: Mutex::new(EditQueue::new()),
                preview: Mutex::new(None),
                content_rect: Mutex::new(RectF::ZERO),
                text_rect: Mutex::new(RectF::new(0.0, 0.0, 0.0, line_height)),
                focused: AtomicBool::new(false),
                using_mouse: AtomicBool::new(false),
                paste_available: AtomicBool::new(false),
                caret_twinkling: AtomicBool::new(false),
                magnifier: Mutex::new(None),
                clicks: Mutex::new(ClickTracker::default()),
                error: Mutex::new(ErrorDecorator::default()),
            }
        })
    }

    /// Replaces the application callbacks.
    pub fn set_events(&self, events: TextFieldEvents) {
        *self.events.write() = events;
    }

    /// Current properties.
    pub fn properties(&self) -> TextFieldProperties {
        self.properties.read().clone()
    }

    /// Updates the properties, re-filtering the buffer under the new rules.
    pub fn update_properties(&self, f: impl FnOnce(&mut TextFieldProperties)) {
        f(&mut self.properties.write());
        self.content.write().filter_value();
        self.relayout();
        self.refresh_caret(false);
    }

    /// The selection overlay, for routing handle gestures.
    pub fn overlay(&self) -> Arc<Mutex<TextFieldSelectOverlay>> {
        Arc::clone(&self.overlay)
    }

    /// The text.
    pub fn text(&self) -> String {
        self.content.read().text_value()
    }

    /// Caret index.
    pub fn caret_index(&self) -> i32 {
        self.select.read().caret_index()
    }

    /// Ordered selection range. Empty when only the caret is shown.
    pub fn selection(&self) -> (i32, i32) {
        let select = self.select.read();
        (select.start_index(), select.end_index())
    }

    /// Range of the composition text, if any.
    pub fn preview_range(&self) -> Option<Range<usize>> {
        self.preview.lock().clone()
    }

    /// Selected text for the clipboard. `None` for password fields, fields
    /// that forbid copying, and empty selections.
    pub fn selected_text(&self) -> Option<String> {
        if self.is_password() || self.properties.read().copy_options == CopyOptions::None {
            return None;
        }
        let (start, end) = self.selection();
        (start != end).then(|| self.content.read().get_selected_value(start, end))
    }

    /// Where the magnifier is shown, if it is.
    pub fn magnifier(&self) -> Option<OffsetF> {
        *self.magnifier.lock()
    }

    /// Whether the caret blinks.
    pub fn is_caret_twinkling(&self) -> bool {
        self.caret_twinkling.load(Ordering::Acquire)
    }

    /// Marks the current gesture as coming from a mouse.
    pub fn set_using_mouse(&self, using_mouse: bool) {
        self.using_mouse.store(using_mouse, Ordering::Release);
    }

    /// Tells the field whether the clipboard has something to paste.
    pub fn set_paste_available(&self, available: bool) {
        self.paste_available.store(available, Ordering::Release);
    }

    /// Queues text for insertion at the caret, replacing the selection or the
    /// composition text.
    pub fn insert_value(&self, text: &str) -> Result<(), EditQueueError> {
        self.edits.lock().push(EditOperation::Insert(text.to_owned()))
    }

    /// Queues a deletion of `count` grapheme clusters before the caret, or
    /// of the selection.
    pub fn delete_backward(&self, count: usize) -> Result<(), EditQueueError> {
        self.edits.lock().push(EditOperation::DeleteBackward(count))
    }

    /// Queues a deletion of `count` grapheme clusters after the caret, or of
    /// the selection.
    pub fn delete_forward(&self, count: usize) -> Result<(), EditQueueError> {
        self.edits.lock().push(EditOperation::DeleteForward(count))
    }

    /// Queues composition text from an input method.
    pub fn set_preview_text(&self, text: &str) -> Result<(), EditQueueError> {
        self.edits.lock().push(EditOperation::SetPreviewText(text.to_owned()))
    }

    /// Queues the commit of the composition text.
    pub fn finish_preview(&self) -> Result<(), EditQueueError> {
        self.edits.lock().push(EditOperation::FinishPreview)
    }

    /// Applies every queued edit, lays the text out again and places the
    /// caret. Returns `true` if the text changed.
    pub fn flush_edits(&self) -> bool {
        let operations = self.edits.lock().drain();
        if operations.is_empty() {
            return false;
        }
        let before = self.text();
        for operation in operations {
            self.apply_edit(operation);
        }
        self.relayout();
        self.refresh_caret(true);
        let after = self.text();
        let changed = before != after;
        if changed {
            debug!(len = after.len(), "text changed");
            self.overlay.lock().close_overlay(OverlayCloseReason::Normal);
            self.caret_twinkling.store(true, Ordering::Release);
            self.notify_change(&after);
        }
        changed
    }

    fn apply_edit(&self, operation: EditOperation) {
        match operation {
            EditOperation::Insert(text) => {
                let (start, end) = self.edit_range();
                self.preview.lock().take();
                self.replace_range(start, end, &text);
            }
            EditOperation::DeleteBackward(count) => {
                self.commit_preview();
                self.delete_clusters(count, true);
            }
            EditOperation::DeleteForward(count) => {
                self.commit_preview();
                self.delete_clusters(count, false);
            }
            EditOperation::SetPreviewText(text) => self.set_preview(&text),
            EditOperation::FinishPreview => self.commit_preview(),
        }
    }

    fn edit_range(&self) -> (i32, i32) {
        let preview = self.preview.lock().clone();
        match preview {
            Some(range) => (range.start as i32, range.end as i32),
            None => self.selection(),
        }
    }

    fn replace_range(&self, start: i32, end: i32, text: &str) {
        let caret = {
            let mut content = self.content.write();
            let before = content.wide_text().to_vec();
            let (from, to) = content.format_index(start, end);
            let replaced = if from == to {
                0
            } else {
                emoji::ceil_boundary(&before, to) - emoji::floor_boundary(&before, from)
            };
            let from = emoji::floor_boundary(&before, from);
            content.replace_selected_value(start, end, text);
            let after = content.wide_text();
            if after == before.as_slice() {
                None
            } else {
                let grown = (after.len() + replaced).saturating_sub(before.len());
                Some((from + grown).min(after.len()))
            }
        };
        if let Some(caret) = caret {
            self.select.write().update_caret_index(caret as i32);
        }
    }

    fn delete_clusters(&self, count: usize, backward: bool) {
        let (start, end) = self.selection();
        let caret = {
            let mut content = self.content.write();
            if start != end {
                content.delete(start, end - start, false);
                start
            } else {
                let text = content.wide_text();
                let mut index = (start.max(0) as usize).min(text.len());
                let mut units = 0;
                for _ in 0..count {
                    let len = emoji::grapheme_cluster_length(text, index, !backward);
                    if len == 0 {
                        break;
                    }
                    units += len;
                    index = if backward { index - len } else { index + len };
                }
                let deleted = content.delete(start, units as i32, backward);
                if backward { start - deleted } else { start }
            }
        };
        self.select.write().update_caret_index(caret);
    }

    fn set_preview(&self, text: &str) {
        let (start, end) = self.edit_range();
        let range = self.content.write().splice_unfiltered(start, end, text);
        let caret = range.end as i32;
        *self.preview.lock() = (!range.is_empty()).then_some(range);
        self.select.write().update_caret_index(caret);
    }

    fn commit_preview(&self) {
        let Some(range) = self.preview.lock().take() else {
            return;
        };
        let (start, end) = (range.start as i32, range.end as i32);
        let text = {
            let mut content = self.content.write();
            let text = content.get_selected_value(start, end);
            content.splice_unfiltered(start, end, "");
            text
        };
        debug!(len = text.len(), "committing preview text");
        self.select.write().update_caret_index(start);
        self.replace_range(start, start, &text);
    }

    /// Replaces the whole text, running the filters, and puts the caret at
    /// the end.
    pub fn set_text(&self, text: &str) {
        self.preview.lock().take();
        self.content.write().set_text_value(text);
        self.relayout();
        let len = self.content.read().len() as i32;
        self.select
            .write()
            .move_caret_to_content_rect(len, TextAffinity::Downstream, true, true);
        self.overlay.lock().close_overlay(OverlayCloseReason::Normal);
    }

    fn notify_change(&self, text: &str) {
        let callback = self.events.read().on_change.clone();
        if let Some(callback) = callback {
            callback(text);
        }
    }

    /// Lays the buffer out again with the paragraph builder.
    pub fn relayout(&self) {
        let text = self.content.read().wide_text().to_vec();
        let max_width = if self.is_text_area() {
            self.content_rect().width
        } else {
            f32::INFINITY
        };
        let paragraph = self.services.paragraph_builder.build(&text, max_width);
        self.set_paragraph(paragraph);
    }

    /// Installs a laid-out paragraph. The text rectangle takes its size and
    /// the caret and handles are placed on it again.
    pub fn set_paragraph(&self, paragraph: Arc<dyn Paragraph>) {
        let content = self.content_rect();
        let line_height = self.preferred_line_height();
        {
            let mut text_rect = self.text_rect.lock();
            let sized = RectF::new(
                text_rect.x,
                text_rect.y,
                paragraph.width(),
                paragraph.height().max(line_height),
            );
            *text_rect = clamp_text_rect(sized, content);
        }
        {
            let mut select = self.select.write();
            select.set_paragraph(Some(paragraph));
            if select.is_selected() {
                select.calculate_handle_offset();
            } else {
                let affinity = select.caret_affinity();
                select.update_caret_offset(affinity);
            }
        }
        self.overlay.lock().update_overlay();
    }

    fn refresh_caret(&self, is_editor_value_changed: bool) {
        let mut select = self.select.write();
        if select.is_selected() {
            let (first, second) = (select.first_handle_index(), select.second_handle_index());
            select.update_handle_index(first, second);
            select.calculate_handle_offset();
        } else {
            let caret = select.caret_index();
            select.move_caret_to_content_rect(
                caret,
                TextAffinity::Downstream,
                is_editor_value_changed,
                true,
            );
        }
    }

    /// Sets the visible viewport and lays the text out for it.
    pub fn set_content_rect(&self, rect: RectF) {
        *self.content_rect.lock() = rect;
        self.relayout();
    }

    /// Routes a click, classified against the previous ones.
    pub fn handle_click(&self, local: OffsetF) -> ClickKind {
        let kind = self.clicks.lock().classify(self.services.clock.now(), local);
        match kind {
            ClickKind::Single => self.handle_single_click(local),
            ClickKind::Double => self.handle_double_click(local),
            ClickKind::Triple => self.handle_triple_click(local),
        }
        kind
    }

    /// Places the caret under `local`. Touch clicks on a non-empty field
    /// show the caret handle.
    pub fn handle_single_click(&self, local: OffsetF) {
        self.ensure_focus();
        self.overlay.lock().close_overlay(OverlayCloseReason::Normal);
        {
            let mut select = self.select.write();
            select.set_caret_update_type(CaretUpdateType::Pressed);
            select.update_caret_info_by_offset(local, true, false);
        }
        self.caret_twinkling.store(true, Ordering::Release);
        if !self.is_using_mouse() && !self.content.read().is_empty() {
            self.show_overlay(OverlaySource::Touch, false);
        }
    }

    /// Selects the word under `local`.
    pub fn handle_double_click(&self, local: OffsetF) {
        self.ensure_focus();
        self.select_by_gesture(local, CaretUpdateType::DoubleClick, false);
    }

    /// Selects the paragraph under `local`.
    pub fn handle_triple_click(&self, local: OffsetF) {
        self.ensure_focus();
        let selected = {
            let mut select = self.select.write();
            select.update_select_paragraph_by_offset(local);
            select.is_selected()
        };
        if selected && !self.is_using_mouse() {
            self.show_overlay(OverlaySource::Touch, true);
        }
    }

    /// Selects the word under `local` and shows the menu. On an empty field
    /// only the caret handle and the menu are shown.
    pub fn handle_long_press(&self, local: OffsetF) {
        self.ensure_focus();
        self.select_by_gesture(local, CaretUpdateType::LongPressed, true);
        self.start_vibrator();
        self.show_overlay(OverlaySource::Touch, true);
    }

    fn select_by_gesture(&self, local: OffsetF, kind: CaretUpdateType, long_press: bool) {
        let empty = self.content.read().is_empty();
        let selected = {
            let mut select = self.select.write();
            select.set_caret_update_type(kind);
            if empty {
                select.update_caret_info_by_offset(local, true, false);
            } else {
                select.update_select_by_offset(local);
            }
            select.set_caret_update_type(CaretUpdateType::Pressed);
            select.is_selected()
        };
        self.caret_twinkling.store(!selected, Ordering::Release);
        if selected && !long_press && !self.is_using_mouse() {
            self.show_overlay(OverlaySource::Touch, true);
        }
    }

    /// Mouse right click: keeps a selection that contains the point,
    /// otherwise moves the caret there, then asks for the menu.
    pub fn handle_right_click(&self, local: OffsetF) -> bool {
        self.ensure_focus();
        {
            let mut select = self.select.write();
            let inside = select.is_selected()
                && select.selection_rects().iter().any(|rect| rect.contains(local));
            if !inside {
                select.set_caret_update_type(CaretUpdateType::Pressed);
                select.update_caret_info_by_offset(local, true, false);
            }
        }
        self.show_overlay(OverlaySource::RightClick, true)
    }

    fn show_overlay(&self, source: OverlaySource, menu_is_show: bool) -> bool {
        self.overlay.lock().show_overlay(&OverlayRequest {
            menu_is_show,
            source,
        })
    }

    /// Selects `[start, end)`, or places the caret when the range is empty.
    pub fn set_selection(&self, start: i32, end: i32) {
        {
            let mut select = self.select.write();
            if start == end {
                select.move_caret_to_content_rect(start, TextAffinity::Downstream, false, true);
            } else {
                select.update_handle_index(start, end);
                select.move_second_handle_to_content_rect(end, true, true);
            }
        }
        self.overlay.lock().update_overlay();
    }

    /// Selects everything.
    pub fn select_all(&self) {
        let len = self.content.read().len() as i32;
        self.set_selection(0, len);
    }

    fn ensure_focus(&self) {
        if !self.is_focused() {
            self.on_focus();
        }
    }

    /// The field gained focus.
    pub fn on_focus(&self) {
        self.focused.store(true, Ordering::Release);
        self.caret_twinkling.store(true, Ordering::Release);
        debug!("text field focused");
        if self.properties.read().select_all_enabled {
            self.select_all();
        }
    }

    /// The field lost focus: the composition is committed, the selection
    /// collapses to the caret and the overlay closes.
    pub fn on_blur(&self) {
        self.commit_preview();
        self.relayout();
        self.focused.store(false, Ordering::Release);
        self.caret_twinkling.store(false, Ordering::Release);
        {
            let mut select = self.select.write();
            select.reset_handles();
            select.fire_select_event();
        }
        self.overlay.lock().close_overlay(OverlayCloseReason::FocusLost);
        *self.magnifier.lock() = None;
        debug!("text field blurred");
    }

    /// Tears the field down. Later edits are rejected.
    pub fn detach(&self) {
        self.edits.lock().close();
        self.overlay.lock().close_overlay(OverlayCloseReason::Normal);
    }

    /// Asks the auto-fill service for content. Requires auto-fill to be
    /// enabled, focus, a fill type and a service.
    pub fn request_auto_fill(&self) -> bool {
        let (enabled, fill_type) = {
            let properties = self.properties.read();
            (
                properties.enable_auto_fill,
                AutoFillType::resolve(properties.content_type, properties.input_type),
            )
        };
        if !enabled || !self.is_focused() || fill_type == AutoFillType::Unspecified {
            debug!(enabled, ?fill_type, "auto-fill not requested");
            return false;
        }
        let Some(service) = self.services.auto_fill.clone() else {
            return false;
        };
        info!(?fill_type, "requesting auto-fill");
        let this = self.this.clone();
        service.request(
            fill_type,
            Box::new(move |filled| {
                let (Some(field), Some(text)) = (this.upgrade(), filled) else {
                    return;
                };
                field.apply_auto_fill(&text);
            }),
        );
        true
    }

    /// Replaces the text with auto-filled content and notifies the change.
    pub fn apply_auto_fill(&self, text: &str) {
        let before = self.text();
        self.set_text(text);
        let after = self.text();
        if before != after {
            self.notify_change(&after);
        }
    }

    /// Counter state, when the counter is enabled.
    pub fn counter_state(&self) -> Option<CounterState> {
        let (options, max_length) = {
            let properties = self.properties.read();
            (properties.show_counter?, properties.max_length)
        };
        let content = self.content.read();
        Some(CounterDecorator::new(options).update(content.len(), max_length, content.was_truncated()))
    }

    /// Sets or clears the error text shown under the field.
    pub fn set_error_text(&self, text: Option<String>) {
        if self.error.lock().set_text(text) {
            debug!("error text changed");
        }
    }

    /// The error text shown under the field.
    pub fn error_text(&self) -> Option<String> {
        self.error.lock().text().map(str::to_owned)
    }

    /// What assistive technologies read: the text, masked for passwords,
    /// followed by the error text.
    pub fn accessibility_text(&self) -> String {
        let text = if self.is_password() {
            let len = self.content.read().len();
            "\u{2022}".repeat(len)
        } else {
            self.text()
        };
        match self.error_text() {
            Some(error) if text.is_empty() => error,
            Some(error) => format!("{text}, {error}"),
            None => text,
        }
    }
}

impl TextEditHost for TextFieldPattern {
    fn filter_settings(&self) -> FilterSettings {
        self.properties.read().filter_settings()
    }

    fn on_input_filter_error(&self, rejected: &str) {
        let callback = self.events.read().on_input_filter_error.clone();
        if let Some(callback) = callback {
            callback(rejected);
        }
    }

    fn content_rect(&self) -> RectF {
        let mut rect = *self.content_rect.lock();
        let properties = self.properties.read();
        if properties.text_area {
            if let Some(max_lines) = properties.max_lines {
                let cap = max_lines.max(1) as f32 * self.preferred_line_height();
                rect.height = rect.height.min(cap);
            }
        }
        rect
    }

    fn text_rect(&self) -> RectF {
        *self.text_rect.lock()
    }

    fn set_text_rect(&self, rect: RectF) {
        *self.text_rect.lock() = rect;
    }

    fn preferred_line_height(&self) -> f32 {
        self.theme.default_line_height
    }

    fn is_text_area(&self) -> bool {
        self.properties.read().text_area
    }

    fn is_focused(&self) -> bool {
        self.focused.load(Ordering::Acquire)
    }

    fn api_version(&self) -> u32 {
        self.properties.read().api_version
    }

    fn is_using_mouse(&self) -> bool {
        self.using_mouse.load(Ordering::Acquire)
    }

    fn on_selection_change(&self, start: i32, end: i32) {
        let callback = self.events.read().on_selection_change.clone();
        if let Some(callback) = callback {
            callback(start, end);
        }
    }

    fn boundary_analyzer(&self) -> Option<Arc<dyn TextBoundaryAnalyzer>> {
        if self.properties.read().ai_enabled {
            self.services.analyzer.clone()
        } else {
            None
        }
    }
}

impl SelectOverlayHost for TextFieldPattern {
    fn select_controller(&self) -> Option<Arc<RwLock<TextSelectController>>> {
        Some(Arc::clone(&self.select))
    }

    fn content_controller(&self) -> Option<Arc<RwLock<ContentController>>> {
        Some(Arc::clone(&self.content))
    }

    fn font_size(&self) -> f32 {
        self.properties.read().font_size
    }

    fn is_selection_menu_hidden(&self) -> bool {
        self.properties.read().selection_menu_hidden
    }

    fn copy_options(&self) -> CopyOptions {
        self.properties.read().copy_options
    }

    fn is_paste_available(&self) -> bool {
        self.paste_available.load(Ordering::Acquire)
    }

    fn capabilities(&self) -> OverlayCapabilities {
        self.services.capabilities
    }

    fn start_vibrator(&self) {
        debug!("haptic feedback");
    }

    fn update_magnifier(&self, local: Option<OffsetF>) {
        *self.magnifier.lock() = local;
    }

    fn set_caret_twinkling(&self, twinkling: bool) {
        self.caret_twinkling.store(twinkling, Ordering::Release);
    }

    fn task_executor(&self) -> Option<Arc<dyn TaskExecutor>> {
        Some(Arc::clone(&self.services.executor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_classification() {
        let start = Instant::now();
        let mut tracker = ClickTracker::default();
        let at = OffsetF::new(10.0, 10.0);
        assert_eq!(tracker.classify(start, at), ClickKind::Single);
        assert_eq!(
            tracker.classify(start + Duration::from_millis(200), at.offset(2.0, 0.0)),
            ClickKind::Double
        );
        assert_eq!(
            tracker.classify(start + Duration::from_millis(400), at),
            ClickKind::Triple
        );
        assert_eq!(
            tracker.classify(start + Duration::from_millis(600), at),
            ClickKind::Single
        );
    }

    #[test]
    fn test_click_chain_breaks_on_distance_and_time() {
        let start = Instant::now();
        let mut tracker = ClickTracker::default();
        let at = OffsetF::new(10.0, 10.0);
        tracker.classify(start, at);
        assert_eq!(
            tracker.classify(start + Duration::from_millis(100), at.offset(6.0, 0.0)),
            ClickKind::Single
        );
        assert_eq!(
            tracker.classify(start + Duration::from_millis(700), at.offset(6.0, 0.0)),
            ClickKind::Single
        );
    }
}
