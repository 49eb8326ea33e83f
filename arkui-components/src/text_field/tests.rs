//! Field-level scenarios: edits through the queue, gestures, the overlay and
//! auto-fill.

use std::{sync::Arc, time::Duration};

use arkui_core::{ManualClock, ManualTaskExecutor, OffsetF, RectF, TextFieldTheme};
use parking_lot::Mutex;

use super::*;

#[derive(Default)]
struct RecordingProxy {
    infos: Mutex<Vec<SelectOverlayInfo>>,
    shows: Mutex<usize>,
    closed: Mutex<Vec<OverlayCloseReason>>,
}

impl RecordingProxy {
    fn last(&self) -> Option<SelectOverlayInfo> {
        self.infos.lock().last().copied()
    }

    fn shows(&self) -> usize {
        *self.shows.lock()
    }

    fn closed(&self) -> Vec<OverlayCloseReason> {
        self.closed.lock().clone()
    }
}

impl SelectOverlayProxy for RecordingProxy {
    fn show(&self, info: &SelectOverlayInfo) {
        *self.shows.lock() += 1;
        self.infos.lock().push(*info);
    }

    fn update(&self, info: &SelectOverlayInfo) {
        self.infos.lock().push(*info);
    }

    fn close(&self, reason: OverlayCloseReason) {
        self.closed.lock().push(reason);
    }
}

#[derive(Default)]
struct PendingAutoFill {
    requests: Mutex<Vec<(AutoFillType, AutoFillCallback)>>,
}

impl AutoFillService for PendingAutoFill {
    fn request(&self, fill_type: AutoFillType, on_complete: AutoFillCallback) {
        self.requests.lock().push((fill_type, on_complete));
    }
}

struct Field {
    field: Arc<TextFieldPattern>,
    executor: ManualTaskExecutor,
    proxy: Arc<RecordingProxy>,
    auto_fill: Arc<PendingAutoFill>,
}

fn field_with(properties: TextFieldProperties, content: RectF) -> Field {
    arkui_core::logging::init_tracing();
    let executor = ManualTaskExecutor::new();
    let proxy = Arc::new(RecordingProxy::default());
    let auto_fill = Arc::new(PendingAutoFill::default());
    let builder = MonospaceParagraphBuilder {
        char_width: 10.0,
        line_height: 20.0,
        wrap: properties.text_area,
    };
    let services = TextFieldServices::new(
        Arc::new(builder),
        Arc::new(executor.clone()),
        Arc::new(ManualClock::new()),
    )
    .with_overlay_proxy(proxy.clone())
    .with_auto_fill(auto_fill.clone());
    let field = TextFieldPattern::new(properties, TextFieldTheme::default(), services);
    field.set_content_rect(content);
    field.on_focus();
    Field {
        field,
        executor,
        proxy,
        auto_fill,
    }
}

fn field(properties: TextFieldProperties) -> Field {
    field_with(properties, RectF::new(0.0, 0.0, 200.0, 20.0))
}

fn type_text(field: &TextFieldPattern, text: &str) -> bool {
    field.insert_value(text).unwrap();
    field.flush_edits()
}

#[test]
fn test_decimal_field_keeps_first_point() {
    let f = field(TextFieldProperties::default().input_type(TextInputType::NumberDecimal));
    assert!(type_text(&f.field, "12.3.4"));
    assert_eq!(f.field.text(), "12.34");
    assert_eq!(f.field.caret_index(), 5);
}

#[test]
fn test_full_field_rejects_keystroke() {
    let f = field(TextFieldProperties::default().max_length(3));
    f.field.set_text("abc");
    assert!(!type_text(&f.field, "d"));
    assert_eq!(f.field.text(), "abc");
    assert_eq!(f.field.caret_index(), 3);
}

#[test]
fn test_delete_removes_whole_emoji() {
    let f = field(TextFieldProperties::default());
    f.field.set_text("a😀");
    f.field.delete_backward(1).unwrap();
    assert!(f.field.flush_edits());
    assert_eq!(f.field.text(), "a");
    assert_eq!(f.field.caret_index(), 1);

    f.field.set_text("😀b");
    f.field.set_selection(0, 0);
    f.field.delete_forward(1).unwrap();
    f.field.flush_edits();
    assert_eq!(f.field.text(), "b");
    assert_eq!(f.field.caret_index(), 0);
}

#[test]
fn test_duplicate_at_sign_is_dropped() {
    let f = field(TextFieldProperties::default().input_type(TextInputType::EmailAddress));
    f.field.set_text("a@b");
    f.field.set_selection(1, 1);
    assert!(!type_text(&f.field, "@"));
    assert_eq!(f.field.text(), "a@b");
    assert_eq!(f.field.caret_index(), 1);
}

#[test]
fn test_rejected_characters_reach_the_application() {
    let f = field(TextFieldProperties::default().input_type(TextInputType::Number));
    let rejected = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&rejected);
    f.field.set_events(
        TextFieldEvents::default().on_input_filter_error(move |text| sink.lock().push(text.to_owned())),
    );
    type_text(&f.field, "1a2");
    assert_eq!(f.field.text(), "12");
    assert_eq!(*rejected.lock(), vec!["a".to_owned()]);
}

#[test]
fn test_caret_follows_filtered_batch_insert() {
    let f = field(TextFieldProperties::default().input_type(TextInputType::Number));
    f.field.set_text("12");
    f.field.set_selection(0, 0);
    assert!(type_text(&f.field, "a3b"));
    assert_eq!(f.field.text(), "312");
    assert_eq!(f.field.caret_index(), 1);

    f.field.set_text("123");
    f.field.set_selection(1, 1);
    assert!(!type_text(&f.field, "xy"));
    assert_eq!(f.field.text(), "123");
    assert_eq!(f.field.caret_index(), 1);
}

#[test]
fn test_change_event_fires_once_per_frame() {
    let f = field(TextFieldProperties::default());
    let changes = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&changes);
    f.field
        .set_events(TextFieldEvents::default().on_change(move |text| sink.lock().push(text.to_owned())));
    f.field.insert_value("ab").unwrap();
    f.field.insert_value("c").unwrap();
    f.field.delete_backward(1).unwrap();
    assert!(f.field.flush_edits());
    assert!(!f.field.flush_edits());
    assert_eq!(*changes.lock(), vec!["ab".to_owned()]);
}

#[test]
fn test_selection_is_replaced_and_deleted() {
    let f = field(TextFieldProperties::default());
    f.field.set_text("hello");
    f.field.set_selection(1, 4);
    assert_eq!(f.field.selected_text().as_deref(), Some("ell"));
    f.field.delete_backward(1).unwrap();
    f.field.flush_edits();
    assert_eq!(f.field.text(), "ho");
    assert_eq!(f.field.selection(), (1, 1));

    f.field.set_selection(0, 2);
    type_text(&f.field, "yo");
    assert_eq!(f.field.text(), "yo");
    assert_eq!(f.field.caret_index(), 2);
}

#[test]
fn test_preview_text_is_replaced_then_committed() {
    let f = field(TextFieldProperties::default());
    f.field.set_text("x");
    f.field.set_preview_text("ni").unwrap();
    f.field.flush_edits();
    assert_eq!(f.field.text(), "xni");
    assert_eq!(f.field.preview_range(), Some(1..3));
    assert_eq!(f.field.caret_index(), 3);

    f.field.set_preview_text("你").unwrap();
    f.field.finish_preview().unwrap();
    f.field.flush_edits();
    assert_eq!(f.field.text(), "x你");
    assert_eq!(f.field.preview_range(), None);
    assert_eq!(f.field.caret_index(), 2);
}

#[test]
fn test_committed_preview_is_filtered() {
    let f = field(TextFieldProperties::default().input_type(TextInputType::Number));
    f.field.set_preview_text("12a").unwrap();
    f.field.flush_edits();
    assert_eq!(f.field.text(), "12a");

    f.field.finish_preview().unwrap();
    f.field.flush_edits();
    assert_eq!(f.field.text(), "12");
    assert_eq!(f.field.caret_index(), 2);
}

#[test]
fn test_insert_replaces_preview() {
    let f = field(TextFieldProperties::default());
    f.field.set_preview_text("ab").unwrap();
    f.field.insert_value("X").unwrap();
    f.field.flush_edits();
    assert_eq!(f.field.text(), "X");
    assert_eq!(f.field.preview_range(), None);
}

#[test]
fn test_clicks_place_caret_then_select_word_then_paragraph() {
    let f = field(TextFieldProperties::default());
    f.field.set_text("hello world");
    let at = OffsetF::new(22.0, 10.0);

    assert_eq!(f.field.handle_click(at), ClickKind::Single);
    assert_eq!(f.field.caret_index(), 2);
    let caret_handle = f.proxy.last().unwrap();
    assert!(caret_handle.is_single_handle);
    assert!(!caret_handle.menu_visible);

    assert_eq!(f.field.handle_click(at), ClickKind::Double);
    assert_eq!(f.field.selection(), (0, 5));
    let info = f.proxy.last().unwrap();
    assert!(!info.is_single_handle);
    assert!(info.menu_visible);
    assert!(info.menu.show_copy);
    assert!(info.menu.show_copy_all);

    assert_eq!(f.field.handle_click(at), ClickKind::Triple);
    assert_eq!(f.field.selection(), (0, 11));
    assert!(!f.proxy.last().unwrap().menu.show_copy_all);
}

#[test]
fn test_mouse_click_shows_no_handle() {
    let f = field(TextFieldProperties::default());
    f.field.set_text("hello");
    f.field.set_using_mouse(true);
    f.field.handle_click(OffsetF::new(30.0, 10.0));
    assert_eq!(f.field.caret_index(), 3);
    assert_eq!(f.proxy.shows(), 0);
}

#[test]
fn test_long_press_on_empty_field_offers_paste() {
    let f = field(TextFieldProperties::default());
    f.field.set_paste_available(true);
    f.field.handle_long_press(OffsetF::new(30.0, 10.0));
    let info = f.proxy.last().unwrap();
    assert!(info.is_single_handle);
    assert!(info.menu_visible);
    assert!(info.menu.show_paste);
    assert!(!info.menu.show_copy);
    assert!(!info.menu.show_copy_all);
}

#[test]
fn test_right_click_respects_hidden_menu() {
    let f = field(TextFieldProperties::default().selection_menu_hidden(true));
    f.field.set_text("hello");
    assert!(!f.field.handle_right_click(OffsetF::new(10.0, 10.0)));
    assert_eq!(f.proxy.shows(), 0);

    let shown = field(TextFieldProperties::default());
    shown.field.set_text("hello");
    assert!(shown.field.handle_right_click(OffsetF::new(10.0, 10.0)));
    assert_eq!(shown.field.caret_index(), 1);
}

#[test]
fn test_password_selection_cannot_be_copied() {
    let f = field(TextFieldProperties::default().input_type(TextInputType::VisiblePassword));
    f.field.set_text("secret");
    f.field.handle_long_press(OffsetF::new(20.0, 10.0));
    assert_eq!(f.field.selection(), (0, 6));
    let info = f.proxy.last().unwrap();
    assert!(!info.menu.show_copy);
    assert!(!info.menu.show_cut);
    assert_eq!(f.field.selected_text(), None);
    assert_eq!(f.field.accessibility_text(), "\u{2022}".repeat(6));
}

#[test]
fn test_blur_collapses_selection_and_closes_overlay() {
    let f = field(TextFieldProperties::default());
    f.field.set_text("hello world");
    f.field.handle_long_press(OffsetF::new(20.0, 10.0));
    assert_eq!(f.field.selection(), (0, 5));

    f.field.on_blur();
    assert_eq!(f.field.selection(), (5, 5));
    assert_eq!(f.proxy.closed(), vec![OverlayCloseReason::FocusLost]);
    assert!(!f.field.is_caret_twinkling());
}

#[test]
fn test_selection_changes_are_reported() {
    let f = field(TextFieldProperties::default());
    let ranges = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&ranges);
    f.field.set_events(
        TextFieldEvents::default().on_selection_change(move |start, end| sink.lock().push((start, end))),
    );
    f.field.set_text("hello");
    f.field.set_selection(3, 1);
    assert_eq!(ranges.lock().last(), Some(&(1, 3)));
    f.field.select_all();
    assert_eq!(ranges.lock().last(), Some(&(0, 5)));
}

#[test]
fn test_focus_selects_all_when_enabled() {
    let f = field(TextFieldProperties::default().select_all_enabled(true));
    f.field.set_text("hello");
    f.field.on_blur();
    f.field.on_focus();
    assert_eq!(f.field.selection(), (0, 5));
}

#[test]
fn test_drag_second_handle_extends_selection() {
    let f = field(TextFieldProperties::default());
    f.field.set_text("hello world");
    f.field.handle_long_press(OffsetF::new(20.0, 10.0));
    let overlay = f.field.overlay();

    let handle = RectF::new(72.0, 0.0, 2.0, 20.0);
    overlay.lock().on_handle_move_start(handle, false);
    assert!(!f.proxy.last().unwrap().menu_visible);
    overlay.lock().on_handle_move(handle, false);
    assert_eq!(f.field.selection(), (0, 7));
    assert!(f.field.magnifier().is_some());

    overlay.lock().on_handle_move_done(handle, false);
    assert_eq!(f.field.selection(), (0, 7));
    assert!(f.field.magnifier().is_none());
    let info = f.proxy.last().unwrap();
    assert!(info.menu_visible);
    assert!(!info.is_single_handle);
    assert!(overlay.lock().take_dirty());
}

#[test]
fn test_handles_dragged_together_collapse_to_caret() {
    let f = field(TextFieldProperties::default());
    f.field.set_text("hello world");
    f.field.handle_long_press(OffsetF::new(20.0, 10.0));
    let overlay = f.field.overlay();

    let handle = RectF::new(-1.0, 0.0, 2.0, 20.0);
    overlay.lock().on_handle_move_start(handle, false);
    overlay.lock().on_handle_move(handle, false);
    overlay.lock().on_handle_move_done(handle, false);

    assert_eq!(f.field.selection(), (0, 0));
    assert!(!overlay.lock().is_shown());
    assert!(overlay.lock().is_single_handle());
    assert_eq!(f.proxy.closed(), vec![OverlayCloseReason::HandlesCollapsed]);
    assert!(f.field.is_caret_twinkling());
}

#[test]
fn test_caret_handle_drag_moves_caret() {
    let f = field(TextFieldProperties::default());
    f.field.set_text("hello");
    f.field.handle_click(OffsetF::new(10.0, 10.0));
    let overlay = f.field.overlay();
    assert!(overlay.lock().is_single_handle());

    let handle = RectF::new(39.0, 0.0, 2.0, 20.0);
    overlay.lock().on_handle_move_start(handle, false);
    assert!(!f.field.is_caret_twinkling());
    overlay.lock().on_handle_move(handle, false);
    assert_eq!(f.field.caret_index(), 4);
    overlay.lock().on_handle_move_done(handle, false);
    assert_eq!(f.field.caret_index(), 4);
    assert!(f.field.is_caret_twinkling());
}

#[test]
fn test_dragging_at_edge_auto_scrolls_until_text_end() {
    let f = field_with(TextFieldProperties::default(), RectF::new(0.0, 0.0, 100.0, 20.0));
    f.field.set_text("hello world");
    assert_eq!(f.field.text_rect().x, -10.0);
    f.field.set_selection(5, 8);
    f.field.overlay().lock().show_overlay(&OverlayRequest {
        menu_is_show: true,
        source: OverlaySource::Touch,
    });
    let overlay = f.field.overlay();

    let handle = RectF::new(5.0, 0.0, 2.0, 20.0);
    overlay.lock().on_handle_move_start(handle, true);
    overlay.lock().on_handle_move(handle, true);
    assert!(overlay.lock().is_auto_scrolling());
    assert_eq!(f.field.selection(), (2, 8));

    f.executor.advance(Duration::from_millis(15));
    assert_eq!(f.field.text_rect().x, -4.0);
    f.executor.advance(Duration::from_millis(45));
    assert_eq!(f.field.text_rect().x, 0.0);
    assert!(!overlay.lock().is_auto_scrolling());
    assert_eq!(f.field.selection(), (1, 8));

    overlay.lock().on_handle_move_done(handle, true);
    f.executor.advance(Duration::from_millis(60));
    assert_eq!(f.field.text_rect().x, 0.0);
}

#[test]
fn test_leaving_the_edge_stops_auto_scroll() {
    let f = field_with(TextFieldProperties::default(), RectF::new(0.0, 0.0, 100.0, 20.0));
    f.field.set_text("hello world");
    f.field.set_selection(5, 8);
    f.field.overlay().lock().show_overlay(&OverlayRequest {
        menu_is_show: true,
        source: OverlaySource::Touch,
    });
    let overlay = f.field.overlay();

    overlay.lock().on_handle_move_start(RectF::new(5.0, 0.0, 2.0, 20.0), true);
    overlay.lock().on_handle_move(RectF::new(5.0, 0.0, 2.0, 20.0), true);
    assert!(overlay.lock().is_auto_scrolling());
    overlay.lock().on_handle_move(RectF::new(40.0, 0.0, 2.0, 20.0), true);
    assert!(!overlay.lock().is_auto_scrolling());

    f.executor.advance(Duration::from_millis(60));
    assert_eq!(f.field.text_rect().x, -10.0);
}

#[test]
fn test_zero_font_size_refuses_overlay() {
    let mut properties = TextFieldProperties::default();
    properties.font_size = 0.0;
    let f = field(properties);
    f.field.set_text("hello");
    f.field.handle_long_press(OffsetF::new(10.0, 10.0));
    assert_eq!(f.proxy.shows(), 0);
}

#[test]
fn test_text_area_click_hits_second_line() {
    let f = field_with(
        TextFieldProperties::default().text_area(true),
        RectF::new(0.0, 0.0, 50.0, 40.0),
    );
    f.field.set_text("abcdefghij");
    assert_eq!(f.field.text_rect().height, 40.0);
    f.field.set_using_mouse(true);
    f.field.handle_click(OffsetF::new(12.0, 30.0));
    assert_eq!(f.field.caret_index(), 6);
}

#[test]
fn test_text_area_max_lines_caps_viewport() {
    let f = field_with(
        TextFieldProperties::default().text_area(true).max_lines(2),
        RectF::new(0.0, 0.0, 50.0, 100.0),
    );
    assert_eq!(f.field.content_rect().height, 40.0);
    f.field.set_text("abcdefghijklmno");
    assert_eq!(f.field.text_rect().height, 60.0);
    assert_eq!(f.field.text_rect().y, -20.0);

    f.field.update_properties(|properties| properties.max_lines = None);
    assert_eq!(f.field.content_rect().height, 100.0);
    assert_eq!(f.field.text_rect().y, 0.0);
}

#[test]
fn test_auto_fill_request_and_completion() {
    let f = field(TextFieldProperties::default().content_type(ContentType::UserName));
    assert!(f.field.request_auto_fill());
    let (fill_type, callback) = f.auto_fill.requests.lock().pop().unwrap();
    assert_eq!(fill_type, AutoFillType::UserName);
    callback(Some("alice".to_owned()));
    assert_eq!(f.field.text(), "alice");
    assert_eq!(f.field.caret_index(), 5);
}

#[test]
fn test_auto_fill_is_gated() {
    let unspecified = field(TextFieldProperties::default());
    assert!(!unspecified.field.request_auto_fill());

    let disabled = field(
        TextFieldProperties::default()
            .content_type(ContentType::UserName)
            .enable_auto_fill(false),
    );
    assert!(!disabled.field.request_auto_fill());

    let blurred = field(TextFieldProperties::default().input_type(TextInputType::NewPassword));
    blurred.field.on_blur();
    assert!(!blurred.field.request_auto_fill());
    blurred.field.on_focus();
    assert!(blurred.field.request_auto_fill());
    assert_eq!(blurred.auto_fill.requests.lock()[0].0, AutoFillType::NewPassword);
}

#[test]
fn test_counter_turns_red_on_truncation() {
    let f = field(
        TextFieldProperties::default()
            .max_length(5)
            .show_counter(CounterOptions::default()),
    );
    type_text(&f.field, "abcdefg");
    assert_eq!(f.field.text(), "abcde");
    let counter = f.field.counter_state().unwrap();
    assert_eq!(counter.text, "5/5");
    assert!(counter.visible);
    assert!(counter.error);

    let plain = field(TextFieldProperties::default());
    assert_eq!(plain.field.counter_state(), None);
}

#[test]
fn test_error_text_is_announced() {
    let f = field(TextFieldProperties::default());
    f.field.set_text("ab");
    f.field.set_error_text(Some("too short".to_owned()));
    assert_eq!(f.field.error_text().as_deref(), Some("too short"));
    assert_eq!(f.field.accessibility_text(), "ab, too short");
}

#[test]
fn test_property_update_refilters_text() {
    let f = field(TextFieldProperties::default());
    f.field.set_text("abcdef");
    f.field.update_properties(|properties| properties.max_length = Some(3));
    assert_eq!(f.field.text(), "abc");
    assert_eq!(f.field.caret_index(), 3);
}

#[test]
fn test_invalid_filter_pattern_is_ignored() {
    let properties = TextFieldProperties::default().input_filter_pattern("[a-");
    assert_eq!(properties.input_filter, None);
    let f = field(properties);
    type_text(&f.field, "a-1");
    assert_eq!(f.field.text(), "a-1");
}

#[test]
fn test_detached_field_rejects_edits() {
    let f = field(TextFieldProperties::default());
    f.field.detach();
    assert_eq!(f.field.insert_value("a"), Err(EditQueueError::Closed));
    assert!(!f.field.flush_edits());
}
