//! Hosts and doubles shared by the unit tests.

use std::{
    sync::{
        Arc, Weak,
        atomic::{AtomicBool, AtomicU32, Ordering},
    },
    time::Instant,
};

use arkui_core::RectF;
use parking_lot::{Mutex, RwLock};

use super::{
    ai::TextBoundaryAnalyzer,
    content_controller::ContentController,
    host::TextEditHost,
    input_filter::{FilterSettings, TextInputType},
};

/// A configurable [`TextEditHost`] that records what it is told.
pub struct TestHost {
    settings: RwLock<FilterSettings>,
    rejected: Mutex<Vec<String>>,
    selections: Mutex<Vec<(i32, i32)>>,
    pub content_rect: Mutex<RectF>,
    pub text_rect: Mutex<RectF>,
    pub text_area: AtomicBool,
    pub focused: AtomicBool,
    pub mouse: AtomicBool,
    pub api_version: AtomicU32,
    pub analyzer: Mutex<Option<Arc<dyn TextBoundaryAnalyzer>>>,
}

impl TestHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            settings: RwLock::new(FilterSettings::default()),
            rejected: Mutex::new(Vec::new()),
            selections: Mutex::new(Vec::new()),
            content_rect: Mutex::new(RectF::new(0.0, 0.0, 100.0, 20.0)),
            text_rect: Mutex::new(RectF::new(0.0, 0.0, 0.0, 20.0)),
            text_area: AtomicBool::new(false),
            focused: AtomicBool::new(true),
            mouse: AtomicBool::new(false),
            api_version: AtomicU32::new(12),
            analyzer: Mutex::new(None),
        })
    }

    pub fn with_type(input_type: TextInputType) -> Arc<Self> {
        let host = Self::new();
        host.update_settings(|settings| settings.input_type = input_type);
        host
    }

    pub fn update_settings(&self, f: impl FnOnce(&mut FilterSettings)) {
        f(&mut self.settings.write());
    }

    pub fn rejected(&self) -> Vec<String> {
        self.rejected.lock().clone()
    }

    pub fn selections(&self) -> Vec<(i32, i32)> {
        self.selections.lock().clone()
    }
}

impl TextEditHost for TestHost {
    fn filter_settings(&self) -> FilterSettings {
        self.settings.read().clone()
    }

    fn on_input_filter_error(&self, rejected: &str) {
        self.rejected.lock().push(rejected.to_owned());
    }

    fn content_rect(&self) -> RectF {
        *self.content_rect.lock()
    }

    fn text_rect(&self) -> RectF {
        *self.text_rect.lock()
    }

    fn set_text_rect(&self, rect: RectF) {
        *self.text_rect.lock() = rect;
    }

    fn preferred_line_height(&self) -> f32 {
        20.0
    }

    fn is_text_area(&self) -> bool {
        self.text_area.load(Ordering::SeqCst)
    }

    fn is_focused(&self) -> bool {
        self.focused.load(Ordering::SeqCst)
    }

    fn api_version(&self) -> u32 {
        self.api_version.load(Ordering::SeqCst)
    }

    fn is_using_mouse(&self) -> bool {
        self.mouse.load(Ordering::SeqCst)
    }

    fn on_selection_change(&self, start: i32, end: i32) {
        self.selections.lock().push((start, end));
    }

    fn boundary_analyzer(&self) -> Option<Arc<dyn TextBoundaryAnalyzer>> {
        self.analyzer.lock().clone()
    }
}

pub fn weak_host(host: &Arc<TestHost>) -> Weak<dyn TextEditHost> {
    let host: Arc<dyn TextEditHost> = Arc::clone(host) as Arc<dyn TextEditHost>;
    Arc::downgrade(&host)
}

pub fn controller_for(host: &Arc<TestHost>) -> ContentController {
    ContentController::new(weak_host(host))
}

/// Analyzer that snaps presses to a fixed index and selects a fixed range.
pub struct FixedAnalyzer {
    pub cursor: i32,
    pub word: Option<(i32, i32)>,
    pub calls: Mutex<Vec<Instant>>,
}

impl TextBoundaryAnalyzer for FixedAnalyzer {
    fn adjust_cursor_position(
        &self,
        _index: i32,
        _content: &[u16],
        _last_time: Option<Instant>,
        now: Instant,
    ) -> i32 {
        self.calls.lock().push(now);
        self.cursor
    }

    fn adjust_word_selection(&self, _index: i32, _content: &[u16]) -> Option<(i32, i32)> {
        self.word
    }
}
