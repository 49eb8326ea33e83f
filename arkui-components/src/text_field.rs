//! Editing core of single-line text inputs and multi-line text areas.
//!
//! The pieces, from the bottom up:
//!
//! - [`ContentController`] owns the UTF-16 buffer and runs every edit through
//!   the input filters and the max-length cut.
//! - [`TextSelectController`] keeps the caret and the two selection handles
//!   consistent with the buffer and maps touch points to indices through a
//!   laid-out [`Paragraph`].
//! - [`TextFieldSelectOverlay`] turns handle drags into selection updates,
//!   auto-scrolling near the content edges.
//! - [`TextFieldPattern`] owns all of the above for one field and is the
//!   host they call back into.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use arkui_components::text_field::{
//!     MonospaceParagraphBuilder, TextFieldPattern, TextFieldProperties, TextFieldServices,
//!     TextInputType,
//! };
//! use arkui_core::{ManualTaskExecutor, RectF, SystemClock, TextFieldTheme};
//!
//! let services = TextFieldServices::new(
//!     Arc::new(MonospaceParagraphBuilder { char_width: 10.0, line_height: 20.0, wrap: false }),
//!     Arc::new(ManualTaskExecutor::new()),
//!     Arc::new(SystemClock),
//! );
//! let field = TextFieldPattern::new(
//!     TextFieldProperties::default().input_type(TextInputType::Number),
//!     TextFieldTheme::default(),
//!     services,
//! );
//! field.set_content_rect(RectF::new(0.0, 0.0, 200.0, 20.0));
//! field.on_focus();
//! field.insert_value("12ab3").unwrap();
//! field.flush_edits();
//! assert_eq!(field.text(), "123");
//! ```

use derive_setters::Setters;
use tracing::warn;

mod ai;
mod auto_fill;
mod content_controller;
mod decorator;
mod edit_queue;
mod editing_value;
pub mod emoji;
mod host;
mod input_filter;
mod paragraph;
mod pattern;
mod select_controller;
mod select_overlay;

#[cfg(test)]
mod test_support;
#[cfg(test)]
mod tests;

pub use ai::{
    AI_ANALYSIS_INTERVAL, AI_TEXT_RANGE, AnalysisWindow, CaretUpdateType, TextBoundaryAnalyzer,
    is_separator,
};
pub use auto_fill::{AutoFillCallback, AutoFillService, AutoFillType, ContentType};
pub use content_controller::ContentController;
pub use decorator::{CounterDecorator, CounterOptions, CounterState, ErrorDecorator};
pub use edit_queue::{EditOperation, EditQueue, EditQueueError};
pub use editing_value::{CaretInfo, HandleInfo, TextEditingValue};
pub use host::{OverlayCapabilities, SelectOverlayHost, TextEditHost, clamp_text_rect};
pub use input_filter::{
    COMPAT_REFILTER_API_VERSION, DEFAULT_API_VERSION, FilterOutcome, FilterSettings, InputFilter,
    InputFilterError, TextInputType,
};
pub use paragraph::{
    CaretMetrics, LineMetrics, MonospaceParagraph, MonospaceParagraphBuilder, Paragraph,
    ParagraphBuilder, RangeRects, TextAffinity,
};
pub use pattern::{
    ClickKind, MULTI_CLICK_DISTANCE, MULTI_CLICK_INTERVAL, TextFieldEvents, TextFieldPattern,
    TextFieldServices,
};
pub use select_controller::TextSelectController;
pub use select_overlay::{
    AUTO_SCROLL_INTERVAL, OverlayCloseReason, OverlayHandle, OverlayRequest, OverlaySource,
    SelectMenuInfo, SelectOverlayInfo, SelectOverlayProxy, TextFieldSelectOverlay,
};

/// Clipboard policy of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CopyOptions {
    /// Copying is disabled.
    None,
    /// Copy within the application.
    InApp,
    /// Copy within the device.
    #[default]
    Local,
    /// Copy across devices.
    Distributed,
}

/// Layout properties of a text field.
#[derive(Debug, Clone, PartialEq, Setters)]
pub struct TextFieldProperties {
    /// Input type, driving the built-in filter.
    pub input_type: TextInputType,
    /// Maximum length in UTF-16 code units.
    #[setters(strip_option)]
    pub max_length: Option<usize>,
    /// Custom allow-list.
    #[setters(strip_option)]
    pub input_filter: Option<InputFilter>,
    /// API level of the application.
    pub api_version: u32,
    /// Clipboard policy.
    pub copy_options: CopyOptions,
    /// Select everything when the field gains focus.
    pub select_all_enabled: bool,
    /// Multi-line text area.
    pub text_area: bool,
    /// Font size in pixels.
    pub font_size: f32,
    /// Character counter.
    #[setters(strip_option)]
    pub show_counter: Option<CounterOptions>,
    /// Declared content, used for auto-fill.
    pub content_type: ContentType,
    /// Allow auto-fill requests.
    pub enable_auto_fill: bool,
    /// Hide the selection menu.
    pub selection_menu_hidden: bool,
    /// Refine caret placement and word selection with the AI analyzer.
    pub ai_enabled: bool,
    /// Maximum number of visible lines of a text area. Taller text scrolls.
    #[setters(strip_option)]
    pub max_lines: Option<usize>,
}

impl Default for TextFieldProperties {
    fn default() -> Self {
        Self {
            input_type: TextInputType::Unspecified,
            max_length: None,
            input_filter: None,
            api_version: DEFAULT_API_VERSION,
            copy_options: CopyOptions::default(),
            select_all_enabled: false,
            text_area: false,
            font_size: 16.0,
            show_counter: None,
            content_type: ContentType::Unspecified,
            enable_auto_fill: true,
            selection_menu_hidden: false,
            ai_enabled: false,
            max_lines: None,
        }
    }
}

impl TextFieldProperties {
    /// Compiles `pattern` into the custom allow-list. An invalid pattern is
    /// logged and leaves the field without a custom filter.
    pub fn input_filter_pattern(mut self, pattern: &str) -> Self {
        self.input_filter = match InputFilter::new(pattern) {
            Ok(filter) => Some(filter),
            Err(error) => {
                warn!(%error, "ignoring input filter");
                None
            }
        };
        self
    }

    /// The filter configuration these properties describe.
    pub fn filter_settings(&self) -> FilterSettings {
        FilterSettings {
            input_type: self.input_type,
            input_filter: self.input_filter.clone(),
            max_length: self.max_length,
            api_version: self.api_version,
        }
    }
}
