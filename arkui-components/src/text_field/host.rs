//! Capabilities the controllers need from the widget that owns them.
//!
//! Controllers hold a `Weak<dyn TextEditHost>` and resolve it on every use.
//! When the host is gone the operation is a no-op.

use std::sync::Arc;

use arkui_core::{OffsetF, RectF, TaskExecutor};
use parking_lot::RwLock;

use super::{
    CopyOptions,
    ai::TextBoundaryAnalyzer,
    content_controller::ContentController,
    input_filter::{DEFAULT_API_VERSION, FilterSettings},
    select_controller::TextSelectController,
};

/// What a text buffer and its selection controller read from their widget.
pub trait TextEditHost: Send + Sync {
    /// Current filter configuration.
    fn filter_settings(&self) -> FilterSettings;

    /// Called with the characters a filter dropped.
    fn on_input_filter_error(&self, _rejected: &str) {}

    /// Visible viewport, field-local.
    fn content_rect(&self) -> RectF;

    /// Laid-out text rectangle, field-local. Larger than the content rect
    /// when the text overflows, offset by the current scroll.
    fn text_rect(&self) -> RectF;

    /// Moves or resizes the text rectangle.
    fn set_text_rect(&self, rect: RectF);

    /// Line height used for an empty field.
    fn preferred_line_height(&self) -> f32;

    /// Multi-line field.
    fn is_text_area(&self) -> bool;

    /// Whether the field holds focus.
    fn is_focused(&self) -> bool;

    /// API level of the hosting application.
    fn api_version(&self) -> u32 {
        DEFAULT_API_VERSION
    }

    /// Password input type.
    fn is_password(&self) -> bool {
        self.filter_settings().input_type.is_password()
    }

    /// The current gesture comes from a mouse.
    fn is_using_mouse(&self) -> bool {
        false
    }

    /// Called when the reported selection changes.
    fn on_selection_change(&self, _start: i32, _end: i32) {}

    /// The AI analyzer, when the field has one enabled.
    fn boundary_analyzer(&self) -> Option<Arc<dyn TextBoundaryAnalyzer>> {
        None
    }
}

/// Extra menu entries that depend on device capabilities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverlayCapabilities {
    /// A camera text-input service is available.
    pub camera_input: bool,
    /// An AI writing service is available.
    pub ai_write: bool,
}

/// What the selection overlay needs on top of [`TextEditHost`].
pub trait SelectOverlayHost: TextEditHost {
    /// The widget's selection controller.
    fn select_controller(&self) -> Option<Arc<RwLock<TextSelectController>>>;

    /// The widget's text buffer.
    fn content_controller(&self) -> Option<Arc<RwLock<ContentController>>>;

    /// Font size in pixels. Zero hides the overlay.
    fn font_size(&self) -> f32;

    /// The application hid the selection menu.
    fn is_selection_menu_hidden(&self) -> bool {
        false
    }

    /// Clipboard policy.
    fn copy_options(&self) -> CopyOptions {
        CopyOptions::Local
    }

    /// Whether the clipboard has something to paste.
    fn is_paste_available(&self) -> bool {
        false
    }

    /// Device capabilities for optional menu entries.
    fn capabilities(&self) -> OverlayCapabilities {
        OverlayCapabilities::default()
    }

    /// Plays a short haptic tick.
    fn start_vibrator(&self) {}

    /// Shows the magnifier at a field-local point, or hides it.
    fn update_magnifier(&self, _local: Option<OffsetF>) {}

    /// Starts or stops caret blinking.
    fn set_caret_twinkling(&self, _twinkling: bool) {}

    /// Executor for delayed work such as auto-scroll ticks.
    fn task_executor(&self) -> Option<Arc<dyn TaskExecutor>>;

    /// Scrolls the text by `delta`, keeping it inside its scrollable range.
    /// Returns `false` when the text did not move.
    fn scroll_text_by(&self, delta: OffsetF) -> bool {
        let text = self.text_rect();
        let scrolled = clamp_text_rect(text.translate(delta), self.content_rect());
        if scrolled == text {
            return false;
        }
        self.set_text_rect(scrolled);
        true
    }
}

/// Keeps `text` from scrolling past its ends inside `content`.
///
/// On an axis where the text fits, it is pinned to the content's start
/// edge. Otherwise no gap may open between the text and the content edges.
pub fn clamp_text_rect(text: RectF, content: RectF) -> RectF {
    let x = if text.width <= content.width {
        content.left()
    } else {
        text.x.clamp(content.right() - text.width, content.left())
    };
    let y = if text.height <= content.height {
        content.top()
    } else {
        text.y.clamp(content.bottom() - text.height, content.top())
    };
    RectF::new(x, y, text.width, text.height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_text_rect_pins_short_text() {
        let content = RectF::new(10.0, 5.0, 100.0, 20.0);
        let text = RectF::new(-40.0, 5.0, 50.0, 20.0);
        assert_eq!(
            clamp_text_rect(text, content),
            RectF::new(10.0, 5.0, 50.0, 20.0)
        );
    }

    #[test]
    fn test_clamp_text_rect_limits_overflow() {
        let content = RectF::new(0.0, 0.0, 100.0, 20.0);
        let too_far_left = RectF::new(-500.0, 0.0, 300.0, 20.0);
        assert_eq!(clamp_text_rect(too_far_left, content).x, -200.0);
        let too_far_right = RectF::new(30.0, 0.0, 300.0, 20.0);
        assert_eq!(clamp_text_rect(too_far_right, content).x, 0.0);
        let scrolled = RectF::new(-120.0, 0.0, 300.0, 20.0);
        assert_eq!(clamp_text_rect(scrolled, content), scrolled);
    }
}
