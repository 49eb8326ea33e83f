//! Presentation defaults for text fields.
//!
//! A [`TextFieldTheme`] is resolved once by the host shell and handed to each
//! text component at construction. Controllers only read it.

use crate::dp::Dp;

/// An RGBA color with components in `0.0..=1.0`.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// Alpha.
    pub a: f32,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    /// Opaque white.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    /// Creates a color from its components.
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Returns the same color with a different alpha.
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

/// Metrics and colors used by the caret, selection handles and auto-scroll.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFieldTheme {
    /// Width of the blinking caret.
    pub cursor_width: Dp,
    /// Width of the line under a selection handle.
    pub handle_line_width: Dp,
    /// Line height used before the first paragraph is laid out.
    pub default_line_height: f32,
    /// Caret color.
    pub cursor_color: Color,
    /// Selection handle color.
    pub handle_color: Color,
    /// Selection highlight color.
    pub selection_color: Color,
    /// Distance from a content edge, in pixels, at which dragging a handle
    /// starts auto-scrolling.
    pub scroll_edge_threshold: f32,
    /// Distance the text scrolls per auto-scroll tick, in pixels.
    pub auto_scroll_step: f32,
    /// Physical pixels per dp.
    pub scale_factor: f32,
}

impl Default for TextFieldTheme {
    fn default() -> Self {
        let primary = Color::new(0.04, 0.35, 0.97, 1.0);
        Self {
            cursor_width: Dp(1.5),
            handle_line_width: Dp(2.0),
            default_line_height: 20.0,
            cursor_color: primary,
            handle_color: primary,
            selection_color: primary.with_alpha(0.2),
            scroll_edge_threshold: 12.0,
            auto_scroll_step: 6.0,
            scale_factor: 1.0,
        }
    }
}

impl TextFieldTheme {
    /// Caret width in pixels.
    pub fn cursor_width_px(&self) -> f32 {
        self.cursor_width.to_px(self.scale_factor)
    }

    /// Handle line width in pixels.
    pub fn handle_line_width_px(&self) -> f32 {
        self.handle_line_width.to_px(self.scale_factor)
    }
}
