//! # Density-Independent Pixels (Dp)
//!
//! Theme metrics such as cursor width and handle line width are specified in
//! dp so they look the same physical size on every screen. They are resolved
//! to pixels with an explicit scale factor owned by the host shell; there is no
//! process-wide scale factor lookup.
//!
//! ## Usage
//!
//! ```
//! use arkui_core::Dp;
//!
//! let cursor_width = Dp(1.5);
//! assert_eq!(cursor_width.to_px(2.0), 3.0);
//! assert_eq!(Dp::from_px(3.0, 2.0), cursor_width);
//! ```

/// Density-independent pixels.
///
/// One dp equals `scale_factor` physical pixels. A scale factor of 1.0 maps dp
/// to pixels one to one.
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd)]
pub struct Dp(pub f32);

impl Dp {
    /// Zero dp.
    pub const ZERO: Self = Self(0.0);

    /// Creates a new `Dp`, usable in `const` contexts.
    ///
    /// ```
    /// use arkui_core::Dp;
    ///
    /// const HANDLE_WIDTH: Dp = Dp::new(2.0);
    /// ```
    pub const fn new(value: f32) -> Self {
        Dp(value)
    }

    /// Converts to physical pixels.
    ///
    /// Non-positive or non-finite scale factors are treated as 1.0.
    pub fn to_px(self, scale_factor: f32) -> f32 {
        self.0 * sanitize_scale(scale_factor)
    }

    /// Converts physical pixels back to dp.
    pub fn from_px(px: f32, scale_factor: f32) -> Self {
        Dp(px / sanitize_scale(scale_factor))
    }
}

fn sanitize_scale(scale_factor: f32) -> f32 {
    if scale_factor.is_finite() && scale_factor > 0.0 {
        scale_factor
    } else {
        1.0
    }
}

impl From<f32> for Dp {
    fn from(value: f32) -> Self {
        Dp(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dp_to_px() {
        assert_eq!(Dp(10.0).to_px(1.0), 10.0);
        assert_eq!(Dp(10.0).to_px(2.5), 25.0);
    }

    #[test]
    fn test_invalid_scale_factor_falls_back_to_one() {
        assert_eq!(Dp(4.0).to_px(0.0), 4.0);
        assert_eq!(Dp(4.0).to_px(-3.0), 4.0);
        assert_eq!(Dp(4.0).to_px(f32::NAN), 4.0);
        assert_eq!(Dp::from_px(8.0, 0.0), Dp(8.0));
    }
}
