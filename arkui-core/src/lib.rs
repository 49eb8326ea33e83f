//! Shared primitives for ArkUI text components.
//!
//! This crate holds the pieces a text component needs from its framework but
//! does not own itself:
//!
//! - [`geometry`] - float offsets, sizes and rectangles in field-local space.
//! - [`dp`] - density-independent lengths resolved against a scale factor.
//! - [`theme`] - read-only presentation defaults injected into controllers.
//! - [`task`] - delayed task scheduling with cancelable handles.
//! - [`clock`] - an injectable time source.
//! - [`logging`] - `tracing` subscriber setup for binaries and tests.
//!
//! # Example
//!
//! ```
//! use arkui_core::geometry::{OffsetF, RectF};
//!
//! let content = RectF::new(0.0, 0.0, 100.0, 20.0);
//! assert!(content.contains(OffsetF::new(10.0, 10.0)));
//! ```
#![deny(missing_docs, clippy::unwrap_used)]

pub mod clock;
pub mod dp;
pub mod geometry;
pub mod logging;
pub mod task;
pub mod theme;

pub use clock::{Clock, ManualClock, SystemClock};
pub use dp::Dp;
pub use geometry::{OffsetF, RectF, SizeF};
pub use task::{CancelableTask, ManualTaskExecutor, Task, TaskExecutor};
pub use theme::{Color, TextFieldTheme};
