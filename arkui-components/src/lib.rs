//! Text-editing core of ArkUI text inputs and text areas.
//!
//! The crate keeps a UTF-16 buffer, a caret and two selection handles
//! consistent with each other, maps touch points to buffer indices through a
//! laid-out paragraph, and drives handle drags with edge auto-scroll.
//! Rendering, the input method and the overlay drawing are supplied by the
//! host through traits.
//!
//! Start from [`text_field::TextFieldPattern`].
#![deny(missing_docs, clippy::unwrap_used)]

pub mod text_field;
