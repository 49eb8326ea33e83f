//! Pending edits, applied once per layout frame.
//!
//! Input methods may deliver several edits between two frames. They are
//! queued here and drained by the field in arrival order.

use std::collections::VecDeque;

use thiserror::Error;

/// One edit delivered by an input method or a key handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOperation {
    /// Replace the selection (or insert at the caret) with text.
    Insert(String),
    /// Delete `n` grapheme clusters before the caret.
    DeleteBackward(usize),
    /// Delete `n` grapheme clusters after the caret.
    DeleteForward(usize),
    /// Show composition text at the caret, replacing the previous one.
    SetPreviewText(String),
    /// Commit the composition text.
    FinishPreview,
}

/// Errors from [`EditQueue`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EditQueueError {
    /// The field that owns the queue was torn down.
    #[error("edit queue is closed")]
    Closed,
}

/// FIFO of [`EditOperation`]s with a single consumer.
#[derive(Debug, Default)]
pub struct EditQueue {
    operations: VecDeque<EditOperation>,
    closed: bool,
}

impl EditQueue {
    /// Creates an open, empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an operation.
    pub fn push(&mut self, operation: EditOperation) -> Result<(), EditQueueError> {
        if self.closed {
            return Err(EditQueueError::Closed);
        }
        self.operations.push_back(operation);
        Ok(())
    }

    /// Removes and returns everything queued so far.
    pub fn drain(&mut self) -> Vec<EditOperation> {
        self.operations.drain(..).collect()
    }

    /// Number of queued operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Rejects further pushes and drops what is queued.
    pub fn close(&mut self) {
        self.closed = true;
        self.operations.clear();
    }

    /// Whether [`close`](Self::close) was called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_keeps_arrival_order() {
        let mut queue = EditQueue::new();
        queue.push(EditOperation::Insert("a".into())).unwrap();
        queue.push(EditOperation::DeleteBackward(1)).unwrap();
        queue.push(EditOperation::Insert("b".into())).unwrap();
        assert_eq!(queue.len(), 3);
        assert_eq!(
            queue.drain(),
            vec![
                EditOperation::Insert("a".into()),
                EditOperation::DeleteBackward(1),
                EditOperation::Insert("b".into()),
            ]
        );
        assert!(queue.is_empty());
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_closed_queue_rejects_pushes() {
        let mut queue = EditQueue::new();
        queue.push(EditOperation::FinishPreview).unwrap();
        queue.close();
        assert!(queue.is_closed());
        assert!(queue.is_empty());
        assert_eq!(
            queue.push(EditOperation::Insert("x".into())),
            Err(EditQueueError::Closed)
        );
    }
}
