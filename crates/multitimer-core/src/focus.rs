//! Keyboard-driven index cursor over a fixed number of addressable slots.
//!
//! `None` means no slot claims keyboard input. Movement never wraps: hitting
//! either end holds position.

use serde::{Deserialize, Serialize};

/// Result of a cursor mutation, so callers can react to focus gain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTransition {
    /// `None -> Some(index)`.
    Gained(usize),
    /// `Some(a) -> Some(b)` with `a != b`.
    Moved(usize),
    /// `Some(_) -> None`.
    Cleared,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusSequencer {
    index: Option<usize>,
    max_index: usize,
}

impl FocusSequencer {
    pub fn new(max_index: usize) -> Self {
        Self {
            index: None,
            max_index,
        }
    }

    /// Current index, clamped to the current bound.
    pub fn index(&self) -> Option<usize> {
        self.index.map(|i| i.min(self.max_index))
    }

    pub fn max_index(&self) -> usize {
        self.max_index
    }

    pub fn is_focused(&self) -> bool {
        self.index.is_some()
    }

    pub fn move_next(&mut self) -> FocusTransition {
        match self.index() {
            Some(i) => self.apply(Some((i + 1).min(self.max_index))),
            None => FocusTransition::Unchanged,
        }
    }

    pub fn move_previous(&mut self) -> FocusTransition {
        match self.index() {
            Some(i) => self.apply(Some(i.saturating_sub(1))),
            None => FocusTransition::Unchanged,
        }
    }

    /// Set the index directly. An index past `max_index` clears focus,
    /// signalling the sequence is complete.
    pub fn set_index(&mut self, index: Option<usize>) -> FocusTransition {
        let next = index.filter(|&i| i <= self.max_index);
        self.apply(next)
    }

    pub fn clear(&mut self) -> FocusTransition {
        self.apply(None)
    }

    /// Change the bound. A now out-of-range index is clamped immediately.
    pub fn set_max_index(&mut self, max_index: usize) {
        self.max_index = max_index;
        if let Some(i) = self.index {
            if i > max_index {
                tracing::debug!(from = i, to = max_index, "focus re-clamped");
                self.index = Some(max_index);
            }
        }
    }

    fn apply(&mut self, next: Option<usize>) -> FocusTransition {
        let prev = self.index();
        self.index = next;
        match (prev, next) {
            (None, Some(i)) => FocusTransition::Gained(i),
            (Some(a), Some(b)) if a != b => FocusTransition::Moved(b),
            (Some(_), None) => FocusTransition::Cleared,
            _ => FocusTransition::Unchanged,
        }
    }
}
