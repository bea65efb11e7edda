//! Segmented duration editor.
//!
//! A duration is edited as six single-digit slots, `hh mm ss`. The slots of
//! the timer at position `n` in the sequence occupy global focus indices
//! `n * 6 .. n * 6 + 6` of the controller's [`FocusSequencer`].
//!
//! Validation is soft: a minutes group of `90` is displayed and flagged
//! invalid, but it never propagates to the timer's duration and never moves
//! focus on by itself.

use serde::{Deserialize, Serialize};

use crate::focus::{FocusSequencer, FocusTransition};

/// Slots per editor: two digits each for hours, minutes and seconds.
pub const SLOTS_PER_EDITOR: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeGroup {
    Hours,
    Minutes,
    Seconds,
}

impl TimeGroup {
    pub const ALL: [TimeGroup; 3] = [TimeGroup::Hours, TimeGroup::Minutes, TimeGroup::Seconds];

    pub const WIDTH: usize = 2;

    pub fn of_slot(slot: usize) -> Self {
        match slot / Self::WIDTH {
            0 => TimeGroup::Hours,
            1 => TimeGroup::Minutes,
            _ => TimeGroup::Seconds,
        }
    }

    pub fn first_slot(self) -> usize {
        match self {
            TimeGroup::Hours => 0,
            TimeGroup::Minutes => 2,
            TimeGroup::Seconds => 4,
        }
    }

    pub fn last_slot(self) -> usize {
        self.first_slot() + Self::WIDTH - 1
    }

    /// Largest value that counts as valid for this group.
    pub fn max_value(self) -> u64 {
        match self {
            TimeGroup::Hours => 99,
            TimeGroup::Minutes | TimeGroup::Seconds => 59,
        }
    }
}

/// Decompose `value` into exactly `width` decimal digits.
///
/// Short values are left-padded with zeros. Long values keep only their
/// least-significant `width` digits, which is what lets typing roll over.
pub fn digits_of(value: u64, width: usize) -> Vec<u8> {
    let mut digits = vec![0u8; width];
    let mut rest = value;
    for slot in digits.iter_mut().rev() {
        *slot = (rest % 10) as u8;
        rest /= 10;
    }
    digits
}

pub fn value_from_digits(digits: &[u8]) -> u64 {
    digits
        .iter()
        .fold(0u64, |acc, &d| acc.saturating_mul(10).saturating_add(d as u64))
}

/// `secs` as `[h, h, m, m, s, s]`. Hours past 99 roll over.
pub fn duration_digits(secs: u64) -> [u8; SLOTS_PER_EDITOR] {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    let mut out = [0u8; SLOTS_PER_EDITOR];
    for (group, value) in TimeGroup::ALL.into_iter().zip([hours, minutes, seconds]) {
        let start = group.first_slot();
        out[start..start + TimeGroup::WIDTH].copy_from_slice(&digits_of(value, TimeGroup::WIDTH));
    }
    out
}

pub fn seconds_from_digits(digits: &[u8; SLOTS_PER_EDITOR]) -> u64 {
    let hours = value_from_digits(&digits[0..2]);
    let minutes = value_from_digits(&digits[2..4]);
    let seconds = value_from_digits(&digits[4..6]);
    hours * 3600 + minutes * 60 + seconds
}

/// How far an accepted keystroke got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Group still being typed, or some group invalid: nothing propagates.
    Pending,
    /// A group was completed and the whole draft is valid.
    GroupDone { duration_secs: u64 },
    /// The editor's last slot was completed; focus has been released.
    Committed { duration_secs: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// Not a digit, or no slot of this editor is focused.
    Ignored,
    Changed {
        group: TimeGroup,
        value: u64,
        valid: bool,
        completion: Completion,
    },
}

/// Draft digits for one timer's duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentedTimeEditor {
    timer_index: usize,
    digits: [u8; SLOTS_PER_EDITOR],
}

impl SegmentedTimeEditor {
    pub fn new(timer_index: usize, duration_secs: u64) -> Self {
        Self {
            timer_index,
            digits: duration_digits(duration_secs),
        }
    }

    pub fn timer_index(&self) -> usize {
        self.timer_index
    }

    /// Global focus index of this editor's first slot.
    pub fn base_index(&self) -> usize {
        self.timer_index * SLOTS_PER_EDITOR
    }

    pub fn global_index(&self, slot: usize) -> usize {
        self.base_index() + slot.min(SLOTS_PER_EDITOR - 1)
    }

    /// The focused slot, if the focus cursor is inside this editor.
    pub fn local_slot(&self, focus: &FocusSequencer) -> Option<usize> {
        let index = focus.index()?;
        let base = self.base_index();
        (base..base + SLOTS_PER_EDITOR)
            .contains(&index)
            .then(|| index - base)
    }

    pub fn digits(&self) -> &[u8; SLOTS_PER_EDITOR] {
        &self.digits
    }

    pub fn group_value(&self, group: TimeGroup) -> u64 {
        let start = group.first_slot();
        value_from_digits(&self.digits[start..start + TimeGroup::WIDTH])
    }

    pub fn is_group_valid(&self, group: TimeGroup) -> bool {
        self.group_value(group) <= group.max_value()
    }

    pub fn is_valid(&self) -> bool {
        TimeGroup::ALL.iter().all(|&g| self.is_group_valid(g))
    }

    /// Groups to render with an invalid style.
    pub fn invalid_groups(&self) -> Vec<TimeGroup> {
        TimeGroup::ALL
            .into_iter()
            .filter(|&g| !self.is_group_valid(g))
            .collect()
    }

    pub fn duration_secs(&self) -> u64 {
        seconds_from_digits(&self.digits)
    }

    /// Type a character into the focused slot.
    pub fn input(&mut self, ch: char, focus: &mut FocusSequencer) -> EditOutcome {
        let Some(digit) = ch.to_digit(10) else {
            return EditOutcome::Ignored;
        };
        let Some(slot) = self.local_slot(focus) else {
            return EditOutcome::Ignored;
        };

        let group = TimeGroup::of_slot(slot);
        self.digits[slot] = digit as u8;
        let value = self.group_value(group);
        let valid = self.is_group_valid(group);

        let completion = if slot != group.last_slot() {
            focus.set_index(Some(self.global_index(slot + 1)));
            Completion::Pending
        } else if !valid {
            Completion::Pending
        } else if !self.is_valid() {
            // Another group is still out of range: move on, propagate nothing.
            if slot < SLOTS_PER_EDITOR - 1 {
                focus.set_index(Some(self.global_index(slot + 1)));
            }
            Completion::Pending
        } else if slot == SLOTS_PER_EDITOR - 1 {
            focus.clear();
            Completion::Committed {
                duration_secs: self.duration_secs(),
            }
        } else {
            focus.set_index(Some(self.global_index(slot + 1)));
            Completion::GroupDone {
                duration_secs: self.duration_secs(),
            }
        };

        tracing::debug!(timer = self.timer_index, slot, ?group, value, valid, "digit edited");
        EditOutcome::Changed {
            group,
            value,
            valid,
            completion,
        }
    }

    /// Direct click on a slot: random access regardless of current focus.
    pub fn click(&self, slot: usize, focus: &mut FocusSequencer) -> FocusTransition {
        focus.set_index(Some(self.global_index(slot)))
    }

    /// One slot left, held at this editor's first slot.
    pub fn move_left(&self, focus: &mut FocusSequencer) -> FocusTransition {
        match self.local_slot(focus) {
            Some(slot) if slot > 0 => focus.move_previous(),
            _ => FocusTransition::Unchanged,
        }
    }

    /// One slot right, held at this editor's last slot.
    pub fn move_right(&self, focus: &mut FocusSequencer) -> FocusTransition {
        match self.local_slot(focus) {
            Some(slot) if slot < SLOTS_PER_EDITOR - 1 => focus.move_next(),
            _ => FocusTransition::Unchanged,
        }
    }
}
