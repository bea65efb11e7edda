//! Global key capture ownership.
//!
//! One table maps each named key to the component currently allowed to
//! handle it. Components bind on mount and release on unmount; a bind on a
//! key held by someone else is refused rather than silently shadowing it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::KeyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Enter,
    /// Any printable character; routed to the focused field, never bound.
    Char(char),
}

impl Key {
    /// Parse a DOM-style key name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ArrowLeft" => Some(Key::ArrowLeft),
            "ArrowRight" => Some(Key::ArrowRight),
            "ArrowUp" => Some(Key::ArrowUp),
            "ArrowDown" => Some(Key::ArrowDown),
            "Enter" => Some(Key::Enter),
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(Key::Char(c)),
                    _ => None,
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyOwner {
    /// Sequence-level bindings: Enter and the vertical arrows.
    Sequence,
    /// The segmented editor of the timer at this position.
    Editor(usize),
}

#[derive(Debug, Clone, Default)]
pub struct KeyRegistry {
    bindings: HashMap<Key, KeyOwner>,
}

impl KeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture `key` for `owner`. Rebinding by the same owner is a no-op.
    pub fn bind(&mut self, key: Key, owner: KeyOwner) -> Result<(), KeyError> {
        match self.bindings.get(&key) {
            Some(&current) if current != owner => Err(KeyError::AlreadyBound {
                key,
                owner: current,
            }),
            _ => {
                self.bindings.insert(key, owner);
                Ok(())
            }
        }
    }

    pub fn bind_all(&mut self, keys: &[Key], owner: KeyOwner) -> Result<(), KeyError> {
        for &key in keys {
            self.bind(key, owner)?;
        }
        Ok(())
    }

    /// Release `key` if `owner` holds it. Returns whether anything changed.
    pub fn release(&mut self, key: Key, owner: KeyOwner) -> bool {
        if self.bindings.get(&key) == Some(&owner) {
            self.bindings.remove(&key);
            return true;
        }
        false
    }

    /// Release every key held by `owner` (unmount).
    pub fn release_all(&mut self, owner: KeyOwner) {
        self.bindings.retain(|_, held| *held != owner);
    }

    pub fn owner_of(&self, key: Key) -> Option<KeyOwner> {
        self.bindings.get(&key).copied()
    }

    pub fn is_bound(&self, key: Key) -> bool {
        self.bindings.contains_key(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_owner_is_refused() {
        let mut keys = KeyRegistry::new();
        keys.bind(Key::ArrowLeft, KeyOwner::Editor(0)).unwrap();
        let err = keys.bind(Key::ArrowLeft, KeyOwner::Editor(1)).unwrap_err();
        assert_eq!(
            err,
            KeyError::AlreadyBound {
                key: Key::ArrowLeft,
                owner: KeyOwner::Editor(0)
            }
        );
        assert_eq!(keys.owner_of(Key::ArrowLeft), Some(KeyOwner::Editor(0)));
    }

    #[test]
    fn release_requires_ownership() {
        let mut keys = KeyRegistry::new();
        keys.bind(Key::Enter, KeyOwner::Sequence).unwrap();
        assert!(!keys.release(Key::Enter, KeyOwner::Editor(0)));
        assert!(keys.release(Key::Enter, KeyOwner::Sequence));
        assert!(!keys.is_bound(Key::Enter));
    }

    #[test]
    fn release_all_unmounts_one_owner() {
        let mut keys = KeyRegistry::new();
        keys.bind_all(&[Key::ArrowLeft, Key::ArrowRight], KeyOwner::Editor(2))
            .unwrap();
        keys.bind(Key::Enter, KeyOwner::Sequence).unwrap();
        keys.release_all(KeyOwner::Editor(2));
        assert!(!keys.is_bound(Key::ArrowLeft));
        assert_eq!(keys.owner_of(Key::Enter), Some(KeyOwner::Sequence));
        keys.bind(Key::ArrowLeft, KeyOwner::Editor(0)).unwrap();
    }

    #[test]
    fn parses_key_names() {
        assert_eq!(Key::from_name("ArrowUp"), Some(Key::ArrowUp));
        assert_eq!(Key::from_name("7"), Some(Key::Char('7')));
        assert_eq!(Key::from_name("Escape"), None);
    }
}
