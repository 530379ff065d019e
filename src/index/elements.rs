//! Tokenization of version text into comparable elements
//!
//! A string is split into maximal runs of one character class. Runs of ASCII
//! digits become [`VersionElement::Digits`], runs of letters become
//! [`VersionElement::Letters`], and everything else (`.`, `-`, ...) becomes
//! [`VersionElement::Symbols`].
//!
//! Only ASCII digits form digit runs. Other Unicode decimal digits have no
//! integer value here, so they tokenize as symbols; release tags never contain
//! them since tag parsing accepts ASCII only.
//!
//! Element order is `Symbols < Digits < Letters`, then by value. Sequences
//! compare element-wise and a shorter sequence with an equal prefix sorts
//! first.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// Arbitrary-precision non-negative integer parsed from a run of digits.
///
/// Stored as its canonical decimal text (no leading zeros), which orders
/// correctly by length first and then lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Number(String);

impl Number {
    /// Parse a run of ASCII digits. Returns `None` for empty or non-digit input.
    pub fn parse(digits: &str) -> Option<Self> {
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let trimmed = digits.trim_start_matches('0');
        if trimmed.is_empty() {
            Some(Self("0".to_string()))
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One token of a tokenized version string.
///
/// Variant declaration order is the category rank used by the derived `Ord`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VersionElement {
    Symbols(String),
    Digits(Number),
    Letters(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    Digit,
    Letter,
    Symbol,
}

impl Class {
    fn of(ch: char) -> Self {
        if ch.is_ascii_digit() {
            Class::Digit
        } else if ch.is_alphabetic() {
            Class::Letter
        } else {
            Class::Symbol
        }
    }
}

/// Split `text` into maximal runs of one character class.
///
/// Empty input yields an empty sequence.
pub fn tokenize(text: &str) -> Vec<VersionElement> {
    let mut out = Vec::new();
    let mut current: Option<(Class, usize)> = None;

    for (index, ch) in text.char_indices() {
        let class = Class::of(ch);
        match current {
            Some((run_class, _)) if run_class == class => {}
            Some((run_class, start)) => {
                out.push(make_element(run_class, &text[start..index]));
                current = Some((class, index));
            }
            None => current = Some((class, index)),
        }
    }
    if let Some((run_class, start)) = current {
        out.push(make_element(run_class, &text[start..]));
    }

    out
}

fn make_element(class: Class, run: &str) -> VersionElement {
    match class {
        Class::Digit => VersionElement::Digits(
            Number::parse(run)
                .unwrap_or_else(|| panic!("digit run {run:?} failed to parse as an integer")),
        ),
        Class::Letter => VersionElement::Letters(run.to_string()),
        Class::Symbol => VersionElement::Symbols(run.to_string()),
    }
}

/// Memoized [`tokenize`], keyed by the exact input string.
///
/// Entries are never evicted. A single lock guards lookup-or-insert.
#[derive(Debug, Default)]
pub struct TokenCache {
    entries: Mutex<HashMap<String, Arc<[VersionElement]>>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tokenize(&self, text: &str) -> Arc<[VersionElement]> {
        // The map is append-only, so a poisoned guard still holds valid entries.
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(elements) = entries.get(text) {
            return Arc::clone(elements);
        }
        let elements: Arc<[VersionElement]> = tokenize(text).into();
        entries.insert(text.to_string(), Arc::clone(&elements));
        elements
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
