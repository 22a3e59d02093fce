//! # Short Indexes and Aliases
//!
//! Messages are keyed by date IDs like `20240301100000`. They are exact, but
//! nobody wants to type them. Two shorter ways to address a message exist:
//!
//! 1. **Short index**: the category letter followed by the message's display
//!    rank, `T1` being the newest temporary message and `P3` the third newest
//!    permanent one. Ranks are dense (`1..=N`) and are recomputed whenever a
//!    namespace gains or loses a message, so `T1` always means "the newest".
//! 2. **Alias**: a name chosen by the user and stored in its own namespace,
//!    pointing at the message ID. Aliases survive re-keying: when a message
//!    changes category it gets a new ID and the alias is repointed.
//!
//! An alias that looks like a short index or a message ID would shadow it, so
//! the pattern `[TtPp][0-9]+` and anything that parses as an ID are reserved
//! and [`validate_alias`] rejects them.
//!
//! Resolution order lives in the store (`store::alias`): short index first,
//! then alias, then raw ID.

use crate::error::{Result, TxtError};
use crate::id::is_id;
use crate::model::Category;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShortIndex {
    pub cat: Category,
    pub rank: usize,
}

impl ShortIndex {
    pub fn new(cat: Category, rank: usize) -> Self {
        Self { cat, rank }
    }
}

impl fmt::Display for ShortIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.cat.letter(), self.rank)
    }
}

impl FromStr for ShortIndex {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut chars = s.chars();
        let cat = chars
            .next()
            .and_then(Category::from_letter)
            .ok_or_else(|| format!("Invalid short index: {}", s))?;
        let digits = chars.as_str();
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(format!("Invalid short index: {}", s));
        }
        // Overlong digit runs still match the reserved pattern; they just never resolve.
        let rank = digits.parse().unwrap_or(usize::MAX);
        Ok(ShortIndex { cat, rank })
    }
}

/// True when `s` has the reserved short-index shape.
pub fn is_short_index(s: &str) -> bool {
    ShortIndex::from_str(s).is_ok()
}

/// Normalizes a user-supplied alias: surrounding whitespace is dropped and an
/// empty result means "no alias".
pub fn normalize_alias(alias: &str) -> Option<String> {
    let trimmed = alias.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn validate_alias(alias: &str) -> Result<()> {
    if is_short_index(alias) || is_id(alias) {
        return Err(TxtError::InvalidAlias(alias.to_string()));
    }
    Ok(())
}
