//! Token resolution and alias mutation.

use super::{find_by_id, msg_from_entry, AliasTable, TxtStore, ALIASES, PERMANENT, TEMPORARY};
use crate::error::{Result, TxtError};
use crate::index::{validate_alias, ShortIndex};
use crate::model::{Category, TxtMsg};
use redb::ReadableTable;
use std::str::FromStr;

/// Moves the alias of record `id` from `old` to `new`.
///
/// The new alias is validated before anything is written. Binding an alias
/// already held by another record fails with [`TxtError::AliasConflict`] and
/// leaves the old binding in place.
pub(crate) fn apply_alias_change(
    aliases: &mut AliasTable<'_>,
    id: &str,
    old: Option<&str>,
    new: Option<&str>,
) -> Result<()> {
    if let Some(alias) = new {
        validate_alias(alias)?;
    }
    match (old, new) {
        (None, None) => Ok(()),
        (Some(a), Some(b)) if a == b => Ok(()),
        (None, Some(b)) => bind(aliases, b, id),
        (Some(a), None) => {
            aliases.remove(a)?;
            Ok(())
        }
        (Some(a), Some(b)) => {
            bind(aliases, b, id)?;
            aliases.remove(a)?;
            Ok(())
        }
    }
}

fn bind(aliases: &mut AliasTable<'_>, alias: &str, id: &str) -> Result<()> {
    let taken = aliases
        .get(alias)?
        .map(|guard| guard.value() != id)
        .unwrap_or(false);
    if taken {
        return Err(TxtError::AliasConflict(alias.to_string()));
    }
    aliases.insert(alias, id)?;
    Ok(())
}

/// Finds the record at display rank `rank` by scanning its namespace.
fn find_by_rank(
    table: &impl ReadableTable<&'static str, &'static [u8]>,
    rank: usize,
) -> Result<Option<TxtMsg>> {
    if rank == 0 {
        return Ok(None);
    }
    // Rank 1 is the newest, so walking from the end finds small ranks quickly.
    for entry in table.iter()?.rev() {
        let msg = msg_from_entry(entry)?;
        if msg.index == rank {
            return Ok(Some(msg));
        }
    }
    Ok(None)
}

/// Resolves `token` as a short index, then an alias, then (when `allow_id`)
/// a record ID.
pub(crate) fn resolve_in(
    temp: &impl ReadableTable<&'static str, &'static [u8]>,
    perm: &impl ReadableTable<&'static str, &'static [u8]>,
    aliases: &impl ReadableTable<&'static str, &'static str>,
    token: &str,
    allow_id: bool,
) -> Result<TxtMsg> {
    let not_found = || TxtError::NotFound(token.to_string());
    let token = token.trim();
    if token.is_empty() {
        return Err(not_found());
    }

    if let Ok(idx) = ShortIndex::from_str(token) {
        let found = match idx.cat {
            Category::Temporary => find_by_rank(temp, idx.rank)?,
            Category::Permanent => find_by_rank(perm, idx.rank)?,
        };
        return found.ok_or_else(not_found);
    }

    let target = aliases.get(token)?.map(|guard| guard.value().to_string());
    if let Some(id) = target {
        return match find_by_id(temp, perm, &id)? {
            Some(msg) => Ok(msg),
            None => {
                tracing::warn!(alias = token, %id, "alias points at a missing record");
                Err(not_found())
            }
        };
    }

    if allow_id {
        if let Some(msg) = find_by_id(temp, perm, token)? {
            return Ok(msg);
        }
    }
    Err(not_found())
}

impl TxtStore {
    /// Resolves a short index (`T1`) or an alias.
    pub fn get_by_alias_or_short_index(&self, token: &str) -> Result<TxtMsg> {
        self.resolve_token(token, false)
    }

    /// Resolves a short index, an alias or a record ID, in that order.
    pub fn resolve(&self, token: &str) -> Result<TxtMsg> {
        self.resolve_token(token, true)
    }

    fn resolve_token(&self, token: &str, allow_id: bool) -> Result<TxtMsg> {
        let txn = self.db.begin_read()?;
        let temp = txn.open_table(TEMPORARY)?;
        let perm = txn.open_table(PERMANENT)?;
        let aliases = txn.open_table(ALIASES)?;
        resolve_in(&temp, &perm, &aliases, token, allow_id)
    }
}
