//! Read-only queries. Each one runs in a single read transaction, so it sees
//! a consistent snapshot even if a write commits halfway through.

use super::{find_by_id, msg_from_entry, table_def, TxtStore, ALIASES, PERMANENT, TEMPORARY};
use crate::error::Result;
use crate::model::{AliasEntry, Bucket, Category, TxtMsg};
use redb::{ReadableTable, ReadableTableMetadata};
use std::ops::Bound;

const DEFAULT_SEARCH: [Bucket; 2] = [Bucket::Temporary, Bucket::Permanent];

impl TxtStore {
    /// `limit <= 0` means the configured page size.
    fn page_limit(&self, limit: i64) -> usize {
        if limit <= 0 {
            self.config.every_page_limit
        } else {
            usize::try_from(limit).unwrap_or(usize::MAX)
        }
    }

    /// One page of a namespace.
    ///
    /// Message namespaces are listed newest first, starting strictly after
    /// (older than) the `cursor` ID. The alias namespace is listed in
    /// ascending alias order starting strictly after the `cursor` alias, each
    /// alias resolved to its record. An empty cursor starts from the top.
    pub fn paginate(&self, bucket: Bucket, cursor: &str, limit: i64) -> Result<Vec<TxtMsg>> {
        let limit = self.page_limit(limit);
        match bucket.category() {
            Some(cat) => self.page_messages(cat, cursor, limit),
            None => self.page_aliases(cursor, limit),
        }
    }

    fn page_messages(&self, cat: Category, cursor: &str, limit: usize) -> Result<Vec<TxtMsg>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(table_def(cat))?;
        let entries = if cursor.is_empty() {
            table.iter()?
        } else {
            table.range::<&str>(..cursor)?
        };
        entries.rev().take(limit).map(msg_from_entry).collect()
    }

    fn page_aliases(&self, cursor: &str, limit: usize) -> Result<Vec<TxtMsg>> {
        let txn = self.db.begin_read()?;
        let temp = txn.open_table(TEMPORARY)?;
        let perm = txn.open_table(PERMANENT)?;
        let aliases = txn.open_table(ALIASES)?;
        let entries = if cursor.is_empty() {
            aliases.iter()?
        } else {
            aliases.range::<&str>((Bound::Excluded(cursor), Bound::Unbounded))?
        };

        let mut page = Vec::new();
        for entry in entries {
            if page.len() >= limit {
                break;
            }
            let (alias, id) = entry?;
            match find_by_id(&temp, &perm, id.value())? {
                Some(msg) => page.push(msg),
                None => tracing::warn!(
                    alias = alias.value(),
                    id = id.value(),
                    "skipping alias of a missing record"
                ),
            }
        }
        Ok(page)
    }

    /// Records of `cat` whose display index is `index` or higher, newest first.
    pub fn page_by_index(&self, cat: Category, index: usize, limit: i64) -> Result<Vec<TxtMsg>> {
        let limit = self.page_limit(limit);
        let txn = self.db.begin_read()?;
        let table = txn.open_table(table_def(cat))?;

        let mut page = Vec::new();
        for entry in table.iter()?.rev() {
            if page.len() >= limit {
                break;
            }
            let msg = msg_from_entry(entry)?;
            if msg.index >= index {
                page.push(msg);
            }
        }
        Ok(page)
    }

    /// Case-insensitive substring search over message text.
    ///
    /// Results keep the order of `buckets` (temporary then permanent when
    /// empty) and are newest first within each. The alias bucket is skipped.
    pub fn search(&self, keyword: &str, buckets: &[Bucket]) -> Result<Vec<TxtMsg>> {
        let buckets = if buckets.is_empty() {
            &DEFAULT_SEARCH[..]
        } else {
            buckets
        };
        let needle = keyword.to_lowercase();
        let txn = self.db.begin_read()?;

        let mut found = Vec::new();
        for cat in buckets.iter().filter_map(|b| b.category()) {
            let table = txn.open_table(table_def(cat))?;
            for entry in table.iter()?.rev() {
                let msg = msg_from_entry(entry)?;
                if msg.msg.to_lowercase().contains(&needle) {
                    found.push(msg);
                }
            }
        }
        tracing::debug!(keyword, hits = found.len(), "search");
        Ok(found)
    }

    /// The newest `limit` temporary records followed by the newest `limit`
    /// permanent ones.
    pub fn recent_items(&self, limit: i64) -> Result<Vec<TxtMsg>> {
        let limit = self.page_limit(limit);
        let mut items = self.page_messages(Category::Temporary, "", limit)?;
        items.extend(self.page_messages(Category::Permanent, "", limit)?);
        Ok(items)
    }

    pub fn count_entries(&self, bucket: Bucket) -> Result<u64> {
        let txn = self.db.begin_read()?;
        let count = match bucket.category() {
            Some(cat) => txn.open_table(table_def(cat))?.len()?,
            None => txn.open_table(ALIASES)?.len()?,
        };
        Ok(count)
    }

    pub fn all_aliases(&self) -> Result<Vec<AliasEntry>> {
        let txn = self.db.begin_read()?;
        let aliases = txn.open_table(ALIASES)?;
        let entries = aliases.iter()?;
        entries
            .map(|entry| {
                let (alias, id) = entry?;
                Ok(AliasEntry {
                    alias: alias.value().to_string(),
                    msg_id: id.value().to_string(),
                })
            })
            .collect()
    }
}
