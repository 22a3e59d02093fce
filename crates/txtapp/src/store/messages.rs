//! Mutations: insert, delete, category toggle, edit and alias updates.
//!
//! Each public method here is exactly one write transaction. Returning early
//! with an error drops the transaction, which aborts it, so a failed step
//! never leaves a partial write behind.

use super::alias::{apply_alias_change, resolve_in};
use super::indexer::rebuild;
use super::{
    get_msg, msg_from_entry, newest, put_msg, AliasTable, MsgTable, TxtStore, ALIASES, PERMANENT,
    TEMPORARY,
};
use crate::error::{Result, TxtError};
use crate::index::normalize_alias;
use crate::model::{Category, TxtMsg};
use redb::{ReadableTable, ReadableTableMetadata};

/// Rejects whitespace-only messages and messages over `limit` bytes.
pub fn check_message(msg: &str, limit: usize) -> Result<()> {
    if msg.trim().is_empty() {
        return Err(TxtError::EmptyMessage);
    }
    if msg.len() > limit {
        return Err(TxtError::MessageTooLong {
            len: msg.len(),
            limit,
        });
    }
    Ok(())
}

fn by_category<'a, 't>(
    temp: &'a mut MsgTable<'t>,
    perm: &'a mut MsgTable<'t>,
    cat: Category,
) -> &'a mut MsgTable<'t> {
    match cat {
        Category::Temporary => temp,
        Category::Permanent => perm,
    }
}

/// Drops the oldest temporary records so that one more fits under `limit`.
fn evict(temp: &mut MsgTable<'_>, aliases: &mut AliasTable<'_>, limit: i64) -> Result<usize> {
    if limit <= 0 {
        return Ok(0);
    }
    let count = temp.len()?;
    let limit = limit as u64;
    if count < limit {
        return Ok(0);
    }
    let excess = (count - limit + 1) as usize;
    let victims = temp
        .iter()?
        .take(excess)
        .map(msg_from_entry)
        .collect::<Result<Vec<TxtMsg>>>()?;

    for victim in &victims {
        temp.remove(victim.id.as_str())?;
        if let Some(alias) = &victim.alias {
            aliases.remove(alias.as_str())?;
        }
    }
    Ok(victims.len())
}

impl TxtStore {
    /// Adds a message to the temporary namespace.
    ///
    /// Fails with [`TxtError::DuplicateOfLast`] when the text equals the
    /// newest temporary message.
    pub fn insert(&mut self, msg: &str) -> Result<TxtMsg> {
        check_message(msg, self.config.msg_size_limit)?;

        let txn = self.begin_write()?;
        let record = {
            let mut temp = txn.open_table(TEMPORARY)?;
            let mut aliases = txn.open_table(ALIASES)?;

            if let Some(last) = newest(&temp)? {
                if last.msg == msg {
                    return Err(TxtError::DuplicateOfLast);
                }
            }
            let evicted = evict(&mut temp, &mut aliases, self.config.temp_limit)?;

            let id = self.ids.next_id(&self.config.time_offset)?;
            let mut record = TxtMsg::new(id, msg.to_string());
            put_msg(&mut temp, &record)?;
            rebuild(&mut temp)?;
            record.index = 1;

            tracing::debug!(id = %record.id, evicted, "inserted message");
            record
        };
        txn.commit()?;
        Ok(record)
    }

    /// Deletes the record `token` resolves to, together with its alias.
    pub fn delete(&mut self, token: &str) -> Result<TxtMsg> {
        let txn = self.begin_write()?;
        let record = {
            let mut temp = txn.open_table(TEMPORARY)?;
            let mut perm = txn.open_table(PERMANENT)?;
            let mut aliases = txn.open_table(ALIASES)?;

            let record = resolve_in(&temp, &perm, &aliases, token, true)?;
            let table = by_category(&mut temp, &mut perm, record.cat);
            table.remove(record.id.as_str())?;
            if let Some(alias) = &record.alias {
                aliases.remove(alias.as_str())?;
            }
            rebuild(table)?;

            tracing::debug!(id = %record.id, cat = %record.cat, "deleted message");
            record
        };
        txn.commit()?;
        Ok(record)
    }

    /// Moves `record` to the other category.
    ///
    /// The stored copy is what gets moved; `record` only identifies it. The
    /// moved record gets a fresh ID, so it sorts as the newest of its new
    /// namespace. Moving into Temporary evicts the oldest temporary records
    /// the same way [`TxtStore::insert`] does.
    pub fn toggle_category(&mut self, record: &TxtMsg) -> Result<TxtMsg> {
        self.toggle_with(|temp, perm, _| {
            let stored = match record.cat {
                Category::Temporary => get_msg(temp, &record.id)?,
                Category::Permanent => get_msg(perm, &record.id)?,
            };
            stored.ok_or_else(|| TxtError::NotFound(record.id.clone()))
        })
    }

    pub fn toggle_by_token(&mut self, token: &str) -> Result<TxtMsg> {
        self.toggle_with(|temp, perm, aliases| resolve_in(temp, perm, aliases, token, true))
    }

    fn toggle_with(
        &mut self,
        pick: impl FnOnce(&MsgTable<'_>, &MsgTable<'_>, &AliasTable<'_>) -> Result<TxtMsg>,
    ) -> Result<TxtMsg> {
        let txn = self.begin_write()?;
        let moved = {
            let mut temp = txn.open_table(TEMPORARY)?;
            let mut perm = txn.open_table(PERMANENT)?;
            let mut aliases = txn.open_table(ALIASES)?;

            let current = pick(&temp, &perm, &aliases)?;
            let id = self.ids.next_id(&self.config.time_offset)?;
            let (source, target) = match current.cat {
                Category::Temporary => (&mut temp, &mut perm),
                Category::Permanent => (&mut perm, &mut temp),
            };

            source.remove(current.id.as_str())?;
            let evicted = match current.cat {
                Category::Permanent => evict(target, &mut aliases, self.config.temp_limit)?,
                Category::Temporary => 0,
            };
            let mut moved = TxtMsg {
                id,
                cat: current.cat.toggled(),
                index: 0,
                ..current.clone()
            };
            put_msg(target, &moved)?;
            if let Some(alias) = &moved.alias {
                aliases.insert(alias.as_str(), moved.id.as_str())?;
            }
            rebuild(source)?;
            rebuild(target)?;
            moved.index = 1;

            tracing::debug!(
                from = %current.id,
                to = %moved.id,
                cat = %moved.cat,
                evicted,
                "toggled category"
            );
            moved
        };
        txn.commit()?;
        Ok(moved)
    }

    /// Replaces the text and alias of the record with `id`.
    ///
    /// An empty `new_alias` removes the alias. The display index does not
    /// change.
    pub fn edit(&mut self, id: &str, new_alias: &str, new_msg: &str) -> Result<TxtMsg> {
        check_message(new_msg, self.config.msg_size_limit)?;
        let new_alias = normalize_alias(new_alias);

        let txn = self.begin_write()?;
        let record = {
            let mut temp = txn.open_table(TEMPORARY)?;
            let mut perm = txn.open_table(PERMANENT)?;
            let mut aliases = txn.open_table(ALIASES)?;

            let mut record = match get_msg(&temp, id)? {
                Some(msg) => msg,
                None => get_msg(&perm, id)?.ok_or_else(|| TxtError::NotFound(id.to_string()))?,
            };
            apply_alias_change(
                &mut aliases,
                &record.id,
                record.alias.as_deref(),
                new_alias.as_deref(),
            )?;
            record.alias = new_alias;
            record.msg = new_msg.to_string();
            put_msg(by_category(&mut temp, &mut perm, record.cat), &record)?;

            tracing::debug!(id = %record.id, "edited message");
            record
        };
        txn.commit()?;
        Ok(record)
    }

    /// Sets, renames or (with an empty `new_alias`) removes the alias of the
    /// record `token` resolves to.
    pub fn update_alias(&mut self, token: &str, new_alias: &str) -> Result<TxtMsg> {
        let new_alias = normalize_alias(new_alias);

        let txn = self.begin_write()?;
        let record = {
            let mut temp = txn.open_table(TEMPORARY)?;
            let mut perm = txn.open_table(PERMANENT)?;
            let mut aliases = txn.open_table(ALIASES)?;

            let mut record = resolve_in(&temp, &perm, &aliases, token, true)?;
            apply_alias_change(
                &mut aliases,
                &record.id,
                record.alias.as_deref(),
                new_alias.as_deref(),
            )?;
            record.alias = new_alias;
            put_msg(by_category(&mut temp, &mut perm, record.cat), &record)?;

            tracing::debug!(id = %record.id, alias = ?record.alias, "updated alias");
            record
        };
        txn.commit()?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Bucket;
    use crate::test_utils::TestEnv;

    #[test]
    fn insert_returns_newest_record() {
        let mut env = TestEnv::new();
        let msg = env.store.insert("hello").unwrap();
        assert_eq!(msg.index, 1);
        assert_eq!(msg.cat, Category::Temporary);
        assert_eq!(msg.alias, None);
        assert_eq!(msg.id.len(), 14);
    }

    #[test]
    fn duplicate_of_last_is_rejected() {
        let mut env = TestEnv::new();
        env.store.insert("same").unwrap();
        assert!(matches!(
            env.store.insert("same"),
            Err(TxtError::DuplicateOfLast)
        ));
        assert_eq!(env.store.count_entries(Bucket::Temporary).unwrap(), 1);

        // Only the newest one counts.
        env.store.insert("other").unwrap();
        env.store.insert("same").unwrap();
        assert_eq!(env.store.count_entries(Bucket::Temporary).unwrap(), 3);
    }

    #[test]
    fn dedupe_is_verbatim() {
        let mut env = TestEnv::new();
        env.store.insert("same").unwrap();
        env.store.insert("same ").unwrap();
        env.store.insert("Same ").unwrap();
        assert_eq!(env.store.count_entries(Bucket::Temporary).unwrap(), 3);
    }

    #[test]
    fn message_checks() {
        let mut env = TestEnv::new();
        assert!(matches!(
            env.store.insert("  \n "),
            Err(TxtError::EmptyMessage)
        ));
        let long = "x".repeat(1025);
        assert!(matches!(
            env.store.insert(&long),
            Err(TxtError::MessageTooLong {
                len: 1025,
                limit: 1024
            })
        ));
        // Byte length, not characters.
        let wide = "é".repeat(513);
        assert!(env.store.insert(&wide).is_err());
        env.store.insert(&"x".repeat(1024)).unwrap();
    }

    #[test]
    fn eviction_drops_oldest_and_their_aliases() {
        let mut env = TestEnv::with_temp_limit(3);
        let first = env.store.insert("1").unwrap();
        env.store.update_alias(&first.id, "oldest").unwrap();
        for text in ["2", "3", "4"] {
            env.store.insert(text).unwrap();
        }

        let texts: Vec<_> = env
            .listing(Bucket::Temporary)
            .into_iter()
            .map(|(_, m)| m)
            .collect();
        assert_eq!(texts, vec!["4", "3", "2"]);
        assert!(matches!(
            env.store.resolve("oldest"),
            Err(TxtError::NotFound(_))
        ));
        assert!(env.store.all_aliases().unwrap().is_empty());
    }

    #[test]
    fn lowered_limit_evicts_excess_on_next_insert() {
        let mut env = TestEnv::new();
        for i in 0..6 {
            env.store.insert(&i.to_string()).unwrap();
        }
        env.edit_config(|c| c.temp_limit = 2);
        env.store.insert("new").unwrap();
        let listing = env.listing(Bucket::Temporary);
        assert_eq!(
            listing,
            vec![
                ("T1".to_string(), "new".to_string()),
                ("T2".to_string(), "5".to_string())
            ]
        );
    }

    #[test]
    fn non_positive_limit_disables_eviction() {
        let mut env = TestEnv::with_temp_limit(0);
        for i in 0..150 {
            env.store.insert(&i.to_string()).unwrap();
        }
        assert_eq!(env.store.count_entries(Bucket::Temporary).unwrap(), 150);
    }

    #[test]
    fn delete_removes_alias_and_renumbers() {
        let mut env = TestEnv::new();
        let a = env.store.insert("a").unwrap();
        env.store.insert("b").unwrap();
        env.store.insert("c").unwrap();
        env.store.update_alias(&a.id, "first").unwrap();

        let deleted = env.store.delete("first").unwrap();
        assert_eq!(deleted.id, a.id);
        assert!(env.store.resolve("first").is_err());
        assert_eq!(
            env.listing(Bucket::Temporary),
            vec![
                ("T1".to_string(), "c".to_string()),
                ("T2".to_string(), "b".to_string())
            ]
        );

        env.store.delete("T1").unwrap();
        assert_eq!(env.store.resolve("T1").unwrap().msg, "b");
        assert!(matches!(
            env.store.delete("T5"),
            Err(TxtError::NotFound(_))
        ));
    }

    #[test]
    fn toggle_rekeys_and_repoints_alias() {
        let mut env = TestEnv::new();
        let a = env.store.insert("keep me").unwrap();
        env.store.update_alias(&a.id, "keeper").unwrap();

        let moved = env.store.toggle_by_token("keeper").unwrap();
        assert_eq!(moved.cat, Category::Permanent);
        assert_eq!(moved.index, 1);
        assert!(moved.id > a.id);
        assert!(env.store.get_by_id(&a.id).is_err());
        assert_eq!(env.store.resolve("keeper").unwrap().id, moved.id);
        assert_eq!(env.store.resolve("P1").unwrap().id, moved.id);
        assert_eq!(env.store.count_entries(Bucket::Temporary).unwrap(), 0);

        let back = env.store.toggle_category(&moved).unwrap();
        assert_eq!(back.cat, Category::Temporary);
        assert!(back.id > moved.id);
        assert_eq!(back.alias.as_deref(), Some("keeper"));
        assert_eq!(env.store.resolve("keeper").unwrap().id, back.id);
    }

    #[test]
    fn toggling_into_a_full_temporary_bucket_evicts() {
        let mut env = TestEnv::with_temp_limit(2);
        let a = env.store.insert("a").unwrap();
        env.store.toggle_category(&a).unwrap();
        let b = env.store.insert("b").unwrap();
        env.store.update_alias(&b.id, "bee").unwrap();
        env.store.insert("c").unwrap();

        let back = env.store.toggle_by_token("P1").unwrap();
        assert_eq!(back.msg, "a");
        assert_eq!(back.index, 1);
        assert_eq!(env.store.count_entries(Bucket::Temporary).unwrap(), 2);
        assert_eq!(env.store.count_entries(Bucket::Permanent).unwrap(), 0);
        assert_eq!(
            env.listing(Bucket::Temporary),
            vec![
                ("T1".to_string(), "a".to_string()),
                ("T2".to_string(), "c".to_string())
            ]
        );
        assert!(matches!(
            env.store.resolve("bee"),
            Err(TxtError::NotFound(_))
        ));
    }

    #[test]
    fn toggling_a_stale_record_fails() {
        let mut env = TestEnv::new();
        let a = env.store.insert("a").unwrap();
        env.store.toggle_category(&a).unwrap();
        assert!(matches!(
            env.store.toggle_category(&a),
            Err(TxtError::NotFound(_))
        ));
        assert_eq!(env.store.count_entries(Bucket::Permanent).unwrap(), 1);
    }

    #[test]
    fn edit_changes_text_and_alias() {
        let mut env = TestEnv::new();
        let a = env.store.insert("draft").unwrap();
        env.store.insert("later").unwrap();

        let edited = env.store.edit(&a.id, "final", "final text").unwrap();
        assert_eq!(edited.msg, "final text");
        assert_eq!(edited.index, 2);
        assert_eq!(env.store.resolve("final").unwrap().msg, "final text");

        let cleared = env.store.edit(&a.id, "", "final text").unwrap();
        assert_eq!(cleared.alias, None);
        assert!(env.store.resolve("final").is_err());
    }

    #[test]
    fn failed_edit_writes_nothing() {
        let mut env = TestEnv::new();
        let a = env.store.insert("a").unwrap();
        let b = env.store.insert("b").unwrap();
        env.store.update_alias(&a.id, "taken").unwrap();

        assert!(matches!(
            env.store.edit(&b.id, "taken", "changed"),
            Err(TxtError::AliasConflict(_))
        ));
        assert_eq!(env.store.get_by_id(&b.id).unwrap().msg, "b");
        assert!(matches!(
            env.store.edit("20000101000000", "", "x"),
            Err(TxtError::NotFound(_))
        ));
        assert!(matches!(
            env.store.edit(&b.id, "", " "),
            Err(TxtError::EmptyMessage)
        ));
    }
}
