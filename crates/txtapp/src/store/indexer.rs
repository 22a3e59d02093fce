//! Display index upkeep.
//!
//! Indexes are dense: the newest record of a namespace has index 1 and the
//! oldest has index N. Any change in membership shifts every rank, so the
//! whole namespace is rewritten. Namespaces stay small enough (hundreds,
//! maybe a few thousand records) for that to be cheap.

use super::{msg_from_entry, put_msg, table_def, MsgTable, TxtStore};
use crate::error::Result;
use crate::model::{Category, TxtMsg};
use redb::ReadableTable;

/// Renumbers every record in `table`. Returns the number of records.
///
/// Only records whose index actually changed are written back.
pub(crate) fn rebuild(table: &mut MsgTable<'_>) -> Result<usize> {
    let records = table
        .iter()?
        .map(msg_from_entry)
        .collect::<Result<Vec<TxtMsg>>>()?;
    let total = records.len();

    for (pos, mut msg) in records.into_iter().enumerate() {
        let index = total - pos;
        if msg.index != index {
            msg.index = index;
            put_msg(table, &msg)?;
        }
    }
    Ok(total)
}

impl TxtStore {
    /// Recomputes the display indexes of one namespace.
    ///
    /// Every mutation already does this inside its own transaction; this is
    /// for repairing a file written by something else.
    pub fn rebuild_index(&mut self, cat: Category) -> Result<usize> {
        let txn = self.begin_write()?;
        let total = {
            let mut table = txn.open_table(table_def(cat))?;
            rebuild(&mut table)?
        };
        txn.commit()?;
        tracing::debug!(%cat, total, "rebuilt index");
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Bucket;
    use crate::store::{encode, TEMPORARY};
    use crate::test_utils::TestEnv;

    fn indexes(env: &TestEnv, bucket: Bucket) -> Vec<usize> {
        env.store
            .paginate(bucket, "", i64::MAX)
            .unwrap()
            .iter()
            .map(|m| m.index)
            .collect()
    }

    #[test]
    fn inserts_keep_indexes_dense() {
        let mut env = TestEnv::new();
        for word in ["a", "b", "c", "d"] {
            env.store.insert(word).unwrap();
        }
        assert_eq!(indexes(&env, Bucket::Temporary), vec![1, 2, 3, 4]);
    }

    #[test]
    fn rebuild_repairs_scrambled_indexes() {
        let mut env = TestEnv::new();
        for word in ["a", "b", "c"] {
            env.store.insert(word).unwrap();
        }

        // Scramble the stored indexes behind the store's back.
        {
            let txn = env.store.begin_write().unwrap();
            {
                let mut table = txn.open_table(TEMPORARY).unwrap();
                let records: Vec<TxtMsg> = table
                    .iter()
                    .unwrap()
                    .map(|e| msg_from_entry(e).unwrap())
                    .collect();
                for mut msg in records {
                    msg.index = 7;
                    let bytes = encode(&msg).unwrap();
                    table.insert(msg.id.as_str(), bytes.as_slice()).unwrap();
                }
            }
            txn.commit().unwrap();
        }
        assert_eq!(indexes(&env, Bucket::Temporary), vec![7, 7, 7]);

        let total = env.store.rebuild_index(Category::Temporary).unwrap();
        assert_eq!(total, 3);
        assert_eq!(indexes(&env, Bucket::Temporary), vec![1, 2, 3]);
    }

    #[test]
    fn rebuild_on_empty_namespace() {
        let mut env = TestEnv::new();
        assert_eq!(env.store.rebuild_index(Category::Permanent).unwrap(), 0);
    }
}
