//! # Storage Layer
//!
//! Everything is kept in a single [`redb`] file. redb gives us ACID write
//! transactions with a single writer and snapshot reads, which is exactly the
//! shape of a single-user store.
//!
//! ## Namespaces
//!
//! ```text
//! db-txt.redb
//! ├── temporary   id    -> TxtMsg (bincode)   capped, oldest evicted first
//! ├── permanent   id    -> TxtMsg (bincode)   never capped
//! ├── aliases     alias -> id
//! └── config      "config" -> Config (bincode)
//! ```
//!
//! IDs are fixed-width date strings, so key order is creation order and the
//! newest message is always the last key of its table.
//!
//! ## Transactions
//!
//! Each mutating operation is one write transaction covering all of its
//! steps. An insert reads the newest temporary message (dedupe), evicts over
//! capacity, writes the record and rebuilds the display index before
//! committing. A category toggle removes, re-keys, writes, repoints the alias
//! and rebuilds both indexes in the same transaction. A crash can therefore
//! never leave a record in both namespaces, a dangling alias, or stale
//! indexes.
//!
//! ## Modules
//!
//! - [`messages`]: insert, delete, toggle, edit, alias updates
//! - [`alias`]: token resolution and the alias mutation protocol
//! - [`indexer`]: display index rebuild
//! - [`query`]: pagination, search, counts
//! - [`config`]: the persisted config record and key management

use crate::error::{Result, TxtError};
use crate::id::IdGenerator;
use crate::model::{Category, Config, TxtMsg};
use redb::backends::InMemoryBackend;
use redb::{
    AccessGuard, Database, ReadableTable, StorageError, Table, TableDefinition, WriteTransaction,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

pub mod alias;
pub mod config;
pub mod indexer;
pub mod messages;
pub mod query;

pub const DB_FILE_NAME: &str = "db-txt.redb";

pub(crate) const TEMPORARY: TableDefinition<&str, &[u8]> = TableDefinition::new("temporary");
pub(crate) const PERMANENT: TableDefinition<&str, &[u8]> = TableDefinition::new("permanent");
pub(crate) const ALIASES: TableDefinition<&str, &str> = TableDefinition::new("aliases");
pub(crate) const CONFIG: TableDefinition<&str, &[u8]> = TableDefinition::new("config");

pub(crate) type MsgTable<'txn> = Table<'txn, &'static str, &'static [u8]>;
pub(crate) type AliasTable<'txn> = Table<'txn, &'static str, &'static str>;

type MsgEntry<'a> = std::result::Result<
    (
        AccessGuard<'a, &'static str>,
        AccessGuard<'a, &'static [u8]>,
    ),
    StorageError,
>;

pub(crate) fn table_def(cat: Category) -> TableDefinition<'static, &'static str, &'static [u8]> {
    match cat {
        Category::Temporary => TEMPORARY,
        Category::Permanent => PERMANENT,
    }
}

pub struct TxtStore {
    db: Database,
    path: Option<PathBuf>,
    config: Config,
    ids: IdGenerator,
}

impl TxtStore {
    /// Opens (or creates) the store file at `path`.
    ///
    /// redb locks the file; a second process opening it fails here instead of
    /// waiting.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        tracing::info!(path = %path.display(), "opening database");
        let db = Database::create(&path)?;
        Self::bootstrap(db, Some(path))
    }

    /// Opens `folder/db-txt.redb`.
    pub fn open_in(folder: impl AsRef<Path>) -> Result<Self> {
        Self::open(folder.as_ref().join(DB_FILE_NAME))
    }

    /// A store that lives only as long as the value, for tests and dry runs.
    pub fn open_in_memory() -> Result<Self> {
        let db = Database::builder().create_with_backend(InMemoryBackend::new())?;
        Self::bootstrap(db, None)
    }

    /// Creates the tables, loads or creates the config and seeds the ID
    /// generator with the greatest existing message key.
    fn bootstrap(db: Database, path: Option<PathBuf>) -> Result<Self> {
        let txn = db.begin_write()?;
        let (config, last_id) = {
            let temp = txn.open_table(TEMPORARY)?;
            let perm = txn.open_table(PERMANENT)?;
            txn.open_table(ALIASES)?;
            let mut config_table = txn.open_table(CONFIG)?;
            let config = config::load_or_init(&mut config_table)?;
            let last_id = std::cmp::max(last_key(&temp)?, last_key(&perm)?);
            (config, last_id)
        };
        txn.commit()?;

        Ok(Self {
            db,
            path,
            ids: IdGenerator::seeded(last_id.as_deref()),
            config,
        })
    }

    /// The file backing this store, `None` when in memory.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get_by_id(&self, id: &str) -> Result<TxtMsg> {
        let txn = self.db.begin_read()?;
        let temp = txn.open_table(TEMPORARY)?;
        let perm = txn.open_table(PERMANENT)?;
        find_by_id(&temp, &perm, id)?.ok_or_else(|| TxtError::NotFound(id.to_string()))
    }

    fn begin_write(&self) -> Result<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }
}

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(bincode::serialize(value)?)
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(bincode::deserialize(bytes)?)
}

pub(crate) fn msg_from_entry(entry: MsgEntry<'_>) -> Result<TxtMsg> {
    let (_, value) = entry?;
    decode(value.value())
}

pub(crate) fn get_msg(
    table: &impl ReadableTable<&'static str, &'static [u8]>,
    id: &str,
) -> Result<Option<TxtMsg>> {
    match table.get(id)? {
        Some(value) => Ok(Some(decode(value.value())?)),
        None => Ok(None),
    }
}

pub(crate) fn put_msg(table: &mut MsgTable<'_>, msg: &TxtMsg) -> Result<()> {
    let bytes = encode(msg)?;
    table.insert(msg.id.as_str(), bytes.as_slice())?;
    Ok(())
}

/// The newest record of a message table.
pub(crate) fn newest(
    table: &impl ReadableTable<&'static str, &'static [u8]>,
) -> Result<Option<TxtMsg>> {
    match table.last()? {
        Some((_, value)) => Ok(Some(decode(value.value())?)),
        None => Ok(None),
    }
}

fn last_key(table: &impl ReadableTable<&'static str, &'static [u8]>) -> Result<Option<String>> {
    Ok(table.last()?.map(|(key, _)| key.value().to_string()))
}

pub(crate) fn find_by_id(
    temp: &impl ReadableTable<&'static str, &'static [u8]>,
    perm: &impl ReadableTable<&'static str, &'static [u8]>,
    id: &str,
) -> Result<Option<TxtMsg>> {
    if let Some(msg) = get_msg(temp, id)? {
        return Ok(Some(msg));
    }
    get_msg(perm, id)
}
