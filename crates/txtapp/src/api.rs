//! # API Facade
//!
//! The API layer is a **thin facade** over [`TxtStore`]. Clients (the CLI,
//! an HTTP front end) talk to [`TxtApi`] and get back a [`CmdResult`]: the
//! records touched, the records to show and leveled messages. Rendering is
//! the client's business.
//!
//! ## What the API Does
//!
//! - **Resolves tokens**: short indexes (`T1`), aliases and IDs all work
//!   wherever a record is expected
//! - **Fills in partial edits**: an edit that only changes the alias keeps
//!   the text, and the other way round
//! - **Turns expected outcomes into messages**: re-adding the last message
//!   is reported as a warning, not a failure
//!
//! ## What the API Does NOT Do
//!
//! - **Storage rules**: dedupe, eviction, re-keying and index upkeep live in
//!   [`crate::store`]
//! - **I/O**: no stdout, no exit codes
//! - **Sessions**: key and password checks are exposed, remembering who is
//!   logged in is up to the client

use crate::error::{Result, TxtError};
use crate::model::{AliasEntry, Bucket, Category, ConfigForm, KeyStatus, TxtMsg};
use crate::store::TxtStore;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
}

#[derive(Debug, Clone, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct CmdResult {
    /// Records created or changed, in their post-operation state.
    pub affected: Vec<TxtMsg>,
    /// Records to display.
    pub listed: Vec<TxtMsg>,
    pub aliases: Vec<AliasEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<ConfigForm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<KeyStatus>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected(mut self, msgs: Vec<TxtMsg>) -> Self {
        self.affected = msgs;
        self
    }

    pub fn with_listed(mut self, msgs: Vec<TxtMsg>) -> Self {
        self.listed = msgs;
        self
    }

    pub fn with_message(mut self, message: CmdMessage) -> Self {
        self.messages.push(message);
        self
    }
}

pub struct TxtApi {
    store: TxtStore,
}

impl TxtApi {
    pub fn new(store: TxtStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &TxtStore {
        &self.store
    }

    pub fn add(&mut self, msg: &str) -> Result<CmdResult> {
        match self.store.insert(msg) {
            Ok(record) => {
                let note = format!("Added {}", record.short_index());
                Ok(CmdResult::default()
                    .with_affected(vec![record])
                    .with_message(CmdMessage::success(note)))
            }
            Err(e @ TxtError::DuplicateOfLast) => {
                Ok(CmdResult::default().with_message(CmdMessage::warning(e.to_string())))
            }
            Err(e) => Err(e),
        }
    }

    /// One page of a bucket. See [`TxtStore::paginate`].
    pub fn list(&self, bucket: Bucket, cursor: &str, limit: i64) -> Result<CmdResult> {
        let listed = self.store.paginate(bucket, cursor, limit)?;
        Ok(CmdResult::default().with_listed(listed))
    }

    /// Lists starting at a short index such as `T5`.
    pub fn list_from(&self, cat: Category, index: usize, limit: i64) -> Result<CmdResult> {
        let listed = self.store.page_by_index(cat, index, limit)?;
        Ok(CmdResult::default().with_listed(listed))
    }

    pub fn recent(&self, limit: i64) -> Result<CmdResult> {
        let listed = self.store.recent_items(limit)?;
        Ok(CmdResult::default().with_listed(listed))
    }

    pub fn view(&self, token: &str) -> Result<CmdResult> {
        let record = self.store.resolve(token)?;
        Ok(CmdResult::default().with_listed(vec![record]))
    }

    pub fn delete(&mut self, token: &str) -> Result<CmdResult> {
        let record = self.store.delete(token)?;
        let note = format!("Deleted {}", record.id);
        Ok(CmdResult::default()
            .with_affected(vec![record])
            .with_message(CmdMessage::success(note)))
    }

    pub fn toggle(&mut self, token: &str) -> Result<CmdResult> {
        let record = self.store.toggle_by_token(token)?;
        let note = format!("Moved to {} as {}", record.cat, record.short_index());
        Ok(CmdResult::default()
            .with_affected(vec![record])
            .with_message(CmdMessage::success(note)))
    }

    /// Sets the alias of a record; an empty alias removes it.
    pub fn set_alias(&mut self, token: &str, alias: &str) -> Result<CmdResult> {
        let record = self.store.update_alias(token, alias)?;
        let note = match &record.alias {
            Some(alias) => format!("{} is now also known as {}", record.short_index(), alias),
            None => format!("Removed the alias of {}", record.short_index()),
        };
        Ok(CmdResult::default()
            .with_affected(vec![record])
            .with_message(CmdMessage::success(note)))
    }

    /// Edits a record. `None` keeps the current value; `Some("")` as alias
    /// removes it.
    pub fn edit(
        &mut self,
        token: &str,
        alias: Option<&str>,
        msg: Option<&str>,
    ) -> Result<CmdResult> {
        let current = self.store.resolve(token)?;
        let alias = alias.unwrap_or_else(|| current.alias.as_deref().unwrap_or(""));
        let msg = msg.unwrap_or(&current.msg);
        let record = self.store.edit(&current.id, alias, msg)?;
        let note = format!("Updated {}", record.short_index());
        Ok(CmdResult::default()
            .with_affected(vec![record])
            .with_message(CmdMessage::success(note)))
    }

    pub fn search(&self, keyword: &str, buckets: &[Bucket]) -> Result<CmdResult> {
        let listed = self.store.search(keyword, buckets)?;
        let mut result = CmdResult::default();
        if listed.is_empty() {
            result.add_message(CmdMessage::info(format!("No match for \"{}\"", keyword)));
        }
        Ok(result.with_listed(listed))
    }

    pub fn aliases(&self) -> Result<CmdResult> {
        Ok(CmdResult {
            aliases: self.store.all_aliases()?,
            ..Default::default()
        })
    }

    pub fn count(&self, bucket: Bucket) -> Result<CmdResult> {
        Ok(CmdResult {
            count: Some(self.store.count_entries(bucket)?),
            ..Default::default()
        })
    }

    pub fn config(&self) -> CmdResult {
        CmdResult {
            config: Some(self.store.config().to_form()),
            ..Default::default()
        }
    }

    pub fn update_config(&mut self, form: &ConfigForm) -> Result<CmdResult> {
        let notes = self.store.update_config(form)?;
        let mut result = CmdResult {
            config: Some(self.store.config().to_form()),
            ..Default::default()
        };
        result.add_message(CmdMessage::success("Config updated"));
        for note in notes {
            result.add_message(CmdMessage::warning(note));
        }
        Ok(result)
    }

    /// The current key. Revealing it requires the password.
    pub fn key_status(&self, password: &str) -> Result<CmdResult> {
        self.store.check_password(password)?;
        Ok(CmdResult {
            key: Some(self.store.key_status()),
            ..Default::default()
        })
    }

    pub fn new_key(&mut self, password: &str) -> Result<CmdResult> {
        self.store.check_password(password)?;
        let status = self.store.generate_new_key()?;
        Ok(CmdResult {
            key: Some(status),
            ..Default::default()
        }
        .with_message(CmdMessage::success("Generated a new key")))
    }

    pub fn check_key(&self, key: &str) -> Result<CmdResult> {
        self.store.check_key(key)?;
        Ok(CmdResult::default().with_message(CmdMessage::success("The key is valid")))
    }

    pub fn change_password(&mut self, current: &str, new: &str) -> Result<CmdResult> {
        self.store.change_password(current, new)?;
        Ok(CmdResult::default().with_message(CmdMessage::success("Password changed")))
    }
}
