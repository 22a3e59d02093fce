//! The persisted config record and key management.
//!
//! The config lives under a single key in the `config` table. It is created
//! with defaults the first time a store is opened and cached on [`TxtStore`]
//! afterwards; every write goes through [`TxtStore::save_config`] so the
//! cache and the table never disagree.

use super::{decode, encode, MsgTable, TxtStore, CONFIG, TEMPORARY};
use crate::error::{Result, TxtError};
use crate::id::parse_offset;
use crate::model::{Config, ConfigForm, KeyStatus, DAY, DEFAULT_KEY_MAX_AGE};
use base64::Engine;
use chrono::Utc;
use rand::RngCore;
use redb::{ReadableTable, ReadableTableMetadata};

pub const CONFIG_KEY: &str = "config";
pub const DEFAULT_PASSWORD: &str = "abc";

const KEY_BYTES: usize = 12;
const MIN_MSG_SIZE_LIMIT: usize = 256;
const MAX_KEY_MAX_AGE_DAYS: i64 = 36500;

pub fn default_config() -> Config {
    Config {
        password: DEFAULT_PASSWORD.to_string(),
        key: new_key(),
        key_starts: Utc::now().timestamp(),
        key_max_age: DEFAULT_KEY_MAX_AGE,
        msg_size_limit: 1024,
        temp_limit: 100,
        every_page_limit: 20,
        time_offset: "+0".to_string(),
    }
}

fn new_key() -> String {
    let mut bytes = [0u8; KEY_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Reads the config record, writing the defaults when it is absent.
pub(crate) fn load_or_init(table: &mut MsgTable<'_>) -> Result<Config> {
    if let Some(value) = table.get(CONFIG_KEY)? {
        return decode(value.value());
    }
    let config = default_config();
    let bytes = encode(&config)?;
    table.insert(CONFIG_KEY, bytes.as_slice())?;
    tracing::info!("created default config");
    Ok(config)
}

fn validate_form(form: &ConfigForm) -> Result<()> {
    let invalid = |msg: &str| Err(TxtError::InvalidConfig(msg.to_string()));
    if form.key_max_age_days < 1 {
        return invalid("key max age must be at least 1 day");
    }
    if form.key_max_age_days > MAX_KEY_MAX_AGE_DAYS {
        return invalid("key max age must be at most 36500 days");
    }
    if form.msg_size_limit < MIN_MSG_SIZE_LIMIT {
        return invalid("message size limit must be at least 256 bytes");
    }
    if form.temp_limit < 1 {
        return invalid("temporary limit must be at least 1");
    }
    if form.every_page_limit < 1 {
        return invalid("page limit must be at least 1");
    }
    if parse_offset(&form.time_offset).is_err() {
        return Err(TxtError::InvalidConfig(format!(
            "cannot parse time offset \"{}\"",
            form.time_offset
        )));
    }
    Ok(())
}

impl TxtStore {
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn key_status(&self) -> KeyStatus {
        self.config.key_status()
    }

    /// Applies the user-editable settings. Returns notes worth showing the
    /// user; they are not errors.
    pub fn update_config(&mut self, form: &ConfigForm) -> Result<Vec<String>> {
        validate_form(form)?;
        let form = ConfigForm {
            time_offset: form.time_offset.trim().to_string(),
            ..form.clone()
        };

        let mut notes = Vec::new();
        if form.time_offset != self.config.time_offset {
            notes.push(format!(
                "Time offset changed from {} to {}; new IDs use the new offset",
                self.config.time_offset, form.time_offset
            ));
        }
        let count = {
            let txn = self.db.begin_read()?;
            let table = txn.open_table(TEMPORARY)?;
            table.len()?
        };
        if form.temp_limit < self.config.temp_limit && count > form.temp_limit as u64 {
            notes.push(format!(
                "There are {} temporary messages, more than the new limit {}; \
                 the oldest will be evicted on the next insert",
                count, form.temp_limit
            ));
        }

        let config = Config {
            key_max_age: form.key_max_age_days * DAY,
            msg_size_limit: form.msg_size_limit,
            temp_limit: form.temp_limit,
            every_page_limit: form.every_page_limit,
            time_offset: form.time_offset,
            ..self.config.clone()
        };
        self.save_config(config)?;
        tracing::debug!(notes = notes.len(), "config updated");
        Ok(notes)
    }

    pub fn generate_new_key(&mut self) -> Result<KeyStatus> {
        let config = Config {
            key: new_key(),
            key_starts: Utc::now().timestamp(),
            ..self.config.clone()
        };
        self.save_config(config)?;
        tracing::debug!("generated new key");
        Ok(self.config.key_status())
    }

    pub fn change_password(&mut self, current: &str, new: &str) -> Result<()> {
        self.check_password(current)?;
        if new.is_empty() {
            return Err(TxtError::InvalidConfig(
                "password must not be empty".to_string(),
            ));
        }
        let config = Config {
            password: new.to_string(),
            ..self.config.clone()
        };
        self.save_config(config)?;
        tracing::debug!("password changed");
        Ok(())
    }

    pub fn check_password(&self, pwd: &str) -> Result<()> {
        if pwd != self.config.password {
            return Err(TxtError::WrongPassword);
        }
        Ok(())
    }

    pub fn check_key(&self, key: &str) -> Result<()> {
        if key != self.config.key {
            return Err(TxtError::WrongKey);
        }
        if !self.config.key_status().is_good {
            return Err(TxtError::KeyExpired);
        }
        Ok(())
    }

    /// Persists `config` and replaces the cached copy. No validation.
    pub(crate) fn save_config(&mut self, config: Config) -> Result<()> {
        let txn = self.begin_write()?;
        {
            let mut table = txn.open_table(CONFIG)?;
            let bytes = encode(&config)?;
            table.insert(CONFIG_KEY, bytes.as_slice())?;
        }
        txn.commit()?;
        self.config = config;
        Ok(())
    }
}
