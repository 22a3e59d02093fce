use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const HOUR: i64 = 60 * 60;
pub const DAY: i64 = 24 * HOUR;
pub const DEFAULT_KEY_MAX_AGE: i64 = 30 * DAY;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Temporary,
    Permanent,
}

impl Category {
    /// The letter used in short indexes (`T3`, `P1`).
    pub fn letter(self) -> char {
        match self {
            Category::Temporary => 'T',
            Category::Permanent => 'P',
        }
    }

    pub fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'T' => Some(Category::Temporary),
            'P' => Some(Category::Permanent),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Category::Temporary => Category::Permanent,
            Category::Permanent => Category::Temporary,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Temporary => write!(f, "temporary"),
            Category::Permanent => write!(f, "permanent"),
        }
    }
}

/// A namespace selector for queries. Unlike [`Category`], it can also name
/// the alias namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bucket {
    Temporary,
    Permanent,
    Alias,
}

impl Bucket {
    pub fn category(self) -> Option<Category> {
        match self {
            Bucket::Temporary => Some(Category::Temporary),
            Bucket::Permanent => Some(Category::Permanent),
            Bucket::Alias => None,
        }
    }
}

impl From<Category> for Bucket {
    fn from(cat: Category) -> Self {
        match cat {
            Category::Temporary => Bucket::Temporary,
            Category::Permanent => Bucket::Permanent,
        }
    }
}

impl FromStr for Bucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "temporary" | "temp" | "t" => Ok(Bucket::Temporary),
            "permanent" | "perm" | "p" => Ok(Bucket::Permanent),
            "alias" | "aliases" | "a" => Ok(Bucket::Alias),
            other => Err(format!("Unknown bucket: {}", other)),
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bucket::Temporary => write!(f, "temporary"),
            Bucket::Permanent => write!(f, "permanent"),
            Bucket::Alias => write!(f, "alias"),
        }
    }
}

/// A stored message.
///
/// `index` is the display rank inside the owning namespace (1 = newest). It is
/// rewritten by every mutation that changes the namespace's membership, so a
/// value read before a mutation says nothing about the record afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxtMsg {
    pub id: String,
    pub alias: Option<String>,
    pub msg: String,
    pub cat: Category,
    pub index: usize,
}

impl TxtMsg {
    pub fn new(id: String, msg: String) -> Self {
        Self {
            id,
            alias: None,
            msg,
            cat: Category::Temporary,
            index: 0,
        }
    }

    /// The short index token for this record, e.g. `T1`.
    pub fn short_index(&self) -> String {
        format!("{}{}", self.cat.letter(), self.index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasEntry {
    pub alias: String,
    pub msg_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Master password, only used to manage the key.
    pub password: String,
    /// Day-to-day access key.
    pub key: String,
    /// Unix seconds at which `key` became valid.
    pub key_starts: i64,
    /// Seconds.
    pub key_max_age: i64,
    /// Bytes.
    pub msg_size_limit: usize,
    /// Maximum number of temporary messages, `<= 0` disables eviction.
    pub temp_limit: i64,
    pub every_page_limit: usize,
    /// UTC offset used for new IDs, e.g. `"+8"`.
    pub time_offset: String,
}

impl Config {
    pub fn key_status(&self) -> KeyStatus {
        let expires = self.key_starts.saturating_add(self.key_max_age);
        KeyStatus {
            key: self.key.clone(),
            starts: self.key_starts,
            max_age_days: self.key_max_age / DAY,
            expires,
            is_good: Utc::now().timestamp() <= expires,
        }
    }

    pub fn to_form(&self) -> ConfigForm {
        ConfigForm {
            key_max_age_days: self.key_max_age / DAY,
            msg_size_limit: self.msg_size_limit,
            temp_limit: self.temp_limit,
            every_page_limit: self.every_page_limit,
            time_offset: self.time_offset.clone(),
        }
    }
}

/// The user-editable part of [`Config`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigForm {
    pub key_max_age_days: i64,
    pub msg_size_limit: usize,
    pub temp_limit: i64,
    pub every_page_limit: usize,
    pub time_offset: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyStatus {
    pub key: String,
    pub starts: i64,
    pub max_age_days: i64,
    pub expires: i64,
    pub is_good: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_letters_round_trip() {
        assert_eq!(Category::from_letter('t'), Some(Category::Temporary));
        assert_eq!(Category::from_letter('P'), Some(Category::Permanent));
        assert_eq!(Category::from_letter('x'), None);
        assert_eq!(Category::Temporary.toggled(), Category::Permanent);
    }

    #[test]
    fn bucket_parsing() {
        assert_eq!("temp".parse::<Bucket>(), Ok(Bucket::Temporary));
        assert_eq!("Permanent".parse::<Bucket>(), Ok(Bucket::Permanent));
        assert_eq!("aliases".parse::<Bucket>(), Ok(Bucket::Alias));
        assert!("trash".parse::<Bucket>().is_err());
    }

    #[test]
    fn short_index_uses_category_letter() {
        let mut m = TxtMsg::new("20240101000000".into(), "hi".into());
        m.index = 3;
        assert_eq!(m.short_index(), "T3");
        m.cat = Category::Permanent;
        assert_eq!(m.short_index(), "P3");
    }

    #[test]
    fn key_status_reports_expiry() {
        let now = Utc::now().timestamp();
        let mut config = Config {
            password: "abc".into(),
            key: "k".into(),
            key_starts: now,
            key_max_age: DEFAULT_KEY_MAX_AGE,
            msg_size_limit: 1024,
            temp_limit: 100,
            every_page_limit: 20,
            time_offset: "+0".into(),
        };
        let status = config.key_status();
        assert!(status.is_good);
        assert_eq!(status.max_age_days, 30);

        config.key_starts = now - DEFAULT_KEY_MAX_AGE - 10;
        assert!(!config.key_status().is_good);
    }
}
