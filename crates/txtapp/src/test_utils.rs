use crate::model::Config;
use crate::store::TxtStore;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestEnv {
    // We keep _temp_dir to ensure the directory is not dropped until the test is done
    pub _temp_dir: TempDir,
    pub store: TxtStore,
    pub root: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        let store = TxtStore::open_in(&root).expect("failed to open store");
        Self {
            _temp_dir: temp_dir,
            store,
            root,
        }
    }

    /// A store whose temporary bucket holds at most `limit` messages.
    pub fn with_temp_limit(limit: i64) -> Self {
        let mut env = Self::new();
        env.edit_config(|c| c.temp_limit = limit);
        env
    }

    /// Writes the config without the range checks `update_config` applies.
    pub fn edit_config(&mut self, f: impl FnOnce(&mut Config)) {
        let mut config = self.store.config().clone();
        f(&mut config);
        self.store
            .save_config(config)
            .expect("failed to save config");
    }

    /// Closes the store and opens the same file again.
    pub fn reopen(self) -> Self {
        let Self {
            _temp_dir,
            store,
            root,
        } = self;
        drop(store);
        let store = TxtStore::open_in(&root).expect("failed to reopen store");
        Self {
            _temp_dir,
            store,
            root,
        }
    }

    /// Short-index token to message text, newest first, for one category.
    pub fn listing(&self, bucket: crate::model::Bucket) -> Vec<(String, String)> {
        self.store
            .paginate(bucket, "", i64::MAX)
            .expect("failed to list")
            .into_iter()
            .map(|m| (m.short_index(), m.msg))
            .collect()
    }
}
