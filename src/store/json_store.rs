use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Serialize, de::DeserializeOwned};

use crate::store::schema::LocalState;

const LOCAL_STATE_FILE: &str = "local_state.json";

pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tapcoach");
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    fn load<T: DeserializeOwned + Default>(&self, name: &str) -> T {
        let path = self.file_path(name);
        if path.exists() {
            match fs::read_to_string(&path) {
                Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
                Err(_) => T::default(),
            }
        } else {
            T::default()
        }
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let path = self.file_path(name);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    /// Load local state. A missing, corrupt or outdated file yields defaults
    /// (anonymous, no theme preference).
    pub fn load_local_state(&self) -> LocalState {
        let state: LocalState = self.load(LOCAL_STATE_FILE);
        if state.needs_reset() {
            LocalState::default()
        } else {
            state
        }
    }

    pub fn save_local_state(&self, state: &LocalState) -> Result<()> {
        self.save(LOCAL_STATE_FILE, state)
    }

    /// Drop the stored identity and its cookies, keeping the other
    /// preferences.
    pub fn clear_identity(&self) -> Result<()> {
        let mut state = self.load_local_state();
        state.user_id = None;
        state.cookies = None;
        self.save_local_state(&state)
    }
}
