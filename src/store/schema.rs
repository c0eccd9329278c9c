use serde::{Deserialize, Serialize};

const SCHEMA_VERSION: u32 = 1;

/// State kept on this machine between runs: who is signed in (and the
/// cookies that prove it to the server), the chosen theme and the last level
/// the remote side reported.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocalState {
    pub schema_version: u32,
    #[serde(default)]
    pub user_id: Option<i64>,
    /// `Cookie` header value for the signed-in identity.
    #[serde(default)]
    pub cookies: Option<String>,
    #[serde(default)]
    pub theme: Option<String>,
    /// Shown while no session could be started.
    #[serde(default = "default_level_hint", alias = "level")]
    pub level_hint: u32,
}

fn default_level_hint() -> u32 {
    1
}

impl Default for LocalState {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            user_id: None,
            cookies: None,
            theme: None,
            level_hint: default_level_hint(),
        }
    }
}

impl LocalState {
    /// Check if loaded data has a stale schema version and needs reset.
    pub fn needs_reset(&self) -> bool {
        self.schema_version != SCHEMA_VERSION
    }
}
