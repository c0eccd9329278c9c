use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize)]
pub struct StartSessionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StartSessionReply {
    pub session_id: String,
    pub text: String,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub position: usize,
    #[serde(default)]
    pub total_score: i64,
}

fn default_level() -> u32 {
    1
}

#[derive(Clone, Debug, Serialize)]
pub struct KeystrokeRequest {
    pub session_id: String,
    pub key: String,
    /// Seconds since the Unix epoch.
    pub timestamp: f64,
}

/// Raw keystroke reply. A learn-mode reply for a wrong key only carries
/// `correct`, `blocked`, `expected_char` and `message`, so everything that
/// a blocked reply leaves out is optional here.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct KeystrokeReply {
    pub correct: bool,
    #[serde(default)]
    pub blocked: bool,
    pub position: Option<usize>,
    pub streak: Option<u32>,
    pub max_streak: Option<u32>,
    pub combo_multiplier: Option<f64>,
    pub score: Option<i64>,
    pub errors: Option<u32>,
    #[serde(default)]
    pub is_complete: bool,
    pub new_text: Option<String>,
    pub expected_char: Option<String>,
    pub message: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewTextReply {
    pub text: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct CredentialsRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LoginReply {
    pub user_id: i64,
    pub level: Option<u32>,
    pub total_score: Option<i64>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SaveProgressRequest {
    pub user_id: i64,
}

#[derive(Clone, Debug, Serialize)]
pub struct SetModeRequest {
    pub learn_mode: bool,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Error body the remote service attaches to non-success statuses.
#[derive(Clone, Debug, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
