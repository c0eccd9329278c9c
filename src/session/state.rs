use std::time::Instant;

use thiserror::Error;
use tracing::{debug, warn};

#[derive(Clone, Debug)]
pub struct Session {
    pub id: String,
    pub text: Vec<char>,
    pub position: usize,
    pub level: u32,
    /// Local stand-in created when the remote side could not start a session.
    pub synthetic: bool,
    pub started_at: Instant,
}

impl Session {
    pub fn new(id: impl Into<String>, text: &str, level: u32, synthetic: bool) -> Self {
        Self {
            id: id.into(),
            text: text.chars().collect(),
            position: 0,
            level,
            synthetic,
            started_at: Instant::now(),
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.text.len()
    }

    pub fn text_len(&self) -> usize {
        self.text.len()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Active,
    /// Text finished; the celebration runs until `until`, then `next_text`
    /// (or a freshly fetched one) replaces the current text.
    Completing {
        until: Instant,
        next_text: Option<String>,
    },
    Resetting,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no active session")]
    Inactive,
    #[error("cursor is at the end of the text")]
    AtEndOfText,
    #[error("a keystroke is already awaiting its result")]
    KeystrokeInFlight,
    #[error("result belongs to a superseded session or text")]
    StaleTicket,
}

/// Proof that a keystroke was admitted. Only a ticket from the current
/// session and text can be turned back into a state change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeystrokeTicket {
    epoch: u64,
    text_generation: u64,
}

#[derive(Debug)]
pub struct SessionMachine {
    phase: SessionPhase,
    session: Option<Session>,
    /// Bumped whenever session identity changes (start, reset).
    epoch: u64,
    /// Bumped whenever the text is replaced.
    text_generation: u64,
    in_flight: bool,
}

impl Default for SessionMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionMachine {
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::Idle,
            session: None,
            epoch: 0,
            text_generation: 0,
            in_flight: false,
        }
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_active(&self) -> bool {
        self.phase == SessionPhase::Active && self.session.is_some()
    }

    /// Idle/Resetting -> Active with a new session identity.
    pub fn activate(&mut self, session: Session) {
        self.epoch += 1;
        self.text_generation += 1;
        self.in_flight = false;
        debug!(
            session_id = %session.id,
            synthetic = session.synthetic,
            epoch = self.epoch,
            "session active"
        );
        self.session = Some(session);
        self.phase = SessionPhase::Active;
    }

    /// Active/Completing -> Resetting. Any outstanding keystroke or analysis
    /// result from before this point is stale afterwards.
    pub fn begin_reset(&mut self) {
        self.epoch += 1;
        self.in_flight = false;
        self.phase = SessionPhase::Resetting;
    }

    pub fn begin_keystroke(&mut self) -> Result<KeystrokeTicket, SessionError> {
        if self.phase != SessionPhase::Active {
            return Err(SessionError::Inactive);
        }
        let session = self.session.as_ref().ok_or(SessionError::Inactive)?;
        if session.is_at_end() {
            return Err(SessionError::AtEndOfText);
        }
        if self.in_flight {
            return Err(SessionError::KeystrokeInFlight);
        }
        self.in_flight = true;
        Ok(KeystrokeTicket {
            epoch: self.epoch,
            text_generation: self.text_generation,
        })
    }

    /// Adopt the authoritative cursor from a keystroke result.
    pub fn finish_keystroke(
        &mut self,
        ticket: KeystrokeTicket,
        position: usize,
    ) -> Result<(), SessionError> {
        if ticket.epoch != self.epoch || ticket.text_generation != self.text_generation {
            return Err(SessionError::StaleTicket);
        }
        self.in_flight = false;
        let session = self.session.as_mut().ok_or(SessionError::Inactive)?;
        if position < session.position {
            warn!(
                from = session.position,
                to = position,
                "remote moved the cursor backwards"
            );
        }
        if position > session.text.len() {
            warn!(position, len = session.text.len(), "remote cursor past end of text");
        }
        session.position = position.min(session.text.len());
        Ok(())
    }

    /// Active -> Completing.
    pub fn begin_completion(&mut self, until: Instant, next_text: Option<String>) {
        if self.phase == SessionPhase::Active {
            self.phase = SessionPhase::Completing { until, next_text };
        }
    }

    /// When the celebration deadline has passed, leave Completing and hand back
    /// the server-supplied next text, if any.
    pub fn take_due_completion(&mut self, now: Instant) -> Option<Option<String>> {
        let due = matches!(&self.phase, SessionPhase::Completing { until, .. } if now >= *until);
        if !due {
            return None;
        }
        match std::mem::replace(&mut self.phase, SessionPhase::Active) {
            SessionPhase::Completing { next_text, .. } => Some(next_text),
            _ => None,
        }
    }

    /// Swap in a new text and put the cursor back at the start.
    pub fn replace_text(&mut self, text: &str) {
        if let Some(session) = self.session.as_mut() {
            session.text = text.chars().collect();
            session.position = 0;
            self.text_generation += 1;
            self.in_flight = false;
            if matches!(self.phase, SessionPhase::Completing { .. }) {
                self.phase = SessionPhase::Active;
            }
        }
    }

    /// Level reported by the remote side at login.
    pub fn set_level(&mut self, level: u32) {
        if let Some(session) = self.session.as_mut() {
            session.level = level;
        }
    }
}
