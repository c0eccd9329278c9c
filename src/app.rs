use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::KeyEvent;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

use crate::engine::analysis::{AnalysisReport, FocusSet};
use crate::engine::render::render_cells;
use crate::engine::stats::{self, StatsSnapshot};
use crate::exchange::wire::{KeystrokeReply, KeystrokeRequest};
use crate::exchange::{ExchangeClient, ExchangeError, ExchangeResult};
use crate::poller::{AnalysisDelivery, AnalysisInbox, AnalysisPoller};
use crate::session::input::{self, CaptureContext, InputAction};
use crate::session::keystroke::{KeystrokeResult, KeystrokeTimer};
use crate::session::state::{KeystrokeTicket, Session, SessionMachine, SessionPhase};
use crate::view::{PhaseLabel, Presenter, StatsView, ViewModel};

/// Texts used whenever the remote side cannot supply one.
pub const FALLBACK_TEXTS: &[&str] = &[
    "the quick brown fox jumps over the lazy dog",
    "practice makes progress one key at a time",
    "steady hands and calm eyes find every letter",
];

const LOCAL_SESSION_ID: &str = "local";

#[derive(Clone, Debug)]
pub struct TrainerSettings {
    /// Fetch analysis every this many session characters; 0 disables.
    pub analysis_interval: u64,
    /// How long the completion celebration plays before the next text.
    pub celebration: Duration,
    pub learn_mode: bool,
    /// Level shown for a local session when the remote side is unreachable.
    pub fallback_level: u32,
}

impl Default for TrainerSettings {
    fn default() -> Self {
        Self {
            analysis_interval: 20,
            celebration: Duration::from_millis(800),
            learn_mode: true,
            fallback_level: 1,
        }
    }
}

/// A keystroke that has been admitted and is waiting for its result.
#[derive(Debug)]
pub struct PendingKeystroke {
    ticket: KeystrokeTicket,
    position: usize,
    pub request: KeystrokeRequest,
}

/// The trainer context: owns the session, statistics and focus hints, and
/// drives every remote exchange through the injected client.
pub struct Trainer<C, P> {
    client: Arc<C>,
    presenter: P,
    settings: TrainerSettings,
    machine: SessionMachine,
    stats: StatsSnapshot,
    focus: FocusSet,
    report: Option<AnalysisReport>,
    timer: KeystrokeTimer,
    poller: AnalysisPoller,
    user_id: Option<i64>,
    overlay_open: bool,
    notice: Option<String>,
    rng: SmallRng,
}

impl<C, P> Trainer<C, P>
where
    C: ExchangeClient + 'static,
    P: Presenter,
{
    pub fn new(
        client: Arc<C>,
        presenter: P,
        settings: TrainerSettings,
        user_id: Option<i64>,
    ) -> (Self, AnalysisInbox) {
        let (poller, inbox) = AnalysisPoller::new(settings.analysis_interval);
        let trainer = Self {
            client,
            presenter,
            settings,
            machine: SessionMachine::new(),
            stats: StatsSnapshot::default(),
            focus: FocusSet::default(),
            report: None,
            timer: KeystrokeTimer::default(),
            poller,
            user_id,
            overlay_open: false,
            notice: None,
            rng: SmallRng::from_entropy(),
        };
        (trainer, inbox)
    }

    pub fn session(&self) -> Option<&Session> {
        self.machine.session()
    }

    pub fn phase(&self) -> &SessionPhase {
        self.machine.phase()
    }

    pub fn stats(&self) -> &StatsSnapshot {
        &self.stats
    }

    pub fn focus(&self) -> &FocusSet {
        &self.focus
    }

    pub fn report(&self) -> Option<&AnalysisReport> {
        self.report.as_ref()
    }

    pub fn user_id(&self) -> Option<i64> {
        self.user_id
    }

    pub fn learn_mode(&self) -> bool {
        self.settings.learn_mode
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn set_overlay_open(&mut self, open: bool) {
        self.overlay_open = open;
    }

    pub fn is_degraded(&self) -> bool {
        self.machine.session().is_some_and(|s| s.synthetic)
    }

    /// Idle -> Active. A failed start still ends up Active, on a local
    /// session with a fallback text.
    pub async fn start(&mut self) {
        self.focus = FocusSet::default();
        self.report = None;
        self.timer.clear();

        let session = match self.client.start_session(self.user_id).await {
            Ok(reply) => {
                info!(session_id = %reply.session_id, level = reply.level, "session started");
                self.stats = StatsSnapshot::for_session(reply.total_score);
                let mut session = Session::new(reply.session_id, &reply.text, reply.level, false);
                session.position = reply.position.min(session.text_len());
                session
            }
            Err(err) => {
                warn!(error = %err, "session start failed, continuing offline");
                self.stats = StatsSnapshot::default();
                let text = self.fallback_text();
                Session::new(LOCAL_SESSION_ID, text, self.settings.fallback_level, true)
            }
        };
        let synthetic = session.synthetic;
        self.machine.activate(session);
        self.render();

        if !synthetic {
            self.push_mode().await;
        }
    }

    /// Explicit user reset: drop counters and caches, then start over with
    /// the same identity.
    pub async fn reset(&mut self) {
        info!("reset requested");
        self.machine.begin_reset();
        self.stats = StatsSnapshot::default();
        self.notice = None;
        self.render();
        self.start().await;
    }

    /// Route a raw key press through the input filter.
    pub async fn handle_key(&mut self, key: &KeyEvent) {
        match input::capture(key, &self.capture_context()) {
            InputAction::Forward(ch) => self.process(ch).await,
            InputAction::RequestNewText => self.request_new_text().await,
            InputAction::Absorb => {}
        }
    }

    fn capture_context(&self) -> CaptureContext {
        let session = self.machine.session();
        CaptureContext {
            overlay_open: self.overlay_open,
            session_active: self.machine.is_active(),
            position: session.map_or(0, |s| s.position),
            text_len: session.map_or(0, |s| s.text_len()),
        }
    }

    /// Submit one character and apply its result. Round trips are serialized:
    /// a character arriving while another is outstanding is refused.
    pub async fn process(&mut self, ch: char) {
        let Some(pending) = self.admit(ch) else {
            return;
        };
        let outcome = self.client.keystroke(&pending.request).await;
        self.complete(pending, outcome);
    }

    /// First half of [`process`](Self::process): capture timing and reserve the
    /// session's single keystroke slot.
    pub fn admit(&mut self, ch: char) -> Option<PendingKeystroke> {
        let ticket = match self.machine.begin_keystroke() {
            Ok(ticket) => ticket,
            Err(err) => {
                debug!(ch = %ch, reason = %err, "keystroke not admitted");
                return None;
            }
        };
        let session = self.machine.session()?;
        let event = self.timer.stamp(ch, Instant::now());
        debug!(
            ch = %ch,
            since_last_ms = event.time_since_last.map(|d| d.as_millis() as u64),
            "keystroke"
        );
        Some(PendingKeystroke {
            ticket,
            position: session.position,
            request: event.to_request(&session.id),
        })
    }

    /// Second half of [`process`](Self::process): merge the reply, or a
    /// synthesized fallback when the request failed.
    pub fn complete(&mut self, pending: PendingKeystroke, outcome: ExchangeResult<KeystrokeReply>) {
        let result = match outcome {
            Ok(reply) => KeystrokeResult::from_reply(reply, pending.position, &self.stats),
            Err(err) => {
                warn!(error = %err, "keystroke submission failed, using fallback result");
                KeystrokeResult::fallback(pending.position, &self.stats)
            }
        };
        self.apply_result(pending.ticket, result);
    }

    fn apply_result(&mut self, ticket: KeystrokeTicket, result: KeystrokeResult) {
        if let Err(err) = self.machine.finish_keystroke(ticket, result.position) {
            debug!(reason = %err, "dropping keystroke result");
            return;
        }
        let elapsed = self
            .machine
            .session()
            .map_or(Duration::ZERO, |s| s.started_at.elapsed());
        self.stats.apply(&result, elapsed);
        self.notice = result.hint.clone();
        self.render();

        if result.is_complete {
            self.begin_completion(result.new_text);
        }

        if self.poller.is_due(self.stats.session_chars) {
            self.fetch_analysis();
        }
    }

    fn begin_completion(&mut self, next_text: Option<String>) {
        info!(session_chars = self.stats.session_chars, "text complete");
        self.presenter.celebrate();
        self.machine
            .begin_completion(Instant::now() + self.settings.celebration, next_text);
        self.render();
    }

    /// Advance time-driven transitions. Finishes a completion once its
    /// celebration delay has elapsed.
    pub async fn tick(&mut self, now: Instant) {
        let Some(next_text) = self.machine.take_due_completion(now) else {
            return;
        };
        match next_text {
            Some(text) => {
                self.machine.replace_text(&text);
                self.timer.clear();
                self.render();
            }
            None => self.request_new_text().await,
        }
        self.fetch_analysis();
    }

    /// Replace the current text with a fresh one. Never leaves the trainer
    /// without text: a failed fetch substitutes a fallback.
    pub async fn request_new_text(&mut self) {
        let Some(session_id) = self.machine.session().map(|s| s.id.clone()) else {
            return;
        };
        let text = match self.client.new_text(&session_id).await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => {
                warn!("remote returned an empty text, using fallback");
                self.fallback_text().to_string()
            }
            Err(err) => {
                warn!(error = %err, "new text request failed, using fallback");
                self.fallback_text().to_string()
            }
        };
        self.machine.replace_text(&text);
        self.timer.clear();
        self.render();
    }

    fn fetch_analysis(&mut self) {
        if let Some(session) = self.machine.session() {
            self.poller
                .fetch(&self.client, &session.id, self.machine.epoch());
        }
    }

    /// Apply a delivered analysis report. Only the focus set and the stored
    /// report change; replies for a replaced session are dropped.
    pub fn apply_analysis(&mut self, delivery: AnalysisDelivery) {
        if delivery.epoch != self.machine.epoch() {
            debug!(
                epoch = delivery.epoch,
                current = self.machine.epoch(),
                "dropping stale analysis"
            );
            return;
        }
        match delivery.outcome {
            Ok(report) => {
                self.focus = FocusSet::from_report(&report);
                debug!(focus_keys = self.focus.len(), "analysis applied");
                self.report = Some(report);
                self.render();
            }
            Err(err) => warn!(error = %err, "analysis fetch failed"),
        }
    }

    /// Establish identity and start a new session under it.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<i64, ExchangeError> {
        match self.client.login(username, password).await {
            Ok(reply) => {
                info!(user_id = reply.user_id, "logged in");
                self.user_id = Some(reply.user_id);
                self.notice = Some(format!("Logged in as {username}"));
                self.start().await;
                // A fresh remote session already carries the account's standing
                if self.is_degraded() {
                    if let Some(level) = reply.level {
                        self.machine.set_level(level);
                    }
                    if let Some(total_score) = reply.total_score {
                        self.stats.score = total_score;
                    }
                    self.render();
                }
                Ok(reply.user_id)
            }
            Err(err) => {
                warn!(error = %err, "login failed");
                self.notice = Some(format!("Login failed: {err}"));
                self.render();
                Err(err)
            }
        }
    }

    /// Create an account, then log in with it.
    pub async fn register(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<i64, ExchangeError> {
        if let Err(err) = self.client.register(username, password).await {
            warn!(error = %err, "registration failed");
            self.notice = Some(format!("Registration failed: {err}"));
            self.render();
            return Err(err);
        }
        self.login(username, password).await
    }

    /// Startup sign-in: log in (registering first when asked), which starts
    /// the session. If that fails the notice stays up and the session starts
    /// under whatever identity the trainer already had.
    pub async fn start_signed_in(&mut self, username: &str, password: &str, register: bool) -> bool {
        let signed_in = if register {
            self.register(username, password).await
        } else {
            self.login(username, password).await
        };
        match signed_in {
            Ok(_) => true,
            Err(err) => {
                warn!(error = %err, "sign-in failed, starting without it");
                self.start().await;
                false
            }
        }
    }

    /// Forget the identity and continue anonymously.
    pub async fn logout(&mut self) {
        info!("logged out");
        self.user_id = None;
        self.client.clear_identity_cookies();
        self.notice = Some("Logged out".to_string());
        self.start().await;
    }

    pub async fn save_progress(&mut self) -> bool {
        let Some(user_id) = self.user_id else {
            self.notice = Some("Log in to save progress".to_string());
            self.render();
            return false;
        };
        let saved = match self.client.save_progress(user_id).await {
            Ok(()) => {
                self.notice = Some("Progress saved".to_string());
                true
            }
            Err(err) => {
                warn!(error = %err, "save failed");
                self.notice = Some("Save failed".to_string());
                false
            }
        };
        self.render();
        saved
    }

    /// Flip between learn mode and free mode.
    pub async fn toggle_mode(&mut self) {
        self.settings.learn_mode = !self.settings.learn_mode;
        self.push_mode().await;
        self.notice = Some(if self.settings.learn_mode {
            "Learn mode: wrong keys block".to_string()
        } else {
            "Free mode: wrong keys advance".to_string()
        });
        self.render();
    }

    async fn push_mode(&mut self) {
        if let Err(err) = self.client.set_mode(self.settings.learn_mode).await {
            warn!(error = %err, "mode change failed");
        }
    }

    fn fallback_text(&mut self) -> &'static str {
        FALLBACK_TEXTS
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(FALLBACK_TEXTS[0])
    }

    pub fn view_model(&self) -> ViewModel {
        let session = self.machine.session();
        let (cells, position, progress, session_level) = match session {
            Some(s) => (
                render_cells(&s.text, s.position, &self.focus),
                s.position,
                stats::progress(s.position, s.text_len()),
                s.level,
            ),
            None => (Vec::new(), 0, 0.0, 1),
        };
        let phase = match self.machine.phase() {
            SessionPhase::Idle => PhaseLabel::Idle,
            SessionPhase::Active => PhaseLabel::Active,
            SessionPhase::Completing { .. } => PhaseLabel::Completing,
            SessionPhase::Resetting => PhaseLabel::Resetting,
        };
        let (focus_areas, insights) = match &self.report {
            Some(report) => (report.focus_areas.clone(), report.insights.clone()),
            None => (Vec::new(), Vec::new()),
        };
        ViewModel {
            cells,
            position,
            progress,
            stats: StatsView {
                wpm: self.stats.wpm,
                accuracy: self.stats.accuracy,
                score: self.stats.score,
                streak: self.stats.streak,
                max_streak: self.stats.max_streak,
                combo: self.stats.combo,
                errors: self.stats.errors,
                level: stats::level(session_level, self.stats.score),
                session_chars: self.stats.session_chars,
            },
            phase,
            focus_keys: self.focus.iter().collect(),
            focus_areas,
            insights,
            notice: self.notice.clone(),
            degraded: self.is_degraded(),
            learn_mode: self.settings.learn_mode,
            signed_in: self.user_id.is_some(),
        }
    }

    fn render(&mut self) {
        let view = self.view_model();
        self.presenter.render(&view);
    }
}
