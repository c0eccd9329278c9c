#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use tapcoach::app::{Trainer, TrainerSettings};
use tapcoach::engine::analysis::{AnalysisReport, FocusArea, FocusKind, Priority};
use tapcoach::exchange::wire::{KeystrokeReply, KeystrokeRequest, LoginReply, StartSessionReply};
use tapcoach::exchange::{ExchangeClient, ExchangeError, ExchangeResult};
use tapcoach::poller::AnalysisInbox;
use tapcoach::view::{Presenter, ViewModel};

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    StartSession(Option<i64>),
    Keystroke { session_id: String, key: String },
    NewText(String),
    Analysis(String),
    SaveProgress(i64),
    Login(String),
    Register(String),
    SetMode(bool),
}

/// Exchange client that replays queued replies. An empty queue answers with
/// a transport failure, the same as an unreachable server.
#[derive(Default)]
pub struct ScriptedExchange {
    starts: Mutex<VecDeque<ExchangeResult<StartSessionReply>>>,
    keystrokes: Mutex<VecDeque<ExchangeResult<KeystrokeReply>>>,
    texts: Mutex<VecDeque<ExchangeResult<String>>>,
    analyses: Mutex<VecDeque<ExchangeResult<AnalysisReport>>>,
    reject_accounts: AtomicBool,
    cookies: Mutex<Option<String>>,
    calls: Mutex<Vec<Call>>,
}

pub fn unreachable(operation: &'static str) -> ExchangeError {
    ExchangeError::Transport {
        operation,
        message: "connection refused".into(),
    }
}

impl ScriptedExchange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(self, session_id: &str, text: &str) -> Self {
        self.push_start(Ok(StartSessionReply {
            session_id: session_id.into(),
            text: text.into(),
            level: 1,
            position: 0,
            total_score: 0,
        }));
        self
    }

    pub fn push_start(&self, reply: ExchangeResult<StartSessionReply>) {
        self.starts.lock().unwrap().push_back(reply);
    }

    pub fn push_keystroke(&self, reply: ExchangeResult<KeystrokeReply>) {
        self.keystrokes.lock().unwrap().push_back(reply);
    }

    pub fn push_text(&self, reply: ExchangeResult<String>) {
        self.texts.lock().unwrap().push_back(reply);
    }

    pub fn push_analysis(&self, reply: ExchangeResult<AnalysisReport>) {
        self.analyses.lock().unwrap().push_back(reply);
    }

    pub fn reject_accounts(&self) {
        self.reject_accounts.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn next<T>(queue: &Mutex<VecDeque<ExchangeResult<T>>>, operation: &'static str) -> ExchangeResult<T> {
        queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(unreachable(operation)))
    }

    fn account_result(&self, operation: &'static str) -> ExchangeResult<()> {
        if self.reject_accounts.load(Ordering::SeqCst) {
            Err(ExchangeError::Status {
                operation,
                status: 401,
                message: "Invalid credentials".into(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ExchangeClient for ScriptedExchange {
    async fn start_session(&self, user_id: Option<i64>) -> ExchangeResult<StartSessionReply> {
        self.record(Call::StartSession(user_id));
        Self::next(&self.starts, "start session")
    }

    async fn keystroke(&self, request: &KeystrokeRequest) -> ExchangeResult<KeystrokeReply> {
        self.record(Call::Keystroke {
            session_id: request.session_id.clone(),
            key: request.key.clone(),
        });
        Self::next(&self.keystrokes, "keystroke")
    }

    async fn new_text(&self, session_id: &str) -> ExchangeResult<String> {
        self.record(Call::NewText(session_id.into()));
        Self::next(&self.texts, "new text")
    }

    async fn analysis(&self, session_id: &str) -> ExchangeResult<AnalysisReport> {
        self.record(Call::Analysis(session_id.into()));
        Self::next(&self.analyses, "analysis")
    }

    async fn save_progress(&self, user_id: i64) -> ExchangeResult<()> {
        self.record(Call::SaveProgress(user_id));
        self.account_result("save progress")
    }

    async fn login(&self, username: &str, _password: &str) -> ExchangeResult<LoginReply> {
        self.record(Call::Login(username.into()));
        self.account_result("login")?;
        Ok(LoginReply {
            user_id: 7,
            level: Some(2),
            total_score: Some(1500),
        })
    }

    async fn register(&self, username: &str, _password: &str) -> ExchangeResult<()> {
        self.record(Call::Register(username.into()));
        self.account_result("register")
    }

    async fn set_mode(&self, learn_mode: bool) -> ExchangeResult<()> {
        self.record(Call::SetMode(learn_mode));
        Ok(())
    }

    fn identity_cookies(&self) -> Option<String> {
        self.cookies.lock().unwrap().clone()
    }

    fn restore_identity_cookies(&self, cookies: &str) {
        *self.cookies.lock().unwrap() = Some(cookies.to_string());
    }

    fn clear_identity_cookies(&self) {
        *self.cookies.lock().unwrap() = None;
    }
}

/// Presenter stub that keeps every view it was asked to render.
#[derive(Default)]
pub struct RecordingPresenter {
    pub views: Vec<ViewModel>,
    pub celebrations: usize,
}

impl RecordingPresenter {
    pub fn last(&self) -> &ViewModel {
        self.views.last().expect("nothing rendered yet")
    }
}

impl Presenter for RecordingPresenter {
    fn render(&mut self, view: &ViewModel) {
        self.views.push(view.clone());
    }

    fn celebrate(&mut self) {
        self.celebrations += 1;
    }
}

pub type TestTrainer = Trainer<ScriptedExchange, RecordingPresenter>;

/// Settings with no celebration delay so a single tick finishes completion.
pub fn instant_settings() -> TrainerSettings {
    TrainerSettings {
        celebration: Duration::ZERO,
        ..TrainerSettings::default()
    }
}

pub fn trainer(client: ScriptedExchange) -> (TestTrainer, AnalysisInbox, Arc<ScriptedExchange>) {
    trainer_with(client, instant_settings(), None)
}

pub fn trainer_with(
    client: ScriptedExchange,
    settings: TrainerSettings,
    user_id: Option<i64>,
) -> (TestTrainer, AnalysisInbox, Arc<ScriptedExchange>) {
    let client = Arc::new(client);
    let (trainer, inbox) = Trainer::new(
        Arc::clone(&client),
        RecordingPresenter::default(),
        settings,
        user_id,
    );
    (trainer, inbox, client)
}

pub fn key(ch: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE)
}

pub fn named(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

pub fn release(ch: char) -> KeyEvent {
    KeyEvent::new_with_kind(KeyCode::Char(ch), KeyModifiers::NONE, KeyEventKind::Release)
}

pub fn correct(position: usize, streak: u32, score: i64) -> KeystrokeReply {
    KeystrokeReply {
        correct: true,
        position: Some(position),
        streak: Some(streak),
        max_streak: Some(streak),
        combo_multiplier: Some(1.0),
        score: Some(score),
        errors: Some(0),
        ..KeystrokeReply::default()
    }
}

pub fn wrong(position: usize, errors: u32, score: i64) -> KeystrokeReply {
    KeystrokeReply {
        correct: false,
        position: Some(position),
        streak: Some(0),
        combo_multiplier: Some(1.0),
        score: Some(score),
        errors: Some(errors),
        ..KeystrokeReply::default()
    }
}

pub fn report_with_error_keys(keys: &[&str]) -> AnalysisReport {
    AnalysisReport {
        focus_areas: vec![FocusArea {
            kind: FocusKind::HighErrorKeys,
            items: keys.iter().map(|k| k.to_string()).collect(),
            priority: Priority::High,
        }],
        insights: vec!["Watch your ring finger".into()],
        ..AnalysisReport::default()
    }
}
