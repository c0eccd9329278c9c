use std::fs::File;
use std::io::{self, BufRead};
use std::panic;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::event::{
    KeyEvent, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{error, info, warn};

use tapcoach::app::Trainer;
use tapcoach::config::Config;
use tapcoach::event::{AppEvent, EventHandler};
use tapcoach::exchange::ExchangeClient;
use tapcoach::poller::AnalysisInbox;
use tapcoach::store::json_store::JsonStore;
use tapcoach::store::schema::LocalState;
use tapcoach::ui::keymap::{self, Command as KeyCommand};
use tapcoach::ui::screen::{Overlay, ScreenPresenter};
use tapcoach::ui::theme::Theme;

const PASSWORD_ENV: &str = "TAPCOACH_PASSWORD";

type Screen = Terminal<CrosstermBackend<io::Stdout>>;

#[derive(Parser)]
#[command(name = "tapcoach", version, about = "Terminal typing trainer with server-side scoring")]
struct Cli {
    #[arg(short, long, help = "Server base URL")]
    server: Option<String>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, help = "Let wrong keys advance the cursor")]
    free_mode: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Log in, then start training under that account
    Login { username: String },
    /// Create an account, log in and start training
    Register { username: String },
    /// Forget the stored account and exit
    Logout,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, config_error) = Config::load_or_init();
    if let Some(server) = cli.server {
        config.server_url = server;
    }
    if cli.free_mode {
        config.learn_mode = false;
    }

    let store = JsonStore::new().context("opening local state")?;
    init_logging(&store, &config.log_level)?;
    if let Some(err) = config_error {
        warn!(error = %format!("{err:#}"), "config unusable, using defaults");
    }

    if let Some(Command::Logout) = cli.command {
        store.clear_identity()?;
        println!("Logged out.");
        return Ok(());
    }

    let local = store.load_local_state();
    let theme_name = cli
        .theme
        .or_else(|| local.theme.clone())
        .unwrap_or_else(|| config.theme.clone());
    let theme = Theme::load(&theme_name).unwrap_or_else(|| {
        warn!(theme = %theme_name, "unknown theme, using default");
        Theme::default()
    });

    let credentials = match &cli.command {
        Some(Command::Login { username }) => Some((username.clone(), read_password()?, false)),
        Some(Command::Register { username }) => Some((username.clone(), read_password()?, true)),
        _ => None,
    };

    let client = Arc::new(build_client(&config)?);

    // The server only knows the user through its session cookie, so an id
    // without saved cookies would claim an identity the server cannot see.
    let user_id = match (local.user_id, local.cookies.as_deref()) {
        (Some(user_id), Some(cookies)) => {
            client.restore_identity_cookies(cookies);
            Some(user_id)
        }
        (Some(user_id), None) => {
            warn!(user_id, "stored identity has no session cookies, starting anonymous");
            None
        }
        (None, _) => None,
    };

    let presenter = ScreenPresenter::new(theme, Duration::from_millis(config.celebration_ms));
    let (mut trainer, mut inbox) = Trainer::new(
        client,
        presenter,
        config.trainer_settings(local.level_hint),
        user_id,
    );

    match credentials {
        Some((username, password, register)) => {
            trainer.start_signed_in(&username, &password, register).await;
        }
        None => trainer.start().await,
    }
    persist_local_state(&store, &trainer);
    info!(server = %config.server_url, "trainer ready");

    // Restore the terminal even if something panics mid-frame
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    // Release events are filtered out by the input layer; without the flag
    // every event already reports as a press.
    let keyboard_enhanced = execute!(
        io::stdout(),
        PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
    )
    .is_ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut events = EventHandler::new(Duration::from_millis(50));

    let result = run_app(&mut terminal, &mut trainer, &mut inbox, &mut events, &store).await;

    if keyboard_enhanced {
        let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    persist_local_state(&store, &trainer);

    if let Err(err) = result {
        error!(error = %err, "event loop failed");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

/// Log to a file under the data directory; the terminal belongs to the UI.
fn init_logging(store: &JsonStore, level: &str) -> Result<()> {
    let log_path = store.base_dir().join("tapcoach.log");
    let file = File::create(&log_path)
        .with_context(|| format!("creating log file {}", log_path.display()))?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("tapcoach={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .init();

    Ok(())
}

fn read_password() -> Result<String> {
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        return Ok(password);
    }
    eprint!("Password: ");
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    anyhow::ensure!(!password.is_empty(), "empty password");
    Ok(password)
}

#[cfg(feature = "network")]
fn build_client(config: &Config) -> Result<tapcoach::exchange::http::HttpExchange> {
    tapcoach::exchange::http::HttpExchange::new(&config.server_url, config.request_timeout())
        .context("building HTTP client")
}

#[cfg(not(feature = "network"))]
fn build_client(_config: &Config) -> Result<tapcoach::exchange::offline::OfflineExchange> {
    Ok(tapcoach::exchange::offline::OfflineExchange)
}

async fn run_app<C>(
    terminal: &mut Screen,
    trainer: &mut Trainer<C, ScreenPresenter>,
    inbox: &mut AnalysisInbox,
    events: &mut EventHandler,
    store: &JsonStore,
) -> Result<()>
where
    C: ExchangeClient + 'static,
{
    loop {
        terminal.draw(|frame| trainer.presenter().draw(frame))?;

        tokio::select! {
            event = events.next() => match event? {
                AppEvent::Key(key) => {
                    if handle_key(trainer, key, store).await {
                        return Ok(());
                    }
                    // Ticks only arrive while the keyboard is quiet
                    trainer.tick(Instant::now()).await;
                }
                AppEvent::Tick => trainer.tick(Instant::now()).await,
                AppEvent::Resize(_, _) => {}
            },
            Some(delivery) = inbox.recv() => trainer.apply_analysis(delivery),
        }
    }
}

/// Global bindings first; everything else goes to the trainer's input
/// filter. Returns true when the user asked to quit.
async fn handle_key<C>(
    trainer: &mut Trainer<C, ScreenPresenter>,
    key: KeyEvent,
    store: &JsonStore,
) -> bool
where
    C: ExchangeClient + 'static,
{
    let Some(command) = keymap::command_for(&key, trainer.presenter().overlay()) else {
        trainer.handle_key(&key).await;
        return false;
    };

    match command {
        KeyCommand::Quit => return true,
        KeyCommand::Reset => trainer.reset().await,
        KeyCommand::NewText => trainer.request_new_text().await,
        KeyCommand::Save => {
            trainer.save_progress().await;
        }
        KeyCommand::ToggleMode => trainer.toggle_mode().await,
        KeyCommand::Logout => {
            trainer.logout().await;
            persist_local_state(store, trainer);
        }
        KeyCommand::ToggleHelp => toggle_overlay(trainer, Overlay::Help),
        KeyCommand::ToggleInsights => toggle_overlay(trainer, Overlay::Insights),
        KeyCommand::NextTheme => {
            let next = trainer.presenter().theme().next_builtin();
            info!(theme = %next.name, "theme switched");
            trainer.presenter_mut().set_theme(next);
            persist_local_state(store, trainer);
        }
        KeyCommand::CloseOverlay => {
            trainer.presenter_mut().close_overlay();
            trainer.set_overlay_open(false);
        }
    }
    false
}

fn toggle_overlay<C>(trainer: &mut Trainer<C, ScreenPresenter>, overlay: Overlay)
where
    C: ExchangeClient + 'static,
{
    trainer.presenter_mut().toggle_overlay(overlay);
    let open = trainer.presenter().overlay() != Overlay::None;
    trainer.set_overlay_open(open);
}

fn persist_local_state<C>(store: &JsonStore, trainer: &Trainer<C, ScreenPresenter>)
where
    C: ExchangeClient + 'static,
{
    let user_id = trainer.user_id();
    let state = LocalState {
        user_id,
        cookies: user_id.and_then(|_| trainer.client().identity_cookies()),
        theme: Some(trainer.presenter().theme().name.clone()),
        level_hint: trainer.view_model().stats.level,
        ..LocalState::default()
    };
    if let Err(err) = store.save_local_state(&state) {
        warn!(error = %err, "could not save local state");
    }
}
