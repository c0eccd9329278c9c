mod common;

use std::time::Instant;

use pretty_assertions::assert_eq;

use tapcoach::app::{FALLBACK_TEXTS, TrainerSettings};
use tapcoach::exchange::ExchangeClient;
use tapcoach::exchange::wire::{KeystrokeReply, StartSessionReply};
use tapcoach::session::state::SessionPhase;
use tapcoach::view::PhaseLabel;

use common::{Call, ScriptedExchange, correct, instant_settings, key, trainer, trainer_with, unreachable};

fn text_of(trainer: &common::TestTrainer) -> String {
    trainer
        .session()
        .map(|s| s.text.iter().collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn unreachable_server_starts_a_local_session() {
    let settings = TrainerSettings {
        fallback_level: 3,
        ..instant_settings()
    };
    let (mut trainer, _inbox, client) = trainer_with(ScriptedExchange::new(), settings, None);
    trainer.start().await;

    let session = trainer.session().expect("session exists");
    assert!(session.synthetic);
    assert_eq!(session.level, 3);
    assert!(FALLBACK_TEXTS.contains(&text_of(&trainer).as_str()));
    assert_eq!(trainer.phase(), &SessionPhase::Active);
    assert!(trainer.is_degraded());
    assert!(trainer.presenter().last().degraded);
    // No mode push for a session the server does not know about
    assert_eq!(client.count(|c| matches!(c, Call::SetMode(_))), 0);
}

#[tokio::test]
async fn local_session_still_accepts_typing() {
    let (mut trainer, _inbox, client) = trainer(ScriptedExchange::new());
    trainer.start().await;

    trainer.handle_key(&key('t')).await;

    assert_eq!(client.count(|c| matches!(c, Call::Keystroke { .. })), 1);
    assert_eq!(trainer.stats().errors, 1);
    assert_eq!(trainer.session().map(|s| s.position), Some(0));
}

#[tokio::test]
async fn start_adopts_the_reply() {
    let client = ScriptedExchange::new();
    client.push_start(Ok(StartSessionReply {
        session_id: "s9".into(),
        text: "resume here".into(),
        level: 2,
        position: 4,
        total_score: 2500,
    }));
    let (mut trainer, _inbox, client) = trainer(client);
    trainer.start().await;

    let session = trainer.session().expect("session exists");
    assert_eq!(session.id, "s9");
    assert_eq!(session.position, 4);
    assert!(!session.synthetic);
    assert_eq!(trainer.stats().score, 2500);
    // 2500 points is level 3 even though the session reports level 2
    assert_eq!(trainer.presenter().last().stats.level, 3);
    assert_eq!(
        client.calls(),
        vec![Call::StartSession(None), Call::SetMode(true)]
    );
}

#[tokio::test]
async fn completion_adopts_inline_text_without_a_fetch() {
    let (mut trainer, _inbox, client) = trainer(ScriptedExchange::new().with_session("s1", "a"));
    trainer.start().await;
    client.push_keystroke(Ok(KeystrokeReply {
        is_complete: true,
        new_text: Some("next one".into()),
        ..correct(1, 1, 10)
    }));

    trainer.handle_key(&key('a')).await;
    assert_eq!(trainer.presenter().last().phase, PhaseLabel::Completing);

    trainer.tick(Instant::now()).await;

    assert_eq!(text_of(&trainer), "next one");
    assert_eq!(trainer.session().map(|s| s.position), Some(0));
    assert_eq!(client.count(|c| matches!(c, Call::NewText(_))), 0);
}

#[tokio::test]
async fn completion_waits_for_the_celebration() {
    let (mut trainer, _inbox, client) = trainer_with(
        ScriptedExchange::new().with_session("s1", "a"),
        TrainerSettings::default(),
        None,
    );
    trainer.start().await;
    client.push_keystroke(Ok(KeystrokeReply {
        is_complete: true,
        new_text: Some("bb".into()),
        ..correct(1, 1, 10)
    }));

    trainer.handle_key(&key('a')).await;
    trainer.tick(Instant::now()).await;
    assert!(matches!(trainer.phase(), SessionPhase::Completing { .. }));
    assert_eq!(text_of(&trainer), "a");

    let later = Instant::now() + TrainerSettings::default().celebration;
    trainer.tick(later).await;
    assert_eq!(trainer.phase(), &SessionPhase::Active);
    assert_eq!(text_of(&trainer), "bb");
}

#[tokio::test]
async fn completion_replaces_the_text_exactly_once() {
    let (mut trainer, _inbox, client) = trainer(ScriptedExchange::new().with_session("s1", "a"));
    trainer.start().await;
    client.push_keystroke(Ok(KeystrokeReply {
        is_complete: true,
        ..correct(1, 1, 10)
    }));
    client.push_text(Ok("second".into()));
    client.push_text(Ok("third".into()));

    trainer.handle_key(&key('a')).await;
    trainer.tick(Instant::now()).await;
    trainer.tick(Instant::now()).await;

    assert_eq!(text_of(&trainer), "second");
    assert_eq!(client.count(|c| matches!(c, Call::NewText(_))), 1);
}

#[tokio::test]
async fn failed_or_empty_new_text_falls_back() {
    let (mut trainer, _inbox, client) = trainer(ScriptedExchange::new().with_session("s1", "cat"));
    trainer.start().await;

    trainer.request_new_text().await;
    assert!(FALLBACK_TEXTS.contains(&text_of(&trainer).as_str()));

    client.push_text(Ok(String::new()));
    trainer.request_new_text().await;
    assert!(FALLBACK_TEXTS.contains(&text_of(&trainer).as_str()));
    assert_eq!(trainer.session().map(|s| s.position), Some(0));
}

#[tokio::test]
async fn reset_clears_counters_and_starts_over() {
    let client = ScriptedExchange::new()
        .with_session("s1", "cat")
        .with_session("s2", "dog");
    let (mut trainer, _inbox, client) = trainer(client);
    trainer.start().await;
    client.push_keystroke(Ok(correct(1, 1, 10)));
    trainer.handle_key(&key('c')).await;

    trainer.reset().await;

    assert_eq!(trainer.session().map(|s| s.id.as_str()), Some("s2"));
    assert_eq!(trainer.stats().session_chars, 0);
    assert_eq!(trainer.stats().max_streak, 0);
    assert!(trainer.focus().is_empty());
    assert!(
        trainer
            .presenter()
            .views
            .iter()
            .any(|v| v.phase == PhaseLabel::Resetting)
    );
    assert_eq!(client.count(|c| matches!(c, Call::StartSession(_))), 2);
}

#[tokio::test]
async fn login_starts_a_session_under_the_new_identity() {
    let client = ScriptedExchange::new()
        .with_session("anon", "cat")
        .with_session("mine", "dog");
    let (mut trainer, _inbox, client) = trainer(client);
    trainer.start().await;

    let user_id = trainer.login("ada", "secret").await.expect("login ok");

    assert_eq!(user_id, 7);
    assert_eq!(trainer.user_id(), Some(7));
    assert_eq!(trainer.session().map(|s| s.id.as_str()), Some("mine"));
    assert_eq!(trainer.notice(), Some("Logged in as ada"));
    assert!(client.calls().contains(&Call::StartSession(Some(7))));
    assert!(trainer.presenter().last().signed_in);
    // The new session's own standing wins over the login reply
    assert_eq!(trainer.stats().score, 0);
    assert_eq!(trainer.session().map(|s| s.level), Some(1));
}

#[tokio::test]
async fn login_standing_fills_in_for_an_unreachable_session() {
    let (mut trainer, _inbox, _client) = trainer(ScriptedExchange::new().with_session("anon", "cat"));
    trainer.start().await;

    trainer.login("ada", "secret").await.expect("login ok");

    assert!(trainer.is_degraded());
    assert_eq!(trainer.session().map(|s| s.level), Some(2));
    assert_eq!(trainer.stats().score, 1500);
    assert_eq!(trainer.presenter().last().stats.score, 1500);
    assert_eq!(trainer.presenter().last().stats.level, 2);
}

#[tokio::test]
async fn rejected_startup_sign_in_still_starts_a_session() {
    let client = ScriptedExchange::new().with_session("anon", "cat");
    client.reject_accounts();
    let (mut trainer, _inbox, client) = trainer(client);

    assert!(!trainer.start_signed_in("ada", "wrong", false).await);

    assert_eq!(trainer.phase(), &SessionPhase::Active);
    assert_eq!(trainer.session().map(|s| s.id.as_str()), Some("anon"));
    assert_eq!(trainer.user_id(), None);
    assert!(trainer.notice().is_some_and(|n| n.starts_with("Login failed")));
    assert_eq!(
        client.calls(),
        vec![
            Call::Login("ada".into()),
            Call::StartSession(None),
            Call::SetMode(true)
        ]
    );
}

#[tokio::test]
async fn rejected_startup_registration_keeps_a_stored_identity() {
    let client = ScriptedExchange::new().with_session("mine", "cat");
    client.reject_accounts();
    let (mut trainer, _inbox, client) = trainer_with(client, instant_settings(), Some(7));

    assert!(!trainer.start_signed_in("ada", "secret", true).await);

    assert_eq!(trainer.user_id(), Some(7));
    assert!(trainer.notice().is_some_and(|n| n.starts_with("Registration failed")));
    assert!(client.calls().contains(&Call::StartSession(Some(7))));
    assert_eq!(client.count(|c| matches!(c, Call::Login(_))), 0);
}

#[tokio::test]
async fn startup_sign_in_success_starts_once() {
    let client = ScriptedExchange::new().with_session("mine", "cat");
    let (mut trainer, _inbox, client) = trainer(client);

    assert!(trainer.start_signed_in("ada", "secret", false).await);

    assert_eq!(trainer.user_id(), Some(7));
    assert_eq!(client.count(|c| matches!(c, Call::StartSession(_))), 1);
}

#[tokio::test]
async fn rejected_login_keeps_the_anonymous_session() {
    let client = ScriptedExchange::new().with_session("anon", "cat");
    client.reject_accounts();
    let (mut trainer, _inbox, client) = trainer(client);
    trainer.start().await;

    assert!(trainer.login("ada", "wrong").await.is_err());

    assert_eq!(trainer.user_id(), None);
    assert_eq!(trainer.session().map(|s| s.id.as_str()), Some("anon"));
    assert!(trainer.notice().is_some_and(|n| n.starts_with("Login failed")));
    assert_eq!(client.count(|c| matches!(c, Call::StartSession(_))), 1);
}

#[tokio::test]
async fn register_logs_in_afterwards() {
    let client = ScriptedExchange::new().with_session("mine", "dog");
    let (mut trainer, _inbox, client) = trainer(client);

    trainer.register("ada", "secret").await.expect("register ok");

    let calls = client.calls();
    assert_eq!(calls[0], Call::Register("ada".into()));
    assert_eq!(calls[1], Call::Login("ada".into()));
    assert_eq!(calls[2], Call::StartSession(Some(7)));
}

#[tokio::test]
async fn logout_continues_anonymously() {
    let client = ScriptedExchange::new()
        .with_session("mine", "cat")
        .with_session("anon", "dog");
    let (mut trainer, _inbox, client) = trainer_with(client, instant_settings(), Some(7));
    trainer.start().await;

    client.restore_identity_cookies("session=signed-in");

    trainer.logout().await;

    assert_eq!(trainer.user_id(), None);
    assert_eq!(client.identity_cookies(), None);
    assert_eq!(
        client.calls().into_iter().filter(|c| matches!(c, Call::StartSession(_))).collect::<Vec<_>>(),
        vec![Call::StartSession(Some(7)), Call::StartSession(None)]
    );
}

#[tokio::test]
async fn saving_needs_an_identity() {
    let (mut trainer, _inbox, client) = trainer(ScriptedExchange::new().with_session("s1", "cat"));
    trainer.start().await;

    assert!(!trainer.save_progress().await);
    assert_eq!(trainer.notice(), Some("Log in to save progress"));
    assert_eq!(client.count(|c| matches!(c, Call::SaveProgress(_))), 0);
}

#[tokio::test]
async fn saving_with_identity_reports_the_outcome() {
    let client = ScriptedExchange::new().with_session("s1", "cat");
    let (mut trainer, _inbox, client) = trainer_with(client, instant_settings(), Some(7));
    trainer.start().await;

    assert!(trainer.save_progress().await);
    assert_eq!(trainer.notice(), Some("Progress saved"));

    client.reject_accounts();
    assert!(!trainer.save_progress().await);
    assert_eq!(trainer.notice(), Some("Save failed"));
    // Save outcomes never touch the session
    assert_eq!(trainer.session().map(|s| s.position), Some(0));
}

#[tokio::test]
async fn toggling_mode_tells_the_server() {
    let (mut trainer, _inbox, client) = trainer(ScriptedExchange::new().with_session("s1", "cat"));
    trainer.start().await;

    trainer.toggle_mode().await;

    assert!(!trainer.learn_mode());
    assert!(!trainer.presenter().last().learn_mode);
    assert_eq!(client.calls().last(), Some(&Call::SetMode(false)));
}

#[tokio::test]
async fn open_overlay_absorbs_typing() {
    let (mut trainer, _inbox, client) = trainer(ScriptedExchange::new().with_session("s1", "cat"));
    trainer.start().await;

    trainer.set_overlay_open(true);
    trainer.handle_key(&key('c')).await;
    assert_eq!(client.count(|c| matches!(c, Call::Keystroke { .. })), 0);

    trainer.set_overlay_open(false);
    client.push_keystroke(Ok(correct(1, 1, 10)));
    trainer.handle_key(&key('c')).await;
    assert_eq!(trainer.session().map(|s| s.position), Some(1));
}

#[tokio::test]
async fn start_failure_after_a_good_session_still_leaves_text() {
    let client = ScriptedExchange::new().with_session("s1", "cat");
    client.push_start(Err(unreachable("start session")));
    let (mut trainer, _inbox, _client) = trainer(client);
    trainer.start().await;

    trainer.reset().await;

    assert!(trainer.is_degraded());
    assert!(!text_of(&trainer).is_empty());
    assert_eq!(trainer.phase(), &SessionPhase::Active);
}
