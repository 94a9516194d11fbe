//! Coordinate-message send flow — composition, capability gating, and
//! asynchronous radio results surfacing as notices.

use locaware::app::commands::AppCommand;
use locaware::app::service::AppService;
use locaware::config::AppConfig;
use locaware::dispatcher::{DeliveryOutcome, NOTICE_NO_POSITION, NOTICE_SMS_DENIED, SendOutcome};
use locaware::fsm::StateId;
use locaware::permissions::Capability;

use crate::mock_ports::{MockPlatform, RecordingSink};

/// Active app with a cached fix and both capabilities granted.
fn make_active_app() -> (AppService, MockPlatform, RecordingSink) {
    let mut platform = MockPlatform::granted_with_fix(40.44, -79.94);
    let mut app = AppService::new(AppConfig::default());
    let mut sink = RecordingSink::new();
    app.start(&mut platform, &mut sink);
    app.tick(&mut platform, &mut sink);
    assert_eq!(app.state(), StateId::Active);
    sink.clear();
    (app, platform, sink)
}

/// Active app with a fix but the SMS capability not yet granted.
fn make_sms_ungranted_app() -> (AppService, MockPlatform, RecordingSink) {
    let mut platform = MockPlatform::granted_with_fix(40.44, -79.94);
    platform.granted[Capability::Sms as usize] = false;
    let mut app = AppService::new(AppConfig::default());
    let mut sink = RecordingSink::new();
    app.start(&mut platform, &mut sink);
    app.tick(&mut platform, &mut sink);
    assert_eq!(app.state(), StateId::Active);
    sink.clear();
    (app, platform, sink)
}

// ───────────────────────────────────────────────────────────────
// Happy path
// ───────────────────────────────────────────────────────────────

#[test]
fn text_me_sends_to_configured_recipient() {
    let (mut app, mut platform, mut sink) = make_active_app();

    app.handle_command(AppCommand::TextMe, &mut platform, &mut sink);

    assert_eq!(platform.sent.len(), 1);
    let (token, message) = &platform.sent[0];
    assert_eq!(*token, 1);
    assert_eq!(message.recipient.as_str(), "0781633004");
    assert_eq!(
        message.body.as_str(),
        "My current location is 40.44, -79.94"
    );
    assert_eq!(sink.queued_tokens(), vec![1]);
}

#[test]
fn tokens_increment_per_send() {
    let (mut app, mut platform, mut sink) = make_active_app();

    app.handle_command(AppCommand::TextMe, &mut platform, &mut sink);
    app.handle_command(AppCommand::TextMe, &mut platform, &mut sink);

    let tokens: Vec<_> = platform.sent.iter().map(|(t, _)| *t).collect();
    assert_eq!(tokens, vec![1, 2]);
    assert_eq!(sink.queued_tokens(), vec![1, 2]);
}

#[test]
fn send_uses_live_fix_not_startup_fix() {
    let (mut app, mut platform, mut sink) = make_active_app();

    platform.push_fix(40.46, -79.92, 63_000);
    app.tick(&mut platform, &mut sink);
    app.handle_command(AppCommand::TextMe, &mut platform, &mut sink);

    assert_eq!(
        platform.sent_bodies(),
        vec!["My current location is 40.46, -79.92".to_string()]
    );
}

// ───────────────────────────────────────────────────────────────
// Refusal paths
// ───────────────────────────────────────────────────────────────

#[test]
fn text_me_without_position_notices() {
    let mut platform = MockPlatform::new();
    platform.granted = [true, true];
    let mut app = AppService::new(AppConfig::default());
    let mut sink = RecordingSink::new();
    app.start(&mut platform, &mut sink);
    app.tick(&mut platform, &mut sink);
    sink.clear();

    app.handle_command(AppCommand::TextMe, &mut platform, &mut sink);

    assert!(platform.sent.is_empty());
    assert_eq!(sink.notices(), vec![NOTICE_NO_POSITION]);
}

#[test]
fn text_me_ignored_outside_active() {
    let mut platform = MockPlatform::granted_with_fix(40.44, -79.94);
    let mut app = AppService::new(AppConfig::default());
    let mut sink = RecordingSink::new();
    app.start(&mut platform, &mut sink);
    sink.clear();

    // Still in Starting — the command is dropped without a notice.
    app.handle_command(AppCommand::TextMe, &mut platform, &mut sink);

    assert!(platform.sent.is_empty());
    assert!(sink.events.is_empty());
}

#[test]
fn sms_prompt_defers_then_denial_notices_once_per_attempt() {
    let (mut app, mut platform, mut sink) = make_sms_ungranted_app();

    // First attempt opens the prompt and abandons silently.
    app.handle_command(AppCommand::TextMe, &mut platform, &mut sink);
    assert!(platform.sent.is_empty());
    assert!(sink.notices().is_empty());
    assert_eq!(platform.requests, vec![Capability::Sms]);

    // The user's refusal arrives: that answers the first attempt.
    platform.decide(Capability::Sms, false);
    app.tick(&mut platform, &mut sink);
    assert_eq!(sink.notice_count(NOTICE_SMS_DENIED), 1);

    // A retry answers immediately from the latched denial, no re-prompt.
    app.handle_command(AppCommand::TextMe, &mut platform, &mut sink);
    assert_eq!(sink.notice_count(NOTICE_SMS_DENIED), 2);
    assert!(platform.sent.is_empty());
    assert_eq!(platform.requests.len(), 1);
}

#[test]
fn sms_grant_after_prompt_allows_retry() {
    let (mut app, mut platform, mut sink) = make_sms_ungranted_app();

    app.handle_command(AppCommand::TextMe, &mut platform, &mut sink);
    assert!(platform.sent.is_empty());

    platform.decide(Capability::Sms, true);
    app.tick(&mut platform, &mut sink);
    assert!(sink.notices().is_empty(), "a grant carries no notice");

    app.handle_command(AppCommand::TextMe, &mut platform, &mut sink);
    assert_eq!(platform.sent.len(), 1);
}

// ───────────────────────────────────────────────────────────────
// Radio results
// ───────────────────────────────────────────────────────────────

#[test]
fn radio_results_surface_as_notices() {
    let (mut app, mut platform, mut sink) = make_active_app();
    app.handle_command(AppCommand::TextMe, &mut platform, &mut sink);
    sink.clear();

    platform.report_sent(1, SendOutcome::Sent);
    app.tick(&mut platform, &mut sink);
    assert_eq!(sink.notices(), vec!["SMS sent"]);

    platform.report_delivery(1, DeliveryOutcome::Delivered);
    app.tick(&mut platform, &mut sink);
    assert_eq!(sink.notices(), vec!["SMS sent", "SMS delivered"]);
}

#[test]
fn failed_send_surfaces_failure_notice() {
    let (mut app, mut platform, mut sink) = make_active_app();
    app.handle_command(AppCommand::TextMe, &mut platform, &mut sink);
    sink.clear();

    platform.report_sent(1, SendOutcome::GenericFailure);
    app.tick(&mut platform, &mut sink);

    assert_eq!(sink.notices(), vec!["Generic failure"]);
}

#[test]
fn out_of_order_results_both_surface() {
    let (mut app, mut platform, mut sink) = make_active_app();
    app.handle_command(AppCommand::TextMe, &mut platform, &mut sink);
    app.handle_command(AppCommand::TextMe, &mut platform, &mut sink);
    sink.clear();

    // Delivery for #1 lands in the same tick as the send result for #2.
    platform.report_sent(2, SendOutcome::NoService);
    platform.report_delivery(1, DeliveryOutcome::NotDelivered);
    app.tick(&mut platform, &mut sink);

    let notices = sink.notices();
    assert!(notices.contains(&"No service"));
    assert!(notices.contains(&"SMS not delivered"));
}

#[test]
fn no_results_surface_after_background() {
    let (mut app, mut platform, mut sink) = make_active_app();
    app.handle_command(AppCommand::TextMe, &mut platform, &mut sink);

    app.handle_command(AppCommand::Background, &mut platform, &mut sink);
    sink.clear();

    // Late radio results are never pumped once listening is torn down.
    platform.report_sent(1, SendOutcome::Sent);
    platform.report_delivery(1, DeliveryOutcome::Delivered);
    for _ in 0..3 {
        app.tick(&mut platform, &mut sink);
    }

    assert!(sink.notices().is_empty());
}
