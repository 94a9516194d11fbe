//! Capability prompt lifecycle — request deduplication, latching, and
//! the interplay between the location and SMS capabilities.

use locaware::app::commands::AppCommand;
use locaware::app::service::AppService;
use locaware::config::AppConfig;
use locaware::dispatcher::NOTICE_SMS_DENIED;
use locaware::fsm::StateId;
use locaware::permissions::Capability;

use crate::mock_ports::{MockPlatform, RecordingSink};

fn make_started_app() -> (AppService, MockPlatform, RecordingSink) {
    let mut platform = MockPlatform::new();
    let mut app = AppService::new(AppConfig::default());
    let mut sink = RecordingSink::new();
    app.start(&mut platform, &mut sink);
    (app, platform, sink)
}

#[test]
fn single_prompt_while_awaiting() {
    let (mut app, mut platform, mut sink) = make_started_app();

    for _ in 0..10 {
        app.tick(&mut platform, &mut sink);
    }

    assert_eq!(app.state(), StateId::AwaitingLocationPermission);
    assert_eq!(
        platform.requests,
        vec![Capability::Location],
        "one prompt regardless of how long the user deliberates"
    );
}

#[test]
fn grant_absorbed_stops_requesting() {
    let (mut app, mut platform, mut sink) = make_started_app();
    app.tick(&mut platform, &mut sink);

    platform.decide(Capability::Location, true);
    app.tick(&mut platform, &mut sink);
    assert_eq!(app.state(), StateId::Active);

    for _ in 0..10 {
        app.tick(&mut platform, &mut sink);
    }
    assert_eq!(platform.requests.len(), 1, "grant ends all prompting");
}

#[test]
fn startup_denial_latches_for_the_run() {
    let (mut app, mut platform, mut sink) = make_started_app();

    platform.decide(Capability::Location, false);
    app.tick(&mut platform, &mut sink);
    assert_eq!(app.state(), StateId::Terminated);

    for _ in 0..5 {
        app.tick(&mut platform, &mut sink);
    }
    assert_eq!(platform.requests.len(), 1, "denial is never re-asked");
    assert_eq!(
        sink.state_changes(),
        vec![(StateId::Starting, StateId::Terminated)]
    );
}

#[test]
fn sms_denial_keeps_location_tracking() {
    let mut platform = MockPlatform::granted_with_fix(40.44, -79.94);
    platform.granted[Capability::Sms as usize] = false;
    let mut app = AppService::new(AppConfig::default());
    let mut sink = RecordingSink::new();
    app.start(&mut platform, &mut sink);
    app.tick(&mut platform, &mut sink);
    sink.clear();

    app.handle_command(AppCommand::TextMe, &mut platform, &mut sink);
    platform.decide(Capability::Sms, false);
    app.tick(&mut platform, &mut sink);
    assert_eq!(sink.notice_count(NOTICE_SMS_DENIED), 1);

    // The SMS refusal must not disturb position tracking.
    platform.push_fix(40.45, -79.93, 31_000);
    app.tick(&mut platform, &mut sink);
    assert_eq!(app.state(), StateId::Active);
    assert_eq!(app.display_text(), "(40.45,-79.93)");

    app.handle_command(AppCommand::TextMe, &mut platform, &mut sink);
    assert_eq!(sink.notice_count(NOTICE_SMS_DENIED), 2);
    assert!(platform.sent.is_empty());
}

#[test]
fn revocation_stops_renders_after_grant() {
    let (mut app, mut platform, mut sink) = make_started_app();
    app.tick(&mut platform, &mut sink);
    platform.decide(Capability::Location, true);
    app.tick(&mut platform, &mut sink);
    assert_eq!(app.state(), StateId::Active);
    sink.clear();

    platform.push_fix(40.45, -79.93, 31_000);
    app.tick(&mut platform, &mut sink);
    assert_eq!(sink.position_updates().len(), 1);

    platform.decide(Capability::Location, false);
    app.tick(&mut platform, &mut sink);
    assert_eq!(app.state(), StateId::Terminated);

    platform.push_fix(40.46, -79.92, 63_000);
    for _ in 0..3 {
        app.tick(&mut platform, &mut sink);
    }
    assert_eq!(
        sink.position_updates().len(),
        1,
        "no renders after revocation"
    );
}

#[test]
fn capabilities_prompt_independently() {
    let (mut app, mut platform, mut sink) = make_started_app();
    app.tick(&mut platform, &mut sink);
    platform.decide(Capability::Location, true);
    app.tick(&mut platform, &mut sink);
    assert_eq!(app.state(), StateId::Active);

    // No position yet — feed one so TextMe reaches the capability gate.
    platform.push_fix(40.44, -79.94, 10_000);
    app.tick(&mut platform, &mut sink);

    app.handle_command(AppCommand::TextMe, &mut platform, &mut sink);
    assert_eq!(
        platform.requests,
        vec![Capability::Location, Capability::Sms]
    );

    platform.decide(Capability::Sms, true);
    app.tick(&mut platform, &mut sink);
    app.handle_command(AppCommand::TextMe, &mut platform, &mut sink);
    assert_eq!(platform.sent.len(), 1);
    assert_eq!(
        platform.sent[0].1.body.as_str(),
        "My current location is 40.44, -79.94"
    );
}
