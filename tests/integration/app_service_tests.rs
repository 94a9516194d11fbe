//! AppService integration tests — lifecycle, rendering, and config
//! persistence driven through the port traits with mock adapters.

use locaware::app::commands::AppCommand;
use locaware::app::events::{AppEvent, MAP_ZOOM};
use locaware::app::service::{AppService, NOTICE_MAP_NO_POSITION};
use locaware::config::AppConfig;
use locaware::fsm::StateId;
use locaware::geo::Position;
use locaware::permissions::Capability;
use locaware::tracker::UNKNOWN_LOCATION;

use crate::mock_ports::{MockPlatform, MockStore, RecordingSink};

fn make_app() -> (AppService, MockPlatform, RecordingSink) {
    (
        AppService::new(AppConfig::default()),
        MockPlatform::new(),
        RecordingSink::new(),
    )
}

/// Start against a pre-granted platform and tick once into `Active`,
/// then clear the sink so tests assert only on what they trigger.
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

// ───────────────────────────────────────────────────────────────
// Startup
// ───────────────────────────────────────────────────────────────

#[test]
fn pre_granted_start_reaches_active_first_tick() {
    let mut platform = MockPlatform::granted_with_fix(40.44, -79.94);
    let mut app = AppService::new(AppConfig::default());
    let mut sink = RecordingSink::new();

    app.start(&mut platform, &mut sink);
    assert_eq!(app.state(), StateId::Starting);
    assert!(
        platform.requests.is_empty(),
        "pre-granted capability must not open a prompt"
    );

    app.tick(&mut platform, &mut sink);
    assert_eq!(app.state(), StateId::Active);

    // Last-known fix was pulled and rendered before updates started.
    assert_eq!(platform.last_known_queries, vec!["gps".to_string()]);
    assert_eq!(
        platform.subscriptions,
        vec![("gps".to_string(), 30_000, 10.0)]
    );
    assert_eq!(
        sink.events,
        vec![
            AppEvent::Started(StateId::Starting),
            AppEvent::PositionUpdated(Some(Position::new(40.44, -79.94))),
            AppEvent::StateChanged {
                from: StateId::Starting,
                to: StateId::Active,
            },
        ]
    );
    assert_eq!(app.display_text(), "(40.44,-79.94)");
}

#[test]
fn prompt_flow_walks_awaiting_then_active() {
    let (mut app, mut platform, mut sink) = make_app();

    app.start(&mut platform, &mut sink);
    assert_eq!(platform.requests, vec![Capability::Location]);

    // Prompt open, no answer yet — park in Awaiting and hold there.
    app.tick(&mut platform, &mut sink);
    assert_eq!(app.state(), StateId::AwaitingLocationPermission);
    app.tick(&mut platform, &mut sink);
    assert_eq!(app.state(), StateId::AwaitingLocationPermission);
    assert_eq!(platform.requests.len(), 1, "prompt never re-opened");

    // User grants — next tick activates.
    platform.decide(Capability::Location, true);
    app.tick(&mut platform, &mut sink);
    assert_eq!(app.state(), StateId::Active);

    assert_eq!(
        sink.state_changes(),
        vec![
            (StateId::Starting, StateId::AwaitingLocationPermission),
            (StateId::AwaitingLocationPermission, StateId::Active),
        ]
    );
    // No cached fix on this platform: the unknown fallback renders.
    assert_eq!(sink.position_updates(), vec![None]);
    assert_eq!(app.display_text(), UNKNOWN_LOCATION);
}

#[test]
fn startup_denial_terminates_and_releases() {
    let (mut app, mut platform, mut sink) = make_app();
    app.start(&mut platform, &mut sink);

    platform.decide(Capability::Location, false);
    app.tick(&mut platform, &mut sink);

    assert_eq!(app.state(), StateId::Terminated);
    assert_eq!(platform.stop_calls, 1);
    assert!(
        platform.subscriptions.is_empty(),
        "denied run must never subscribe"
    );
    assert_eq!(
        sink.state_changes(),
        vec![(StateId::Starting, StateId::Terminated)]
    );
}

#[test]
fn custom_interval_params_reach_subscription() {
    let mut config = AppConfig::default();
    config.update_interval_ms = 5_000;
    config.min_displacement_m = 2.5;
    config.provider = "network".to_string();

    let mut platform = MockPlatform::new();
    platform.granted = [true, true];
    let mut app = AppService::new(config);
    let mut sink = RecordingSink::new();

    app.start(&mut platform, &mut sink);
    app.tick(&mut platform, &mut sink);

    assert_eq!(
        platform.subscriptions,
        vec![("network".to_string(), 5_000, 2.5)]
    );
}

// ───────────────────────────────────────────────────────────────
// Active tracking
// ───────────────────────────────────────────────────────────────

#[test]
fn active_fix_updates_display() {
    let (mut app, mut platform, mut sink) = make_active_app();

    platform.push_fix(40.45, -79.93, 31_000);
    app.tick(&mut platform, &mut sink);

    assert_eq!(
        sink.position_updates(),
        vec![Some(Position::at(40.45, -79.93, 31_000))]
    );
    assert_eq!(app.display_text(), "(40.45,-79.93)");
}

#[test]
fn multiple_queued_fixes_drain_in_order() {
    let (mut app, mut platform, mut sink) = make_active_app();

    platform.push_fix(40.45, -79.93, 31_000);
    platform.push_fix(40.46, -79.92, 63_000);
    app.tick(&mut platform, &mut sink);

    assert_eq!(sink.position_updates().len(), 2);
    // Tracker holds the newest.
    assert_eq!(app.position(), Some(Position::at(40.46, -79.92, 63_000)));
}

// ───────────────────────────────────────────────────────────────
// Lifecycle end states
// ───────────────────────────────────────────────────────────────

#[test]
fn background_stops_tracking() {
    let (mut app, mut platform, mut sink) = make_active_app();

    app.handle_command(AppCommand::Background, &mut platform, &mut sink);

    assert_eq!(app.state(), StateId::Stopped);
    assert_eq!(platform.stop_calls, 1);
    assert_eq!(
        sink.state_changes(),
        vec![(StateId::Active, StateId::Stopped)]
    );
}

#[test]
fn terminal_states_silence_the_ui() {
    let (mut app, mut platform, mut sink) = make_active_app();
    app.handle_command(AppCommand::Background, &mut platform, &mut sink);
    sink.clear();

    // Anything arriving after the stop is ignored wholesale.
    platform.push_fix(41.0, -80.0, 90_000);
    platform.decide(Capability::Location, true);
    for _ in 0..3 {
        app.tick(&mut platform, &mut sink);
    }
    app.handle_command(AppCommand::TextMe, &mut platform, &mut sink);
    app.handle_command(AppCommand::ShowMap, &mut platform, &mut sink);
    app.handle_command(AppCommand::Background, &mut platform, &mut sink);

    assert!(sink.events.is_empty());
    assert!(platform.sent.is_empty());
    assert_eq!(app.state(), StateId::Stopped);
}

#[test]
fn revocation_blocks_queued_renders() {
    let (mut app, mut platform, mut sink) = make_active_app();

    // A fix and a revocation land in the same tick: the decision is
    // absorbed first, so the fix must not reach the display.
    platform.push_fix(40.45, -79.93, 31_000);
    platform.decide(Capability::Location, false);
    app.tick(&mut platform, &mut sink);

    assert_eq!(app.state(), StateId::Terminated);
    assert!(sink.position_updates().is_empty());
    assert_eq!(
        sink.state_changes(),
        vec![(StateId::Active, StateId::Terminated)]
    );
    assert_eq!(platform.stop_calls, 1);
}

#[test]
fn forced_state_change_emits_once() {
    let (mut app, mut platform, mut sink) = make_active_app();

    app.handle_command(
        AppCommand::ForceState(StateId::Active),
        &mut platform,
        &mut sink,
    );
    assert!(
        sink.state_changes().is_empty(),
        "forcing the current state is a no-op"
    );

    app.handle_command(
        AppCommand::ForceState(StateId::Stopped),
        &mut platform,
        &mut sink,
    );
    assert_eq!(
        sink.state_changes(),
        vec![(StateId::Active, StateId::Stopped)]
    );
}

// ───────────────────────────────────────────────────────────────
// Map presentation
// ───────────────────────────────────────────────────────────────

#[test]
fn show_map_emits_marker_with_zoom() {
    let (mut app, mut platform, mut sink) = make_active_app();

    app.handle_command(AppCommand::ShowMap, &mut platform, &mut sink);

    assert_eq!(
        sink.events,
        vec![AppEvent::MapRequested {
            position: Position::new(40.44, -79.94),
            zoom: MAP_ZOOM,
        }]
    );
}

#[test]
fn show_map_without_position_notices() {
    // Granted platform but no cached fix and no forwarded fixes.
    let mut platform = MockPlatform::new();
    platform.granted = [true, true];
    let mut app = AppService::new(AppConfig::default());
    let mut sink = RecordingSink::new();
    app.start(&mut platform, &mut sink);
    app.tick(&mut platform, &mut sink);
    sink.clear();

    app.handle_command(AppCommand::ShowMap, &mut platform, &mut sink);

    assert!(sink.map_requests().is_empty());
    assert_eq!(sink.notices(), vec![NOTICE_MAP_NO_POSITION]);
}

// ───────────────────────────────────────────────────────────────
// Config persistence
// ───────────────────────────────────────────────────────────────

#[test]
fn update_config_marks_dirty() {
    let (mut app, mut platform, mut sink) = make_active_app();
    let store = MockStore::new();

    assert!(!app.is_config_dirty());
    let mut config = app.current_config();
    config.update_interval_ms = 10_000;
    app.handle_command(AppCommand::UpdateConfig(config), &mut platform, &mut sink);

    assert!(app.is_config_dirty());
    assert_eq!(app.current_config().update_interval_ms, 10_000);
    assert_eq!(store.save_count(), 0, "dirty flag alone must not save");
}

#[test]
fn auto_save_honours_debounce() {
    let (mut app, mut platform, mut sink) = make_active_app();
    let store = MockStore::new();

    let mut config = app.current_config();
    config.min_displacement_m = 25.0;
    app.handle_command(AppCommand::UpdateConfig(config), &mut platform, &mut sink);

    // 10 ticks at 250 ms = 2.5 s — inside the 5 s debounce window.
    for _ in 0..10 {
        app.tick(&mut platform, &mut sink);
        assert!(!app.auto_save_if_needed(&store));
    }

    // 10 more ticks crosses 5 s.
    for _ in 0..10 {
        app.tick(&mut platform, &mut sink);
    }
    assert!(app.auto_save_if_needed(&store));
    assert!(!app.is_config_dirty());
    assert_eq!(store.save_count(), 1);
    assert_eq!(store.last_saved().map(|c| c.min_displacement_m), Some(25.0));
}

#[test]
fn explicit_save_flushes_on_next_check() {
    let (mut app, mut platform, mut sink) = make_active_app();
    let store = MockStore::new();

    // Run well past 5 s of uptime before the edit.
    for _ in 0..25 {
        app.tick(&mut platform, &mut sink);
    }
    let mut config = app.current_config();
    config.recipient_number = "0781633005".to_string();
    app.handle_command(AppCommand::UpdateConfig(config), &mut platform, &mut sink);

    // Fresh edit: still debounced.
    assert!(!app.auto_save_if_needed(&store));

    // Explicit save rewinds the debounce, flushing at the next check.
    app.handle_command(AppCommand::SaveConfig, &mut platform, &mut sink);
    assert!(app.auto_save_if_needed(&store));
    assert_eq!(
        store.last_saved().map(|c| c.recipient_number),
        Some("0781633005".to_string())
    );
}

#[test]
fn force_save_if_dirty_saves_once() {
    let (mut app, mut platform, mut sink) = make_active_app();
    let store = MockStore::new();

    let mut config = app.current_config();
    config.body_template = "I am at {lat}, {lon}".to_string();
    app.handle_command(AppCommand::UpdateConfig(config), &mut platform, &mut sink);

    app.force_save_if_dirty(&store);
    assert_eq!(store.save_count(), 1);
    assert!(!app.is_config_dirty());

    // Clean state: nothing further is written.
    app.force_save_if_dirty(&store);
    assert_eq!(store.save_count(), 1);
}

#[test]
fn failed_save_keeps_config_dirty() {
    let (mut app, mut platform, mut sink) = make_active_app();
    let mut store = MockStore::new();
    store.fail_saves = true;

    let mut config = app.current_config();
    config.update_interval_ms = 60_000;
    app.handle_command(AppCommand::UpdateConfig(config), &mut platform, &mut sink);
    for _ in 0..25 {
        app.tick(&mut platform, &mut sink);
    }

    assert!(!app.auto_save_if_needed(&store));
    assert!(app.is_config_dirty(), "failed save must leave data dirty");
    assert_eq!(store.save_count(), 0);
}
