//! Locaware — Main Entry Point
//!
//! Hexagonal architecture with event-driven execution over a simulated
//! handset platform.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  SimPlatform          LogEventSink      MemStore    HostClock  │
//! │  (Gnss+Sms+Capability) (EventSink)      (Config+KV) (clock)    │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  FSM · PermissionGate · Tracker · Dispatcher           │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Scheduler (delegate-driven) → Event Queue → main loop         │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Module declarations ───────────────────────────────────────
pub mod config;
mod dispatcher;
mod error;
mod events;
mod geo;
mod permissions;
mod schedule;
mod tracker;

pub mod app;
mod adapters;
pub mod fsm;

// ── Imports ───────────────────────────────────────────────────
use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{info, warn};

use adapters::gnss::SimGnss;
use adapters::log_sink::LogEventSink;
use adapters::modem::{RadioScript, SimModem};
use adapters::permissions::{CapabilityScript, SimPermissions};
use adapters::platform::SimPlatform;
use adapters::store::MemStore;
use adapters::time::HostClock;
use app::commands::AppCommand;
use app::ports::{ConfigPort, ScheduleFiredKind, SchedulerDelegate, ScheduledAction};
use app::service::AppService;
use config::AppConfig;
use events::{Event, push_event};
use fsm::StateId;
use permissions::Capability;
use schedule::{Schedule, ScheduleKind, Scheduler};

// ── CLI ───────────────────────────────────────────────────────

#[derive(Parser, Debug, Clone)]
#[command(name = "locaware")]
#[command(about = "Coordinate beacon demo over a simulated handset")]
struct Cli {
    /// Deny the location capability when the prompt opens.
    #[arg(long, default_value_t = false)]
    deny_location: bool,

    /// Deny the SMS capability when the prompt opens.
    #[arg(long, default_value_t = false)]
    deny_sms: bool,

    /// How long the simulated user takes to answer a prompt.
    #[arg(long, default_value_t = 1_500)]
    grant_delay_ms: u64,

    /// Revoke the location capability this many seconds into the run.
    #[arg(long)]
    revoke_location_at: Option<u64>,

    /// Press "text me" at these seconds into the run (repeatable).
    #[arg(long = "text-at", value_name = "SECS")]
    text_at: Vec<u64>,

    /// Press "show map" at these seconds into the run (repeatable).
    #[arg(long = "map-at", value_name = "SECS")]
    map_at: Vec<u64>,

    /// Also send the coordinates every this many seconds.
    #[arg(long, value_name = "SECS")]
    text_every_secs: Option<u32>,

    /// Background the app at this second (defaults to --duration-secs).
    #[arg(long)]
    background_at: Option<u64>,

    /// Total run length before the app backgrounds itself.
    #[arg(long, default_value_t = 70)]
    duration_secs: u64,

    /// JSON config file overriding the stored configuration.
    #[arg(long, value_name = "PATH")]
    config: Option<std::path::PathBuf>,

    /// Override the fix interval gate (milliseconds).
    #[arg(long)]
    interval_ms: Option<u32>,

    /// Override the fix displacement gate (metres).
    #[arg(long)]
    displacement_m: Option<f64>,

    /// Scripted route as "lat,lon@secs" entries separated by ';'.
    #[arg(long, value_name = "ROUTE")]
    route: Option<String>,

    /// Radio's verdict on every transmit attempt.
    #[arg(long, value_enum, default_value = "sent")]
    radio: RadioBehavior,

    /// Report every transmitted message as not delivered.
    #[arg(long, default_value_t = false)]
    undelivered: bool,
}

/// CLI mapping of [`SendOutcome`] (clap needs a local `ValueEnum`).
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
enum RadioBehavior {
    Sent,
    GenericFailure,
    NoService,
    NullPdu,
    RadioOff,
}

impl From<RadioBehavior> for dispatcher::SendOutcome {
    fn from(behavior: RadioBehavior) -> Self {
        match behavior {
            RadioBehavior::Sent => Self::Sent,
            RadioBehavior::GenericFailure => Self::GenericFailure,
            RadioBehavior::NoService => Self::NoService,
            RadioBehavior::NullPdu => Self::NullPdu,
            RadioBehavior::RadioOff => Self::RadioOff,
        }
    }
}

/// Parse a route script like `40.45,-79.93@31;40.46,-79.92@63`.
fn parse_route(script: &str) -> Result<Vec<(f64, f64, u64)>> {
    let mut fixes = Vec::new();
    for entry in script.split(';').filter(|e| !e.trim().is_empty()) {
        let (coords, at_secs) = entry
            .split_once('@')
            .with_context(|| format!("route entry '{}' is missing '@secs'", entry))?;
        let (lat, lon) = coords
            .split_once(',')
            .with_context(|| format!("route entry '{}' is missing 'lat,lon'", entry))?;
        let lat: f64 = lat
            .trim()
            .parse()
            .with_context(|| format!("bad latitude in '{}'", entry))?;
        let lon: f64 = lon
            .trim()
            .parse()
            .with_context(|| format!("bad longitude in '{}'", entry))?;
        let at_secs: u64 = at_secs
            .trim()
            .parse()
            .with_context(|| format!("bad time in '{}'", entry))?;
        fixes.push((lat, lon, at_secs));
    }
    fixes.sort_by_key(|&(_, _, at_secs)| at_secs);
    Ok(fixes)
}

// ── Scheduler delegate ────────────────────────────────────────
//
// Bridges the scheduler (which knows nothing about the event system)
// to the loop event queue: `on_schedule_fired` translates the schedule
// action into an `Event` pushed to the lock-free queue.

struct EventQueueDelegate;

impl SchedulerDelegate for EventQueueDelegate {
    fn on_schedule_fired(&mut self, label: &str, action: ScheduledAction, kind: ScheduleFiredKind) {
        info!("Schedule fired: '{}' ({:?})", label, kind);
        let event = match action {
            ScheduledAction::TextMe => Event::TextMeRequested,
            ScheduledAction::ShowMap => Event::ShowMapRequested,
            ScheduledAction::Background => Event::BackgroundRequested,
        };
        push_event(event);
    }
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. Logging bootstrap ──────────────────────────────────
    // The library logs through the `log` facade; the tracing-log
    // bridge (a default subscriber feature) forwards those records.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("╔══════════════════════════════════════╗");
    info!("║  Locaware v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let cli = Cli::parse();

    // ── 2. Load config from the store, then layer overrides ───
    let store = MemStore::new();
    let mut config = match store.load() {
        Ok(config) => config,
        Err(e) => {
            warn!("Stored config unusable ({}), using defaults", e);
            AppConfig::default()
        }
    };

    if let Some(path) = &cli.config {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        config = serde_json::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        info!("Config loaded from {}", path.display());
    }
    if let Some(interval_ms) = cli.interval_ms {
        config.update_interval_ms = interval_ms;
    }
    if let Some(displacement_m) = cli.displacement_m {
        config.min_displacement_m = displacement_m;
    }

    // Persisting validates; a bad override aborts before anything runs.
    if let Err(e) = store.save(&config) {
        bail!("effective configuration rejected: {}", e);
    }

    // ── 3. Script the simulated platform ──────────────────────
    let location_script = if cli.deny_location {
        CapabilityScript::DenyAfterMs(cli.grant_delay_ms)
    } else {
        CapabilityScript::GrantAfterMs(cli.grant_delay_ms)
    };
    let sms_script = if cli.deny_sms {
        CapabilityScript::DenyAfterMs(cli.grant_delay_ms)
    } else {
        CapabilityScript::PreGranted
    };

    let mut gnss = SimGnss::new(&config.provider);
    gnss.seed_last_known(geo::Position::new(40.44, -79.94));
    let route = match &cli.route {
        Some(script) => parse_route(script)?,
        // Default stroll: two fixes that pass the default 30s/10m gate.
        None => vec![(40.45, -79.93, 31), (40.46, -79.92, 63)],
    };
    for (lat, lon, at_secs) in route {
        gnss.push_fix(at_secs * 1000, lat, lon);
    }

    let radio_script = RadioScript {
        sent: cli.radio.into(),
        delivery: if cli.undelivered {
            dispatcher::DeliveryOutcome::NotDelivered
        } else {
            dispatcher::DeliveryOutcome::Delivered
        },
        ..RadioScript::default()
    };

    let mut platform = SimPlatform::new(
        gnss,
        SimModem::new(radio_script),
        SimPermissions::new(location_script, sms_script),
    );

    // ── 4. Scheduler: scripted user actions ───────────────────
    let mut sched = Scheduler::new();
    let mut sched_delegate = EventQueueDelegate;

    for &at_secs in &cli.text_at {
        sched.add(Schedule {
            label: "demo text-me",
            action: ScheduledAction::TextMe,
            kind: ScheduleKind::OneShot {
                delay_secs: at_secs as u32,
            },
            enabled: true,
        });
    }
    for &at_secs in &cli.map_at {
        sched.add(Schedule {
            label: "demo show-map",
            action: ScheduledAction::ShowMap,
            kind: ScheduleKind::OneShot {
                delay_secs: at_secs as u32,
            },
            enabled: true,
        });
    }
    if let Some(interval_secs) = cli.text_every_secs {
        sched.add(Schedule {
            label: "periodic text-me",
            action: ScheduledAction::TextMe,
            kind: ScheduleKind::Periodic { interval_secs },
            enabled: true,
        });
    }
    if let Some(at_secs) = cli.background_at {
        sched.add(Schedule {
            label: "demo background",
            action: ScheduledAction::Background,
            kind: ScheduleKind::OneShot {
                delay_secs: at_secs as u32,
            },
            enabled: true,
        });
    }
    if sched.active_count() == 0 {
        // Bare invocation still demonstrates the full flow.
        sched.add(Schedule {
            label: "demo text-me",
            action: ScheduledAction::TextMe,
            kind: ScheduleKind::OneShot { delay_secs: 6 },
            enabled: true,
        });
        sched.add(Schedule {
            label: "demo show-map",
            action: ScheduledAction::ShowMap,
            kind: ScheduleKind::OneShot { delay_secs: 9 },
            enabled: true,
        });
    }

    // ── 5. Construct the app service ──────────────────────────
    let mut log_sink = LogEventSink::new();
    let mut app = AppService::new(config.clone());
    app.start(&mut platform, &mut log_sink);

    info!("System ready. Entering event loop.");

    // ── 6. Event loop ─────────────────────────────────────────
    let clock = HostClock::new();
    let tick_secs = config.control_tick_ms as f32 / 1000.0;
    let duration_ms = cli.duration_secs.saturating_mul(1000);
    let mut revoked = false;
    let mut background_pushed = false;

    loop {
        std::thread::sleep(std::time::Duration::from_millis(
            config.control_tick_ms as u64,
        ));
        let now_ms = clock.uptime_ms();

        // Resolve everything the platform scripts say is due by now.
        platform.advance(now_ms);

        if let Some(at_secs) = cli.revoke_location_at {
            if !revoked && now_ms >= at_secs.saturating_mul(1000) {
                platform.permissions_mut().revoke(Capability::Location);
                revoked = true;
            }
        }

        push_event(Event::ControlTick);
        sched.tick(tick_secs, &mut sched_delegate);

        // Run length reached: leave the screen unless a script already did.
        if cli.background_at.is_none() && !background_pushed && now_ms >= duration_ms {
            background_pushed = true;
            push_event(Event::BackgroundRequested);
        }

        // Process all pending events.
        events::drain_events(|event| match event {
            Event::ControlTick => {
                app.tick(&mut platform, &mut log_sink);
            }
            Event::TextMeRequested => {
                app.handle_command(AppCommand::TextMe, &mut platform, &mut log_sink);
            }
            Event::ShowMapRequested => {
                app.handle_command(AppCommand::ShowMap, &mut platform, &mut log_sink);
            }
            Event::BackgroundRequested => {
                app.handle_command(AppCommand::Background, &mut platform, &mut log_sink);
            }
        });

        // Config auto-save (5s debounce after last change).
        app.auto_save_if_needed(&store);

        match app.state() {
            StateId::Stopped => {
                app.force_save_if_dirty(&store);
                info!(
                    "Run complete: backgrounded after {} ticks, {} message(s) sent, display '{}'",
                    app.tick_count(),
                    platform.modem().sent_count(),
                    app.display_text()
                );
                break;
            }
            StateId::Terminated => {
                app.force_save_if_dirty(&store);
                bail!("terminated: location capability denied");
            }
            _ => {}
        }
    }

    Ok(())
}
