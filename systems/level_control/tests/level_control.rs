use std::time::Duration;

use signal_intercept_core::{Command, Event, GameTuning, SessionPhase, SignalStatus};
use signal_intercept_system_level_control::LevelController;
use signal_intercept_world::{self as world, query, World};

struct Harness {
    world: World,
    controller: LevelController,
}

impl Harness {
    fn new(seed: u64) -> Self {
        Self {
            world: World::new(),
            controller: LevelController::new(&GameTuning::default(), seed),
        }
    }

    fn submit(&mut self, commands: Vec<Command>) -> Vec<Event> {
        let mut pending = commands;
        let mut log = Vec::new();
        while !pending.is_empty() {
            let mut events = Vec::new();
            for command in pending.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }
            let snapshot = query::snapshot(&self.world);
            self.controller.handle(&events, &snapshot, &mut pending);
            log.extend(events);
        }
        log
    }

    fn tick(&mut self, millis: u64) -> Vec<Event> {
        self.submit(vec![Command::Tick {
            dt: Duration::from_millis(millis),
        }])
    }

    fn restart(&mut self) -> Vec<Event> {
        let mut commands = Vec::new();
        self.controller
            .request_restart(&query::snapshot(&self.world), &mut commands);
        self.submit(commands)
    }

    fn boot(&mut self) {
        let _ = self.submit(vec![Command::PowerOn]);
        let _ = self.tick(1_500);
    }

    fn track_target(&mut self) {
        let target = query::target(&self.world);
        let _ = self.submit(vec![
            Command::SetPlayerFrequency {
                value: target.frequency(),
            },
            Command::SetPlayerAmplitude {
                value: target.amplitude(),
            },
        ]);
    }
}

#[test]
fn boot_completes_after_delay_and_starts_first_round() {
    let mut harness = Harness::new(7);
    let _ = harness.submit(vec![Command::PowerOn]);

    for _ in 0..149 {
        let _ = harness.tick(10);
    }
    assert_eq!(query::phase(&harness.world), SessionPhase::Booting);

    let events = harness.tick(10);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::RoundStarted { level: 1, .. })));

    let snapshot = query::snapshot(&harness.world);
    assert_eq!(snapshot.phase, SessionPhase::Active);
    assert_eq!(snapshot.level, 1);
    assert_eq!(snapshot.score, 0);
    assert_eq!(snapshot.time_left, Duration::from_secs(58));
    assert!((5.0..=15.0).contains(&snapshot.target.frequency()));
    assert!((30.0..=80.0).contains(&snapshot.target.amplitude()));
}

#[test]
fn power_cycle_restarts_boot_delay() {
    let mut harness = Harness::new(7);
    let _ = harness.submit(vec![Command::PowerOn]);
    let _ = harness.tick(1_000);
    let _ = harness.submit(vec![Command::PowerOff]);
    let _ = harness.submit(vec![Command::PowerOn]);
    let _ = harness.tick(1_000);

    assert_eq!(query::phase(&harness.world), SessionPhase::Booting);

    let _ = harness.tick(500);
    assert_eq!(query::phase(&harness.world), SessionPhase::Active);
}

#[test]
fn tracking_the_target_decodes_once_and_advances_after_pause() {
    let mut harness = Harness::new(11);
    harness.boot();

    let mut decode_tick = None;
    for tick in 1..=60 {
        harness.track_target();
        let events = harness.tick(16);
        if events
            .iter()
            .any(|event| matches!(event, Event::TransmissionDecoded { .. }))
        {
            decode_tick = Some(tick);
            break;
        }
    }

    assert_eq!(decode_tick, Some(33));
    let snapshot = query::snapshot(&harness.world);
    assert!(snapshot.decoded);
    assert_eq!(snapshot.status, SignalStatus::Decoded);
    assert_eq!(snapshot.score, 100 + 574);

    let frozen_target = snapshot.target;
    for _ in 0..249 {
        let events = harness.tick(16);
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::TransmissionDecoded { .. })));
    }
    let paused = query::snapshot(&harness.world);
    assert_eq!(paused.phase, SessionPhase::LockedPause);
    assert_eq!(paused.target, frozen_target);
    assert_eq!(paused.score, 674);

    let _ = harness.tick(16);
    let next = query::snapshot(&harness.world);
    assert_eq!(next.phase, SessionPhase::Active);
    assert_eq!(next.level, 2);
    assert_eq!(next.score, 674);
    assert_eq!(next.time_left, Duration::from_secs(56));
    assert!(!next.decoded);
    assert_eq!(next.signal_quality, 0.0);
}

#[test]
fn expiry_freezes_round_until_restart() {
    let mut harness = Harness::new(3);
    harness.boot();

    let events = harness.tick(60_000);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::RoundExpired { level: 1, .. })));

    let expired = query::snapshot(&harness.world);
    assert!(expired.game_over);
    assert_eq!(expired.status, SignalStatus::Lost);
    assert_eq!(expired.time_left, Duration::ZERO);

    for _ in 0..100 {
        let _ = harness.tick(16);
    }
    assert_eq!(query::snapshot(&harness.world), expired);

    let _ = harness.restart();
    let restarted = query::snapshot(&harness.world);
    assert_eq!(restarted.phase, SessionPhase::Active);
    assert_eq!(restarted.level, 1);
    assert_eq!(restarted.score, 0);
    assert_eq!(restarted.time_left, Duration::from_secs(58));
    assert!(!restarted.game_over);
    assert!(restarted.generation > expired.generation);
}

#[test]
fn restart_is_ignored_while_round_is_running() {
    let mut harness = Harness::new(5);
    harness.boot();
    let before = query::generation(&harness.world);

    let events = harness.restart();

    assert!(events.is_empty());
    assert_eq!(query::generation(&harness.world), before);
}

#[test]
fn distant_dials_never_lock() {
    let mut harness = Harness::new(21);
    let _ = harness.submit(vec![
        Command::SetPlayerFrequency { value: 20.0 },
        Command::SetPlayerAmplitude { value: 100.0 },
    ]);
    harness.boot();

    let mut expired = false;
    for _ in 0..4_000 {
        let events = harness.tick(16);
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::TransmissionDecoded { .. })));
        if events
            .iter()
            .any(|event| matches!(event, Event::RoundExpired { .. }))
        {
            expired = true;
            break;
        }
    }

    assert!(expired);
    assert!(query::snapshot(&harness.world).game_over);
}
