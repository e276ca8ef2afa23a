use super::*;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[test]
fn test_initial_state_is_stale() {
    let watchdog = Watchdog::new(WatchedSource::Vision, ms(3000));
    assert_eq!(watchdog.state(), Liveness::Stale);
    assert_eq!(watchdog.deadline(), None);
}

#[test]
fn test_steady_stream_reports_one_edge() {
    let start = Instant::now();
    let mut watchdog = Watchdog::new(WatchedSource::Vision, ms(3000));

    let mut edges = Vec::new();
    for i in 0..10 {
        let now = start + ms(i * 1000);
        edges.extend(watchdog.expire_or_event(now));
    }

    assert_eq!(edges, vec![Transition::BecameLive]);
    assert_eq!(watchdog.state(), Liveness::Live);
    assert_eq!(watchdog.deadline(), Some(start + ms(9000 + 3000)));
}

#[test]
fn test_expiry_after_silence() {
    let start = Instant::now();
    let mut watchdog = Watchdog::new(WatchedSource::Vision, ms(3000));

    assert_eq!(watchdog.on_qualifying_event(start), Some(Transition::BecameLive));
    assert_eq!(watchdog.poll(start + ms(2999)), None);
    assert_eq!(watchdog.poll(start + ms(3100)), Some(Transition::WentStale));
    assert_eq!(watchdog.state(), Liveness::Stale);

    // Nothing further without a new event
    assert_eq!(watchdog.poll(start + ms(10_000)), None);
}

#[test]
fn test_recovery_after_stale_reports_one_edge() {
    let start = Instant::now();
    let mut watchdog = Watchdog::new(WatchedSource::Vision, ms(3000));

    watchdog.on_qualifying_event(start);
    watchdog.poll(start + ms(3000));

    assert_eq!(
        watchdog.on_qualifying_event(start + ms(5000)),
        Some(Transition::BecameLive)
    );
    assert_eq!(watchdog.on_qualifying_event(start + ms(5100)), None);
}

#[test]
fn test_event_restarts_countdown() {
    let start = Instant::now();
    let mut watchdog = Watchdog::new(WatchedSource::Vision, ms(3000));

    watchdog.on_qualifying_event(start);
    watchdog.on_qualifying_event(start + ms(2500));

    // Original deadline passes without firing
    assert_eq!(watchdog.poll(start + ms(3000)), None);
    assert_eq!(watchdog.poll(start + ms(5500)), Some(Transition::WentStale));
}

#[test]
fn test_cancel_forces_stale_silently() {
    let start = Instant::now();
    let mut watchdog = Watchdog::new(WatchedSource::Vision, ms(3000));

    watchdog.on_qualifying_event(start);
    watchdog.cancel();

    assert_eq!(watchdog.state(), Liveness::Stale);
    assert_eq!(watchdog.deadline(), None);
    assert_eq!(watchdog.poll(start + ms(3000)), None);
    assert_eq!(
        watchdog.on_qualifying_event(start + ms(4000)),
        Some(Transition::BecameLive)
    );
}

#[test]
fn test_set_routes_by_qualifying_event() {
    let config = WatchdogConfig {
        vision_timeout_ms: 3000,
        referee_timeout_ms: Some(1000),
    };
    let mut set = WatchdogSet::from_config(&config);
    let start = Instant::now();

    assert_eq!(
        set.on_event(EventKind::VisionUpdate, start),
        vec![(WatchedSource::Vision, Transition::BecameLive)]
    );
    assert!(set.on_event(EventKind::TrajectoryUpdate, start).is_empty());
    assert_eq!(
        set.on_event(EventKind::RefereeUpdate, start),
        vec![(WatchedSource::Referee, Transition::BecameLive)]
    );

    assert_eq!(set.next_deadline(), Some(start + ms(1000)));
    assert_eq!(
        set.expire_due(start + ms(1000)),
        vec![(WatchedSource::Referee, Transition::WentStale)]
    );
    assert_eq!(set.next_deadline(), Some(start + ms(3000)));
}

#[test]
fn test_set_without_referee_timeout() {
    let set = WatchdogSet::from_config(&WatchdogConfig::default());
    assert!(set.get(WatchedSource::Vision).is_some());
    assert!(set.get(WatchedSource::Referee).is_none());
    assert_eq!(set.next_deadline(), None);
}

#[test]
fn test_cancel_all_clears_deadlines() {
    let mut set = WatchdogSet::from_config(&WatchdogConfig::default());
    let start = Instant::now();
    set.on_event(EventKind::VisionUpdate, start);

    set.cancel_all();
    assert_eq!(set.next_deadline(), None);
    assert!(set.expire_due(start + ms(60_000)).is_empty());
}

impl Watchdog {
    /// Test helper: fire any due timer, then feed an event
    fn expire_or_event(&mut self, now: Instant) -> Vec<Transition> {
        let mut edges = Vec::new();
        edges.extend(self.poll(now));
        edges.extend(self.on_qualifying_event(now));
        edges
    }
}
