use std::time::Duration;

use snake_core::{
    CellCoord, Command, Direction, GameStatus, GridDimensions, InvariantViolation,
    LevelDescriptor, LossReason, SessionSnapshot, TickOutcome,
};
use snake_system_scheduler::{
    FrameReport, FrameScheduler, ListenerKind, LevelObserver, PolledHost, SchedulerError,
    SchedulerState,
};
use snake_world::{self as world, query, World};

const INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Default)]
struct RecordingObserver {
    ready: usize,
    wins: usize,
    losses: Vec<(u32, u32)>,
}

impl LevelObserver for RecordingObserver {
    fn on_ready(&mut self) {
        self.ready += 1;
    }

    fn on_win(&mut self) {
        self.wins += 1;
    }

    fn on_lose(&mut self, score: u32, goal: u32) {
        self.losses.push((score, goal));
    }
}

struct Harness {
    world: World,
    host: PolledHost,
    observer: RecordingObserver,
    scheduler: FrameScheduler,
    deltas: Vec<f32>,
}

impl Harness {
    fn new(snake: &[(u32, u32)], columns: u32, rows: u32, smooth_movement: bool) -> Self {
        let level = LevelDescriptor::new(
            GridDimensions::new(columns, rows),
            INTERVAL,
            Vec::new(),
            snake
                .iter()
                .map(|&(column, row)| CellCoord::new(column, row))
                .collect(),
        );
        let world = World::with_seed(&level, 17).expect("valid level");
        let scheduler = FrameScheduler::for_world(&world, smooth_movement);
        Self {
            world,
            host: PolledHost::new(),
            observer: RecordingObserver::default(),
            scheduler,
            deltas: Vec::new(),
        }
    }

    fn open_field(smooth_movement: bool) -> Self {
        let mut harness = Self::new(&[(3, 5), (3, 6)], 8, 8, smooth_movement);
        let food = CellCoord::new(7, 0);
        if query::food(&harness.world) != Some(food) {
            let mut events = Vec::new();
            world::apply(
                &mut harness.world,
                Command::PlaceFood { cell: food },
                &mut events,
            );
        }
        harness
    }

    fn begin(&mut self) {
        self.scheduler.attach(&mut self.host, &mut self.observer);
        self.scheduler.start(&mut self.host);
    }

    fn frame_at(&mut self, millis: u64) -> Result<FrameReport, SchedulerError> {
        let request = self.host.take_due_frame().expect("frame requested");
        let mut render = recorder(&mut self.deltas);
        let mut events = Vec::new();
        self.scheduler.on_frame(
            request,
            Duration::from_millis(millis),
            &mut self.world,
            &mut self.host,
            &mut self.observer,
            &mut render,
            &mut events,
        )
    }

    fn head(&self) -> CellCoord {
        query::chain(&self.world).head().cell()
    }
}

fn recorder(
    deltas: &mut Vec<f32>,
) -> impl FnMut(SessionSnapshot<'_>, f32) -> Result<(), InvariantViolation> + '_ {
    move |_snapshot, delta| {
        deltas.push(delta);
        Ok(())
    }
}

fn rendered(report: FrameReport) -> (f32, Option<TickOutcome>) {
    match report {
        FrameReport::Rendered { delta, outcome } => (delta, outcome),
        FrameReport::Ignored => panic!("frame was ignored"),
    }
}

#[test]
fn attach_registers_each_listener_once_and_announces_ready() {
    let mut harness = Harness::open_field(false);
    harness.begin();

    assert_eq!(harness.observer.ready, 1);
    assert_eq!(harness.host.listener_count(ListenerKind::Keyboard), 1);
    assert_eq!(harness.host.listener_count(ListenerKind::Resize), 1);
    assert_eq!(harness.scheduler.state(), SchedulerState::Running);
    assert!(harness.host.has_pending_frame());
}

#[test]
fn first_frame_ticks_immediately_at_rest() {
    let mut harness = Harness::open_field(true);
    harness.begin();

    let (delta, outcome) = rendered(harness.frame_at(1_000).expect("frame"));

    assert_eq!(delta, 0.0);
    assert_eq!(outcome, Some(TickOutcome::Continuing));
    assert_eq!(harness.head(), CellCoord::new(3, 4));
    assert!(harness.host.has_pending_frame());
}

#[test]
fn smooth_delta_tracks_the_elapsed_fraction_of_a_tick() {
    let mut harness = Harness::open_field(true);
    harness.begin();
    let _ = harness.frame_at(1_000).expect("frame");

    let (delta, outcome) = rendered(harness.frame_at(1_050).expect("frame"));
    assert!((delta + 0.5).abs() < 1e-6, "delta was {delta}");
    assert_eq!(outcome, None);
    assert_eq!(harness.head(), CellCoord::new(3, 4));

    let (delta, outcome) = rendered(harness.frame_at(1_100).expect("frame"));
    assert_eq!(delta, 0.0);
    assert_eq!(outcome, Some(TickOutcome::Continuing));
    assert_eq!(harness.head(), CellCoord::new(3, 3));
}

#[test]
fn rigid_movement_pins_delta_to_zero() {
    let mut harness = Harness::open_field(false);
    harness.begin();
    let _ = harness.frame_at(1_000).expect("frame");

    let (delta, outcome) = rendered(harness.frame_at(1_050).expect("frame"));

    assert_eq!(delta, 0.0);
    assert_eq!(outcome, None);
}

#[test]
fn late_frame_fires_exactly_one_tick() {
    let mut harness = Harness::open_field(false);
    harness.begin();
    let _ = harness.frame_at(1_000).expect("frame");

    let (_, outcome) = rendered(harness.frame_at(1_450).expect("frame"));

    assert_eq!(outcome, Some(TickOutcome::Continuing));
    assert_eq!(harness.head(), CellCoord::new(3, 3));
}

#[test]
fn pending_turn_is_consumed_by_the_next_tick() {
    let mut harness = Harness::open_field(false);
    harness.begin();
    let _ = harness.frame_at(1_000).expect("frame");

    let mut events = Vec::new();
    assert!(world::set_direction(
        &mut harness.world,
        Direction::Right,
        &mut events
    ));
    let _ = harness.frame_at(1_040).expect("frame");
    assert_eq!(
        query::pending_direction(&harness.world),
        Some(Direction::Right)
    );

    let _ = harness.frame_at(1_100).expect("frame");
    assert_eq!(query::pending_direction(&harness.world), None);
    assert_eq!(harness.head(), CellCoord::new(4, 4));
}

#[test]
fn losing_tick_renders_at_rest_and_stops() {
    let mut harness = Harness::new(&[(2, 0), (2, 1)], 5, 5, true);
    harness.begin();

    let (_, outcome) = rendered(harness.frame_at(1_000).expect("frame"));

    assert_eq!(outcome, Some(TickOutcome::Lost(LossReason::Wall)));
    assert_eq!(harness.deltas, vec![0.0, 0.0]);
    assert_eq!(
        harness.observer.losses,
        vec![(0, query::goal(&harness.world))]
    );
    assert_eq!(harness.observer.wins, 0);
    assert_eq!(harness.scheduler.state(), SchedulerState::Finished);
    assert!(!harness.host.has_pending_frame());
}

#[test]
fn winning_tick_notifies_once() {
    let mut harness = Harness::new(&[(1, 0), (2, 0)], 3, 1, false);
    harness.begin();

    let (_, outcome) = rendered(harness.frame_at(1_000).expect("frame"));

    assert_eq!(outcome, Some(TickOutcome::Won));
    assert_eq!(harness.observer.wins, 1);
    assert!(harness.observer.losses.is_empty());
    assert!(!harness.host.has_pending_frame());
}

#[test]
fn stray_frame_after_teardown_is_ignored() {
    let mut harness = Harness::open_field(false);
    harness.begin();
    let request = harness.host.take_due_frame().expect("frame requested");

    harness.scheduler.teardown(&mut harness.host);
    assert_eq!(harness.scheduler.state(), SchedulerState::Paused);
    assert!(!harness.host.listens(ListenerKind::Keyboard));
    assert!(!harness.host.listens(ListenerKind::Resize));

    let mut render = recorder(&mut harness.deltas);
    let mut events = Vec::new();
    let report = harness
        .scheduler
        .on_frame(
            request,
            Duration::from_millis(1_000),
            &mut harness.world,
            &mut harness.host,
            &mut harness.observer,
            &mut render,
            &mut events,
        )
        .expect("frame");
    drop(render);

    assert_eq!(report, FrameReport::Ignored);
    assert!(harness.deltas.is_empty());
    assert_eq!(harness.head(), CellCoord::new(3, 5));
}

#[test]
fn start_after_teardown_waits_for_attach() {
    let mut harness = Harness::open_field(false);
    harness.begin();
    let _ = harness.host.take_due_frame().expect("frame requested");
    harness.scheduler.teardown(&mut harness.host);

    harness.scheduler.start(&mut harness.host);
    assert_eq!(harness.scheduler.state(), SchedulerState::Paused);
    assert!(!harness.host.has_pending_frame());

    harness.begin();
    assert_eq!(harness.scheduler.state(), SchedulerState::Running);
    assert!(harness.host.listens(ListenerKind::Keyboard));
    assert!(harness.host.listens(ListenerKind::Resize));
    assert!(harness.host.has_pending_frame());
}

#[test]
fn restart_reattaches_without_duplicate_listeners() {
    let mut harness = Harness::new(&[(2, 0), (2, 1)], 5, 5, false);
    harness.begin();
    let _ = harness.frame_at(1_000).expect("frame");
    assert_eq!(harness.scheduler.state(), SchedulerState::Finished);

    harness
        .scheduler
        .restart(&mut harness.world, &mut harness.host, &mut harness.observer)
        .expect("restart");
    harness.scheduler.start(&mut harness.host);

    assert_eq!(harness.observer.ready, 2);
    assert_eq!(harness.host.listener_count(ListenerKind::Keyboard), 1);
    assert_eq!(harness.host.listener_count(ListenerKind::Resize), 1);
    assert_eq!(query::status(&harness.world), GameStatus::Playing);
    assert_eq!(query::score(&harness.world), 0);
    assert_eq!(harness.scheduler.state(), SchedulerState::Running);
    assert!(harness.host.has_pending_frame());
}

#[test]
fn render_failure_aborts_the_level() {
    let mut harness = Harness::open_field(false);
    harness.begin();
    let request = harness.host.take_due_frame().expect("frame requested");

    let mut render = |_snapshot: SessionSnapshot<'_>, _delta: f32| -> Result<(), InvariantViolation> {
        Err(InvariantViolation::SegmentMissing {
            cell: CellCoord::new(3, 5),
        })
    };
    let mut events = Vec::new();
    let result = harness.scheduler.on_frame(
        request,
        Duration::from_millis(1_000),
        &mut harness.world,
        &mut harness.host,
        &mut harness.observer,
        &mut render,
        &mut events,
    );

    assert!(matches!(
        result,
        Err(SchedulerError::Invariant(
            InvariantViolation::SegmentMissing { .. }
        ))
    ));
    assert_eq!(harness.scheduler.state(), SchedulerState::Finished);
    assert!(!harness.host.has_pending_frame());
    assert!(!harness.host.listens(ListenerKind::Keyboard));
    assert_eq!(harness.head(), CellCoord::new(3, 5));
}

#[test]
fn redraw_renders_without_ticking() {
    let mut harness = Harness::open_field(false);
    harness.begin();
    let _ = harness.frame_at(1_000).expect("frame");
    let head = harness.head();

    let mut render = recorder(&mut harness.deltas);
    harness
        .scheduler
        .redraw(&harness.world, &mut harness.host, &mut render)
        .expect("redraw");
    drop(render);

    assert_eq!(harness.deltas.len(), 2);
    assert_eq!(harness.head(), head);
}
