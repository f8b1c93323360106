#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Frame scheduler that paces simulation ticks against display refreshes.
//!
//! Every delivered frame first renders the settled state of the previous
//! tick, interpolated by the fraction of the tick interval that has elapsed,
//! and then fires the next tick once a full interval has accumulated.

mod host;

use std::time::Duration;

use snake_core::{Event, InvariantViolation, LevelInvalid, SessionSnapshot, TickOutcome};
use snake_world::{query, World};
use thiserror::Error;

pub use host::{FrameHost, FrameRequest, ListenerHandle, ListenerKind, PolledHost};

/// Frames may exceed the tick interval by this much before a warning is logged.
pub const OVERRUN_SLACK: Duration = Duration::from_millis(30);

/// Callbacks raised at the lifecycle transitions of a level.
pub trait LevelObserver {
    /// The level is attached and waits for its first frame.
    fn on_ready(&mut self);

    /// The score reached the goal.
    fn on_win(&mut self);

    /// The snake crashed with `score` out of `goal` points.
    fn on_lose(&mut self, score: u32, goal: u32);
}

/// Lifecycle state of the scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SchedulerState {
    /// Listeners may be attached but no frame has been requested.
    Idle,
    /// Frames are requested and processed.
    Running,
    /// Torn down; pending frames were cancelled and listeners removed.
    Paused,
    /// The level ended and no further frames are requested.
    Finished,
}

/// Errors that abort a running level.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The grid and the snake disagree.
    #[error("session state is inconsistent: {0}")]
    Invariant(#[from] InvariantViolation),
    /// The level could not be rebuilt on restart.
    #[error("level could not be restarted: {0}")]
    Level(#[from] LevelInvalid),
}

/// Summary of what a delivered frame did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FrameReport {
    /// The frame was stale or arrived while the scheduler was not running.
    Ignored,
    /// The frame rendered and possibly ticked.
    Rendered {
        /// Interpolation offset used for the render, in `[-1, 0]`.
        delta: f32,
        /// Result of the tick fired by this frame, if any.
        outcome: Option<TickOutcome>,
    },
}

/// Drives ticks and renders from animation frames.
#[derive(Debug)]
pub struct FrameScheduler {
    state: SchedulerState,
    tick_interval: Duration,
    smooth_movement: bool,
    previous_frame: Option<Duration>,
    elapsed: Duration,
    last_delta: f32,
    pending_frame: Option<FrameRequest>,
    listeners: Vec<ListenerHandle>,
}

impl FrameScheduler {
    /// Creates an idle scheduler ticking every `tick_interval`.
    #[must_use]
    pub fn new(tick_interval: Duration, smooth_movement: bool) -> Self {
        Self {
            state: SchedulerState::Idle,
            tick_interval,
            smooth_movement,
            previous_frame: None,
            elapsed: Duration::ZERO,
            last_delta: 0.0,
            pending_frame: None,
            listeners: Vec::new(),
        }
    }

    /// Creates an idle scheduler using the tick interval of `world`'s level.
    #[must_use]
    pub fn for_world(world: &World, smooth_movement: bool) -> Self {
        Self::new(query::tick_interval(world), smooth_movement)
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Reports whether renders interpolate between ticks.
    #[must_use]
    pub fn smooth_movement(&self) -> bool {
        self.smooth_movement
    }

    /// Enables or disables interpolated rendering.
    pub fn set_smooth_movement(&mut self, enabled: bool) {
        self.smooth_movement = enabled;
    }

    /// Registers the keyboard and resize listeners and announces readiness.
    ///
    /// Listeners left over from an earlier attach are removed first so a
    /// level never holds more than one of each.
    pub fn attach<H, O>(&mut self, host: &mut H, observer: &mut O)
    where
        H: FrameHost,
        O: LevelObserver,
    {
        self.remove_listeners(host);
        self.listeners.push(host.add_listener(ListenerKind::Keyboard));
        self.listeners.push(host.add_listener(ListenerKind::Resize));
        self.state = SchedulerState::Idle;
        observer.on_ready();
    }

    /// Requests the first frame of an attached level.
    ///
    /// Ignored unless [`FrameScheduler::attach`] ran since the last teardown,
    /// so a level never runs without its keyboard and resize listeners.
    pub fn start<H: FrameHost>(&mut self, host: &mut H) {
        if self.state != SchedulerState::Idle || self.listeners.is_empty() {
            log::debug!("start ignored while {:?}", self.state);
            return;
        }
        self.reset_timing();
        self.state = SchedulerState::Running;
        self.schedule(host);
    }

    /// Processes one delivered animation frame.
    ///
    /// `now` is a monotonic timestamp. `render` receives the snapshot and the
    /// interpolation offset; events produced by a tick are appended to
    /// `out_events`.
    pub fn on_frame<H, O, R>(
        &mut self,
        request: FrameRequest,
        now: Duration,
        world: &mut World,
        host: &mut H,
        observer: &mut O,
        render: &mut R,
        out_events: &mut Vec<Event>,
    ) -> Result<FrameReport, SchedulerError>
    where
        H: FrameHost,
        O: LevelObserver,
        R: FnMut(SessionSnapshot<'_>, f32) -> Result<(), InvariantViolation>,
    {
        if self.state != SchedulerState::Running || self.pending_frame != Some(request) {
            return Ok(FrameReport::Ignored);
        }
        self.pending_frame = None;

        let first_frame = self.previous_frame.is_none();
        let since_previous = self
            .previous_frame
            .map_or(Duration::ZERO, |previous| now.saturating_sub(previous));
        self.previous_frame = Some(now);
        self.elapsed = self.elapsed.saturating_add(since_previous);

        let delta = if first_frame || !self.smooth_movement {
            0.0
        } else {
            self.progress() - 1.0
        };
        self.last_delta = delta;
        if let Err(violation) = render(query::snapshot(world), delta) {
            return Err(self.abort(host, violation));
        }

        if !first_frame && self.elapsed < self.tick_interval {
            self.schedule(host);
            return Ok(FrameReport::Rendered {
                delta,
                outcome: None,
            });
        }

        self.log_tick(first_frame);
        self.elapsed = Duration::ZERO;

        let outcome = snake_world::tick(world, out_events);
        if let Err(violation) = world.verify_invariants() {
            return Err(self.abort(host, violation));
        }

        if outcome.is_terminal() {
            self.last_delta = 0.0;
            if let Err(violation) = render(query::snapshot(world), 0.0) {
                return Err(self.abort(host, violation));
            }
            self.finish(world, outcome, observer);
        } else {
            self.schedule(host);
        }

        Ok(FrameReport::Rendered {
            delta,
            outcome: Some(outcome),
        })
    }

    /// Re-projects the current state after the drawing surface changed size.
    ///
    /// Never ticks.
    pub fn redraw<H, R>(
        &mut self,
        world: &World,
        host: &mut H,
        render: &mut R,
    ) -> Result<(), SchedulerError>
    where
        H: FrameHost,
        R: FnMut(SessionSnapshot<'_>, f32) -> Result<(), InvariantViolation>,
    {
        render(query::snapshot(world), self.last_delta)
            .map_err(|violation| self.abort(host, violation))
    }

    /// Cancels the pending frame and unregisters every listener.
    pub fn teardown<H: FrameHost>(&mut self, host: &mut H) {
        if let Some(request) = self.pending_frame.take() {
            host.cancel_frame(request);
        }
        self.remove_listeners(host);
        if self.state != SchedulerState::Finished {
            self.state = SchedulerState::Paused;
        }
        log::debug!("level torn down");
    }

    /// Tears the level down, rebuilds the session and attaches again.
    ///
    /// The caller starts the new session with [`FrameScheduler::start`].
    pub fn restart<H, O>(
        &mut self,
        world: &mut World,
        host: &mut H,
        observer: &mut O,
    ) -> Result<(), SchedulerError>
    where
        H: FrameHost,
        O: LevelObserver,
    {
        self.teardown(host);
        world.restart()?;
        self.tick_interval = query::tick_interval(world);
        self.reset_timing();
        self.attach(host, observer);
        Ok(())
    }

    fn progress(&self) -> f32 {
        let interval = self.tick_interval.as_nanos();
        if interval == 0 {
            return 1.0;
        }
        let ratio = self.elapsed.as_nanos() as f64 / interval as f64;
        ratio.min(1.0) as f32
    }

    fn log_tick(&self, first_frame: bool) {
        if first_frame {
            log::debug!("first frame");
            return;
        }

        if is_overrun(self.elapsed, self.tick_interval) {
            log::warn!(
                "tick late, skipping {}ms",
                self.elapsed.saturating_sub(self.tick_interval).as_millis()
            );
        } else {
            log::debug!("tick after {}ms", self.elapsed.as_millis());
        }
    }

    fn finish<O: LevelObserver>(&mut self, world: &World, outcome: TickOutcome, observer: &mut O) {
        self.state = SchedulerState::Finished;
        let score = query::score(world);
        let goal = query::goal(world);
        match outcome {
            TickOutcome::Won => {
                log::info!("level complete with {score} points");
                observer.on_win();
            }
            TickOutcome::Lost(reason) => {
                log::info!("game over ({reason:?}): {score} of {goal} points");
                observer.on_lose(score, goal);
            }
            TickOutcome::Continuing | TickOutcome::AteFood => {}
        }
    }

    fn abort<H: FrameHost>(&mut self, host: &mut H, violation: InvariantViolation) -> SchedulerError {
        log::error!("aborting level: {violation}");
        self.teardown(host);
        self.state = SchedulerState::Finished;
        SchedulerError::Invariant(violation)
    }

    fn schedule<H: FrameHost>(&mut self, host: &mut H) {
        self.pending_frame = Some(host.request_frame());
    }

    fn reset_timing(&mut self) {
        self.previous_frame = None;
        self.elapsed = Duration::ZERO;
        self.last_delta = 0.0;
    }

    fn remove_listeners<H: FrameHost>(&mut self, host: &mut H) {
        for handle in self.listeners.drain(..) {
            host.remove_listener(handle);
        }
    }
}

/// Reports whether a tick arrived later than the interval plus [`OVERRUN_SLACK`].
fn is_overrun(elapsed: Duration, tick_interval: Duration) -> bool {
    elapsed > tick_interval.saturating_add(OVERRUN_SLACK)
}
