//! Page flow around a single level: ready prompt, play, win or game over.

use std::path::PathBuf;

use anyhow::{Context, Result};
use snake_core::{InvariantViolation, SessionSnapshot};
use snake_rendering::{project, Banner, FrameControl, FrameInput, Scene};
use snake_system_input::{Input, Key};
use snake_system_scheduler::{
    FrameReport, FrameScheduler, LevelObserver, ListenerKind, PolledHost,
};
use snake_world::{self as world, query, World};

use crate::settings::Settings;

/// Key that flips interpolated movement on or off at any time.
const TOGGLE_SMOOTH_MOVEMENT: Key = Key::Character('m');

/// Stage of the level shown to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Ready,
    Playing,
    Won,
    Lost,
}

/// Turns level lifecycle callbacks into prompts.
#[derive(Debug)]
struct Prompts {
    phase: Phase,
    banner: Option<Banner>,
}

impl LevelObserver for Prompts {
    fn on_ready(&mut self) {
        self.phase = Phase::Ready;
        self.banner = Some(Banner::new("Ready?", "Press any key to start."));
    }

    fn on_win(&mut self) {
        self.phase = Phase::Won;
        self.banner = Some(Banner::new("You win!", "Press any key to exit."));
    }

    fn on_lose(&mut self, score: u32, goal: u32) {
        self.phase = Phase::Lost;
        self.banner = Some(Banner::new(
            "Game over",
            format!("You scored {score} points out of {goal}. Press any key to try again."),
        ));
    }
}

/// Owns a running level and reacts to backend frames.
#[derive(Debug)]
pub(crate) struct GameApp {
    world: World,
    scheduler: FrameScheduler,
    host: PolledHost,
    input: Input,
    prompts: Prompts,
    settings: Settings,
    settings_path: PathBuf,
}

impl GameApp {
    /// Attaches a fresh level; the ready prompt is shown until a key is pressed.
    pub(crate) fn new(world: World, settings: Settings, settings_path: PathBuf) -> Self {
        let mut app = Self {
            scheduler: FrameScheduler::for_world(&world, settings.smooth_movement),
            world,
            host: PolledHost::new(),
            input: Input::new(),
            prompts: Prompts {
                phase: Phase::Ready,
                banner: None,
            },
            settings,
            settings_path,
        };
        app.scheduler.attach(&mut app.host, &mut app.prompts);
        app
    }

    /// Scene showing the settled level under the current prompt.
    pub(crate) fn scene(&self) -> Result<Scene> {
        let scene = project(&query::snapshot(&self.world), 0.0)
            .context("level state is inconsistent")?;
        Ok(scene.with_banner(self.prompts.banner.clone()))
    }

    /// Handles one backend frame.
    pub(crate) fn frame(&mut self, input: FrameInput, scene: &mut Scene) -> Result<FrameControl> {
        if input.keys.contains(&TOGGLE_SMOOTH_MOVEMENT) {
            self.toggle_smooth_movement();
        }
        let any_key = input.keys.iter().any(|key| *key != TOGGLE_SMOOTH_MOVEMENT);

        match self.prompts.phase {
            Phase::Ready => {
                if any_key {
                    self.prompts.banner = None;
                    self.prompts.phase = Phase::Playing;
                    self.scheduler.start(&mut self.host);
                }
                *scene = self.scene()?;
            }
            Phase::Playing => self.play(&input, scene)?,
            Phase::Won => {
                if any_key {
                    return Ok(FrameControl::Exit);
                }
            }
            Phase::Lost => {
                if any_key {
                    self.scheduler
                        .restart(&mut self.world, &mut self.host, &mut self.prompts)
                        .context("couldn't restart the level")?;
                    *scene = self.scene()?;
                }
            }
        }

        scene.banner = self.prompts.banner.clone();
        Ok(FrameControl::Continue)
    }

    fn play(&mut self, input: &FrameInput, scene: &mut Scene) -> Result<()> {
        if self.host.listens(ListenerKind::Keyboard) {
            let mut commands = Vec::new();
            self.input.handle(&input.keys, &mut commands);
            let mut events = Vec::new();
            for command in commands {
                world::apply(&mut self.world, command, &mut events);
            }
        }

        let mut render = |snapshot: SessionSnapshot<'_>,
                          delta: f32|
         -> Result<(), InvariantViolation> {
            *scene = project(&snapshot, delta)?;
            Ok(())
        };

        if input.resized.is_some() && self.host.listens(ListenerKind::Resize) {
            self.scheduler
                .redraw(&self.world, &mut self.host, &mut render)
                .context("level aborted while redrawing")?;
        }

        if let Some(request) = self.host.take_due_frame() {
            let mut events = Vec::new();
            let report = self
                .scheduler
                .on_frame(
                    request,
                    input.now,
                    &mut self.world,
                    &mut self.host,
                    &mut self.prompts,
                    &mut render,
                    &mut events,
                )
                .context("level aborted")?;
            if let FrameReport::Rendered {
                outcome: Some(outcome),
                ..
            } = report
            {
                log::trace!("tick {outcome:?}: {events:?}");
            }
        }
        Ok(())
    }

    fn toggle_smooth_movement(&mut self) {
        self.settings.smooth_movement = !self.settings.smooth_movement;
        self.scheduler
            .set_smooth_movement(self.settings.smooth_movement);
        log::info!(
            "smooth movement {}",
            if self.settings.smooth_movement {
                "on"
            } else {
                "off"
            }
        );
        if let Err(error) = self.settings.save(&self.settings_path) {
            log::warn!("{error:#}");
        }
    }
}
