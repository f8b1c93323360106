#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Snake.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.

mod sprites;

use anyhow::Result;
use glam::Vec2;
use macroquad::input::{is_key_pressed, KeyCode};
use snake_rendering::{
    present, Color, DrawSurface, FrameControl, FrameInput, Presentation, Rect, RenderingBackend,
    Scene, SpriteId, SpriteSheet, SurfaceMetrics,
};
use snake_system_input::Key;
use std::{path::PathBuf, sync::mpsc, time::Duration};

use self::sprites::SpriteAtlas;

/// Keys polled every frame and the game key each one reports.
const KEY_BINDINGS: [(KeyCode, Key); 13] = [
    (KeyCode::Up, Key::ArrowUp),
    (KeyCode::Right, Key::ArrowRight),
    (KeyCode::Down, Key::ArrowDown),
    (KeyCode::Left, Key::ArrowLeft),
    (KeyCode::Z, Key::Character('z')),
    (KeyCode::Q, Key::Character('q')),
    (KeyCode::S, Key::Character('s')),
    (KeyCode::D, Key::Character('d')),
    (KeyCode::W, Key::Character('w')),
    (KeyCode::A, Key::Character('a')),
    (KeyCode::Space, Key::Other),
    (KeyCode::Enter, Key::Other),
    (KeyCode::M, Key::Character('m')),
];

/// Game key reported for a physical key code, if the backend polls it.
#[doc(hidden)]
#[must_use]
pub fn bound_key(code: KeyCode) -> Option<Key> {
    KEY_BINDINGS
        .iter()
        .find(|(bound, _)| *bound == code)
        .map(|(_, key)| *key)
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    sprite_manifest: Option<PathBuf>,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            sprite_manifest: Some(SpriteAtlas::default_manifest_path()),
        }
    }
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Selects the sprite-sheet manifest, or `None` to draw flat primitives only.
    #[must_use]
    pub fn with_sprite_manifest(mut self, manifest: Option<PathBuf>) -> Self {
        self.sprite_manifest = manifest;
        self
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(FrameInput, &mut Scene) -> Result<FrameControl> + 'static,
    {
        let Self {
            swap_interval,
            sprite_manifest,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: 720,
            window_height: 720,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        let (outcome_sender, outcome_receiver) = mpsc::channel::<Result<()>>();

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let atlas = sprite_manifest.and_then(|path| {
                match SpriteAtlas::from_manifest_path(&path) {
                    Ok(atlas) => Some(atlas),
                    Err(error) => {
                        log::warn!("{error:#}; drawing primitives instead");
                        None
                    }
                }
            });
            let sheet = atlas
                .as_ref()
                .map_or(SpriteSheet::DEFAULT, |atlas| *atlas.sheet());

            let background = to_macroquad_color(clear_color);
            let mut surface_size = screen_size();
            let mut outcome = Ok(());

            loop {
                if is_key_pressed(KeyCode::Escape) {
                    break;
                }

                let current_size = screen_size();
                let resized = (current_size != surface_size).then_some(current_size);
                surface_size = current_size;

                let input = FrameInput {
                    now: Duration::from_secs_f64(macroquad::time::get_time().max(0.0)),
                    keys: poll_keys(),
                    resized,
                };

                match update_scene(input, &mut scene) {
                    Ok(FrameControl::Continue) => {}
                    Ok(FrameControl::Exit) => break,
                    Err(error) => {
                        outcome = Err(error);
                        break;
                    }
                }

                macroquad::window::clear_background(background);
                let metrics = SurfaceMetrics::fit(surface_size.x, surface_size.y, scene.dimensions);
                let mut surface = MacroquadSurface {
                    atlas: atlas.as_ref(),
                };
                present(&scene, &metrics, &sheet, &mut surface);

                macroquad::window::next_frame().await;
            }

            let _ = outcome_sender.send(outcome);
        });

        outcome_receiver.recv().unwrap_or(Ok(()))
    }
}

fn screen_size() -> Vec2 {
    Vec2::new(
        macroquad::window::screen_width(),
        macroquad::window::screen_height(),
    )
}

fn poll_keys() -> Vec<Key> {
    pressed_keys(is_key_pressed)
}

/// Keys whose codes are reported pressed, in [`KEY_BINDINGS`] order.
fn pressed_keys(mut is_pressed: impl FnMut(KeyCode) -> bool) -> Vec<Key> {
    KEY_BINDINGS
        .iter()
        .filter(|(code, _)| is_pressed(*code))
        .map(|(_, key)| *key)
        .collect()
}

/// Draws through macroquad, using flat colors when no sheet is loaded.
struct MacroquadSurface<'a> {
    atlas: Option<&'a SpriteAtlas>,
}

impl DrawSurface for MacroquadSurface<'_> {
    fn fill_rect(&mut self, rect: Rect, color: Color) {
        macroquad::shapes::draw_rectangle(
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            to_macroquad_color(color),
        );
    }

    fn draw_sprite(&mut self, sprite: SpriteId, source: Rect, destination: Rect) {
        match self.atlas {
            Some(atlas) => atlas.draw(source, destination),
            None => draw_primitive(sprite, destination),
        }
    }

    fn draw_text(&mut self, text: &str, center: Vec2, font_size: f32, color: Color) {
        let size = font_size.clamp(1.0, f32::from(u16::MAX)) as u16;
        let dimensions = macroquad::text::measure_text(text, None, size, 1.0);
        macroquad::text::draw_text(
            text,
            center.x - dimensions.width / 2.0,
            center.y + dimensions.offset_y / 2.0,
            f32::from(size),
            to_macroquad_color(color),
        );
    }
}

fn draw_primitive(sprite: SpriteId, destination: Rect) {
    let color = to_macroquad_color(primitive_color(sprite));
    match sprite {
        SpriteId::Food => macroquad::shapes::draw_circle(
            destination.x + destination.width / 2.0,
            destination.y + destination.height / 2.0,
            destination.width / 4.0,
            color,
        ),
        _ => {
            let inset = destination.width * 0.08;
            macroquad::shapes::draw_rectangle(
                destination.x + inset,
                destination.y + inset,
                destination.width - inset * 2.0,
                destination.height - inset * 2.0,
                color,
            );
        }
    }
}

/// Flat color standing in for a sprite when no sheet is available.
fn primitive_color(sprite: SpriteId) -> Color {
    match sprite {
        SpriteId::HeadUp | SpriteId::HeadRight | SpriteId::HeadDown | SpriteId::HeadLeft => {
            Color::from_rgb_u8(0x8f, 0xd1, 0x4f)
        }
        SpriteId::HeadDeadUp
        | SpriteId::HeadDeadRight
        | SpriteId::HeadDeadDown
        | SpriteId::HeadDeadLeft => Color::from_rgb_u8(0xd9, 0x4f, 0x4f),
        SpriteId::Food => Color::from_rgb_u8(0xf2, 0xa6, 0x3b),
        SpriteId::Wall => Color::from_rgb_u8(0x2b, 0x27, 0x30),
        SpriteId::BodyVertical
        | SpriteId::BodyHorizontal
        | SpriteId::BodyTopLeft
        | SpriteId::BodyTopRight
        | SpriteId::BodyBottomLeft
        | SpriteId::BodyBottomRight
        | SpriteId::TailUp
        | SpriteId::TailRight
        | SpriteId::TailDown
        | SpriteId::TailLeft => Color::from_rgb_u8(0x5e, 0xa8, 0x3a),
    }
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
