#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Input system that turns key presses into steering commands.

use snake_core::{Command, Direction};

/// Physical key reported by an adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Up arrow.
    ArrowUp,
    /// Right arrow.
    ArrowRight,
    /// Down arrow.
    ArrowDown,
    /// Left arrow.
    ArrowLeft,
    /// Printable character key.
    Character(char),
    /// Any key the game does not bind, such as space or enter.
    Other,
}

/// Maps a key to the direction it steers the snake toward.
///
/// Arrow keys are always bound. Letters cover both the AZERTY layout
/// (`z`, `q`, `s`, `d`) and the QWERTY layout (`w`, `a`, `s`, `d`), ignoring
/// case.
#[must_use]
pub fn map_key_to_direction(key: Key) -> Option<Direction> {
    match key {
        Key::ArrowUp => Some(Direction::Up),
        Key::ArrowRight => Some(Direction::Right),
        Key::ArrowDown => Some(Direction::Down),
        Key::ArrowLeft => Some(Direction::Left),
        Key::Character(character) => match character.to_ascii_lowercase() {
            'z' | 'w' => Some(Direction::Up),
            'd' => Some(Direction::Right),
            's' => Some(Direction::Down),
            'q' | 'a' => Some(Direction::Left),
            _ => None,
        },
        Key::Other => None,
    }
}

/// Pure system translating key presses into steering commands.
///
/// The system does not debounce on its own: the world accepts only the first
/// valid direction of each tick, so every mapped key is forwarded in order.
#[derive(Clone, Copy, Debug, Default)]
pub struct Input;

impl Input {
    /// Creates a new input system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Emits one [`Command::SetDirection`] per key bound to a direction.
    pub fn handle(&mut self, keys: &[Key], out: &mut Vec<Command>) {
        out.extend(
            keys.iter()
                .filter_map(|&key| map_key_to_direction(key))
                .map(|direction| Command::SetDirection { direction }),
        );
    }
}
