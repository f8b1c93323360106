use std::time::Duration;

use snake_core::{CellCoord, Command, Direction, GridDimensions, LevelDescriptor, TickOutcome};
use snake_system_input::{Input, Key};
use snake_world::{self as world, query, World};

fn session() -> World {
    let level = LevelDescriptor::new(
        GridDimensions::new(6, 6),
        Duration::from_millis(120),
        Vec::new(),
        vec![CellCoord::new(2, 3), CellCoord::new(2, 4)],
    );
    let mut world = World::with_seed(&level, 21).expect("valid level");
    let mut events = Vec::new();
    if query::food(&world) != Some(CellCoord::new(5, 0)) {
        world::apply(
            &mut world,
            Command::PlaceFood {
                cell: CellCoord::new(5, 0),
            },
            &mut events,
        );
    }
    world
}

#[test]
fn handle_forwards_mapped_keys_in_order() {
    let mut input = Input::new();
    let mut commands = Vec::new();

    input.handle(
        &[
            Key::Other,
            Key::Character('d'),
            Key::ArrowDown,
            Key::Character('x'),
        ],
        &mut commands,
    );

    assert_eq!(
        commands,
        vec![
            Command::SetDirection {
                direction: Direction::Right,
            },
            Command::SetDirection {
                direction: Direction::Down,
            },
        ]
    );
}

#[test]
fn burst_of_keys_turns_once_per_tick() {
    let mut world = session();
    let mut input = Input::new();
    let mut commands = Vec::new();
    input.handle(
        &[Key::ArrowRight, Key::ArrowDown, Key::ArrowLeft],
        &mut commands,
    );

    let mut events = Vec::new();
    for command in commands {
        world::apply(&mut world, command, &mut events);
    }
    assert_eq!(query::pending_direction(&world), Some(Direction::Right));

    assert_eq!(world::tick(&mut world, &mut events), TickOutcome::Continuing);
    assert_eq!(query::chain(&world).head().cell(), CellCoord::new(3, 3));
    assert_eq!(query::committed_direction(&world), Direction::Right);
}

#[test]
fn reverse_key_never_changes_heading() {
    let mut world = session();
    let mut input = Input::new();
    let mut commands = Vec::new();
    input.handle(&[Key::Character('s')], &mut commands);

    let mut events = Vec::new();
    for command in commands {
        world::apply(&mut world, command, &mut events);
    }
    assert_eq!(query::pending_direction(&world), None);

    assert_eq!(world::tick(&mut world, &mut events), TickOutcome::Continuing);
    assert_eq!(query::committed_direction(&world), Direction::Up);
}
