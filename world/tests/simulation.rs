use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use snake_core::{
    CellCoord, Command, Direction, DirectionRejection, Event, GameStatus, GridDimensions,
    LevelDescriptor, LossReason, Segment, Tile, TickOutcome,
};
use snake_world::{self as world, query, World};

fn level(columns: u32, rows: u32, snake: &[(u32, u32)]) -> LevelDescriptor {
    LevelDescriptor::new(
        GridDimensions::new(columns, rows),
        Duration::from_millis(150),
        Vec::new(),
        cells(snake),
    )
}

fn cells(pairs: &[(u32, u32)]) -> Vec<CellCoord> {
    pairs
        .iter()
        .map(|&(column, row)| CellCoord::new(column, row))
        .collect()
}

fn chain_cells(world: &World) -> Vec<CellCoord> {
    query::chain(world).iter().map(Segment::cell).collect()
}

fn move_food(world: &mut World, cell: CellCoord) {
    if query::food(world) == Some(cell) {
        return;
    }
    let mut events = Vec::new();
    world::apply(world, Command::PlaceFood { cell }, &mut events);
    assert_eq!(events, vec![Event::FoodPlaced { cell }]);
}

fn steer(world: &mut World, direction: Direction) -> TickOutcome {
    let mut events = Vec::new();
    assert!(
        world::set_direction(world, direction, &mut events),
        "turn {direction:?} refused: {events:?}"
    );
    world::tick(world, &mut events)
}

#[test]
fn eating_grows_the_snake_and_places_new_food() {
    let mut world = World::with_seed(&level(5, 5, &[(2, 2), (2, 3)]), 42).expect("valid level");
    move_food(&mut world, CellCoord::new(2, 1));

    let mut events = Vec::new();
    let outcome = world::tick(&mut world, &mut events);

    assert_eq!(outcome, TickOutcome::AteFood);
    assert_eq!(query::score(&world), 1);
    assert_eq!(
        chain_cells(&world),
        cells(&[(2, 1), (2, 2), (2, 3)]),
        "tail must stay in place on the tick the snake eats"
    );

    let food = query::food(&world).expect("food replaced");
    assert_ne!(food, CellCoord::new(2, 1));
    assert_eq!(query::tile(&world, food), Some(Tile::Food));
    assert_eq!(
        events,
        vec![
            Event::FoodEaten {
                cell: CellCoord::new(2, 1),
                score: 1,
            },
            Event::SnakeAdvanced {
                from: CellCoord::new(2, 2),
                to: CellCoord::new(2, 1),
                heading: Direction::Up,
            },
            Event::FoodPlaced { cell: food },
        ]
    );
    world.verify_invariants().expect("consistent world");
}

#[test]
fn leaving_the_left_edge_loses() {
    let mut world = World::with_seed(&level(5, 5, &[(0, 2), (1, 2)]), 1).expect("valid level");
    let mut events = Vec::new();

    let outcome = world::tick(&mut world, &mut events);

    assert_eq!(outcome, TickOutcome::Lost(LossReason::Wall));
    assert_eq!(query::status(&world), GameStatus::Lost(LossReason::Wall));
    assert_eq!(chain_cells(&world), cells(&[(0, 2), (1, 2)]));
    assert_eq!(
        events,
        vec![Event::LevelLost {
            reason: LossReason::Wall,
            score: 0,
            goal: query::goal(&world),
        }]
    );
}

#[test]
fn leaving_the_right_edge_loses() {
    let mut world = World::with_seed(&level(5, 5, &[(4, 2), (3, 2)]), 1).expect("valid level");
    let mut events = Vec::new();

    assert_eq!(
        world::tick(&mut world, &mut events),
        TickOutcome::Lost(LossReason::Wall)
    );
}

#[test]
fn running_into_a_wall_tile_loses() {
    let level = LevelDescriptor {
        walls: cells(&[(2, 1)]),
        ..level(5, 5, &[(2, 2), (2, 3)])
    };
    let mut world = World::with_seed(&level, 8).expect("valid level");
    let mut events = Vec::new();

    assert_eq!(
        world::tick(&mut world, &mut events),
        TickOutcome::Lost(LossReason::Wall)
    );
    world.verify_invariants().expect("consistent world");
}

#[test]
fn biting_the_body_loses_and_keeps_the_tail() {
    let mut world = World::with_seed(
        &level(8, 8, &[(3, 3), (4, 3), (5, 3), (6, 3), (7, 3)]),
        3,
    )
    .expect("valid level");
    move_food(&mut world, CellCoord::new(0, 7));

    assert_eq!(steer(&mut world, Direction::Down), TickOutcome::Continuing);
    assert_eq!(steer(&mut world, Direction::Right), TickOutcome::Continuing);
    assert_eq!(
        steer(&mut world, Direction::Up),
        TickOutcome::Lost(LossReason::SelfCollision)
    );

    assert_eq!(
        chain_cells(&world),
        cells(&[(4, 4), (3, 4), (3, 3), (4, 3), (5, 3)])
    );
    assert_eq!(query::tile(&world, CellCoord::new(5, 3)), Some(Tile::SnakeBody));
    world.verify_invariants().expect("consistent world");
}

#[test]
fn head_may_follow_the_tail_into_its_vacated_cell() {
    let mut world = World::with_seed(&level(5, 5, &[(1, 1), (2, 1), (3, 1), (4, 1)]), 9)
        .expect("valid level");
    move_food(&mut world, CellCoord::new(4, 4));

    assert_eq!(steer(&mut world, Direction::Down), TickOutcome::Continuing);
    assert_eq!(steer(&mut world, Direction::Right), TickOutcome::Continuing);
    assert_eq!(steer(&mut world, Direction::Up), TickOutcome::Continuing);

    assert_eq!(
        chain_cells(&world),
        cells(&[(2, 1), (2, 2), (1, 2), (1, 1)])
    );
    world.verify_invariants().expect("consistent world");
}

#[test]
fn only_the_first_turn_per_tick_counts() {
    let mut world = World::with_seed(&level(5, 5, &[(2, 2), (2, 3)]), 4).expect("valid level");
    move_food(&mut world, CellCoord::new(0, 4));
    let mut events = Vec::new();

    assert!(world::set_direction(&mut world, Direction::Right, &mut events));
    assert!(!world::set_direction(&mut world, Direction::Down, &mut events));
    assert_eq!(
        events.last(),
        Some(&Event::DirectionRejected {
            direction: Direction::Down,
            reason: DirectionRejection::AlreadyPending,
        })
    );

    assert_eq!(world::tick(&mut world, &mut events), TickOutcome::Continuing);
    assert_eq!(query::chain(&world).head().cell(), CellCoord::new(3, 2));
    assert_eq!(query::committed_direction(&world), Direction::Right);
}

#[test]
fn turning_back_against_the_new_heading_is_refused() {
    let mut world = World::with_seed(&level(5, 5, &[(2, 2), (2, 3)]), 4).expect("valid level");
    move_food(&mut world, CellCoord::new(4, 4));
    assert_eq!(steer(&mut world, Direction::Left), TickOutcome::Continuing);

    let mut events = Vec::new();
    assert!(!world::set_direction(&mut world, Direction::Right, &mut events));
    assert_eq!(
        events,
        vec![Event::DirectionRejected {
            direction: Direction::Right,
            reason: DirectionRejection::Reversal,
        }]
    );
}

#[test]
fn eating_the_last_food_wins() {
    let mut world = World::with_seed(&level(3, 1, &[(1, 0), (2, 0)]), 0).expect("valid level");
    assert_eq!(query::goal(&world), 1);
    assert_eq!(query::food(&world), Some(CellCoord::new(0, 0)));

    let mut events = Vec::new();
    assert_eq!(world::tick(&mut world, &mut events), TickOutcome::Won);
    assert_eq!(query::status(&world), GameStatus::Won);
    assert_eq!(query::food(&world), None);
    assert_eq!(events.last(), Some(&Event::LevelWon { score: 1, goal: 1 }));
    world.verify_invariants().expect("consistent world");

    events.clear();
    assert_eq!(world::tick(&mut world, &mut events), TickOutcome::Won);
    assert!(events.is_empty());
}

#[test]
fn random_play_keeps_grid_and_chain_in_sync() {
    let level = LevelDescriptor {
        walls: cells(&[(4, 4), (4, 5), (5, 4), (5, 5)]),
        ..level(10, 10, &[(2, 7), (2, 8), (2, 9)])
    };

    for seed in 0..16 {
        let mut world = World::with_seed(&level, seed).expect("valid level");
        let mut steering = ChaCha8Rng::seed_from_u64(seed.wrapping_add(1000));
        let initial_length = query::chain(&world).len();
        let mut events = Vec::new();

        for _ in 0..400 {
            if steering.gen_bool(0.3) {
                let direction = Direction::ALL[steering.gen_range(0..Direction::ALL.len())];
                let _ = world::set_direction(&mut world, direction, &mut events);
            }

            let outcome = world::tick(&mut world, &mut events);
            world.verify_invariants().expect("consistent world");

            let score = query::score(&world) as usize;
            assert_eq!(query::chain(&world).len(), initial_length + score);
            assert!(query::score(&world) <= query::goal(&world));

            if outcome.is_terminal() {
                break;
            }
        }
    }
}
