use std::time::Duration;

use whack_core::{Command, Event, Reveal, SlotId, Variant, WavePlan, WorldPoint};
use whack_system_tapping::Tapping;
use whack_world::{self as world, query, World};

fn world_with_raised(reveals: &[(u32, Variant)]) -> (World, Vec<Event>) {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigureSlots {
            positions: vec![
                WorldPoint::new(100.0, 358.0),
                WorldPoint::new(270.0, 358.0),
                WorldPoint::new(180.0, 448.0),
            ],
        },
        &mut events,
    );
    world::apply(&mut world, Command::StartGame, &mut events);
    world::apply(
        &mut world,
        Command::SpawnWave {
            plan: WavePlan {
                order: (0..3).map(SlotId::new).collect(),
                reveals: reveals
                    .iter()
                    .map(|(slot, variant)| Reveal::new(SlotId::new(*slot), *variant))
                    .collect(),
                next_wave_in: Duration::from_secs(2),
            },
        },
        &mut events,
    );
    (world, events)
}

fn tap(tapping: &mut Tapping, events: &[Event], world: &World, x: f32, y: f32) -> Vec<Command> {
    let mut commands = Vec::new();
    tapping.handle(
        events,
        Some(WorldPoint::new(x, y)),
        &query::slot_view(world),
        &mut commands,
    );
    commands
}

#[test]
fn tap_inside_raised_target_emits_whack() {
    let (world, events) = world_with_raised(&[(1, Variant::Enemy)]);
    let mut tapping = Tapping::new();

    let commands = tap(&mut tapping, &events, &world, 275.0, 330.0);

    assert_eq!(
        commands,
        vec![Command::Whack {
            slot: SlotId::new(1)
        }]
    );
}

#[test]
fn tap_on_target_edge_is_accepted() {
    let (world, events) = world_with_raised(&[(0, Variant::Friendly)]);
    let mut tapping = Tapping::new();

    let commands = tap(&mut tapping, &events, &world, 140.0, 403.0);

    assert_eq!(
        commands,
        vec![Command::Whack {
            slot: SlotId::new(0)
        }]
    );
}

#[test]
fn tap_outside_every_target_is_ignored() {
    let (world, events) = world_with_raised(&[(0, Variant::Enemy), (1, Variant::Enemy)]);
    let mut tapping = Tapping::new();

    assert!(tap(&mut tapping, &events, &world, 185.0, 358.0).is_empty());
    assert!(tap(&mut tapping, &[], &world, 100.0, 500.0).is_empty());
}

#[test]
fn tap_on_hidden_slot_is_ignored() {
    let (world, events) = world_with_raised(&[(0, Variant::Enemy)]);
    let mut tapping = Tapping::new();

    assert!(tap(&mut tapping, &events, &world, 180.0, 448.0).is_empty());
}

#[test]
fn struck_target_no_longer_accepts_taps() {
    let (mut world, events) = world_with_raised(&[(2, Variant::Enemy)]);
    let mut tapping = Tapping::new();

    let first = tap(&mut tapping, &events, &world, 180.0, 440.0);
    let mut after = Vec::new();
    for command in first {
        world::apply(&mut world, command, &mut after);
    }
    let second = tap(&mut tapping, &after, &world, 180.0, 440.0);

    assert!(second.is_empty());
    assert_eq!(query::score(&world), 1);
}

#[test]
fn missing_tap_emits_nothing() {
    let (world, events) = world_with_raised(&[(0, Variant::Enemy)]);
    let mut tapping = Tapping::new();
    let mut commands = Vec::new();

    tapping.handle(&events, None, &query::slot_view(&world), &mut commands);

    assert!(commands.is_empty());
}

#[test]
fn taps_stop_after_game_over() {
    let (world, mut events) = world_with_raised(&[(0, Variant::Enemy)]);
    events.push(Event::GameOver {
        score: 0,
        rounds: 30,
    });
    let mut tapping = Tapping::new();

    assert!(tap(&mut tapping, &events, &world, 100.0, 358.0).is_empty());
}
