use std::time::Duration;

use whack_core::{Command, Event, GamePhase, Reveal, SlotId, Variant, WavePlan, WorldPoint};
use whack_world::{self as world, query, World};

fn configured_world(count: u32) -> (World, Vec<Event>) {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigureSlots {
            positions: (0..count)
                .map(|index| WorldPoint::new(100.0 + index as f32 * 170.0, 358.0))
                .collect(),
        },
        &mut events,
    );
    world::apply(&mut world, Command::StartGame, &mut events);
    (world, events)
}

fn plan(reveals: &[(u32, Variant)], count: u32) -> WavePlan {
    WavePlan {
        order: (0..count).rev().map(SlotId::new).collect(),
        reveals: reveals
            .iter()
            .map(|(slot, variant)| Reveal::new(SlotId::new(*slot), *variant))
            .collect(),
        next_wave_in: Duration::from_secs(1),
    }
}

fn tick(world: &mut World, millis: u64) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::Tick {
            dt: Duration::from_millis(millis),
        },
        &mut events,
    );
    events
}

#[test]
fn thirtieth_wave_is_terminal() {
    let (mut world, _) = configured_world(5);
    let mut events = Vec::new();

    for wave in 1..=29 {
        world::apply(
            &mut world,
            Command::SpawnWave {
                plan: plan(&[(0, Variant::Enemy), (3, Variant::Friendly)], 5),
            },
            &mut events,
        );
        assert_eq!(query::round(&world), wave);
        assert_eq!(query::phase(&world), GamePhase::Running);
    }
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::GameOver { .. })));

    events.clear();
    world::apply(
        &mut world,
        Command::SpawnWave {
            plan: plan(&[(1, Variant::Enemy)], 5),
        },
        &mut events,
    );

    assert_eq!(query::round(&world), 30);
    assert_eq!(query::phase(&world), GamePhase::Over);
    assert!(events.contains(&Event::GameOver {
        score: 0,
        rounds: 30
    }));
    assert!(query::slot_view(&world)
        .iter()
        .all(|slot| !slot.is_visible()));
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::SlotShown { .. })));
}

#[test]
fn no_wave_follows_game_over() {
    let (mut world, _) = configured_world(5);
    let mut events = Vec::new();
    for _ in 0..30 {
        world::apply(
            &mut world,
            Command::SpawnWave {
                plan: plan(&[(0, Variant::Enemy)], 5),
            },
            &mut events,
        );
    }
    assert_eq!(query::phase(&world), GamePhase::Over);

    let later = tick(&mut world, 120_000);
    assert!(!later
        .iter()
        .any(|event| matches!(event, Event::WaveDue { .. } | Event::SlotShown { .. })));
    assert_eq!(query::pending_timers(&world), 0);

    events.clear();
    world::apply(
        &mut world,
        Command::SpawnWave {
            plan: plan(&[(0, Variant::Enemy)], 5),
        },
        &mut events,
    );
    assert!(events.is_empty());
    assert_eq!(query::round(&world), 30);
}

#[test]
fn spawn_interval_decays_geometrically() {
    let (mut world, _) = configured_world(5);
    let initial = query::spawn_interval(&world).as_secs_f64();
    assert!((initial - 0.85).abs() < 1e-9);

    let mut events = Vec::new();
    let mut previous = initial;
    for wave in 1..=20 {
        world::apply(
            &mut world,
            Command::SpawnWave {
                plan: plan(&[(0, Variant::Enemy)], 5),
            },
            &mut events,
        );
        let interval = query::spawn_interval(&world).as_secs_f64();
        let expected = initial * 0.991_f64.powi(wave);
        assert!(
            (interval - expected).abs() < 1e-6,
            "wave {wave}: {interval} != {expected}"
        );
        assert!(interval < previous && interval > 0.0);
        previous = interval;
    }
}

#[test]
fn first_wave_becomes_due_one_second_after_start() {
    let (mut world, _) = configured_world(5);

    assert!(!tick(&mut world, 500)
        .iter()
        .any(|event| matches!(event, Event::WaveDue { .. })));
    assert!(tick(&mut world, 500).contains(&Event::WaveDue { round: 0 }));
}

#[test]
fn wave_reveals_plan_slots_and_schedules_next_wave() {
    let (mut world, _) = configured_world(5);
    let _ = tick(&mut world, 1_000);

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SpawnWave {
            plan: plan(&[(4, Variant::Enemy), (2, Variant::Friendly)], 5),
        },
        &mut events,
    );

    let interval = query::spawn_interval(&world);
    let visible_for = query::tuning(&world).visible_duration(interval);
    assert_eq!(
        events,
        vec![
            Event::SlotShown {
                slot: SlotId::new(4),
                variant: Variant::Enemy,
                visible_for,
            },
            Event::SlotShown {
                slot: SlotId::new(2),
                variant: Variant::Friendly,
                visible_for,
            },
            Event::WaveSpawned {
                round: 1,
                spawn_interval: interval,
                revealed: 2,
            },
        ]
    );
    assert_eq!(
        query::wave_order(&world),
        &[4, 3, 2, 1, 0].map(SlotId::new)
    );

    let next = tick(&mut world, 1_000);
    assert!(next.contains(&Event::WaveDue { round: 1 }));
}

#[test]
fn revealing_a_visible_slot_is_a_no_op() {
    let (mut world, _) = configured_world(3);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SpawnWave {
            plan: plan(&[(1, Variant::Enemy)], 3),
        },
        &mut events,
    );

    events.clear();
    world::apply(
        &mut world,
        Command::SpawnWave {
            plan: plan(&[(1, Variant::Friendly)], 3),
        },
        &mut events,
    );

    let slot = query::slot(&world, SlotId::new(1)).expect("slot exists");
    assert_eq!(slot.variant, Variant::Enemy);
    assert!(events.contains(&Event::WaveSpawned {
        round: 2,
        spawn_interval: query::spawn_interval(&world),
        revealed: 0,
    }));
}

#[test]
fn unstruck_target_times_out_without_score_change() {
    let (mut world, _) = configured_world(3);
    let _ = tick(&mut world, 1_000);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SpawnWave {
            plan: WavePlan {
                next_wave_in: Duration::from_secs(30),
                ..plan(&[(0, Variant::Enemy)], 3)
            },
        },
        &mut events,
    );
    let visible_for = query::tuning(&world).visible_duration(query::spawn_interval(&world));

    let before = tick(
        &mut world,
        u64::try_from(visible_for.as_millis()).expect("fits") - 1,
    );
    assert!(!before.contains(&Event::SlotHidden {
        slot: SlotId::new(0)
    }));
    assert!(query::slot(&world, SlotId::new(0))
        .expect("slot exists")
        .is_visible());

    let after = tick(&mut world, 2);
    assert!(after.contains(&Event::SlotHidden {
        slot: SlotId::new(0)
    }));
    assert!(!after
        .iter()
        .any(|event| matches!(event, Event::ScoreChanged { .. })));
    assert_eq!(query::score(&world), 0);
}

#[test]
fn wave_plan_sees_slots_as_they_were_when_the_wave_fell_due() {
    let (mut world, _) = configured_world(3);
    assert!(tick(&mut world, 1_000).contains(&Event::WaveDue { round: 0 }));
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SpawnWave {
            plan: WavePlan {
                next_wave_in: Duration::from_millis(2_900),
                ..plan(&[(0, Variant::Enemy)], 3)
            },
        },
        &mut events,
    );
    // Slot 0 hides at ~3.948s, the next wave is due at 3.9s.
    let _ = tick(&mut world, 2_850);

    let frame = tick(&mut world, 100);
    assert_eq!(
        frame,
        vec![
            Event::TimeAdvanced {
                dt: Duration::from_millis(100)
            },
            Event::WaveDue { round: 1 },
        ]
    );
    assert!(query::slot(&world, SlotId::new(0))
        .expect("slot exists")
        .is_visible());

    events.clear();
    world::apply(
        &mut world,
        Command::SpawnWave {
            plan: plan(&[(0, Variant::Friendly)], 3),
        },
        &mut events,
    );

    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::SlotShown { .. })));
    let spawned = events
        .iter()
        .position(|event| matches!(event, Event::WaveSpawned { revealed: 0, .. }))
        .expect("wave spawned");
    let hidden = events
        .iter()
        .position(|event| {
            *event
                == Event::SlotHidden {
                    slot: SlotId::new(0),
                }
        })
        .expect("auto-hide fired after the wave");
    assert!(spawned < hidden);
    let slot = query::slot(&world, SlotId::new(0)).expect("slot exists");
    assert!(!slot.is_visible());
    assert_eq!(slot.variant, Variant::Enemy);
}

#[test]
fn unanswered_wave_keeps_the_rest_of_its_tick() {
    let (mut world, _) = configured_world(3);
    let _ = tick(&mut world, 1_000);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SpawnWave {
            plan: plan(&[(0, Variant::Enemy)], 3),
        },
        &mut events,
    );
    let visible_for = query::tuning(&world).visible_duration(query::spawn_interval(&world));

    assert!(tick(&mut world, 1_500).contains(&Event::WaveDue { round: 1 }));

    let rest = u64::try_from(visible_for.as_millis()).expect("fits") - 1_500 + 1;
    assert!(tick(&mut world, rest).contains(&Event::SlotHidden {
        slot: SlotId::new(0)
    }));
}
