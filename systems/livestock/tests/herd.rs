use std::time::Duration;

use glam::Vec2;
use touchline_core::{
    farm::{AnimalSpecies, Command, Event},
    tuning::FarmTuning,
    Color,
};
use touchline_farm_world::{self as farm, query, World};
use touchline_system_livestock::{Config, Livestock};

fn herd(world: &mut World) {
    let mut events = Vec::new();
    let placements = [
        (AnimalSpecies::Cow, Vec2::new(5.0, 5.0)),
        (AnimalSpecies::Sheep, Vec2::new(95.0, 95.0)),
        (AnimalSpecies::Pig, Vec2::new(50.0, 20.0)),
        (AnimalSpecies::Chicken, Vec2::new(12.0, 88.0)),
    ];
    for (species, position) in placements {
        farm::apply(
            world,
            Command::PlaceAnimal {
                species,
                position,
                color: Color::from_rgb(240, 240, 240),
            },
            &mut events,
        );
    }
}

fn run(seed: u64, ticks: usize) -> (Vec<Event>, World) {
    let mut world = World::new();
    herd(&mut world);
    let mut livestock = Livestock::new(Config::new(FarmTuning::default(), seed));
    let mut log = Vec::new();

    for _ in 0..ticks {
        let mut events = Vec::new();
        farm::apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(500),
            },
            &mut events,
        );
        let mut commands = Vec::new();
        livestock.handle(&events, &query::animal_view(&world), &mut commands);
        for command in commands {
            farm::apply(&mut world, command, &mut events);
        }

        for animal in query::animal_view(&world).iter() {
            assert!((5.0..=95.0).contains(&animal.position.x));
            assert!((5.0..=95.0).contains(&animal.position.y));
        }
        log.extend(events);
    }

    (log, world)
}

#[test]
fn animals_wander_inside_the_field() {
    let (log, world) = run(77, 500);
    assert_eq!(query::animal_view(&world).len(), 4);

    let moves = log
        .iter()
        .filter(|event| matches!(event, Event::AnimalMoved { .. }))
        .count();
    // four animals, 500 steps, about seventy percent moving
    assert!((1_200..=1_600).contains(&moves), "unexpected move count {moves}");
}

#[test]
fn replay_with_the_same_seed_is_identical() {
    let (first, _) = run(5, 100);
    let (second, _) = run(5, 100);
    assert_eq!(first, second);
}
