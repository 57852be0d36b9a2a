use std::time::Duration;

use anyhow::{bail, Result};
use glam::Vec2;
use touchline_city_world::query as city_query;
use touchline_commentary::{Commentator, OfflineCollaborator};
use touchline_core::{
    city::{self, EntityKind, TileKind},
    farm::{self, AnimalSpecies, CropKind},
    shootout::{Event, MatchResult, Phase, ShotOutcome, Turn},
    tuning::{CityTuning, FarmTuning, ShootoutTuning},
    CellCoord, Color, Direction,
};
use touchline_farm_world::query as farm_query;
use touchline_session::{CitySession, FarmSession, ShootoutSession};
use touchline_shootout_world::query as shootout_query;
use touchline_store::KeyValueStore;

use crate::{GridArgs, ShootoutArgs};

const HOME: &str = "Touchline FC";
const AWAY: &str = "Computer XI";
const KICK_SPOT: Vec2 = Vec2::new(200.0, 700.0);

pub(crate) fn shootout(
    store: &mut dyn KeyValueStore,
    tuning: ShootoutTuning,
    seed: u64,
    args: &ShootoutArgs,
) -> Result<()> {
    if args.tick_ms == 0 {
        bail!("--tick-ms must be positive");
    }
    if args.drag_y <= tuning.min_vertical_drag {
        bail!(
            "a drag of {} never clears the {} threshold, so no shot would be taken",
            args.drag_y,
            tuning.min_vertical_drag
        );
    }

    let mut commentator = Commentator::new(OfflineCollaborator);
    if let Some(line) = commentator.commentary(HOME, AWAY).first() {
        println!("{line}");
    }

    let mut outcome: Option<(MatchResult, u32, u32)> = None;
    let mut session = ShootoutSession::start(store, tuning, seed, |result, user, cpu| {
        outcome = Some((result, user, cpu));
    });
    println!("difficulty: {:?}", session.difficulty());

    let tick = Duration::from_millis(args.tick_ms);
    let release = KICK_SPOT + Vec2::new(args.drag_x, -args.drag_y);
    while !session.is_over() {
        let world = session.world();
        let mut events = Vec::new();
        if shootout_query::turn(world) == Turn::Player
            && shootout_query::phase(world) == Phase::Idle
        {
            events.extend(session.pointer_down(KICK_SPOT));
            events.extend(session.pointer_up(release));
        }
        events.extend(session.advance(tick));
        report_shots(&events);
    }
    let _ = session.teardown();

    match outcome {
        Some((result, user, cpu)) => println!("{HOME} {user} - {cpu} {AWAY}: {result}"),
        None => println!("match abandoned"),
    }
    Ok(())
}

fn report_shots(events: &[Event]) {
    for event in events {
        if let Event::ShotResolved {
            round,
            turn,
            outcome,
            score,
        } = event
        {
            let shooter = match turn {
                Turn::Player => HOME,
                Turn::Cpu => AWAY,
            };
            let verdict = match outcome {
                ShotOutcome::Goal => "scores",
                ShotOutcome::Saved => "is saved",
                ShotOutcome::Missed => "misses",
            };
            println!(
                "round {round}: {shooter} {verdict} ({}-{})",
                score.user, score.cpu
            );
        }
    }
}

pub(crate) fn city(
    store: &mut dyn KeyValueStore,
    tuning: CityTuning,
    seed: u64,
    args: &GridArgs,
) -> Result<()> {
    let mut session = CitySession::open(store, tuning, seed, |reason| {
        println!("rejected: {reason}");
    });

    let has_roads = city_query::tiles(session.world())
        .iter()
        .any(|tile| tile.is_road());
    if !has_roads {
        for offset in 4..=15 {
            for cell in [
                CellCoord::new(offset, 4),
                CellCoord::new(offset, 15),
                CellCoord::new(4, offset),
                CellCoord::new(15, offset),
            ] {
                let _ = session.set_tile(cell, TileKind::Road);
            }
        }
        let _ = session.set_tile(CellCoord::new(6, 6), TileKind::House);
        let _ = session.set_tile(CellCoord::new(12, 12), TileKind::Commerce);
    }

    let (columns, _) = city_query::dimensions(session.world());
    let roads: Vec<CellCoord> = city_query::tiles(session.world())
        .iter()
        .zip(0u32..)
        .filter(|(tile, _)| tile.is_road())
        .map(|(_, index)| CellCoord::new(index % columns, index / columns))
        .collect();
    let population = [
        (EntityKind::Car, Color::from_rgb(210, 40, 40)),
        (EntityKind::Car, Color::from_rgb(40, 90, 210)),
        (EntityKind::Car, Color::from_rgb(240, 200, 40)),
        (EntityKind::Pedestrian, Color::from_rgb(30, 30, 30)),
        (EntityKind::Pedestrian, Color::from_rgb(120, 60, 160)),
    ];
    let spacing = (roads.len() / population.len()).max(1);
    for (index, (kind, color)) in population.into_iter().enumerate() {
        if let Some(cell) = roads.get(index * spacing) {
            let _ = session.place_entity(kind, *cell, Direction::East, color);
        }
    }

    let tick = Duration::from_millis(args.tick_ms);
    let mut moves = 0usize;
    let mut turns = 0usize;
    for _ in 0..args.ticks {
        for event in session.advance(tick) {
            match event {
                city::Event::EntityMoved { .. } => moves += 1,
                city::Event::EntityTurned { .. } => turns += 1,
                _ => {}
            }
        }
    }

    println!(
        "{} road tiles, {moves} moves, {turns} turns",
        roads.len()
    );
    for entity in city_query::entity_view(session.world()).iter() {
        println!(
            "{:?} #{} at ({}, {}) facing {:?}",
            entity.kind,
            entity.id.get(),
            entity.cell.column(),
            entity.cell.row(),
            entity.facing
        );
    }
    let _ = session.teardown();
    Ok(())
}

pub(crate) fn farm(
    store: &mut dyn KeyValueStore,
    tuning: FarmTuning,
    seed: u64,
    args: &GridArgs,
) -> Result<()> {
    let mut session = FarmSession::open(store, tuning, seed, |reason| {
        println!("rejected: {reason}");
    });

    if farm_query::plot_view(session.world()).planted().next().is_none() {
        for (row, crop) in (2u32..).zip(CropKind::ALL) {
            for column in 2..8 {
                let _ = session.plant(CellCoord::new(column, row), crop);
            }
        }
    }
    let herd = [
        (AnimalSpecies::Cow, Vec2::new(30.0, 60.0)),
        (AnimalSpecies::Sheep, Vec2::new(45.0, 70.0)),
        (AnimalSpecies::Pig, Vec2::new(60.0, 65.0)),
        (AnimalSpecies::Chicken, Vec2::new(75.0, 80.0)),
    ];
    for (species, position) in herd {
        let _ = session.place_animal(species, position, Color::from_rgb(250, 250, 240));
    }

    let tick = Duration::from_millis(args.tick_ms);
    let mut growth = 0usize;
    for _ in 0..args.ticks {
        growth += session
            .advance(tick)
            .iter()
            .filter(|event| matches!(event, farm::Event::CropGrew { .. }))
            .count();
    }

    let ready: Vec<CellCoord> = farm_query::plot_view(session.world())
        .planted()
        .filter(|(_, planting)| planting.stage.is_ready())
        .map(|(cell, _)| cell)
        .collect();
    for cell in &ready {
        let _ = session.harvest(*cell);
    }

    println!("{growth} growth steps, {} plots harvested", ready.len());
    for crop in CropKind::ALL {
        println!(
            "{crop:?}: {} harvested",
            farm_query::harvested(session.world(), crop)
        );
    }
    for animal in farm_query::animal_view(session.world()).iter() {
        println!(
            "{:?} #{} at ({:.1}, {:.1})",
            animal.species,
            animal.id.get(),
            animal.position.x,
            animal.position.y
        );
    }
    let _ = session.teardown();
    Ok(())
}
