use std::{collections::BTreeMap, time::Duration};

use touchline_core::{
    farm::{Command, CropKind, Event, GrowthStage},
    tuning::FarmTuning,
    CellCoord,
};
use touchline_farm_world::{self as farm, query, World};
use touchline_system_crops::{Config, Crops};

const TICK: Duration = Duration::from_millis(500);

fn planted_field() -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    for (index, crop) in CropKind::ALL.into_iter().enumerate() {
        let column = u32::try_from(index).expect("small index");
        for row in 0..5 {
            farm::apply(
                &mut world,
                Command::Plant {
                    cell: CellCoord::new(column, row),
                    crop,
                },
                &mut events,
            );
        }
    }
    world
}

fn pump(world: &mut World, crops: &mut Crops, ticks: usize, log: &mut Vec<Event>) {
    for _ in 0..ticks {
        let mut events = Vec::new();
        farm::apply(world, Command::Tick { dt: TICK }, &mut events);
        let mut commands = Vec::new();
        crops.handle(&events, query::plot_view(world), &mut commands);
        for command in commands {
            farm::apply(world, command, &mut events);
        }
        log.extend(events);
    }
}

fn stages(world: &World) -> BTreeMap<CellCoord, GrowthStage> {
    query::plot_view(world)
        .planted()
        .map(|(cell, planting)| (cell, planting.stage))
        .collect()
}

#[test]
fn stages_only_grow_and_cap_at_ready() {
    let mut world = planted_field();
    let mut crops = Crops::new(Config::new(FarmTuning::default(), 9));
    let mut log = Vec::new();
    let mut previous = stages(&world);

    for _ in 0..200 {
        pump(&mut world, &mut crops, 1, &mut log);
        let current = stages(&world);
        for (cell, stage) in &current {
            assert!(stage >= &previous[cell], "crop at {cell:?} shrank");
            assert!(stage.get() <= GrowthStage::READY.get());
        }
        previous = current;
    }

    assert!(previous.values().all(GrowthStage::is_ready));
    assert!(!log
        .iter()
        .any(|event| matches!(event, Event::PlotRejected { .. })));
}

#[test]
fn growth_rolls_once_per_growth_period() {
    let mut world = planted_field();
    let tuning = FarmTuning {
        growth_chance: 1.0,
        ..FarmTuning::default()
    };
    let mut crops = Crops::new(Config::new(tuning, 1));
    let mut log = Vec::new();

    pump(&mut world, &mut crops, 3, &mut log);
    assert!(stages(&world).values().all(|stage| *stage == GrowthStage::SEEDED));

    pump(&mut world, &mut crops, 1, &mut log);
    assert!(stages(&world)
        .values()
        .all(|stage| *stage == GrowthStage::new(1)));
}

#[test]
fn harvest_after_ripening_counts_the_crop() {
    let mut world = planted_field();
    let mut crops = Crops::new(Config::new(FarmTuning::default(), 3));
    let mut log = Vec::new();
    pump(&mut world, &mut crops, 400, &mut log);

    let cell = CellCoord::new(0, 0);
    let mut events = Vec::new();
    farm::apply(&mut world, Command::Harvest { cell }, &mut events);

    assert_eq!(
        events,
        vec![Event::Harvested {
            cell,
            crop: CropKind::Wheat,
        }]
    );
    assert_eq!(query::harvested(&world, CropKind::Wheat), 1);
    assert_eq!(query::planting(&world, cell), None);
}
