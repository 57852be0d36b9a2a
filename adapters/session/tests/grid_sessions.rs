use std::{cell::RefCell, time::Duration};

use glam::Vec2;
use touchline_city_world::query as city_query;
use touchline_core::{
    city::{self, EntityKind, TileKind},
    farm::{self, AnimalSpecies, CropKind, GrowthStage},
    tuning::{CityTuning, FarmTuning},
    CellCoord, Color, Direction, PlacementError,
};
use touchline_farm_world::query as farm_query;
use touchline_session::{CitySession, FarmSession, CITY_LAYOUT_KEY};
use touchline_store::{KeyValueStore, MemoryStore};

const RED: Color = Color::from_rgb(220, 30, 30);

#[test]
fn car_on_grass_is_rejected_with_a_notification() {
    let notices = RefCell::new(Vec::new());
    let mut session = CitySession::open(MemoryStore::new(), CityTuning::default(), 1, |reason| {
        notices.borrow_mut().push(reason)
    });

    let cell = CellCoord::new(3, 3);
    let events = session.place_entity(EntityKind::Car, cell, Direction::East, RED);

    assert_eq!(
        events,
        vec![city::Event::PlacementRejected {
            cell,
            reason: PlacementError::RequiresRoad,
        }]
    );
    assert!(city_query::entity_view(session.world()).is_empty());
    assert!(city_query::tiles(session.world())
        .iter()
        .all(|tile| *tile == TileKind::Grass));
    drop(session);
    assert_eq!(notices.into_inner(), vec![PlacementError::RequiresRoad]);
}

#[test]
fn bulldozing_a_parked_car_removes_it() {
    let mut session = CitySession::open(MemoryStore::new(), CityTuning::default(), 2, |_| {});
    let cell = CellCoord::new(5, 5);
    let _ = session.set_tile(cell, TileKind::Road);
    let _ = session.place_entity(EntityKind::Car, cell, Direction::North, RED);
    assert_eq!(city_query::entity_view(session.world()).len(), 1);

    let _ = session.bulldoze(cell);
    assert_eq!(city_query::tile(session.world(), cell), Some(TileKind::Grass));
    assert!(city_query::entity_view(session.world()).is_empty());
}

#[test]
fn city_layout_survives_a_remount() {
    let mut session = CitySession::open(MemoryStore::new(), CityTuning::default(), 3, |_| {});
    for column in 0..6 {
        let _ = session.set_tile(CellCoord::new(column, 2), TileKind::Road);
    }
    let _ = session.set_tile(CellCoord::new(0, 0), TileKind::House);
    let _ = session.place_entity(EntityKind::Car, CellCoord::new(0, 2), Direction::East, RED);
    for _ in 0..20 {
        let _ = session.advance(Duration::from_millis(250));
    }
    let store = session.teardown();
    assert!(store.get(CITY_LAYOUT_KEY).expect("get").is_some());

    let remounted = CitySession::open(store, CityTuning::default(), 3, |_| {});
    let world = remounted.world();
    assert_eq!(city_query::tile(world, CellCoord::new(0, 0)), Some(TileKind::House));
    assert_eq!(city_query::tile(world, CellCoord::new(5, 2)), Some(TileKind::Road));
    assert!(city_query::entity_view(world).is_empty());
}

#[test]
fn city_traffic_keeps_cars_on_the_road() {
    let mut session = CitySession::open(MemoryStore::new(), CityTuning::default(), 4, |_| {});
    for column in 2..12 {
        let _ = session.set_tile(CellCoord::new(column, 7), TileKind::Road);
    }
    let _ = session.place_entity(EntityKind::Car, CellCoord::new(2, 7), Direction::East, RED);
    let _ = session.place_entity(EntityKind::Pedestrian, CellCoord::new(6, 7), Direction::West, RED);

    let mut moved = false;
    for _ in 0..200 {
        let events = session.advance(Duration::from_millis(100));
        moved |= events
            .iter()
            .any(|event| matches!(event, city::Event::EntityMoved { .. }));
        for entity in city_query::entity_view(session.world()).iter() {
            assert_eq!(entity.cell.row(), 7);
        }
    }
    assert!(moved);
}

#[test]
fn planting_an_occupied_plot_notifies_and_changes_nothing() {
    let notices = RefCell::new(Vec::new());
    let mut session = FarmSession::open(MemoryStore::new(), FarmTuning::default(), 5, |reason| {
        notices.borrow_mut().push(reason)
    });
    let cell = CellCoord::new(1, 1);
    let _ = session.plant(cell, CropKind::Corn);
    let events = session.plant(cell, CropKind::Wheat);

    assert_eq!(
        events,
        vec![farm::Event::PlotRejected {
            cell,
            reason: PlacementError::PlotOccupied,
        }]
    );
    assert_eq!(
        farm_query::planting(session.world(), cell).map(|planting| planting.crop),
        Some(CropKind::Corn)
    );
    let _ = session.harvest(cell);
    drop(session);
    assert_eq!(
        notices.into_inner(),
        vec![PlacementError::PlotOccupied, PlacementError::NotReady]
    );
}

#[test]
fn farm_grows_crops_and_wanders_animals() {
    let mut session = FarmSession::open(MemoryStore::new(), FarmTuning::default(), 6, |_| {});
    let cell = CellCoord::new(4, 4);
    let _ = session.plant(cell, CropKind::Pumpkin);
    let _ = session.place_animal(AnimalSpecies::Chicken, Vec2::new(50.0, 50.0), RED);

    let mut animal_moves = 0;
    for _ in 0..240 {
        let events = session.advance(Duration::from_millis(500));
        animal_moves += events
            .iter()
            .filter(|event| matches!(event, farm::Event::AnimalMoved { .. }))
            .count();
    }

    assert!(animal_moves > 0);
    let planting = farm_query::planting(session.world(), cell).expect("still planted");
    assert_eq!(planting.stage, GrowthStage::READY);

    let events = session.harvest(cell);
    assert!(matches!(events[..], [farm::Event::Harvested { .. }]));
    assert_eq!(farm_query::harvested(session.world(), CropKind::Pumpkin), 1);
}

#[test]
fn farm_plots_survive_a_remount() {
    let mut session = FarmSession::open(MemoryStore::new(), FarmTuning::default(), 7, |_| {});
    let _ = session.plant(CellCoord::new(2, 3), CropKind::Carrot);
    let _ = session.place_animal(AnimalSpecies::Cow, Vec2::new(20.0, 30.0), RED);
    let store = session.teardown();

    let remounted = FarmSession::open(store, FarmTuning::default(), 7, |_| {});
    assert_eq!(
        farm_query::planting(remounted.world(), CellCoord::new(2, 3))
            .map(|planting| planting.crop),
        Some(CropKind::Carrot)
    );
    assert!(farm_query::animal_view(remounted.world()).is_empty());
}
