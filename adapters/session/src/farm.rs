use std::time::Duration;

use glam::Vec2;
use touchline_core::{
    farm::{AnimalSpecies, Command, CropKind, Event, Planting},
    tuning::FarmTuning,
    CellCoord, Color, EntityId, PlacementError,
};
use touchline_farm_world::{self as world, query, World};
use touchline_store::{KeyValueStore, LayoutSnapshot};
use touchline_system_crops::Crops;
use touchline_system_livestock::Livestock;
use tracing::{info, warn};

use crate::FARM_LAYOUT_KEY;

const DOMAIN: &str = "farm";

/// Drives the farm: plot edits, the animal timer and the growth timer.
#[derive(Debug)]
pub struct FarmSession<S, N> {
    store: S,
    world: World,
    livestock: Livestock,
    crops: Crops,
    notify: N,
}

impl<S, N> FarmSession<S, N>
where
    S: KeyValueStore,
    N: FnMut(PlacementError),
{
    /// Opens the farm, restoring saved plots when they exist.
    pub fn open(store: S, tuning: FarmTuning, seed: u64, notify: N) -> Self {
        let mut world = World::with_field_bounds(tuning.field_min, tuning.field_max);
        let (columns, rows) = query::plot_view(&world).dimensions();
        match LayoutSnapshot::<Option<Planting>>::load(&store, FARM_LAYOUT_KEY, DOMAIN) {
            Ok(Some(snapshot)) if snapshot.dimensions() == (columns, rows) => {
                let mut events = Vec::new();
                world::apply(
                    &mut world,
                    Command::RestorePlots {
                        plots: snapshot.into_cells(),
                    },
                    &mut events,
                );
            }
            Ok(Some(snapshot)) => {
                warn!(
                    saved = ?snapshot.dimensions(),
                    expected = ?(columns, rows),
                    "saved farm has the wrong size, starting empty"
                );
            }
            Ok(None) => info!("no saved farm, starting empty"),
            Err(error) => warn!(%error, "saved farm unreadable, starting empty"),
        }

        Self {
            store,
            world,
            livestock: Livestock::new(touchline_system_livestock::Config::new(
                tuning.clone(),
                seed,
            )),
            crops: Crops::new(touchline_system_crops::Config::new(
                tuning,
                seed.wrapping_add(1),
            )),
            notify,
        }
    }

    /// Read-only access to the farm state.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Seeds an empty plot.
    pub fn plant(&mut self, cell: CellCoord, crop: CropKind) -> Vec<Event> {
        self.edit(Command::Plant { cell, crop })
    }

    /// Harvests a ripe plot.
    pub fn harvest(&mut self, cell: CellCoord) -> Vec<Event> {
        self.edit(Command::Harvest { cell })
    }

    /// Clears a plot without harvesting it.
    pub fn clear_plot(&mut self, cell: CellCoord) -> Vec<Event> {
        self.edit(Command::ClearPlot { cell })
    }

    /// Puts a new animal on the field.
    pub fn place_animal(
        &mut self,
        species: AnimalSpecies,
        position: Vec2,
        color: Color,
    ) -> Vec<Event> {
        self.edit(Command::PlaceAnimal {
            species,
            position,
            color,
        })
    }

    /// Removes an animal from the field.
    pub fn release_animal(&mut self, animal: EntityId) -> Vec<Event> {
        self.edit(Command::ReleaseAnimal { animal })
    }

    /// Advances both farm timers by `dt`.
    ///
    /// Animals and crops plan from the state at the start of the tick.
    pub fn advance(&mut self, dt: Duration) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::Tick { dt }, &mut events);

        let mut commands = Vec::new();
        self.livestock
            .handle(&events, &query::animal_view(&self.world), &mut commands);
        self.crops
            .handle(&events, query::plot_view(&self.world), &mut commands);
        for command in commands {
            world::apply(&mut self.world, command, &mut events);
        }
        events
    }

    /// Writes the current plots to the store.
    pub fn save(&mut self) {
        let (columns, rows) = query::plot_view(&self.world).dimensions();
        let saved = LayoutSnapshot::new(DOMAIN, columns, rows, query::plots(&self.world).to_vec())
            .and_then(|snapshot| snapshot.save(&mut self.store, FARM_LAYOUT_KEY));
        if let Err(error) = saved {
            warn!(%error, "could not save the farm");
        }
    }

    /// Saves the plots and returns the store.
    pub fn teardown(mut self) -> S {
        self.save();
        self.store
    }

    fn edit(&mut self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        for event in &events {
            match event {
                Event::PlotRejected { reason, .. } | Event::AnimalRejected { reason } => {
                    (self.notify)(*reason);
                }
                _ => {}
            }
        }
        events
    }
}
