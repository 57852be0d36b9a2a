#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative farm state for Touchline.

use std::collections::BTreeMap;

use glam::Vec2;
use touchline_core::{
    farm::{AnimalSpecies, Command, CropKind, Event, Planting},
    tuning::FarmTuning,
    CellCoord, Color, EntityId, PlacementError, GRID_SIZE,
};
use tracing::{debug, info};

/// Represents the authoritative farm state.
#[derive(Debug)]
pub struct World {
    columns: u32,
    rows: u32,
    plots: Vec<Option<Planting>>,
    animals: Vec<Animal>,
    next_animal_id: u32,
    field_min: f32,
    field_max: f32,
    harvested: BTreeMap<CropKind, u32>,
}

impl World {
    /// Creates an empty farm of the default size with the default field bounds.
    #[must_use]
    pub fn new() -> Self {
        let tuning = FarmTuning::default();
        Self::with_field_bounds(tuning.field_min, tuning.field_max)
    }

    /// Creates an empty farm whose animals stay within `min..=max` percent.
    #[must_use]
    pub fn with_field_bounds(min: f32, max: f32) -> Self {
        let capacity = usize::try_from(u64::from(GRID_SIZE) * u64::from(GRID_SIZE)).unwrap_or(0);
        Self {
            columns: GRID_SIZE,
            rows: GRID_SIZE,
            plots: vec![None; capacity],
            animals: Vec::new(),
            next_animal_id: 0,
            field_min: min.min(max),
            field_max: max.max(min),
            harvested: BTreeMap::new(),
        }
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        cell.index_in(self.columns, self.rows)
    }

    fn clamp_to_field(&self, position: Vec2) -> Vec2 {
        position.clamp(Vec2::splat(self.field_min), Vec2::splat(self.field_max))
    }

    fn plot_request(
        &mut self,
        cell: CellCoord,
        out_events: &mut Vec<Event>,
    ) -> Option<&mut Option<Planting>> {
        match self.index(cell) {
            Some(index) => self.plots.get_mut(index),
            None => {
                reject_plot(cell, PlacementError::OutOfBounds, out_events);
                None
            }
        }
    }

    fn plant(&mut self, cell: CellCoord, crop: CropKind, out_events: &mut Vec<Event>) {
        let Some(plot) = self.plot_request(cell, out_events) else {
            return;
        };
        if plot.is_some() {
            reject_plot(cell, PlacementError::PlotOccupied, out_events);
            return;
        }

        *plot = Some(Planting::seeded(crop));
        out_events.push(Event::Planted { cell, crop });
    }

    fn harvest(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) {
        let Some(plot) = self.plot_request(cell, out_events) else {
            return;
        };
        let Some(planting) = *plot else {
            reject_plot(cell, PlacementError::NothingPlanted, out_events);
            return;
        };
        if !planting.stage.is_ready() {
            reject_plot(cell, PlacementError::NotReady, out_events);
            return;
        }

        *plot = None;
        *self.harvested.entry(planting.crop).or_insert(0) += 1;
        out_events.push(Event::Harvested {
            cell,
            crop: planting.crop,
        });
    }

    fn clear_plot(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) {
        let Some(plot) = self.plot_request(cell, out_events) else {
            return;
        };
        match plot.take() {
            Some(planting) => out_events.push(Event::PlotCleared {
                cell,
                crop: planting.crop,
            }),
            None => reject_plot(cell, PlacementError::NothingPlanted, out_events),
        }
    }

    fn advance_growth(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) {
        let Some(plot) = self.plot_request(cell, out_events) else {
            return;
        };
        let Some(planting) = plot.as_mut() else {
            reject_plot(cell, PlacementError::NothingPlanted, out_events);
            return;
        };
        if planting.stage.is_ready() {
            return;
        }

        planting.stage = planting.stage.advanced();
        out_events.push(Event::CropGrew {
            cell,
            stage: planting.stage,
        });
    }

    fn place_animal(
        &mut self,
        species: AnimalSpecies,
        position: Vec2,
        color: Color,
        out_events: &mut Vec<Event>,
    ) {
        let inside = position.is_finite()
            && (0.0..=100.0).contains(&position.x)
            && (0.0..=100.0).contains(&position.y);
        if !inside {
            debug!(?species, ?position, "animal placed outside the field");
            out_events.push(Event::AnimalRejected {
                reason: PlacementError::OutOfBounds,
            });
            return;
        }

        let id = EntityId::new(self.next_animal_id);
        self.next_animal_id = self.next_animal_id.saturating_add(1);
        let position = self.clamp_to_field(position);
        self.animals.push(Animal {
            id,
            species,
            position,
            color,
        });
        out_events.push(Event::AnimalPlaced {
            animal: id,
            species,
            position,
        });
    }

    fn move_animal(&mut self, animal: EntityId, position: Vec2, out_events: &mut Vec<Event>) {
        if !position.is_finite() {
            debug!(animal = animal.get(), ?position, "animal move is not a position");
            out_events.push(Event::AnimalRejected {
                reason: PlacementError::OutOfBounds,
            });
            return;
        }
        let destination = self.clamp_to_field(position);
        let Some(moving) = self.animals.iter_mut().find(|candidate| candidate.id == animal) else {
            out_events.push(Event::AnimalRejected {
                reason: PlacementError::UnknownEntity,
            });
            return;
        };

        let from = moving.position;
        moving.position = destination;
        out_events.push(Event::AnimalMoved {
            animal,
            from,
            to: destination,
        });
    }

    fn release_animal(&mut self, animal: EntityId, out_events: &mut Vec<Event>) {
        match self.animals.iter().position(|candidate| candidate.id == animal) {
            Some(index) => {
                let _ = self.animals.remove(index);
                out_events.push(Event::AnimalReleased { animal });
            }
            None => out_events.push(Event::AnimalRejected {
                reason: PlacementError::UnknownEntity,
            }),
        }
    }

    fn restore_plots(&mut self, plots: Vec<Option<Planting>>, out_events: &mut Vec<Event>) {
        if plots.len() != self.plots.len() {
            debug!(
                expected = self.plots.len(),
                received = plots.len(),
                "saved plots do not match the grid"
            );
            reject_plot(CellCoord::new(0, 0), PlacementError::LayoutMismatch, out_events);
            return;
        }

        self.plots = plots;
        self.animals.clear();
        info!("farm plots restored");
        out_events.push(Event::PlotsRestored);
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

fn reject_plot(cell: CellCoord, reason: PlacementError, out_events: &mut Vec<Event>) {
    debug!(?cell, %reason, "plot request rejected");
    out_events.push(Event::PlotRejected { cell, reason });
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => out_events.push(Event::TimeAdvanced { dt }),
        Command::Plant { cell, crop } => world.plant(cell, crop, out_events),
        Command::Harvest { cell } => world.harvest(cell, out_events),
        Command::ClearPlot { cell } => world.clear_plot(cell, out_events),
        Command::AdvanceGrowth { cell } => world.advance_growth(cell, out_events),
        Command::PlaceAnimal {
            species,
            position,
            color,
        } => world.place_animal(species, position, color, out_events),
        Command::ReleaseAnimal { animal } => world.release_animal(animal, out_events),
        Command::MoveAnimal { animal, position } => {
            world.move_animal(animal, position, out_events);
        }
        Command::RestorePlots { plots } => world.restore_plots(plots, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use touchline_core::{
        farm::{AnimalSnapshot, AnimalView, CropKind, Planting, PlotView},
        CellCoord,
    };

    use super::World;

    /// Exposes a read-only view of the plot grid.
    #[must_use]
    pub fn plot_view(world: &World) -> PlotView<'_> {
        PlotView::new(&world.plots, world.columns, world.rows)
    }

    /// Plot contents in row-major order, suitable for saving the farm.
    #[must_use]
    pub fn plots(world: &World) -> &[Option<Planting>] {
        &world.plots
    }

    /// Crop growing at `cell`, if any.
    #[must_use]
    pub fn planting(world: &World, cell: CellCoord) -> Option<Planting> {
        plot_view(world).planting(cell)
    }

    /// Captures a read-only view of the animals on the field.
    #[must_use]
    pub fn animal_view(world: &World) -> AnimalView {
        AnimalView::from_snapshots(
            world
                .animals
                .iter()
                .map(|animal| AnimalSnapshot {
                    id: animal.id,
                    species: animal.species,
                    position: animal.position,
                    color: animal.color,
                })
                .collect(),
        )
    }

    /// Number of crops of `crop` harvested so far.
    #[must_use]
    pub fn harvested(world: &World, crop: CropKind) -> u32 {
        world.harvested.get(&crop).copied().unwrap_or(0)
    }

    /// Lowest and highest percentage coordinate animals may occupy.
    #[must_use]
    pub fn field_bounds(world: &World) -> (f32, f32) {
        (world.field_min, world.field_max)
    }
}

#[derive(Clone, Debug)]
struct Animal {
    id: EntityId,
    species: AnimalSpecies,
    position: Vec2,
    color: Color,
}
