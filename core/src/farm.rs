//! Contracts for the farm grid simulation.
//!
//! Plots sit on the same square grid as the city, while animals roam freely
//! in percentage coordinates over the whole field.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{CellCoord, Color, EntityId, PlacementError};

/// Crops that can be planted on a plot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CropKind {
    /// Wheat.
    Wheat,
    /// Corn.
    Corn,
    /// Carrot.
    Carrot,
    /// Pumpkin.
    Pumpkin,
}

impl CropKind {
    /// Every crop kind in declaration order.
    pub const ALL: [CropKind; 4] = [Self::Wheat, Self::Corn, Self::Carrot, Self::Pumpkin];
}

/// Growth ordinal of a planted crop, saturating at [`GrowthStage::READY`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GrowthStage(u8);

impl GrowthStage {
    /// Stage of a freshly planted seed.
    pub const SEEDED: GrowthStage = GrowthStage(0);
    /// Stage at which the crop can be harvested.
    pub const READY: GrowthStage = GrowthStage(3);

    /// Creates a stage, saturating values beyond [`GrowthStage::READY`].
    #[must_use]
    pub const fn new(value: u8) -> Self {
        if value > Self::READY.0 {
            Self::READY
        } else {
            Self(value)
        }
    }

    /// Numeric value of the stage.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Reports whether the crop can be harvested.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.0 >= Self::READY.0
    }

    /// Next stage, saturating at [`GrowthStage::READY`].
    #[must_use]
    pub const fn advanced(self) -> Self {
        Self::new(self.0 + 1)
    }
}

/// Crop currently growing on a plot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Planting {
    /// Kind of crop.
    pub crop: CropKind,
    /// Current growth stage.
    pub stage: GrowthStage,
}

impl Planting {
    /// Creates a freshly seeded planting.
    #[must_use]
    pub const fn seeded(crop: CropKind) -> Self {
        Self {
            crop,
            stage: GrowthStage::SEEDED,
        }
    }
}

/// Animal species living on the farm.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimalSpecies {
    /// Cow.
    Cow,
    /// Sheep.
    Sheep,
    /// Pig.
    Pig,
    /// Chicken.
    Chicken,
}

impl AnimalSpecies {
    /// Largest displacement per axis in one step, in field percent.
    #[must_use]
    pub const fn speed(self) -> f32 {
        match self {
            Self::Cow => 1.5,
            Self::Sheep => 2.0,
            Self::Pig => 2.5,
            Self::Chicken => 4.0,
        }
    }
}

/// Commands that express all permissible farm mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Seeds an empty plot.
    Plant {
        /// Plot to seed.
        cell: CellCoord,
        /// Crop to grow.
        crop: CropKind,
    },
    /// Harvests a ready crop and empties the plot.
    Harvest {
        /// Plot to harvest.
        cell: CellCoord,
    },
    /// Removes whatever grows on a plot without harvesting it.
    ClearPlot {
        /// Plot to clear.
        cell: CellCoord,
    },
    /// Grows the crop on a plot by one stage.
    AdvanceGrowth {
        /// Plot whose crop grows.
        cell: CellCoord,
    },
    /// Releases a new animal onto the field.
    PlaceAnimal {
        /// Species of the animal.
        species: AnimalSpecies,
        /// Position in field percent on both axes.
        position: Vec2,
        /// Appearance applied to the animal.
        color: Color,
    },
    /// Removes an animal from the field.
    ReleaseAnimal {
        /// Animal to remove.
        animal: EntityId,
    },
    /// Moves an animal to a new position.
    MoveAnimal {
        /// Animal being moved.
        animal: EntityId,
        /// Destination in field percent.
        position: Vec2,
    },
    /// Replaces every plot from a saved layout and clears all animals.
    RestorePlots {
        /// Plot contents in row-major order.
        plots: Vec<Option<Planting>>,
    },
}

/// Events broadcast by the farm world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a plot was seeded.
    Planted {
        /// Plot that was seeded.
        cell: CellCoord,
        /// Crop that was planted.
        crop: CropKind,
    },
    /// Confirms that a crop grew one stage.
    CropGrew {
        /// Plot whose crop grew.
        cell: CellCoord,
        /// Stage after growing.
        stage: GrowthStage,
    },
    /// Confirms that a ready crop was harvested.
    Harvested {
        /// Plot that was harvested.
        cell: CellCoord,
        /// Crop that was collected.
        crop: CropKind,
    },
    /// Confirms that a plot was cleared without harvesting.
    PlotCleared {
        /// Plot that was cleared.
        cell: CellCoord,
        /// Crop that was discarded.
        crop: CropKind,
    },
    /// Confirms that an animal joined the field.
    AnimalPlaced {
        /// Identifier assigned to the animal.
        animal: EntityId,
        /// Species of the animal.
        species: AnimalSpecies,
        /// Position after clamping into the field.
        position: Vec2,
    },
    /// Confirms that an animal left the field.
    AnimalReleased {
        /// Identifier of the animal.
        animal: EntityId,
    },
    /// Confirms that an animal moved.
    AnimalMoved {
        /// Identifier of the animal.
        animal: EntityId,
        /// Position before moving.
        from: Vec2,
        /// Position after moving.
        to: Vec2,
    },
    /// Reports that a plot request was rejected.
    PlotRejected {
        /// Plot named in the rejected request.
        cell: CellCoord,
        /// Specific reason the request failed.
        reason: PlacementError,
    },
    /// Reports that an animal request was rejected.
    AnimalRejected {
        /// Specific reason the request failed.
        reason: PlacementError,
    },
    /// Confirms that saved plots replaced the field.
    PlotsRestored,
}

/// Read-only view into the dense plot grid.
#[derive(Clone, Copy, Debug)]
pub struct PlotView<'a> {
    plots: &'a [Option<Planting>],
    columns: u32,
    rows: u32,
}

impl<'a> PlotView<'a> {
    /// Captures a new plot view backed by the provided row-major slice.
    #[must_use]
    pub fn new(plots: &'a [Option<Planting>], columns: u32, rows: u32) -> Self {
        Self {
            plots,
            columns,
            rows,
        }
    }

    /// Crop growing at `cell`, if any.
    #[must_use]
    pub fn planting(&self, cell: CellCoord) -> Option<Planting> {
        let index = cell.index_in(self.columns, self.rows)?;
        self.plots.get(index).copied().flatten()
    }

    /// Iterator over every planted plot in row-major order.
    pub fn planted(&self) -> impl Iterator<Item = (CellCoord, Planting)> + 'a {
        let columns = self.columns.max(1);
        self.plots
            .iter()
            .copied()
            .zip(0u32..)
            .filter_map(move |(plot, index)| {
                plot.map(|planting| {
                    (CellCoord::new(index % columns, index / columns), planting)
                })
            })
    }

    /// Provides the dimensions of the underlying grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }
}

/// Immutable representation of a single animal used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimalSnapshot {
    /// Unique identifier assigned to the animal.
    pub id: EntityId,
    /// Species of the animal.
    pub species: AnimalSpecies,
    /// Position in field percent.
    pub position: Vec2,
    /// Appearance assigned to the animal.
    pub color: Color,
}

/// Read-only snapshot describing all animals on the field.
#[derive(Clone, Debug, Default)]
pub struct AnimalView {
    snapshots: Vec<AnimalSnapshot>,
}

impl AnimalView {
    /// Creates a new animal view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<AnimalSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &AnimalSnapshot> {
        self.snapshots.iter()
    }

    /// Number of captured animals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no animals.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<AnimalSnapshot> {
        self.snapshots
    }
}
