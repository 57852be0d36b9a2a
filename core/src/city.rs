//! Contracts for the city builder grid simulation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{CellCoord, Color, Direction, EntityId, PlacementError};

/// Type tag of a single city tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Empty land; the bulldozer leaves grass behind.
    #[default]
    Grass,
    /// Drivable and walkable road.
    Road,
    /// Residential building.
    House,
    /// Commercial building.
    Commerce,
}

impl TileKind {
    /// Reports whether cars and pedestrians may stand on the tile.
    #[must_use]
    pub const fn is_road(self) -> bool {
        matches!(self, Self::Road)
    }
}

/// Kinds of mobile entities that inhabit the city.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Vehicle following the road network.
    Car,
    /// Walker that wanders along roads and never blocks anything.
    Pedestrian,
}

/// Side of the road a pedestrian is drawn on. Render-only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SidewalkSide {
    /// Left-hand sidewalk relative to the road axis.
    #[default]
    Left,
    /// Right-hand sidewalk relative to the road axis.
    Right,
}

/// Commands that express all permissible city mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Overwrites the kind of a single tile.
    SetTile {
        /// Tile being edited.
        cell: CellCoord,
        /// Kind the tile should become.
        kind: TileKind,
    },
    /// Returns a tile to grass and clears anything standing on it.
    Bulldoze {
        /// Tile being cleared.
        cell: CellCoord,
    },
    /// Places a new entity on a road tile.
    PlaceEntity {
        /// Kind of entity to create.
        kind: EntityKind,
        /// Road tile that receives the entity.
        cell: CellCoord,
        /// Initial facing of the entity.
        facing: Direction,
        /// Appearance applied to the entity.
        color: Color,
    },
    /// Moves an entity one tile along the road network.
    MoveEntity {
        /// Entity being moved.
        entity: EntityId,
        /// Adjacent road tile the entity moves onto.
        to: CellCoord,
        /// Facing after the move.
        facing: Direction,
    },
    /// Changes the facing of an entity without moving it.
    TurnEntity {
        /// Entity being turned.
        entity: EntityId,
        /// New facing.
        facing: Direction,
    },
    /// Switches the sidewalk a pedestrian is drawn on.
    SetSidewalk {
        /// Pedestrian being updated.
        entity: EntityId,
        /// Side to draw the pedestrian on.
        side: SidewalkSide,
    },
    /// Replaces every tile from a saved layout and clears all entities.
    RestoreLayout {
        /// Tile kinds in row-major order.
        tiles: Vec<TileKind>,
    },
}

/// Events broadcast by the city world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a tile changed kind.
    TileChanged {
        /// Tile that changed.
        cell: CellCoord,
        /// Kind before the edit.
        from: TileKind,
        /// Kind after the edit.
        to: TileKind,
    },
    /// Confirms that an entity was created.
    EntityPlaced {
        /// Identifier assigned to the entity.
        entity: EntityId,
        /// Kind of entity that was created.
        kind: EntityKind,
        /// Tile the entity occupies.
        cell: CellCoord,
    },
    /// Confirms that an entity was removed by a tile edit.
    EntityRemoved {
        /// Identifier of the removed entity.
        entity: EntityId,
        /// Tile the entity occupied.
        cell: CellCoord,
    },
    /// Confirms that an entity moved between two tiles.
    EntityMoved {
        /// Identifier of the entity that moved.
        entity: EntityId,
        /// Tile occupied before the move.
        from: CellCoord,
        /// Tile occupied after the move.
        to: CellCoord,
    },
    /// Confirms that an entity changed facing.
    EntityTurned {
        /// Identifier of the entity that turned.
        entity: EntityId,
        /// New facing.
        facing: Direction,
    },
    /// Confirms that a pedestrian switched sidewalk.
    SidewalkChanged {
        /// Identifier of the pedestrian.
        entity: EntityId,
        /// Side the pedestrian is drawn on.
        side: SidewalkSide,
    },
    /// Reports that an edit or placement request was rejected.
    PlacementRejected {
        /// Tile named in the rejected request.
        cell: CellCoord,
        /// Specific reason the request failed.
        reason: PlacementError,
    },
    /// Reports that a movement command was dropped.
    MoveRejected {
        /// Entity named in the rejected command.
        entity: EntityId,
        /// Specific reason the move failed.
        reason: PlacementError,
    },
    /// Confirms that a saved layout replaced the grid.
    LayoutRestored,
}

/// Read-only view into the dense tile grid.
#[derive(Clone, Copy, Debug)]
pub struct TileView<'a> {
    tiles: &'a [TileKind],
    columns: u32,
    rows: u32,
}

impl<'a> TileView<'a> {
    /// Captures a new tile view backed by the provided row-major slice.
    #[must_use]
    pub fn new(tiles: &'a [TileKind], columns: u32, rows: u32) -> Self {
        Self {
            tiles,
            columns,
            rows,
        }
    }

    /// Kind of the tile at `cell`, or `None` outside the grid.
    #[must_use]
    pub fn kind(&self, cell: CellCoord) -> Option<TileKind> {
        cell.index_in(self.columns, self.rows)
            .and_then(|index| self.tiles.get(index).copied())
    }

    /// Reports whether `cell` lies inside the grid and holds a road.
    #[must_use]
    pub fn is_road(&self, cell: CellCoord) -> bool {
        self.kind(cell).is_some_and(TileKind::is_road)
    }

    /// Neighbour of `cell` in `direction` when it is a road tile.
    #[must_use]
    pub fn road_neighbour(&self, cell: CellCoord, direction: Direction) -> Option<CellCoord> {
        cell.step(direction, self.columns, self.rows)
            .filter(|neighbour| self.is_road(*neighbour))
    }

    /// Returns an iterator over all tiles in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = TileKind> + 'a {
        self.tiles.iter().copied()
    }

    /// Provides the dimensions of the underlying grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }
}

/// Immutable representation of a single city entity used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntitySnapshot {
    /// Unique identifier assigned to the entity.
    pub id: EntityId,
    /// Kind of entity.
    pub kind: EntityKind,
    /// Tile currently occupied by the entity.
    pub cell: CellCoord,
    /// Current facing.
    pub facing: Direction,
    /// Appearance assigned to the entity.
    pub color: Color,
    /// Sidewalk side used when drawing pedestrians.
    pub sidewalk: SidewalkSide,
}

/// Read-only snapshot describing all entities in the city.
#[derive(Clone, Debug, Default)]
pub struct EntityView {
    snapshots: Vec<EntitySnapshot>,
}

impl EntityView {
    /// Creates a new entity view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EntitySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EntitySnapshot> {
        self.snapshots.iter()
    }

    /// Number of captured entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EntitySnapshot> {
        self.snapshots
    }
}
