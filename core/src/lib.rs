#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Touchline simulation cores.
//!
//! Two independent simulations live on top of this crate: the penalty
//! shootout mini-game ([`shootout`]) and the tile-grid agent simulations used
//! by the city builder ([`city`]) and farm ([`farm`]) modes. Each simulation
//! owns an authoritative world that is mutated only by applying command
//! values; the world answers with event values that pure systems consume
//! together with read-only views, and systems respond exclusively with new
//! command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub mod city;
pub mod farm;
pub mod shootout;
pub mod tuning;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Touchline.";

/// Number of tiles along each edge of the city and farm grids.
pub const GRID_SIZE: u32 = 20;

/// Cardinal directions used for facing and movement on the tile grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// All four directions in clockwise order starting at north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn reverse(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    const fn offset(self) -> (i64, i64) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }
}

/// Location of a single grid tile expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Returns the neighbouring cell in `direction`, or `None` when it would
    /// leave a grid of the provided dimensions.
    #[must_use]
    pub fn step(self, direction: Direction, columns: u32, rows: u32) -> Option<CellCoord> {
        let (dx, dy) = direction.offset();
        let column = i64::from(self.column) + dx;
        let row = i64::from(self.row) + dy;
        if column < 0 || row < 0 || column >= i64::from(columns) || row >= i64::from(rows) {
            return None;
        }
        Some(CellCoord::new(
            u32::try_from(column).ok()?,
            u32::try_from(row).ok()?,
        ))
    }

    /// Row-major index of the cell in a grid of the provided dimensions, or
    /// `None` when the cell lies outside it.
    #[must_use]
    pub fn index_in(self, columns: u32, rows: u32) -> Option<usize> {
        if self.column >= columns || self.row >= rows {
            return None;
        }
        let row = usize::try_from(self.row).ok()?;
        let column = usize::try_from(self.column).ok()?;
        let width = usize::try_from(columns).ok()?;
        Some(row * width + column)
    }

    /// Direction that leads from `self` to an orthogonally adjacent `other`.
    #[must_use]
    pub fn direction_to(self, other: CellCoord) -> Option<Direction> {
        let column_diff = self.column.abs_diff(other.column);
        let row_diff = self.row.abs_diff(other.row);

        if column_diff + row_diff != 1 {
            return None;
        }

        if column_diff == 1 {
            if other.column > self.column {
                Some(Direction::East)
            } else {
                Some(Direction::West)
            }
        } else if other.row > self.row {
            Some(Direction::South)
        } else {
            Some(Direction::North)
        }
    }
}

/// Unique identifier assigned to a mobile entity by its world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Render-only appearance attached to an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    red: u8,
    green: u8,
    blue: u8,
}

impl Color {
    /// Creates a new color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Reasons an edit or placement request may be rejected by a world.
///
/// The display text is suitable for a user-facing notification.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error,
)]
pub enum PlacementError {
    /// The requested cell or position lies outside the grid.
    #[error("that spot is outside the map")]
    OutOfBounds,
    /// Vehicles and pedestrians may only be placed on road tiles.
    #[error("this can only be placed on a road")]
    RequiresRoad,
    /// The plot already holds a crop.
    #[error("something is already planted here")]
    PlotOccupied,
    /// The plot holds no crop.
    #[error("nothing is planted here")]
    NothingPlanted,
    /// The crop has not finished growing.
    #[error("this crop is not ready to harvest yet")]
    NotReady,
    /// No entity with the provided identifier exists.
    #[error("that no longer exists")]
    UnknownEntity,
    /// A restored layout does not match the grid dimensions.
    #[error("the saved layout does not fit this map")]
    LayoutMismatch,
}

/// Fixed-period tick source that converts elapsed time into whole firings.
///
/// Systems own a cadence per timer and feed it the `dt` carried by
/// time-advanced events, which keeps every step function driven by a virtual
/// clock instead of wall time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cadence {
    period: Duration,
    accumulated: Duration,
}

impl Cadence {
    /// Creates a cadence that fires once per `period`.
    #[must_use]
    pub const fn new(period: Duration) -> Self {
        Self {
            period,
            accumulated: Duration::ZERO,
        }
    }

    /// Interval between consecutive firings.
    #[must_use]
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Time accumulated toward the next firing.
    #[must_use]
    pub const fn accumulated(&self) -> Duration {
        self.accumulated
    }

    /// Accumulates `dt` and reports how many periods elapsed.
    ///
    /// A zero period never fires.
    pub fn advance(&mut self, dt: Duration) -> u32 {
        if self.period.is_zero() {
            return 0;
        }

        self.accumulated = self.accumulated.saturating_add(dt);
        let mut firings = 0;
        while self.accumulated >= self.period {
            self.accumulated -= self.period;
            firings += 1;
        }
        firings
    }

    /// Discards any partially accumulated period.
    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
    }
}
