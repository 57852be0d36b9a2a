#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic traffic system that steps city cars and pedestrians.
//!
//! Every entity in a step is planned from the snapshot captured when the step
//! fires, so no entity observes another entity's move from the same step.

use rand::{seq::SliceRandom, Rng};
use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};
use touchline_core::{
    city::{Command, EntityKind, EntitySnapshot, EntityView, Event, SidewalkSide, TileView},
    tuning::CityTuning,
    Cadence, CellCoord, Direction,
};

/// Configuration parameters required to construct the traffic system.
#[derive(Clone, Debug)]
pub struct Config {
    tuning: CityTuning,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration from movement tuning and a random seed.
    #[must_use]
    pub fn new(tuning: CityTuning, rng_seed: u64) -> Self {
        Self { tuning, rng_seed }
    }
}

/// Outcome of planning one entity for a single step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// The entity stays where it is with its current facing.
    Hold,
    /// The entity changes facing without moving.
    Turn {
        /// New facing.
        facing: Direction,
    },
    /// The entity advances into an adjacent road tile.
    Move {
        /// Destination tile.
        to: CellCoord,
        /// Facing after the move.
        facing: Direction,
        /// New sidewalk side when the walker switched sides.
        sidewalk: Option<SidewalkSide>,
    },
}

/// Pure system that converts elapsed time into car and pedestrian steps.
#[derive(Debug)]
pub struct Traffic {
    tuning: CityTuning,
    cadence: Cadence,
    rng: ChaCha8Rng,
}

impl Traffic {
    /// Creates a new traffic system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            cadence: Cadence::new(config.tuning.step_period()),
            tuning: config.tuning,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes world events and immutable views to emit movement commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        tiles: TileView<'_>,
        entities: &EntityView,
        out: &mut Vec<Command>,
    ) {
        let mut firings = 0;
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                firings += self.cadence.advance(*dt);
            }
        }

        if firings == 0 || entities.is_empty() {
            return;
        }

        let mut snapshots: Vec<EntitySnapshot> = entities.iter().copied().collect();
        for _ in 0..firings {
            let planned: Vec<Step> = snapshots
                .iter()
                .map(|entity| step_entity(entity, &tiles, &self.tuning, &mut self.rng))
                .collect();

            for (entity, step) in snapshots.iter_mut().zip(planned) {
                emit(entity, step, out);
            }
        }
    }
}

/// Plans a single step for `entity` against the tile grid.
pub fn step_entity<R>(
    entity: &EntitySnapshot,
    tiles: &TileView<'_>,
    tuning: &CityTuning,
    rng: &mut R,
) -> Step
where
    R: Rng + ?Sized,
{
    match entity.kind {
        EntityKind::Car => step_car(entity.cell, entity.facing, tiles, tuning, rng),
        EntityKind::Pedestrian => step_pedestrian(entity.cell, tiles, tuning, rng),
    }
}

/// Plans a car step.
///
/// A car with road ahead usually drives forward and occasionally turns onto
/// another road without moving. A car facing a non-road tile reorients toward
/// any adjacent road, or turns around when it is stranded.
pub fn step_car<R>(
    cell: CellCoord,
    facing: Direction,
    tiles: &TileView<'_>,
    tuning: &CityTuning,
    rng: &mut R,
) -> Step
where
    R: Rng + ?Sized,
{
    let reverse = facing.reverse();
    match tiles.road_neighbour(cell, facing) {
        Some(ahead) => {
            if chance(rng, tuning.car_turn_chance) {
                let mut options = RoadOptions::collect(cell, tiles, |direction| direction != reverse);
                if let Some(turn) = options.choose(rng) {
                    return Step::Turn { facing: turn };
                }
            }
            Step::Move {
                to: ahead,
                facing,
                sidewalk: None,
            }
        }
        None => {
            let mut options = RoadOptions::collect(cell, tiles, |_| true);
            let facing = options.choose(rng).unwrap_or(reverse);
            Step::Turn { facing }
        }
    }
}

/// Plans a pedestrian step.
///
/// Pedestrians wander into a random adjacent road tile and sometimes switch
/// the sidewalk side they are drawn on.
pub fn step_pedestrian<R>(
    cell: CellCoord,
    tiles: &TileView<'_>,
    tuning: &CityTuning,
    rng: &mut R,
) -> Step
where
    R: Rng + ?Sized,
{
    if !chance(rng, tuning.pedestrian_move_chance) {
        return Step::Hold;
    }

    let mut options = RoadOptions::collect(cell, tiles, |_| true);
    let Some(facing) = options.choose(rng) else {
        return Step::Hold;
    };
    let Some(to) = tiles.road_neighbour(cell, facing) else {
        return Step::Hold;
    };

    let sidewalk = if chance(rng, tuning.sidewalk_swap_chance) {
        Some(if rng.gen_bool(0.5) {
            SidewalkSide::Left
        } else {
            SidewalkSide::Right
        })
    } else {
        None
    };

    Step::Move {
        to,
        facing,
        sidewalk,
    }
}

fn emit(entity: &mut EntitySnapshot, step: Step, out: &mut Vec<Command>) {
    match step {
        Step::Hold => {}
        Step::Turn { facing } => {
            entity.facing = facing;
            out.push(Command::TurnEntity {
                entity: entity.id,
                facing,
            });
        }
        Step::Move {
            to,
            facing,
            sidewalk,
        } => {
            entity.cell = to;
            entity.facing = facing;
            out.push(Command::MoveEntity {
                entity: entity.id,
                to,
                facing,
            });
            if let Some(side) = sidewalk.filter(|side| *side != entity.sidewalk) {
                entity.sidewalk = side;
                out.push(Command::SetSidewalk {
                    entity: entity.id,
                    side,
                });
            }
        }
    }
}

fn chance<R: Rng + ?Sized>(rng: &mut R, probability: f64) -> bool {
    rng.gen_bool(probability.clamp(0.0, 1.0))
}

/// Fixed-capacity list of directions leading onto adjacent road tiles.
struct RoadOptions {
    directions: [Direction; 4],
    len: usize,
}

impl RoadOptions {
    fn collect<F>(cell: CellCoord, tiles: &TileView<'_>, allowed: F) -> Self
    where
        F: Fn(Direction) -> bool,
    {
        let mut options = Self {
            directions: Direction::ALL,
            len: 0,
        };
        for direction in Direction::ALL {
            if allowed(direction) && tiles.road_neighbour(cell, direction).is_some() {
                options.directions[options.len] = direction;
                options.len += 1;
            }
        }
        options
    }

    fn choose<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Direction> {
        self.directions[..self.len].choose(rng).copied()
    }
}
