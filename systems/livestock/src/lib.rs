#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Random-walk system for farm animals.

use glam::Vec2;
use rand::Rng;
use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};
use touchline_core::{
    farm::{AnimalSpecies, AnimalView, Command, Event},
    tuning::FarmTuning,
    Cadence,
};

/// Configuration parameters required to construct the livestock system.
#[derive(Clone, Debug)]
pub struct Config {
    tuning: FarmTuning,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration from farm tuning and a random seed.
    #[must_use]
    pub fn new(tuning: FarmTuning, rng_seed: u64) -> Self {
        Self { tuning, rng_seed }
    }
}

/// Pure system that wanders animals across the field on a fixed cadence.
#[derive(Debug)]
pub struct Livestock {
    tuning: FarmTuning,
    cadence: Cadence,
    rng: ChaCha8Rng,
}

impl Livestock {
    /// Creates a new livestock system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            cadence: Cadence::new(config.tuning.step_period()),
            tuning: config.tuning,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes world events and the animal view to emit movement commands.
    pub fn handle(&mut self, events: &[Event], animals: &AnimalView, out: &mut Vec<Command>) {
        let mut firings = 0;
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                firings += self.cadence.advance(*dt);
            }
        }

        if firings == 0 || animals.is_empty() {
            return;
        }

        let mut herd: Vec<(_, AnimalSpecies, Vec2)> = animals
            .iter()
            .map(|animal| (animal.id, animal.species, animal.position))
            .collect();
        for _ in 0..firings {
            for (animal, species, position) in &mut herd {
                if let Some(next) = wander(*position, *species, &self.tuning, &mut self.rng) {
                    *position = next;
                    out.push(Command::MoveAnimal {
                        animal: *animal,
                        position: next,
                    });
                }
            }
        }
    }
}

/// Plans one random-walk step, returning the new position when the animal moves.
///
/// The displacement on each axis is uniform within the species speed and the
/// result is clamped to the field bounds. Animals ignore the plot grid.
pub fn wander<R>(
    position: Vec2,
    species: AnimalSpecies,
    tuning: &FarmTuning,
    rng: &mut R,
) -> Option<Vec2>
where
    R: Rng + ?Sized,
{
    if !rng.gen_bool(tuning.animal_move_chance.clamp(0.0, 1.0)) {
        return None;
    }

    let speed = species.speed();
    let offset = Vec2::new(rng.gen_range(-1.0..=1.0), rng.gen_range(-1.0..=1.0)) * speed;
    let low = tuning.field_min.min(tuning.field_max);
    let high = tuning.field_max.max(tuning.field_min);
    Some((position + offset).clamp(Vec2::splat(low), Vec2::splat(high)))
}
