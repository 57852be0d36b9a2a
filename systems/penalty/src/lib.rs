#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure penalty system that decides keeper dives and computer shots.
//!
//! The sampling functions take any [`Rng`], so tests can drive them with a
//! seeded or stepped source. The [`Penalty`] system owns a seeded
//! [`ChaCha8Rng`] and reacts to shootout events with commands.

use rand::Rng;
use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};
use touchline_core::{
    shootout::{Command, Difficulty, Event, Shot, Turn},
    tuning::ShootoutTuning,
};

/// Configuration parameters required to construct the penalty system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided random seed.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }
}

/// Pure system that answers shots with keeper dives and schedules computer shots.
#[derive(Debug)]
pub struct Penalty {
    rng: ChaCha8Rng,
}

impl Penalty {
    /// Creates a new penalty system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes shootout events and emits keeper and computer commands.
    ///
    /// `difficulty` must be the value the match was created with.
    pub fn handle(
        &mut self,
        events: &[Event],
        difficulty: Difficulty,
        tuning: &ShootoutTuning,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            match event {
                Event::ShotTaken { turn, target_x, .. } => {
                    let target_x =
                        keeper_dive(*turn, difficulty, *target_x, tuning, &mut self.rng);
                    out.push(Command::SetKeeperDive { target_x });
                }
                Event::CpuShotDue { .. } => {
                    let shot = cpu_shot(difficulty, tuning, &mut self.rng);
                    out.push(Command::ShootForCpu { shot });
                }
                _ => {}
            }
        }
    }
}

/// Picks where the defending keeper dives for a shot arriving at `target_x`.
///
/// When the player shoots, the computer keeper reads hard-difficulty shots
/// almost perfectly and on easy difficulty often dives to the wrong extreme.
/// When the computer shoots, the player's own keeper is the one being tuned:
/// it reads the shot far less often on hard difficulty than on easy.
pub fn keeper_dive<R>(
    turn: Turn,
    difficulty: Difficulty,
    target_x: f32,
    tuning: &ShootoutTuning,
    rng: &mut R,
) -> f32
where
    R: Rng + ?Sized,
{
    let keeper = &tuning.keeper;
    match (turn, difficulty) {
        (Turn::Player, Difficulty::Hard) => target_x + jitter(rng, keeper.hard_jitter),
        (Turn::Player, Difficulty::Easy) => {
            if chance(rng, keeper.easy_mistake_chance) {
                if target_x >= tuning.goal_centre {
                    keeper.mistake_far_left
                } else {
                    keeper.mistake_far_right
                }
            } else {
                target_x + jitter(rng, keeper.easy_noise)
            }
        }
        (Turn::Cpu, _) => {
            let read_chance = match difficulty {
                Difficulty::Hard => keeper.hard_read_chance,
                Difficulty::Easy => keeper.easy_read_chance,
            };
            if chance(rng, read_chance) {
                target_x + jitter(rng, keeper.read_noise)
            } else {
                target_x + jitter(rng, keeper.wide_noise)
            }
        }
    }
}

/// Samples the computer's shot for the provided difficulty.
pub fn cpu_shot<R>(difficulty: Difficulty, tuning: &ShootoutTuning, rng: &mut R) -> Shot
where
    R: Rng + ?Sized,
{
    let ranges = &tuning.cpu_shot;
    match difficulty {
        Difficulty::Hard => {
            let side = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            let angle = side * sample(rng, ranges.hard_angle_min, ranges.hard_angle_max);
            let power = sample(rng, ranges.hard_power_min, ranges.hard_power_max);
            Shot::new(angle, power)
        }
        Difficulty::Easy => {
            let angle = sample(rng, -ranges.easy_angle_span, ranges.easy_angle_span);
            let power = sample(rng, ranges.easy_power_min, ranges.easy_power_max);
            Shot::new(angle, power)
        }
    }
}

fn chance<R: Rng + ?Sized>(rng: &mut R, probability: f64) -> bool {
    rng.gen_bool(probability.clamp(0.0, 1.0))
}

fn jitter<R: Rng + ?Sized>(rng: &mut R, spread: f32) -> f32 {
    if spread > 0.0 {
        rng.gen_range(-spread..=spread)
    } else {
        0.0
    }
}

fn sample<R: Rng + ?Sized>(rng: &mut R, low: f32, high: f32) -> f32 {
    if low < high {
        rng.gen_range(low..=high)
    } else {
        low
    }
}
