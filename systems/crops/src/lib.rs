#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Crop growth system for farm plots.

use rand::Rng;
use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};
use touchline_core::{
    farm::{Command, Event, GrowthStage, PlotView},
    tuning::FarmTuning,
    Cadence,
};

/// Configuration parameters required to construct the crop system.
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

/// Pure system that rolls growth for every unripe plot on its own cadence.
#[derive(Debug)]
pub struct Crops {
    growth_chance: f64,
    cadence: Cadence,
    rng: ChaCha8Rng,
}

impl Crops {
    /// Creates a new crop system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            growth_chance: config.tuning.growth_chance,
            cadence: Cadence::new(config.tuning.growth_period()),
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes world events and the plot view to emit growth commands.
    pub fn handle(&mut self, events: &[Event], plots: PlotView<'_>, out: &mut Vec<Command>) {
        let mut firings = 0;
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                firings += self.cadence.advance(*dt);
            }
        }

        if firings == 0 {
            return;
        }

        let mut growing: Vec<_> = plots
            .planted()
            .filter(|(_, planting)| !planting.stage.is_ready())
            .map(|(cell, planting)| (cell, planting.stage))
            .collect();
        for _ in 0..firings {
            for (cell, stage) in &mut growing {
                if let Some(next) = grow(*stage, self.growth_chance, &mut self.rng) {
                    *stage = next;
                    out.push(Command::AdvanceGrowth { cell: *cell });
                }
            }
        }
    }
}

/// Rolls growth for one plot, returning the next stage when the crop grows.
///
/// Ripe crops never roll.
pub fn grow<R>(stage: GrowthStage, chance: f64, rng: &mut R) -> Option<GrowthStage>
where
    R: Rng + ?Sized,
{
    if stage.is_ready() || !rng.gen_bool(chance.clamp(0.0, 1.0)) {
        return None;
    }
    Some(stage.advanced())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    #[test]
    fn ripe_crops_do_not_roll() {
        let mut always = StepRng::new(0, 0);
        assert_eq!(grow(GrowthStage::READY, 1.0, &mut always), None);
        assert_eq!(
            grow(GrowthStage::SEEDED, 0.3, &mut always),
            Some(GrowthStage::new(1))
        );
    }

    #[test]
    fn growth_rate_tracks_the_chance() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let trials = 10_000;
        let grown = (0..trials)
            .filter(|_| grow(GrowthStage::SEEDED, 0.3, &mut rng).is_some())
            .count();
        let rate = grown as f64 / f64::from(trials);
        assert!((rate - 0.3).abs() < 0.05, "growth rate {rate}");
    }
}
