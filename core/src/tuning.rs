//! Named tuning tables for every probability, period and geometric constant.
//!
//! All tables deserialize with `#[serde(default)]`, so a configuration file
//! only needs to name the values it overrides.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Aggregated tuning knobs for both simulation cores.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Penalty shootout geometry, keeper behaviour and phase timing.
    pub shootout: ShootoutTuning,
    /// City builder step period and movement probabilities.
    pub city: CityTuning,
    /// Farm step periods, growth and animal probabilities.
    pub farm: FarmTuning,
}

/// Shot geometry and collision constants for the penalty shootout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShootoutTuning {
    /// Minimum upward drag distance required before a shot is taken.
    pub min_vertical_drag: f32,
    /// Vertical drag distance that maps to a power of 1.0.
    pub power_divisor: f32,
    /// Upper bound applied to shot power.
    pub max_power: f32,
    /// Horizontal drag distance that maps to an angle of 1.0.
    pub angle_divisor: f32,
    /// Lateral distance from the centre line reached by an angle of 1.0.
    pub target_spread: f32,
    /// Centre of the goal on the normalised 0..100 lateral axis.
    pub goal_centre: f32,
    /// Left post; shots must land strictly right of it to be on target.
    pub left_post: f32,
    /// Right post; shots must land strictly left of it to be on target.
    pub right_post: f32,
    /// Keeper saves when the dive lands strictly closer than this.
    pub save_radius: f32,
    /// Keeper behaviour for both sides.
    pub keeper: KeeperTuning,
    /// Sampling ranges for computer-controlled shots.
    pub cpu_shot: CpuShotTuning,
    /// Durations of the delayed phase transitions.
    pub timing: PhaseTiming,
}

impl Default for ShootoutTuning {
    fn default() -> Self {
        Self {
            min_vertical_drag: 50.0,
            power_divisor: 250.0,
            max_power: 1.3,
            angle_divisor: 120.0,
            target_spread: 35.0,
            goal_centre: 50.0,
            left_post: 38.0,
            right_post: 62.0,
            save_radius: 12.0,
            keeper: KeeperTuning::default(),
            cpu_shot: CpuShotTuning::default(),
            timing: PhaseTiming::default(),
        }
    }
}

/// Keeper accuracy parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeeperTuning {
    /// Maximum dive error of the computer keeper on hard difficulty.
    pub hard_jitter: f32,
    /// Chance that the computer keeper dives the wrong way on easy difficulty.
    pub easy_mistake_chance: f64,
    /// Maximum dive error of the computer keeper on easy difficulty when it
    /// does not make a mistake.
    pub easy_noise: f32,
    /// Dive target used for a mistake against a shot left of centre.
    pub mistake_far_right: f32,
    /// Dive target used for a mistake against a shot at or right of centre.
    pub mistake_far_left: f32,
    /// Chance that the player's own keeper reads a computer shot on hard.
    pub hard_read_chance: f64,
    /// Chance that the player's own keeper reads a computer shot on easy.
    pub easy_read_chance: f64,
    /// Maximum dive error of the player's keeper after a correct read.
    pub read_noise: f32,
    /// Maximum dive error of the player's keeper after a wrong read.
    pub wide_noise: f32,
}

impl Default for KeeperTuning {
    fn default() -> Self {
        Self {
            hard_jitter: 5.0,
            easy_mistake_chance: 0.6,
            easy_noise: 30.0,
            mistake_far_right: 80.0,
            mistake_far_left: 20.0,
            hard_read_chance: 0.2,
            easy_read_chance: 0.9,
            read_noise: 5.0,
            wide_noise: 25.0,
        }
    }
}

/// Sampling ranges for computer-controlled shots.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuShotTuning {
    /// Smallest absolute angle aimed for on hard difficulty.
    pub hard_angle_min: f32,
    /// Largest absolute angle aimed for on hard difficulty.
    pub hard_angle_max: f32,
    /// Smallest power used on hard difficulty.
    pub hard_power_min: f32,
    /// Largest power used on hard difficulty.
    pub hard_power_max: f32,
    /// Absolute angle bound on easy difficulty.
    pub easy_angle_span: f32,
    /// Smallest power used on easy difficulty.
    pub easy_power_min: f32,
    /// Largest power used on easy difficulty.
    pub easy_power_max: f32,
}

impl Default for CpuShotTuning {
    fn default() -> Self {
        Self {
            hard_angle_min: 0.8,
            hard_angle_max: 0.9,
            hard_power_min: 1.0,
            hard_power_max: 1.2,
            easy_angle_span: 0.5,
            easy_power_min: 0.6,
            easy_power_max: 1.0,
        }
    }
}

/// Durations of the shootout's delayed transitions, in milliseconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseTiming {
    /// Delay between a shot being taken and the keeper committing to a dive.
    pub keeper_dive_ms: u64,
    /// Delay between a shot being taken and its resolution.
    pub resolution_ms: u64,
    /// How long a resolved shot stays on screen before play moves on.
    pub result_ms: u64,
    /// Delay before the computer shoots once its turn begins.
    pub cpu_delay_ms: u64,
}

impl PhaseTiming {
    /// Keeper dive delay as a [`Duration`].
    #[must_use]
    pub const fn keeper_dive(&self) -> Duration {
        Duration::from_millis(self.keeper_dive_ms)
    }

    /// Shot resolution delay as a [`Duration`].
    #[must_use]
    pub const fn resolution(&self) -> Duration {
        Duration::from_millis(self.resolution_ms)
    }

    /// Result hold duration as a [`Duration`].
    #[must_use]
    pub const fn result(&self) -> Duration {
        Duration::from_millis(self.result_ms)
    }

    /// Computer shot delay as a [`Duration`].
    #[must_use]
    pub const fn cpu_delay(&self) -> Duration {
        Duration::from_millis(self.cpu_delay_ms)
    }
}

impl Default for PhaseTiming {
    fn default() -> Self {
        Self {
            keeper_dive_ms: 100,
            resolution_ms: 800,
            result_ms: 2_000,
            cpu_delay_ms: 1_500,
        }
    }
}

/// City builder movement tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CityTuning {
    /// Interval between entity steps, in milliseconds.
    pub step_period_ms: u64,
    /// Chance that a car with a clear road ahead considers turning.
    pub car_turn_chance: f64,
    /// Chance that a pedestrian walks on a given step.
    pub pedestrian_move_chance: f64,
    /// Chance that a walking pedestrian switches sidewalk side.
    pub sidewalk_swap_chance: f64,
}

impl CityTuning {
    /// Entity step interval as a [`Duration`].
    #[must_use]
    pub const fn step_period(&self) -> Duration {
        Duration::from_millis(self.step_period_ms)
    }
}

impl Default for CityTuning {
    fn default() -> Self {
        Self {
            step_period_ms: 500,
            car_turn_chance: 0.15,
            pedestrian_move_chance: 0.7,
            sidewalk_swap_chance: 0.2,
        }
    }
}

/// Farm tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FarmTuning {
    /// Interval between animal steps, in milliseconds.
    pub step_period_ms: u64,
    /// Interval between crop growth rolls, in milliseconds.
    pub growth_period_ms: u64,
    /// Chance that an unripe crop grows one stage per roll.
    pub growth_chance: f64,
    /// Chance that an animal wanders on a given step.
    pub animal_move_chance: f64,
    /// Lowest percentage coordinate an animal may occupy.
    pub field_min: f32,
    /// Highest percentage coordinate an animal may occupy.
    pub field_max: f32,
}

impl FarmTuning {
    /// Animal step interval as a [`Duration`].
    #[must_use]
    pub const fn step_period(&self) -> Duration {
        Duration::from_millis(self.step_period_ms)
    }

    /// Crop growth interval as a [`Duration`].
    #[must_use]
    pub const fn growth_period(&self) -> Duration {
        Duration::from_millis(self.growth_period_ms)
    }
}

impl Default for FarmTuning {
    fn default() -> Self {
        Self {
            step_period_ms: 500,
            growth_period_ms: 2_000,
            growth_chance: 0.3,
            animal_move_chance: 0.7,
            field_min: 5.0,
            field_max: 95.0,
        }
    }
}
