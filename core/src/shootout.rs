//! Contracts for the turn-based penalty shootout.
//!
//! The geometry in this module is pure: converting a drag gesture into a
//! [`Shot`], projecting it onto the goal line and resolving it against a
//! keeper dive never touches randomness. Randomised keeper and computer
//! behaviour lives in the penalty system.

use std::{fmt, time::Duration};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::tuning::ShootoutTuning;

/// Number of rounds played in a shootout.
pub const TOTAL_ROUNDS: u32 = 5;

/// Actor whose shot is currently being taken.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Turn {
    /// The human player shoots and the computer keeper defends.
    Player,
    /// The computer shoots and the player's keeper defends.
    Cpu,
}

/// Per-match difficulty derived from the persisted rotation index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    /// Forgiving keeper, central computer shots.
    Easy,
    /// Sharp keeper, computer shots aimed at the corners.
    Hard,
}

impl Difficulty {
    /// Derives the difficulty for a match from the rotating match index.
    ///
    /// Every third match is hard.
    #[must_use]
    pub const fn from_rotation_index(index: u32) -> Self {
        if index % 3 == 2 {
            Self::Hard
        } else {
            Self::Easy
        }
    }
}

/// A single shot attempt.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Shot {
    angle: f32,
    power: f32,
}

impl Shot {
    /// Creates a shot from an explicit angle and power.
    ///
    /// The angle is clamped to `-1.0..=1.0`.
    #[must_use]
    pub fn new(angle: f32, power: f32) -> Self {
        Self {
            angle: angle.clamp(-1.0, 1.0),
            power,
        }
    }

    /// Converts a drag gesture from `start` to `end` into a shot.
    ///
    /// Screen coordinates grow downward, so an upward swipe has a positive
    /// vertical delta of `start.y - end.y`. Returns `None` when that delta does
    /// not exceed the configured minimum; such gestures are cancelled.
    #[must_use]
    pub fn from_drag(start: Vec2, end: Vec2, tuning: &ShootoutTuning) -> Option<Self> {
        let vertical = start.y - end.y;
        if vertical <= tuning.min_vertical_drag {
            return None;
        }

        let horizontal = end.x - start.x;
        let power = (vertical / tuning.power_divisor).min(tuning.max_power);
        Some(Self::new(horizontal / tuning.angle_divisor, power))
    }

    /// Lateral aim in `-1.0..=1.0`; negative values aim left.
    #[must_use]
    pub const fn angle(&self) -> f32 {
        self.angle
    }

    /// Arc height proxy; has no influence on the outcome.
    #[must_use]
    pub const fn power(&self) -> f32 {
        self.power
    }

    /// Lateral position on the 0..100 goal axis where the shot arrives.
    #[must_use]
    pub fn target_x(&self, tuning: &ShootoutTuning) -> f32 {
        tuning.goal_centre + self.angle * tuning.target_spread
    }
}

/// Result of a single resolved shot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShotOutcome {
    /// The shot beat the keeper.
    Goal,
    /// The shot was on target but the keeper reached it.
    Saved,
    /// The shot missed the goal mouth.
    Missed,
}

impl ShotOutcome {
    /// Reports whether the outcome adds to the shooter's score.
    #[must_use]
    pub const fn is_goal(self) -> bool {
        matches!(self, Self::Goal)
    }
}

/// Resolves a shot arriving at `target_x` against a keeper diving to
/// `keeper_dive`.
///
/// Off-target shots are never goals regardless of the keeper.
#[must_use]
pub fn resolve_shot(target_x: f32, keeper_dive: f32, tuning: &ShootoutTuning) -> ShotOutcome {
    let on_target = target_x > tuning.left_post && target_x < tuning.right_post;
    if !on_target {
        return ShotOutcome::Missed;
    }

    if (target_x - keeper_dive).abs() < tuning.save_radius {
        ShotOutcome::Saved
    } else {
        ShotOutcome::Goal
    }
}

/// Running score of a shootout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Score {
    /// Goals scored by the human player.
    pub user: u32,
    /// Goals scored by the computer.
    pub cpu: u32,
}

impl Score {
    /// Returns the score after crediting a goal to the shooter of `turn`.
    #[must_use]
    pub const fn credit(self, turn: Turn) -> Self {
        match turn {
            Turn::Player => Self {
                user: self.user + 1,
                cpu: self.cpu,
            },
            Turn::Cpu => Self {
                user: self.user,
                cpu: self.cpu + 1,
            },
        }
    }
}

/// Terminal classification of a finished match from the player's side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchResult {
    /// The player outscored the computer.
    Win,
    /// The computer outscored the player.
    Loss,
    /// Both sides scored equally.
    Draw,
}

impl MatchResult {
    /// Classifies a final score.
    #[must_use]
    pub const fn classify(score: Score) -> Self {
        if score.user > score.cpu {
            Self::Win
        } else if score.user < score.cpu {
            Self::Loss
        } else {
            Self::Draw
        }
    }

    /// Lowercase label reported to the finish callback.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Win => "win",
            Self::Loss => "loss",
            Self::Draw => "draw",
        }
    }
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observable phase of the current turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Waiting for the player to start a drag, or for the computer delay.
    Idle,
    /// The player is dragging to aim.
    Dragging,
    /// A shot is in flight.
    Shooting,
    /// A resolved shot is being shown.
    Result,
    /// The match ended and its result was reported.
    Finished,
    /// The match was torn down before finishing.
    Abandoned,
}

/// Commands that express all permissible shootout mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the match clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// The player pressed on the pitch.
    PointerDown {
        /// Pointer location in screen units.
        position: Vec2,
    },
    /// The player released the pointer.
    PointerUp {
        /// Pointer location in screen units.
        position: Vec2,
    },
    /// Commits the keeper dive for the shot in flight.
    SetKeeperDive {
        /// Lateral dive target on the 0..100 goal axis.
        target_x: f32,
    },
    /// Takes the computer's shot once it is due.
    ShootForCpu {
        /// Shot sampled for the computer.
        shot: Shot,
    },
    /// Tears the match down; every later command is ignored.
    Abandon,
}

/// Events broadcast by the shootout world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the match clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces the actor whose shot is next.
    TurnStarted {
        /// Current round, starting at one.
        round: u32,
        /// Actor about to shoot.
        turn: Turn,
    },
    /// Confirms that the player started aiming.
    DragStarted {
        /// Pointer location where the drag began.
        origin: Vec2,
    },
    /// Reports that a drag was too short to count as a shot.
    DragCancelled {
        /// Upward distance covered by the cancelled drag.
        vertical: f32,
    },
    /// Announces that the computer's shot delay has elapsed.
    CpuShotDue {
        /// Round in which the computer shoots.
        round: u32,
    },
    /// Confirms that a shot left the spot.
    ShotTaken {
        /// Round in which the shot was taken.
        round: u32,
        /// Actor who took the shot.
        turn: Turn,
        /// The shot itself.
        shot: Shot,
        /// Lateral position where the shot arrives.
        target_x: f32,
    },
    /// Confirms that the defending keeper dived.
    KeeperDived {
        /// Actor whose shot the keeper is facing.
        turn: Turn,
        /// Lateral position the keeper dived to.
        target_x: f32,
    },
    /// Reports the outcome of a shot together with the updated score.
    ShotResolved {
        /// Round in which the shot was taken.
        round: u32,
        /// Actor who took the shot.
        turn: Turn,
        /// Outcome of the shot.
        outcome: ShotOutcome,
        /// Score after crediting the shot.
        score: Score,
    },
    /// Terminal result of the match, emitted exactly once.
    MatchFinished {
        /// Classification from the player's side.
        result: MatchResult,
        /// Final score.
        score: Score,
    },
    /// Confirms that the match was torn down without a result.
    MatchAbandoned,
}
