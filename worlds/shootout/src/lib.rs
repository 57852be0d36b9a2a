#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative penalty shootout state for Touchline.
//!
//! The world drives the round/turn state machine. Delayed transitions are
//! measured against the `dt` carried by [`Command::Tick`], so the match runs
//! on whatever clock the caller feeds it. Once the match finishes or is
//! abandoned every further command is ignored.

use std::time::Duration;

use glam::Vec2;
use touchline_core::{
    shootout::{
        resolve_shot, Command, Difficulty, Event, MatchResult, Score, Shot, Turn, TOTAL_ROUNDS,
    },
    tuning::ShootoutTuning,
};
use tracing::{debug, info};

/// Represents the authoritative state of a single shootout.
#[derive(Debug)]
pub struct World {
    tuning: ShootoutTuning,
    difficulty: Difficulty,
    round: u32,
    turn: Turn,
    score: Score,
    phase: PhaseState,
    result: Option<MatchResult>,
}

impl World {
    /// Creates a match at the start of round one with the player to shoot.
    ///
    /// `difficulty` must be derived once by the caller and stays fixed for
    /// the lifetime of the match.
    #[must_use]
    pub fn new(difficulty: Difficulty, tuning: ShootoutTuning) -> Self {
        info!(?difficulty, "shootout created");
        Self {
            tuning,
            difficulty,
            round: 1,
            turn: Turn::Player,
            score: Score::default(),
            phase: PhaseState::idle(),
            result: None,
        }
    }

    fn is_closed(&self) -> bool {
        matches!(self.phase, PhaseState::Finished | PhaseState::Abandoned)
    }

    fn advance_clock(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let timing = &self.tuning.timing;
        match &mut self.phase {
            PhaseState::Idle {
                waited,
                cpu_shot_requested,
            } => {
                if self.turn != Turn::Cpu || *cpu_shot_requested {
                    return;
                }
                *waited = waited.saturating_add(dt);
                if *waited >= timing.cpu_delay() {
                    *cpu_shot_requested = true;
                    out_events.push(Event::CpuShotDue { round: self.round });
                }
            }
            PhaseState::Dragging { .. } => {}
            PhaseState::Shooting(flight) => {
                flight.elapsed = flight.elapsed.saturating_add(dt);
                if !flight.dive_announced && flight.elapsed >= timing.keeper_dive() {
                    if let Some(target_x) = flight.keeper_dive {
                        flight.dive_announced = true;
                        out_events.push(Event::KeeperDived {
                            turn: self.turn,
                            target_x,
                        });
                    }
                }
                if flight.elapsed >= timing.resolution() {
                    let flight = *flight;
                    self.resolve_flight(flight, out_events);
                }
            }
            PhaseState::Result { elapsed } => {
                *elapsed = elapsed.saturating_add(dt);
                if *elapsed >= timing.result() {
                    self.finish_turn(out_events);
                }
            }
            PhaseState::Finished | PhaseState::Abandoned => {}
        }
    }

    fn begin_drag(&mut self, position: Vec2, out_events: &mut Vec<Event>) {
        if self.turn != Turn::Player || !matches!(self.phase, PhaseState::Idle { .. }) {
            debug!(turn = ?self.turn, "pointer down ignored outside the player's idle phase");
            return;
        }

        self.phase = PhaseState::Dragging { origin: position };
        out_events.push(Event::DragStarted { origin: position });
    }

    fn release_drag(&mut self, position: Vec2, out_events: &mut Vec<Event>) {
        let PhaseState::Dragging { origin } = self.phase else {
            debug!("pointer up ignored without an active drag");
            return;
        };

        match Shot::from_drag(origin, position, &self.tuning) {
            Some(shot) => self.start_flight(shot, out_events),
            None => {
                self.phase = PhaseState::idle();
                out_events.push(Event::DragCancelled {
                    vertical: origin.y - position.y,
                });
            }
        }
    }

    fn commit_dive(&mut self, target_x: f32) {
        match &mut self.phase {
            PhaseState::Shooting(flight) if flight.keeper_dive.is_none() => {
                flight.keeper_dive = Some(target_x);
            }
            _ => debug!(target_x, "keeper dive ignored without an open shot"),
        }
    }

    fn shoot_for_cpu(&mut self, shot: Shot, out_events: &mut Vec<Event>) {
        let due = matches!(
            self.phase,
            PhaseState::Idle {
                cpu_shot_requested: true,
                ..
            }
        );
        if self.turn != Turn::Cpu || !due {
            debug!(turn = ?self.turn, "computer shot ignored before it was due");
            return;
        }

        self.start_flight(shot, out_events);
    }

    fn start_flight(&mut self, shot: Shot, out_events: &mut Vec<Event>) {
        let target_x = shot.target_x(&self.tuning);
        self.phase = PhaseState::Shooting(Flight {
            target_x,
            keeper_dive: None,
            dive_announced: false,
            elapsed: Duration::ZERO,
        });
        out_events.push(Event::ShotTaken {
            round: self.round,
            turn: self.turn,
            shot,
            target_x,
        });
    }

    fn resolve_flight(&mut self, flight: Flight, out_events: &mut Vec<Event>) {
        let keeper_dive = flight.keeper_dive.unwrap_or(self.tuning.goal_centre);
        if !flight.dive_announced {
            out_events.push(Event::KeeperDived {
                turn: self.turn,
                target_x: keeper_dive,
            });
        }

        let outcome = resolve_shot(flight.target_x, keeper_dive, &self.tuning);
        if outcome.is_goal() {
            self.score = self.score.credit(self.turn);
        }
        self.phase = PhaseState::Result {
            elapsed: Duration::ZERO,
        };
        out_events.push(Event::ShotResolved {
            round: self.round,
            turn: self.turn,
            outcome,
            score: self.score,
        });
    }

    fn finish_turn(&mut self, out_events: &mut Vec<Event>) {
        match self.turn {
            Turn::Player => {
                self.turn = Turn::Cpu;
                self.phase = PhaseState::idle();
                out_events.push(Event::TurnStarted {
                    round: self.round,
                    turn: self.turn,
                });
            }
            Turn::Cpu if self.round < TOTAL_ROUNDS => {
                self.round += 1;
                self.turn = Turn::Player;
                self.phase = PhaseState::idle();
                out_events.push(Event::TurnStarted {
                    round: self.round,
                    turn: self.turn,
                });
            }
            Turn::Cpu => {
                self.round += 1;
                let result = MatchResult::classify(self.score);
                self.result = Some(result);
                self.phase = PhaseState::Finished;
                info!(
                    %result,
                    user = self.score.user,
                    cpu = self.score.cpu,
                    "shootout finished"
                );
                out_events.push(Event::MatchFinished {
                    result,
                    score: self.score,
                });
            }
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if world.is_closed() {
        debug!(?command, "command ignored by a closed shootout");
        return;
    }

    match command {
        Command::Tick { dt } => {
            out_events.push(Event::TimeAdvanced { dt });
            world.advance_clock(dt, out_events);
        }
        Command::PointerDown { position } => world.begin_drag(position, out_events),
        Command::PointerUp { position } => world.release_drag(position, out_events),
        Command::SetKeeperDive { target_x } => world.commit_dive(target_x),
        Command::ShootForCpu { shot } => world.shoot_for_cpu(shot, out_events),
        Command::Abandon => {
            world.phase = PhaseState::Abandoned;
            info!(round = world.round, "shootout abandoned");
            out_events.push(Event::MatchAbandoned);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use touchline_core::{
        shootout::{Difficulty, MatchResult, Phase, Score, Turn},
        tuning::ShootoutTuning,
    };

    use super::{PhaseState, World};

    /// Difficulty fixed at match creation.
    #[must_use]
    pub fn difficulty(world: &World) -> Difficulty {
        world.difficulty
    }

    /// Current round, starting at one. Reads `TOTAL_ROUNDS + 1` once finished.
    #[must_use]
    pub fn round(world: &World) -> u32 {
        world.round
    }

    /// Actor whose shot is current.
    #[must_use]
    pub fn turn(world: &World) -> Turn {
        world.turn
    }

    /// Running score.
    #[must_use]
    pub fn score(world: &World) -> Score {
        world.score
    }

    /// Observable phase of the current turn.
    #[must_use]
    pub fn phase(world: &World) -> Phase {
        match world.phase {
            PhaseState::Idle { .. } => Phase::Idle,
            PhaseState::Dragging { .. } => Phase::Dragging,
            PhaseState::Shooting(_) => Phase::Shooting,
            PhaseState::Result { .. } => Phase::Result,
            PhaseState::Finished => Phase::Finished,
            PhaseState::Abandoned => Phase::Abandoned,
        }
    }

    /// Terminal result once the match finished.
    #[must_use]
    pub fn result(world: &World) -> Option<MatchResult> {
        world.result
    }

    /// Lateral target of the shot in flight, if any.
    #[must_use]
    pub fn shot_target(world: &World) -> Option<f32> {
        match world.phase {
            PhaseState::Shooting(flight) => Some(flight.target_x),
            _ => None,
        }
    }

    /// Tuning the match was created with.
    #[must_use]
    pub fn tuning(world: &World) -> &ShootoutTuning {
        &world.tuning
    }
}

#[derive(Clone, Copy, Debug)]
enum PhaseState {
    Idle {
        waited: Duration,
        cpu_shot_requested: bool,
    },
    Dragging {
        origin: Vec2,
    },
    Shooting(Flight),
    Result {
        elapsed: Duration,
    },
    Finished,
    Abandoned,
}

impl PhaseState {
    const fn idle() -> Self {
        Self::Idle {
            waited: Duration::ZERO,
            cpu_shot_requested: false,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Flight {
    target_x: f32,
    keeper_dive: Option<f32>,
    dive_announced: bool,
    elapsed: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;
    use touchline_core::shootout::{Phase, ShotOutcome};

    const STEP: Duration = Duration::from_millis(100);

    fn new_world() -> World {
        World::new(Difficulty::Easy, ShootoutTuning::default())
    }

    fn tick(world: &mut World, duration: Duration) -> Vec<Event> {
        let mut events = Vec::new();
        let mut remaining = duration;
        while !remaining.is_zero() {
            let dt = remaining.min(STEP);
            apply(world, Command::Tick { dt }, &mut events);
            remaining -= dt;
        }
        events
    }

    fn drag(world: &mut World, dx: f32, dy: f32) -> Vec<Event> {
        let mut events = Vec::new();
        let start = Vec2::new(180.0, 640.0);
        apply(world, Command::PointerDown { position: start }, &mut events);
        apply(
            world,
            Command::PointerUp {
                position: start + Vec2::new(dx, -dy),
            },
            &mut events,
        );
        events
    }

    #[test]
    fn short_drag_is_cancelled_without_consuming_the_turn() {
        let mut world = new_world();
        let events = drag(&mut world, 10.0, 50.0);

        assert!(matches!(
            events.as_slice(),
            [Event::DragStarted { .. }, Event::DragCancelled { .. }]
        ));
        assert_eq!(query::phase(&world), Phase::Idle);
        assert_eq!(query::turn(&world), Turn::Player);
        assert_eq!(query::round(&world), 1);
        assert_eq!(query::score(&world), Score::default());

        let _ = tick(&mut world, Duration::from_secs(5));
        assert_eq!(query::phase(&world), Phase::Idle);
        assert_eq!(query::turn(&world), Turn::Player);
    }

    #[test]
    fn pointer_down_is_ignored_during_cpu_turn() {
        let mut world = new_world();
        let _ = drag(&mut world, 0.0, 300.0);
        let _ = tick(&mut world, Duration::from_millis(800 + 2_000));
        assert_eq!(query::turn(&world), Turn::Cpu);

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PointerDown {
                position: Vec2::ZERO,
            },
            &mut events,
        );
        assert!(events.is_empty());
        assert_eq!(query::phase(&world), Phase::Idle);
    }

    #[test]
    fn keeper_dive_is_announced_and_shot_resolves_on_schedule() {
        let mut world = new_world();
        let _ = drag(&mut world, 0.0, 300.0);
        assert_eq!(query::shot_target(&world), Some(50.0));

        let mut events = Vec::new();
        apply(&mut world, Command::SetKeeperDive { target_x: 80.0 }, &mut events);
        assert!(events.is_empty());

        let early = tick(&mut world, Duration::from_millis(100));
        assert!(early
            .iter()
            .any(|event| matches!(event, Event::KeeperDived { target_x, .. } if *target_x == 80.0)));
        assert_eq!(query::phase(&world), Phase::Shooting);

        let late = tick(&mut world, Duration::from_millis(700));
        assert!(late.iter().any(|event| matches!(
            event,
            Event::ShotResolved {
                outcome: ShotOutcome::Goal,
                score: Score { user: 1, cpu: 0 },
                ..
            }
        )));
        assert_eq!(query::phase(&world), Phase::Result);
    }

    #[test]
    fn keeper_without_a_committed_dive_stays_central() {
        let mut world = new_world();
        let _ = drag(&mut world, 0.0, 300.0);
        let events = tick(&mut world, Duration::from_millis(800));
        assert!(events.iter().any(|event| matches!(
            event,
            Event::ShotResolved {
                outcome: ShotOutcome::Saved,
                ..
            }
        )));
    }

    #[test]
    fn cpu_shot_is_requested_once_after_delay() {
        let mut world = new_world();
        let _ = drag(&mut world, 200.0, 300.0);
        let _ = tick(&mut world, Duration::from_millis(2_800));
        assert_eq!(query::turn(&world), Turn::Cpu);

        let before = tick(&mut world, Duration::from_millis(1_400));
        assert!(!before
            .iter()
            .any(|event| matches!(event, Event::CpuShotDue { .. })));

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ShootForCpu {
                shot: Shot::new(0.0, 1.0),
            },
            &mut events,
        );
        assert!(events.is_empty(), "computer shot must wait for its delay");

        let due = tick(&mut world, Duration::from_secs(3));
        let requests = due
            .iter()
            .filter(|event| matches!(event, Event::CpuShotDue { round: 1 }))
            .count();
        assert_eq!(requests, 1);

        apply(
            &mut world,
            Command::ShootForCpu {
                shot: Shot::new(0.0, 1.0),
            },
            &mut events,
        );
        assert_eq!(query::phase(&world), Phase::Shooting);
    }

    #[test]
    fn abandoned_match_ignores_late_ticks() {
        let mut world = new_world();
        let _ = drag(&mut world, 0.0, 300.0);

        let mut events = Vec::new();
        apply(&mut world, Command::Abandon, &mut events);
        assert_eq!(events, vec![Event::MatchAbandoned]);

        let late = tick(&mut world, Duration::from_secs(10));
        assert!(late.is_empty());
        assert_eq!(query::phase(&world), Phase::Abandoned);
        assert_eq!(query::score(&world), Score::default());
        assert_eq!(query::result(&world), None);
    }
}
