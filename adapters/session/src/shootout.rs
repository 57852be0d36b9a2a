use std::time::Duration;

use glam::Vec2;
use touchline_core::{
    shootout::{Command, Difficulty, Event, MatchResult, Phase},
    tuning::ShootoutTuning,
};
use touchline_shootout_world::{self as world, query, World};
use touchline_store::{KeyValueStore, PersistedCounter};
use touchline_system_penalty::{Config, Penalty};
use tracing::{info, warn};

/// Drives one penalty shootout from start to its finish callback.
///
/// The difficulty rotation counter is read exactly once, when the session
/// starts, and advanced exactly once, when the match finishes. Abandoned
/// matches leave it untouched.
#[derive(Debug)]
pub struct ShootoutSession<S, F> {
    store: S,
    counter: PersistedCounter,
    rotation_index: u32,
    world: World,
    penalty: Penalty,
    on_finish: F,
    reported: bool,
}

impl<S, F> ShootoutSession<S, F>
where
    S: KeyValueStore,
    F: FnMut(MatchResult, u32, u32),
{
    /// Starts a match, deriving its difficulty from the rotation counter.
    pub fn start(store: S, tuning: ShootoutTuning, seed: u64, on_finish: F) -> Self {
        let counter = PersistedCounter::difficulty_rotation();
        let rotation_index = match counter.read(&store) {
            Ok(index) => index,
            Err(error) => {
                warn!(%error, "difficulty rotation unreadable, starting from zero");
                0
            }
        };
        let difficulty = Difficulty::from_rotation_index(rotation_index);
        info!(rotation_index, ?difficulty, "shootout session started");

        Self {
            store,
            counter,
            rotation_index,
            world: World::new(difficulty, tuning),
            penalty: Penalty::new(Config::new(seed)),
            on_finish,
            reported: false,
        }
    }

    /// Difficulty fixed for this match.
    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        query::difficulty(&self.world)
    }

    /// Read-only access to the match state.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Reports whether the match reached its result or was abandoned.
    #[must_use]
    pub fn is_over(&self) -> bool {
        matches!(
            query::phase(&self.world),
            Phase::Finished | Phase::Abandoned
        )
    }

    /// Forwards a pointer press on the pitch.
    pub fn pointer_down(&mut self, position: Vec2) -> Vec<Event> {
        self.dispatch(Command::PointerDown { position })
    }

    /// Forwards a pointer release on the pitch.
    pub fn pointer_up(&mut self, position: Vec2) -> Vec<Event> {
        self.dispatch(Command::PointerUp { position })
    }

    /// Advances the match clock by `dt`.
    pub fn advance(&mut self, dt: Duration) -> Vec<Event> {
        self.dispatch(Command::Tick { dt })
    }

    /// Abandons the match; later input and ticks are ignored.
    pub fn abandon(&mut self) -> Vec<Event> {
        self.dispatch(Command::Abandon)
    }

    /// Tears the session down, abandoning an unfinished match.
    pub fn teardown(mut self) -> S {
        if !self.is_over() {
            let _ = self.abandon();
        }
        self.store
    }

    fn dispatch(&mut self, command: Command) -> Vec<Event> {
        let mut log = Vec::new();
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);

        while !events.is_empty() {
            let mut commands = Vec::new();
            self.penalty.handle(
                &events,
                query::difficulty(&self.world),
                query::tuning(&self.world),
                &mut commands,
            );
            log.append(&mut events);
            for command in commands {
                world::apply(&mut self.world, command, &mut events);
            }
        }

        for event in &log {
            if let Event::MatchFinished { result, score } = event {
                self.report(*result, score.user, score.cpu);
            }
        }
        log
    }

    fn report(&mut self, result: MatchResult, user: u32, cpu: u32) {
        if self.reported {
            return;
        }
        self.reported = true;
        (self.on_finish)(result, user, cpu);

        let next = self.rotation_index.wrapping_add(1);
        if let Err(error) = self.counter.write(&mut self.store, next) {
            warn!(%error, "could not advance the difficulty rotation");
        }
    }
}
