use std::time::Duration;

use glam::Vec2;
use touchline_core::{
    shootout::{Command, Difficulty, Event, Phase, ShotOutcome, Turn, TOTAL_ROUNDS},
    tuning::ShootoutTuning,
};
use touchline_shootout_world::{self as shootout, query, World};
use touchline_system_penalty::{Config, Penalty};

const STEP: Duration = Duration::from_millis(50);

fn dispatch(world: &mut World, penalty: &mut Penalty, command: Command, log: &mut Vec<Event>) {
    let mut events = Vec::new();
    shootout::apply(world, command, &mut events);

    while !events.is_empty() {
        let mut commands = Vec::new();
        penalty.handle(
            &events,
            query::difficulty(world),
            query::tuning(world),
            &mut commands,
        );
        log.append(&mut events);
        for command in commands {
            shootout::apply(world, command, &mut events);
        }
    }
}

fn shoot_straight(world: &mut World, penalty: &mut Penalty, log: &mut Vec<Event>) {
    let start = Vec2::new(160.0, 640.0);
    dispatch(world, penalty, Command::PointerDown { position: start }, log);
    dispatch(
        world,
        penalty,
        Command::PointerUp {
            position: start - Vec2::new(0.0, 300.0),
        },
        log,
    );
}

fn play_match(difficulty: Difficulty, seed: u64) -> (World, Vec<Event>) {
    let mut world = World::new(difficulty, ShootoutTuning::default());
    let mut penalty = Penalty::new(Config::new(seed));
    let mut log = Vec::new();

    let mut guard = 0;
    while query::phase(&world) != Phase::Finished {
        if query::turn(&world) == Turn::Player && query::phase(&world) == Phase::Idle {
            shoot_straight(&mut world, &mut penalty, &mut log);
        }
        dispatch(&mut world, &mut penalty, Command::Tick { dt: STEP }, &mut log);
        guard += 1;
        assert!(guard < 10_000, "match never finished");
    }

    (world, log)
}

#[test]
fn automated_match_reports_one_result() {
    for seed in 0..16 {
        let (world, log) = play_match(Difficulty::Easy, seed);
        let finishes = log
            .iter()
            .filter(|event| matches!(event, Event::MatchFinished { .. }))
            .count();
        let resolved = log
            .iter()
            .filter(|event| matches!(event, Event::ShotResolved { .. }))
            .count();

        assert_eq!(finishes, 1);
        assert_eq!(resolved, 2 * TOTAL_ROUNDS as usize);
        assert_eq!(query::round(&world), TOTAL_ROUNDS + 1);
        assert!(query::result(&world).is_some());
    }
}

#[test]
fn every_shot_receives_exactly_one_keeper_dive() {
    let (_, log) = play_match(Difficulty::Hard, 3);
    let shots = log
        .iter()
        .filter(|event| matches!(event, Event::ShotTaken { .. }))
        .count();
    let dives = log
        .iter()
        .filter(|event| matches!(event, Event::KeeperDived { .. }))
        .count();
    assert_eq!(shots, 2 * TOTAL_ROUNDS as usize);
    assert_eq!(dives, shots);
}

#[test]
fn hard_keeper_saves_every_straight_shot() {
    let (world, log) = play_match(Difficulty::Hard, 12);
    assert!(log.iter().all(|event| match event {
        Event::ShotResolved {
            turn: Turn::Player,
            outcome,
            ..
        } => *outcome == ShotOutcome::Saved,
        _ => true,
    }));
    assert_eq!(query::score(&world).user, 0);
}

#[test]
fn easy_straight_shot_scores_about_five_times_in_six() {
    let mut penalty = Penalty::new(Config::new(2024));
    let trials = 2_000;
    let mut goals = 0;

    for _ in 0..trials {
        let mut world = World::new(Difficulty::Easy, ShootoutTuning::default());
        let mut log = Vec::new();
        shoot_straight(&mut world, &mut penalty, &mut log);
        assert_eq!(query::shot_target(&world), Some(50.0));
        dispatch(
            &mut world,
            &mut penalty,
            Command::Tick {
                dt: Duration::from_millis(800),
            },
            &mut log,
        );
        if query::score(&world).user == 1 {
            goals += 1;
        }
    }

    let rate = f64::from(goals) / f64::from(trials);
    assert!((rate - 0.84).abs() < 0.05, "goal rate {rate}");
}

#[test]
fn replay_with_the_same_seed_is_identical() {
    let (_, first) = play_match(Difficulty::Easy, 77);
    let (_, second) = play_match(Difficulty::Easy, 77);
    assert_eq!(first, second);
}
