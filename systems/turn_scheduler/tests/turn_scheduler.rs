use std::time::Duration;

use lily_hop_core::{Command, Event, Leaf, Position, ScriptedSource, SessionStatus};
use lily_hop_system_turn_scheduler::TurnScheduler;
use lily_hop_world::{self as world, query, scaffolding, Config, World};

struct Harness {
    world: World,
    source: ScriptedSource,
    scheduler: TurnScheduler,
}

impl Harness {
    fn new() -> Self {
        let mut source = ScriptedSource::constant(0.99);
        let mut world = World::new(Config::default(), &mut source);
        scaffolding::fill_leaves(&mut world, Leaf::new(3, false));
        scaffolding::place_bird(&mut world, Position::new(2, 2));
        Self {
            world,
            source,
            scheduler: TurnScheduler::default(),
        }
    }

    fn submit(&mut self, command: Command) {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut self.source, &mut events);
        self.scheduler.observe(&events);
    }

    fn frame(&mut self, millis: u64) {
        let mut commands = Vec::new();
        self.scheduler.poll(
            Duration::from_millis(millis),
            query::status(&self.world),
            &mut commands,
        );
        for command in commands {
            self.submit(command);
        }
    }
}

#[test]
fn frequent_frames_within_one_window_advance_a_single_turn() {
    let mut harness = Harness::new();
    harness.submit(Command::StartGame);

    for millis in (0..=1_990).step_by(10) {
        harness.frame(millis);
    }

    assert_eq!(query::turn(&harness.world), 1);
    assert_eq!(
        query::leaf(&harness.world, Position::new(2, 2)).height(),
        2,
        "exactly one turn of sinking"
    );
}

#[test]
fn standing_still_loses_a_life_on_the_third_turn() {
    let mut harness = Harness::new();
    harness.submit(Command::StartGame);

    let mut millis = 0;
    harness.frame(millis);
    let mut heights = Vec::new();
    while query::status(&harness.world) == SessionStatus::Playing {
        millis += 16;
        let before = query::turn(&harness.world);
        harness.frame(millis);
        if query::turn(&harness.world) != before {
            heights.push(query::leaf(&harness.world, Position::new(2, 2)).height());
        }
    }

    assert_eq!(heights, vec![2, 1, 0]);
    assert_eq!(query::status(&harness.world), SessionStatus::LifeLost);
    assert!(millis >= 3_000);
}

#[test]
fn continuing_restarts_the_turn_interval() {
    let mut harness = Harness::new();
    harness.submit(Command::StartGame);
    harness.frame(0);
    for millis in [1_000, 2_000, 3_000] {
        harness.frame(millis);
    }
    assert_eq!(query::status(&harness.world), SessionStatus::LifeLost);

    harness.frame(9_000);
    assert_eq!(query::turn(&harness.world), 3, "no turns while paused");

    harness.submit(Command::ContinueAfterLifeLoss);
    assert_eq!(harness.scheduler.last_turn(), None);

    harness.frame(9_500);
    harness.frame(10_400);
    assert_eq!(query::turn(&harness.world), 3);
    harness.frame(10_500);
    assert_eq!(query::turn(&harness.world), 4);
}

#[test]
fn reset_events_are_the_only_disarming_signal() {
    let mut scheduler = TurnScheduler::default();
    let mut commands = Vec::new();
    scheduler.poll(Duration::ZERO, SessionStatus::Playing, &mut commands);

    scheduler.observe(&[
        Event::TurnAdvanced { turn: 1 },
        Event::StatusChanged {
            from: SessionStatus::Playing,
            to: SessionStatus::LifeLost,
        },
    ]);

    assert_eq!(scheduler.last_turn(), Some(Duration::ZERO));
}
