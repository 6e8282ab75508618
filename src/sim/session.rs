/// Session: the complete state of one play-through.
///
/// ## Stages
///
/// `Intro -> Maze -> Result`, never backward. A new play-through is a new
/// `Session`; nothing carries over.
///
/// ## Operations
///
/// Only three calls mutate a session, and each takes the current instant:
///   - `tick(now)`         : advance every schedule (narration, clock, resets)
///   - `proceed(now)`      : leave the intro once the narration is complete
///   - `move_player(d, n)` : one step of movement in the maze
///
/// All other access is read-only.
///
/// ## Traps
///
/// Stepping on a trap moves the player onto it and reveals it. The first
/// reveal of a trap within a reveal cycle counts toward `trap_count`; the
/// cycle ends when the deferred reset returns the player to start and
/// clears every revealed trap. Resets are one-shot tasks. Overlapping
/// resets are harmless, since each applies the same state. Leaving the maze
/// cancels anything pending, and a reset that still fires outside the maze
/// stage does nothing.

use std::collections::BTreeSet;
use std::time::Instant;

use log::{debug, info, trace};

use crate::config::TimingConfig;
use crate::domain::entity::{MoveDir, Position};
use crate::domain::maze::Maze;
use super::event::GameEvent;
use super::narrator::{Narrator, NARRATION};
use super::schedule::{Interval, Scheduler};
use super::timer::StopWatch;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Stage {
    Intro,
    Maze,
    Result,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Deferred {
    ReturnToStart { trap: Position },
}

pub struct Session {
    maze: Maze,
    timing: TimingConfig,
    stage: Stage,

    // ── Intro ──
    narrator: Narrator,
    narration_clock: Interval,

    // ── Maze ──
    player: Position,
    revealed: BTreeSet<Position>,
    trap_count: u32,
    resets: Scheduler<Deferred>,

    // ── Elapsed time ──
    stopwatch: StopWatch,
    clock: Interval,
}

// ── Construction ──

impl Session {
    pub fn new(maze: Maze, timing: TimingConfig, now: Instant) -> Self {
        Session::with_narration(maze, timing, NARRATION, now)
    }

    pub fn with_narration(maze: Maze, timing: TimingConfig, narration: &str, now: Instant) -> Self {
        let player = maze.start();
        let narration_clock = Interval::start(timing.narration_tick(), now);
        Session {
            maze,
            timing,
            stage: Stage::Intro,
            narrator: Narrator::new(narration),
            narration_clock,
            player,
            revealed: BTreeSet::new(),
            trap_count: 0,
            resets: Scheduler::new(),
            stopwatch: StopWatch::new(),
            clock: Interval::idle(),
        }
    }
}

// ── Read-only views ──

impl Session {
    pub fn stage(&self) -> Stage { self.stage }
    pub fn maze(&self) -> &Maze { &self.maze }
    pub fn player(&self) -> Position { self.player }
    pub fn trap_count(&self) -> u32 { self.trap_count }
    pub fn elapsed_secs(&self) -> u64 { self.stopwatch.elapsed_secs() }
    pub fn narration(&self) -> &str { self.narrator.visible() }
    pub fn full_narration(&self) -> &str { self.narrator.full_text() }

    pub fn is_revealed(&self, p: Position) -> bool {
        self.revealed.contains(&p)
    }

    #[cfg(test)]
    pub fn revealed_traps(&self) -> impl Iterator<Item = Position> + '_ {
        self.revealed.iter().copied()
    }

    /// Is the proceed action available?
    pub fn can_proceed(&self) -> bool {
        self.stage == Stage::Intro && self.narrator.is_complete()
    }

    #[cfg(test)]
    pub fn pending_resets(&self) -> usize {
        self.resets.len()
    }
}

// ── Operations ──

impl Session {
    /// Advance all schedules up to `now`.
    pub fn tick(&mut self, now: Instant) -> Vec<GameEvent> {
        let mut events = Vec::new();
        match self.stage {
            Stage::Intro => self.advance_narration(now, &mut events),
            Stage::Maze => self.advance_clock(now, &mut events),
            Stage::Result => {}
        }
        self.fire_resets(now, &mut events);
        events
    }

    /// Leave the intro and start the maze clock. No-op unless the narration
    /// has fully played.
    pub fn proceed(&mut self, now: Instant) -> Vec<GameEvent> {
        if !self.can_proceed() {
            return vec![];
        }
        self.narration_clock.cancel();
        self.stopwatch.start(now);
        self.clock = Interval::start(self.timing.clock_tick(), now);
        self.stage = Stage::Maze;
        info!("stage: intro -> maze");
        vec![GameEvent::MazeEntered]
    }

    /// Try one step. Walls, the grid edge, and any stage other than Maze
    /// leave the session unchanged. Resets due by `now` are applied before
    /// the step.
    pub fn move_player(&mut self, dir: MoveDir, now: Instant) -> Vec<GameEvent> {
        if self.stage != Stage::Maze {
            return vec![];
        }

        let mut events = Vec::new();
        self.fire_resets(now, &mut events);

        let next = match self.maze.neighbor(self.player, dir) {
            Some(p) if self.maze.can_enter(p) => p,
            _ => {
                trace!("blocked {:?} at {}", dir, self.player);
                events.push(GameEvent::Blocked);
                return events;
            }
        };

        self.player = next;

        if self.maze.is_trap(next) {
            let counted = self.revealed.insert(next);
            if counted {
                self.trap_count += 1;
            }
            let due = now + self.timing.trap_reset();
            let id = self.resets.schedule(due, Deferred::ReturnToStart { trap: next });
            info!(
                "trap sprung at {next} (counted: {counted}, total: {}, reset {id:?}, {} pending)",
                self.trap_count,
                self.resets.len()
            );
            events.push(GameEvent::TrapSprung { at: next, counted });
            return events;
        }

        events.push(GameEvent::Moved { to: next });
        if next == self.maze.goal() {
            self.finish(now, &mut events);
        }
        events
    }
}

// ── Internal ──

impl Session {
    fn advance_narration(&mut self, now: Instant, events: &mut Vec<GameEvent>) {
        let due = self.narration_clock.poll(now);
        for _ in 0..due {
            if self.narrator.tick() {
                events.push(GameEvent::LetterRevealed);
            }
            if self.narrator.is_complete() {
                self.narration_clock.cancel();
                events.push(GameEvent::NarrationComplete);
                debug!("narration complete");
                break;
            }
        }
    }

    fn advance_clock(&mut self, now: Instant, events: &mut Vec<GameEvent>) {
        if self.clock.poll(now) > 0 {
            let secs = self.stopwatch.sample(now);
            events.push(GameEvent::ClockTick { secs });
        }
    }

    fn fire_resets(&mut self, now: Instant, events: &mut Vec<GameEvent>) {
        if self.resets.is_empty() {
            return;
        }
        for (id, task) in self.resets.drain_due(now) {
            match task {
                Deferred::ReturnToStart { trap } => {
                    if self.stage != Stage::Maze {
                        debug!("stale reset {id:?} from {trap} ignored in {:?}", self.stage);
                        continue;
                    }
                    self.player = self.maze.start();
                    self.revealed.clear();
                    debug!("reset {id:?} from {trap}: back to start");
                    events.push(GameEvent::ReturnedToStart);
                }
            }
        }
    }

    fn finish(&mut self, now: Instant, events: &mut Vec<GameEvent>) {
        self.stage = Stage::Result;
        self.clock.cancel();
        let dropped = self.resets.cancel_all();
        let secs = self.stopwatch.stop(now);
        info!(
            "stage: maze -> result ({secs}s, {} traps, {dropped} pending resets dropped)",
            self.trap_count
        );
        events.push(GameEvent::GoalReached { secs, traps: self.trap_count });
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
