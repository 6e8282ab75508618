/// Events emitted by session operations.
/// The game loop turns these into sound effects.

use crate::domain::entity::Position;

#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(dead_code)]
pub enum GameEvent {
    LetterRevealed,
    NarrationComplete,
    MazeEntered,
    Moved { to: Position },
    Blocked,
    /// `counted` is false when the trap was already revealed this cycle.
    TrapSprung { at: Position, counted: bool },
    ReturnedToStart,
    ClockTick { secs: u64 },
    GoalReached { secs: u64, traps: u32 },
}
