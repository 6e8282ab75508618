/// The mansion maze: fixed grid, start, goal and trap placement.
///
/// The layout is constant data. `Maze::parse` checks it once at startup so
/// the session can rely on these invariants without re-checking:
///   - every row has the same width
///   - start, goal and every trap are in bounds and on path cells
///   - start != goal, and no trap sits on either of them
///   - the goal is reachable from the start without stepping on a trap

use std::collections::VecDeque;

use thiserror::Error;

use super::entity::{MoveDir, Position};
use super::tile::Tile;

pub const GRID_SIZE: usize = 11;

/// `#` = wall, `.` = path. The trap-free route winds through every
/// horizontal band of the grid.
pub const LAYOUT: [&str; GRID_SIZE] = [
    "##########.", // y=0  goal at the far right
    "#...#....#.",
    "#.#.#.##.#.",
    "#..........",
    "#.####.####",
    "#.........#",
    "#########.#",
    "#.......#.#",
    "#.#####.#.#",
    "#.........#",
    "..#########", // y=10 start at the far left
];

pub const START: Position = Position::new(0, 10);
pub const GOAL: Position = Position::new(10, 0);

/// Each trap sits on the wrong branch of a fork.
pub const TRAPS: [Position; 4] = [
    Position::new(5, 9), // bottom corridor, straight on instead of up
    Position::new(7, 3), // row 3, straight run east
    Position::new(6, 4), // shortcut gap between rows 3 and 5
    Position::new(3, 1), // upper-left loop
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MazeError {
    #[error("layout has no rows")]
    Empty,
    #[error("row {row} is {found} cells wide, expected {expected}")]
    RaggedRow { row: usize, found: usize, expected: usize },
    #[error("unknown glyph {glyph:?} at {at}")]
    UnknownGlyph { glyph: char, at: Position },
    #[error("{what} {at} is outside the grid")]
    OutOfBounds { what: &'static str, at: Position },
    #[error("{what} {at} is on a wall")]
    OnWall { what: &'static str, at: Position },
    #[error("start and goal are both {0}")]
    StartIsGoal(Position),
    #[error("trap {0} sits on the start or the goal")]
    TrapOnEndpoint(Position),
    #[error("goal {goal} cannot be reached from {start} without crossing a trap")]
    Unreachable { start: Position, goal: Position },
}

#[derive(Clone, Debug)]
pub struct Maze {
    tiles: Vec<Tile>,
    width: usize,
    height: usize,
    start: Position,
    goal: Position,
    traps: Vec<Position>,
}

impl Maze {
    /// The built-in mansion layout.
    pub fn mansion() -> Result<Maze, MazeError> {
        Maze::parse(&LAYOUT, START, GOAL, &TRAPS)
    }

    pub fn parse(
        rows: &[&str],
        start: Position,
        goal: Position,
        traps: &[Position],
    ) -> Result<Maze, MazeError> {
        let height = rows.len();
        let width = rows.first().map(|r| r.chars().count()).ok_or(MazeError::Empty)?;
        if width == 0 {
            return Err(MazeError::Empty);
        }

        let mut tiles = Vec::with_capacity(width * height);
        for (y, row) in rows.iter().enumerate() {
            let found = row.chars().count();
            if found != width {
                return Err(MazeError::RaggedRow { row: y, found, expected: width });
            }
            for (x, glyph) in row.chars().enumerate() {
                let tile = Tile::from_glyph(glyph)
                    .ok_or(MazeError::UnknownGlyph { glyph, at: Position::new(x, y) })?;
                tiles.push(tile);
            }
        }

        let maze = Maze { tiles, width, height, start, goal, traps: traps.to_vec() };

        maze.check_walkable("start", start)?;
        maze.check_walkable("goal", goal)?;
        if start == goal {
            return Err(MazeError::StartIsGoal(start));
        }
        for &trap in traps {
            maze.check_walkable("trap", trap)?;
            if trap == start || trap == goal {
                return Err(MazeError::TrapOnEndpoint(trap));
            }
        }
        if !maze.safe_route_exists() {
            return Err(MazeError::Unreachable { start, goal });
        }

        Ok(maze)
    }

    pub fn width(&self) -> usize { self.width }
    pub fn height(&self) -> usize { self.height }
    pub fn start(&self) -> Position { self.start }
    pub fn goal(&self) -> Position { self.goal }
    #[cfg(test)]
    pub fn traps(&self) -> &[Position] { &self.traps }

    /// Tile at `p`. Out of bounds reads as wall.
    #[inline]
    pub fn tile_at(&self, p: Position) -> Tile {
        if self.in_bounds(p) {
            self.tiles[p.y * self.width + p.x]
        } else {
            Tile::Wall
        }
    }

    #[inline]
    pub fn in_bounds(&self, p: Position) -> bool {
        p.x < self.width && p.y < self.height
    }

    /// Can the player stand on `p`? Traps do not block; they sit on path.
    #[inline]
    pub fn can_enter(&self, p: Position) -> bool {
        self.tile_at(p).is_passable()
    }

    pub fn is_trap(&self, p: Position) -> bool {
        self.traps.contains(&p)
    }

    /// In-bounds neighbor of `p` in `dir`, regardless of tile.
    pub fn neighbor(&self, p: Position, dir: MoveDir) -> Option<Position> {
        p.step(dir, self.width, self.height)
    }

    // ── Internal ──

    fn check_walkable(&self, what: &'static str, at: Position) -> Result<(), MazeError> {
        if !self.in_bounds(at) {
            return Err(MazeError::OutOfBounds { what, at });
        }
        if !self.can_enter(at) {
            return Err(MazeError::OnWall { what, at });
        }
        Ok(())
    }

    /// Breadth-first search over path cells, treating traps as blocked.
    fn safe_route_exists(&self) -> bool {
        let mut seen = vec![false; self.width * self.height];
        let mut queue = VecDeque::from([self.start]);
        seen[self.start.y * self.width + self.start.x] = true;

        while let Some(p) = queue.pop_front() {
            if p == self.goal {
                return true;
            }
            for dir in MoveDir::ALL {
                let Some(n) = self.neighbor(p, dir) else { continue };
                let idx = n.y * self.width + n.x;
                if seen[idx] || !self.can_enter(n) || self.is_trap(n) {
                    continue;
                }
                seen[idx] = true;
                queue.push_back(n);
            }
        }
        false
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: usize, y: usize) -> Position {
        Position::new(x, y)
    }

    #[test]
    fn mansion_layout_is_valid() {
        let maze = Maze::mansion().unwrap();
        assert_eq!(maze.width(), GRID_SIZE);
        assert_eq!(maze.height(), GRID_SIZE);
        assert_eq!(maze.start(), p(0, 10));
        assert_eq!(maze.goal(), p(10, 0));
        assert_eq!(maze.traps().len(), 4);
    }

    #[test]
    fn traps_sit_on_path_cells() {
        let maze = Maze::mansion().unwrap();
        for &t in maze.traps() {
            assert_eq!(maze.tile_at(t), Tile::Path, "trap {t} on a wall");
        }
    }

    #[test]
    fn start_column_above_is_wall() {
        let maze = Maze::mansion().unwrap();
        assert_eq!(maze.tile_at(p(0, 9)), Tile::Wall);
        assert_eq!(maze.tile_at(p(1, 10)), Tile::Path);
    }

    #[test]
    fn out_of_bounds_reads_as_wall() {
        let maze = Maze::mansion().unwrap();
        assert_eq!(maze.tile_at(p(11, 0)), Tile::Wall);
        assert!(!maze.can_enter(p(0, 11)));
    }

    #[test]
    fn ragged_row_rejected() {
        let err = Maze::parse(&["..", "."], p(0, 0), p(1, 0), &[]).unwrap_err();
        assert_eq!(err, MazeError::RaggedRow { row: 1, found: 1, expected: 2 });
    }

    #[test]
    fn unknown_glyph_rejected() {
        let err = Maze::parse(&[".x"], p(0, 0), p(1, 0), &[]).unwrap_err();
        assert_eq!(err, MazeError::UnknownGlyph { glyph: 'x', at: p(1, 0) });
    }

    #[test]
    fn start_on_wall_rejected() {
        let err = Maze::parse(&["#."], p(0, 0), p(1, 0), &[]).unwrap_err();
        assert_eq!(err, MazeError::OnWall { what: "start", at: p(0, 0) });
    }

    #[test]
    fn goal_out_of_bounds_rejected() {
        let err = Maze::parse(&[".."], p(0, 0), p(2, 0), &[]).unwrap_err();
        assert_eq!(err, MazeError::OutOfBounds { what: "goal", at: p(2, 0) });
    }

    #[test]
    fn start_equal_to_goal_rejected() {
        let err = Maze::parse(&[".."], p(1, 0), p(1, 0), &[]).unwrap_err();
        assert_eq!(err, MazeError::StartIsGoal(p(1, 0)));
    }

    #[test]
    fn trap_on_goal_rejected() {
        let err = Maze::parse(&["..."], p(0, 0), p(2, 0), &[p(2, 0)]).unwrap_err();
        assert_eq!(err, MazeError::TrapOnEndpoint(p(2, 0)));
    }

    #[test]
    fn walled_off_goal_rejected() {
        let err = Maze::parse(&[".#."], p(0, 0), p(2, 0), &[]).unwrap_err();
        assert_eq!(err, MazeError::Unreachable { start: p(0, 0), goal: p(2, 0) });
    }

    #[test]
    fn trap_blocking_only_route_rejected() {
        let err = Maze::parse(&["..."], p(0, 0), p(2, 0), &[p(1, 0)]).unwrap_err();
        assert_eq!(err, MazeError::Unreachable { start: p(0, 0), goal: p(2, 0) });
    }

    #[test]
    fn neighbor_ignores_tiles_but_not_bounds() {
        let maze = Maze::mansion().unwrap();
        assert_eq!(maze.neighbor(p(0, 10), MoveDir::Up), Some(p(0, 9)));
        assert_eq!(maze.neighbor(p(0, 10), MoveDir::Left), None);
    }
}
