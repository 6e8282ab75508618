/// Positions and movement directions.

/// Grid coordinate. `x` grows to the right, `y` grows downward.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub const fn new(x: usize, y: usize) -> Self {
        Position { x, y }
    }

    /// Neighbor one step in `dir`, or None if it would leave a
    /// `width` x `height` grid.
    pub fn step(self, dir: MoveDir, width: usize, height: usize) -> Option<Position> {
        let (dx, dy) = dir.delta();
        let nx = self.x.checked_add_signed(dx)?;
        let ny = self.y.checked_add_signed(dy)?;
        if nx >= width || ny >= height {
            return None;
        }
        Some(Position { x: nx, y: ny })
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// One of the four movement directions. Keyboard and gamepad both map here.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveDir {
    Up,
    Down,
    Left,
    Right,
}

impl MoveDir {
    pub const ALL: [MoveDir; 4] = [MoveDir::Up, MoveDir::Down, MoveDir::Left, MoveDir::Right];

    /// Unit vector `(dx, dy)`.
    pub fn delta(self) -> (isize, isize) {
        match self {
            MoveDir::Up => (0, -1),
            MoveDir::Down => (0, 1),
            MoveDir::Left => (-1, 0),
            MoveDir::Right => (1, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_stays_inside_grid() {
        let p = Position::new(0, 10);
        assert_eq!(p.step(MoveDir::Left, 11, 11), None);
        assert_eq!(p.step(MoveDir::Down, 11, 11), None);
        assert_eq!(p.step(MoveDir::Up, 11, 11), Some(Position::new(0, 9)));
        assert_eq!(p.step(MoveDir::Right, 11, 11), Some(Position::new(1, 10)));
    }

    #[test]
    fn step_rejects_far_edge() {
        let p = Position::new(10, 0);
        assert_eq!(p.step(MoveDir::Right, 11, 11), None);
        assert_eq!(p.step(MoveDir::Up, 11, 11), None);
    }
}
