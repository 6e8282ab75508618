/// Cell types of the maze grid.
/// Properties are queried via methods so cell semantics stay in one place.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tile {
    Wall,
    Path,
}

impl Tile {
    /// Map a layout glyph to a tile. `#` is wall, `.` is path.
    pub fn from_glyph(ch: char) -> Option<Tile> {
        match ch {
            '#' => Some(Tile::Wall),
            '.' => Some(Tile::Path),
            _ => None,
        }
    }

    /// Can the player occupy this cell?
    pub fn is_passable(self) -> bool {
        matches!(self, Tile::Path)
    }
}

impl Default for Tile {
    fn default() -> Self {
        Tile::Wall
    }
}
