use serde::{Deserialize, Serialize};

/// Single coordinate axis used for map size and positions.
pub type Coord = u8;

/// Two-dimensional coordinates `(x, y)`, `y` being the row counted from the surface.
pub type Coord2 = (Coord, Coord);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    pub const fn delta(self) -> (i16, i16) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// Whether `(x, y)` already sits on the edge this direction walks towards.
    pub(crate) const fn is_at_boundary(self, (x, y): (i16, i16), max: i16) -> bool {
        match self {
            Self::Up => y <= 0,
            Self::Down => y >= max,
            Self::Left => x <= 0,
            Self::Right => x >= max,
        }
    }
}

/// Where a player currently is.
///
/// `Submarine` is the off-grid spot every diver starts from and returns to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    Submarine,
    Map(Coord2),
}

impl Position {
    pub const fn is_on_submarine(self) -> bool {
        matches!(self, Self::Submarine)
    }

    pub const fn coords(self) -> Option<Coord2> {
        match self {
            Self::Submarine => None,
            Self::Map(coords) => Some(coords),
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::Submarine
    }
}

/// A click already translated by the host into something the engine understands.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    Submarine,
    Cell(Coord2),
}

impl From<Coord2> for Target {
    fn from(coords: Coord2) -> Self {
        Self::Cell(coords)
    }
}
