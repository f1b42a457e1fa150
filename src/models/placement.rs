#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlacementMode {
    Free,
    Grid,
}

/// Where one node is drawn. Coordinates are already multiplied by the
/// global scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    Free { x: f32, y: f32 },
    Grid { x: f32, y: f32, row: usize },
}

impl Placement {
    pub fn x(&self) -> f32 {
        match *self {
            Placement::Free { x, .. } | Placement::Grid { x, .. } => x,
        }
    }

    pub fn y(&self) -> f32 {
        match *self {
            Placement::Free { y, .. } | Placement::Grid { y, .. } => y,
        }
    }

    pub fn mode(&self) -> PlacementMode {
        match self {
            Placement::Free { .. } => PlacementMode::Free,
            Placement::Grid { .. } => PlacementMode::Grid,
        }
    }

    pub fn row(&self) -> Option<usize> {
        match *self {
            Placement::Grid { row, .. } => Some(row),
            Placement::Free { .. } => None,
        }
    }
}
