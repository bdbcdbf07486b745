use serde::{Deserialize, Serialize};

/// Stage or tile coordinate, as stored (meters).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldPosition {
    pub x: f64,
    pub y: f64,
}

impl FieldPosition {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Applies the scan orientation: swap first, then negate X, then negate Y.
    pub fn normalized(self, flip_x: bool, flip_y: bool, swap_xy: bool) -> Self {
        let mut pos = self;
        if swap_xy {
            std::mem::swap(&mut pos.x, &mut pos.y);
        }
        if flip_x {
            pos.x = -pos.x;
        }
        if flip_y {
            pos.y = -pos.y;
        }
        pos
    }
}

/// Normalized field positions of an acquisition and the orientation flags used.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldPositions {
    /// One entry per tile, or a single stage position.
    pub positions: Vec<FieldPosition>,

    /// True when the positions came from a `TileScanInfo` attachment.
    pub from_tiles: bool,

    pub flip_x: bool,
    pub flip_y: bool,
    pub swap_xy: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flip_x_negates_x_only() {
        let pos = FieldPosition::new(10.0, 20.0).normalized(true, false, false);
        assert_eq!(pos, FieldPosition::new(-10.0, 20.0));
    }

    #[test]
    fn swap_happens_before_flips() {
        let pos = FieldPosition::new(10.0, 20.0).normalized(true, true, true);
        assert_eq!(pos, FieldPosition::new(-20.0, -10.0));

        let swapped_only = FieldPosition::new(10.0, 20.0).normalized(false, false, true);
        assert_eq!(swapped_only, FieldPosition::new(20.0, 10.0));
    }
}
