//! Image dimensions and the core geometry derived from them.

use serde::{Deserialize, Serialize};

/// Semantic axis identity of a dimension description.
///
/// LMS files identify axes by a numeric `DimID`. Only the ids below carry a
/// meaning of their own; every other id is an "extra" axis whose size is
/// folded into Z or T when the geometry is computed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DimensionKey {
    X,
    Y,
    Z,
    T,
    C,
    S,
}

impl DimensionKey {
    /// Maps a numeric `DimID` onto its semantic key, if it has one.
    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(Self::X),
            2 => Some(Self::Y),
            3 => Some(Self::Z),
            4 => Some(Self::T),
            5 => Some(Self::C),
            10 => Some(Self::S),
            _ => None,
        }
    }

    /// The numeric `DimID` this key is stored under.
    pub fn id(self) -> i32 {
        match self {
            Self::X => 1,
            Self::Y => 2,
            Self::Z => 3,
            Self::T => 4,
            Self::C => 5,
            Self::S => 10,
        }
    }
}

/// One `DimensionDescription` of an image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    /// Semantic key, `None` for axes without a dedicated meaning.
    pub key: Option<DimensionKey>,

    /// Raw `DimID` as found in the document.
    pub id: i32,

    /// Number of elements along this axis.
    pub size: u64,

    /// Byte stride between two neighbouring elements.
    pub bytes_inc: u64,

    /// Physical extent of the axis, in `unit`.
    pub length: f64,

    /// Unit string, copied verbatim.
    pub unit: String,

    /// Physical position of the first element.
    pub origin: f64,

    /// Legacy step formula: length / size instead of length / (size - 1).
    pub old_physical_size: bool,
}

impl Dimension {
    /// Creates a dimension, deriving the semantic key from `id`.
    pub fn new(
        id: i32,
        size: u64,
        bytes_inc: u64,
        length: f64,
        unit: impl Into<String>,
        origin: f64,
        old_physical_size: bool,
    ) -> Self {
        Self {
            key: DimensionKey::from_id(id),
            id,
            size,
            bytes_inc,
            length,
            unit: unit.into(),
            origin,
            old_physical_size,
        }
    }

    /// Physical distance between two neighbouring elements.
    pub fn step(&self) -> f64 {
        if self.old_physical_size {
            if self.size == 0 {
                return self.length;
            }
            return self.length / self.size as f64;
        }
        if self.size <= 1 {
            return self.length;
        }
        self.length / (self.size - 1) as f64
    }

    /// Bytes covered by the whole axis (`size * bytes_inc`).
    pub fn byte_span(&self) -> u64 {
        self.size.saturating_mul(self.bytes_inc)
    }
}

/// Core geometry of an image, computed from its dimensions and channels.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageGeometry {
    pub size_x: u64,
    pub size_y: u64,
    pub size_z: u64,
    pub size_c: u64,
    pub size_t: u64,

    /// Number of tiles (the `S` axis), 1 when absent.
    pub tile_count: u64,

    /// True when the X stride holds three interleaved samples.
    pub rgb: bool,

    /// True when the channel order is BGR (first of at least three channels has tag 3).
    pub inverse_rgb: bool,

    /// Bytes per sample, after the RGB division.
    pub bytes_per_sample: u64,

    /// Physical pixel size along X, in the X dimension's unit.
    pub physical_size_x: f64,

    /// Physical pixel size along Y, in the Y dimension's unit.
    pub physical_size_y: f64,

    /// Physical step along Z, in the Z dimension's unit.
    pub z_step: f64,

    /// Number of planes per tile.
    pub image_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_maps_known_ids_only() {
        assert_eq!(DimensionKey::from_id(1), Some(DimensionKey::X));
        assert_eq!(DimensionKey::from_id(10), Some(DimensionKey::S));
        assert_eq!(DimensionKey::from_id(6), None);
        for key in [
            DimensionKey::X,
            DimensionKey::Y,
            DimensionKey::Z,
            DimensionKey::T,
            DimensionKey::C,
            DimensionKey::S,
        ] {
            assert_eq!(DimensionKey::from_id(key.id()), Some(key));
        }
    }

    #[test]
    fn step_uses_gaps_between_elements() {
        let dim = Dimension::new(1, 5, 1, 8.0, "m", 0.0, false);
        assert_eq!(dim.step(), 2.0);

        let legacy = Dimension::new(1, 5, 1, 8.0, "m", 0.0, true);
        assert_eq!(legacy.step(), 1.6);
    }

    #[test]
    fn step_of_single_element_is_its_length() {
        let dim = Dimension::new(3, 1, 4096, 0.5, "m", 0.0, false);
        assert_eq!(dim.step(), 0.5);
    }
}
