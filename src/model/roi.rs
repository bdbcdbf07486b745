use serde::{Deserialize, Serialize};

/// A vertex of a region of interest, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
}

/// Which document layout a region of interest was read from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoiSource {
    /// One `Annotation` element per region with flat attributes.
    #[default]
    Annotation,
    /// A `ROISingle` element nested below `ROI/Children/Element`.
    Single,
}

/// A region of interest drawn on the image.
///
/// Translation (and, for annotations, scaling) is divided by the physical
/// pixel size at extraction time, so all geometry is expressed in pixels.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Roi {
    pub source: RoiSource,
    pub roi_type: i32,
    pub color: i64,
    pub name: String,
    pub font_name: String,
    pub font_size: String,
    pub line_width: i32,
    pub trans_x: f64,
    pub trans_y: f64,
    pub scale_x: f64,
    pub scale_y: f64,

    /// Rotation in degrees.
    pub rotation: f64,

    pub vertices: Vec<Vertex>,
    pub text: String,
}
