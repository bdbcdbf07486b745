//! Normalized object model of an LMS acquisition.
//!
//! Every entity is built once per extraction pass from an immutable XML
//! subtree and never patched afterwards. Cross references (a detector setting
//! pointing at its instrument detector, a laser setting at its laser) are
//! resolved by value lookup during construction and stored as owned copies,
//! so a record has no internal aliasing and no lifetime tied to the document.

mod acquisition;
mod channel;
mod dimension;
mod instrument;
mod position;
mod roi;

pub use acquisition::{
    Acquisition, ChannelAssignment, DataSourceType, HardwareSettingLayout, HardwareSummary,
    Timestamps,
};
pub use channel::{channel_priority, lut_color, Channel, Rgba};
pub use dimension::{Dimension, DimensionKey, ImageGeometry};
pub use instrument::{
    CameraAcquisitionSettings, ConfocalAcquisitionSettings, ConfocalChannelSetting, Detector,
    DetectorSetting, Filter, Laser, LaserSetting, Microscope, MicroscopeType, Multiband,
    Objective, WidefieldChannelInfo,
};
pub use position::{FieldPosition, FieldPositions};
pub use roi::{Roi, RoiSource, Vertex};
