//! The assembled acquisition record.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::channel::Channel;
use super::dimension::{Dimension, DimensionKey, ImageGeometry};
use super::instrument::{
    CameraAcquisitionSettings, ConfocalAcquisitionSettings, Filter, Microscope, Objective,
};
use super::position::FieldPositions;
use super::roi::Roi;

/// Schema generation of the hardware-setting attachment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HardwareSettingLayout {
    /// `HardwareSettingList/HardwareSetting`, no type discriminants.
    Old,
    /// `Attachment Name="HardwareSetting"` with explicit `DataSourceTypeName`.
    New,
}

/// Acquisition mode of the instrument.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataSourceType {
    Confocal,
    Camera,
}

/// Classification of the hardware settings found for an image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardwareSummary {
    pub layout: HardwareSettingLayout,

    /// `None` when an old-layout document carries neither setting kind.
    pub data_source: Option<DataSourceType>,
}

/// Decoded plane timestamps.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Timestamps {
    /// Seconds since the tick epoch (1601-01-01), document order.
    pub seconds: Vec<f64>,

    /// First timestamp as an ISO-8601 UTC string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acquired_date: Option<String>,
}

impl Timestamps {
    /// Offsets of every timestamp relative to the first one.
    pub fn delta_t(&self) -> Vec<f64> {
        match self.seconds.first() {
            Some(first) => self.seconds.iter().map(|s| s - first).collect(),
            None => Vec::new(),
        }
    }
}

/// Per-channel view joining the channel list with the hardware settings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelAssignment {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dye: Option<String>,

    /// Index into the confocal channel settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_setting: Option<usize>,

    /// Index into the sorted filter list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exposure_time: Option<f64>,
}

/// Everything extracted from one image node.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Acquisition {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub user_comments: Vec<String>,

    pub dimensions: Vec<Dimension>,
    pub geometry: ImageGeometry,
    pub channels: Vec<Channel>,
    pub timestamps: Timestamps,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hardware: Option<HardwareSummary>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub microscope: Option<Microscope>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objective: Option<Objective>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positions: Option<FieldPositions>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confocal: Option<ConfocalAcquisitionSettings>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera: Option<CameraAcquisitionSettings>,

    pub channel_assignments: Vec<ChannelAssignment>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rois: Vec<Roi>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub single_rois: Vec<Roi>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub original_metadata: BTreeMap<String, String>,
}

impl Acquisition {
    /// First dimension with the given key.
    pub fn dimension(&self, key: DimensionKey) -> Option<&Dimension> {
        self.dimensions.iter().find(|dim| dim.key == Some(key))
    }

    /// Sorted filters of the confocal settings (empty for camera data).
    pub fn filters(&self) -> &[Filter] {
        self.confocal
            .as_ref()
            .map(|confocal| confocal.filters.as_slice())
            .unwrap_or(&[])
    }
}
