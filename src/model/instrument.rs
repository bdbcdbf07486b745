//! Instrument hardware and per-sequence acquisition settings.
//!
//! Instrument-scoped objects ([`Laser`], [`Detector`]) describe the hardware
//! of the microscope. Sequence-scoped objects ([`LaserSetting`],
//! [`DetectorSetting`], [`Multiband`], [`Filter`]) describe how that hardware
//! was configured for one sequential acquisition block. Cross references are
//! resolved by value while the objects are built and stored as owned copies.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// A laser of the instrument.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Laser {
    pub name: String,

    /// Emission wavelength in nm.
    pub wavelength: f64,

    /// `PowerState == "On"` and `OutputPowerWatt != "0"`.
    pub is_active: bool,
}

/// AOTF laser-line setting of one sequential block.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LaserSetting {
    pub sequence_index: usize,

    /// Position of the line among the block's laser-line settings.
    pub laser_line_index: usize,

    /// Target wavelength of the line, in nm.
    pub wavelength: f64,

    /// Intensity in percent.
    pub intensity: f64,

    /// Instrument laser with exactly this wavelength (first declared wins).
    pub laser: Option<Laser>,
}

impl LaserSetting {
    /// Attenuation as a fraction in `[0, 1]`, derived from the intensity.
    pub fn attenuation(&self) -> f64 {
        (1.0 - self.intensity / 100.0).clamp(0.0, 1.0)
    }

    /// Wavelength of the resolved instrument laser.
    pub fn laser_wavelength(&self) -> Option<f64> {
        self.laser.as_ref().map(|laser| laser.wavelength)
    }
}

/// A detector of the instrument.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Detector {
    pub model: String,

    /// Detector technology as named by the vendor (e.g. "PMT", "HyD").
    pub detector_type: String,

    pub zoom: f64,
}

/// State of one detector within one sequential block.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectorSetting {
    /// Detector name as listed in the block.
    pub name: String,

    pub gain: f64,
    pub offset: f64,
    pub is_active: bool,

    /// 0-based channel index (the document stores it 1-based).
    pub channel_index: i32,

    pub channel_name: String,
    pub sequence_index: usize,

    /// 0-based position within the block's detector list, counting inactive entries.
    pub detector_list_index: usize,

    /// Transmitted-light PMT; these have no multiband.
    pub transmitted_light_mode: bool,

    /// Instrument detector with the same model name (first match wins).
    pub detector: Option<Detector>,

    /// Excitation line the detector is configured to pair with (newer hardware only).
    pub reference_line_wavelength: Option<f64>,

    /// Spectral window cut-in, once merged with the block's multiband.
    pub cut_in: Option<f64>,

    /// Spectral window cut-out, once merged with the block's multiband.
    pub cut_out: Option<f64>,
}

/// A configured spectral detection window of one sequential block.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Multiband {
    pub sequence_index: usize,

    /// 0-based position within the block's spectral list.
    pub multiband_index: usize,

    /// 1-based channel number as stored in the document.
    pub channel: i32,

    pub cut_in: f64,
    pub cut_out: f64,
    pub dye_name: String,
}

/// Emission filter derived from a multiband (or synthesized for transmitted light).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub cut_in: Option<f64>,
    pub cut_out: Option<f64>,
    pub dye: Option<String>,
    pub sequence_index: usize,

    /// Mirrors the detector-list index of the detector it belongs to.
    pub multiband_index: usize,
}

impl Filter {
    /// A filter without spectral information, used for transmitted-light detectors.
    pub fn empty(sequence_index: usize, multiband_index: usize) -> Self {
        Self {
            sequence_index,
            multiband_index,
            ..Self::default()
        }
    }

    /// Sort key: sequence index first, then multiband index.
    pub fn order_key(&self) -> (usize, usize) {
        (self.sequence_index, self.multiband_index)
    }

    /// Total order used to sort filter collections.
    pub fn cmp_order(&self, other: &Self) -> Ordering {
        self.order_key().cmp(&other.order_key())
    }
}

/// One physically active detector paired with at most one laser line.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfocalChannelSetting {
    pub detector_setting: DetectorSetting,
    pub laser_setting: Option<LaserSetting>,

    /// Instrument detector matched by model name or detector-list index.
    pub detector: Option<Detector>,

    /// Instrument laser matched by name.
    pub laser: Option<Laser>,

    /// Pinhole of the channel's sequential block, as stored (meters).
    pub pinhole: f64,
}

/// Aggregate confocal settings of one acquisition.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfocalAcquisitionSettings {
    pub zoom: f64,

    /// `ScanSpeed` of the main setting.
    pub readout_rate: f64,

    /// Pinhole of the main setting, as stored (meters).
    pub pinhole_size: f64,

    pub lasers: Vec<Laser>,
    pub detectors: Vec<Detector>,

    /// One entry per active detector, blocks concatenated in order.
    pub channel_settings: Vec<ConfocalChannelSetting>,

    /// Filters sorted by (sequence index, multiband index).
    pub filters: Vec<Filter>,
}

/// Widefield channel configuration of a camera acquisition.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WidefieldChannelInfo {
    pub name: String,

    /// Exposure time, as stored (seconds).
    pub exposure_time: f64,

    pub filter_cube: String,
}

/// Aggregate camera settings of one acquisition.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraAcquisitionSettings {
    pub camera_name: String,
    pub channels: Vec<WidefieldChannelInfo>,
}

/// Orientation of the microscope stand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MicroscopeType {
    Inverted,
    Upright,
    #[default]
    Other,
}

/// Identity of the microscope stand.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Microscope {
    pub model: String,
    pub serial_number: String,
    pub microscope_type: MicroscopeType,
}

/// Objective used for the acquisition.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    pub model: String,
    pub numerical_aperture: f64,
    pub serial_number: String,
    pub magnification: f64,
    pub immersion: String,
    pub refractive_index: f64,
}
