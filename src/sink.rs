//! The metadata-store collaborator.
//!
//! Extraction produces owned [`Acquisition`] records; [`write_acquisition`]
//! hands their facts one by one to a [`MetadataStore`], keyed by image and
//! channel/plane/instrument index. [`KeyValueStore`] is the in-memory store
//! used by the CLI and the tests.

use std::collections::BTreeMap;
use std::fmt;

use crate::model::{
    Acquisition, Detector, DetectorSetting, Filter, Laser, LaserSetting, MicroscopeType, Objective,
    Rgba, Roi,
};

/// Destination of normalized acquisition facts.
pub trait MetadataStore {
    fn set_image_name(&mut self, image: usize, name: &str);
    fn set_image_description(&mut self, image: usize, description: &str);
    fn set_image_acquisition_date(&mut self, image: usize, date: &str);

    /// Core sizes: X, Y, Z, C, T.
    fn set_pixels_dimensions(&mut self, image: usize, sizes: [u64; 5]);
    fn set_pixels_physical_size(&mut self, image: usize, x: f64, y: f64, z: f64);

    fn set_plane_delta_t(&mut self, image: usize, plane: usize, seconds: f64);
    fn set_plane_position(&mut self, image: usize, tile: usize, x: f64, y: f64);

    fn set_microscope(&mut self, image: usize, model: &str, serial_number: &str, kind: MicroscopeType);
    fn set_objective(&mut self, image: usize, objective: &Objective);
    fn set_detector(&mut self, image: usize, detector: usize, value: &Detector);
    fn set_laser(&mut self, image: usize, laser: usize, value: &Laser);
    fn set_filter(&mut self, image: usize, filter: usize, value: &Filter);

    fn set_channel_name(&mut self, image: usize, channel: usize, name: &str);
    fn set_channel_color(&mut self, image: usize, channel: usize, color: Rgba);
    fn set_channel_fluor(&mut self, image: usize, channel: usize, dye: &str);
    fn set_channel_pinhole_size(&mut self, image: usize, channel: usize, pinhole: f64);
    fn set_channel_exposure_time(&mut self, image: usize, channel: usize, seconds: f64);
    fn set_channel_detector_settings(&mut self, image: usize, channel: usize, settings: &DetectorSetting);
    fn set_channel_light_source_settings(&mut self, image: usize, channel: usize, settings: &LaserSetting);

    fn set_roi(&mut self, image: usize, roi: usize, value: &Roi);
    fn add_original_metadata(&mut self, image: usize, key: &str, value: &str);
}

/// Pushes every fact of `acquisition` into `store` under index `image`.
pub fn write_acquisition<S: MetadataStore + ?Sized>(store: &mut S, image: usize, acquisition: &Acquisition) {
    store.set_image_name(image, &acquisition.name);
    if let Some(description) = &acquisition.description {
        store.set_image_description(image, description);
    }
    if let Some(date) = &acquisition.timestamps.acquired_date {
        store.set_image_acquisition_date(image, date);
    }

    let geometry = &acquisition.geometry;
    store.set_pixels_dimensions(
        image,
        [geometry.size_x, geometry.size_y, geometry.size_z, geometry.size_c, geometry.size_t],
    );
    store.set_pixels_physical_size(image, geometry.physical_size_x, geometry.physical_size_y, geometry.z_step);

    for (plane, delta) in acquisition.timestamps.delta_t().into_iter().enumerate() {
        store.set_plane_delta_t(image, plane, delta);
    }
    if let Some(positions) = &acquisition.positions {
        for (tile, pos) in positions.positions.iter().enumerate() {
            store.set_plane_position(image, tile, pos.x, pos.y);
        }
    }

    if let Some(microscope) = &acquisition.microscope {
        store.set_microscope(image, &microscope.model, &microscope.serial_number, microscope.microscope_type);
    }
    if let Some(objective) = &acquisition.objective {
        store.set_objective(image, objective);
    }

    if let Some(confocal) = &acquisition.confocal {
        for (index, detector) in confocal.detectors.iter().enumerate() {
            store.set_detector(image, index, detector);
        }
        for (index, laser) in confocal.lasers.iter().enumerate() {
            store.set_laser(image, index, laser);
        }
        for (index, filter) in confocal.filters.iter().enumerate() {
            store.set_filter(image, index, filter);
        }
    }

    for (index, channel) in acquisition.channels.iter().enumerate() {
        if !geometry.rgb {
            store.set_channel_color(image, index, channel.lut_color);
        }
    }

    for (index, assignment) in acquisition.channel_assignments.iter().enumerate() {
        if !assignment.name.is_empty() {
            store.set_channel_name(image, index, &assignment.name);
        }
        if let Some(dye) = assignment.dye.as_deref().filter(|dye| !dye.is_empty()) {
            store.set_channel_fluor(image, index, dye);
        }
        if let Some(exposure) = assignment.exposure_time {
            store.set_channel_exposure_time(image, index, exposure);
        }

        let setting = assignment
            .channel_setting
            .and_then(|i| acquisition.confocal.as_ref()?.channel_settings.get(i));
        if let Some(setting) = setting {
            store.set_channel_detector_settings(image, index, &setting.detector_setting);
            store.set_channel_pinhole_size(image, index, setting.pinhole);
            if let Some(laser_setting) = &setting.laser_setting {
                store.set_channel_light_source_settings(image, index, laser_setting);
            }
        }
    }

    for (index, roi) in acquisition.rois.iter().chain(&acquisition.single_rois).enumerate() {
        store.set_roi(image, index, roi);
    }

    for (key, value) in &acquisition.original_metadata {
        store.add_original_metadata(image, key, value);
    }
}

/// In-memory store keeping one flat `key -> value` entry per fact.
///
/// Keys look like `Image[0].Channel[1].Name`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KeyValueStore {
    entries: BTreeMap<String, String>,
}

impl KeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn put(&mut self, key: String, value: impl ToString) {
        self.entries.insert(key, value.to_string());
    }
}

fn image_key(image: usize) -> String {
    format!("Image[{image}]")
}

fn indexed_key(image: usize, kind: &str, index: usize) -> String {
    format!("Image[{image}].{kind}[{index}]")
}

fn optional<T: fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl MetadataStore for KeyValueStore {
    fn set_image_name(&mut self, image: usize, name: &str) {
        self.put(format!("{}.Name", image_key(image)), name);
    }

    fn set_image_description(&mut self, image: usize, description: &str) {
        self.put(format!("{}.Description", image_key(image)), description);
    }

    fn set_image_acquisition_date(&mut self, image: usize, date: &str) {
        self.put(format!("{}.AcquisitionDate", image_key(image)), date);
    }

    fn set_pixels_dimensions(&mut self, image: usize, sizes: [u64; 5]) {
        for (axis, size) in ["X", "Y", "Z", "C", "T"].iter().zip(sizes) {
            self.put(format!("{}.Pixels.Size{axis}", image_key(image)), size);
        }
    }

    fn set_pixels_physical_size(&mut self, image: usize, x: f64, y: f64, z: f64) {
        let base = format!("{}.Pixels", image_key(image));
        self.put(format!("{base}.PhysicalSizeX"), x);
        self.put(format!("{base}.PhysicalSizeY"), y);
        self.put(format!("{base}.PhysicalSizeZ"), z);
    }

    fn set_plane_delta_t(&mut self, image: usize, plane: usize, seconds: f64) {
        self.put(format!("{}.DeltaT", indexed_key(image, "Plane", plane)), seconds);
    }

    fn set_plane_position(&mut self, image: usize, tile: usize, x: f64, y: f64) {
        let base = indexed_key(image, "Tile", tile);
        self.put(format!("{base}.PositionX"), x);
        self.put(format!("{base}.PositionY"), y);
    }

    fn set_microscope(&mut self, image: usize, model: &str, serial_number: &str, kind: MicroscopeType) {
        let base = format!("{}.Microscope", image_key(image));
        self.put(format!("{base}.Model"), model);
        self.put(format!("{base}.SerialNumber"), serial_number);
        self.put(format!("{base}.Type"), format!("{kind:?}"));
    }

    fn set_objective(&mut self, image: usize, objective: &Objective) {
        let base = format!("{}.Objective", image_key(image));
        self.put(format!("{base}.Model"), &objective.model);
        self.put(format!("{base}.LensNA"), objective.numerical_aperture);
        self.put(format!("{base}.SerialNumber"), &objective.serial_number);
        self.put(format!("{base}.NominalMagnification"), objective.magnification);
        self.put(format!("{base}.Immersion"), &objective.immersion);
        self.put(format!("{base}.RefractiveIndex"), objective.refractive_index);
    }

    fn set_detector(&mut self, image: usize, detector: usize, value: &Detector) {
        let base = indexed_key(image, "Detector", detector);
        self.put(format!("{base}.Model"), &value.model);
        self.put(format!("{base}.Type"), &value.detector_type);
        self.put(format!("{base}.Zoom"), value.zoom);
    }

    fn set_laser(&mut self, image: usize, laser: usize, value: &Laser) {
        let base = indexed_key(image, "Laser", laser);
        self.put(format!("{base}.Model"), &value.name);
        self.put(format!("{base}.Wavelength"), value.wavelength);
        self.put(format!("{base}.Active"), value.is_active);
    }

    fn set_filter(&mut self, image: usize, filter: usize, value: &Filter) {
        let base = indexed_key(image, "Filter", filter);
        self.put(format!("{base}.CutIn"), optional(value.cut_in));
        self.put(format!("{base}.CutOut"), optional(value.cut_out));
        self.put(format!("{base}.Dye"), value.dye.as_deref().unwrap_or(""));
    }

    fn set_channel_name(&mut self, image: usize, channel: usize, name: &str) {
        self.put(format!("{}.Name", indexed_key(image, "Channel", channel)), name);
    }

    fn set_channel_color(&mut self, image: usize, channel: usize, color: Rgba) {
        self.put(format!("{}.Color", indexed_key(image, "Channel", channel)), color);
    }

    fn set_channel_fluor(&mut self, image: usize, channel: usize, dye: &str) {
        self.put(format!("{}.Fluor", indexed_key(image, "Channel", channel)), dye);
    }

    fn set_channel_pinhole_size(&mut self, image: usize, channel: usize, pinhole: f64) {
        self.put(format!("{}.PinholeSize", indexed_key(image, "Channel", channel)), pinhole);
    }

    fn set_channel_exposure_time(&mut self, image: usize, channel: usize, seconds: f64) {
        self.put(format!("{}.ExposureTime", indexed_key(image, "Channel", channel)), seconds);
    }

    fn set_channel_detector_settings(&mut self, image: usize, channel: usize, settings: &DetectorSetting) {
        let base = format!("{}.DetectorSettings", indexed_key(image, "Channel", channel));
        self.put(format!("{base}.Name"), &settings.name);
        self.put(format!("{base}.Gain"), settings.gain);
        self.put(format!("{base}.Offset"), settings.offset);
    }

    fn set_channel_light_source_settings(&mut self, image: usize, channel: usize, settings: &LaserSetting) {
        let base = format!("{}.LightSourceSettings", indexed_key(image, "Channel", channel));
        self.put(format!("{base}.Wavelength"), settings.wavelength);
        self.put(format!("{base}.Attenuation"), settings.attenuation());
    }

    fn set_roi(&mut self, image: usize, roi: usize, value: &Roi) {
        let base = indexed_key(image, "ROI", roi);
        self.put(format!("{base}.Name"), &value.name);
        self.put(format!("{base}.Type"), value.roi_type);
        self.put(format!("{base}.Vertices"), value.vertices.len());
    }

    fn add_original_metadata(&mut self, image: usize, key: &str, value: &str) {
        self.put(format!("{}.Original.{key}", image_key(image)), value);
    }
}

impl fmt::Display for KeyValueStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.entries {
            writeln!(f, "{key} = {value}")?;
        }
        Ok(())
    }
}
