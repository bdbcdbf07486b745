//! Confocal channel reconciliation.
//!
//! Each sequential block contributes its active detector settings, its
//! multiband windows and its AOTF laser lines. Detectors are paired with at
//! most one laser line per block, then the instrument-level detector and
//! laser objects are attached in two separate passes. Document order decides
//! every tie.

use super::detector::{active_detector_settings, extract_detectors};
use super::filter::{correlate_filters, extract_multibands};
use super::hardware::HardwareSettings;
use super::laser::{extract_laser_settings, extract_lasers};
use super::nav::{attribute, parse_double};
use crate::model::{
    ConfocalAcquisitionSettings, ConfocalChannelSetting, Detector, DetectorSetting, Filter, Laser,
    LaserSetting,
};

/// Builds the confocal settings of an image, `None` without a main setting.
pub fn extract_confocal_settings(hardware: &HardwareSettings<'_, '_>) -> Option<ConfocalAcquisitionSettings> {
    let main = hardware.main?;
    let lasers = extract_lasers(main);
    let detectors = extract_detectors(main);

    let mut channel_settings = Vec::new();
    let mut filters = Vec::new();

    for (sequence_index, block) in hardware.sequential.iter().copied().enumerate() {
        let mut active = active_detector_settings(block, sequence_index, &detectors);
        let multibands = extract_multibands(block, sequence_index);
        filters.extend(correlate_filters(&multibands, &mut active));

        let laser_settings = extract_laser_settings(block, sequence_index, &lasers);
        let pinhole = parse_double(attribute(block, "Pinhole"));

        for detector_setting in active {
            let laser_setting = select_laser_setting(&detector_setting, &laser_settings).cloned();
            if laser_setting.is_none() {
                log::debug!(
                    "no laser line for detector '{}' in sequence {}",
                    detector_setting.name,
                    sequence_index
                );
            }
            channel_settings.push(ConfocalChannelSetting {
                detector_setting,
                laser_setting,
                detector: None,
                laser: None,
                pinhole,
            });
        }
    }

    filters.sort_by(Filter::cmp_order);
    attach_instrument_objects(&mut channel_settings, &detectors, &lasers);

    Some(ConfocalAcquisitionSettings {
        zoom: parse_double(attribute(main, "Zoom")),
        readout_rate: parse_double(attribute(main, "ScanSpeed")),
        pinhole_size: parse_double(attribute(main, "Pinhole")),
        lasers,
        detectors,
        channel_settings,
        filters,
    })
}

/// Picks the laser line that excited a detector.
///
/// With a positive reference line the first setting with exactly that
/// wavelength wins. Otherwise the resolved laser with the greatest wavelength
/// strictly below the detector's cut-in wins; equal wavelengths keep the
/// earliest candidate.
pub fn select_laser_setting<'s>(
    detector: &DetectorSetting,
    candidates: &'s [LaserSetting],
) -> Option<&'s LaserSetting> {
    if let Some(reference) = detector.reference_line_wavelength.filter(|w| *w > 0.0) {
        return candidates.iter().find(|c| c.wavelength == reference);
    }

    let cut_in = detector.cut_in?;
    let mut selected: Option<(&LaserSetting, f64)> = None;
    for candidate in candidates {
        let Some(wavelength) = candidate.laser_wavelength() else {
            continue;
        };
        if wavelength >= cut_in {
            continue;
        }
        if selected.map_or(true, |(_, best)| wavelength > best) {
            selected = Some((candidate, wavelength));
        }
    }
    selected.map(|(setting, _)| setting)
}

/// Attaches instrument detectors (by model name or list index) and lasers (by name).
pub fn attach_instrument_objects(
    settings: &mut [ConfocalChannelSetting],
    detectors: &[Detector],
    lasers: &[Laser],
) {
    for setting in settings.iter_mut() {
        let name = &setting.detector_setting.name;
        let list_index = setting.detector_setting.detector_list_index;
        setting.detector = detectors
            .iter()
            .enumerate()
            .find(|(index, detector)| detector.model == *name || *index == list_index)
            .map(|(_, detector)| detector.clone());
    }

    for setting in settings.iter_mut() {
        let Some(laser_name) = setting
            .laser_setting
            .as_ref()
            .and_then(|ls| ls.laser.as_ref())
            .map(|laser| laser.name.clone())
        else {
            continue;
        };
        setting.laser = lasers.iter().find(|laser| laser.name == laser_name).cloned();
    }
}
