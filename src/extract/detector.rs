//! Instrument detectors and per-sequence detector settings.

use roxmltree::Node;

use super::nav::{attribute, child_elements, first_child_named, parse_double, parse_flag, parse_int, try_parse_double};
use crate::model::{Detector, DetectorSetting};

const TRANSMISSION_CHANNEL: &str = "Transmission Channel";

/// One [`Detector`] per child of the main setting's `DetectorList`.
///
/// `Zoom` is read once from the main setting and copied onto every detector.
pub fn extract_detectors(main_setting: Node<'_, '_>) -> Vec<Detector> {
    let zoom = parse_double(attribute(main_setting, "Zoom"));
    let Some(list) = first_child_named(main_setting, "DetectorList") else {
        return Vec::new();
    };

    child_elements(list)
        .map(|node| Detector {
            model: attribute(node, "Name").to_string(),
            detector_type: attribute(node, "Type").to_string(),
            zoom,
        })
        .collect()
}

/// Every detector setting of one sequential block, active or not.
///
/// `detector_list_index` is the position in the block's `DetectorList`, so
/// inactive entries still consume an index.
pub fn extract_detector_settings(
    block: Node<'_, '_>,
    sequence_index: usize,
    detectors: &[Detector],
) -> Vec<DetectorSetting> {
    let Some(list) = first_child_named(block, "DetectorList") else {
        return Vec::new();
    };

    child_elements(list)
        .enumerate()
        .map(|(detector_list_index, node)| {
            let name = attribute(node, "Name").to_string();
            let channel_name = attribute(node, "ChannelName").to_string();
            let transmitted_light_mode =
                name.to_lowercase().contains("trans") && channel_name == TRANSMISSION_CHANNEL;
            let detector = detectors.iter().find(|d| d.model == name).cloned();
            let reference_line_wavelength = first_child_named(node, "DetectionReferenceLine")
                .and_then(|line| try_parse_double(attribute(line, "LaserWavelength")));

            DetectorSetting {
                gain: parse_double(attribute(node, "Gain")),
                offset: parse_double(attribute(node, "Offset")),
                is_active: parse_flag(attribute(node, "IsActive")),
                channel_index: parse_int(attribute(node, "Channel")) - 1,
                channel_name,
                sequence_index,
                detector_list_index,
                transmitted_light_mode,
                detector,
                reference_line_wavelength,
                name,
                cut_in: None,
                cut_out: None,
            }
        })
        .collect()
}

/// Active settings of one block, keeping their original list indices.
pub fn active_detector_settings(
    block: Node<'_, '_>,
    sequence_index: usize,
    detectors: &[Detector],
) -> Vec<DetectorSetting> {
    extract_detector_settings(block, sequence_index, detectors)
        .into_iter()
        .filter(|setting| setting.is_active)
        .collect()
}
