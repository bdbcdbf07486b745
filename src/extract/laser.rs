//! Instrument lasers and per-sequence AOTF laser-line settings.

use roxmltree::Node;

use super::nav::{attribute, child_elements, descendants_named, first_child_named, parse_double};
use crate::model::{Laser, LaserSetting};

/// One [`Laser`] per child of the main setting's `LaserArray`.
pub fn extract_lasers(main_setting: Node<'_, '_>) -> Vec<Laser> {
    let Some(array) = first_child_named(main_setting, "LaserArray") else {
        return Vec::new();
    };

    child_elements(array)
        .map(|node| Laser {
            name: attribute(node, "LaserName").to_string(),
            wavelength: parse_double(attribute(node, "Wavelength")),
            is_active: attribute(node, "PowerState") == "On"
                && attribute(node, "OutputPowerWatt") != "0",
        })
        .collect()
}

/// Laser-line settings of one sequential block's `AotfList`.
///
/// Lines are collected with the single-branch descendant search, so only the
/// first AOTF holding `LaserLineSetting` elements contributes. Each line is
/// bound to the first instrument laser with exactly its wavelength.
pub fn extract_laser_settings(
    block: Node<'_, '_>,
    sequence_index: usize,
    lasers: &[Laser],
) -> Vec<LaserSetting> {
    let Some(lines) = first_child_named(block, "AotfList")
        .and_then(|aotf_list| descendants_named(aotf_list, "LaserLineSetting"))
    else {
        return Vec::new();
    };

    lines
        .into_iter()
        .enumerate()
        .map(|(laser_line_index, node)| {
            let wavelength = parse_double(attribute(node, "LaserLine"));
            LaserSetting {
                sequence_index,
                laser_line_index,
                wavelength,
                intensity: parse_double(attribute(node, "IntensityDev")),
                laser: lasers.iter().find(|l| l.wavelength == wavelength).cloned(),
            }
        })
        .collect()
}
