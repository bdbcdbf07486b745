//! Multiband windows and the filters correlated from them.

use roxmltree::Node;

use super::nav::{attribute, child_elements, first_child_named, parse_double, parse_int};
use crate::model::{DetectorSetting, Filter, Multiband};

/// Every multiband child of one block's `Spectro` element.
pub fn extract_multibands(block: Node<'_, '_>, sequence_index: usize) -> Vec<Multiband> {
    let Some(spectro) = first_child_named(block, "Spectro") else {
        return Vec::new();
    };

    child_elements(spectro)
        .enumerate()
        .map(|(multiband_index, node)| Multiband {
            sequence_index,
            multiband_index,
            channel: parse_int(attribute(node, "Channel")),
            cut_in: parse_double(attribute(node, "LeftWorld")),
            cut_out: parse_double(attribute(node, "RightWorld")),
            dye_name: attribute(node, "DyeName").to_string(),
        })
        .collect()
}

/// Merges one block's multibands into its active detector settings.
///
/// Multiband `k` belongs to the active detector whose detector-list index is
/// `k` in the same sequence; multibands without such a detector are dropped.
/// Transmitted-light detectors get an empty filter at their own index. The
/// returned filters are unsorted.
pub fn correlate_filters(multibands: &[Multiband], settings: &mut [DetectorSetting]) -> Vec<Filter> {
    let mut filters = Vec::new();

    for multiband in multibands {
        let Some(setting) = settings.iter_mut().find(|s| {
            s.sequence_index == multiband.sequence_index
                && s.detector_list_index == multiband.multiband_index
        }) else {
            continue;
        };

        setting.cut_in = Some(multiband.cut_in);
        setting.cut_out = Some(multiband.cut_out);
        filters.push(Filter {
            cut_in: Some(multiband.cut_in),
            cut_out: Some(multiband.cut_out),
            dye: Some(multiband.dye_name.clone()),
            sequence_index: multiband.sequence_index,
            multiband_index: multiband.multiband_index,
        });
    }

    filters.extend(
        settings
            .iter()
            .filter(|s| s.transmitted_light_mode)
            .map(|s| Filter::empty(s.sequence_index, s.detector_list_index)),
    );

    filters
}
