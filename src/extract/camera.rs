use roxmltree::Node;

use super::hardware::HardwareSettings;
use super::nav::{attribute, descendants_named, first_child_named, parse_double};
use crate::model::{CameraAcquisitionSettings, WidefieldChannelInfo};

const CONFIGURATOR: &str = "WideFieldChannelConfigurator";
const CHANNEL_INFO: &str = "WideFieldChannelInfo";

/// Builds the widefield settings of a camera image, `None` without a main setting.
///
/// With sequential blocks each block contributes the first channel info of
/// its configurator (an empty entry when it has none, so positions stay
/// aligned with the channel list). Without blocks every channel info below
/// the main setting's configurator is used.
pub fn extract_camera_settings(hardware: &HardwareSettings<'_, '_>) -> Option<CameraAcquisitionSettings> {
    let main = hardware.main?;

    let channels = if hardware.sequential.is_empty() {
        first_child_named(main, CONFIGURATOR)
            .and_then(|configurator| descendants_named(configurator, CHANNEL_INFO))
            .unwrap_or_default()
            .into_iter()
            .map(channel_info)
            .collect()
    } else {
        hardware
            .sequential
            .iter()
            .map(|block| {
                first_child_named(*block, CONFIGURATOR)
                    .and_then(|configurator| first_child_named(configurator, CHANNEL_INFO))
                    .map(channel_info)
                    .unwrap_or_default()
            })
            .collect()
    };

    Some(CameraAcquisitionSettings {
        camera_name: attribute(main, "CameraName").to_string(),
        channels,
    })
}

fn channel_info(node: Node<'_, '_>) -> WidefieldChannelInfo {
    WidefieldChannelInfo {
        name: attribute(node, "UserDefName").to_string(),
        exposure_time: parse_double(attribute(node, "ExposureTime")),
        filter_cube: attribute(node, "FluoCubeName").to_string(),
    }
}
