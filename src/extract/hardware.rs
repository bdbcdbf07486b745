//! Hardware-settings locator.
//!
//! Two layouts are recognized:
//! - NEW: an `Attachment` with `Name="HardwareSetting"` carrying an explicit
//!   `DataSourceTypeName`.
//! - OLD: an `Attachment` with `Name="HardwareSettingList"` whose
//!   `HardwareSetting` child has no type discriminant; the data source is
//!   probed from the nested sequential-master block instead.

use roxmltree::Node;

use super::nav::{attribute, child_elements, descendants_named, first_child_named, first_with_attribute};
use crate::model::{DataSourceType, HardwareSettingLayout, HardwareSummary};

const CONFOCAL_DEFINITION: &str = "ATLConfocalSettingDefinition";
const CAMERA_DEFINITION: &str = "ATLCameraSettingDefinition";
const CONFOCAL_SEQUENTIAL: &str = "LDM_Block_Sequential";
const CAMERA_SEQUENTIAL: &str = "LDM_Block_Widefield_Sequential";
const SEQUENTIAL_MASTER: &str = "LDM_Block_Sequential_Master";
const SEQUENTIAL_LIST: &str = "LDM_Block_Sequential_List";

/// Resolved hardware-setting blocks of one image.
#[derive(Clone, Debug)]
pub struct HardwareSettings<'a, 'input> {
    /// The hardware-setting element itself.
    pub setting: Node<'a, 'input>,
    pub layout: HardwareSettingLayout,
    pub data_source: Option<DataSourceType>,

    /// Instrument-wide setting definition (confocal or camera).
    pub main: Option<Node<'a, 'input>>,

    /// Setting definition of the sequential master block.
    pub master: Option<Node<'a, 'input>>,

    /// Per-sequence setting blocks, in document order.
    pub sequential: Vec<Node<'a, 'input>>,
}

impl<'a, 'input> HardwareSettings<'a, 'input> {
    pub fn summary(&self) -> HardwareSummary {
        HardwareSummary {
            layout: self.layout,
            data_source: self.data_source,
        }
    }

    pub fn is_confocal(&self) -> bool {
        self.data_source == Some(DataSourceType::Confocal)
    }

    pub fn is_camera(&self) -> bool {
        self.data_source == Some(DataSourceType::Camera)
    }
}

/// Finds and classifies the hardware settings below `image`.
///
/// Returns `None` when the image has neither a NEW nor an OLD hardware
/// attachment.
pub fn locate_hardware_settings<'a, 'input>(
    image: Node<'a, 'input>,
) -> Option<HardwareSettings<'a, 'input>> {
    let attachments = descendants_named(image, "Attachment").unwrap_or_default();

    if let Some(setting) = first_with_attribute(attachments.iter().copied(), "Name", "HardwareSetting") {
        let data_source = if attribute(setting, "DataSourceTypeName") == "Confocal" {
            DataSourceType::Confocal
        } else {
            DataSourceType::Camera
        };
        return Some(resolve(setting, HardwareSettingLayout::New, Some(data_source)));
    }

    let list = first_with_attribute(attachments.iter().copied(), "Name", "HardwareSettingList")?;
    let setting = first_child_named(list, "HardwareSetting")?;
    let data_source = probe_data_source(setting);
    if data_source.is_none() {
        log::warn!("hardware setting carries neither confocal nor camera definitions");
    }
    Some(resolve(setting, HardwareSettingLayout::Old, data_source))
}

/// OLD-layout classification: confocal master first, then camera master.
fn probe_data_source(setting: Node<'_, '_>) -> Option<DataSourceType> {
    if master_definition(setting, CONFOCAL_SEQUENTIAL, CONFOCAL_DEFINITION).is_some() {
        return Some(DataSourceType::Confocal);
    }
    if master_definition(setting, CAMERA_SEQUENTIAL, CAMERA_DEFINITION).is_some() {
        return Some(DataSourceType::Camera);
    }
    None
}

fn master_definition<'a, 'input>(
    setting: Node<'a, 'input>,
    sequential: &str,
    definition: &str,
) -> Option<Node<'a, 'input>> {
    first_child_named(setting, sequential)
        .and_then(|block| first_child_named(block, SEQUENTIAL_MASTER))
        .and_then(|master| first_child_named(master, definition))
}

fn resolve<'a, 'input>(
    setting: Node<'a, 'input>,
    layout: HardwareSettingLayout,
    data_source: Option<DataSourceType>,
) -> HardwareSettings<'a, 'input> {
    let (sequential_name, definition_name) = match data_source {
        Some(DataSourceType::Confocal) => (CONFOCAL_SEQUENTIAL, CONFOCAL_DEFINITION),
        Some(DataSourceType::Camera) => (CAMERA_SEQUENTIAL, CAMERA_DEFINITION),
        None => {
            return HardwareSettings {
                setting,
                layout,
                data_source,
                main: None,
                master: None,
                sequential: Vec::new(),
            }
        }
    };

    let master = master_definition(setting, sequential_name, definition_name);
    // Old files may only carry the definition inside the master block.
    let main = first_child_named(setting, definition_name).or(master);
    let sequential = first_child_named(setting, sequential_name)
        .and_then(|block| first_child_named(block, SEQUENTIAL_LIST))
        .map(|list| child_elements(list).collect())
        .unwrap_or_default();

    HardwareSettings {
        setting,
        layout,
        data_source,
        main,
        master,
        sequential,
    }
}
