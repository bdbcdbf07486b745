//! Microscope stand identity and objective.

use roxmltree::Node;

use super::hardware::HardwareSettings;
use super::nav::{attribute, descendants_named, parse_double};
use crate::model::{HardwareSettingLayout, Microscope, MicroscopeType, Objective};

const RECORD_TAGS: [&str; 2] = ["ScannerSettingRecord", "FilterSettingRecord"];

/// Reads the stand identity according to the hardware layout.
pub fn extract_microscope(image: Node<'_, '_>, hardware: &HardwareSettings<'_, '_>) -> Microscope {
    match hardware.layout {
        HardwareSettingLayout::Old => Microscope {
            model: record_variant(image, "SystemType"),
            serial_number: record_variant(image, "SystemSerialNumber"),
            microscope_type: MicroscopeType::Other,
        },
        HardwareSettingLayout::New => {
            let main_attribute = |name: &str| hardware.main.map(|main| attribute(main, name)).unwrap_or("");

            let mut model = attribute(hardware.setting, "SystemTypeName");
            if model.is_empty() {
                model = main_attribute("SystemTypeName");
            }
            let microscope_type = if main_attribute("IsInverseMicroscopeModel") == "1" {
                MicroscopeType::Inverted
            } else {
                MicroscopeType::Upright
            };

            Microscope {
                model: model.to_string(),
                serial_number: main_attribute("SystemSerialNumber").to_string(),
                microscope_type,
            }
        }
    }
}

/// `Variant` of the first setting record identified by `key`.
fn record_variant(image: Node<'_, '_>, key: &str) -> String {
    RECORD_TAGS
        .iter()
        .filter_map(|tag| descendants_named(image, tag))
        .flatten()
        .find(|record| attribute(*record, "Identifier") == key || attribute(*record, "Description") == key)
        .map(|record| attribute(record, "Variant").to_string())
        .unwrap_or_default()
}

/// Objective of the main setting, `None` without one.
pub fn extract_objective(hardware: &HardwareSettings<'_, '_>) -> Option<Objective> {
    let main = hardware.main?;
    Some(Objective {
        model: attribute(main, "ObjectiveName").to_string(),
        numerical_aperture: parse_double(attribute(main, "NumericalAperture")),
        serial_number: attribute(main, "ObjectiveNumber").to_string(),
        magnification: parse_double(attribute(main, "Magnification")),
        immersion: attribute(main, "Immersion").to_string(),
        refractive_index: parse_double(attribute(main, "RefractionIndex")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::hardware::locate_hardware_settings;
    use roxmltree::Document;

    #[test]
    fn new_layout_reads_inversion_flag() {
        let xml = r#"<Image><Attachment Name="HardwareSetting" DataSourceTypeName="Confocal" SystemTypeName="TCS SP8">
          <ATLConfocalSettingDefinition SystemSerialNumber="8100" IsInverseMicroscopeModel="1"
            ObjectiveName="HC PL APO 63x/1.40 OIL" NumericalAperture="1.4" ObjectiveNumber="11506350"
            Magnification="63" Immersion="OIL" RefractionIndex="1.518"/>
        </Attachment></Image>"#;
        let doc = Document::parse(xml).expect("parse");
        let hw = locate_hardware_settings(doc.root_element()).expect("hardware");

        let microscope = extract_microscope(doc.root_element(), &hw);
        assert_eq!(microscope.model, "TCS SP8");
        assert_eq!(microscope.serial_number, "8100");
        assert_eq!(microscope.microscope_type, MicroscopeType::Inverted);

        let objective = extract_objective(&hw).expect("objective");
        assert_eq!(objective.numerical_aperture, 1.4);
        assert_eq!(objective.magnification, 63.0);
        assert_eq!(objective.immersion, "OIL");
        assert_eq!(objective.refractive_index, 1.518);
        assert_eq!(objective.serial_number, "11506350");
    }

    #[test]
    fn new_layout_without_flag_is_upright() {
        let xml = r#"<Image><Attachment Name="HardwareSetting" DataSourceTypeName="Confocal">
          <ATLConfocalSettingDefinition SystemTypeName="TCS SP5"/></Attachment></Image>"#;
        let doc = Document::parse(xml).expect("parse");
        let hw = locate_hardware_settings(doc.root_element()).expect("hardware");
        let microscope = extract_microscope(doc.root_element(), &hw);
        assert_eq!(microscope.model, "TCS SP5");
        assert_eq!(microscope.microscope_type, MicroscopeType::Upright);
    }

    #[test]
    fn old_layout_reads_records_and_defaults_type() {
        let xml = r#"<Image>
          <Attachment Name="HardwareSettingList"><HardwareSetting>
            <ScannerSetting>
              <ScannerSettingRecord Identifier="dblZoom" Variant="2"/>
              <ScannerSettingRecord Identifier="SystemType" Variant="TCS SP2"/>
            </ScannerSetting>
            <FilterSetting>
              <FilterSettingRecord Description="SystemSerialNumber" Variant="5100"/>
            </FilterSetting>
          </HardwareSetting></Attachment>
        </Image>"#;
        let doc = Document::parse(xml).expect("parse");
        let hw = locate_hardware_settings(doc.root_element()).expect("hardware");
        let microscope = extract_microscope(doc.root_element(), &hw);
        assert_eq!(microscope.model, "TCS SP2");
        assert_eq!(microscope.serial_number, "5100");
        assert_eq!(microscope.microscope_type, MicroscopeType::Other);
        assert!(extract_objective(&hw).is_none());
    }
}
