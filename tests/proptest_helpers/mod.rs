#![allow(dead_code)]

use lmsmeta::model::Filter;
use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// LUT names seen in real files plus arbitrary noise.
pub fn arb_lut_name() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Red".to_string()),
        Just("green".to_string()),
        Just("Blue".to_string()),
        Just("Cyan".to_string()),
        Just("Magenta".to_string()),
        Just("Yellow".to_string()),
        Just("Gray".to_string()),
        "[A-Za-z ]{0,12}",
    ]
}

pub fn arb_filter() -> impl Strategy<Value = Filter> {
    (0usize..4, 0usize..6, proptest::option::of(400.0f64..700.0)).prop_map(
        |(sequence_index, multiband_index, cut_in)| Filter {
            cut_in,
            cut_out: cut_in.map(|c| c + 50.0),
            dye: None,
            sequence_index,
            multiband_index,
        },
    )
}

/// An `ImageDescription` with the given sizes and tightly packed strides.
pub fn image_xml(sizes: &[(i32, u64)], channels: usize) -> String {
    let mut xml = String::from("<Image><ImageDescription><Channels>");
    for _ in 0..channels {
        xml.push_str(r#"<ChannelDescription ChannelTag="0" Resolution="8" LUTName="Gray" BytesInc="0"/>"#);
    }
    xml.push_str("</Channels><Dimensions>");

    let mut stride = 1u64;
    for (index, (id, size)) in sizes.iter().enumerate() {
        if index == 2 {
            stride *= channels.max(1) as u64;
        }
        xml.push_str(&format!(
            r#"<DimensionDescription DimID="{id}" NumberOfElements="{size}" BytesInc="{stride}" Length="1e-4" Unit="m"/>"#
        ));
        stride *= size;
    }
    xml.push_str("</Dimensions></ImageDescription></Image>");
    xml
}
