//! End-to-end extraction over the fixture files.

use std::path::Path;

use lmsmeta::config::ExtractOptions;
use lmsmeta::extract::{self, extract_file, find_image_nodes};
use lmsmeta::model::{DataSourceType, HardwareSettingLayout, MicroscopeType};
use lmsmeta::sink::{write_acquisition, KeyValueStore};
use lmsmeta::validation::validate_acquisitions;
use lmsmeta::LmsError;

fn fixture(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn confocal_file_reconciles_channels() {
    let acquisitions =
        extract_file(&fixture("confocal_sp8.xml"), &ExtractOptions::default()).expect("extract");
    assert_eq!(acquisitions.len(), 1);
    let acq = &acquisitions[0];

    assert_eq!(acq.name, "Series001");
    assert_eq!(acq.description.as_deref(), Some("fixed HeLa, anti-tubulin"));
    assert_eq!(
        acq.hardware.map(|h| (h.layout, h.data_source)),
        Some((HardwareSettingLayout::New, Some(DataSourceType::Confocal)))
    );

    let geometry = &acq.geometry;
    assert_eq!((geometry.size_x, geometry.size_y, geometry.size_z), (256, 256, 3));
    assert_eq!(geometry.size_c, 2);
    assert_eq!(geometry.image_count, 6);
    assert!(!geometry.rgb);
    assert!((geometry.physical_size_x - 1e-6).abs() < 1e-12);
    assert!((geometry.z_step - 1e-6).abs() < 1e-12);

    let confocal = acq.confocal.as_ref().expect("confocal settings");
    assert_eq!(confocal.zoom, 2.0);
    assert_eq!(confocal.channel_settings.len(), 2);

    let hyd = &confocal.channel_settings[0];
    assert_eq!(hyd.detector_setting.cut_in, Some(500.0));
    assert_eq!(hyd.laser_setting.as_ref().map(|l| l.wavelength), Some(488.0));
    assert_eq!(hyd.laser.as_ref().map(|l| l.name.as_str()), Some("Argon"));
    assert_eq!(hyd.detector.as_ref().map(|d| d.detector_type.as_str()), Some("HyD"));

    let trans = &confocal.channel_settings[1];
    assert!(trans.detector_setting.transmitted_light_mode);
    assert!(trans.laser_setting.is_none());

    assert_eq!(confocal.filters.len(), 2);
    assert_eq!(confocal.filters[0].dye.as_deref(), Some("Alexa 488"));
    assert_eq!(confocal.filters[1].cut_in, None);

    assert_eq!(acq.channel_assignments[0].name, "Alexa 488");
    assert_eq!(acq.channel_assignments[1].name, "Transmission Channel");

    let microscope = acq.microscope.as_ref().expect("microscope");
    assert_eq!(microscope.model, "TCS SP8");
    assert_eq!(microscope.microscope_type, MicroscopeType::Inverted);
    assert_eq!(acq.objective.as_ref().map(|o| o.magnification), Some(63.0));

    let positions = acq.positions.as_ref().expect("stage position");
    assert!(!positions.from_tiles);
    assert_eq!(positions.positions.len(), 1);
    assert_eq!(positions.positions[0].x, 0.0125);

    assert_eq!(acq.timestamps.seconds.len(), 6);
    assert_eq!(acq.timestamps.acquired_date.as_deref(), Some("2020-01-01T00:00:00"));
    assert_eq!(acq.timestamps.delta_t()[5], 2.5);

    assert_eq!(acq.rois.len(), 1);
    assert_eq!(acq.rois[0].vertices.len(), 3);
    assert!((acq.rois[0].trans_x - 10.0).abs() < 1e-9);

    assert_eq!(
        acq.original_metadata
            .get("ATLConfocalSettingDefinition|ScanSpeed")
            .map(String::as_str),
        Some("600")
    );
}

#[test]
fn camera_file_reads_widefield_channels_and_tiles() {
    let acquisitions =
        extract_file(&fixture("camera_thunder.xml"), &ExtractOptions::default()).expect("extract");
    let acq = &acquisitions[0];

    assert!(acq.confocal.is_none());
    let camera = acq.camera.as_ref().expect("camera settings");
    assert_eq!(camera.camera_name, "DFC9000 GTC");
    assert_eq!(camera.channels[1].filter_cube, "GFP");

    assert_eq!(acq.geometry.tile_count, 2);
    assert_eq!(acq.geometry.bytes_per_sample, 2);
    assert_eq!(acq.channel_assignments[0].exposure_time, Some(0.05));

    let positions = acq.positions.as_ref().expect("tile positions");
    assert!(positions.from_tiles);
    assert_eq!(positions.positions.len(), 2);
    assert_eq!(positions.positions[1].x, 0.011);
    assert!(acq.timestamps.seconds.is_empty());
}

#[test]
fn legacy_file_uses_master_definition() {
    let acquisitions =
        extract_file(&fixture("legacy_sp5.xml"), &ExtractOptions::default()).expect("extract");
    let acq = &acquisitions[0];

    assert_eq!(
        acq.hardware.map(|h| h.layout),
        Some(HardwareSettingLayout::Old)
    );
    let microscope = acq.microscope.as_ref().expect("microscope");
    assert_eq!(microscope.model, "TCS SP5");
    assert_eq!(microscope.serial_number, "5100000999");
    assert_eq!(microscope.microscope_type, MicroscopeType::Other);

    let confocal = acq.confocal.as_ref().expect("confocal settings");
    assert_eq!(confocal.zoom, 1.5);
    let setting = &confocal.channel_settings[0];
    assert_eq!(setting.laser.as_ref().map(|l| l.name.as_str()), Some("HeNe 633"));
    assert_eq!(acq.channel_assignments[0].dye.as_deref(), Some("Cy5"));

    assert_eq!(acq.geometry.size_t, 2);
    let delta_t = acq.timestamps.delta_t();
    assert_eq!(delta_t[0], 0.0);
    assert!((delta_t[1] - 10.0).abs() < 1e-3);
    assert_eq!(acq.timestamps.acquired_date.as_deref(), Some("2019-12-31T03:42:30"));
}

#[test]
fn old_physical_size_option_changes_step() {
    let options = ExtractOptions {
        old_physical_size: true,
        ..ExtractOptions::default()
    };
    let acquisitions = extract_file(&fixture("confocal_sp8.xml"), &options).expect("extract");
    let step = acquisitions[0].geometry.physical_size_x;
    assert!((step - 2.55e-4 / 256.0).abs() < 1e-15);
}

#[test]
fn fixtures_validate_cleanly() {
    for name in ["confocal_sp8.xml", "camera_thunder.xml", "legacy_sp5.xml"] {
        let acquisitions = extract_file(&fixture(name), &ExtractOptions::default()).expect("extract");
        let report = validate_acquisitions(&acquisitions);
        assert!(report.is_ok_strict(), "{}: {}", name, report);
    }
}

#[test]
fn inconsistent_fixture_reports_errors() {
    let acquisitions =
        extract_file(&fixture("inconsistent.xml"), &ExtractOptions::default()).expect("extract");
    let report = validate_acquisitions(&acquisitions);
    assert_eq!(report.error_count(), 2);
    assert_eq!(report.warning_count(), 1);
}

#[test]
fn store_receives_channel_facts() {
    let acquisitions =
        extract_file(&fixture("confocal_sp8.xml"), &ExtractOptions::default()).expect("extract");
    let mut store = KeyValueStore::new();
    write_acquisition(&mut store, 0, &acquisitions[0]);

    assert_eq!(store.get("Image[0].Channel[0].Name"), Some("Alexa 488"));
    assert_eq!(store.get("Image[0].Channel[0].Fluor"), Some("Alexa 488"));
    assert_eq!(store.get("Image[0].Channel[0].Color"), Some("(0, 255, 0, 255)"));
    assert_eq!(store.get("Image[0].Microscope.Type"), Some("Inverted"));
    assert_eq!(store.get("Image[0].Pixels.SizeZ"), Some("3"));
}

#[test]
fn missing_file_is_an_io_error() {
    let err = extract_file(&fixture("absent.xml"), &ExtractOptions::default()).unwrap_err();
    assert!(matches!(err, LmsError::Io(_)));
}

#[test]
fn images_extract_concurrently() {
    let xml = std::fs::read_to_string(fixture("confocal_sp8.xml")).expect("read fixture");
    let document = roxmltree::Document::parse(&xml).expect("parse");
    let images = find_image_nodes(document.root_element());
    let options = ExtractOptions::default();

    let sequential = extract::extract_acquisition(images[0], &options).expect("extract");

    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| extract::extract_acquisition(images[0], &options)))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("thread panicked"))
            .collect()
    });

    for result in results {
        assert_eq!(result.expect("extract"), sequential);
    }
}
