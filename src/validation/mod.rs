//! Consistency checks over extracted acquisitions.
//!
//! Extraction itself never fails on partial metadata. These checks surface
//! what it had to default or could not reconcile:
//! - dimension strides that do not tile the image buffer
//! - missing X/Y dimensions and unclassifiable hardware settings
//! - confocal channel settings without a laser line or instrument detector
//! - timestamp lists shorter than the plane count

mod report;

pub use report::{IssueCode, IssueContext, Severity, ValidationIssue, ValidationReport};

use crate::model::{Acquisition, Dimension, DimensionKey};

/// Validates every acquisition, numbering images by position.
pub fn validate_acquisitions(acquisitions: &[Acquisition]) -> ValidationReport {
    let mut report = ValidationReport::new();
    for (image, acquisition) in acquisitions.iter().enumerate() {
        report.merge(validate_acquisition(acquisition, image));
    }
    report
}

/// Validates one acquisition stored under index `image`.
pub fn validate_acquisition(acquisition: &Acquisition, image: usize) -> ValidationReport {
    let mut report = ValidationReport::new();

    validate_dimensions(acquisition, image, &mut report);
    validate_hardware(acquisition, image, &mut report);
    validate_channel_settings(acquisition, image, &mut report);
    validate_timestamps(acquisition, image, &mut report);

    report
}

/// Strides, ordered ascending, must each tile the span of the dimension below.
fn validate_dimensions(acquisition: &Acquisition, image: usize, report: &mut ValidationReport) {
    for key in [DimensionKey::X, DimensionKey::Y] {
        if acquisition.dimension(key).is_none() {
            report.add(ValidationIssue::error(
                IssueCode::MissingDimension,
                format!("No {:?} dimension (DimID {})", key, key.id()),
                IssueContext::Image { image },
            ));
        }
    }

    let mut strided: Vec<&Dimension> = acquisition
        .dimensions
        .iter()
        .filter(|dim| dim.size > 0 && dim.bytes_inc > 0)
        .collect();
    strided.sort_by_key(|dim| dim.bytes_inc);

    for pair in strided.windows(2) {
        let (inner, outer) = (pair[0], pair[1]);
        let span = inner.byte_span();
        let context = IssueContext::Dimension {
            image,
            dim_id: outer.id,
        };

        if outer.bytes_inc < span {
            report.add(ValidationIssue::error(
                IssueCode::DimensionStrideMismatch,
                format!(
                    "Stride {} overlaps the {} bytes spanned by dimension {}",
                    outer.bytes_inc, span, inner.id
                ),
                context,
            ));
        } else if outer.bytes_inc % span != 0 {
            report.add(ValidationIssue::warning(
                IssueCode::DimensionStrideMismatch,
                format!(
                    "Stride {} is not a multiple of the {} bytes spanned by dimension {}",
                    outer.bytes_inc, span, inner.id
                ),
                context,
            ));
        }
    }
}

fn validate_hardware(acquisition: &Acquisition, image: usize, report: &mut ValidationReport) {
    let message = match &acquisition.hardware {
        None => "No hardware settings attachment",
        Some(summary) if summary.data_source.is_none() => {
            "Hardware settings carry neither confocal nor camera definitions"
        }
        Some(_) => return,
    };
    report.add(ValidationIssue::warning(
        IssueCode::UnknownDataSource,
        message,
        IssueContext::Image { image },
    ));
}

fn validate_channel_settings(acquisition: &Acquisition, image: usize, report: &mut ValidationReport) {
    let Some(confocal) = &acquisition.confocal else {
        return;
    };

    if confocal.channel_settings.len() != acquisition.channels.len() {
        report.add(ValidationIssue::warning(
            IssueCode::ChannelSettingCountMismatch,
            format!(
                "{} active detector(s) for {} channel(s)",
                confocal.channel_settings.len(),
                acquisition.channels.len()
            ),
            IssueContext::Image { image },
        ));
    }

    for (index, setting) in confocal.channel_settings.iter().enumerate() {
        let context = IssueContext::ChannelSetting { image, index };
        let detector = &setting.detector_setting;

        if setting.laser_setting.is_none() && !detector.transmitted_light_mode {
            report.add(ValidationIssue::warning(
                IssueCode::ChannelWithoutLaser,
                format!("Detector '{}' has no matching laser line", detector.name),
                context.clone(),
            ));
        }
        if setting.detector.is_none() {
            report.add(ValidationIssue::warning(
                IssueCode::DetectorNotInInstrument,
                format!("Detector '{}' is not listed by the instrument", detector.name),
                context,
            ));
        }
    }
}

fn validate_timestamps(acquisition: &Acquisition, image: usize, report: &mut ValidationReport) {
    let found = acquisition.timestamps.seconds.len() as u64;
    let planes = acquisition.geometry.image_count;
    if found > 0 && found < planes {
        report.add(ValidationIssue::warning(
            IssueCode::TimestampCountMismatch,
            format!("{} timestamp(s) for {} plane(s)", found, planes),
            IssueContext::Image { image },
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        ConfocalAcquisitionSettings, ConfocalChannelSetting, DataSourceType, Detector,
        DetectorSetting, HardwareSettingLayout, HardwareSummary, ImageGeometry, LaserSetting,
        Timestamps,
    };

    fn valid_acquisition() -> Acquisition {
        Acquisition {
            name: "Series001".into(),
            dimensions: vec![
                Dimension::new(1, 64, 1, 1.0, "m", 0.0, false),
                Dimension::new(2, 32, 64, 1.0, "m", 0.0, false),
                Dimension::new(3, 4, 2048, 1.0, "m", 0.0, false),
            ],
            geometry: ImageGeometry {
                image_count: 4,
                ..ImageGeometry::default()
            },
            hardware: Some(HardwareSummary {
                layout: HardwareSettingLayout::New,
                data_source: Some(DataSourceType::Confocal),
            }),
            ..Acquisition::default()
        }
    }

    fn codes(report: &ValidationReport) -> Vec<IssueCode> {
        report.issues.iter().map(|i| i.code).collect()
    }

    #[test]
    fn test_valid_acquisition() {
        let report = validate_acquisition(&valid_acquisition(), 0);
        assert!(report.is_ok_strict(), "{}", report);
    }

    #[test]
    fn test_overlapping_stride_is_an_error() {
        let mut acq = valid_acquisition();
        acq.dimensions[1].bytes_inc = 32;
        let report = validate_acquisition(&acq, 0);
        assert_eq!(report.error_count(), 1);
        assert_eq!(codes(&report), vec![IssueCode::DimensionStrideMismatch]);
    }

    #[test]
    fn test_multi_channel_stride_is_accepted() {
        let mut acq = valid_acquisition();
        // Two interleaved channel planes between Y and Z.
        acq.dimensions[2].bytes_inc = 4096;
        assert!(validate_acquisition(&acq, 0).is_ok_strict());

        acq.dimensions[2].bytes_inc = 3000;
        let report = validate_acquisition(&acq, 0);
        assert_eq!(report.warning_count(), 1);
        assert!(report.is_ok());
    }

    #[test]
    fn test_missing_xy_dimensions() {
        let mut acq = valid_acquisition();
        acq.dimensions.clear();
        let report = validate_acquisition(&acq, 3);
        assert_eq!(report.error_count(), 2);
        assert!(report.issues.iter().all(|i| i.code == IssueCode::MissingDimension));
        assert!(report.to_string().contains("image 3"));
    }

    #[test]
    fn test_unknown_data_source() {
        let mut acq = valid_acquisition();
        acq.hardware = Some(HardwareSummary {
            layout: HardwareSettingLayout::Old,
            data_source: None,
        });
        assert_eq!(codes(&validate_acquisition(&acq, 0)), vec![IssueCode::UnknownDataSource]);

        acq.hardware = None;
        assert_eq!(codes(&validate_acquisition(&acq, 0)), vec![IssueCode::UnknownDataSource]);
    }

    #[test]
    fn test_unreconciled_channel_settings() {
        let mut acq = valid_acquisition();
        acq.confocal = Some(ConfocalAcquisitionSettings {
            channel_settings: vec![
                ConfocalChannelSetting {
                    detector_setting: DetectorSetting {
                        name: "HyD 1".into(),
                        ..DetectorSetting::default()
                    },
                    laser_setting: Some(LaserSetting::default()),
                    detector: Some(Detector::default()),
                    ..ConfocalChannelSetting::default()
                },
                ConfocalChannelSetting {
                    detector_setting: DetectorSetting {
                        name: "PMT Trans".into(),
                        transmitted_light_mode: true,
                        ..DetectorSetting::default()
                    },
                    ..ConfocalChannelSetting::default()
                },
            ],
            ..ConfocalAcquisitionSettings::default()
        });

        let report = validate_acquisition(&acq, 0);
        assert_eq!(
            codes(&report),
            vec![IssueCode::ChannelSettingCountMismatch, IssueCode::DetectorNotInInstrument]
        );
    }

    #[test]
    fn test_short_timestamp_list() {
        let mut acq = valid_acquisition();
        acq.timestamps = Timestamps {
            seconds: vec![1.0, 2.0],
            acquired_date: None,
        };
        let report = validate_acquisition(&acq, 0);
        assert_eq!(codes(&report), vec![IssueCode::TimestampCountMismatch]);
    }

    #[test]
    fn test_reports_merge_across_images() {
        let mut broken = valid_acquisition();
        broken.dimensions.clear();
        let report = validate_acquisitions(&[valid_acquisition(), broken]);
        assert_eq!(report.error_count(), 2);
        assert!(report
            .issues
            .iter()
            .all(|i| matches!(i.context, IssueContext::Image { image: 1 })));
    }
}
