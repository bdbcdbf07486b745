//! Extraction of acquisition records from LMS image XML.
//!
//! The pipeline runs in layers: navigation primitives ([`nav`]), the
//! hardware-settings locator, independent per-entity extractors and finally
//! the confocal reconciliation. [`extract_acquisition`] drives all of them
//! for one image node; [`extract_document`] does so for every image node of
//! a parsed document.
//!
//! Extraction never mutates the tree and keeps no state between calls, so
//! distinct images can be processed from several threads at once.

pub mod camera;
pub mod channel;
pub mod confocal;
pub mod detector;
pub mod dimension;
pub mod filter;
pub mod hardware;
pub mod laser;
pub mod metadata;
pub mod microscope;
pub mod nav;
pub mod position;
pub mod roi;
pub mod timestamp;

use std::fs;
use std::path::{Path, PathBuf};

use roxmltree::{Document, Node};

use crate::config::ExtractOptions;
use crate::error::LmsError;
use crate::model::{
    Acquisition, CameraAcquisitionSettings, Channel, ChannelAssignment, ConfocalAcquisitionSettings,
    DataSourceType,
};

pub use hardware::{locate_hardware_settings, HardwareSettings};
pub use timestamp::{FileTimeTicks, TickConverter};

const IMAGE_DESCRIPTION: &str = "ImageDescription";

/// Read an LMS XML file and extract every image it contains.
pub fn extract_file(path: &Path, options: &ExtractOptions) -> Result<Vec<Acquisition>, LmsError> {
    let xml = fs::read_to_string(path).map_err(LmsError::Io)?;
    extract_document(&xml, path, options)
}

/// Extract every image of an XML string; `path` only labels errors.
pub fn extract_document(
    xml: &str,
    path: &Path,
    options: &ExtractOptions,
) -> Result<Vec<Acquisition>, LmsError> {
    let document = Document::parse(xml).map_err(|source| LmsError::XmlParse {
        path: path.to_path_buf(),
        message: source.to_string(),
    })?;

    let images = find_image_nodes(document.root_element());
    if images.is_empty() {
        log::warn!("{} contains no image node", path.display());
        return Err(LmsError::MissingElement {
            element: "Image".to_string(),
            context: path.display().to_string(),
        });
    }

    images
        .into_iter()
        .map(|image| extract_acquisition(image, options))
        .collect()
}

/// Extract from bytes (must be valid UTF-8).
pub fn extract_slice(bytes: &[u8], options: &ExtractOptions) -> Result<Vec<Acquisition>, LmsError> {
    let xml = std::str::from_utf8(bytes).map_err(|source| LmsError::XmlParse {
        path: PathBuf::from("<bytes>"),
        message: format!("input is not valid UTF-8: {source}"),
    })?;
    extract_document(xml, Path::new("<bytes>"), options)
}

/// Image nodes below `root`: the root itself when it has an
/// `ImageDescription` child, otherwise every `Image` element that has one.
pub fn find_image_nodes<'a, 'input>(root: Node<'a, 'input>) -> Vec<Node<'a, 'input>> {
    if nav::first_child_named(root, IMAGE_DESCRIPTION).is_some() {
        return vec![root];
    }

    root.descendants()
        .filter(|node| {
            node.is_element()
                && node.tag_name().name() == "Image"
                && nav::first_child_named(*node, IMAGE_DESCRIPTION).is_some()
        })
        .collect()
}

/// Name of an image: the `Name` of the closest enclosing `Element`, or the
/// image node's own `Name`.
pub fn image_name(image: Node<'_, '_>) -> String {
    image
        .ancestors()
        .skip(1)
        .find(|node| node.is_element() && node.tag_name().name() == "Element")
        .map(|element| nav::attribute(element, "Name"))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| nav::attribute(image, "Name"))
        .to_string()
}

/// Runs the full pipeline on one image node with [`FileTimeTicks`].
pub fn extract_acquisition(image: Node<'_, '_>, options: &ExtractOptions) -> Result<Acquisition, LmsError> {
    extract_acquisition_with(image, options, &FileTimeTicks)
}

/// Runs the full pipeline on one image node.
///
/// The only failure is a node without an `ImageDescription` child; every
/// other absent or malformed piece of data resolves to a default.
pub fn extract_acquisition_with(
    image: Node<'_, '_>,
    options: &ExtractOptions,
    ticks: &dyn TickConverter,
) -> Result<Acquisition, LmsError> {
    let name = image_name(image);
    let description_node =
        nav::first_child_named(image, IMAGE_DESCRIPTION).ok_or_else(|| LmsError::MissingElement {
            element: IMAGE_DESCRIPTION.to_string(),
            context: format!("image '{name}'"),
        })?;
    log::debug!("extracting image '{}'", name);

    let channels = channel::extract_channels(description_node);
    let dimensions = dimension::extract_dimensions(description_node, options.old_physical_size);
    let geometry = dimension::compute_geometry(&dimensions, &channels);
    let plane_count = options
        .image_count
        .unwrap_or_else(|| usize::try_from(geometry.image_count).unwrap_or(usize::MAX));

    let user_comments = metadata::extract_user_comments(image);
    let hardware = hardware::locate_hardware_settings(image);

    let (confocal, camera) = match hardware.as_ref().and_then(|hw| hw.data_source.map(|source| (hw, source))) {
        Some((hw, DataSourceType::Confocal)) => (confocal::extract_confocal_settings(hw), None),
        Some((hw, DataSourceType::Camera)) => (None, camera::extract_camera_settings(hw)),
        None => (None, None),
    };

    let main_setting = hardware.as_ref().and_then(|hw| hw.main);
    let channel_assignments = assign_channels(&channels, confocal.as_ref(), camera.as_ref());

    Ok(Acquisition {
        description: user_comments.first().cloned(),
        user_comments,
        timestamps: timestamp::extract_timestamps(image, plane_count, ticks),
        hardware: hardware.as_ref().map(HardwareSettings::summary),
        microscope: hardware
            .as_ref()
            .map(|hw| microscope::extract_microscope(image, hw)),
        objective: hardware.as_ref().and_then(microscope::extract_objective),
        positions: position::extract_positions(image, main_setting),
        rois: roi::extract_annotation_rois(image, geometry.physical_size_x, geometry.physical_size_y),
        single_rois: roi::extract_single_rois(image, geometry.physical_size_x, geometry.physical_size_y),
        original_metadata: if options.original_metadata {
            metadata::flatten_original_metadata(image)
        } else {
            Default::default()
        },
        name,
        dimensions,
        geometry,
        channels,
        confocal,
        camera,
        channel_assignments,
    })
}

/// Joins the channel list with the hardware settings by position.
///
/// Channel `i` takes the channel name of the `i`-th confocal channel setting
/// and the dye of the `i`-th sorted filter; for camera data the `i`-th
/// widefield channel info supplies the name and exposure time.
pub fn assign_channels(
    channels: &[Channel],
    confocal: Option<&ConfocalAcquisitionSettings>,
    camera: Option<&CameraAcquisitionSettings>,
) -> Vec<ChannelAssignment> {
    (0..channels.len())
        .map(|index| {
            let mut assignment = ChannelAssignment::default();

            if let Some(confocal) = confocal {
                if let Some(setting) = confocal.channel_settings.get(index) {
                    assignment.name = setting.detector_setting.channel_name.clone();
                    assignment.channel_setting = Some(index);
                }
                if let Some(filter) = confocal.filters.get(index) {
                    assignment.filter = Some(index);
                    assignment.dye = filter.dye.clone();
                }
            }

            if let Some(info) = camera.and_then(|camera| camera.channels.get(index)) {
                assignment.name = info.name.clone();
                assignment.exposure_time = Some(info.exposure_time);
            }

            assignment
        })
        .collect()
}
