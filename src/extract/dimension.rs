//! `DimensionDescription` extraction and core geometry.

use roxmltree::Node;

use super::nav::{attribute, child_elements, first_child_named, parse_count, parse_double, parse_int};
use crate::model::{Channel, Dimension, DimensionKey, ImageGeometry};

/// Reads every `Dimensions/DimensionDescription` below the image description.
pub fn extract_dimensions(image_description: Node<'_, '_>, old_physical_size: bool) -> Vec<Dimension> {
    let Some(dimensions) = first_child_named(image_description, "Dimensions") else {
        return Vec::new();
    };

    child_elements(dimensions)
        .filter(|node| node.tag_name().name() == "DimensionDescription")
        .map(|node| {
            Dimension::new(
                parse_int(attribute(node, "DimID")),
                parse_count(attribute(node, "NumberOfElements")),
                parse_count(attribute(node, "BytesInc")),
                parse_double(attribute(node, "Length")),
                attribute(node, "Unit"),
                parse_double(attribute(node, "Origin")),
                old_physical_size,
            )
        })
        .collect()
}

/// Derives sizes, RGB layout and plane count from dimensions and channels.
///
/// Sizes of dimensions without a semantic key ("extras") are folded into Z
/// when Z is 1 and into T otherwise. Every size defaults to 1.
pub fn compute_geometry(dimensions: &[Dimension], channels: &[Channel]) -> ImageGeometry {
    let find = |key: DimensionKey| dimensions.iter().find(|dim| dim.key == Some(key));
    let size_of = |key: DimensionKey| find(key).map(|dim| dim.size).unwrap_or(0);

    let extras: u64 = dimensions
        .iter()
        .filter(|dim| dim.key.is_none())
        .fold(1u64, |acc, dim| acc.saturating_mul(dim.size));

    let mut size_z = size_of(DimensionKey::Z).max(1);
    let mut size_t = size_of(DimensionKey::T).max(1);
    if extras > 1 {
        if size_z == 1 {
            size_z = extras;
        } else {
            size_t = size_t.saturating_mul(extras);
        }
    }

    let x_bytes_inc = find(DimensionKey::X).map(|dim| dim.bytes_inc).unwrap_or(0);
    let rgb = x_bytes_inc > 0 && x_bytes_inc % 3 == 0;
    let bytes_per_sample = match (rgb, x_bytes_inc) {
        (true, inc) => inc / 3,
        (false, 0) => channels.first().map(|c| c.bytes_inc).unwrap_or(0),
        (false, inc) => inc,
    };

    let size_c = (channels.len() as u64).max(1);
    let planes_per_zt = if rgb { (size_c / 3).max(1) } else { size_c };

    ImageGeometry {
        size_x: size_of(DimensionKey::X).max(1),
        size_y: size_of(DimensionKey::Y).max(1),
        size_z,
        size_c,
        size_t,
        tile_count: size_of(DimensionKey::S).max(1),
        rgb,
        inverse_rgb: channels.len() >= 3 && channels[0].channel_tag == 3,
        bytes_per_sample,
        physical_size_x: find(DimensionKey::X).map(Dimension::step).unwrap_or(0.0),
        physical_size_y: find(DimensionKey::Y).map(Dimension::step).unwrap_or(0.0),
        z_step: find(DimensionKey::Z).map(Dimension::step).unwrap_or(0.0),
        image_count: size_z.saturating_mul(size_t).saturating_mul(planes_per_zt),
    }
}
