use roxmltree::Node;

use super::nav::{attribute, descendants_named, first_with_attribute, parse_double, parse_flag};
use crate::model::{FieldPosition, FieldPositions};

/// Reads tile or stage positions and applies the scan orientation.
///
/// Tiles of a `TileScanInfo` attachment take precedence; otherwise the main
/// setting's `StagePosX`/`StagePosY` give a single position. Orientation flags
/// come from the main setting. `swap_xy` is read from `FlipY`, matching how
/// existing LMS readers report it.
pub fn extract_positions(
    image: Node<'_, '_>,
    main_setting: Option<Node<'_, '_>>,
) -> Option<FieldPositions> {
    let attachments = descendants_named(image, "Attachment").unwrap_or_default();
    let tile_info = first_with_attribute(attachments.iter().copied(), "Name", "TileScanInfo");

    if tile_info.is_none() && main_setting.is_none() {
        return None;
    }

    let flag = |name: &str| main_setting.map(|main| parse_flag(attribute(main, name))).unwrap_or(false);
    let flip_x = flag("FlipX");
    let flip_y = flag("FlipY");
    let swap_xy = flag("FlipY");

    let raw: Vec<FieldPosition> = match (tile_info, main_setting) {
        (Some(info), _) => descendants_named(info, "Tile")
            .unwrap_or_default()
            .into_iter()
            .map(|tile| {
                FieldPosition::new(
                    parse_double(attribute(tile, "PosX")),
                    parse_double(attribute(tile, "PosY")),
                )
            })
            .collect(),
        (None, Some(main)) => {
            let x = attribute(main, "StagePosX");
            let y = attribute(main, "StagePosY");
            if x.trim().is_empty() && y.trim().is_empty() {
                Vec::new()
            } else {
                vec![FieldPosition::new(parse_double(x), parse_double(y))]
            }
        }
        (None, None) => Vec::new(),
    };

    Some(FieldPositions {
        positions: raw
            .into_iter()
            .map(|pos| pos.normalized(flip_x, flip_y, swap_xy))
            .collect(),
        from_tiles: tile_info.is_some(),
        flip_x,
        flip_y,
        swap_xy,
    })
}
