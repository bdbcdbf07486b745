//! Regions of interest, in both document layouts.
//!
//! Translations are divided by the physical pixel size so they are expressed
//! in pixels. A pixel size of zero (no X/Y dimension) leaves values as stored.

use std::fmt::Display;

use roxmltree::Node;

use super::nav::{
    attribute, descendants_named, first_descendant_named, parse_double, try_parse_double, try_parse_int,
    try_parse_long,
};
use crate::model::{Roi, RoiSource, Vertex};

fn per_pixel(value: f64, pixel_size: f64) -> f64 {
    if pixel_size > 0.0 {
        value / pixel_size
    } else {
        value
    }
}

/// Unwraps an optional numeric field, logging and defaulting when malformed.
fn or_default<T: Default, E: Display>(parsed: Result<Option<T>, E>, field: &str, text: &str) -> T {
    match parsed {
        Ok(value) => value.unwrap_or_default(),
        Err(err) => {
            log::debug!("ignoring malformed ROI {} '{}': {}", field, text, err);
            T::default()
        }
    }
}

fn vertex(node: Node<'_, '_>, x_name: &str, y_name: &str) -> Option<Vertex> {
    let x = try_parse_double(attribute(node, x_name))?;
    let y = try_parse_double(attribute(node, y_name))?;
    Some(Vertex { x, y })
}

/// Flat `Annotation` regions.
pub fn extract_annotation_rois(image: Node<'_, '_>, pixel_size_x: f64, pixel_size_y: f64) -> Vec<Roi> {
    let Some(annotations) = descendants_named(image, "Annotation") else {
        return Vec::new();
    };

    annotations
        .into_iter()
        .map(|node| {
            let type_text = attribute(node, "type");
            let color_text = attribute(node, "color");
            let width_text = attribute(node, "linewidth");

            Roi {
                source: RoiSource::Annotation,
                roi_type: or_default(try_parse_int(type_text), "type", type_text),
                color: or_default(try_parse_long(color_text), "color", color_text),
                name: attribute(node, "name").to_string(),
                font_name: attribute(node, "fontName").to_string(),
                font_size: attribute(node, "fontSize").to_string(),
                line_width: or_default(try_parse_int(width_text), "linewidth", width_text),
                trans_x: per_pixel(parse_double(attribute(node, "transTransX")), pixel_size_x),
                trans_y: per_pixel(parse_double(attribute(node, "transTransY")), pixel_size_y),
                scale_x: per_pixel(parse_double(attribute(node, "transScalingX")), pixel_size_x),
                scale_y: per_pixel(parse_double(attribute(node, "transScalingY")), pixel_size_y),
                rotation: parse_double(attribute(node, "transRotation")),
                vertices: descendants_named(node, "Vertex")
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(|v| vertex(v, "x", "y"))
                    .collect(),
                text: attribute(node, "text").to_string(),
            }
        })
        .collect()
}

/// Nested `ROI/Children/Element/ROISingle` regions.
///
/// The region name is the `Name` of the `ROISingle` grandparent. Vertices
/// and translation are divided by the pixel size; scaling is kept as stored.
pub fn extract_single_rois(image: Node<'_, '_>, pixel_size_x: f64, pixel_size_y: f64) -> Vec<Roi> {
    let Some(elements) = first_descendant_named(image, "ROI")
        .and_then(|roi| first_descendant_named(roi, "Children"))
        .and_then(|children| descendants_named(children, "Element"))
    else {
        return Vec::new();
    };

    elements
        .into_iter()
        .filter_map(|element| first_descendant_named(element, "ROISingle"))
        .map(|node| single_roi(node, pixel_size_x, pixel_size_y))
        .collect()
}

fn single_roi(node: Node<'_, '_>, pixel_size_x: f64, pixel_size_y: f64) -> Roi {
    let type_text = attribute(node, "RoiType");
    let color_text = attribute(node, "Color");
    let name = node
        .parent_element()
        .and_then(|parent| parent.parent_element())
        .map(|grandparent| attribute(grandparent, "Name").to_string())
        .unwrap_or_default();

    let vertices = descendants_named(node, "P")
        .unwrap_or_default()
        .into_iter()
        .filter_map(|p| vertex(p, "X", "Y"))
        .map(|v| Vertex {
            x: per_pixel(v.x, pixel_size_x),
            y: per_pixel(v.y, pixel_size_y),
        })
        .collect();

    let mut roi = Roi {
        source: RoiSource::Single,
        roi_type: or_default(try_parse_int(type_text), "type", type_text),
        color: or_default(try_parse_long(color_text), "color", color_text),
        name,
        vertices,
        ..Roi::default()
    };

    if let Some(transform) = first_descendant_named(node, "Transformation") {
        roi.rotation = parse_double(attribute(transform, "Rotation"));
        if let Some(scaling) = first_descendant_named(transform, "Scaling") {
            roi.scale_x = parse_double(attribute(scaling, "XScale"));
            roi.scale_y = parse_double(attribute(scaling, "YScale"));
        }
        if let Some(translation) = first_descendant_named(transform, "Translation") {
            roi.trans_x = per_pixel(parse_double(attribute(translation, "X")), pixel_size_x);
            roi.trans_y = per_pixel(parse_double(attribute(translation, "Y")), pixel_size_y);
        }
    }

    roi
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;

    #[test]
    fn annotation_fields_are_normalized_by_pixel_size() {
        let xml = r#"<Image><Annotations>
            <Annotation type="3" color="255" name="cell" fontName="Arial" fontSize="12" linewidth="2"
                transTransX="1e-5" transTransY="2e-5" transScalingX="4e-6" transScalingY="4e-6"
                transRotation="45" text="hello">
              <Vertices><Vertex x="1" y="2"/><Vertex x="3" y=""/><Vertex x="5" y="6"/></Vertices>
            </Annotation>
        </Annotations></Image>"#;
        let doc = Document::parse(xml).expect("parse");
        let rois = extract_annotation_rois(doc.root_element(), 1e-6, 2e-6);

        assert_eq!(rois.len(), 1);
        let roi = &rois[0];
        assert_eq!(roi.roi_type, 3);
        assert_eq!(roi.color, 255);
        assert_eq!(roi.line_width, 2);
        assert!((roi.trans_x - 10.0).abs() < 1e-9);
        assert!((roi.trans_y - 10.0).abs() < 1e-9);
        assert!((roi.scale_x - 4.0).abs() < 1e-9);
        assert!((roi.scale_y - 2.0).abs() < 1e-9);
        assert_eq!(roi.rotation, 45.0);
        assert_eq!(roi.vertices, vec![Vertex { x: 1.0, y: 2.0 }, Vertex { x: 5.0, y: 6.0 }]);
        assert_eq!(roi.text, "hello");
    }

    #[test]
    fn malformed_integers_default_without_dropping_the_roi() {
        let xml = r#"<Image><Annotation type="rect" linewidth="thick" color="x" name="kept"/><Annotation name="second"/></Image>"#;
        let doc = Document::parse(xml).expect("parse");
        let rois = extract_annotation_rois(doc.root_element(), 1.0, 1.0);
        assert_eq!(rois.len(), 2);
        assert_eq!(rois[0].name, "kept");
        assert_eq!((rois[0].roi_type, rois[0].line_width, rois[0].color), (0, 0, 0));
    }

    #[test]
    fn single_rois_take_name_from_grandparent() {
        let xml = r#"<Image><ROI><Children>
            <Element Name="Region 1"><Data>
              <ROISingle RoiType="5" Color="16711680">
                <Vertices><P X="2e-6" Y="4e-6"/><P X="6e-6" Y="8e-6"/></Vertices>
                <Transformation Rotation="90">
                  <Scaling XScale="1.5" YScale="2"/>
                  <Translation X="1e-5" Y="2e-5"/>
                </Transformation>
              </ROISingle>
            </Data></Element>
        </Children></ROI></Image>"#;
        let doc = Document::parse(xml).expect("parse");
        let rois = extract_single_rois(doc.root_element(), 2e-6, 2e-6);

        assert_eq!(rois.len(), 1);
        let roi = &rois[0];
        assert_eq!(roi.source, RoiSource::Single);
        assert_eq!(roi.name, "Region 1");
        assert_eq!(roi.roi_type, 5);
        assert_eq!(roi.color, 16711680);
        assert_eq!(roi.rotation, 90.0);
        assert_eq!((roi.scale_x, roi.scale_y), (1.5, 2.0));
        assert!((roi.trans_x - 5.0).abs() < 1e-9);
        assert!((roi.trans_y - 10.0).abs() < 1e-9);
        assert!((roi.vertices[1].x - 3.0).abs() < 1e-9);
        assert!((roi.vertices[1].y - 4.0).abs() < 1e-9);
    }

    #[test]
    fn zero_pixel_size_keeps_raw_values() {
        let xml = r#"<Image><Annotation transTransX="7"/></Image>"#;
        let doc = Document::parse(xml).expect("parse");
        let rois = extract_annotation_rois(doc.root_element(), 0.0, 0.0);
        assert_eq!(rois[0].trans_x, 7.0);
        assert!(extract_single_rois(doc.root_element(), 0.0, 0.0).is_empty());
    }
}
