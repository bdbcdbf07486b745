use roxmltree::Node;

use super::nav::{attribute, child_elements, first_child_named, parse_count, parse_double, parse_int};
use crate::model::Channel;

/// Reads every `Channels/ChannelDescription` below the image description.
pub fn extract_channels(image_description: Node<'_, '_>) -> Vec<Channel> {
    let Some(channels) = first_child_named(image_description, "Channels") else {
        return Vec::new();
    };

    child_elements(channels)
        .filter(|node| node.tag_name().name() == "ChannelDescription")
        .map(|node| {
            Channel::new(
                parse_int(attribute(node, "ChannelTag")),
                parse_int(attribute(node, "Resolution")),
                parse_double(attribute(node, "Min")),
                parse_double(attribute(node, "Max")),
                attribute(node, "Unit"),
                attribute(node, "LUTName"),
                parse_count(attribute(node, "BytesInc")),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Rgba;
    use roxmltree::Document;

    #[test]
    fn reads_channels_in_document_order() {
        let xml = r#"<ImageDescription><Channels>
            <ChannelDescription ChannelTag="0" Resolution="12" Min="0" Max="4095" Unit="" LUTName="Green" BytesInc="0"/>
            <ChannelDescription ChannelTag="0" Resolution="12" Min="0" Max="4095" LUTName="Gradient(10,20,30)" BytesInc="2"/>
        </Channels></ImageDescription>"#;
        let doc = Document::parse(xml).expect("parse");
        let channels = extract_channels(doc.root_element());
        assert_eq!(channels.len(), 2);
        assert_eq!(channels[0].resolution, 12);
        assert_eq!(channels[0].max, 4095.0);
        assert_eq!(channels[0].lut_color, Rgba::opaque(0, 255, 0));
        // Priority matching is exact, so capitalized names rank as unknown.
        assert_eq!(channels[0].priority, 8);
        assert_eq!(channels[1].lut_color, Rgba::opaque(30, 20, 10));
        assert_eq!(channels[1].bytes_inc, 2);
    }
}
