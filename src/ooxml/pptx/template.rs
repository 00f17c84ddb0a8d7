//! Presentation template module.
//!
//! Provides the members of a minimal valid presentation: one slide master
//! with four layouts (Title Slide, Title and Content, Title Only, Blank), a
//! theme, and no slides. `Presentation::new()` starts from these.

use std::collections::HashMap;

/// Creates an empty presentation with no slides.
pub fn default_presentation_xml() -> &'static str {
    include_str!("../../../resources/presentation.xml")
}

/// The slide master, with title, body, date, footer and slide number
/// placeholders.
pub fn default_slide_master_xml() -> &'static str {
    include_str!("../../../resources/slideMasters/slideMaster1.xml")
}

/// Slide layout 1 XML (Title Slide)
pub fn slide_layout_1_xml() -> &'static str {
    include_str!("../../../resources/slideLayouts/slideLayout1.xml")
}

/// Slide layout 2 XML (Title and Content)
pub fn slide_layout_2_xml() -> &'static str {
    include_str!("../../../resources/slideLayouts/slideLayout2.xml")
}

/// Slide layout 3 XML (Title Only)
pub fn slide_layout_3_xml() -> &'static str {
    include_str!("../../../resources/slideLayouts/slideLayout3.xml")
}

/// Slide layout 4 XML (Blank)
pub fn slide_layout_4_xml() -> &'static str {
    include_str!("../../../resources/slideLayouts/slideLayout4.xml")
}

/// Get all slide layout XMLs, in master order.
pub fn all_slide_layouts() -> [&'static str; 4] {
    [
        slide_layout_1_xml(),
        slide_layout_2_xml(),
        slide_layout_3_xml(),
        slide_layout_4_xml(),
    ]
}

/// The theme shared by the master and the presentation.
pub fn default_theme_xml() -> &'static str {
    include_str!("../../../resources/theme/theme1.xml")
}

/// The member map (Zip member name to bytes) of the default presentation.
pub fn default_members() -> HashMap<String, Vec<u8>> {
    let mut members = HashMap::with_capacity(16);
    let mut add = |name: &str, xml: &str| {
        members.insert(name.to_string(), xml.as_bytes().to_vec());
    };

    add(
        "[Content_Types].xml",
        include_str!("../../../resources/content_types.xml"),
    );
    add("_rels/.rels", include_str!("../../../resources/rels.xml"));
    add("ppt/presentation.xml", default_presentation_xml());
    add(
        "ppt/_rels/presentation.xml.rels",
        include_str!("../../../resources/presentation.xml.rels"),
    );
    add("ppt/slideMasters/slideMaster1.xml", default_slide_master_xml());
    add(
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        include_str!("../../../resources/slideMasters/slideMaster1.xml.rels"),
    );
    add("ppt/theme/theme1.xml", default_theme_xml());

    let layout_rels = include_str!("../../../resources/slideLayouts/slideLayout.xml.rels");
    for (i, xml) in all_slide_layouts().into_iter().enumerate() {
        add(&format!("ppt/slideLayouts/slideLayout{}.xml", i + 1), xml);
        add(
            &format!("ppt/slideLayouts/_rels/slideLayout{}.xml.rels", i + 1),
            layout_rels,
        );
    }

    members
}
