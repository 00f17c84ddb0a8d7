//! Placeholder properties (`p:nvPr/p:ph`) of a shape.

use crate::ooxml::oxml::Element;

/// Placeholder type (`p:ph@type`). An absent attribute means `obj`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlaceholderType {
    Title,
    CenterTitle,
    Subtitle,
    Body,
    Object,
    Chart,
    Table,
    ClipArt,
    Diagram,
    Media,
    Picture,
    SlideImage,
    Date,
    Footer,
    SlideNumber,
    Header,
    Other(String),
}

impl PlaceholderType {
    /// Parse a `p:ph@type` value.
    pub fn from_attr(value: &str) -> Self {
        match value {
            "title" => Self::Title,
            "ctrTitle" => Self::CenterTitle,
            "subTitle" => Self::Subtitle,
            "body" => Self::Body,
            "obj" => Self::Object,
            "chart" => Self::Chart,
            "tbl" => Self::Table,
            "clipArt" => Self::ClipArt,
            "dgm" => Self::Diagram,
            "media" => Self::Media,
            "pic" => Self::Picture,
            "sldImg" => Self::SlideImage,
            "dt" => Self::Date,
            "ftr" => Self::Footer,
            "sldNum" => Self::SlideNumber,
            "hdr" => Self::Header,
            other => Self::Other(other.to_string()),
        }
    }

    /// The `p:ph@type` value.
    pub fn as_attr(&self) -> &str {
        match self {
            Self::Title => "title",
            Self::CenterTitle => "ctrTitle",
            Self::Subtitle => "subTitle",
            Self::Body => "body",
            Self::Object => "obj",
            Self::Chart => "chart",
            Self::Table => "tbl",
            Self::ClipArt => "clipArt",
            Self::Diagram => "dgm",
            Self::Media => "media",
            Self::Picture => "pic",
            Self::SlideImage => "sldImg",
            Self::Date => "dt",
            Self::Footer => "ftr",
            Self::SlideNumber => "sldNum",
            Self::Header => "hdr",
            Self::Other(value) => value,
        }
    }

    /// Name stem given to a shape cloned from a placeholder of this type.
    pub fn base_name(&self) -> &str {
        match self {
            Self::Title | Self::CenterTitle => "Title",
            Self::Subtitle => "Subtitle",
            Self::Body => "Text Placeholder",
            Self::Object => "Content Placeholder",
            Self::Chart => "Chart Placeholder",
            Self::Table => "Table Placeholder",
            Self::ClipArt => "ClipArt Placeholder",
            Self::Diagram => "SmartArt Placeholder",
            Self::Media => "Media Placeholder",
            Self::Picture => "Picture Placeholder",
            Self::SlideImage => "Slide Image Placeholder",
            Self::Date => "Date Placeholder",
            Self::Footer => "Footer Placeholder",
            Self::SlideNumber => "Slide Number Placeholder",
            Self::Header => "Header Placeholder",
            Self::Other(_) => "Placeholder",
        }
    }

    /// Date, footer and slide number placeholders stay on the layout.
    pub fn is_inherited_only(&self) -> bool {
        matches!(self, Self::Date | Self::Footer | Self::SlideNumber)
    }

    /// Placeholders that hold text get a `p:txBody` when cloned.
    pub fn has_text_frame(&self) -> bool {
        matches!(
            self,
            Self::Title | Self::CenterTitle | Self::Subtitle | Self::Body | Self::Object
        )
    }
}

/// Placeholder orientation (`p:ph@orient`), horizontal by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

impl Orientation {
    fn from_attr(value: &str) -> Self {
        match value {
            "vert" => Self::Vertical,
            _ => Self::Horizontal,
        }
    }

    fn as_attr(&self) -> &'static str {
        match self {
            Self::Horizontal => "horz",
            Self::Vertical => "vert",
        }
    }
}

/// Placeholder size (`p:ph@sz`), full by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlaceholderSize {
    #[default]
    Full,
    Half,
    Quarter,
}

impl PlaceholderSize {
    fn from_attr(value: &str) -> Self {
        match value {
            "half" => Self::Half,
            "quarter" => Self::Quarter,
            _ => Self::Full,
        }
    }

    fn as_attr(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Half => "half",
            Self::Quarter => "quarter",
        }
    }
}

/// The placeholder properties of a shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderFormat {
    pub ph_type: PlaceholderType,
    pub orient: Orientation,
    pub sz: PlaceholderSize,
    pub idx: u32,
}

impl PlaceholderFormat {
    /// Read the attributes of a `p:ph` element, applying schema defaults.
    pub fn from_ph(ph: &Element) -> Self {
        Self {
            ph_type: ph
                .attr("type")
                .map_or(PlaceholderType::Object, PlaceholderType::from_attr),
            orient: ph.attr("orient").map_or_else(Orientation::default, Orientation::from_attr),
            sz: ph.attr("sz").map_or_else(PlaceholderSize::default, PlaceholderSize::from_attr),
            idx: ph
                .attr("idx")
                .and_then(|v| atoi_simd::parse::<u32>(v.as_bytes()).ok())
                .unwrap_or(0),
        }
    }

    /// Build a `p:ph` element carrying only the non-default attributes.
    pub fn to_ph(&self) -> Element {
        let mut ph = Element::new("p:ph");
        if self.ph_type != PlaceholderType::Object {
            ph.set_attr("type", self.ph_type.as_attr());
        }
        if self.orient != Orientation::Horizontal {
            ph.set_attr("orient", self.orient.as_attr());
        }
        if self.sz != PlaceholderSize::Full {
            ph.set_attr("sz", self.sz.as_attr());
        }
        if self.idx != 0 {
            let mut buf = itoa::Buffer::new();
            ph.set_attr("idx", buf.format(self.idx));
        }
        ph
    }

    /// Name for a cloned shape with id `shape_id`, e.g. `Title 1` or
    /// `Vertical Text Placeholder 2`.
    pub fn shape_name(&self, shape_id: u32) -> String {
        let prefix = match self.orient {
            Orientation::Vertical => "Vertical ",
            Orientation::Horizontal => "",
        };
        format!(
            "{}{} {}",
            prefix,
            self.ph_type.base_name(),
            shape_id.saturating_sub(1)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_attributes_absent() {
        let ph = Element::new("p:ph");
        let format = PlaceholderFormat::from_ph(&ph);
        assert_eq!(format.ph_type, PlaceholderType::Object);
        assert_eq!(format.orient, Orientation::Horizontal);
        assert_eq!(format.sz, PlaceholderSize::Full);
        assert_eq!(format.idx, 0);
        assert_eq!(format.to_ph().to_xml(), "<p:ph/>");
    }

    #[test]
    fn test_non_default_attributes_survive() {
        let ph = Element::new("p:ph")
            .with_attr("type", "body")
            .with_attr("orient", "vert")
            .with_attr("sz", "quarter")
            .with_attr("idx", "13");
        let format = PlaceholderFormat::from_ph(&ph);
        assert_eq!(format.idx, 13);
        assert_eq!(
            format.to_ph().to_xml(),
            r#"<p:ph type="body" orient="vert" sz="quarter" idx="13"/>"#
        );
        assert_eq!(format.shape_name(3), "Vertical Text Placeholder 2");
    }

    #[test]
    fn test_explicit_default_values_are_dropped() {
        let ph = Element::new("p:ph")
            .with_attr("type", "obj")
            .with_attr("orient", "horz")
            .with_attr("sz", "full")
            .with_attr("idx", "0");
        assert_eq!(PlaceholderFormat::from_ph(&ph).to_ph().to_xml(), "<p:ph/>");
    }

    #[test]
    fn test_type_classification() {
        assert!(PlaceholderType::from_attr("dt").is_inherited_only());
        assert!(PlaceholderType::from_attr("sldNum").is_inherited_only());
        assert!(!PlaceholderType::Title.is_inherited_only());
        assert!(PlaceholderType::from_attr("ctrTitle").has_text_frame());
        assert!(!PlaceholderType::Picture.has_text_frame());
        assert_eq!(PlaceholderType::from_attr("custom").as_attr(), "custom");
        assert_eq!(PlaceholderType::CenterTitle.base_name(), "Title");
    }
}
