//! Base shape types for PowerPoint presentations.

use crate::ooxml::oxml::Element;
use crate::ooxml::pptx::shapes::placeholder::PlaceholderFormat;

/// Shape type enumeration.
///
/// Indicates what kind of shape this is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeType {
    /// A text shape (p:sp)
    Shape,
    /// A picture shape (p:pic)
    Picture,
    /// A graphic frame containing a table or chart (p:graphicFrame)
    GraphicFrame,
    /// A group shape (p:grpSp)
    GroupShape,
    /// A connector shape (p:cxnSp)
    Connector,
    /// Content part or anything else found in a shape tree
    Unknown,
}

impl ShapeType {
    /// Classify a shape tree child by its local name.
    pub fn from_local_name(local: &str) -> Self {
        match local {
            "sp" => Self::Shape,
            "pic" => Self::Picture,
            "graphicFrame" => Self::GraphicFrame,
            "grpSp" => Self::GroupShape,
            "cxnSp" => Self::Connector,
            _ => Self::Unknown,
        }
    }
}

/// A shape in a slide's shape tree.
///
/// Owns the shape's element; edits are written back when the owning part is
/// serialized.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    element: Element,
    shape_type: ShapeType,
}

impl Shape {
    /// Wrap a shape tree child element.
    pub fn new(element: Element) -> Self {
        let shape_type = ShapeType::from_local_name(element.local_name());
        Self {
            element,
            shape_type,
        }
    }

    #[inline]
    pub fn shape_type(&self) -> &ShapeType {
        &self.shape_type
    }

    #[inline]
    pub fn element(&self) -> &Element {
        &self.element
    }

    /// The non-visual properties element (`p:nvSpPr`, `p:nvPicPr`, ...).
    fn nv_pr(&self) -> Option<&Element> {
        self.element
            .child_elements()
            .find(|e| e.local_name().starts_with("nv"))
    }

    fn c_nv_pr(&self) -> Option<&Element> {
        self.nv_pr()?.find("cNvPr")
    }

    /// Shape id (`cNvPr@id`), if present and numeric.
    pub fn shape_id(&self) -> Option<u32> {
        self.c_nv_pr()?
            .attr("id")
            .and_then(|id| atoi_simd::parse::<u32>(id.as_bytes()).ok())
    }

    /// Shape name (`cNvPr@name`), empty when absent.
    pub fn name(&self) -> &str {
        self.c_nv_pr().and_then(|c| c.attr("name")).unwrap_or("")
    }

    /// Check if this shape is a placeholder.
    pub fn is_placeholder(&self) -> bool {
        self.ph().is_some()
    }

    fn ph(&self) -> Option<&Element> {
        self.nv_pr()?.find("nvPr")?.find("ph")
    }

    /// Placeholder properties, `None` for ordinary shapes.
    pub fn placeholder_format(&self) -> Option<PlaceholderFormat> {
        self.ph().map(PlaceholderFormat::from_ph)
    }

    /// Concatenated text of the shape.
    pub fn text(&self) -> String {
        self.element.text()
    }

    /// Unwrap into the shape's element.
    pub fn into_element(self) -> Element {
        self.element
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::pptx::shapes::placeholder::PlaceholderType;

    #[test]
    fn test_placeholder_shape() {
        let xml = br#"<p:sp xmlns:p="p"><p:nvSpPr><p:cNvPr id="4" name="Title 3"/><p:cNvSpPr/><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr/></p:sp>"#;
        let shape = Shape::new(Element::parse(xml).unwrap());

        assert_eq!(shape.shape_type(), &ShapeType::Shape);
        assert_eq!(shape.shape_id(), Some(4));
        assert_eq!(shape.name(), "Title 3");
        assert!(shape.is_placeholder());
        assert_eq!(
            shape.placeholder_format().unwrap().ph_type,
            PlaceholderType::Title
        );
    }

    #[test]
    fn test_picture_without_placeholder() {
        let xml = br#"<p:pic xmlns:p="p"><p:nvPicPr><p:cNvPr id="7" name="Picture 6"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr></p:pic>"#;
        let shape = Shape::new(Element::parse(xml).unwrap());

        assert_eq!(shape.shape_type(), &ShapeType::Picture);
        assert_eq!(shape.shape_id(), Some(7));
        assert!(!shape.is_placeholder());
        assert!(shape.placeholder_format().is_none());
    }
}
