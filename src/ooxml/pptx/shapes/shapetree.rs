//! The shape collection of a slide-like part (`p:cSld/p:spTree`).

use crate::ooxml::opc::part::PartId;
use crate::ooxml::oxml::Element;
use crate::ooxml::pptx::shapes::base::Shape;
use crate::ooxml::pptx::shapes::placeholder::PlaceholderFormat;

/// Children of `p:spTree` that describe the tree itself rather than a shape.
const TREE_PROPERTIES: [&str; 3] = ["nvGrpSpPr", "grpSpPr", "extLst"];

/// Ordered shapes of one slide, layout or master.
///
/// Shapes are moved out of the `p:spTree` element when the collection is
/// built and written back in order when the owning part is serialized.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeCollection {
    owner: PartId,
    tree_id: u32,
    shapes: Vec<Shape>,
}

impl ShapeCollection {
    /// Take the shapes out of `sp_tree`, leaving the group properties behind.
    pub fn from_sp_tree(sp_tree: &mut Element, owner: PartId) -> Self {
        let tree_id = sp_tree
            .find_path(&["nvGrpSpPr", "cNvPr"])
            .and_then(|c| c.attr("id"))
            .and_then(|id| atoi_simd::parse::<u32>(id.as_bytes()).ok())
            .unwrap_or(1);

        let shapes = sp_tree
            .drain_elements(|e| !TREE_PROPERTIES.contains(&e.local_name()))
            .into_iter()
            .map(Shape::new)
            .collect();

        Self {
            owner,
            tree_id,
            shapes,
        }
    }

    /// Part this collection belongs to.
    #[inline]
    pub fn owner(&self) -> PartId {
        self.owner
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Shape> {
        self.shapes.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.iter()
    }

    /// Placeholder shapes, in tree order.
    pub fn placeholders(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.iter().filter(|s| s.is_placeholder())
    }

    /// One more than the largest shape id in the tree.
    pub fn next_shape_id(&self) -> u32 {
        self.shapes
            .iter()
            .filter_map(Shape::shape_id)
            .fold(self.tree_id, u32::max)
            .saturating_add(1)
    }

    /// Add a placeholder shape for each placeholder on `layout_shapes`.
    ///
    /// Date, footer and slide number placeholders are skipped; those are
    /// rendered from the layout.
    pub fn clone_layout_placeholders(&mut self, layout_shapes: &ShapeCollection) {
        let formats: Vec<PlaceholderFormat> = layout_shapes
            .placeholders()
            .filter_map(Shape::placeholder_format)
            .filter(|format| !format.ph_type.is_inherited_only())
            .collect();

        for format in formats {
            let id = self.next_shape_id();
            let name = format.shape_name(id);
            tracing::trace!(id, name = %name, "cloning layout placeholder");
            self.shapes.push(Shape::new(new_placeholder_sp(id, &name, &format)));
        }
    }

    /// Write the shapes back into `sp_tree`, ahead of any `p:extLst`.
    pub fn write_into(&self, sp_tree: &mut Element) {
        let mut at = sp_tree
            .position("extLst")
            .unwrap_or_else(|| sp_tree.children().len());
        for shape in &self.shapes {
            sp_tree.insert(at, shape.element().clone());
            at += 1;
        }
    }
}

/// A new `p:sp` placeholder element.
fn new_placeholder_sp(id: u32, name: &str, format: &PlaceholderFormat) -> Element {
    let mut buf = itoa::Buffer::new();

    let nv_sp_pr = Element::new("p:nvSpPr")
        .with_child(
            Element::new("p:cNvPr")
                .with_attr("id", buf.format(id))
                .with_attr("name", name),
        )
        .with_child(
            Element::new("p:cNvSpPr")
                .with_child(Element::new("a:spLocks").with_attr("noGrp", "1")),
        )
        .with_child(Element::new("p:nvPr").with_child(format.to_ph()));

    let mut sp = Element::new("p:sp")
        .with_child(nv_sp_pr)
        .with_child(Element::new("p:spPr"));

    if format.ph_type.has_text_frame() {
        sp.push(
            Element::new("p:txBody")
                .with_child(Element::new("a:bodyPr"))
                .with_child(Element::new("a:lstStyle"))
                .with_child(Element::new("a:p")),
        );
    }

    sp
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::pptx::shapes::placeholder::PlaceholderType;

    const LAYOUT_TREE: &str = r#"<p:spTree xmlns:p="p" xmlns:a="a">
  <p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>
  <p:grpSpPr/>
  <p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr/></p:sp>
  <p:sp><p:nvSpPr><p:cNvPr id="3" name="Content Placeholder 2"/><p:cNvSpPr/><p:nvPr><p:ph idx="1"/></p:nvPr></p:nvSpPr><p:spPr/></p:sp>
  <p:sp><p:nvSpPr><p:cNvPr id="4" name="Date Placeholder 3"/><p:cNvSpPr/><p:nvPr><p:ph type="dt" sz="half" idx="10"/></p:nvPr></p:nvSpPr><p:spPr/></p:sp>
  <p:sp><p:nvSpPr><p:cNvPr id="5" name="Picture Placeholder 4"/><p:cNvSpPr/><p:nvPr><p:ph type="pic" orient="vert" idx="2"/></p:nvPr></p:nvSpPr><p:spPr/></p:sp>
  <p:sp><p:nvSpPr><p:cNvPr id="9" name="Logo"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr/></p:sp>
  <p:extLst/>
</p:spTree>"#;

    fn layout_shapes() -> ShapeCollection {
        let mut tree = Element::parse(LAYOUT_TREE.as_bytes()).unwrap();
        ShapeCollection::from_sp_tree(&mut tree, PartId::new(2))
    }

    fn empty_tree() -> Element {
        Element::new("p:spTree")
            .with_child(
                Element::new("p:nvGrpSpPr")
                    .with_child(Element::new("p:cNvPr").with_attr("id", "1").with_attr("name", "")),
            )
            .with_child(Element::new("p:grpSpPr"))
    }

    #[test]
    fn test_from_sp_tree_moves_shapes_out() {
        let mut tree = Element::parse(LAYOUT_TREE.as_bytes()).unwrap();
        let shapes = ShapeCollection::from_sp_tree(&mut tree, PartId::new(2));

        assert_eq!(shapes.len(), 5);
        assert_eq!(shapes.owner(), PartId::new(2));
        assert_eq!(shapes.placeholders().count(), 4);
        assert_eq!(shapes.next_shape_id(), 10);

        let left: Vec<&str> = tree.child_elements().map(|e| e.local_name()).collect();
        assert_eq!(left, ["nvGrpSpPr", "grpSpPr", "extLst"]);
    }

    #[test]
    fn test_write_into_lands_before_ext_lst() {
        let mut tree = Element::parse(LAYOUT_TREE.as_bytes()).unwrap();
        let shapes = ShapeCollection::from_sp_tree(&mut tree, PartId::new(0));
        shapes.write_into(&mut tree);

        let order: Vec<&str> = tree.child_elements().map(|e| e.local_name()).collect();
        assert_eq!(
            order,
            ["nvGrpSpPr", "grpSpPr", "sp", "sp", "sp", "sp", "sp", "extLst"]
        );
    }

    #[test]
    fn test_clone_layout_placeholders() {
        let layout = layout_shapes();
        let mut tree = empty_tree();
        let mut slide = ShapeCollection::from_sp_tree(&mut tree, PartId::new(7));
        slide.clone_layout_placeholders(&layout);

        // title, content, picture; date and the plain shape are skipped
        assert_eq!(slide.len(), 3);
        let names: Vec<&str> = slide.iter().map(Shape::name).collect();
        assert_eq!(
            names,
            ["Title 1", "Content Placeholder 2", "Vertical Picture Placeholder 3"]
        );
        let ids: Vec<u32> = slide.iter().filter_map(Shape::shape_id).collect();
        assert_eq!(ids, [2, 3, 4]);

        let title = slide.get(0).unwrap().element().to_xml();
        assert_eq!(
            title,
            concat!(
                r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/>"#,
                r#"<p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr>"#,
                r#"<p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr/>"#,
                r#"<p:txBody><a:bodyPr/><a:lstStyle/><a:p/></p:txBody></p:sp>"#
            )
        );

        let content = slide.get(1).unwrap();
        assert_eq!(content.element().find_path(&["nvSpPr", "nvPr", "ph"]).unwrap().to_xml(), r#"<p:ph idx="1"/>"#);
        assert!(content.element().find("txBody").is_some());

        let picture = slide.get(2).unwrap();
        let format = picture.placeholder_format().unwrap();
        assert_eq!(format.ph_type, PlaceholderType::Picture);
        assert_eq!(format.idx, 2);
        assert!(picture.element().find("txBody").is_none());
    }
}
