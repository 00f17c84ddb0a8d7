//! Slide parts and related types.
//!
//! This module contains the slide, slide layout and slide master parts. All
//! three share `SlideLikeBase` (element tree, shape collection, image
//! handling); each resolves the relationships it cares about once, when it
//! is loaded.

use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::{content_type as ct, namespace};
use crate::ooxml::opc::part::{BasePart, ImageId, Part, PartDict, PartId};
use crate::ooxml::opc::pkgreader::SerializedPart;
use crate::ooxml::opc::rel::{RelTarget, RelType, Relationship, Relationships};
use crate::ooxml::opc::PackURI;
use crate::ooxml::oxml::Element;
use crate::ooxml::pptx::parts::image::{ImageRegistry, ImageSource};
use crate::ooxml::pptx::shapes::ShapeCollection;
use std::borrow::Cow;

/// Partname template for slides.
pub const SLIDE_PARTNAME_TEMPLATE: &str = "/ppt/slides/slide%d.xml";

/// State shared by slides, slide layouts and slide masters.
#[derive(Debug, Clone)]
pub struct SlideLikeBase {
    id: PartId,
    base: BasePart,
    element: Element,
    shapes: Option<ShapeCollection>,
}

impl SlideLikeBase {
    fn new(id: PartId, base: BasePart, element: Element, shapes: Option<ShapeCollection>) -> Self {
        Self {
            id,
            base,
            element,
            shapes,
        }
    }

    /// Generic part load, then move the shapes out of `p:cSld/p:spTree`.
    fn load(spart: &SerializedPart, part_dict: &PartDict) -> Result<Self> {
        let id = part_dict
            .get(&spart.partname)
            .and_then(RelTarget::part_id)
            .ok_or_else(|| OoxmlError::PartNotFound(spart.partname.to_string()))?;
        let base = BasePart::load(
            spart.partname.clone(),
            spart.content_type.as_str(),
            &spart.srels,
            part_dict,
        )?;
        let mut element = Element::parse(&spart.blob)?;

        let sp_tree = element.find_path_mut(&["cSld", "spTree"]).ok_or_else(|| {
            OoxmlError::InvalidFormat(format!("{} has no p:cSld/p:spTree", spart.partname))
        })?;
        let shapes = ShapeCollection::from_sp_tree(sp_tree, id);

        tracing::debug!(partname = %spart.partname, shapes = shapes.len(), "loaded slide-like part");
        Ok(Self::new(id, base, element, Some(shapes)))
    }

    /// The part XML with the shapes written back into the shape tree.
    fn to_xml(&self) -> String {
        let Some(shapes) = &self.shapes else {
            return self.element.to_xml_document();
        };

        let mut element = self.element.clone();
        if let Some(sp_tree) = element.find_path_mut(&["cSld", "spTree"]) {
            shapes.write_into(sp_tree);
        }
        element.to_xml_document()
    }
}

/// Behaviour common to slides, slide layouts and slide masters.
pub trait SlideLike: Part {
    fn slide_base(&self) -> &SlideLikeBase;

    fn slide_base_mut(&mut self) -> &mut SlideLikeBase;

    /// Handle of this part in the package arena.
    fn part_id(&self) -> PartId {
        self.slide_base().id
    }

    /// Root element of the part (without its shapes).
    fn element(&self) -> &Element {
        &self.slide_base().element
    }

    /// Internal name of this slide-like part (`p:cSld@name`), empty if absent.
    fn name(&self) -> &str {
        self.slide_base()
            .element
            .find("cSld")
            .and_then(|c_sld| c_sld.attr("name"))
            .unwrap_or("")
    }

    /// Shapes belonging to this part.
    fn shapes(&self) -> Result<&ShapeCollection> {
        self.slide_base().shapes.as_ref().ok_or_else(|| {
            OoxmlError::Precondition(format!(
                "shapes of {} referenced before assigned",
                self.partname()
            ))
        })
    }

    /// Add an image to the package and relate this part to it.
    ///
    /// An image with identical bytes is reused, and so is an existing image
    /// relationship from this part to it.
    fn add_image(
        &mut self,
        images: &mut ImageRegistry,
        source: &ImageSource,
    ) -> Result<(ImageId, Relationship)> {
        let image = images.add_image(source)?;
        let rel = self.relate_to(RelTarget::Image(image), RelType::Image).clone();
        Ok((image, rel))
    }
}

/// First part-valued relationship of `reltype`, in table order.
///
/// Further matches are ignored with a warning.
fn resolve_first(rels: &Relationships, reltype: &RelType, source: &PackURI) -> Option<PartId> {
    let mut matches = rels.iter_of_type(reltype).filter_map(|rel| {
        let id = rel.target().part_id();
        if id.is_none() {
            tracing::warn!(source = %source, r_id = rel.r_id(), "{} relationship does not target a part", reltype);
        }
        id.map(|id| (rel.r_id(), id))
    });

    let (r_id, first) = matches.next()?;
    for (extra, _) in matches {
        tracing::warn!(source = %source, used = r_id, ignored = extra, "multiple {} relationships", reltype);
    }
    tracing::debug!(source = %source, r_id, "resolved {} relationship", reltype);
    Some(first)
}

macro_rules! impl_slide_like_part {
    ($ty:ty) => {
        impl Part for $ty {
            fn base(&self) -> &BasePart {
                &self.slide.base
            }

            fn base_mut(&mut self) -> &mut BasePart {
                &mut self.slide.base
            }

            fn blob(&self) -> crate::ooxml::opc::Result<Cow<'_, [u8]>> {
                Ok(Cow::Owned(self.slide.to_xml().into_bytes()))
            }
        }

        impl SlideLike for $ty {
            fn slide_base(&self) -> &SlideLikeBase {
                &self.slide
            }

            fn slide_base_mut(&mut self) -> &mut SlideLikeBase {
                &mut self.slide
            }
        }
    };
}

/// A slide part.
///
/// Corresponds to `/ppt/slides/slideN.xml` in the package.
#[derive(Debug, Clone)]
pub struct Slide {
    slide: SlideLikeBase,
    slidelayout: Option<PartId>,
}

impl Slide {
    /// Create a new slide with the minimal shape tree.
    ///
    /// With a layout, the layout's placeholders are cloned onto the slide
    /// and a slide layout relationship is recorded.
    pub fn new(
        id: PartId,
        partname: PackURI,
        layout: Option<(PartId, &SlideLayout)>,
    ) -> Result<Self> {
        let mut sp_tree = minimal_sp_tree();
        let mut shapes = ShapeCollection::from_sp_tree(&mut sp_tree, id);
        if let Some((_, layout)) = layout {
            shapes.clone_layout_placeholders(layout.shapes()?);
        }

        let element = Element::new("p:sld")
            .with_attr("xmlns:a", namespace::DML_MAIN)
            .with_attr("xmlns:r", namespace::OFC_RELATIONSHIPS)
            .with_attr("xmlns:p", namespace::PML_MAIN)
            .with_child(Element::new("p:cSld").with_child(sp_tree));

        let base = BasePart::new(partname, ct::PML_SLIDE);
        let mut slide = Self {
            slide: SlideLikeBase::new(id, base, element, Some(shapes)),
            slidelayout: None,
        };

        if let Some((layout_id, _)) = layout {
            slide.relate_to(RelTarget::Part(layout_id), RelType::SlideLayout);
            slide.slidelayout = Some(layout_id);
        }
        Ok(slide)
    }

    /// Load a slide and resolve its slide layout relationship.
    pub fn load(spart: &SerializedPart, part_dict: &PartDict) -> Result<Self> {
        let mut slide = Self {
            slide: SlideLikeBase::load(spart, part_dict)?,
            slidelayout: None,
        };
        slide.slidelayout = resolve_first(slide.rels(), &RelType::SlideLayout, &spart.partname);
        Ok(slide)
    }

    /// Slide layout this slide inherits appearance from.
    pub fn slidelayout(&self) -> Result<PartId> {
        self.slidelayout.ok_or_else(|| {
            OoxmlError::Precondition(format!(
                "slide layout of {} referenced before assigned",
                self.partname()
            ))
        })
    }
}

impl_slide_like_part!(Slide);

/// A slide layout part.
///
/// Corresponds to `/ppt/slideLayouts/slideLayoutN.xml` in the package.
#[derive(Debug, Clone)]
pub struct SlideLayout {
    slide: SlideLikeBase,
    slidemaster: Option<PartId>,
}

impl SlideLayout {
    /// Load a slide layout and resolve its slide master relationship.
    pub fn load(spart: &SerializedPart, part_dict: &PartDict) -> Result<Self> {
        let mut layout = Self {
            slide: SlideLikeBase::load(spart, part_dict)?,
            slidemaster: None,
        };
        layout.slidemaster = resolve_first(layout.rels(), &RelType::SlideMaster, &spart.partname);
        Ok(layout)
    }

    /// Slide master from which this slide layout inherits properties.
    pub fn slidemaster(&self) -> Result<PartId> {
        self.slidemaster.ok_or_else(|| {
            OoxmlError::Precondition(format!(
                "slide master of {} referenced before assigned",
                self.partname()
            ))
        })
    }
}

impl_slide_like_part!(SlideLayout);

/// Ordered handles of parts of one kind, owned by another part.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartCollection {
    parts: Vec<PartId>,
}

impl PartCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn load_part(&mut self, id: PartId) {
        self.parts.push(id);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<PartId> {
        self.parts.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = PartId> + '_ {
        self.parts.iter().copied()
    }
}

/// A slide master part.
///
/// Corresponds to `/ppt/slideMasters/slideMasterN.xml` in the package.
#[derive(Debug, Clone)]
pub struct SlideMaster {
    slide: SlideLikeBase,
    slidelayouts: PartCollection,
}

impl SlideMaster {
    /// Load a slide master, collecting its slide layouts in relationship
    /// table order.
    pub fn load(spart: &SerializedPart, part_dict: &PartDict) -> Result<Self> {
        let mut master = Self {
            slide: SlideLikeBase::load(spart, part_dict)?,
            slidelayouts: PartCollection::new(),
        };
        let mut slidelayouts = PartCollection::new();
        for rel in master.rels().iter_of_type(&RelType::SlideLayout) {
            match rel.target().part_id() {
                Some(id) => slidelayouts.load_part(id),
                None => tracing::warn!(
                    source = %spart.partname,
                    r_id = rel.r_id(),
                    "slide layout relationship does not target a part"
                ),
            }
        }
        tracing::debug!(partname = %spart.partname, layouts = slidelayouts.len(), "loaded slide master");
        master.slidelayouts = slidelayouts;
        Ok(master)
    }

    /// Slide layouts belonging to this slide master.
    #[inline]
    pub fn slidelayouts(&self) -> &PartCollection {
        &self.slidelayouts
    }
}

impl_slide_like_part!(SlideMaster);

/// `p:spTree` with only the group properties a new slide needs.
fn minimal_sp_tree() -> Element {
    Element::new("p:spTree")
        .with_child(
            Element::new("p:nvGrpSpPr")
                .with_child(Element::new("p:cNvPr").with_attr("id", "1").with_attr("name", ""))
                .with_child(Element::new("p:cNvGrpSpPr"))
                .with_child(Element::new("p:nvPr")),
        )
        .with_child(Element::new("p:grpSpPr"))
}
