//! The ordered slides of a presentation.
//!
//! A slide collection owns nothing: its order is the presentation part's
//! slide id list, and each entry reaches its slide through the presentation
//! part's relationship table.
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::part::{Part, PartId};
use crate::ooxml::opc::rel::{RelTarget, RelType};
use crate::ooxml::opc::{OpcError, OpcPackage, PackURI};
use crate::ooxml::pptx::package::{Package, PackagePart};
use crate::ooxml::pptx::parts::{PresentationPart, SLIDE_PARTNAME_TEMPLATE, Slide, SlideId};

/// Read-only view of the slides of a presentation, in slide order.
#[derive(Debug, Clone, Copy)]
pub struct SlideCollection<'a> {
    package: &'a Package,
    presentation: &'a PresentationPart,
}

impl<'a> SlideCollection<'a> {
    /// View the slides of the presentation part `part`.
    pub fn new(package: &'a Package, part: PartId) -> Result<Self> {
        let presentation = package
            .presentation_part(part)
            .ok_or_else(|| OoxmlError::PartNotFound(format!("presentation part {}", part)))?;
        Ok(Self {
            package,
            presentation,
        })
    }

    /// Number of slides.
    #[inline]
    pub fn len(&self) -> usize {
        self.presentation.sld_id_lst().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.presentation.sld_id_lst().is_empty()
    }

    /// The slide at `index` in slide order.
    pub fn get(&self, index: usize) -> Result<&'a Slide> {
        let entry = self
            .presentation
            .sld_id_lst()
            .get(index)
            .ok_or(OoxmlError::IndexOutOfRange {
                index,
                len: self.len(),
            })?;
        self.resolve(entry).map(|(_, slide)| slide)
    }

    /// Iterate the slides in order. Each call starts from the first slide.
    pub fn iter(&self) -> impl Iterator<Item = Result<&'a Slide>> + use<'a> {
        let this = *self;
        let presentation: &'a PresentationPart = self.presentation;
        presentation
            .sld_id_lst()
            .iter()
            .map(move |entry| this.resolve(entry).map(|(_, slide)| slide))
    }

    /// Handles of the slides, in slide order.
    pub fn part_ids(&self) -> Result<Vec<PartId>> {
        self.presentation
            .sld_id_lst()
            .iter()
            .map(|entry| self.resolve(entry).map(|(id, _)| id))
            .collect()
    }

    /// Fail if a slide outside the id list holds a `slide{N}.xml` name,
    /// which renumbering the listed slides could hand out a second time.
    fn check_unlisted_slides(&self, listed: &[PartId]) -> Result<()> {
        let unlisted = self
            .package
            .iter()
            .filter(|(id, _)| !listed.contains(id))
            .filter_map(|(_, part)| part.as_slide());
        for slide in unlisted {
            if is_numbered_slide_partname(slide.partname()) {
                return Err(OoxmlError::InvalidRelationship(format!(
                    "slide {} is not in the slide id list but holds a numbered slide partname",
                    slide.partname()
                )));
            }
        }
        Ok(())
    }

    /// Follow a slide id entry to its slide.
    fn resolve(&self, entry: &SlideId) -> Result<(PartId, &'a Slide)> {
        let rel = self.presentation.rels().get(&entry.r_id).ok_or_else(|| {
            OoxmlError::InvalidRelationship(format!(
                "slide id {} refers to missing relationship {}",
                entry.id, entry.r_id
            ))
        })?;

        let slide = match rel.target() {
            RelTarget::Part(id) => self.package.slide(*id).map(|slide| (*id, slide)),
            _ => None,
        };
        slide.ok_or_else(|| {
            OoxmlError::InvalidRelationship(format!(
                "slide id {} ({}) does not relate to a slide part",
                entry.id, entry.r_id
            ))
        })
    }
}

/// Mutable access to the slides of a presentation.
#[derive(Debug)]
pub struct SlideCollectionMut<'a> {
    package: &'a mut Package,
    part: PartId,
}

impl<'a> SlideCollectionMut<'a> {
    pub fn new(package: &'a mut Package, part: PartId) -> Result<Self> {
        SlideCollection::new(&*package, part)?;
        Ok(Self { package, part })
    }

    /// Read-only view over the same slides.
    pub fn as_view(&self) -> Result<SlideCollection<'_>> {
        SlideCollection::new(&*self.package, self.part)
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.as_view()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.as_view()?.is_empty())
    }

    /// Add a new slide based on the slide layout `layout` and append it to
    /// the slide order.
    ///
    /// The layout's placeholders are cloned onto the slide. All slides are
    /// renamed afterwards so partnames follow slide order.
    pub fn add_slide(&mut self, layout: PartId) -> Result<PartId> {
        // an inconsistent slide list fails before anything is added
        let view = self.as_view()?;
        view.check_unlisted_slides(&view.part_ids()?)?;
        view.presentation.sld_id_lst().next_id()?;

        let slide_layout = self
            .package
            .slide_layout(layout)
            .ok_or_else(|| OoxmlError::PartNotFound(format!("slide layout {}", layout)))?;
        let id = self.package.next_part_id();
        let partname = self.package.next_partname(SLIDE_PARTNAME_TEMPLATE)?;
        let slide = Slide::new(id, partname, Some((layout, slide_layout)))?;
        self.package.push_part(PackagePart::Slide(slide));

        let presentation = self
            .package
            .presentation_part_mut(self.part)
            .ok_or_else(|| OoxmlError::PartNotFound(format!("presentation part {}", self.part)))?;
        let r_id = presentation
            .relate_to(RelTarget::Part(id), RelType::Slide)
            .r_id()
            .to_string();
        let sld_id = presentation.sld_id_lst_mut().add_sld_id(r_id.as_str())?;
        tracing::debug!(%id, %layout, sld_id, r_id = %r_id, "added slide");

        self.rename_slides()?;
        Ok(id)
    }

    /// Rename every slide to `/ppt/slides/slide{N}.xml`, N being its 1-based
    /// position in slide order.
    ///
    /// Fails without renaming anything when a slide missing from the slide
    /// id list holds one of those names.
    pub fn rename_slides(&mut self) -> Result<()> {
        let view = self.as_view()?;
        let order = view.part_ids()?;
        view.check_unlisted_slides(&order)?;

        let count = order.len();
        for (index, id) in order.into_iter().enumerate() {
            let n = u32::try_from(index + 1)
                .map_err(|_| OoxmlError::Other(format!("too many slides: {}", index + 1)))?;
            let partname = PackURI::from_template(SLIDE_PARTNAME_TEMPLATE, n)
                .map_err(|e| OoxmlError::Opc(OpcError::InvalidPackUri(e)))?;
            let slide = self
                .package
                .slide_mut(id)
                .ok_or_else(|| OoxmlError::PartNotFound(id.to_string()))?;
            slide.set_partname(partname);
        }
        tracing::debug!(slides = count, "renamed slides");
        Ok(())
    }
}

/// Whether `partname` is exactly `/ppt/slides/slide{N}.xml` for some N.
fn is_numbered_slide_partname(partname: &PackURI) -> bool {
    partname.idx().is_some_and(|n| {
        PackURI::from_template(SLIDE_PARTNAME_TEMPLATE, n).is_ok_and(|uri| &uri == partname)
    })
}
