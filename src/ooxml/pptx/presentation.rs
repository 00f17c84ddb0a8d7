//! Main presentation object - the high-level API for working with presentations.
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::content_type as ct;
use crate::ooxml::opc::part::{ImageId, Part, PartId};
use crate::ooxml::opc::rel::Relationship;
use crate::ooxml::pptx::package::Package;
use crate::ooxml::pptx::parts::{ImageSource, PresentationPart, SlideLayout, SlideLike, SlideMaster};
use crate::ooxml::pptx::slides::{SlideCollection, SlideCollectionMut};
use crate::ooxml::pptx::template;
use std::collections::{BTreeMap, HashMap};

/// A PowerPoint presentation.
///
/// Owns its package and knows which part is the main presentation part.
///
/// # Examples
///
/// ```rust
/// use slidekit::ooxml::opc::Part;
/// use slidekit::ooxml::pptx::Presentation;
///
/// let mut pres = Presentation::new()?;
/// let layout = pres.slide_layout_by_name("Title Only")?.unwrap();
/// pres.slides_mut()?.add_slide(layout)?;
/// pres.slides_mut()?.add_slide(layout)?;
///
/// let slides = pres.slides()?;
/// assert_eq!(slides.len(), 2);
/// assert_eq!(slides.get(1)?.partname().as_str(), "/ppt/slides/slide2.xml");
///
/// // member name to bytes, ready to be zipped
/// let members = pres.to_members()?;
/// assert!(members.contains_key("ppt/slides/slide2.xml"));
/// # Ok::<(), slidekit::ooxml::error::OoxmlError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Presentation {
    package: Package,
    part: PartId,
}

impl Presentation {
    /// Create a presentation with no slides from the default template.
    pub fn new() -> Result<Self> {
        Self::from_members(template::default_members())
    }

    /// Read a presentation from its package members (Zip member name to
    /// bytes).
    pub fn from_members(members: HashMap<String, Vec<u8>>) -> Result<Self> {
        Self::from_package(Package::from_members(members)?)
    }

    /// Wrap a loaded package, checking its main part is a presentation.
    pub fn from_package(package: Package) -> Result<Self> {
        let part = package.main_part_id()?;
        let main = package
            .part(part)
            .ok_or_else(|| OoxmlError::PartNotFound(format!("main presentation part {}", part)))?;

        let content_type = main.as_part().content_type();
        // Support both regular and macro-enabled presentations
        if content_type != ct::PML_PRESENTATION_MAIN && content_type != ct::PML_PRES_MACRO_MAIN {
            return Err(OoxmlError::InvalidContentType {
                expected: format!(
                    "{} or {}",
                    ct::PML_PRESENTATION_MAIN,
                    ct::PML_PRES_MACRO_MAIN
                ),
                got: content_type.to_string(),
            });
        }

        Ok(Self { package, part })
    }

    #[inline]
    pub fn package(&self) -> &Package {
        &self.package
    }

    #[inline]
    pub fn package_mut(&mut self) -> &mut Package {
        &mut self.package
    }

    #[inline]
    pub fn into_package(self) -> Package {
        self.package
    }

    /// The main presentation part.
    pub fn part(&self) -> Result<&PresentationPart> {
        self.package
            .presentation_part(self.part)
            .ok_or_else(|| OoxmlError::PartNotFound(format!("presentation part {}", self.part)))
    }

    /// The slides, in slide order.
    pub fn slides(&self) -> Result<SlideCollection<'_>> {
        SlideCollection::new(&self.package, self.part)
    }

    /// The slides, for adding and renaming.
    pub fn slides_mut(&mut self) -> Result<SlideCollectionMut<'_>> {
        SlideCollectionMut::new(&mut self.package, self.part)
    }

    /// The slide masters, in `p:sldMasterIdLst` order.
    pub fn slide_masters(&self) -> Result<Vec<&SlideMaster>> {
        let part = self.part()?;
        let mut masters = Vec::new();
        for r_id in part.slide_master_r_ids() {
            let master = part
                .target(r_id)?
                .part_id()
                .and_then(|id| self.package.slide_master(id))
                .ok_or_else(|| {
                    OoxmlError::InvalidRelationship(format!(
                        "slide master id {} does not relate to a slide master part",
                        r_id
                    ))
                })?;
            masters.push(master);
        }
        Ok(masters)
    }

    /// The first slide layout named `name` (`p:cSld@name`), searching the
    /// slide masters in order.
    ///
    /// `Ok(None)` when no layout has that name. A master list that does not
    /// resolve is an error.
    pub fn slide_layout_by_name(&self, name: &str) -> Result<Option<PartId>> {
        let found = self
            .slide_masters()?
            .into_iter()
            .flat_map(|master| master.slidelayouts().iter())
            .find(|&id| {
                self.package
                    .slide_layout(id)
                    .is_some_and(|layout: &SlideLayout| layout.name() == name)
            });
        Ok(found)
    }

    /// Add an image to the package and relate the slide, slide layout or
    /// slide master `part` to it.
    pub fn add_image(&mut self, part: PartId, source: &ImageSource) -> Result<(ImageId, Relationship)> {
        self.package.add_image(part, source)
    }

    /// Get the slide width in EMUs (English Metric Units).
    ///
    /// Returns None if the slide size is not defined.
    /// 1 EMU = 1/914400 inch = 1/36000 mm
    pub fn slide_width(&self) -> Result<Option<i64>> {
        self.part()?.slide_width()
    }

    /// Get the slide height in EMUs.
    pub fn slide_height(&self) -> Result<Option<i64>> {
        self.part()?.slide_height()
    }

    /// Serialize the presentation to package members.
    pub fn to_members(&self) -> Result<BTreeMap<String, Vec<u8>>> {
        self.package.to_members()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::rel::{RelTarget, RelType};

    const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 1, 2, 3];

    fn reload(pres: &Presentation) -> Presentation {
        let members = pres.to_members().unwrap();
        Presentation::from_members(members.into_iter().collect()).unwrap()
    }

    #[test]
    fn test_new_presentation() {
        let pres = Presentation::new().unwrap();
        assert!(pres.slides().unwrap().is_empty());
        assert_eq!(pres.slide_width().unwrap(), Some(9144000));
        assert_eq!(pres.slide_height().unwrap(), Some(6858000));

        let masters = pres.slide_masters().unwrap();
        assert_eq!(masters.len(), 1);
        let names: Vec<&str> = masters[0]
            .slidelayouts()
            .iter()
            .map(|id| pres.package().slide_layout(id).unwrap().name())
            .collect();
        assert_eq!(names, ["Title Slide", "Title and Content", "Title Only", "Blank"]);
        assert!(pres.slide_layout_by_name("Comparison").unwrap().is_none());
    }

    #[test]
    fn test_non_presentation_main_part_is_rejected() {
        let mut members = template::default_members();
        let types = String::from_utf8(members.remove("[Content_Types].xml").unwrap()).unwrap();
        let types = types.replace(
            ct::PML_PRESENTATION_MAIN,
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml",
        );
        members.insert("[Content_Types].xml".to_string(), types.into_bytes());

        assert!(matches!(
            Presentation::from_members(members),
            Err(OoxmlError::InvalidContentType { .. })
        ));
    }

    #[test]
    fn test_macro_enabled_presentation_is_accepted() {
        let mut members = template::default_members();
        let types = String::from_utf8(members.remove("[Content_Types].xml").unwrap()).unwrap();
        let types = types.replace(ct::PML_PRESENTATION_MAIN, ct::PML_PRES_MACRO_MAIN);
        members.insert("[Content_Types].xml".to_string(), types.into_bytes());

        let pres = Presentation::from_members(members).unwrap();
        assert_eq!(pres.part().unwrap().content_type(), ct::PML_PRES_MACRO_MAIN);
    }

    #[test]
    fn test_slides_survive_save_and_reload() {
        let mut pres = Presentation::new().unwrap();
        let title = pres.slide_layout_by_name("Title Slide").unwrap().unwrap();
        let blank = pres.slide_layout_by_name("Blank").unwrap().unwrap();
        let first = pres.slides_mut().unwrap().add_slide(title).unwrap();
        pres.slides_mut().unwrap().add_slide(blank).unwrap();

        let (image, rel) = pres
            .add_image(first, &ImageSource::from_bytes(PNG_BYTES).with_filename("logo.png"))
            .unwrap();
        assert_eq!(rel.target(), &RelTarget::Image(image));

        let reloaded = reload(&pres);
        let slides = reloaded.slides().unwrap();
        assert_eq!(slides.len(), 2);

        let layouts: Vec<&str> = slides
            .iter()
            .map(|slide| {
                let layout = slide.unwrap().slidelayout().unwrap();
                reloaded.package().slide_layout(layout).unwrap().name()
            })
            .collect();
        assert_eq!(layouts, ["Title Slide", "Blank"]);

        let first = slides.get(0).unwrap();
        assert_eq!(first.shapes().unwrap().len(), 2);
        assert!(first.rels().first_of_type(&RelType::Image).is_some());
        assert_eq!(reloaded.package().images().len(), 1);

        let ids: Vec<u32> = reloaded
            .part()
            .unwrap()
            .sld_id_lst()
            .iter()
            .map(|entry| entry.id)
            .collect();
        assert_eq!(ids, [256, 257]);
    }

    #[test]
    fn test_add_slide_after_reload_continues_numbering() {
        let mut pres = Presentation::new().unwrap();
        let layout = pres.slide_layout_by_name("Title and Content").unwrap().unwrap();
        pres.slides_mut().unwrap().add_slide(layout).unwrap();

        let mut reloaded = reload(&pres);
        let layout = reloaded.slide_layout_by_name("Title and Content").unwrap().unwrap();
        reloaded.slides_mut().unwrap().add_slide(layout).unwrap();

        let slides = reloaded.slides().unwrap();
        let partnames: Vec<String> = slides
            .iter()
            .map(|slide| slide.unwrap().partname().to_string())
            .collect();
        assert_eq!(partnames, ["/ppt/slides/slide1.xml", "/ppt/slides/slide2.xml"]);
        assert_eq!(reloaded.part().unwrap().sld_id_lst().next_id().unwrap(), 258);
    }
}
