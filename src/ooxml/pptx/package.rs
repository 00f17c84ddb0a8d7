//! Package implementation for PowerPoint presentations.
//!
//! The package owns every part in an arena. Parts refer to each other through
//! `PartId` / `ImageId` handles, never through references, so a part can be
//! renamed or mutated without invalidating the relationships pointing at it.
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::content_type as ct;
use crate::ooxml::opc::part::{BasePart, BlobPart, ImageId, Part, PartDict, PartId, XmlPart, load_rels};
use crate::ooxml::opc::pkgreader::SerializedPart;
use crate::ooxml::opc::rel::{RelTarget, RelType, Relationship, Relationships};
use crate::ooxml::opc::{OpcError, OpcPackage, PackURI, PackageReader, PackageWriter};
use crate::ooxml::pptx::parts::{
    ImagePart, ImageRegistry, ImageSource, PresentationPart, Slide, SlideLayout, SlideLike,
    SlideMaster,
};
use std::collections::{BTreeMap, HashMap};

/// A part stored in the package arena.
#[derive(Debug, Clone)]
pub enum PackagePart {
    Presentation(PresentationPart),
    Slide(Slide),
    SlideLayout(SlideLayout),
    SlideMaster(SlideMaster),
    /// XML part carried without interpretation (theme, properties, ...)
    Xml(XmlPart),
    /// Binary part carried without interpretation
    Blob(BlobPart),
}

impl PackagePart {
    /// Build the typed part for a serialized part, chosen by content type.
    fn load(spart: SerializedPart, part_dict: &PartDict) -> Result<Self> {
        let part = match spart.content_type.as_str() {
            ct::PML_PRESENTATION_MAIN | ct::PML_PRES_MACRO_MAIN => {
                Self::Presentation(PresentationPart::load(&spart, part_dict)?)
            },
            ct::PML_SLIDE => Self::Slide(Slide::load(&spart, part_dict)?),
            ct::PML_SLIDE_LAYOUT => Self::SlideLayout(SlideLayout::load(&spart, part_dict)?),
            ct::PML_SLIDE_MASTER => Self::SlideMaster(SlideMaster::load(&spart, part_dict)?),
            _ => {
                let SerializedPart {
                    partname,
                    content_type,
                    blob,
                    srels,
                    ..
                } = spart;
                let is_xml = XmlPart::is_xml_content_type(&content_type);
                let base = BasePart::load(partname, content_type, &srels, part_dict)?;
                if is_xml {
                    Self::Xml(XmlPart::load(base, blob)?)
                } else {
                    Self::Blob(BlobPart::new(base, blob))
                }
            },
        };
        Ok(part)
    }

    /// The part as a generic OPC part.
    pub fn as_part(&self) -> &dyn Part {
        match self {
            Self::Presentation(part) => part,
            Self::Slide(part) => part,
            Self::SlideLayout(part) => part,
            Self::SlideMaster(part) => part,
            Self::Xml(part) => part,
            Self::Blob(part) => part,
        }
    }

    pub fn as_part_mut(&mut self) -> &mut dyn Part {
        match self {
            Self::Presentation(part) => part,
            Self::Slide(part) => part,
            Self::SlideLayout(part) => part,
            Self::SlideMaster(part) => part,
            Self::Xml(part) => part,
            Self::Blob(part) => part,
        }
    }

    /// The part as a slide-like part, if it is a slide, layout or master.
    pub fn as_slide_like_mut(&mut self) -> Option<&mut dyn SlideLike> {
        match self {
            Self::Slide(part) => Some(part as &mut dyn SlideLike),
            Self::SlideLayout(part) => Some(part as &mut dyn SlideLike),
            Self::SlideMaster(part) => Some(part as &mut dyn SlideLike),
            _ => None,
        }
    }

    pub fn as_presentation(&self) -> Option<&PresentationPart> {
        match self {
            Self::Presentation(part) => Some(part),
            _ => None,
        }
    }

    pub fn as_slide(&self) -> Option<&Slide> {
        match self {
            Self::Slide(slide) => Some(slide),
            _ => None,
        }
    }

    pub fn as_slide_layout(&self) -> Option<&SlideLayout> {
        match self {
            Self::SlideLayout(layout) => Some(layout),
            _ => None,
        }
    }

    pub fn as_slide_master(&self) -> Option<&SlideMaster> {
        match self {
            Self::SlideMaster(master) => Some(master),
            _ => None,
        }
    }

    /// Short name of the part kind, for messages.
    fn kind(&self) -> &'static str {
        match self {
            Self::Presentation(_) => "presentation",
            Self::Slide(_) => "slide",
            Self::SlideLayout(_) => "slide layout",
            Self::SlideMaster(_) => "slide master",
            Self::Xml(_) => "xml",
            Self::Blob(_) => "blob",
        }
    }
}

/// A PowerPoint (.pptx) package.
///
/// Holds the package relationships, the part arena and the image registry.
/// It is read from and written to a member map (Zip member name to bytes);
/// the physical container is left to the caller.
///
/// # Examples
///
/// ```rust
/// use slidekit::ooxml::pptx::Package;
/// use slidekit::ooxml::pptx::template::default_members;
///
/// let pkg = Package::from_members(default_members())?;
/// let main = pkg.main_part_id()?;
/// assert_eq!(pkg.part(main).unwrap().as_part().partname().as_str(), "/ppt/presentation.xml");
/// # Ok::<(), slidekit::ooxml::error::OoxmlError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Package {
    rels: Relationships,
    parts: Vec<PackagePart>,
    images: ImageRegistry,
}

impl Package {
    /// Read a package from its member map.
    pub fn from_members(members: HashMap<String, Vec<u8>>) -> Result<Self> {
        let reader = PackageReader::from_members(members)?;
        Self::unmarshal(reader)
    }

    /// Turn serialized parts into typed parts and resolve relationships.
    ///
    /// Handles are assigned up front, in reading order, so every relationship
    /// target can be resolved while its source part is built.
    fn unmarshal(reader: PackageReader) -> Result<Self> {
        let (pkg_srels, sparts) = reader.into_parts();

        let mut part_dict = PartDict::with_capacity(sparts.len());
        let (mut part_count, mut image_count) = (0, 0);
        for spart in &sparts {
            let target = if is_image_content_type(&spart.content_type) {
                image_count += 1;
                RelTarget::Image(ImageId::new(image_count - 1))
            } else {
                part_count += 1;
                RelTarget::Part(PartId::new(part_count - 1))
            };
            part_dict.insert(spart.partname.clone(), target);
        }

        let mut parts = Vec::with_capacity(part_count);
        let mut images = ImageRegistry::new();
        for spart in sparts {
            if is_image_content_type(&spart.content_type) {
                let base = BasePart::load(
                    spart.partname,
                    spart.content_type,
                    &spart.srels,
                    &part_dict,
                )?;
                images.insert(ImagePart::new(base, spart.blob));
            } else {
                parts.push(PackagePart::load(spart, &part_dict)?);
            }
        }

        let rels = load_rels(&pkg_srels, &part_dict, "/")?;
        let package = Self { rels, parts, images };
        package.validate()?;

        tracing::debug!(
            parts = package.parts.len(),
            images = package.images.len(),
            "loaded package"
        );
        Ok(package)
    }

    /// Check that the slide hierarchy relationships target the right kinds
    /// of part.
    fn validate(&self) -> Result<()> {
        for part in &self.parts {
            match part {
                PackagePart::Slide(slide) => {
                    if let Ok(layout) = slide.slidelayout() {
                        self.expect_kind(layout, slide.partname(), PackagePart::as_slide_layout)?;
                    }
                },
                PackagePart::SlideLayout(layout) => {
                    if let Ok(master) = layout.slidemaster() {
                        self.expect_kind(master, layout.partname(), PackagePart::as_slide_master)?;
                    }
                },
                PackagePart::SlideMaster(master) => {
                    for layout in master.slidelayouts().iter() {
                        self.expect_kind(layout, master.partname(), PackagePart::as_slide_layout)?;
                    }
                },
                _ => {},
            }
        }
        Ok(())
    }

    fn expect_kind<T>(
        &self,
        id: PartId,
        source: &PackURI,
        cast: fn(&PackagePart) -> Option<&T>,
    ) -> Result<()> {
        let target = self
            .part(id)
            .ok_or_else(|| OoxmlError::PartNotFound(format!("{} (related from {})", id, source)))?;
        if cast(target).is_none() {
            return Err(OoxmlError::InvalidRelationship(format!(
                "{} relates to {} which is a {} part",
                source,
                target.as_part().partname(),
                target.kind()
            )));
        }
        Ok(())
    }

    /// Handle of the main document part (the office document relationship).
    pub fn main_part_id(&self) -> Result<PartId> {
        let target = self.part_related_by(&RelType::OfficeDocument)?;
        target.part_id().ok_or_else(|| {
            OoxmlError::InvalidRelationship(format!("main document relationship targets {:?}", target))
        })
    }

    pub fn part(&self, id: PartId) -> Option<&PackagePart> {
        self.parts.get(id.index())
    }

    pub fn part_mut(&mut self, id: PartId) -> Option<&mut PackagePart> {
        self.parts.get_mut(id.index())
    }

    /// Every part in the arena with its handle.
    pub fn iter(&self) -> impl Iterator<Item = (PartId, &PackagePart)> {
        self.parts
            .iter()
            .enumerate()
            .map(|(index, part)| (PartId::new(index), part))
    }

    /// Handle of the part currently named `partname`.
    pub fn part_by_partname(&self, partname: &PackURI) -> Option<PartId> {
        self.iter()
            .find(|(_, part)| part.as_part().partname() == partname)
            .map(|(id, _)| id)
    }

    pub fn slide(&self, id: PartId) -> Option<&Slide> {
        self.part(id).and_then(PackagePart::as_slide)
    }

    pub fn slide_mut(&mut self, id: PartId) -> Option<&mut Slide> {
        match self.part_mut(id) {
            Some(PackagePart::Slide(slide)) => Some(slide),
            _ => None,
        }
    }

    pub fn slide_layout(&self, id: PartId) -> Option<&SlideLayout> {
        self.part(id).and_then(PackagePart::as_slide_layout)
    }

    pub fn slide_master(&self, id: PartId) -> Option<&SlideMaster> {
        self.part(id).and_then(PackagePart::as_slide_master)
    }

    pub fn presentation_part(&self, id: PartId) -> Option<&PresentationPart> {
        self.part(id).and_then(PackagePart::as_presentation)
    }

    pub fn presentation_part_mut(&mut self, id: PartId) -> Option<&mut PresentationPart> {
        match self.part_mut(id) {
            Some(PackagePart::Presentation(part)) => Some(part),
            _ => None,
        }
    }

    #[inline]
    pub fn images(&self) -> &ImageRegistry {
        &self.images
    }

    #[inline]
    pub fn images_mut(&mut self) -> &mut ImageRegistry {
        &mut self.images
    }

    /// Handle the next pushed part will receive.
    #[inline]
    pub(crate) fn next_part_id(&self) -> PartId {
        PartId::new(self.parts.len())
    }

    /// Append a part to the arena. Its partname must not be in use.
    pub(crate) fn push_part(&mut self, part: PackagePart) -> PartId {
        let id = self.next_part_id();
        tracing::debug!(%id, partname = %part.as_part().partname(), "adding {} part", part.kind());
        self.parts.push(part);
        id
    }

    /// Add an image to the package and relate the slide-like part `id` to it.
    ///
    /// Identical image bytes share one image part, and the part reuses an
    /// existing relationship to it.
    pub fn add_image(&mut self, id: PartId, source: &ImageSource) -> Result<(ImageId, Relationship)> {
        let Self { parts, images, .. } = self;
        let part = parts
            .get_mut(id.index())
            .ok_or_else(|| OoxmlError::PartNotFound(id.to_string()))?;
        let kind = part.kind();
        let slide_like = part.as_slide_like_mut().ok_or_else(|| {
            OoxmlError::Precondition(format!("cannot add an image to a {} part", kind))
        })?;
        slide_like.add_image(images, source)
    }

    /// Serialize the package to a member map.
    pub fn to_members(&self) -> Result<BTreeMap<String, Vec<u8>>> {
        Ok(PackageWriter::to_members(self)?)
    }
}

impl OpcPackage for Package {
    fn rels(&self) -> &Relationships {
        &self.rels
    }

    fn parts(&self) -> Vec<&dyn Part> {
        self.parts
            .iter()
            .map(PackagePart::as_part)
            .chain(self.images.iter().map(|image| image as &dyn Part))
            .collect()
    }

    fn target_partname(&self, target: &RelTarget) -> crate::ooxml::opc::Result<&PackURI> {
        match target {
            RelTarget::Part(id) => self
                .part(*id)
                .map(|part| part.as_part().partname())
                .ok_or_else(|| OpcError::PartNotFound(id.to_string())),
            RelTarget::Image(id) => self
                .images
                .get(*id)
                .map(|image| image.partname())
                .ok_or_else(|| OpcError::PartNotFound(id.to_string())),
            RelTarget::External(url) => Err(OpcError::InvalidRelationship(format!(
                "external target '{}' has no partname",
                url
            ))),
        }
    }
}

/// Image parts go to the image registry rather than the arena.
#[inline]
fn is_image_content_type(content_type: &str) -> bool {
    content_type.starts_with("image/")
}
