//! Open Packaging Convention (OPC) objects related to package parts.
//!
//! This module provides the Part trait, the `BasePart` state every part
//! carries, and the generic `XmlPart` / `BlobPart` implementations used for
//! parts this crate does not interpret.

use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::PackURI;
use crate::ooxml::opc::pkgreader::SerializedRelationship;
use crate::ooxml::opc::rel::{RelTarget, RelType, Relationship, Relationships};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

/// Handle of a part stored in the package arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartId(usize);

impl PartId {
    #[inline]
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position of the part in the arena.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for PartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "part#{}", self.0)
    }
}

/// Handle of an image part stored in the package image registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(usize);

impl ImageId {
    #[inline]
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position of the image in the registry.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "image#{}", self.0)
    }
}

/// Maps every partname in a package being loaded to the handle it will have
/// once loading completes. Relationship targets are resolved through it.
pub type PartDict = HashMap<PackURI, RelTarget>;

/// State shared by every part: partname, content type and relationships.
#[derive(Debug, Clone)]
pub struct BasePart {
    partname: PackURI,
    content_type: String,
    rels: Relationships,
}

impl BasePart {
    /// Create a part with an empty relationship table.
    pub fn new(partname: PackURI, content_type: impl Into<String>) -> Self {
        Self {
            partname,
            content_type: content_type.into(),
            rels: Relationships::new(),
        }
    }

    /// Load the generic aspects of a serialized part.
    pub fn load(
        partname: PackURI,
        content_type: impl Into<String>,
        srels: &[SerializedRelationship],
        part_dict: &PartDict,
    ) -> Result<Self> {
        let rels = load_rels(srels, part_dict, partname.as_str())?;
        Ok(Self {
            partname,
            content_type: content_type.into(),
            rels,
        })
    }
}

/// Build a relationship table from serialized relationships.
///
/// Every internal relationship target is looked up in `part_dict`; a target
/// that is not part of the package is an error. `source` only names the
/// owner in error messages.
pub fn load_rels(
    srels: &[SerializedRelationship],
    part_dict: &PartDict,
    source: &str,
) -> Result<Relationships> {
    let mut rels = Relationships::new();
    for srel in srels {
        let target = if srel.is_external() {
            RelTarget::External(srel.target_ref.clone())
        } else {
            let target_partname = srel.target_partname()?;
            part_dict.get(&target_partname).cloned().ok_or_else(|| {
                OpcError::PartNotFound(format!(
                    "{} (target of {} in {})",
                    target_partname, srel.r_id, source
                ))
            })?
        };
        rels.add_relationship(srel.r_id.clone(), RelType::from_uri(&srel.reltype), target)?;
    }
    Ok(rels)
}

/// Trait representing a part in an OPC package.
///
/// Implementors expose their `BasePart` and serialize their own content;
/// naming and relationship bookkeeping come from the provided methods.
pub trait Part {
    /// Shared part state.
    fn base(&self) -> &BasePart;

    /// Mutable shared part state.
    fn base_mut(&mut self) -> &mut BasePart;

    /// Serialized content of this part, as written to the package.
    fn blob(&self) -> Result<Cow<'_, [u8]>>;

    /// Get the partname of this part.
    #[inline]
    fn partname(&self) -> &PackURI {
        &self.base().partname
    }

    /// Rename this part. Uniqueness is the caller's responsibility.
    #[inline]
    fn set_partname(&mut self, partname: PackURI) {
        self.base_mut().partname = partname;
    }

    /// Get the content type of this part.
    #[inline]
    fn content_type(&self) -> &str {
        &self.base().content_type
    }

    /// Get the relationships for this part.
    #[inline]
    fn rels(&self) -> &Relationships {
        &self.base().rels
    }

    /// Get mutable access to the relationships for this part.
    #[inline]
    fn rels_mut(&mut self) -> &mut Relationships {
        &mut self.base_mut().rels
    }

    /// Add or get a relationship to another part.
    ///
    /// If a relationship of the given type to the target already exists it
    /// is returned, otherwise one is created under the next free rId.
    fn relate_to(&mut self, target: RelTarget, reltype: RelType) -> &Relationship {
        self.rels_mut().get_or_add(reltype, target)
    }

    /// Get the target of a relationship by rId.
    fn target(&self, r_id: &str) -> Result<&RelTarget> {
        self.rels()
            .get(r_id)
            .map(Relationship::target)
            .ok_or_else(|| {
                OpcError::RelationshipNotFound(format!("{} in {}", r_id, self.partname()))
            })
    }
}

/// A binary part this crate carries without interpreting.
#[derive(Debug, Clone)]
pub struct BlobPart {
    base: BasePart,
    blob: Vec<u8>,
}

impl BlobPart {
    /// Create a BlobPart from loaded state and raw content.
    pub fn new(base: BasePart, blob: Vec<u8>) -> Self {
        Self { base, blob }
    }
}

impl Part for BlobPart {
    fn base(&self) -> &BasePart {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BasePart {
        &mut self.base
    }

    fn blob(&self) -> Result<Cow<'_, [u8]>> {
        Ok(Cow::Borrowed(&self.blob))
    }
}

/// An XML part this crate carries without interpreting (themes, properties).
#[derive(Debug, Clone)]
pub struct XmlPart {
    base: BasePart,
    xml_bytes: Vec<u8>,
}

impl XmlPart {
    /// Create an XmlPart, validating that the content is UTF-8.
    pub fn load(base: BasePart, xml_bytes: Vec<u8>) -> Result<Self> {
        std::str::from_utf8(&xml_bytes)
            .map_err(|e| OpcError::XmlError(format!("Invalid UTF-8 in {}: {}", base.partname, e)))?;
        Ok(Self { base, xml_bytes })
    }

    /// Get the XML content as a UTF-8 string.
    pub fn xml_str(&self) -> Result<&str> {
        std::str::from_utf8(&self.xml_bytes).map_err(Into::into)
    }

    /// Check if a content type represents XML content.
    #[inline]
    pub fn is_xml_content_type(content_type: &str) -> bool {
        content_type.ends_with("+xml") || content_type.ends_with("/xml")
    }
}

impl Part for XmlPart {
    fn base(&self) -> &BasePart {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BasePart {
        &mut self.base
    }

    fn blob(&self) -> Result<Cow<'_, [u8]>> {
        Ok(Cow::Borrowed(&self.xml_bytes))
    }
}
