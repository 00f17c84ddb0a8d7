//! Relationship-related objects for OPC packages.
//!
//! A relationship is a typed, identified edge from a source part to a target.
//! Internal targets are arena handles rather than partname strings, so an edge
//! keeps pointing at the same part when that part is renamed; the relative
//! target reference is only computed when the `.rels` XML is written.

use crate::common::xml::escape_xml;
use crate::ooxml::opc::constants::namespace;
use crate::ooxml::opc::constants::relationship_type as rt;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::part::{ImageId, PartId};
use std::fmt;

/// Relationship type, as a closed set of the types this crate acts on.
///
/// Types the crate does not interpret are carried verbatim in `Other` so they
/// survive a load/save cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RelType {
    OfficeDocument,
    Slide,
    SlideLayout,
    SlideMaster,
    Image,
    Theme,
    Other(String),
}

impl RelType {
    /// Map a relationship type URI onto a variant.
    pub fn from_uri(uri: &str) -> Self {
        match uri {
            rt::OFFICE_DOCUMENT => RelType::OfficeDocument,
            rt::SLIDE => RelType::Slide,
            rt::SLIDE_LAYOUT => RelType::SlideLayout,
            rt::SLIDE_MASTER => RelType::SlideMaster,
            rt::IMAGE => RelType::Image,
            rt::THEME => RelType::Theme,
            other => RelType::Other(other.to_string()),
        }
    }

    /// The relationship type URI written to `.rels` files.
    pub fn as_uri(&self) -> &str {
        match self {
            RelType::OfficeDocument => rt::OFFICE_DOCUMENT,
            RelType::Slide => rt::SLIDE,
            RelType::SlideLayout => rt::SLIDE_LAYOUT,
            RelType::SlideMaster => rt::SLIDE_MASTER,
            RelType::Image => rt::IMAGE,
            RelType::Theme => rt::THEME,
            RelType::Other(uri) => uri,
        }
    }
}

impl fmt::Display for RelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_uri())
    }
}

/// What a relationship points at.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RelTarget {
    /// A part stored in the package arena
    Part(PartId),
    /// An image part stored in the package image registry
    Image(ImageId),
    /// An external resource, kept as its URL
    External(String),
}

impl RelTarget {
    #[inline]
    pub fn is_external(&self) -> bool {
        matches!(self, RelTarget::External(_))
    }

    /// The arena handle, if this is an internal non-image target.
    #[inline]
    pub fn part_id(&self) -> Option<PartId> {
        match self {
            RelTarget::Part(id) => Some(*id),
            _ => None,
        }
    }
}

/// A single relationship from a source part to a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1", "rId2")
    r_id: String,

    /// Relationship type
    reltype: RelType,

    /// Relationship target
    target: RelTarget,
}

impl Relationship {
    /// Create a new relationship.
    pub fn new(r_id: String, reltype: RelType, target: RelTarget) -> Self {
        Self {
            r_id,
            reltype,
            target,
        }
    }

    /// Get the relationship ID.
    #[inline]
    pub fn r_id(&self) -> &str {
        &self.r_id
    }

    /// Get the relationship type.
    #[inline]
    pub fn reltype(&self) -> &RelType {
        &self.reltype
    }

    /// Get the relationship target.
    #[inline]
    pub fn target(&self) -> &RelTarget {
        &self.target
    }

    /// Check if this is an external relationship.
    #[inline]
    pub fn is_external(&self) -> bool {
        self.target.is_external()
    }
}

/// The relationship table of a single source part.
///
/// Relationships are kept in table order: the order they were read from the
/// `.rels` file, followed by the order they were added. Resolution passes
/// rely on that order.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    rels: Vec<Relationship>,
}

impl Relationships {
    /// Create a new empty relationships collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a relationship with a known rId, as read from a `.rels` file.
    ///
    /// Fails if the rId is already present in this table.
    pub fn add_relationship(
        &mut self,
        r_id: String,
        reltype: RelType,
        target: RelTarget,
    ) -> Result<&Relationship> {
        if self.get(&r_id).is_some() {
            return Err(OpcError::InvalidRelationship(format!(
                "duplicate relationship id '{}'",
                r_id
            )));
        }
        self.rels.push(Relationship::new(r_id, reltype, target));
        Ok(&self.rels[self.rels.len() - 1])
    }

    /// Get a relationship by its ID.
    #[inline]
    pub fn get(&self, r_id: &str) -> Option<&Relationship> {
        self.rels.iter().find(|rel| rel.r_id == r_id)
    }

    /// Get the relationship of `reltype` to `target`, adding it under the next
    /// free rId if it does not exist yet.
    pub fn get_or_add(&mut self, reltype: RelType, target: RelTarget) -> &Relationship {
        let pos = match self
            .rels
            .iter()
            .position(|rel| rel.reltype == reltype && rel.target == target)
        {
            Some(pos) => pos,
            None => {
                let r_id = self.next_r_id();
                self.rels.push(Relationship::new(r_id, reltype, target));
                self.rels.len() - 1
            },
        };
        &self.rels[pos]
    }

    /// Get the next available relationship ID.
    ///
    /// Generates IDs in the format "rId1", "rId2", etc., using the lowest
    /// number not already taken.
    fn next_r_id(&self) -> String {
        let mut used: Vec<u32> = self
            .rels
            .iter()
            .filter_map(|rel| rel.r_id.strip_prefix("rId"))
            .filter_map(|num| atoi_simd::parse::<u32>(num.as_bytes()).ok())
            .collect();
        used.sort_unstable();
        used.dedup();

        let mut next_num = 1u32;
        for num in used {
            if num != next_num {
                break;
            }
            next_num += 1;
        }

        format!("rId{}", next_num)
    }

    /// First relationship of `reltype` in table order.
    pub fn first_of_type(&self, reltype: &RelType) -> Option<&Relationship> {
        self.rels.iter().find(|rel| &rel.reltype == reltype)
    }

    /// All relationships of `reltype`, in table order.
    pub fn iter_of_type<'a>(
        &'a self,
        reltype: &'a RelType,
    ) -> impl Iterator<Item = &'a Relationship> + 'a {
        self.rels.iter().filter(move |rel| &rel.reltype == reltype)
    }

    /// Get an iterator over all relationships in table order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.rels.iter()
    }

    /// Get the number of relationships in the collection.
    #[inline]
    pub fn len(&self) -> usize {
        self.rels.len()
    }

    /// Check if the collection is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rels.is_empty()
    }

    /// Remove a relationship by its ID.
    pub fn remove(&mut self, r_id: &str) -> Option<Relationship> {
        let pos = self.rels.iter().position(|rel| rel.r_id == r_id)?;
        Some(self.rels.remove(pos))
    }

    /// Serialize the table to `.rels` XML.
    ///
    /// `target_ref` turns an internal target into the reference written in
    /// the `Target` attribute, normally the target's current partname
    /// relative to the source part's base URI.
    pub fn to_xml<F>(&self, mut target_ref: F) -> Result<String>
    where
        F: FnMut(&RelTarget) -> Result<String>,
    {
        let mut xml = String::with_capacity(256 + self.rels.len() * 160);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(r#"<Relationships xmlns=""#);
        xml.push_str(namespace::OPC_RELATIONSHIPS);
        xml.push_str(r#"">"#);
        xml.push('\n');

        for rel in &self.rels {
            let (target, target_mode) = match &rel.target {
                RelTarget::External(url) => (url.clone(), r#" TargetMode="External""#),
                internal => (target_ref(internal)?, ""),
            };

            xml.push_str(&format!(
                r#"  <Relationship Id="{}" Type="{}" Target="{}"{}/>"#,
                escape_xml(rel.r_id()),
                escape_xml(rel.reltype().as_uri()),
                escape_xml(&target),
                target_mode
            ));
            xml.push('\n');
        }

        xml.push_str("</Relationships>");

        Ok(xml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reltype_uri_round_trip() {
        for reltype in [
            RelType::OfficeDocument,
            RelType::Slide,
            RelType::SlideLayout,
            RelType::SlideMaster,
            RelType::Image,
            RelType::Theme,
        ] {
            assert_eq!(RelType::from_uri(reltype.as_uri()), reltype);
        }

        let custom = "http://example.com/rel/custom";
        assert_eq!(
            RelType::from_uri(custom),
            RelType::Other(custom.to_string())
        );
    }

    #[test]
    fn test_next_r_id_fills_gaps() {
        let mut rels = Relationships::new();
        assert_eq!(rels.next_r_id(), "rId1");

        rels.add_relationship("rId1".into(), RelType::Theme, RelTarget::Part(PartId::new(0)))
            .unwrap();
        rels.add_relationship("rId3".into(), RelType::Theme, RelTarget::Part(PartId::new(1)))
            .unwrap();
        assert_eq!(rels.next_r_id(), "rId2");
    }

    #[test]
    fn test_get_or_add_reuses_matching() {
        let mut rels = Relationships::new();
        let layout = RelTarget::Part(PartId::new(4));

        let first = rels.get_or_add(RelType::SlideLayout, layout.clone()).r_id().to_string();
        let again = rels.get_or_add(RelType::SlideLayout, layout).r_id().to_string();
        assert_eq!(first, "rId1");
        assert_eq!(again, "rId1");

        let other = rels
            .get_or_add(RelType::SlideLayout, RelTarget::Part(PartId::new(5)))
            .r_id()
            .to_string();
        assert_eq!(other, "rId2");
        assert_eq!(rels.len(), 2);
    }

    #[test]
    fn test_duplicate_r_id_rejected() {
        let mut rels = Relationships::new();
        rels.add_relationship("rId1".into(), RelType::Slide, RelTarget::Part(PartId::new(0)))
            .unwrap();
        assert!(
            rels.add_relationship("rId1".into(), RelType::Slide, RelTarget::Part(PartId::new(1)))
                .is_err()
        );
    }

    #[test]
    fn test_table_order_is_preserved() {
        let mut rels = Relationships::new();
        for (r_id, idx) in [("rId7", 2), ("rId2", 1), ("rId5", 3)] {
            rels.add_relationship(r_id.into(), RelType::SlideLayout, RelTarget::Part(PartId::new(idx)))
                .unwrap();
        }
        let order: Vec<&str> = rels.iter_of_type(&RelType::SlideLayout).map(|r| r.r_id()).collect();
        assert_eq!(order, ["rId7", "rId2", "rId5"]);
        assert_eq!(rels.first_of_type(&RelType::SlideLayout).unwrap().r_id(), "rId7");
        assert!(rels.first_of_type(&RelType::SlideMaster).is_none());
    }

    #[test]
    fn test_to_xml() {
        let mut rels = Relationships::new();
        rels.get_or_add(RelType::SlideLayout, RelTarget::Part(PartId::new(0)));
        rels.get_or_add(
            RelType::Other("http://example.com/hyperlink".into()),
            RelTarget::External("https://example.com/?a=1&b=2".into()),
        );

        let xml = rels
            .to_xml(|_| Ok("../slideLayouts/slideLayout1.xml".to_string()))
            .unwrap();
        assert!(xml.contains(r#"Id="rId1""#));
        assert!(xml.contains(r#"Target="../slideLayouts/slideLayout1.xml""#));
        assert!(xml.contains(r#"Target="https://example.com/?a=1&amp;b=2" TargetMode="External""#));
    }
}
