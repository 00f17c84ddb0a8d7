//! The package-level view shared by the reader and writer.
//!
//! A concrete package owns its parts however it likes (the PresentationML
//! package keeps them in an arena); `OpcPackage` is the surface the writer
//! needs to serialize it: package relationships, the set of parts, and a way
//! to turn a relationship target back into a partname.

use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::PackURI;
use crate::ooxml::opc::part::Part;
use crate::ooxml::opc::rel::{RelTarget, RelType, Relationships};

/// An in-memory OPC package.
pub trait OpcPackage {
    /// Package-level relationships (`/_rels/.rels`).
    fn rels(&self) -> &Relationships;

    /// Every part in the package, in a stable order.
    fn parts(&self) -> Vec<&dyn Part>;

    /// Current partname of an internal relationship target.
    fn target_partname(&self, target: &RelTarget) -> Result<&PackURI>;

    /// The target of the first package relationship of `reltype`.
    fn part_related_by(&self, reltype: &RelType) -> Result<&RelTarget> {
        self.rels()
            .first_of_type(reltype)
            .map(|rel| rel.target())
            .ok_or_else(|| {
                OpcError::RelationshipNotFound(format!("no package relationship of type {}", reltype))
            })
    }

    /// First partname matching `template` (containing `%d`) not in use.
    ///
    /// Numbering starts at 1, so gaps left by removed parts are reused.
    fn next_partname(&self, template: &str) -> Result<PackURI> {
        let parts = self.parts();
        let mut n = 1u32;
        loop {
            let candidate = PackURI::from_template(template, n).map_err(OpcError::InvalidPackUri)?;
            if !parts.iter().any(|part| part.partname() == &candidate) {
                return Ok(candidate);
            }
            n = n.checked_add(1).ok_or_else(|| {
                OpcError::InvalidPackUri(format!("no free partname for '{}'", template))
            })?;
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::ooxml::opc::constants::content_type as ct;
    use crate::ooxml::opc::part::{BasePart, BlobPart, PartId};

    /// Minimal arena-backed package for exercising the writer.
    pub(crate) struct VecPackage {
        pub(crate) rels: Relationships,
        pub(crate) parts: Vec<BlobPart>,
    }

    impl VecPackage {
        pub(crate) fn new() -> Self {
            Self {
                rels: Relationships::new(),
                parts: Vec::new(),
            }
        }

        pub(crate) fn push(&mut self, partname: &str, content_type: &str, blob: &[u8]) -> PartId {
            let base = BasePart::new(PackURI::new(partname).unwrap(), content_type);
            self.parts.push(BlobPart::new(base, blob.to_vec()));
            PartId::new(self.parts.len() - 1)
        }
    }

    impl OpcPackage for VecPackage {
        fn rels(&self) -> &Relationships {
            &self.rels
        }

        fn parts(&self) -> Vec<&dyn Part> {
            self.parts.iter().map(|p| p as &dyn Part).collect()
        }

        fn target_partname(&self, target: &RelTarget) -> Result<&PackURI> {
            target
                .part_id()
                .and_then(|id| self.parts.get(id.index()))
                .map(|p| p.partname())
                .ok_or_else(|| OpcError::PartNotFound(format!("{:?}", target)))
        }
    }

    #[test]
    fn test_next_partname_fills_gaps() {
        let mut pkg = VecPackage::new();
        pkg.push("/ppt/media/image1.png", ct::PNG, b"a");
        pkg.push("/ppt/media/image3.png", ct::PNG, b"b");

        let next = pkg.next_partname("/ppt/media/image%d.png").unwrap();
        assert_eq!(next.as_str(), "/ppt/media/image2.png");
    }

    #[test]
    fn test_part_related_by() {
        let mut pkg = VecPackage::new();
        let id = pkg.push("/ppt/presentation.xml", ct::PML_PRESENTATION_MAIN, b"<p/>");
        pkg.rels.get_or_add(RelType::OfficeDocument, RelTarget::Part(id));

        let target = pkg.part_related_by(&RelType::OfficeDocument).unwrap();
        assert_eq!(
            pkg.target_partname(target).unwrap().as_str(),
            "/ppt/presentation.xml"
        );
        assert!(pkg.part_related_by(&RelType::Theme).is_err());
    }
}
