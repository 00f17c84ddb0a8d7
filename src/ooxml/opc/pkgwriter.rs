//! Package writer for OPC packages.
//!
//! Serializes an in-memory package back to its members: `[Content_Types].xml`,
//! the package relationships, every part and every part's relationships.
//! Zipping the members is left to the caller.

use crate::common::xml::escape_xml;
use crate::ooxml::opc::constants::{content_type as ct, namespace};
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::package::OpcPackage;
use crate::ooxml::opc::packuri::{CONTENT_TYPES_URI, PACKAGE_URI, PackURI};
use crate::ooxml::opc::rel::Relationships;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

/// Package writer that serializes an OPC package to a member map.
pub struct PackageWriter;

impl PackageWriter {
    /// Serialize `package` to its members, keyed by Zip member name.
    ///
    /// Relationship targets are written relative to the source part's base
    /// URI using each target's partname at the time of the call.
    pub fn to_members<P: OpcPackage + ?Sized>(package: &P) -> Result<BTreeMap<String, Vec<u8>>> {
        let mut members = BTreeMap::new();

        let cti = ContentTypesItem::from_package(package);
        Self::insert_member(
            &mut members,
            CONTENT_TYPES_URI.trim_start_matches('/'),
            cti.to_xml().into_bytes(),
        )?;

        let package_uri = PackURI::new(PACKAGE_URI).map_err(OpcError::InvalidPackUri)?;
        Self::write_rels(&mut members, package, &package_uri, package.rels())?;

        for part in package.parts() {
            let blob = part.blob()?;
            Self::insert_member(&mut members, part.partname().membername(), blob.into_owned())?;

            if !part.rels().is_empty() {
                Self::write_rels(&mut members, package, part.partname(), part.rels())?;
            }
        }

        tracing::debug!(members = members.len(), "serialized package");
        Ok(members)
    }

    fn write_rels<P: OpcPackage + ?Sized>(
        members: &mut BTreeMap<String, Vec<u8>>,
        package: &P,
        source: &PackURI,
        rels: &Relationships,
    ) -> Result<()> {
        let base_uri = source.base_uri();
        let xml = rels.to_xml(|target| {
            package
                .target_partname(target)
                .map(|partname| partname.relative_ref(base_uri))
        })?;

        let rels_uri = source.rels_uri().map_err(OpcError::InvalidPackUri)?;
        Self::insert_member(members, rels_uri.membername(), xml.into_bytes())
    }

    /// Add a member, refusing to replace one already written.
    fn insert_member(
        members: &mut BTreeMap<String, Vec<u8>>,
        name: &str,
        bytes: Vec<u8>,
    ) -> Result<()> {
        match members.entry(name.to_string()) {
            Entry::Occupied(_) => Err(OpcError::DuplicatePartname(format!("/{}", name))),
            Entry::Vacant(slot) => {
                slot.insert(bytes);
                Ok(())
            },
        }
    }
}

/// Helper for building [Content_Types].xml content.
///
/// Manages Default and Override elements for content type mapping.
struct ContentTypesItem {
    /// Default content types by extension
    defaults: BTreeMap<String, String>,

    /// Override content types by partname
    overrides: BTreeMap<String, String>,
}

impl ContentTypesItem {
    fn new() -> Self {
        let mut defaults = BTreeMap::new();
        defaults.insert("rels".to_string(), ct::OPC_RELATIONSHIPS.to_string());
        defaults.insert("xml".to_string(), ct::XML.to_string());

        Self {
            defaults,
            overrides: BTreeMap::new(),
        }
    }

    fn from_package<P: OpcPackage + ?Sized>(package: &P) -> Self {
        let mut cti = Self::new();
        for part in package.parts() {
            cti.add_content_type(part.partname(), part.content_type());
        }
        cti
    }

    /// Use a Default when the extension/content type pair is well known,
    /// otherwise an Override for the specific partname.
    fn add_content_type(&mut self, partname: &PackURI, content_type: &str) {
        let ext = partname.ext().to_lowercase();

        if Self::is_default_content_type(&ext, content_type) {
            self.defaults.insert(ext, content_type.to_string());
        } else {
            self.overrides
                .insert(partname.to_string(), content_type.to_string());
        }
    }

    fn is_default_content_type(ext: &str, content_type: &str) -> bool {
        matches!(
            (ext, content_type),
            ("rels", ct::OPC_RELATIONSHIPS)
                | ("xml", ct::XML)
                | ("png", ct::PNG)
                | ("jpg", ct::JPEG)
                | ("jpeg", ct::JPEG)
                | ("gif", ct::GIF)
                | ("bmp", ct::BMP)
                | ("tif", ct::TIFF)
                | ("tiff", ct::TIFF)
        )
    }

    fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(256 + self.overrides.len() * 160);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(r#"<Types xmlns=""#);
        xml.push_str(namespace::OPC_CONTENT_TYPES);
        xml.push_str(r#"">"#);
        xml.push('\n');

        for (ext, content_type) in &self.defaults {
            xml.push_str(&format!(
                r#"  <Default Extension="{}" ContentType="{}"/>"#,
                escape_xml(ext),
                escape_xml(content_type)
            ));
            xml.push('\n');
        }

        for (partname, content_type) in &self.overrides {
            xml.push_str(&format!(
                r#"  <Override PartName="{}" ContentType="{}"/>"#,
                escape_xml(partname),
                escape_xml(content_type)
            ));
            xml.push('\n');
        }

        xml.push_str("</Types>");

        xml
    }
}
