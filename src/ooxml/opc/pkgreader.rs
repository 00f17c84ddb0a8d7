//! Low-level, read-only view of a serialized OPC package.
//!
//! The physical container is represented by its members: a map from Zip member
//! name to bytes. `PackageReader` parses `[Content_Types].xml` and the `.rels`
//! files, then walks the relationship graph from the package relationships to
//! collect every reachable part with its serialized relationships.

use crate::ooxml::opc::constants::target_mode;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::{CONTENT_TYPES_URI, PACKAGE_URI, PackURI};
use quick_xml::Reader;
use quick_xml::events::Event;
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet, VecDeque};

/// Serialized part with its content and relationships.
///
/// Represents a part as read from the member map, before it is turned into a
/// typed part object.
#[derive(Debug)]
pub struct SerializedPart {
    /// The partname (URI) of this part
    pub partname: PackURI,

    /// The content type of this part
    pub content_type: String,

    /// The relationship type that first referred to this part
    pub reltype: String,

    /// The binary content of this part
    pub blob: Vec<u8>,

    /// Serialized relationships from this part, in `.rels` file order
    pub srels: SmallVec<[SerializedRelationship; 8]>,
}

/// Serialized relationship as read from a .rels file.
#[derive(Debug, Clone)]
pub struct SerializedRelationship {
    /// Base URI for resolving relative references
    pub base_uri: String,

    /// Relationship ID (e.g., "rId1")
    pub r_id: String,

    /// Relationship type URI
    pub reltype: String,

    /// Target reference (relative URI or external URL)
    pub target_ref: String,

    /// Target mode (Internal or External)
    pub target_mode: String,
}

impl SerializedRelationship {
    /// Check if this is an external relationship.
    #[inline]
    pub fn is_external(&self) -> bool {
        self.target_mode == target_mode::EXTERNAL
    }

    /// Resolve the relative target reference against the base URI.
    pub fn target_partname(&self) -> Result<PackURI> {
        if self.is_external() {
            return Err(OpcError::InvalidRelationship(
                "Cannot get target_partname for external relationship".to_string(),
            ));
        }
        PackURI::from_rel_ref(&self.base_uri, &self.target_ref).map_err(OpcError::InvalidPackUri)
    }
}

/// Content type lookup built from `[Content_Types].xml`.
///
/// An `Override` for the exact partname wins over a `Default` for the
/// partname's extension.
struct ContentTypeMap {
    /// Lower-cased extension to content type
    defaults: HashMap<String, String>,

    /// Partname to content type
    overrides: HashMap<String, String>,
}

impl ContentTypeMap {
    fn from_xml(xml: &[u8]) -> Result<Self> {
        let mut map = Self {
            defaults: HashMap::new(),
            overrides: HashMap::new(),
        };
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    let key_attr: &[u8] = match e.local_name().as_ref() {
                        b"Default" => b"Extension",
                        b"Override" => b"PartName",
                        _ => b"",
                    };
                    if key_attr.is_empty() {
                        buf.clear();
                        continue;
                    }

                    let mut key = None;
                    let mut content_type = None;
                    for attr in e.attributes() {
                        let attr = attr?;
                        if attr.key.as_ref() == key_attr {
                            key = Some(attr.unescape_value()?.to_string());
                        } else if attr.key.as_ref() == b"ContentType" {
                            content_type = Some(attr.unescape_value()?.to_string());
                        }
                    }

                    if let (Some(key), Some(ct)) = (key, content_type) {
                        if key_attr == b"Extension" {
                            map.defaults.insert(key.to_lowercase(), ct);
                        } else {
                            map.overrides.insert(key, ct);
                        }
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(OpcError::XmlError(format!(
                        "Content types parse error: {}",
                        e
                    )));
                },
                _ => {},
            }
            buf.clear();
        }

        Ok(map)
    }

    fn get(&self, pack_uri: &PackURI) -> Result<String> {
        if let Some(ct) = self.overrides.get(pack_uri.as_str()) {
            return Ok(ct.clone());
        }

        self.defaults
            .get(&pack_uri.ext().to_lowercase())
            .cloned()
            .ok_or_else(|| OpcError::ContentTypeNotFound(pack_uri.to_string()))
    }
}

/// Parse a `.rels` document into serialized relationships, in file order.
pub fn parse_rels_xml(
    rels_xml: &[u8],
    base_uri: &str,
) -> Result<SmallVec<[SerializedRelationship; 8]>> {
    let mut srels = SmallVec::new();
    let mut reader = Reader::from_reader(rels_xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                if e.local_name().as_ref() == b"Relationship" {
                    let mut r_id = None;
                    let mut reltype = None;
                    let mut target_ref = None;
                    let mut target_mode = target_mode::INTERNAL.to_string();

                    for attr in e.attributes() {
                        let attr = attr?;
                        match attr.key.as_ref() {
                            b"Id" => r_id = Some(attr.unescape_value()?.to_string()),
                            b"Type" => reltype = Some(attr.unescape_value()?.to_string()),
                            b"Target" => target_ref = Some(attr.unescape_value()?.to_string()),
                            b"TargetMode" => target_mode = attr.unescape_value()?.to_string(),
                            _ => {},
                        }
                    }

                    match (r_id, reltype, target_ref) {
                        (Some(r_id), Some(reltype), Some(target_ref)) => {
                            srels.push(SerializedRelationship {
                                base_uri: base_uri.to_string(),
                                r_id,
                                reltype,
                                target_ref,
                                target_mode,
                            });
                        },
                        _ => {
                            return Err(OpcError::InvalidRelationship(format!(
                                "Relationship element under {} is missing Id, Type or Target",
                                base_uri
                            )));
                        },
                    }
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(OpcError::XmlError(format!("Rels parse error: {}", e))),
            _ => {},
        }
        buf.clear();
    }

    Ok(srels)
}

/// Package reader that provides access to serialized parts and relationships.
pub struct PackageReader {
    /// Package-level relationships
    pkg_srels: SmallVec<[SerializedRelationship; 8]>,

    /// All serialized parts reachable from the package relationships
    sparts: Vec<SerializedPart>,
}

impl PackageReader {
    /// Read a package from its member map (Zip member name to bytes).
    ///
    /// Members not reachable through relationships are ignored, which is how
    /// `.rels` files and `[Content_Types].xml` itself drop out.
    pub fn from_members(mut members: HashMap<String, Vec<u8>>) -> Result<Self> {
        let content_types_xml = members
            .get(CONTENT_TYPES_URI.trim_start_matches('/'))
            .ok_or_else(|| OpcError::PartNotFound("[Content_Types].xml".to_string()))?;
        let content_types = ContentTypeMap::from_xml(content_types_xml)?;

        let package_uri = PackURI::new(PACKAGE_URI).map_err(OpcError::InvalidPackUri)?;
        let pkg_srels = Self::load_rels(&members, &package_uri)?;

        let sparts = Self::load_parts(&mut members, &pkg_srels, &content_types)?;
        tracing::debug!(parts = sparts.len(), "read serialized package");

        Ok(Self { pkg_srels, sparts })
    }

    fn load_rels(
        members: &HashMap<String, Vec<u8>>,
        source_uri: &PackURI,
    ) -> Result<SmallVec<[SerializedRelationship; 8]>> {
        let rels_uri = source_uri.rels_uri().map_err(OpcError::InvalidPackUri)?;

        match members.get(rels_uri.membername()) {
            Some(xml) => parse_rels_xml(xml, source_uri.base_uri()),
            None => Ok(SmallVec::new()),
        }
    }

    /// Walk the relationship graph breadth-first, in relationship order.
    ///
    /// Takes ownership of each part's bytes out of the member map.
    fn load_parts(
        members: &mut HashMap<String, Vec<u8>>,
        pkg_srels: &[SerializedRelationship],
        content_types: &ContentTypeMap,
    ) -> Result<Vec<SerializedPart>> {
        let mut sparts = Vec::with_capacity(32);
        let mut visited: HashSet<PackURI> = HashSet::with_capacity(32);
        let mut queue: VecDeque<(PackURI, String)> = VecDeque::with_capacity(pkg_srels.len());

        for srel in pkg_srels.iter().filter(|srel| !srel.is_external()) {
            let partname = srel.target_partname()?;
            if visited.insert(partname.clone()) {
                queue.push_back((partname, srel.reltype.clone()));
            }
        }

        while let Some((partname, reltype)) = queue.pop_front() {
            let srels = Self::load_rels(members, &partname)?;

            for child in srels.iter().filter(|srel| !srel.is_external()) {
                let child_partname = child.target_partname()?;
                if visited.insert(child_partname.clone()) {
                    queue.push_back((child_partname, child.reltype.clone()));
                }
            }

            let blob = members
                .remove(partname.membername())
                .ok_or_else(|| OpcError::PartNotFound(partname.to_string()))?;
            let content_type = content_types.get(&partname)?;

            sparts.push(SerializedPart {
                partname,
                content_type,
                reltype,
                blob,
                srels,
            });
        }

        Ok(sparts)
    }

    /// Get an iterator over all serialized parts.
    pub fn iter_sparts(&self) -> impl Iterator<Item = &SerializedPart> {
        self.sparts.iter()
    }

    /// Get package-level relationships.
    pub fn pkg_srels(&self) -> &[SerializedRelationship] {
        &self.pkg_srels
    }

    /// Take ownership of package-level relationships and parts.
    pub fn into_parts(self) -> (SmallVec<[SerializedRelationship; 8]>, Vec<SerializedPart>) {
        (self.pkg_srels, self.sparts)
    }
}
