//! Presentation part - the main part in a .pptx package.
//!
//! Corresponds to `/ppt/presentation.xml` in the package.
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::namespace;
use crate::ooxml::opc::part::{BasePart, Part, PartDict};
use crate::ooxml::opc::pkgreader::SerializedPart;
use crate::ooxml::oxml::{Element, local_name};
use std::borrow::Cow;
use std::collections::HashSet;

/// Lowest id PowerPoint accepts for a `p:sldId`.
pub const MIN_SLIDE_ID: u32 = 256;

/// Highest id `ST_SlideId` allows.
pub const MAX_SLIDE_ID: u32 = 2_147_483_647;

/// Children of `p:presentation` that precede `p:sldIdLst`.
const SLD_ID_LST_PREDECESSORS: [&str; 3] =
    ["sldMasterIdLst", "notesMasterIdLst", "handoutMasterIdLst"];

/// Value of the relationship id attribute (`r:id`, whatever the prefix).
fn relationship_id(element: &Element) -> Option<&str> {
    element
        .attrs()
        .find(|(key, _)| key.contains(':') && !key.starts_with("xmlns") && local_name(key) == "id")
        .map(|(_, value)| value)
}

/// Prefix `root` binds to the office relationships namespace.
fn relationships_prefix(root: &Element) -> Option<&str> {
    root.attrs()
        .filter(|(_, value)| *value == namespace::OFC_RELATIONSHIPS)
        .find_map(|(key, _)| key.strip_prefix("xmlns:"))
}

/// One `p:sldId` entry: the slide's persistent id and the rId of the
/// presentation's relationship to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideId {
    pub id: u32,
    pub r_id: String,
}

/// The ordered slide id list (`p:sldIdLst`). Its order is slide order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlideIdList {
    entries: Vec<SlideId>,
}

impl SlideIdList {
    /// Read the `p:sldId` children of a `p:sldIdLst` element.
    pub fn from_element(sld_id_lst: &Element) -> Result<Self> {
        let entries = sld_id_lst
            .find_all("sldId")
            .map(|sld_id| -> Result<SlideId> {
                let id = sld_id
                    .attr("id")
                    .and_then(|id| atoi_simd::parse::<u32>(id.as_bytes()).ok())
                    .ok_or_else(|| OoxmlError::InvalidFormat("p:sldId without a numeric id".into()))?;
                let r_id = relationship_id(sld_id)
                    .ok_or_else(|| OoxmlError::InvalidFormat(format!("p:sldId {} has no r:id", id)))?;
                Ok(SlideId {
                    id,
                    r_id: r_id.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { entries })
    }

    /// Append an entry for `r_id` with the next free id and return that id.
    pub fn add_sld_id(&mut self, r_id: impl Into<String>) -> Result<u32> {
        let id = self.next_id()?;
        self.entries.push(SlideId {
            id,
            r_id: r_id.into(),
        });
        Ok(id)
    }

    /// One more than the largest id in use, never below 256.
    ///
    /// Once the largest id reaches 2147483647 the lowest unused id is taken
    /// instead, and an exhausted range is an error.
    pub fn next_id(&self) -> Result<u32> {
        match self.entries.iter().map(|entry| entry.id).max() {
            None => Ok(MIN_SLIDE_ID),
            Some(max) if max < MAX_SLIDE_ID => Ok((max + 1).max(MIN_SLIDE_ID)),
            Some(_) => {
                let used: HashSet<u32> = self.entries.iter().map(|entry| entry.id).collect();
                (MIN_SLIDE_ID..=MAX_SLIDE_ID)
                    .find(|id| !used.contains(id))
                    .ok_or_else(|| OoxmlError::InvalidFormat("no free p:sldId id left".into()))
            },
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SlideId> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SlideId> {
        self.entries.iter()
    }

    /// Build `sldIdLst` with the presentation's own prefix `p` and the
    /// relationships prefix `r`.
    fn to_element(&self, p: &str, r: &str) -> Element {
        let mut lst = Element::new(format!("{}:sldIdLst", p));
        let r_id_attr = format!("{}:id", r);
        let mut buf = itoa::Buffer::new();
        for entry in &self.entries {
            lst.push(
                Element::new(format!("{}:sldId", p))
                    .with_attr("id", buf.format(entry.id))
                    .with_attr(r_id_attr.as_str(), entry.r_id.as_str()),
            );
        }
        lst
    }
}

/// The main presentation part.
///
/// Holds the presentation-level properties and the slide id list; the
/// relationships to slides and slide masters live in its relationship table.
#[derive(Debug, Clone)]
pub struct PresentationPart {
    base: BasePart,
    element: Element,
    sld_id_lst: SlideIdList,
}

impl PresentationPart {
    /// Load the presentation part; the slide id list is lifted out of the
    /// element and written back on save.
    pub fn load(spart: &SerializedPart, part_dict: &PartDict) -> Result<Self> {
        let base = BasePart::load(
            spart.partname.clone(),
            spart.content_type.as_str(),
            &spart.srels,
            part_dict,
        )?;
        let mut element = Element::parse(&spart.blob)?;

        let sld_id_lst = match element.find("sldIdLst") {
            Some(lst) => SlideIdList::from_element(lst)?,
            None => SlideIdList::default(),
        };
        element.remove_all("sldIdLst");

        tracing::debug!(partname = %spart.partname, slides = sld_id_lst.len(), "loaded presentation part");
        Ok(Self {
            base,
            element,
            sld_id_lst,
        })
    }

    #[inline]
    pub fn sld_id_lst(&self) -> &SlideIdList {
        &self.sld_id_lst
    }

    #[inline]
    pub fn sld_id_lst_mut(&mut self) -> &mut SlideIdList {
        &mut self.sld_id_lst
    }

    /// rIds of the slide masters, in `p:sldMasterIdLst` order.
    pub fn slide_master_r_ids(&self) -> Vec<&str> {
        self.element
            .find("sldMasterIdLst")
            .map(|lst| lst.find_all("sldMasterId").filter_map(relationship_id).collect())
            .unwrap_or_default()
    }

    /// Get the slide width in EMUs (English Metric Units).
    ///
    /// Returns None if the slide size is not defined.
    pub fn slide_width(&self) -> Result<Option<i64>> {
        self.slide_size_attr("cx")
    }

    /// Get the slide height in EMUs.
    pub fn slide_height(&self) -> Result<Option<i64>> {
        self.slide_size_attr("cy")
    }

    fn slide_size_attr(&self, name: &str) -> Result<Option<i64>> {
        match self.element.find("sldSz").and_then(|sz| sz.attr(name)) {
            Some(value) => atoi_simd::parse::<i64>(value.as_bytes())
                .map(Some)
                .map_err(|_| OoxmlError::Xml(format!("Invalid slide size {}: '{}'", name, value))),
            None => Ok(None),
        }
    }

    fn to_xml(&self) -> String {
        if self.sld_id_lst.is_empty() {
            return self.element.to_xml_document();
        }

        let mut element = self.element.clone();
        let r = match relationships_prefix(&self.element) {
            Some(prefix) => prefix,
            None => {
                element.set_attr("xmlns:r", namespace::OFC_RELATIONSHIPS);
                "r"
            },
        };
        let p = self
            .element
            .name()
            .split_once(':')
            .map_or("p", |(prefix, _)| prefix);

        let at = SLD_ID_LST_PREDECESSORS
            .iter()
            .filter_map(|local| element.position(local))
            .max()
            .map_or(0, |pos| pos + 1);
        element.insert(at, self.sld_id_lst.to_element(p, r));
        element.to_xml_document()
    }
}

impl Part for PresentationPart {
    fn base(&self) -> &BasePart {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BasePart {
        &mut self.base
    }

    fn blob(&self) -> crate::ooxml::opc::Result<Cow<'_, [u8]>> {
        Ok(Cow::Owned(self.to_xml().into_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::constants::content_type as ct;
    use crate::ooxml::opc::PackURI;
    use smallvec::SmallVec;

    const PRESENTATION_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
  <p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>
  <p:sldIdLst><p:sldId id="256" r:id="rId2"/><p:sldId id="300" r:id="rId3"/></p:sldIdLst>
  <p:sldSz cx="9144000" cy="6858000" type="screen4x3"/>
  <p:notesSz cx="6858000" cy="9144000"/>
</p:presentation>"#;

    fn load(xml: &str) -> PresentationPart {
        let spart = SerializedPart {
            partname: PackURI::new("/ppt/presentation.xml").unwrap(),
            content_type: ct::PML_PRESENTATION_MAIN.to_string(),
            reltype: String::new(),
            blob: xml.as_bytes().to_vec(),
            srels: SmallVec::new(),
        };
        PresentationPart::load(&spart, &PartDict::new()).unwrap()
    }

    #[test]
    fn test_load_reads_slide_ids_and_size() {
        let part = load(PRESENTATION_XML);
        let ids: Vec<(u32, &str)> = part
            .sld_id_lst()
            .iter()
            .map(|s| (s.id, s.r_id.as_str()))
            .collect();
        assert_eq!(ids, [(256, "rId2"), (300, "rId3")]);
        assert_eq!(part.slide_master_r_ids(), ["rId1"]);
        assert_eq!(part.slide_width().unwrap(), Some(9144000));
        assert_eq!(part.slide_height().unwrap(), Some(6858000));
    }

    #[test]
    fn test_next_id() {
        let mut lst = SlideIdList::default();
        assert_eq!(lst.next_id().unwrap(), 256);
        assert_eq!(lst.add_sld_id("rId2").unwrap(), 256);
        assert_eq!(lst.add_sld_id("rId3").unwrap(), 257);

        let part = load(PRESENTATION_XML);
        assert_eq!(part.sld_id_lst().next_id().unwrap(), 301);
    }

    #[test]
    fn test_next_id_stays_within_schema_range() {
        let part = load(&PRESENTATION_XML.replace(r#"id="300""#, r#"id="2147483647""#));
        let mut lst = part.sld_id_lst().clone();
        assert_eq!(lst.next_id().unwrap(), 257);
        assert_eq!(lst.add_sld_id("rId4").unwrap(), 257);
        assert_eq!(lst.add_sld_id("rId5").unwrap(), 258);

        let part = load(&PRESENTATION_XML.replace(r#"id="256""#, r#"id="2147483647""#));
        let ids: Vec<u32> = part.sld_id_lst().iter().map(|s| s.id).collect();
        assert_eq!(ids, [2147483647, 300]);
        assert_eq!(part.sld_id_lst().next_id().unwrap(), 256);
    }

    #[test]
    fn test_sld_id_lst_uses_declared_relationships_prefix() {
        let xml = PRESENTATION_XML
            .replace("xmlns:r=", "xmlns:rel=")
            .replace(" r:id=", " rel:id=");
        let mut part = load(&xml);
        assert_eq!(part.slide_master_r_ids(), ["rId1"]);
        part.sld_id_lst_mut().add_sld_id("rId7").unwrap();

        let written = String::from_utf8(part.blob().unwrap().into_owned()).unwrap();
        assert!(written.contains(r#"<p:sldId id="300" rel:id="rId3"/><p:sldId id="301" rel:id="rId7"/>"#));
        assert!(!written.contains(" r:id="));

        let reloaded = load(&written);
        assert_eq!(reloaded.sld_id_lst().len(), 3);
    }

    #[test]
    fn test_missing_relationships_declaration_is_added() {
        let xml = PRESENTATION_XML
            .replace(r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#, "")
            .replace(r#"<p:sldIdLst><p:sldId id="256" r:id="rId2"/><p:sldId id="300" r:id="rId3"/></p:sldIdLst>"#, "")
            .replace(r#" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships""#, "");
        let mut part = load(&xml);
        part.sld_id_lst_mut().add_sld_id("rId2").unwrap();

        let written = String::from_utf8(part.blob().unwrap().into_owned()).unwrap();
        let root = Element::parse(written.as_bytes()).unwrap();
        assert_eq!(root.attr("xmlns:r"), Some(namespace::OFC_RELATIONSHIPS));
        assert_eq!(root.find_path(&["sldIdLst", "sldId"]).unwrap().attr("r:id"), Some("rId2"));
    }

    #[test]
    fn test_sld_id_lst_written_after_masters() {
        let xml = PRESENTATION_XML.replace(
            r#"<p:sldIdLst><p:sldId id="256" r:id="rId2"/><p:sldId id="300" r:id="rId3"/></p:sldIdLst>"#,
            "",
        );
        let mut part = load(&xml);
        assert!(part.sld_id_lst().is_empty());
        let untouched = String::from_utf8(part.blob().unwrap().into_owned()).unwrap();
        assert!(!untouched.contains("sldIdLst"));

        part.sld_id_lst_mut().add_sld_id("rId7").unwrap();
        let written = String::from_utf8(part.blob().unwrap().into_owned()).unwrap();
        let root = Element::parse(written.as_bytes()).unwrap();
        let order: Vec<&str> = root.child_elements().map(|e| e.local_name()).collect();
        assert_eq!(order, ["sldMasterIdLst", "sldIdLst", "sldSz", "notesSz"]);
        assert!(written.contains(r#"<p:sldIdLst><p:sldId id="256" r:id="rId7"/></p:sldIdLst>"#));
    }

    #[test]
    fn test_invalid_slide_id_entry() {
        let xml = PRESENTATION_XML.replace(r#"id="300""#, r#"id="three""#);
        let spart = SerializedPart {
            partname: PackURI::new("/ppt/presentation.xml").unwrap(),
            content_type: ct::PML_PRESENTATION_MAIN.to_string(),
            reltype: String::new(),
            blob: xml.into_bytes(),
            srels: SmallVec::new(),
        };
        assert!(matches!(
            PresentationPart::load(&spart, &PartDict::new()),
            Err(OoxmlError::InvalidFormat(_))
        ));
    }
}
