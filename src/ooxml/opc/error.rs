//! Errors raised while reading, resolving and writing package parts.
use quick_xml::events::attributes::AttrError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpcError {
    /// A partname or relationship target that is not a valid pack URI
    #[error("Invalid pack URI: {0}")]
    InvalidPackUri(String),

    /// A member or arena part that a relationship or content type names is missing
    #[error("Part not found: {0}")]
    PartNotFound(String),

    /// Two parts would be written to the same Zip member
    #[error("Duplicate partname: {0}")]
    DuplicatePartname(String),

    #[error("Relationship not found: {0}")]
    RelationshipNotFound(String),

    /// `[Content_Types].xml` has neither a Default nor an Override for the partname
    #[error("No content type for partname: {0}")]
    ContentTypeNotFound(String),

    /// Duplicate rId, external target where a part is required, or an
    /// unparseable relationship entry
    #[error("Invalid relationship: {0}")]
    InvalidRelationship(String),

    #[error("XML parsing error: {0}")]
    XmlError(String),

    #[error("Quick-XML error: {0}")]
    QuickXmlError(#[from] quick_xml::Error),

    #[error("UTF-8 conversion error: {0}")]
    Utf8Error(#[from] std::str::Utf8Error),

    #[error("Attribute error: {0}")]
    AttrError(String),
}

impl From<AttrError> for OpcError {
    fn from(err: AttrError) -> Self {
        OpcError::AttrError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, OpcError>;
