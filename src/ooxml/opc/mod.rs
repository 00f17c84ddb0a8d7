//! Open Packaging Conventions (OPC) implementation.
//!
//! The packaging layer underneath PresentationML: partnames, typed
//! relationships between parts, content types, and reading and writing a
//! package from and to its member map.
//!
//! - Relationship targets are handles into the owning package, so renaming a
//!   part never invalidates the edges pointing at it.
//! - Uses `quick-xml` for `.rels` and `[Content_Types].xml` parsing and
//!   `atoi_simd` / `itoa` for partname sequence numbers.

pub mod constants;
pub mod error;
pub mod package;
pub mod packuri;
pub mod part;
pub mod pkgreader;
pub mod pkgwriter;
pub mod rel;

// Re-export commonly used types
pub use error::{OpcError, Result};
pub use package::OpcPackage;
pub use packuri::PackURI;
pub use part::{BasePart, BlobPart, ImageId, Part, PartDict, PartId, XmlPart, load_rels};
pub use pkgreader::{PackageReader, SerializedPart, SerializedRelationship};
pub use pkgwriter::PackageWriter;
pub use rel::{RelTarget, RelType, Relationship, Relationships};
