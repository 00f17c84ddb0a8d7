//! XML text helpers shared by the part serializers.

pub mod escape;

pub use escape::{escape_xml, resolve_entity};
