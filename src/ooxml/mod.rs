//! Office Open XML (OOXML) format implementation.
//!
//! This module provides loading, manipulation and saving of PowerPoint
//! (.pptx) packages at the level of their part graph: the presentation part,
//! slides, slide layouts, slide masters and images, tied together by
//! relationships.
//!
//! The implementation is based on the Open Packaging Conventions (OPC).
//!
//! # Architecture
//!
//! The module is organized into several layers:
//!
//! 1. **OPC Layer** (`opc`): Low-level package handling (members, parts, relationships)
//! 2. **XML Layer** (`oxml`): A small owned element tree for part content
//! 3. **PresentationML** (`pptx`): Typed parts, the part arena and the presentation API
//!
//! # Example
//!
//! ```rust
//! use slidekit::ooxml::pptx::Presentation;
//!
//! let mut pres = Presentation::new()?;
//! let layout = pres.slide_layout_by_name("Title and Content")?.unwrap();
//! pres.slides_mut()?.add_slide(layout)?;
//! assert_eq!(pres.slides()?.len(), 1);
//! # Ok::<(), slidekit::ooxml::OoxmlError>(())
//! ```
pub mod error;
pub mod opc;
pub mod oxml;
pub mod pptx;

// Re-export commonly used types from OPC layer
pub use opc::{OpcPackage, PackURI};

// Re-export error types
pub use error::{OoxmlError, Result};
