//! Slidekit - the slide part graph of PowerPoint (.pptx) packages
//!
//! This library loads a PresentationML package into an in-memory graph of
//! parts, lets you add slides and images, and writes the package back out.
//!
//! # Features
//!
//! - **Part graph**: slides, slide layouts and slide masters resolve their
//!   relationships to each other once, when the package is loaded
//! - **Slide collection**: ordered, indexed access to slides; adding a slide
//!   clones its layout's placeholders and keeps slide partnames contiguous
//! - **Image dedup**: identical image bytes share one image part
//! - **Container agnostic**: packages are read from and written to a map of
//!   Zip member names to bytes
//!
//! # Example - Building a presentation
//!
//! ```rust
//! use slidekit::ooxml::pptx::{ImageSource, Presentation};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut pres = Presentation::new()?;
//! let layout = pres.slide_layout_by_name("Title Slide")?.unwrap();
//! let slide = pres.slides_mut()?.add_slide(layout)?;
//!
//! let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];
//! let (_, rel) = pres.add_image(slide, &ImageSource::from_bytes(png.to_vec()))?;
//! println!("image related as {}", rel.r_id());
//!
//! let members = pres.to_members()?;
//! assert!(members.contains_key("ppt/media/image1.png"));
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Reading slides
//!
//! ```no_run
//! use slidekit::ooxml::pptx::{Presentation, SlideLike};
//! use std::collections::HashMap;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // members of an unzipped .pptx
//! let members: HashMap<String, Vec<u8>> = HashMap::new();
//! let pres = Presentation::from_members(members)?;
//!
//! for slide in pres.slides()?.iter() {
//!     let slide = slide?;
//!     let layout = pres.package().slide_layout(slide.slidelayout()?).unwrap();
//!     println!("{} shapes, layout '{}'", slide.shapes()?.len(), layout.name());
//! }
//! # Ok(())
//! # }
//! ```

/// Common utilities
pub mod common;

/// OOXML (Office Open XML) packages and PresentationML parts
pub mod ooxml;

pub use ooxml::pptx::{Package, Presentation};
pub use ooxml::{OoxmlError, Result};
