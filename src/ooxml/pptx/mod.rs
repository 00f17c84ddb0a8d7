//! PowerPoint (.pptx) presentation support.
//!
//! This module provides the part graph of a PresentationML package:
//!
//! - `Package`: the part arena, image registry and package relationships
//! - `Presentation`: the main presentation API
//! - `SlideCollection` / `SlideCollectionMut`: slides in slide order
//! - Various part types: `Slide`, `SlideLayout`, `SlideMaster`, `PresentationPart`
//!
//! # Example
//!
//! ```rust
//! use slidekit::ooxml::pptx::{Presentation, SlideLike};
//!
//! let mut pres = Presentation::new()?;
//! let layout = pres.slide_layout_by_name("Title Slide")?.unwrap();
//! let slide = pres.slides_mut()?.add_slide(layout)?;
//!
//! let slide = pres.package().slide(slide).unwrap();
//! assert_eq!(slide.slidelayout()?, layout);
//! for shape in slide.shapes()?.iter() {
//!     println!("{}", shape.name());
//! }
//! # Ok::<(), slidekit::ooxml::error::OoxmlError>(())
//! ```
pub mod format;
pub mod package;
pub mod parts;
pub mod presentation;
pub mod shapes;
pub mod slides;
pub mod template;

pub use format::ImageFormat;
pub use package::{Package, PackagePart};
pub use parts::{
    ImagePart, ImageRegistry, ImageSource, PartCollection, PresentationPart, Slide, SlideId,
    SlideIdList, SlideLayout, SlideLike, SlideMaster,
};
pub use presentation::Presentation;
pub use shapes::{PlaceholderFormat, PlaceholderType, Shape, ShapeCollection, ShapeType};
pub use slides::{SlideCollection, SlideCollectionMut};
