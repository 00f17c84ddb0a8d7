/// Parts for PowerPoint presentation documents.
///
/// This module contains the typed parts of a .pptx package: the presentation
/// part, the slide-like parts (slide, slide layout, slide master) and image
/// parts with their content-addressed registry.
pub mod image;
pub mod presentation;
pub mod slide;

pub use image::{ImagePart, ImageRegistry, ImageSource};
pub use presentation::{PresentationPart, SlideId, SlideIdList};
pub use slide::{
    PartCollection, SLIDE_PARTNAME_TEMPLATE, Slide, SlideLayout, SlideLike, SlideLikeBase,
    SlideMaster,
};
