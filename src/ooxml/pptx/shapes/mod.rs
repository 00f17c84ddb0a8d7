//! Shapes module for PowerPoint presentations.
//!
//! This module provides types for working with the shapes of slide-like
//! parts:
//! - `Shape`, a typed wrapper around one shape tree child
//! - `PlaceholderFormat`, the `p:ph` properties of a placeholder
//! - `ShapeCollection`, the ordered shapes of a part, including the cloning
//!   of layout placeholders onto a new slide
pub mod base;
pub mod placeholder;
pub mod shapetree;

pub use base::{Shape, ShapeType};
pub use placeholder::{Orientation, PlaceholderFormat, PlaceholderSize, PlaceholderType};
pub use shapetree::ShapeCollection;
