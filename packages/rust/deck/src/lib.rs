//! Slide-deck document model and PPTX serialization.
//!
//! [`Presentation`] is the mutable in-memory deck: append slides, place
//! text boxes and images, format text, then [`Presentation::save`] it as a
//! `.pptx` artifact. [`Presentation::load`] reads a saved artifact back
//! with text-level fidelity.

pub mod model;
mod pptx;
pub mod presentation;

pub use model::{
    Bounds, EMU_PER_INCH, Emu, FontSpec, Paragraph, Rgb, Run, Shape, Slide, SlideLayout,
    TextFrame,
};
pub use presentation::{INDEX_OUT_OF_RANGE, Presentation, ShapeId, SlideId};
