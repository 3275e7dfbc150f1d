//! The mutable presentation document and its assembly operations.
//!
//! Slides are append-only. Append operations hand back index-based
//! [`SlideId`]/[`ShapeId`] handles so later calls in the same session can
//! keep mutating a slide without holding a borrow on it.

use std::path::Path;

use tracing::{info, warn};

use wikideck_shared::{Result, WikideckError};

use crate::model::{Bounds, Emu, FontSpec, Rgb, Shape, Slide, SlideLayout, TextFrame};
use crate::pptx;

/// Sentinel returned by [`Presentation::slide_text`] for a bad index.
pub const INDEX_OUT_OF_RANGE: &str = "slide index out of range";

/// Handle to a slide appended in this session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideId(pub(crate) usize);

/// Handle to a shape on a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeId(pub(crate) usize);

/// An in-memory slide deck.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Presentation {
    slides: Vec<Slide>,
}

impl Presentation {
    /// Create an empty presentation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a presentation from a saved artifact.
    ///
    /// A missing path is not an error: it logs and yields the default empty
    /// presentation, so a session can start from a path that may not exist
    /// yet.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(path = %path.display(), "file not found, starting empty");
            return Ok(Self::new());
        }

        let presentation = pptx::read_file(path)?;
        info!(
            path = %path.display(),
            slides = presentation.slide_count(),
            "loaded presentation"
        );
        Ok(presentation)
    }

    /// Serialize to `path`, overwriting any existing artifact.
    pub fn save(&self, path: &Path) -> Result<()> {
        pptx::write_file(self, path)?;
        info!(path = %path.display(), slides = self.slide_count(), "saved presentation");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Slide appends
    // -----------------------------------------------------------------------

    /// Append a title-layout slide.
    pub fn add_title_slide(&mut self, title: &str, subtitle: &str) -> SlideId {
        let mut slide = Slide::new(SlideLayout::Title);
        slide.shapes.push(Shape::Title(TextFrame::from_text(title)));
        slide
            .shapes
            .push(Shape::Body(TextFrame::from_text(subtitle)));
        self.push(slide)
    }

    /// Append a title+content slide with one top-level bullet per point.
    pub fn add_content_slide<S: AsRef<str>>(&mut self, title: &str, points: &[S]) -> SlideId {
        let mut slide = Slide::new(SlideLayout::TitleAndContent);
        slide.shapes.push(Shape::Title(TextFrame::from_text(title)));

        let mut body = TextFrame::default();
        for point in points {
            body.add_paragraph(point.as_ref(), 0);
        }
        slide.shapes.push(Shape::Body(body));
        self.push(slide)
    }

    /// Append an empty blank-layout slide for free-form content.
    pub fn add_blank_slide(&mut self) -> SlideId {
        self.push(Slide::new(SlideLayout::Blank))
    }

    // -----------------------------------------------------------------------
    // Shape operations
    // -----------------------------------------------------------------------

    /// Add a free text box positioned in inches from the slide origin.
    pub fn add_text_box(
        &mut self,
        slide: SlideId,
        text: &str,
        left: f64,
        top: f64,
        width: f64,
        height: f64,
    ) -> Result<ShapeId> {
        let slide = self.slide_mut(slide)?;
        slide.shapes.push(Shape::TextBox {
            frame: TextFrame::from_text(text),
            bounds: Bounds::from_inches(left, top, width, height),
        });
        Ok(ShapeId(slide.shapes.len() - 1))
    }

    /// Add an image at the given position.
    ///
    /// Omitted extents defer to the image's native size. A missing file is
    /// a logged no-op that returns no handle; the slide is unchanged.
    pub fn add_image(
        &mut self,
        slide: SlideId,
        path: &Path,
        left: f64,
        top: f64,
        width: Option<f64>,
        height: Option<f64>,
    ) -> Result<Option<ShapeId>> {
        if !path.exists() {
            warn!(path = %path.display(), "image not found, skipping");
            return Ok(None);
        }

        let slide = self.slide_mut(slide)?;
        slide.shapes.push(Shape::Picture {
            path: path.to_path_buf(),
            bounds: Bounds {
                left: Emu::from_inches(left),
                top: Emu::from_inches(top),
                width: width.map(Emu::from_inches),
                height: height.map(Emu::from_inches),
            },
        });
        Ok(Some(ShapeId(slide.shapes.len() - 1)))
    }

    /// Apply `font` uniformly to every run of every paragraph of the
    /// target shape's text frame.
    pub fn format_text(&mut self, slide: SlideId, shape: ShapeId, font: &FontSpec) -> Result<()> {
        let slide = self.slide_mut(slide)?;
        let shape = slide.shapes.get_mut(shape.0).ok_or_else(|| {
            WikideckError::validation(format!("shape handle {} out of range", shape.0))
        })?;

        let frame = shape
            .text_frame_mut()
            .ok_or_else(|| WikideckError::validation("shape carries no text"))?;

        for paragraph in &mut frame.paragraphs {
            for run in &mut paragraph.runs {
                run.font = font.clone();
            }
        }
        Ok(())
    }

    /// Set a solid background fill on a slide.
    pub fn set_background(&mut self, slide: SlideId, color: Rgb) -> Result<()> {
        self.slide_mut(slide)?.background = Some(color);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------------

    /// Number of slides.
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// All slides in order.
    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    /// All text on the slide at `index`, shape texts joined with newlines.
    ///
    /// An out-of-range index yields the sentinel message rather than an
    /// error, so interactive callers can keep probing.
    pub fn slide_text(&self, index: usize) -> String {
        match self.slides.get(index) {
            Some(slide) => {
                let texts: Vec<String> =
                    slide.shapes.iter().filter_map(Shape::text).collect();
                texts.join("\n")
            }
            None => INDEX_OUT_OF_RANGE.to_string(),
        }
    }

    /// Per-slide non-empty shape texts, labeled `Slide 1..N` in order.
    pub fn extract_all_text(&self) -> Vec<(String, Vec<String>)> {
        self.slides
            .iter()
            .enumerate()
            .map(|(i, slide)| (format!("Slide {}", i + 1), slide.texts()))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn push(&mut self, slide: Slide) -> SlideId {
        self.slides.push(slide);
        SlideId(self.slides.len() - 1)
    }

    /// Append an already-built slide (used by the reader).
    pub(crate) fn push_slide(&mut self, slide: Slide) {
        self.slides.push(slide);
    }

    fn slide_mut(&mut self, id: SlideId) -> Result<&mut Slide> {
        let index = id.0;
        self.slides.get_mut(index).ok_or_else(|| {
            WikideckError::validation(format!("slide handle {index} out of range"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn title_slide_carries_title_and_subtitle() {
        let mut prs = Presentation::new();
        prs.add_title_slide("Demo", "Sub");

        assert_eq!(prs.slide_count(), 1);
        let text = prs.slide_text(0);
        assert!(text.contains("Demo"));
        assert!(text.contains("Sub"));
    }

    #[test]
    fn content_slide_preserves_point_order() {
        let mut prs = Presentation::new();
        prs.add_content_slide("Topics", &["A", "B", "C"]);

        let text = prs.slide_text(0);
        assert!(text.contains("Topics"));
        let a = text.find('A').expect("A present");
        let b = text.find('B').expect("B present");
        let c = text.find('C').expect("C present");
        assert!(a < b && b < c);
    }

    #[test]
    fn slide_text_out_of_range_is_sentinel() {
        let prs = Presentation::new();
        assert_eq!(prs.slide_text(3), INDEX_OUT_OF_RANGE);
    }

    #[test]
    fn blank_slide_accepts_text_box() {
        let mut prs = Presentation::new();
        let slide = prs.add_blank_slide();
        prs.add_text_box(slide, "Custom Text Box", 1.0, 1.0, 8.0, 2.0)
            .expect("text box");

        assert_eq!(prs.slide_text(0), "Custom Text Box");
    }

    #[test]
    fn add_image_missing_path_is_noop() {
        let mut prs = Presentation::new();
        let slide = prs.add_blank_slide();

        let result = prs
            .add_image(
                slide,
                &PathBuf::from("/definitely/not/here.png"),
                1.0,
                1.0,
                None,
                None,
            )
            .expect("call succeeds");

        assert!(result.is_none());
        assert!(prs.slides()[0].shapes.is_empty());
    }

    #[test]
    fn format_text_applies_to_every_run() {
        let mut prs = Presentation::new();
        let slide = prs.add_blank_slide();
        let shape = prs
            .add_text_box(slide, "one\ntwo", 1.0, 1.0, 6.0, 2.0)
            .expect("text box");

        let font = FontSpec {
            name: "Courier New".into(),
            size_pt: 24.0,
            bold: true,
            italic: false,
            color: Some(Rgb(255, 0, 0)),
        };
        prs.format_text(slide, shape, &font).expect("format");

        let frame = prs.slides()[0].shapes[0].text_frame().expect("frame");
        for paragraph in &frame.paragraphs {
            for run in &paragraph.runs {
                assert_eq!(run.font, font);
            }
        }
    }

    #[test]
    fn format_text_rejects_missing_shape() {
        let mut prs = Presentation::new();
        let slide = prs.add_blank_slide();
        let err = prs
            .format_text(slide, ShapeId(0), &FontSpec::default())
            .unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn background_set_on_slide() {
        let mut prs = Presentation::new();
        let slide = prs.add_blank_slide();
        prs.set_background(slide, Rgb(173, 216, 230)).expect("bg");
        assert_eq!(prs.slides()[0].background, Some(Rgb(173, 216, 230)));
    }

    #[test]
    fn extract_all_text_labels_slides_in_order() {
        let mut prs = Presentation::new();
        prs.add_title_slide("First", "");
        prs.add_content_slide("Second", &["point"]);

        let all = prs.extract_all_text();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].0, "Slide 1");
        assert_eq!(all[0].1, vec!["First"]);
        assert_eq!(all[1].0, "Slide 2");
        assert_eq!(all[1].1, vec!["Second", "point"]);
    }

    #[test]
    fn load_missing_path_yields_empty() {
        let prs = Presentation::load(&PathBuf::from("/no/such/deck.pptx")).expect("load");
        assert_eq!(prs.slide_count(), 0);
    }
}
