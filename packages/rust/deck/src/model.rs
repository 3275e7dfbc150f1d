//! Domain types for the in-memory slide deck.
//!
//! A [`Slide`] owns an ordered sequence of [`Shape`]s. Whether a shape
//! carries text is part of its variant, exposed through
//! [`Shape::text_frame`]; callers never probe for a text attribute.

use std::path::PathBuf;

use serde::Serialize;

/// English Metric Units per inch, the fixed-point length unit of the
/// document format.
pub const EMU_PER_INCH: i64 = 914_400;

/// EMU per pixel at the format's reference 96 dpi.
pub const EMU_PER_PIXEL: i64 = EMU_PER_INCH / 96;

// ---------------------------------------------------------------------------
// Geometry & color
// ---------------------------------------------------------------------------

/// A length in English Metric Units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Emu(pub i64);

impl Emu {
    /// Convert from inches.
    pub fn from_inches(inches: f64) -> Self {
        Self((inches * EMU_PER_INCH as f64).round() as i64)
    }

    /// Convert from pixels at the reference 96 dpi.
    pub fn from_pixels(pixels: u32) -> Self {
        Self(i64::from(pixels) * EMU_PER_PIXEL)
    }

    /// Back to inches.
    pub fn inches(self) -> f64 {
        self.0 as f64 / EMU_PER_INCH as f64
    }
}

/// Position and extent of a free-placed shape, relative to the slide's
/// top-left origin. `None` extents mean "use the native size".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Bounds {
    pub left: Emu,
    pub top: Emu,
    pub width: Option<Emu>,
    pub height: Option<Emu>,
}

impl Bounds {
    /// Bounds from inch values with explicit extents.
    pub fn from_inches(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left: Emu::from_inches(left),
            top: Emu::from_inches(top),
            width: Some(Emu::from_inches(width)),
            height: Some(Emu::from_inches(height)),
        }
    }
}

/// A red/green/blue byte triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Uppercase `RRGGBB` hex form used in the document format.
    pub fn hex(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }

    /// Parse an `RRGGBB` hex string.
    pub fn from_hex(hex: &str) -> Option<Self> {
        if hex.len() != 6 {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self(r, g, b))
    }
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

/// Uniform character formatting for a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FontSpec {
    pub name: String,
    pub size_pt: f32,
    pub bold: bool,
    pub italic: bool,
    pub color: Option<Rgb>,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            name: "Arial".into(),
            size_pt: 18.0,
            bold: false,
            italic: false,
            color: None,
        }
    }
}

/// A contiguous stretch of identically-formatted text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Run {
    pub text: String,
    pub font: FontSpec,
}

impl Run {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font: FontSpec::default(),
        }
    }
}

/// One paragraph: a bullet at `level` in outline terms.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paragraph {
    pub runs: Vec<Run>,
    pub level: u8,
}

impl Paragraph {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            runs: vec![Run::new(text)],
            level: 0,
        }
    }

    /// Concatenated run text.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// The text body of a shape.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TextFrame {
    pub paragraphs: Vec<Paragraph>,
}

impl TextFrame {
    /// Build a frame from text, one paragraph per line.
    pub fn from_text(text: &str) -> Self {
        let paragraphs = if text.is_empty() {
            vec![Paragraph::new("")]
        } else {
            text.lines().map(Paragraph::new).collect()
        };
        Self { paragraphs }
    }

    /// Append a paragraph at the given outline level.
    pub fn add_paragraph(&mut self, text: impl Into<String>, level: u8) {
        self.paragraphs.push(Paragraph {
            runs: vec![Run::new(text)],
            level,
        });
    }

    /// All paragraph text joined with newlines.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ---------------------------------------------------------------------------
// Shapes & slides
// ---------------------------------------------------------------------------

/// Layout kind of a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SlideLayout {
    /// Centered title with subtitle.
    Title,
    /// Title with a bulleted content body.
    TitleAndContent,
    /// No placeholders.
    Blank,
}

/// A visual element on a slide.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Shape {
    /// The slide's title placeholder.
    Title(TextFrame),
    /// The body/subtitle placeholder.
    Body(TextFrame),
    /// A free-placed text box.
    TextBox { frame: TextFrame, bounds: Bounds },
    /// An image anchored at a position.
    Picture { path: PathBuf, bounds: Bounds },
}

impl Shape {
    /// The shape's text body, when the variant carries one.
    pub fn text_frame(&self) -> Option<&TextFrame> {
        match self {
            Shape::Title(frame) | Shape::Body(frame) => Some(frame),
            Shape::TextBox { frame, .. } => Some(frame),
            Shape::Picture { .. } => None,
        }
    }

    /// Mutable access to the text body, when the variant carries one.
    pub fn text_frame_mut(&mut self) -> Option<&mut TextFrame> {
        match self {
            Shape::Title(frame) | Shape::Body(frame) => Some(frame),
            Shape::TextBox { frame, .. } => Some(frame),
            Shape::Picture { .. } => None,
        }
    }

    /// The shape's text, when it carries any.
    pub fn text(&self) -> Option<String> {
        self.text_frame().map(TextFrame::text)
    }
}

/// One page of the deck.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slide {
    pub layout: SlideLayout,
    pub shapes: Vec<Shape>,
    /// Solid background fill, when overridden.
    pub background: Option<Rgb>,
}

impl Slide {
    pub fn new(layout: SlideLayout) -> Self {
        Self {
            layout,
            shapes: Vec::new(),
            background: None,
        }
    }

    /// Non-empty shape texts in shape order.
    pub fn texts(&self) -> Vec<String> {
        self.shapes
            .iter()
            .filter_map(Shape::text)
            .filter(|t| !t.trim().is_empty())
            .collect()
    }
}
