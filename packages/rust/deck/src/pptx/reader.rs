//! PPTX package reader.
//!
//! Opens the archive, orders slides via the presentation relationships,
//! and rebuilds each slide from its XML part. Placeholder types map back
//! to title/body shapes; free shapes keep their text, formatting, and
//! position; the slide background color is restored.

use std::fs::File;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use zip::ZipArchive;

use wikideck_shared::{Result, WikideckError};

use crate::model::{Bounds, Emu, Paragraph, Rgb, Run, Shape, Slide, SlideLayout, TextFrame};
use crate::presentation::Presentation;

/// Read a presentation from a file.
pub(crate) fn read_file(path: &Path) -> Result<Presentation> {
    let file = File::open(path).map_err(|e| WikideckError::io(path, e))?;
    read_from(file)
}

/// Read a presentation from any seekable reader.
pub(crate) fn read_from<R: Read + Seek>(reader: R) -> Result<Presentation> {
    let mut archive =
        ZipArchive::new(reader).map_err(|e| WikideckError::Deck(format!("open archive: {e}")))?;

    let slide_paths = slide_order(&mut archive)?;

    let mut presentation = Presentation::new();
    for slide_path in &slide_paths {
        let xml = read_part(&mut archive, slide_path)?;
        presentation.push_slide(parse_slide(&xml)?);
    }

    Ok(presentation)
}

// ---------------------------------------------------------------------------
// Slide ordering
// ---------------------------------------------------------------------------

/// Ordered slide part paths from the presentation relationships.
fn slide_order<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
    let rels = read_part(archive, "ppt/_rels/presentation.xml.rels")?;

    let mut reader = Reader::from_str(&rels);
    reader.trim_text(true);

    let mut slides: Vec<(String, Option<usize>)> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if e.name().as_ref() == b"Relationship" =>
            {
                let rel_type = attr_value(e, b"Type").unwrap_or_default();
                let target = attr_value(e, b"Target").unwrap_or_default();
                let id = attr_value(e, b"Id").unwrap_or_default();

                if rel_type.ends_with("/slide") {
                    let order = trailing_number(&id).or_else(|| trailing_number(&target));
                    let full_path = match target.strip_prefix('/') {
                        Some(absolute) => absolute.to_string(),
                        None => format!("ppt/{target}"),
                    };
                    slides.push((full_path, order));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(WikideckError::Deck(format!(
                    "presentation relationships: {e}"
                )));
            }
            _ => {}
        }
    }

    slides.sort_by(|a, b| match (a.1, b.1) {
        (Some(na), Some(nb)) => na.cmp(&nb),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.0.cmp(&b.0),
    });

    Ok(slides.into_iter().map(|(path, _)| path).collect())
}

// ---------------------------------------------------------------------------
// Slide parsing
// ---------------------------------------------------------------------------

/// Shape being accumulated while walking slide XML.
#[derive(Default)]
struct ShapeCtx {
    is_picture: bool,
    has_placeholder: bool,
    ph_type: Option<String>,
    name: String,
    off: Option<(i64, i64)>,
    ext: Option<(i64, i64)>,
    paragraphs: Vec<Paragraph>,
    current_paragraph: Option<Paragraph>,
    current_run: Option<Run>,
}

impl ShapeCtx {
    fn bounds(&self) -> Bounds {
        let (x, y) = self.off.unwrap_or((0, 0));
        Bounds {
            left: Emu(x),
            top: Emu(y),
            width: self.ext.map(|(cx, _)| Emu(cx)),
            height: self.ext.map(|(_, cy)| Emu(cy)),
        }
    }

    fn into_shape(self) -> Shape {
        let bounds = self.bounds();
        let frame = TextFrame {
            paragraphs: self.paragraphs,
        };

        if self.is_picture {
            return Shape::Picture {
                path: PathBuf::from(self.name),
                bounds,
            };
        }

        match self.ph_type.as_deref() {
            Some("ctrTitle") | Some("title") => Shape::Title(frame),
            _ if self.has_placeholder => Shape::Body(frame),
            _ => Shape::TextBox { frame, bounds },
        }
    }
}

/// Rebuild a [`Slide`] from one slide part's XML.
fn parse_slide(xml: &str) -> Result<Slide> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut shapes: Vec<Shape> = Vec::new();
    let mut background: Option<Rgb> = None;
    let mut ph_types: Vec<Option<String>> = Vec::new();

    let mut ctx: Option<ShapeCtx> = None;
    let mut in_background = false;
    let mut in_run_props = false;
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match local_name(e.name().as_ref()) {
                b"sp" => ctx = Some(ShapeCtx::default()),
                b"pic" => {
                    ctx = Some(ShapeCtx {
                        is_picture: true,
                        ..ShapeCtx::default()
                    });
                }
                b"bg" => in_background = true,
                b"p" => {
                    if let Some(shape) = ctx.as_mut() {
                        shape.current_paragraph = Some(Paragraph {
                            runs: Vec::new(),
                            level: 0,
                        });
                    }
                }
                b"ph" => apply_placeholder(ctx.as_mut(), e),
                b"pPr" => apply_paragraph_props(ctx.as_mut(), e),
                b"r" => {
                    if let Some(shape) = ctx.as_mut() {
                        shape.current_run = Some(Run::new(""));
                    }
                }
                b"rPr" => {
                    in_run_props = true;
                    apply_run_props(ctx.as_mut(), e);
                }
                b"t" => in_text = true,
                other => handle_positional(ctx.as_mut(), other, e),
            },
            Ok(Event::Empty(ref e)) => match local_name(e.name().as_ref()) {
                b"ph" => apply_placeholder(ctx.as_mut(), e),
                b"pPr" => apply_paragraph_props(ctx.as_mut(), e),
                b"rPr" => apply_run_props(ctx.as_mut(), e),
                b"srgbClr" => {
                    let color = attr_value(e, b"val").and_then(|v| Rgb::from_hex(&v));
                    if in_run_props {
                        if let Some(run) = ctx.as_mut().and_then(|s| s.current_run.as_mut()) {
                            run.font.color = color;
                        }
                    } else if in_background && ctx.is_none() {
                        background = color.or(background);
                    }
                }
                b"latin" => {
                    if in_run_props {
                        if let Some(run) = ctx.as_mut().and_then(|s| s.current_run.as_mut()) {
                            if let Some(name) = attr_value(e, b"typeface") {
                                run.font.name = name;
                            }
                        }
                    }
                }
                other => handle_positional(ctx.as_mut(), other, e),
            },
            Ok(Event::Text(ref e)) => {
                if in_text {
                    if let Some(run) = ctx.as_mut().and_then(|s| s.current_run.as_mut()) {
                        let text = e.unescape().unwrap_or_default();
                        run.text.push_str(&text);
                    }
                }
            }
            Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                b"sp" | b"pic" => {
                    if let Some(shape) = ctx.take() {
                        ph_types.push(if shape.has_placeholder {
                            Some(shape.ph_type.clone().unwrap_or_default())
                        } else {
                            None
                        });
                        shapes.push(shape.into_shape());
                    }
                }
                b"bg" => in_background = false,
                b"rPr" => in_run_props = false,
                b"t" => in_text = false,
                b"r" => {
                    if let Some(shape) = ctx.as_mut() {
                        if let (Some(paragraph), Some(run)) =
                            (shape.current_paragraph.as_mut(), shape.current_run.take())
                        {
                            paragraph.runs.push(run);
                        }
                    }
                }
                b"p" => {
                    if let Some(shape) = ctx.as_mut() {
                        if let Some(paragraph) = shape.current_paragraph.take() {
                            shape.paragraphs.push(paragraph);
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(WikideckError::Deck(format!("slide parse: {e}"))),
            _ => {}
        }
    }

    Ok(Slide {
        layout: classify_layout(&ph_types),
        shapes,
        background,
    })
}

/// Capture cNvPr name and xfrm offsets/extents into the current shape.
fn handle_positional(ctx: Option<&mut ShapeCtx>, local: &[u8], e: &BytesStart) {
    let Some(shape) = ctx else {
        return;
    };

    match local {
        b"cNvPr" => {
            if let Some(name) = attr_value(e, b"name") {
                if shape.name.is_empty() {
                    shape.name = name;
                }
            }
        }
        b"off" => {
            let x = attr_value(e, b"x").and_then(|v| v.parse().ok());
            let y = attr_value(e, b"y").and_then(|v| v.parse().ok());
            if let (Some(x), Some(y)) = (x, y) {
                shape.off = Some((x, y));
            }
        }
        b"ext" => {
            let cx = attr_value(e, b"cx").and_then(|v| v.parse().ok());
            let cy = attr_value(e, b"cy").and_then(|v| v.parse().ok());
            if let (Some(cx), Some(cy)) = (cx, cy) {
                shape.ext = Some((cx, cy));
            }
        }
        _ => {}
    }
}

/// Record placeholder kind on the current shape.
fn apply_placeholder(ctx: Option<&mut ShapeCtx>, e: &BytesStart) {
    if let Some(shape) = ctx {
        shape.has_placeholder = true;
        shape.ph_type = attr_value(e, b"type");
    }
}

/// Apply pPr attributes (outline level) to the current paragraph.
fn apply_paragraph_props(ctx: Option<&mut ShapeCtx>, e: &BytesStart) {
    if let Some(paragraph) = ctx.and_then(|s| s.current_paragraph.as_mut()) {
        if let Some(level) = attr_value(e, b"lvl").and_then(|v| v.parse().ok()) {
            paragraph.level = level;
        }
    }
}

/// Apply rPr attributes (size, bold, italic) to the current run.
fn apply_run_props(ctx: Option<&mut ShapeCtx>, e: &BytesStart) {
    let Some(run) = ctx.and_then(|s| s.current_run.as_mut()) else {
        return;
    };

    if let Some(size) = attr_value(e, b"sz").and_then(|v| v.parse::<i64>().ok()) {
        run.font.size_pt = size as f32 / 100.0;
    }
    if let Some(bold) = attr_value(e, b"b") {
        run.font.bold = bold == "1" || bold == "true";
    }
    if let Some(italic) = attr_value(e, b"i") {
        run.font.italic = italic == "1" || italic == "true";
    }
}

/// Map the placeholder types seen on a slide back to its layout kind.
fn classify_layout(ph_types: &[Option<String>]) -> SlideLayout {
    let placeholders: Vec<&str> = ph_types
        .iter()
        .filter_map(|t| t.as_deref())
        .collect();

    if placeholders
        .iter()
        .any(|t| *t == "ctrTitle" || *t == "subTitle")
    {
        SlideLayout::Title
    } else if !placeholders.is_empty() {
        SlideLayout::TitleAndContent
    } else {
        SlideLayout::Blank
    }
}

// ---------------------------------------------------------------------------
// Archive & XML helpers
// ---------------------------------------------------------------------------

/// Read one archive entry as a UTF-8 string.
fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<String> {
    let mut file = archive
        .by_name(path)
        .map_err(|e| WikideckError::Deck(format!("part not found '{path}': {e}")))?;

    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| WikideckError::Deck(format!("read '{path}': {e}")))?;

    Ok(content)
}

/// Attribute value by exact key, raw bytes decoded lossily.
fn attr_value(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

/// Strip an XML namespace prefix from an element name.
fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().position(|&b| b == b':') {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}

/// Trailing decimal number of a string like `rId2` or `slide3.xml`.
fn trailing_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml");
    let digits: String = s
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .collect::<String>()
        .chars()
        .rev()
        .collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_number_variants() {
        assert_eq!(trailing_number("rId1"), Some(1));
        assert_eq!(trailing_number("rId12"), Some(12));
        assert_eq!(trailing_number("slides/slide3.xml"), Some(3));
        assert_eq!(trailing_number("nodigits"), None);
    }

    #[test]
    fn local_name_strips_prefix() {
        assert_eq!(local_name(b"p:sp"), b"sp");
        assert_eq!(local_name(b"a:t"), b"t");
        assert_eq!(local_name(b"sp"), b"sp");
    }

    #[test]
    fn parse_slide_rebuilds_placeholders() {
        let xml = r#"<?xml version="1.0"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
<p:cSld><p:spTree>
<p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 2"/><p:cNvSpPr/><p:nvPr><p:ph type="ctrTitle"/></p:nvPr></p:nvSpPr>
<p:spPr/><p:txBody><a:bodyPr/><a:p><a:r><a:rPr lang="en-US" sz="4400" b="0" i="0"/><a:t>Demo</a:t></a:r></a:p></p:txBody></p:sp>
<p:sp><p:nvSpPr><p:cNvPr id="3" name="Content 3"/><p:cNvSpPr/><p:nvPr><p:ph type="subTitle" idx="1"/></p:nvPr></p:nvSpPr>
<p:spPr/><p:txBody><a:bodyPr/><a:p><a:r><a:rPr lang="en-US" sz="1800" b="0" i="0"/><a:t>Sub</a:t></a:r></a:p></p:txBody></p:sp>
</p:spTree></p:cSld></p:sld>"#;

        let slide = parse_slide(xml).expect("parse");
        assert_eq!(slide.layout, SlideLayout::Title);
        assert_eq!(slide.shapes.len(), 2);
        assert_eq!(slide.shapes[0].text().as_deref(), Some("Demo"));
        assert_eq!(slide.shapes[1].text().as_deref(), Some("Sub"));
        assert!(matches!(slide.shapes[0], Shape::Title(_)));
        assert!(matches!(slide.shapes[1], Shape::Body(_)));
    }

    #[test]
    fn parse_slide_reads_background_and_textbox() {
        let xml = r#"<?xml version="1.0"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
<p:cSld>
<p:bg><p:bgPr><a:solidFill><a:srgbClr val="ADD8E6"/></a:solidFill></p:bgPr></p:bg>
<p:spTree>
<p:sp><p:nvSpPr><p:cNvPr id="2" name="TextBox 2"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr>
<p:spPr><a:xfrm><a:off x="914400" y="914400"/><a:ext cx="1828800" cy="914400"/></a:xfrm></p:spPr>
<p:txBody><a:bodyPr/><a:p><a:r><a:rPr lang="en-US" sz="2400" b="1" i="0"><a:solidFill><a:srgbClr val="FF0000"/></a:solidFill><a:latin typeface="Courier New"/></a:rPr><a:t>Boxed</a:t></a:r></a:p></p:txBody></p:sp>
</p:spTree></p:cSld></p:sld>"#;

        let slide = parse_slide(xml).expect("parse");
        assert_eq!(slide.layout, SlideLayout::Blank);
        assert_eq!(slide.background, Some(Rgb(173, 216, 230)));

        let Shape::TextBox { frame, bounds } = &slide.shapes[0] else {
            panic!("expected a text box");
        };
        assert_eq!(frame.text(), "Boxed");
        assert_eq!(bounds.left, Emu(914_400));
        assert_eq!(bounds.width, Some(Emu(1_828_800)));

        let run = &frame.paragraphs[0].runs[0];
        assert_eq!(run.font.name, "Courier New");
        assert!((run.font.size_pt - 24.0).abs() < f32::EPSILON);
        assert!(run.font.bold);
        assert_eq!(run.font.color, Some(Rgb(255, 0, 0)));
    }
}
