//! PPTX package writer.
//!
//! Emits the minimal OPC part set: content types, package relationships,
//! the presentation part with its slide list, one shared master / layout /
//! theme, one XML part per slide, and the embedded media. Placeholder
//! geometry is written onto each slide so the shared layout can stay blank.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;

use quick_xml::escape::escape;
use tracing::warn;
use zip::CompressionMethod;
use zip::write::FileOptions;

use wikideck_shared::{Result, WikideckError};

use crate::model::{Bounds, Emu, Paragraph, Shape, Slide, SlideLayout, TextFrame};
use crate::presentation::Presentation;
use crate::pptx::media::{self, ImageFormat};
use crate::pptx::parts;

const XML_DECL: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n";

const SLD_NS: &str = concat!(
    "xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\" ",
    "xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\" ",
    "xmlns:p=\"http://schemas.openxmlformats.org/presentationml/2006/main\""
);

const RELS_NS: &str = "xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\"";

const REL_TYPE_SLIDE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
const REL_TYPE_SLIDE_MASTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
const REL_TYPE_SLIDE_LAYOUT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
const REL_TYPE_IMAGE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

// Placeholder geometry in EMU on the 12192000 x 6858000 (16:9) slide.
const CENTERED_TITLE_XFRM: (i64, i64, i64, i64) = (1_524_000, 1_122_363, 9_144_000, 2_387_600);
const SUBTITLE_XFRM: (i64, i64, i64, i64) = (1_524_000, 3_602_038, 9_144_000, 1_655_762);
const CONTENT_TITLE_XFRM: (i64, i64, i64, i64) = (838_200, 365_125, 10_515_600, 1_325_563);
const CONTENT_BODY_XFRM: (i64, i64, i64, i64) = (838_200, 1_825_625, 10_515_600, 4_351_338);

/// Fallback picture extent when neither the caller nor the image header
/// yields a size: 3 x 2.25 inches.
const DEFAULT_PICTURE_EXTENT: (i64, i64) = (2_743_200, 2_057_400);

/// An embedded media file staged for the archive.
struct MediaPart {
    /// Archive path, e.g. `ppt/media/image1.png`.
    part_name: String,
    /// Relationship target relative to the slide part.
    rel_target: String,
    format: ImageFormat,
    bytes: Vec<u8>,
    /// Pixel dimensions from the header, when readable.
    size_px: Option<(u32, u32)>,
}

/// Serialize the presentation to a file, creating parent directories.
pub(crate) fn write_file(presentation: &Presentation, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| WikideckError::io(parent, e))?;
        }
    }
    let file = File::create(path).map_err(|e| WikideckError::io(path, e))?;
    write_to(presentation, file)
}

/// Serialize the presentation to any seekable writer.
pub(crate) fn write_to<W: Write + Seek>(presentation: &Presentation, out: W) -> Result<()> {
    let mut zip = zip::ZipWriter::new(out);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    // Stage media first: every readable picture becomes a part; unreadable
    // ones are dropped from the slide XML with a warning.
    let (media_parts, media_index) = stage_media(presentation);

    let slide_count = presentation.slide_count();

    put(
        &mut zip,
        options,
        "[Content_Types].xml",
        &content_types_xml(slide_count, &media_parts),
    )?;
    put(&mut zip, options, "_rels/.rels", parts::PACKAGE_RELS)?;
    put(
        &mut zip,
        options,
        "ppt/presentation.xml",
        &presentation_xml(slide_count),
    )?;
    put(
        &mut zip,
        options,
        "ppt/_rels/presentation.xml.rels",
        &presentation_rels_xml(slide_count),
    )?;
    put(
        &mut zip,
        options,
        "ppt/slideMasters/slideMaster1.xml",
        parts::SLIDE_MASTER,
    )?;
    put(
        &mut zip,
        options,
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        parts::SLIDE_MASTER_RELS,
    )?;
    put(
        &mut zip,
        options,
        "ppt/slideLayouts/slideLayout1.xml",
        parts::SLIDE_LAYOUT,
    )?;
    put(
        &mut zip,
        options,
        "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
        parts::SLIDE_LAYOUT_RELS,
    )?;
    put(&mut zip, options, "ppt/theme/theme1.xml", parts::THEME)?;

    for (slide_index, slide) in presentation.slides().iter().enumerate() {
        // Per-slide relationship ids: rId1 is the layout, pictures follow.
        let mut pictures: HashMap<usize, (String, usize)> = HashMap::new();
        let mut next_rid = 2usize;
        for (shape_index, _) in slide.shapes.iter().enumerate() {
            if let Some(&part_index) = media_index.get(&(slide_index, shape_index)) {
                pictures.insert(shape_index, (format!("rId{next_rid}"), part_index));
                next_rid += 1;
            }
        }

        let number = slide_index + 1;
        put(
            &mut zip,
            options,
            &format!("ppt/slides/slide{number}.xml"),
            &slide_xml(slide, &pictures, &media_parts),
        )?;
        put(
            &mut zip,
            options,
            &format!("ppt/slides/_rels/slide{number}.xml.rels"),
            &slide_rels_xml(&pictures, &media_parts),
        )?;
    }

    for part in &media_parts {
        zip.start_file(&part.part_name, options)
            .map_err(|e| WikideckError::Deck(format!("{}: {e}", part.part_name)))?;
        zip.write_all(&part.bytes)
            .map_err(|e| WikideckError::Deck(format!("{}: {e}", part.part_name)))?;
    }

    zip.finish()
        .map_err(|e| WikideckError::Deck(format!("finalize archive: {e}")))?;
    Ok(())
}

/// Read every picture's bytes and index them by (slide, shape).
fn stage_media(presentation: &Presentation) -> (Vec<MediaPart>, HashMap<(usize, usize), usize>) {
    let mut parts = Vec::new();
    let mut index = HashMap::new();

    for (slide_index, slide) in presentation.slides().iter().enumerate() {
        for (shape_index, shape) in slide.shapes.iter().enumerate() {
            let Shape::Picture { path, .. } = shape else {
                continue;
            };

            let bytes = match std::fs::read(path) {
                Ok(bytes) => bytes,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "image read failed, dropping");
                    continue;
                }
            };

            let Some(format) = ImageFormat::from_magic(&bytes) else {
                warn!(path = %path.display(), "unrecognized image format, dropping");
                continue;
            };

            let number = parts.len() + 1;
            let size_px = media::image_size(&bytes);
            parts.push(MediaPart {
                part_name: format!("ppt/media/image{number}.{}", format.extension()),
                rel_target: format!("../media/image{number}.{}", format.extension()),
                format,
                bytes,
                size_px,
            });
            index.insert((slide_index, shape_index), parts.len() - 1);
        }
    }

    (parts, index)
}

// ---------------------------------------------------------------------------
// Package-level parts
// ---------------------------------------------------------------------------

fn content_types_xml(slide_count: usize, media: &[MediaPart]) -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str("<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">");
    xml.push_str(
        "<Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>",
    );
    xml.push_str("<Default Extension=\"xml\" ContentType=\"application/xml\"/>");

    let mut seen = Vec::new();
    for part in media {
        if !seen.contains(&part.format) {
            seen.push(part.format);
            xml.push_str(&format!(
                "<Default Extension=\"{}\" ContentType=\"{}\"/>",
                part.format.extension(),
                part.format.content_type()
            ));
        }
    }

    xml.push_str(
        "<Override PartName=\"/ppt/presentation.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml\"/>",
    );
    xml.push_str(
        "<Override PartName=\"/ppt/slideMasters/slideMaster1.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml\"/>",
    );
    xml.push_str(
        "<Override PartName=\"/ppt/slideLayouts/slideLayout1.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml\"/>",
    );
    xml.push_str(
        "<Override PartName=\"/ppt/theme/theme1.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.theme+xml\"/>",
    );
    for number in 1..=slide_count {
        xml.push_str(&format!(
            "<Override PartName=\"/ppt/slides/slide{number}.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.slide+xml\"/>"
        ));
    }
    xml.push_str("</Types>");
    xml
}

fn presentation_xml(slide_count: usize) -> String {
    let master_rid = slide_count + 1;
    let mut xml = String::from(XML_DECL);
    xml.push_str(&format!("<p:presentation {SLD_NS}>"));
    xml.push_str(&format!(
        "<p:sldMasterIdLst><p:sldMasterId id=\"2147483648\" r:id=\"rId{master_rid}\"/></p:sldMasterIdLst>"
    ));
    xml.push_str("<p:sldIdLst>");
    for number in 1..=slide_count {
        xml.push_str(&format!(
            "<p:sldId id=\"{}\" r:id=\"rId{number}\"/>",
            255 + number
        ));
    }
    xml.push_str("</p:sldIdLst>");
    xml.push_str("<p:sldSz cx=\"12192000\" cy=\"6858000\"/>");
    xml.push_str("<p:notesSz cx=\"6858000\" cy=\"9144000\"/>");
    xml.push_str("</p:presentation>");
    xml
}

fn presentation_rels_xml(slide_count: usize) -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(&format!("<Relationships {RELS_NS}>"));
    for number in 1..=slide_count {
        xml.push_str(&format!(
            "<Relationship Id=\"rId{number}\" Type=\"{REL_TYPE_SLIDE}\" Target=\"slides/slide{number}.xml\"/>"
        ));
    }
    xml.push_str(&format!(
        "<Relationship Id=\"rId{}\" Type=\"{REL_TYPE_SLIDE_MASTER}\" Target=\"slideMasters/slideMaster1.xml\"/>",
        slide_count + 1
    ));
    xml.push_str("</Relationships>");
    xml
}

fn slide_rels_xml(pictures: &HashMap<usize, (String, usize)>, media: &[MediaPart]) -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(&format!("<Relationships {RELS_NS}>"));
    xml.push_str(&format!(
        "<Relationship Id=\"rId1\" Type=\"{REL_TYPE_SLIDE_LAYOUT}\" Target=\"../slideLayouts/slideLayout1.xml\"/>"
    ));

    let mut rels: Vec<&(String, usize)> = pictures.values().collect();
    rels.sort_by(|a, b| a.0.cmp(&b.0));
    for (rel_id, part_index) in rels {
        xml.push_str(&format!(
            "<Relationship Id=\"{rel_id}\" Type=\"{REL_TYPE_IMAGE}\" Target=\"{}\"/>",
            media[*part_index].rel_target
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

// ---------------------------------------------------------------------------
// Slide XML
// ---------------------------------------------------------------------------

fn slide_xml(
    slide: &Slide,
    pictures: &HashMap<usize, (String, usize)>,
    media: &[MediaPart],
) -> String {
    let mut xml = String::with_capacity(2048);
    xml.push_str(XML_DECL);
    xml.push_str(&format!("<p:sld {SLD_NS}>"));
    xml.push_str("<p:cSld>");

    if let Some(background) = slide.background {
        xml.push_str(&format!(
            "<p:bg><p:bgPr><a:solidFill><a:srgbClr val=\"{}\"/></a:solidFill><a:effectLst/></p:bgPr></p:bg>",
            background.hex()
        ));
    }

    xml.push_str("<p:spTree>");
    xml.push_str(
        "<p:nvGrpSpPr><p:cNvPr id=\"1\" name=\"\"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>",
    );

    let mut shape_id = 2u64;
    for (shape_index, shape) in slide.shapes.iter().enumerate() {
        match shape {
            Shape::Title(frame) => {
                let xfrm = if slide.layout == SlideLayout::Title {
                    CENTERED_TITLE_XFRM
                } else {
                    CONTENT_TITLE_XFRM
                };
                xml.push_str(&placeholder_sp(shape_id, "Title", slide.layout, true, xfrm, frame));
            }
            Shape::Body(frame) => {
                let xfrm = if slide.layout == SlideLayout::Title {
                    SUBTITLE_XFRM
                } else {
                    CONTENT_BODY_XFRM
                };
                xml.push_str(&placeholder_sp(
                    shape_id,
                    "Content",
                    slide.layout,
                    false,
                    xfrm,
                    frame,
                ));
            }
            Shape::TextBox { frame, bounds } => {
                xml.push_str(&text_box_sp(shape_id, bounds, frame));
            }
            Shape::Picture { path, bounds } => {
                // Pictures whose bytes could not be staged are dropped.
                if let Some((rel_id, part_index)) = pictures.get(&shape_index) {
                    xml.push_str(&picture_xml(
                        shape_id,
                        path,
                        rel_id,
                        bounds,
                        media[*part_index].size_px,
                    ));
                }
            }
        }
        shape_id += 1;
    }

    xml.push_str("</p:spTree></p:cSld>");
    xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
    xml.push_str("</p:sld>");
    xml
}

/// Placeholder attribute for title/body shapes by slide layout.
fn ph_attr(layout: SlideLayout, is_title: bool) -> &'static str {
    match (layout, is_title) {
        (SlideLayout::Title, true) => " type=\"ctrTitle\"",
        (SlideLayout::Title, false) => " type=\"subTitle\" idx=\"1\"",
        (_, true) => " type=\"title\"",
        (_, false) => " idx=\"1\"",
    }
}

fn placeholder_sp(
    id: u64,
    name: &str,
    layout: SlideLayout,
    is_title: bool,
    xfrm: (i64, i64, i64, i64),
    frame: &TextFrame,
) -> String {
    let (x, y, cx, cy) = xfrm;
    format!(
        "<p:sp><p:nvSpPr><p:cNvPr id=\"{id}\" name=\"{name} {id}\"/>\
         <p:cNvSpPr><a:spLocks noGrp=\"1\"/></p:cNvSpPr>\
         <p:nvPr><p:ph{}/></p:nvPr></p:nvSpPr>\
         <p:spPr><a:xfrm><a:off x=\"{x}\" y=\"{y}\"/><a:ext cx=\"{cx}\" cy=\"{cy}\"/></a:xfrm></p:spPr>\
         {}</p:sp>",
        ph_attr(layout, is_title),
        tx_body_xml(frame)
    )
}

fn text_box_sp(id: u64, bounds: &Bounds, frame: &TextFrame) -> String {
    format!(
        "<p:sp><p:nvSpPr><p:cNvPr id=\"{id}\" name=\"TextBox {id}\"/>\
         <p:cNvSpPr txBox=\"1\"/><p:nvPr/></p:nvSpPr>\
         <p:spPr>{}<a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom><a:noFill/></p:spPr>\
         {}</p:sp>",
        xfrm_xml(bounds, None),
        tx_body_xml(frame)
    )
}

fn picture_xml(
    id: u64,
    path: &Path,
    rel_id: &str,
    bounds: &Bounds,
    native_px: Option<(u32, u32)>,
) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| format!("image{id}"));
    let file_name = escape(&file_name).to_string();

    format!(
        "<p:pic><p:nvPicPr><p:cNvPr id=\"{id}\" name=\"{file_name}\" descr=\"{file_name}\"/>\
         <p:cNvPicPr><a:picLocks noChangeAspect=\"1\"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>\
         <p:blipFill><a:blip r:embed=\"{rel_id}\"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>\
         <p:spPr>{}<a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom></p:spPr></p:pic>",
        xfrm_xml(bounds, native_px)
    )
}

/// Resolve a transform from bounds, deferring missing extents to the native
/// pixel size (keeping aspect when only one extent is given).
fn xfrm_xml(bounds: &Bounds, native_px: Option<(u32, u32)>) -> String {
    let native = native_px
        .filter(|&(w, h)| w > 0 && h > 0)
        .map(|(w, h)| (Emu::from_pixels(w).0, Emu::from_pixels(h).0));

    let (cx, cy) = match (bounds.width, bounds.height) {
        (Some(w), Some(h)) => (w.0, h.0),
        (Some(w), None) => match native {
            Some((nw, nh)) => (w.0, w.0 * nh / nw),
            None => (w.0, DEFAULT_PICTURE_EXTENT.1),
        },
        (None, Some(h)) => match native {
            Some((nw, nh)) => (h.0 * nw / nh, h.0),
            None => (DEFAULT_PICTURE_EXTENT.0, h.0),
        },
        (None, None) => native.unwrap_or(DEFAULT_PICTURE_EXTENT),
    };

    format!(
        "<a:xfrm><a:off x=\"{}\" y=\"{}\"/><a:ext cx=\"{cx}\" cy=\"{cy}\"/></a:xfrm>",
        bounds.left.0, bounds.top.0
    )
}

fn tx_body_xml(frame: &TextFrame) -> String {
    let mut xml = String::from("<p:txBody><a:bodyPr/><a:lstStyle/>");
    for paragraph in &frame.paragraphs {
        xml.push_str(&paragraph_xml(paragraph));
    }
    xml.push_str("</p:txBody>");
    xml
}

fn paragraph_xml(paragraph: &Paragraph) -> String {
    let mut xml = String::from("<a:p>");
    if paragraph.level > 0 {
        xml.push_str(&format!("<a:pPr lvl=\"{}\"/>", paragraph.level));
    }
    for run in &paragraph.runs {
        let font = &run.font;
        let sz = (font.size_pt * 100.0).round() as i64;
        let color = font
            .color
            .map(|c| format!("<a:solidFill><a:srgbClr val=\"{}\"/></a:solidFill>", c.hex()))
            .unwrap_or_default();

        xml.push_str(&format!(
            "<a:r><a:rPr lang=\"en-US\" sz=\"{sz}\" b=\"{}\" i=\"{}\" dirty=\"0\">{color}\
             <a:latin typeface=\"{}\"/></a:rPr><a:t>{}</a:t></a:r>",
            u8::from(font.bold),
            u8::from(font.italic),
            escape(&font.name),
            escape(&run.text)
        ));
    }
    xml.push_str("</a:p>");
    xml
}

fn put<W: Write + Seek>(
    zip: &mut zip::ZipWriter<W>,
    options: FileOptions,
    name: &str,
    content: &str,
) -> Result<()> {
    zip.start_file(name, options)
        .map_err(|e| WikideckError::Deck(format!("{name}: {e}")))?;
    zip.write_all(content.as_bytes())
        .map_err(|e| WikideckError::Deck(format!("{name}: {e}")))?;
    Ok(())
}
