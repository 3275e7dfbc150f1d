//! PPTX (Office Open XML) serialization.
//!
//! The contract between the two halves: reading an archive the writer
//! produced yields a presentation with the same slide count and the same
//! extracted text per slide.

mod media;
mod parts;
mod reader;
mod writer;

pub(crate) use reader::{read_file, read_from};
pub(crate) use writer::{write_file, write_to};

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::model::{FontSpec, Rgb, Shape, SlideLayout};
    use crate::presentation::Presentation;

    fn roundtrip(presentation: &Presentation) -> Presentation {
        let mut buffer = Cursor::new(Vec::new());
        write_to(presentation, &mut buffer).expect("write");
        buffer.set_position(0);
        read_from(buffer).expect("read")
    }

    #[test]
    fn empty_presentation_roundtrips() {
        let prs = Presentation::new();
        let loaded = roundtrip(&prs);
        assert_eq!(loaded.slide_count(), 0);
    }

    #[test]
    fn text_slides_roundtrip() {
        let mut prs = Presentation::new();
        prs.add_title_slide("Demo", "Sub");
        prs.add_content_slide("Topics", &["A", "B", "C"]);

        let loaded = roundtrip(&prs);

        assert_eq!(loaded.slide_count(), prs.slide_count());
        assert_eq!(loaded.extract_all_text(), prs.extract_all_text());
        assert_eq!(loaded.slides()[0].layout, SlideLayout::Title);
        assert_eq!(loaded.slides()[1].layout, SlideLayout::TitleAndContent);
    }

    #[test]
    fn content_points_keep_order() {
        let mut prs = Presentation::new();
        prs.add_content_slide("Order", &["first", "second", "third"]);

        let loaded = roundtrip(&prs);
        let text = loaded.slide_text(0);
        let first = text.find("first").expect("first");
        let second = text.find("second").expect("second");
        let third = text.find("third").expect("third");
        assert!(first < second && second < third);
    }

    #[test]
    fn formatting_and_background_roundtrip() {
        let mut prs = Presentation::new();
        let slide = prs.add_blank_slide();
        let shape = prs
            .add_text_box(slide, "Styled", 1.0, 1.0, 6.0, 2.0)
            .expect("text box");

        let font = FontSpec {
            name: "Courier New".into(),
            size_pt: 24.0,
            bold: true,
            italic: false,
            color: Some(Rgb(255, 0, 0)),
        };
        prs.format_text(slide, shape, &font).expect("format");
        prs.set_background(slide, Rgb(173, 216, 230)).expect("bg");

        let loaded = roundtrip(&prs);
        assert_eq!(loaded.slides()[0].background, Some(Rgb(173, 216, 230)));

        let frame = loaded.slides()[0].shapes[0].text_frame().expect("frame");
        let run = &frame.paragraphs[0].runs[0];
        assert_eq!(run.text, "Styled");
        assert_eq!(run.font, font);
    }

    #[test]
    fn special_characters_roundtrip() {
        let mut prs = Presentation::new();
        prs.add_content_slide("Q&A <session>", &["\"quoted\" & <tagged>"]);

        let loaded = roundtrip(&prs);
        assert_eq!(loaded.extract_all_text(), prs.extract_all_text());
    }

    #[test]
    fn picture_roundtrips_as_shape() {
        let dir = std::env::temp_dir().join("wikideck-pptx-pic-test");
        std::fs::create_dir_all(&dir).expect("temp dir");
        let image_path = dir.join("chart.png");
        std::fs::write(&image_path, media::tiny_png(4, 2)).expect("write png");

        let mut prs = Presentation::new();
        let slide = prs.add_blank_slide();
        let added = prs
            .add_image(slide, &image_path, 1.0, 1.0, None, None)
            .expect("call");
        assert!(added.is_some());

        let loaded = roundtrip(&prs);
        assert_eq!(loaded.slide_count(), 1);
        assert!(matches!(loaded.slides()[0].shapes[0], Shape::Picture { .. }));
        // A picture adds no text.
        assert!(loaded.slides()[0].texts().is_empty());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn save_then_load_matches_example_scenario() {
        let dir = std::env::temp_dir().join("wikideck-pptx-save-test");
        std::fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("out.pptx");

        let mut prs = Presentation::new();
        prs.add_title_slide("Demo", "Sub");
        prs.add_content_slide("Topics", &["A", "B", "C"]);
        prs.save(&path).expect("save");

        let loaded = Presentation::load(&path).expect("load");
        assert_eq!(loaded.slide_count(), 2);
        assert_eq!(loaded.extract_all_text(), prs.extract_all_text());

        // Saving again overwrites in place.
        prs.save(&path).expect("second save");
        let reloaded = Presentation::load(&path).expect("reload");
        assert_eq!(reloaded.slide_count(), 2);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
