use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

use lesson_core::quiz::QuizResult;
use lesson_core::summary::Summary;

use super::{
    DOCUMENT_TITLE, QUIZ_HEADING, SUMMARY_HEADING, quiz_lines, summary_lines,
};
use crate::error::ExportError;

// US letter in points.
const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN: f32 = 72.0;
const TEXT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
// Mean Helvetica advance in em, rounded up so bold runs still fit.
const AVG_GLYPH_EM: f32 = 0.55;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Style {
    Title,
    Heading,
    Subheading,
    Body,
    Strong,
}

impl Style {
    fn font(self) -> &'static str {
        match self {
            Style::Body => "F1",
            Style::Title | Style::Heading | Style::Subheading | Style::Strong => "F2",
        }
    }

    fn size(self) -> f32 {
        match self {
            Style::Title => 24.0,
            Style::Heading => 18.0,
            Style::Subheading => 13.0,
            Style::Body | Style::Strong => 11.0,
        }
    }

    fn leading(self) -> f32 {
        self.size() * 1.4
    }

    /// Characters that fit on one line after `indent` points.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn wrap_width(self, indent: f32) -> usize {
        let glyph = self.size() * AVG_GLYPH_EM;
        ((TEXT_WIDTH - indent) / glyph).floor().max(1.0) as usize
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Block {
    Text(Style, String, f32),
    Space(f32),
}

/// Greedy word wrap at `width` characters. Overlong words get their own line.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn push_text(blocks: &mut Vec<Block>, style: Style, text: &str, indent: f32) {
    for line in wrap(text, style.wrap_width(indent)) {
        blocks.push(Block::Text(style, line, indent));
    }
}

fn layout(summary: &Summary, quiz: &QuizResult) -> Vec<Block> {
    let mut blocks = Vec::new();
    push_text(&mut blocks, Style::Title, DOCUMENT_TITLE, 0.0);
    blocks.push(Block::Space(36.0));

    push_text(&mut blocks, Style::Heading, SUMMARY_HEADING, 0.0);
    blocks.push(Block::Space(14.0));
    for line in summary_lines(summary) {
        push_text(&mut blocks, Style::Body, &line, 0.0);
        blocks.push(Block::Space(7.0));
    }
    blocks.push(Block::Space(22.0));

    push_text(&mut blocks, Style::Heading, QUIZ_HEADING, 0.0);
    blocks.push(Block::Space(14.0));
    for question in quiz_lines(quiz) {
        push_text(&mut blocks, Style::Subheading, &question.heading, 0.0);
        for option in &question.options {
            push_text(&mut blocks, Style::Body, option, 18.0);
        }
        push_text(&mut blocks, Style::Strong, &question.answer, 18.0);
        blocks.push(Block::Space(14.0));
    }
    blocks
}

/// PDF strings here are single-byte; anything outside Latin-1 becomes `?`.
fn encode_latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

fn paginate(blocks: &[Block]) -> Vec<Vec<Operation>> {
    let mut pages = Vec::new();
    let mut ops = Vec::new();
    let mut y = PAGE_HEIGHT - MARGIN;

    for block in blocks {
        match block {
            Block::Space(gap) => y -= gap,
            Block::Text(style, text, indent) => {
                if y - style.leading() < MARGIN {
                    pages.push(std::mem::take(&mut ops));
                    y = PAGE_HEIGHT - MARGIN;
                }
                y -= style.leading();
                ops.push(Operation::new("BT", vec![]));
                ops.push(Operation::new(
                    "Tf",
                    vec![style.font().into(), style.size().into()],
                ));
                ops.push(Operation::new("Td", vec![(MARGIN + indent).into(), y.into()]));
                ops.push(Operation::new(
                    "Tj",
                    vec![Object::string_literal(encode_latin1(text))],
                ));
                ops.push(Operation::new("ET", vec![]));
            }
        }
    }
    if !ops.is_empty() || pages.is_empty() {
        pages.push(ops);
    }
    pages
}

/// Render summary and quiz as a paginated PDF.
///
/// # Errors
///
/// Returns `ExportError` if a content stream cannot be encoded or the
/// document cannot be written.
pub fn render_pdf(summary: &Summary, quiz: &QuizResult) -> Result<Vec<u8>, ExportError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for operations in paginate(&layout(summary, quiz)) {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = i64::try_from(kids.len()).unwrap_or(i64::MAX);
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_count,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lesson_core::quiz::parse_quiz;
    use lesson_core::summary::parse_summary;

    #[test]
    fn wraps_on_word_boundaries() {
        assert_eq!(wrap("one two three", 7), ["one two", "three"]);
        assert_eq!(wrap("supercalifragilistic x", 5), ["supercalifragilistic", "x"]);
        assert!(wrap("   ", 10).is_empty());
    }

    #[test]
    fn wrap_width_shrinks_with_font_size_and_indent() {
        assert!(Style::Subheading.wrap_width(0.0) < Style::Body.wrap_width(0.0));
        assert!(Style::Title.wrap_width(0.0) < Style::Heading.wrap_width(0.0));
        assert!(Style::Body.wrap_width(18.0) < Style::Body.wrap_width(0.0));
        assert_eq!(Style::Body.wrap_width(TEXT_WIDTH * 2.0), 1);
    }

    #[test]
    fn every_laid_out_line_fits_the_text_column() {
        let words = "Mitochondria generate most of the chemical energy needed to power reactions";
        let reply = format!(
            "- {words} {words}\nQ: {words} {words}?\nA) {words}\nB) {words}\nC) x\nD) y\nCorrect: A"
        );
        let blocks = layout(&parse_summary(Some(&reply)), &parse_quiz(Some(&reply)));
        let mut styles = Vec::new();
        for block in &blocks {
            if let Block::Text(style, text, indent) = block {
                let width = text.chars().count() as f32 * style.size() * AVG_GLYPH_EM;
                assert!(indent + width <= TEXT_WIDTH, "{style:?} line overflows: {text}");
                styles.push(*style);
            }
        }
        assert!(styles.contains(&Style::Subheading));
        assert!(styles.contains(&Style::Strong));
    }

    #[test]
    fn non_latin_characters_are_replaced() {
        assert_eq!(encode_latin1("café ✓"), b"caf\xe9 ?".to_vec());
    }

    #[test]
    fn long_quiz_spans_several_pages() {
        let pages = paginate(&layout(&parse_summary(None), &parse_quiz(None)));
        assert!(pages.len() >= 3, "got {} pages", pages.len());
        assert!(pages.iter().all(|ops| !ops.is_empty()));
    }

    #[test]
    fn renders_loadable_pdf() {
        let bytes = render_pdf(&parse_summary(None), &parse_quiz(None)).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        let doc = Document::load_mem(&bytes).unwrap();
        assert!(doc.get_pages().len() >= 3);
    }
}
