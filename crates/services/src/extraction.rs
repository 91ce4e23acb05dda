//! Plain-text extraction from uploaded documents, dispatched on MIME type.

use std::io::{Cursor, Read};

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::ExtractionError;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MIME_PPTX: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

/// Extract text from `data` according to `mime`.
///
/// # Errors
///
/// Returns `ExtractionError::UnsupportedType` for MIME types other than PDF,
/// DOCX, PPTX and `text/*`, or the format-specific variant when parsing fails.
pub fn extract_text(mime: &str, data: &[u8]) -> Result<String, ExtractionError> {
    let essence = mime.split(';').next().unwrap_or_default().trim();
    match essence {
        MIME_PDF => extract_pdf(data),
        MIME_DOCX => extract_docx(data),
        MIME_PPTX => extract_pptx(data),
        text if text.starts_with("text/") => Ok(String::from_utf8(data.to_vec())?),
        other => Err(ExtractionError::UnsupportedType(other.to_string())),
    }
}

fn extract_pdf(data: &[u8]) -> Result<String, ExtractionError> {
    pdf_extract::extract_text_from_mem(data).map_err(|e| ExtractionError::Pdf(e.to_string()))
}

fn extract_docx(data: &[u8]) -> Result<String, ExtractionError> {
    use docx_rs::{DocumentChild, ParagraphChild, RunChild};

    let docx = docx_rs::read_docx(data).map_err(|e| ExtractionError::Docx(e.to_string()))?;

    let mut text = String::new();
    for child in &docx.document.children {
        let DocumentChild::Paragraph(para) = child else {
            continue;
        };
        for para_child in &para.children {
            let ParagraphChild::Run(run) = para_child else {
                continue;
            };
            for run_child in &run.children {
                if let RunChild::Text(t) = run_child {
                    text.push_str(&t.text);
                }
            }
        }
        text.push('\n');
    }
    Ok(text)
}

/// Slide number from an entry name like `ppt/slides/slide12.xml`.
fn slide_number(name: &str) -> Option<u32> {
    name.strip_prefix("ppt/slides/slide")?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

fn extract_pptx(data: &[u8]) -> Result<String, ExtractionError> {
    let pptx_err = |e: &dyn std::fmt::Display| ExtractionError::Pptx(e.to_string());

    let mut archive = zip::ZipArchive::new(Cursor::new(data)).map_err(|e| pptx_err(&e))?;
    let mut slides: Vec<(u32, String)> = archive
        .file_names()
        .filter_map(|name| slide_number(name).map(|n| (n, name.to_string())))
        .collect();
    slides.sort_unstable_by_key(|(n, _)| *n);

    let mut text = String::new();
    for (_, name) in slides {
        let mut xml = String::new();
        archive
            .by_name(&name)
            .map_err(|e| pptx_err(&e))?
            .read_to_string(&mut xml)
            .map_err(|e| pptx_err(&e))?;
        slide_text(&xml, &mut text).map_err(|e| pptx_err(&e))?;
    }
    Ok(text)
}

/// Append every `<a:t>` run of a slide, one line per `<a:p>` paragraph.
fn slide_text(xml: &str, out: &mut String) -> Result<(), quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut in_run_text = false;
    let mut paragraph = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"a:t" => in_run_text = true,
            Event::End(e) if e.name().as_ref() == b"a:t" => in_run_text = false,
            Event::Text(t) if in_run_text => paragraph.push_str(&t.unescape()?),
            Event::End(e) if e.name().as_ref() == b"a:p" => {
                if !paragraph.trim().is_empty() {
                    out.push_str(paragraph.trim_end());
                    out.push('\n');
                }
                paragraph.clear();
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(())
}
