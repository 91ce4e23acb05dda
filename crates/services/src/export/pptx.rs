//! Minimal OOXML presentation writer.
//!
//! Every slide is a title text box plus a body text box with one paragraph
//! per line. The package carries a single master, a blank layout and a
//! theme, which is the smallest set PowerPoint and LibreOffice both open.

use std::io::{Cursor, Write};

use quick_xml::escape::escape;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use lesson_core::quiz::QuizResult;
use lesson_core::summary::Summary;

use super::{
    DOCUMENT_SUBTITLE, DOCUMENT_TITLE, QUIZ_HEADING, SUMMARY_HEADING, quiz_lines, summary_lines,
};
use crate::error::ExportError;

/// Title and body lines of one slide.
pub type Slide = (String, Vec<String>);

// 16:9 in EMU.
const SLIDE_CX: u64 = 12_192_000;
const SLIDE_CY: u64 = 6_858_000;

const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PKG_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

fn lesson_slides(summary: &Summary, quiz: &QuizResult) -> Vec<Slide> {
    let mut quiz_body = Vec::new();
    for (idx, question) in quiz_lines(quiz).into_iter().enumerate() {
        if idx > 0 {
            quiz_body.push(String::new());
        }
        quiz_body.push(question.heading);
        quiz_body.extend(question.options.into_iter().map(|option| format!("  {option}")));
        quiz_body.push(question.answer);
    }

    vec![
        (DOCUMENT_TITLE.to_string(), vec![DOCUMENT_SUBTITLE.to_string()]),
        (SUMMARY_HEADING.to_string(), summary_lines(summary)),
        (QUIZ_HEADING.to_string(), quiz_body),
    ]
}

/// Render summary and quiz as a three-slide `.pptx`.
///
/// # Errors
///
/// Returns `ExportError` if the archive cannot be written.
pub fn render_pptx(summary: &Summary, quiz: &QuizResult) -> Result<Vec<u8>, ExportError> {
    render_slides(&lesson_slides(summary, quiz))
}

/// Write `slides` into a `.pptx` package.
///
/// # Errors
///
/// Returns `ExportError` if the archive cannot be written.
pub fn render_slides(slides: &[Slide]) -> Result<Vec<u8>, ExportError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    let mut put = |name: &str, body: &str| -> Result<(), ExportError> {
        zip.start_file(name, options)?;
        zip.write_all(body.as_bytes())?;
        Ok(())
    };

    put("[Content_Types].xml", &content_types(slides.len()))?;
    put("_rels/.rels", &root_rels())?;
    put("ppt/presentation.xml", &presentation(slides.len()))?;
    put("ppt/_rels/presentation.xml.rels", &presentation_rels(slides.len()))?;
    put("ppt/slideMasters/slideMaster1.xml", &slide_master())?;
    put(
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        &rels(&[
            ("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml"),
            ("rId2", "theme", "../theme/theme1.xml"),
        ]),
    )?;
    put("ppt/slideLayouts/slideLayout1.xml", &slide_layout())?;
    put(
        "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
        &rels(&[("rId1", "slideMaster", "../slideMasters/slideMaster1.xml")]),
    )?;
    put("ppt/theme/theme1.xml", THEME)?;

    for (idx, (title, lines)) in slides.iter().enumerate() {
        let number = idx + 1;
        put(&format!("ppt/slides/slide{number}.xml"), &slide(title, lines))?;
        put(
            &format!("ppt/slides/_rels/slide{number}.xml.rels"),
            &rels(&[("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml")]),
        )?;
    }

    Ok(zip.finish()?.into_inner())
}

// ─── Package parts ──────────────────────────────────────────────────────────

fn content_types(slide_count: usize) -> String {
    let mut xml = format!(
        r#"{XML_DECL}<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/><Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/><Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/><Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>"#
    );
    for number in 1..=slide_count {
        xml.push_str(&format!(
            r#"<Override PartName="/ppt/slides/slide{number}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#
        ));
    }
    xml.push_str("</Types>");
    xml
}

fn root_rels() -> String {
    format!(
        r#"{XML_DECL}<Relationships xmlns="{PKG_REL}"><Relationship Id="rId1" Type="{REL}/officeDocument" Target="ppt/presentation.xml"/></Relationships>"#
    )
}

fn rels(entries: &[(&str, &str, &str)]) -> String {
    let mut xml = format!(r#"{XML_DECL}<Relationships xmlns="{PKG_REL}">"#);
    for (id, kind, target) in entries {
        xml.push_str(&format!(
            r#"<Relationship Id="{id}" Type="{REL}/{kind}" Target="{target}"/>"#
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

// rId1 is the master, rId2 the theme, slides start at rId3.
fn presentation_rels(slide_count: usize) -> String {
    let mut entries = vec![
        ("rId1".to_string(), "slideMaster", "slideMasters/slideMaster1.xml".to_string()),
        ("rId2".to_string(), "theme", "theme/theme1.xml".to_string()),
    ];
    for number in 1..=slide_count {
        entries.push((format!("rId{}", number + 2), "slide", format!("slides/slide{number}.xml")));
    }
    let borrowed: Vec<(&str, &str, &str)> = entries
        .iter()
        .map(|(id, kind, target)| (id.as_str(), *kind, target.as_str()))
        .collect();
    rels(&borrowed)
}

fn presentation(slide_count: usize) -> String {
    let mut slide_ids = String::new();
    for number in 1..=slide_count {
        slide_ids.push_str(&format!(
            r#"<p:sldId id="{}" r:id="rId{}"/>"#,
            255 + number,
            number + 2
        ));
    }
    format!(
        r#"{XML_DECL}<p:presentation xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst>{slide_ids}</p:sldIdLst><p:sldSz cx="{SLIDE_CX}" cy="{SLIDE_CY}"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#
    )
}

fn empty_tree() -> &'static str {
    r#"<p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/></p:spTree>"#
}

fn slide_master() -> String {
    format!(
        r#"{XML_DECL}<p:sldMaster xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}"><p:cSld>{tree}</p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst></p:sldMaster>"#,
        tree = empty_tree()
    )
}

fn slide_layout() -> String {
    format!(
        r#"{XML_DECL}<p:sldLayout xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}" type="blank" preserve="1"><p:cSld name="Blank">{tree}</p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#,
        tree = empty_tree()
    )
}

// ─── Slides ─────────────────────────────────────────────────────────────────

fn paragraph(text: &str, size: u32, bold: bool) -> String {
    if text.is_empty() {
        return "<a:p/>".to_string();
    }
    let bold = if bold { r#" b="1""# } else { "" };
    format!(
        r#"<a:p><a:r><a:rPr lang="en-US" sz="{size}"{bold}/><a:t xml:space="preserve">{}</a:t></a:r></a:p>"#,
        escape(text)
    )
}

fn text_box(id: u32, name: &str, y: u64, cy: u64, paragraphs: &str) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{name}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="457200" y="{y}"/><a:ext cx="11277600" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr><p:txBody><a:bodyPr wrap="square"><a:normAutofit/></a:bodyPr><a:lstStyle/>{paragraphs}</p:txBody></p:sp>"#
    )
}

fn slide(title: &str, lines: &[String]) -> String {
    let body: String = lines.iter().map(|line| paragraph(line, 1400, false)).collect();
    let title_box = text_box(2, "Title", 274_320, 1_143_000, &paragraph(title, 3600, true));
    let body_box = text_box(3, "Body", 1_600_200, 4_983_480, &body);
    format!(
        r#"{XML_DECL}<p:sld xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{title_box}{body_box}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#
    )
}

const THEME: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Lesson"><a:themeElements><a:clrScheme name="Lesson"><a:dk1><a:srgbClr val="000000"/></a:dk1><a:lt1><a:srgbClr val="FFFFFF"/></a:lt1><a:dk2><a:srgbClr val="1F2937"/></a:dk2><a:lt2><a:srgbClr val="F3F4F6"/></a:lt2><a:accent1><a:srgbClr val="2563EB"/></a:accent1><a:accent2><a:srgbClr val="16A34A"/></a:accent2><a:accent3><a:srgbClr val="D97706"/></a:accent3><a:accent4><a:srgbClr val="DC2626"/></a:accent4><a:accent5><a:srgbClr val="7C3AED"/></a:accent5><a:accent6><a:srgbClr val="0891B2"/></a:accent6><a:hlink><a:srgbClr val="2563EB"/></a:hlink><a:folHlink><a:srgbClr val="7C3AED"/></a:folHlink></a:clrScheme><a:fontScheme name="Lesson"><a:majorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont><a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont></a:fontScheme><a:fmtScheme name="Lesson"><a:fillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:fillStyleLst><a:lnStyleLst><a:ln w="6350"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="12700"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="19050"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln></a:lnStyleLst><a:effectStyleLst><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle></a:effectStyleLst><a:bgFillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:bgFillStyleLst></a:fmtScheme></a:themeElements></a:theme>"#;
