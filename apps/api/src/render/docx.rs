//! WordprocessingML package writer.
//!
//! Emits the minimal part set Word needs (content types, relationships,
//! document, styles, footer, core properties). Zip entries carry a fixed
//! timestamp so identical layouts produce identical bytes.

use std::io::{Seek, Write};

use quick_xml::escape::escape;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use super::layout::{Alignment, Block, DocumentLayout};
use super::RenderError;

pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

// ────────────────────────────────────────────────────────────────────────────
// Style sheet (declarative; applied once via styles.xml)
// ────────────────────────────────────────────────────────────────────────────

const BODY_FONT: &str = "Times New Roman";
const HEADING_FONT: &str = "Arial";
const BODY_SIZE_PT: u32 = 12;
const TITLE_SIZE_PT: u32 = 26;
/// 1.5 line spacing in 240ths of a line.
const LINE_ONE_AND_HALF: u32 = 360;
const SPACE_AFTER_TWIPS: u32 = 240;
const HEADING_SPACE_BEFORE_TWIPS: u32 = 480;
/// US Letter, 1" margins, in twips.
const PAGE_WIDTH: u32 = 12240;
const PAGE_HEIGHT: u32 = 15840;
const MARGIN: u32 = 1440;

struct HeadingStyle {
    level: u8,
    size_pt: u32,
}

const HEADING_STYLES: [HeadingStyle; 4] = [
    HeadingStyle { level: 1, size_pt: 16 },
    HeadingStyle { level: 2, size_pt: 14 },
    HeadingStyle { level: 3, size_pt: 13 },
    HeadingStyle { level: 4, size_pt: 12 },
];

/// Half-points, the unit of `w:sz`.
fn half_points(pt: u32) -> u32 {
    pt * 2
}

fn styles_xml() -> String {
    let mut xml = String::new();
    xml.push_str(XML_DECL);
    xml.push_str(&format!(r#"<w:styles xmlns:w="{W_NS}">"#));

    xml.push_str(&format!(
        concat!(
            r#"<w:docDefaults><w:rPrDefault><w:rPr>"#,
            r#"<w:rFonts w:ascii="{font}" w:hAnsi="{font}" w:cs="{font}"/>"#,
            r#"<w:sz w:val="{sz}"/><w:szCs w:val="{sz}"/>"#,
            r#"</w:rPr></w:rPrDefault></w:docDefaults>"#
        ),
        font = BODY_FONT,
        sz = half_points(BODY_SIZE_PT),
    ));

    xml.push_str(&format!(
        concat!(
            r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal">"#,
            r#"<w:name w:val="Normal"/><w:qFormat/>"#,
            r#"<w:pPr><w:spacing w:after="{after}" w:line="{line}" w:lineRule="auto"/><w:jc w:val="both"/></w:pPr>"#,
            r#"<w:rPr><w:rFonts w:ascii="{font}" w:hAnsi="{font}" w:cs="{font}"/>"#,
            r#"<w:color w:val="000000"/><w:sz w:val="{sz}"/><w:szCs w:val="{sz}"/></w:rPr>"#,
            r#"</w:style>"#
        ),
        after = SPACE_AFTER_TWIPS,
        line = LINE_ONE_AND_HALF,
        font = BODY_FONT,
        sz = half_points(BODY_SIZE_PT),
    ));

    xml.push_str(&format!(
        concat!(
            r#"<w:style w:type="paragraph" w:styleId="Title">"#,
            r#"<w:name w:val="Title"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/>"#,
            r#"<w:pPr><w:spacing w:after="{after}"/><w:jc w:val="center"/></w:pPr>"#,
            r#"<w:rPr><w:rFonts w:ascii="{font}" w:hAnsi="{font}" w:cs="{font}"/>"#,
            r#"<w:b/><w:color w:val="000000"/><w:sz w:val="{sz}"/><w:szCs w:val="{sz}"/></w:rPr>"#,
            r#"</w:style>"#
        ),
        after = SPACE_AFTER_TWIPS,
        font = HEADING_FONT,
        sz = half_points(TITLE_SIZE_PT),
    ));

    for style in &HEADING_STYLES {
        xml.push_str(&format!(
            concat!(
                r#"<w:style w:type="paragraph" w:styleId="Heading{level}">"#,
                r#"<w:name w:val="heading {level}"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/>"#,
                r#"<w:pPr><w:keepNext/>"#,
                r#"<w:pBdr><w:top w:val="single" w:sz="6" w:space="1" w:color="000000"/>"#,
                r#"<w:bottom w:val="single" w:sz="6" w:space="1" w:color="000000"/></w:pBdr>"#,
                r#"<w:spacing w:before="{before}" w:after="{after}"/><w:outlineLvl w:val="{outline}"/></w:pPr>"#,
                r#"<w:rPr><w:rFonts w:ascii="{font}" w:hAnsi="{font}" w:cs="{font}"/>"#,
                r#"<w:b/><w:caps/><w:color w:val="000000"/><w:sz w:val="{sz}"/><w:szCs w:val="{sz}"/></w:rPr>"#,
                r#"</w:style>"#
            ),
            level = style.level,
            before = HEADING_SPACE_BEFORE_TWIPS,
            after = SPACE_AFTER_TWIPS,
            outline = style.level - 1,
            font = HEADING_FONT,
            sz = half_points(style.size_pt),
        ));
    }

    xml.push_str("</w:styles>");
    xml
}

// ────────────────────────────────────────────────────────────────────────────
// Body
// ────────────────────────────────────────────────────────────────────────────

fn jc(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::Left => "left",
        Alignment::Center => "center",
        Alignment::Justify => "both",
    }
}

/// XML 1.0 `Char` production. Control characters other than tab, LF and CR
/// (and the U+FFFE/U+FFFF noncharacters) make the part unreadable.
fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

/// Escaped character data with XML-illegal characters dropped.
fn xml_text(raw: &str) -> String {
    if raw.chars().all(is_xml_char) {
        return escape(raw).into_owned();
    }
    let cleaned: String = raw.chars().filter(|c| is_xml_char(*c)).collect();
    escape(cleaned.as_str()).into_owned()
}

/// Runs for `text`, turning `\n` into `w:br` line breaks.
fn text_runs(text: &str, run_props: &str) -> String {
    let mut xml = String::from("<w:r>");
    xml.push_str(run_props);
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            xml.push_str("<w:br/>");
        }
        xml.push_str(r#"<w:t xml:space="preserve">"#);
        xml.push_str(&xml_text(line));
        xml.push_str("</w:t>");
    }
    xml.push_str("</w:r>");
    xml
}

fn paragraph(props: &str, runs: &str) -> String {
    format!("<w:p><w:pPr>{props}</w:pPr>{runs}</w:p>")
}

fn block_xml(block: &Block) -> String {
    match block {
        Block::Title(text) => paragraph(
            r#"<w:pStyle w:val="Title"/><w:jc w:val="center"/>"#,
            &text_runs(text, ""),
        ),
        Block::CoverLine(text) => paragraph(
            r#"<w:jc w:val="center"/>"#,
            &text_runs(
                text,
                &format!(r#"<w:rPr><w:sz w:val="{}"/></w:rPr>"#, half_points(BODY_SIZE_PT)),
            ),
        ),
        Block::Heading {
            level,
            text,
            alignment,
        } => paragraph(
            &format!(
                r#"<w:pStyle w:val="Heading{level}"/><w:jc w:val="{}"/>"#,
                jc(*alignment)
            ),
            &text_runs(text, ""),
        ),
        Block::Body(text) => paragraph(
            &format!(
                r#"<w:spacing w:line="{LINE_ONE_AND_HALF}" w:lineRule="auto"/><w:jc w:val="{}"/>"#,
                jc(Alignment::Justify)
            ),
            &text_runs(text, ""),
        ),
        Block::Note { text, bold } => {
            let props = if *bold { "<w:rPr><w:b/></w:rPr>" } else { "" };
            format!("<w:p>{}</w:p>", text_runs(text, props))
        }
        Block::PageBreak => r#"<w:p><w:r><w:br w:type="page"/></w:r></w:p>"#.to_string(),
    }
}

fn document_xml(layout: &DocumentLayout) -> String {
    let mut xml = String::new();
    xml.push_str(XML_DECL);
    xml.push_str(&format!(
        r#"<w:document xmlns:w="{W_NS}" xmlns:r="{R_NS}"><w:body>"#
    ));
    for block in &layout.blocks {
        xml.push_str(&block_xml(block));
    }
    // Footer is rId2 in document.xml.rels; titlePg keeps it off the cover.
    xml.push_str(&format!(
        concat!(
            r#"<w:sectPr><w:footerReference w:type="default" r:id="rId2"/>"#,
            r#"<w:pgSz w:w="{w}" w:h="{h}"/>"#,
            r#"<w:pgMar w:top="{m}" w:right="{m}" w:bottom="{m}" w:left="{m}" w:header="720" w:footer="720" w:gutter="0"/>"#,
            r#"<w:titlePg/></w:sectPr>"#
        ),
        w = PAGE_WIDTH,
        h = PAGE_HEIGHT,
        m = MARGIN,
    ));
    xml.push_str("</w:body></w:document>");
    xml
}

fn footer_xml(layout: &DocumentLayout) -> String {
    format!(
        r#"{XML_DECL}<w:ftr xmlns:w="{W_NS}">{}</w:ftr>"#,
        paragraph(r#"<w:jc w:val="center"/>"#, &text_runs(&layout.footer, ""))
    )
}

fn core_xml(layout: &DocumentLayout) -> String {
    format!(
        concat!(
            "{decl}",
            r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
            r#"xmlns:dc="http://purl.org/dc/elements/1.1/">"#,
            "<dc:title>{title}</dc:title><dc:creator>{creator}</dc:creator>",
            "</cp:coreProperties>"
        ),
        decl = XML_DECL,
        title = xml_text(&layout.title),
        creator = xml_text(&layout.author),
    )
}

const CONTENT_TYPES_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
    r#"<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>"#,
    r#"<Override PartName="/word/footer1.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml"/>"#,
    r#"<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#,
    r#"</Types>"#
);

const PACKAGE_RELS_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>"#,
    r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>"#,
    r#"</Relationships>"#
);

const DOCUMENT_RELS_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
    r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer" Target="footer1.xml"/>"#,
    r#"</Relationships>"#
);

fn entry_options() -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
}

/// Writes the full package for `layout` into `writer` and returns it.
pub fn write_package<W: Write + Seek>(layout: &DocumentLayout, writer: W) -> Result<W, RenderError> {
    let parts: [(&str, String); 7] = [
        ("[Content_Types].xml", CONTENT_TYPES_XML.to_string()),
        ("_rels/.rels", PACKAGE_RELS_XML.to_string()),
        ("docProps/core.xml", core_xml(layout)),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS_XML.to_string()),
        ("word/document.xml", document_xml(layout)),
        ("word/styles.xml", styles_xml()),
        ("word/footer1.xml", footer_xml(layout)),
    ];

    let mut zip = ZipWriter::new(writer);
    for (name, body) in parts {
        zip.start_file(name, entry_options())?;
        zip.write_all(body.as_bytes())?;
    }
    Ok(zip.finish()?)
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};

    use super::*;
    use crate::document::{ProjectMetadata, ProjectType, SectionContent, SectionId};
    use crate::render::layout::layout_document;

    fn layout() -> DocumentLayout {
        let meta = ProjectMetadata {
            title: "Smart <Irrigation> & Co".to_string(),
            author: "R. Patel".to_string(),
            institution: "Tech Institute".to_string(),
            project_type: ProjectType::IotProject,
            date: "January 02, 2026".to_string(),
        };
        let mut sections = SectionContent::new();
        sections.insert(
            SectionId::Chapter1,
            "## Background\n\nLine one\nline two.\n\nPlain text.",
        );
        layout_document(&meta, &sections)
    }

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut part = archive.by_name(name).unwrap();
        let mut out = String::new();
        part.read_to_string(&mut out).unwrap();
        out
    }

    fn package_bytes(layout: &DocumentLayout) -> Vec<u8> {
        write_package(layout, Cursor::new(Vec::new()))
            .unwrap()
            .into_inner()
    }

    #[test]
    fn test_package_contains_all_parts() {
        let bytes = package_bytes(&layout());
        let archive = zip::ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        for expected in [
            "[Content_Types].xml",
            "_rels/.rels",
            "docProps/core.xml",
            "word/_rels/document.xml.rels",
            "word/document.xml",
            "word/styles.xml",
            "word/footer1.xml",
        ] {
            assert!(names.contains(&expected), "missing part {expected}");
        }
    }

    #[test]
    fn test_document_escapes_text_and_counts_page_breaks() {
        let layout = layout();
        let doc = read_part(&package_bytes(&layout), "word/document.xml");
        assert!(doc.contains("SMART &lt;IRRIGATION&gt; &amp; CO"));
        assert_eq!(doc.matches(r#"w:type="page""#).count(), layout.page_breaks());
        assert_eq!(doc.matches(r#"<w:pStyle w:val="Heading1"/>"#).count(), 10);
        assert!(doc.contains(r#"<w:pStyle w:val="Heading2"/><w:jc w:val="left"/>"#));
        assert!(doc.contains(">BACKGROUND<"));
    }

    #[test]
    fn test_body_paragraph_is_justified_with_line_breaks() {
        let doc = read_part(&package_bytes(&layout()), "word/document.xml");
        assert!(doc.contains(
            r#"<w:t xml:space="preserve">Line one</w:t><w:br/><w:t xml:space="preserve">line two.</w:t>"#
        ));
        assert!(doc.contains(r#"<w:jc w:val="both"/>"#));
    }

    #[test]
    fn test_styles_define_fonts_caps_and_borders() {
        let styles = read_part(&package_bytes(&layout()), "word/styles.xml");
        assert!(styles.contains(r#"w:ascii="Times New Roman""#));
        assert!(styles.contains(r#"w:styleId="Heading4""#));
        assert_eq!(styles.matches("<w:caps/>").count(), 4);
        assert_eq!(styles.matches("<w:pBdr>").count(), 4);
        assert!(styles.contains(r#"w:line="360""#));
    }

    #[test]
    fn test_footer_literal() {
        let footer = read_part(&package_bytes(&layout()), "word/footer1.xml");
        assert!(footer.contains("Page - {PAGE} - (Open in Word to see actual page numbers)"));
    }

    #[test]
    fn test_control_characters_are_dropped_from_every_part() {
        let meta = ProjectMetadata {
            title: "Rover\u{0007}".to_string(),
            author: "Ann\u{0000} Lee".to_string(),
            institution: String::new(),
            project_type: ProjectType::Other,
            date: String::new(),
        };
        let mut sections = SectionContent::new();
        sections.insert(SectionId::Chapter1, "Page one\u{000C}page two \u{0001} end.\tTabbed.");
        let bytes = package_bytes(&layout_document(&meta, &sections));

        let illegal = |c: char| c.is_control() && !matches!(c, '\t' | '\n' | '\r');
        for part in ["word/document.xml", "docProps/core.xml"] {
            let xml = read_part(&bytes, part);
            assert!(!xml.chars().any(illegal), "{part} contains a control character");
        }
        let doc = read_part(&bytes, "word/document.xml");
        assert!(doc.contains("Page onepage two  end.\tTabbed."));
        assert!(read_part(&bytes, "docProps/core.xml").contains("<dc:creator>Ann Lee</dc:creator>"));
    }

    #[test]
    fn test_identical_layouts_produce_identical_bytes() {
        let layout = layout();
        assert_eq!(package_bytes(&layout), package_bytes(&layout));
    }
}
