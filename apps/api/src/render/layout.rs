//! Document layout — turns metadata plus section text into an ordered list of
//! blocks. Pure; serialization to the package format lives in `docx`.
//!
//! Order: title block, page break, TOC placeholder, page break, then one
//! chapter per content section, each followed by a page break.

use crate::document::{content_sections, ProjectMetadata, SectionContent};

pub const DEFAULT_TITLE: &str = "PROJECT DOCUMENTATION";
pub const IMAGE_PLACEHOLDER: &str = "[Space reserved for project image]";
pub const FOOTER_TEXT: &str = "Page - {PAGE} - (Open in Word to see actual page numbers)";

pub const TOC_HEADING: &str = "TABLE OF CONTENTS";
pub const TOC_NOTE: &str = "This Table of Contents will automatically update when you open the document in Microsoft Word. Right-click and select 'Update Field' to update it.";
pub const TOC_INSTRUCTIONS_LEAD: &str = "To replace this with an actual Table of Contents in Word:";
pub const TOC_STEPS: [&str; 4] = [
    "1. Delete this text",
    "2. Go to References tab",
    "3. Click 'Table of Contents'",
    "4. Select a style",
];

/// Deepest sub-heading level the style sheet defines.
pub const MAX_HEADING_LEVEL: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Justify,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Cover title in the Title style, centered.
    Title(String),
    /// Centered 12pt cover line (author, institution, date, image slot).
    CoverLine(String),
    Heading {
        level: u8,
        text: String,
        alignment: Alignment,
    },
    /// Justified body text at 1.5 line spacing. May contain `\n` line breaks.
    Body(String),
    /// Plain Normal-style paragraph, optionally bold.
    Note { text: String, bold: bool },
    PageBreak,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentLayout {
    pub title: String,
    pub author: String,
    pub blocks: Vec<Block>,
    pub footer: String,
}

impl DocumentLayout {
    pub fn page_breaks(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| matches!(b, Block::PageBreak))
            .count()
    }

    pub fn headings(&self, level: u8) -> impl Iterator<Item = &str> {
        self.blocks.iter().filter_map(move |b| match b {
            Block::Heading { level: l, text, .. } if *l == level => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Lays out the whole document. Sections missing from `sections` still get
/// their chapter heading, with an empty body.
pub fn layout_document(metadata: &ProjectMetadata, sections: &SectionContent) -> DocumentLayout {
    let mut blocks = Vec::new();

    let title = if metadata.title.trim().is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        metadata.title.trim().to_uppercase()
    };
    blocks.push(Block::Title(title.clone()));

    for field in [&metadata.author, &metadata.institution, &metadata.date] {
        if !field.trim().is_empty() {
            blocks.push(Block::CoverLine(field.trim().to_uppercase()));
        }
    }
    blocks.push(Block::CoverLine(IMAGE_PLACEHOLDER.to_string()));
    blocks.push(Block::PageBreak);

    push_toc_placeholder(&mut blocks);
    blocks.push(Block::PageBreak);

    for spec in content_sections() {
        blocks.push(Block::Heading {
            level: 1,
            text: spec.title.to_string(),
            alignment: Alignment::Center,
        });
        if let Some(text) = sections.get(spec.id) {
            blocks.extend(split_paragraphs(text).into_iter().filter_map(paragraph_block));
        }
        blocks.push(Block::PageBreak);
    }

    DocumentLayout {
        title,
        author: metadata.author.trim().to_string(),
        blocks,
        footer: FOOTER_TEXT.to_string(),
    }
}

fn push_toc_placeholder(blocks: &mut Vec<Block>) {
    blocks.push(Block::Heading {
        level: 1,
        text: TOC_HEADING.to_string(),
        alignment: Alignment::Left,
    });
    blocks.push(Block::Note {
        text: TOC_NOTE.to_string(),
        bold: false,
    });
    blocks.push(Block::Note {
        text: TOC_INSTRUCTIONS_LEAD.to_string(),
        bold: true,
    });
    blocks.extend(TOC_STEPS.iter().map(|step| Block::Note {
        text: step.to_string(),
        bold: false,
    }));
}

/// Splits text into paragraphs on blank (whitespace-only) lines.
/// Each paragraph is trimmed; internal single line breaks are kept.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join("\n").trim().to_string());
                current.clear();
            }
        } else {
            current.push(line.trim_end());
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join("\n").trim().to_string());
    }

    paragraphs
}

/// Classifies one paragraph. `## Setup` becomes a level-2 sub-heading
/// `SETUP`; a bare marker run with no text yields nothing.
pub fn paragraph_block(paragraph: String) -> Option<Block> {
    let marker_len = paragraph.chars().take_while(|c| *c == '#').count();
    if marker_len == 0 {
        return Some(Block::Body(paragraph));
    }

    let text = paragraph[marker_len..]
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase();
    if text.is_empty() {
        return None;
    }

    let level = u8::try_from(marker_len)
        .unwrap_or(MAX_HEADING_LEVEL)
        .min(MAX_HEADING_LEVEL);
    Some(Block::Heading {
        level,
        text,
        alignment: Alignment::Left,
    })
}
