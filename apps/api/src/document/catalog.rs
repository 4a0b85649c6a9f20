//! Section Catalog — the fixed, ordered list of sections every generated
//! document is made of.
//!
//! Order matters: front matter (cover, contents) first, references last.
//! `SectionId` derives `Ord` in declaration order, so any `BTreeMap` keyed by
//! it iterates in catalog order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Target words per page used for length instructions in prompts.
pub const WORDS_PER_PAGE: u32 = 500;

/// Stable identifier of a catalog section. Serialized as `CHAPTER_3` etc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SectionId {
    CoverPage,
    Contents,
    Abstract,
    LiteratureSurvey,
    #[serde(rename = "CHAPTER_1")]
    Chapter1,
    #[serde(rename = "CHAPTER_2")]
    Chapter2,
    #[serde(rename = "CHAPTER_3")]
    Chapter3,
    #[serde(rename = "CHAPTER_4")]
    Chapter4,
    #[serde(rename = "CHAPTER_5")]
    Chapter5,
    #[serde(rename = "CHAPTER_6")]
    Chapter6,
    References,
}

impl SectionId {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionId::CoverPage => "COVER_PAGE",
            SectionId::Contents => "CONTENTS",
            SectionId::Abstract => "ABSTRACT",
            SectionId::LiteratureSurvey => "LITERATURE_SURVEY",
            SectionId::Chapter1 => "CHAPTER_1",
            SectionId::Chapter2 => "CHAPTER_2",
            SectionId::Chapter3 => "CHAPTER_3",
            SectionId::Chapter4 => "CHAPTER_4",
            SectionId::Chapter5 => "CHAPTER_5",
            SectionId::Chapter6 => "CHAPTER_6",
            SectionId::References => "REFERENCES",
        }
    }

    /// Cover page and table of contents are laid out by the assembler itself
    /// and never rendered as a regular chapter.
    pub fn is_front_matter(&self) -> bool {
        matches!(self, SectionId::CoverPage | SectionId::Contents)
    }

    /// Catalog entry for this id. Variants are declared in catalog order.
    pub fn spec(&self) -> &'static SectionSpec {
        &CATALOG[*self as usize]
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSection(pub String);

impl fmt::Display for UnknownSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown section '{}'", self.0)
    }
}

impl std::error::Error for UnknownSection {}

impl FromStr for SectionId {
    type Err = UnknownSection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CATALOG
            .iter()
            .map(|spec| spec.id)
            .find(|id| id.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownSection(s.to_string()))
    }
}

/// Immutable description of one document section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionSpec {
    pub id: SectionId,
    pub title: &'static str,
    pub pages: u32,
    /// What the section is for. Front matter has none.
    pub description: Option<&'static str>,
    /// Extra section-specific instruction appended to the generation prompt.
    pub guidance: Option<&'static str>,
}

impl SectionSpec {
    pub fn target_words(&self) -> u32 {
        self.pages * WORDS_PER_PAGE
    }

    pub fn description_or_empty(&self) -> &'static str {
        self.description.unwrap_or("")
    }
}

pub static CATALOG: [SectionSpec; 11] = [
    SectionSpec {
        id: SectionId::CoverPage,
        title: "COVER PAGE",
        pages: 1,
        description: None,
        guidance: None,
    },
    SectionSpec {
        id: SectionId::Contents,
        title: "TABLE OF CONTENTS",
        pages: 1,
        description: None,
        guidance: None,
    },
    SectionSpec {
        id: SectionId::Abstract,
        title: "ABSTRACT",
        pages: 1,
        description: Some(
            "Provides a high-level summary of the project, including objectives, methodology, and expected outcomes.",
        ),
        guidance: None,
    },
    SectionSpec {
        id: SectionId::LiteratureSurvey,
        title: "LITERATURE SURVEY",
        pages: 3,
        description: Some(
            "Reviews existing research, technologies, and methodologies related to the project.",
        ),
        guidance: Some(
            "Review at least 5-7 similar projects or related research papers, mentioning their approaches and results.",
        ),
    },
    SectionSpec {
        id: SectionId::Chapter1,
        title: "CHAPTER 1: INTRODUCTION",
        pages: 3,
        description: Some("Explains the background, significance, and objectives of the project."),
        guidance: None,
    },
    SectionSpec {
        id: SectionId::Chapter2,
        title: "CHAPTER 2: WORKING AND BLOCK DIAGRAM",
        pages: 4,
        description: Some(
            "Details the working principle and block diagram representation of the system.",
        ),
        guidance: None,
    },
    SectionSpec {
        id: SectionId::Chapter3,
        title: "CHAPTER 3: HARDWARE COMPONENTS DESCRIPTION",
        pages: 5,
        description: Some(
            "Describes the components used (Arduino, Bluetooth module, motor driver, sensors, etc.).",
        ),
        guidance: Some(
            "Focus on hardware components like Arduino, sensors, and other electronic components. Describe their specifications and roles in detail.",
        ),
    },
    SectionSpec {
        id: SectionId::Chapter4,
        title: "CHAPTER 4: SOFTWARE DESCRIPTION",
        pages: 4,
        description: Some(
            "Covers programming aspects, including Arduino code and mobile app interface.",
        ),
        guidance: Some(
            "Explain the programming approach, include pseudocode or algorithm descriptions (not actual code), and detail the software workflow.",
        ),
    },
    SectionSpec {
        id: SectionId::Chapter5,
        title: "CHAPTER 5: ADVANTAGES & APPLICATIONS",
        pages: 2,
        description: Some(
            "Highlights benefits and potential real-world applications of the project.",
        ),
        guidance: None,
    },
    SectionSpec {
        id: SectionId::Chapter6,
        title: "CHAPTER 6: FUTURE SCOPE & CONCLUSION",
        pages: 2,
        description: Some("Discusses improvements, extensions, and final remarks on the project."),
        guidance: None,
    },
    SectionSpec {
        id: SectionId::References,
        title: "REFERENCES",
        pages: 1,
        description: Some("Lists cited sources, books, research papers, and online materials."),
        guidance: None,
    },
];

/// The full catalog in order.
pub fn catalog() -> &'static [SectionSpec] {
    &CATALOG
}

/// Catalog entries rendered as chapters (everything but front matter).
pub fn content_sections() -> impl Iterator<Item = &'static SectionSpec> {
    CATALOG.iter().filter(|s| !s.id.is_front_matter())
}
