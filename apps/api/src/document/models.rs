use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::document::catalog::SectionId;

/// Literal stored for the contents section instead of generated text.
/// Real pagination is left to the destination word processor.
pub const CONTENTS_PLACEHOLDER: &str = "TABLE OF CONTENTS";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ProjectType {
    #[default]
    #[serde(rename = "Arduino-based")]
    ArduinoBased,
    #[serde(rename = "Raspberry Pi-based")]
    RaspberryPiBased,
    #[serde(rename = "IoT Project")]
    IotProject,
    #[serde(rename = "Embedded Systems")]
    EmbeddedSystems,
    #[serde(rename = "Other")]
    Other,
}

impl ProjectType {
    pub fn label(&self) -> &'static str {
        match self {
            ProjectType::ArduinoBased => "Arduino-based",
            ProjectType::RaspberryPiBased => "Raspberry Pi-based",
            ProjectType::IotProject => "IoT Project",
            ProjectType::EmbeddedSystems => "Embedded Systems",
            ProjectType::Other => "Other",
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Cover-page metadata, fixed for the duration of one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub title: String,
    pub author: String,
    pub institution: String,
    pub project_type: ProjectType,
    /// Pre-formatted, e.g. "October 19, 2026".
    pub date: String,
}

impl ProjectMetadata {
    /// Builds metadata stamped with today's local date.
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        institution: impl Into<String>,
        project_type: ProjectType,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            institution: institution.into(),
            project_type,
            date: Local::now().format("%B %d, %Y").to_string(),
        }
    }
}

/// Free-text inputs that feed every generation prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectContext {
    #[serde(rename = "abstract", default)]
    pub abstract_text: String,
    #[serde(default)]
    pub technologies: String,
    #[serde(default)]
    pub objectives: String,
    #[serde(default)]
    pub components: String,
}

/// Latest generated or revised text per section, iterated in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SectionContent(BTreeMap<SectionId, String>);

impl SectionContent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: SectionId) -> Option<&str> {
        self.0.get(&id).map(String::as_str)
    }

    /// Stores `text` for `id`, returning the previous value if any.
    pub fn insert(&mut self, id: SectionId, text: impl Into<String>) -> Option<String> {
        self.0.insert(id, text.into())
    }

    #[cfg(test)]
    pub fn contains(&self, id: SectionId) -> bool {
        self.0.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn ids(&self) -> impl Iterator<Item = SectionId> + '_ {
        self.0.keys().copied()
    }
}

/// Audit entry for one revision request. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedbackRecord {
    pub section: SectionId,
    pub section_title: String,
    pub feedback: String,
    pub timestamp: DateTime<Utc>,
}
