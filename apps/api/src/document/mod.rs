// Document model: the section catalog and the per-run data it is filled with.

pub mod catalog;
pub mod models;

pub use catalog::{catalog, content_sections, SectionId, SectionSpec};
pub use models::{
    FeedbackRecord, ProjectContext, ProjectMetadata, ProjectType, SectionContent,
    CONTENTS_PLACEHOLDER,
};
