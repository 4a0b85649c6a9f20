//! Document Generation — orchestrates one full run over the section catalog.
//!
//! Flow: validate abstract → reset sections → for each catalog entry
//!       (cover skipped): contents literal | build prompt → backend by parity →
//!       store text → assemble .docx → mark session generated.
//!
//! Sections are generated strictly one at a time. A backend failure aborts
//! the run but keeps every section already stored.

use std::path::PathBuf;

use serde::Serialize;
use tracing::{info, warn};

use crate::document::{
    catalog, ProjectContext, ProjectMetadata, SectionId, CONTENTS_PLACEHOLDER,
};
use crate::errors::AppError;
use crate::generation::prompts::build_section_prompt;
use crate::llm_client::{BackendPair, BackendSlot};
use crate::render::assemble_in_background;
use crate::session::DocumentSession;

/// One backend call made during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionCall {
    pub section: SectionId,
    pub backend: BackendSlot,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    /// Entries stored in the session, including the contents literal.
    pub sections_stored: usize,
    pub calls: Vec<SectionCall>,
    pub document_path: PathBuf,
}

/// Runs the full generation pipeline against `session`.
///
/// Steps:
/// 1. Reject an empty abstract (no state change)
/// 2. Record metadata/context and clear previous sections
/// 3. Fill each non-cover section in catalog order
/// 4. Assemble the document to the session's output path
pub async fn generate_document(
    backends: &BackendPair,
    session: &mut DocumentSession,
    metadata: ProjectMetadata,
    context: ProjectContext,
) -> Result<GenerationReport, AppError> {
    // Step 1: Validate
    if context.abstract_text.trim().is_empty() {
        return Err(AppError::Validation(
            "Please enter a project abstract.".to_string(),
        ));
    }

    // Step 2: Reset
    info!(
        "Generating documentation for session {} ({} project)",
        session.id, metadata.project_type
    );
    session.metadata = Some(metadata.clone());
    session.context = Some(context.clone());
    session.sections.clear();

    // Step 3: Fill sections
    let mut calls = Vec::new();
    for spec in catalog().iter().filter(|s| s.id != SectionId::CoverPage) {
        if spec.id == SectionId::Contents {
            session.sections.insert(spec.id, CONTENTS_PLACEHOLDER);
            continue;
        }

        let slot = BackendSlot::from_parity(session.sections.len());
        let backend = backends.get(slot);
        let prompt = build_section_prompt(spec, metadata.project_type, &context);

        info!("Generating {} via {}", spec.title, backend.name());
        let text = match backend.complete(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    "Generation aborted at {} for session {}; keeping {} stored sections",
                    spec.id,
                    session.id,
                    session.sections.len()
                );
                return Err(AppError::Llm(format!(
                    "Error generating {} via {}: {e}",
                    spec.title,
                    backend.name()
                )));
            }
        };

        session.sections.insert(spec.id, text);
        calls.push(SectionCall {
            section: spec.id,
            backend: slot,
        });
    }

    // Step 4: Assemble
    let document_path = assemble_in_background(
        metadata,
        session.sections.clone(),
        session.output_path.clone(),
    )
    .await?;
    session.has_generated = true;

    info!(
        "Generated {} sections ({} backend calls) for session {}",
        session.sections.len(),
        calls.len(),
        session.id
    );

    Ok(GenerationReport {
        sections_stored: session.sections.len(),
        calls,
        document_path,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::document::{content_sections, ProjectType};
    use crate::llm_client::testing::fake_pair;

    fn session(dir: &tempfile::TempDir) -> DocumentSession {
        DocumentSession::new(Uuid::new_v4(), dir.path())
    }

    fn metadata() -> ProjectMetadata {
        ProjectMetadata {
            title: "Bluetooth Robot Car".to_string(),
            author: "J. Doe".to_string(),
            institution: "State College".to_string(),
            project_type: ProjectType::ArduinoBased,
            date: "October 19, 2026".to_string(),
        }
    }

    fn context() -> ProjectContext {
        ProjectContext {
            abstract_text: "A Bluetooth-controlled robot car using Arduino".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_full_run_populates_ten_entries_and_writes_document() {
        let dir = tempfile::tempdir().unwrap();
        let (primary, secondary, pair) = fake_pair();
        let mut session = session(&dir);

        let report = generate_document(&pair, &mut session, metadata(), context())
            .await
            .unwrap();

        assert_eq!(report.sections_stored, 10);
        assert_eq!(session.sections.len(), 10);
        assert!(!session.sections.contains(SectionId::CoverPage));
        assert_eq!(
            session.sections.get(SectionId::Contents),
            Some(CONTENTS_PLACEHOLDER)
        );
        assert_eq!(report.calls.len(), 9);
        assert_eq!(primary.call_count() + secondary.call_count(), 9);
        assert!(session.has_generated);
        assert!(report.document_path.exists());
        assert_eq!(report.document_path, session.output_path);
    }

    #[tokio::test]
    async fn test_backend_alternates_by_stored_count() {
        let dir = tempfile::tempdir().unwrap();
        let (primary, secondary, pair) = fake_pair();
        let mut session = session(&dir);

        let report = generate_document(&pair, &mut session, metadata(), context())
            .await
            .unwrap();

        // Contents occupies slot 0 without a call, so the abstract (count 1)
        // goes to the secondary backend and calls alternate from there.
        for (i, call) in report.calls.iter().enumerate() {
            assert_eq!(call.backend, BackendSlot::from_parity(i + 1));
        }
        let order: Vec<SectionId> = report.calls.iter().map(|c| c.section).collect();
        let expected: Vec<SectionId> = content_sections().map(|s| s.id).collect();
        assert_eq!(order, expected);
        assert_eq!(secondary.call_count(), 5);
        assert_eq!(primary.call_count(), 4);
        assert!(secondary.prompts.lock().unwrap()[0].contains("Generate the ABSTRACT section"));
    }

    #[tokio::test]
    async fn test_contents_never_reaches_a_backend() {
        let dir = tempfile::tempdir().unwrap();
        let (primary, secondary, pair) = fake_pair();
        let mut session = session(&dir);

        generate_document(&pair, &mut session, metadata(), context())
            .await
            .unwrap();

        let all_prompts: Vec<String> = primary
            .prompts
            .lock()
            .unwrap()
            .iter()
            .chain(secondary.prompts.lock().unwrap().iter())
            .cloned()
            .collect();
        assert!(all_prompts
            .iter()
            .all(|p| !p.starts_with("Generate the TABLE OF CONTENTS")));
        assert!(all_prompts
            .iter()
            .all(|p| !p.starts_with("Generate the COVER PAGE")));
    }

    #[tokio::test]
    async fn test_empty_abstract_rejected_without_state_change() {
        let dir = tempfile::tempdir().unwrap();
        let (primary, secondary, pair) = fake_pair();
        let mut session = session(&dir);
        session.sections.insert(SectionId::Abstract, "previous");

        let ctx = ProjectContext {
            abstract_text: "   ".to_string(),
            ..Default::default()
        };
        let err = generate_document(&pair, &mut session, metadata(), ctx)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(session.sections.get(SectionId::Abstract), Some("previous"));
        assert!(session.metadata.is_none());
        assert_eq!(primary.call_count() + secondary.call_count(), 0);
    }

    #[tokio::test]
    async fn test_backend_failure_aborts_and_keeps_generated_sections() {
        let dir = tempfile::tempdir().unwrap();
        let (primary, secondary, pair) = fake_pair();
        // Secondary: ABSTRACT ok; primary: LITERATURE_SURVEY ok; secondary: CHAPTER_1 fails.
        secondary.push_reply(Ok("Abstract text."));
        secondary.push_reply(Err("provider down"));
        let mut session = session(&dir);

        let err = generate_document(&pair, &mut session, metadata(), context())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Llm(ref msg) if msg.contains("CHAPTER 1: INTRODUCTION")));
        assert_eq!(session.sections.len(), 3);
        assert_eq!(session.sections.get(SectionId::Abstract), Some("Abstract text."));
        assert!(session.sections.contains(SectionId::LiteratureSurvey));
        assert!(!session.sections.contains(SectionId::Chapter1));
        assert!(!session.has_generated);
        assert!(!session.output_path.exists());
        assert_eq!(primary.call_count(), 1);
    }

    #[tokio::test]
    async fn test_regeneration_clears_previous_sections() {
        let dir = tempfile::tempdir().unwrap();
        let (_, secondary, pair) = fake_pair();
        let mut session = session(&dir);
        generate_document(&pair, &mut session, metadata(), context())
            .await
            .unwrap();

        secondary.push_reply(Ok("Fresh abstract."));
        generate_document(&pair, &mut session, metadata(), context())
            .await
            .unwrap();
        assert_eq!(session.sections.get(SectionId::Abstract), Some("Fresh abstract."));
        assert_eq!(session.sections.len(), 10);
    }
}
