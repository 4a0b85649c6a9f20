//! Feedback Reviser — rewrites a single section from free-form user feedback.
//!
//! Only the targeted section changes. The feedback log is append-only and
//! its length drives backend rotation for revisions.

use std::path::PathBuf;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::document::{FeedbackRecord, SectionId};
use crate::errors::AppError;
use crate::generation::prompts::build_revision_prompt;
use crate::llm_client::{BackendPair, BackendSlot};
use crate::render::assemble_in_background;
use crate::session::DocumentSession;

#[derive(Debug, Clone, Serialize)]
pub struct RevisionReport {
    pub section: SectionId,
    pub backend: BackendSlot,
    pub feedback_count: usize,
    pub document_path: PathBuf,
}

/// Revision rotation starts on the secondary backend: an even number of
/// prior feedback entries selects secondary, odd selects primary.
pub fn revision_slot(prior_feedback: usize) -> BackendSlot {
    BackendSlot::from_parity(prior_feedback).other()
}

/// Revises `section` in `session` using `feedback`, then re-assembles the
/// document so the download reflects the latest text.
pub async fn revise_section(
    backends: &BackendPair,
    session: &mut DocumentSession,
    section: SectionId,
    feedback: &str,
) -> Result<RevisionReport, AppError> {
    if section.is_front_matter() {
        return Err(AppError::Validation(format!(
            "Section {section} cannot be revised"
        )));
    }
    if feedback.trim().is_empty() {
        return Err(AppError::Validation(
            "Feedback text cannot be empty".to_string(),
        ));
    }
    // A failed run leaves metadata and partial sections behind; only a
    // completed run opens the session to feedback.
    let metadata = session
        .metadata
        .clone()
        .filter(|_| session.has_generated)
        .ok_or_else(|| {
            AppError::Validation(
                "Generate the documentation before submitting feedback".to_string(),
            )
        })?;

    let spec = section.spec();
    let prompt = {
        let current = session.sections.get(section).ok_or_else(|| {
            AppError::NotFound(format!("Section {section} has not been generated yet"))
        })?;
        build_revision_prompt(spec, current, feedback)
    };

    let slot = revision_slot(session.feedback.len());
    let backend = backends.get(slot);
    info!("Revising {} via {} for session {}", spec.title, backend.name(), session.id);

    let revised = backend.complete(&prompt).await.map_err(|e| {
        warn!("Revision of {} failed; section left unchanged", section);
        AppError::Llm(format!("Error updating {} via {}: {e}", spec.title, backend.name()))
    })?;

    session.sections.insert(section, revised);
    session.feedback.push(FeedbackRecord {
        section,
        section_title: spec.title.to_string(),
        feedback: feedback.to_string(),
        timestamp: Utc::now(),
    });

    let document_path = assemble_in_background(
        metadata,
        session.sections.clone(),
        session.output_path.clone(),
    )
    .await?;

    Ok(RevisionReport {
        section,
        backend: slot,
        feedback_count: session.feedback.len(),
        document_path,
    })
}
