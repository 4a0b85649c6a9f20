//! Axum route handlers for the documentation API.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::document::{
    catalog, ProjectContext, ProjectMetadata, ProjectType, SectionId,
};
use crate::errors::AppError;
use crate::generation::generator::{generate_document, GenerationReport};
use crate::generation::reviser::{revise_section, RevisionReport};
use crate::render::DOCX_MIME;
use crate::session::SharedSession;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SectionSummary {
    pub id: SectionId,
    pub title: &'static str,
    pub pages: u32,
    pub description: Option<&'static str>,
    pub front_matter: bool,
}

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub sections: Vec<SectionSummary>,
}

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct SessionStatusResponse {
    pub session_id: Uuid,
    pub has_generated: bool,
    pub metadata: Option<ProjectMetadata>,
    pub sections: Vec<SectionId>,
    pub feedback_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub institution: String,
    #[serde(default)]
    pub project_type: ProjectType,
    #[serde(flatten)]
    pub context: ProjectContext,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub session_id: Uuid,
    pub has_generated: bool,
    pub report: GenerationReport,
}

#[derive(Debug, Serialize)]
pub struct SectionDetailResponse {
    pub section: SectionId,
    pub title: &'static str,
    pub description: &'static str,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub feedback: String,
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub content: String,
    pub revision: RevisionReport,
}

#[derive(Debug, Serialize)]
pub struct FeedbackEntry {
    pub section: SectionId,
    pub section_title: String,
    pub feedback: String,
    /// `%Y-%m-%d %H:%M:%S`, UTC.
    pub time: String,
}

#[derive(Debug, Serialize)]
pub struct FeedbackHistoryResponse {
    /// Newest first.
    pub entries: Vec<FeedbackEntry>,
}

/// Which download button asked for the file; only the suggested name differs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadSource {
    #[default]
    Header,
    Review,
}

impl DownloadSource {
    pub fn file_name(&self) -> &'static str {
        match self {
            DownloadSource::Header => "project_documentation.docx",
            DownloadSource::Review => "documentation.docx",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    #[serde(default)]
    pub source: DownloadSource,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

async fn find_session(state: &AppState, session_id: Uuid) -> Result<SharedSession, AppError> {
    state
        .sessions
        .get(session_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {session_id} not found")))
}

fn parse_section(raw: &str) -> Result<SectionId, AppError> {
    raw.parse::<SectionId>()
        .map_err(|e| AppError::NotFound(e.to_string()))
}

/// GET /api/v1/sections
///
/// The fixed section catalog, in document order.
pub async fn handle_list_sections() -> Json<CatalogResponse> {
    let sections = catalog()
        .iter()
        .map(|spec| SectionSummary {
            id: spec.id,
            title: spec.title,
            pages: spec.pages,
            description: spec.description,
            front_matter: spec.id.is_front_matter(),
        })
        .collect();
    Json(CatalogResponse { sections })
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> Json<CreateSessionResponse> {
    let (session_id, _) = state.sessions.create().await;
    tracing::info!(
        "Created session {session_id} ({} open)",
        state.sessions.len().await
    );
    Json(CreateSessionResponse { session_id })
}

/// GET /api/v1/sessions/:id
pub async fn handle_session_status(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionStatusResponse>, AppError> {
    let session = find_session(&state, session_id).await?;
    let session = session.lock().await;

    Ok(Json(SessionStatusResponse {
        session_id,
        has_generated: session.has_generated,
        metadata: session.metadata.clone(),
        sections: session.sections.ids().collect(),
        feedback_count: session.feedback.len(),
    }))
}

/// DELETE /api/v1/sessions/:id
///
/// Drops the session and its output directory. Waits for any action already
/// running on the session to finish first.
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let session = state
        .sessions
        .remove(session_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {session_id} not found")))?;

    let session_dir = {
        let session = session.lock().await;
        session.output_path.parent().map(|dir| dir.to_path_buf())
    };

    if let Some(dir) = session_dir {
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(AppError::Internal(
                    anyhow::Error::new(e)
                        .context(format!("Failed to remove {}", dir.display())),
                ))
            }
        }
    }

    tracing::info!(
        "Deleted session {session_id} ({} open)",
        state.sessions.len().await
    );
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/sessions/:id/generate
///
/// Full run: every section generated in order, then the document assembled.
/// Runs to completion before responding.
pub async fn handle_generate(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    let session = find_session(&state, session_id).await?;
    let mut session = session.lock().await;

    let metadata = ProjectMetadata::new(
        request.title,
        request.author,
        request.institution,
        request.project_type,
    );
    let report = generate_document(&state.backends, &mut session, metadata, request.context).await?;

    Ok(Json(GenerateResponse {
        session_id,
        has_generated: session.has_generated,
        report,
    }))
}

/// GET /api/v1/sessions/:id/sections/:section
pub async fn handle_get_section(
    State(state): State<AppState>,
    Path((session_id, section)): Path<(Uuid, String)>,
) -> Result<Json<SectionDetailResponse>, AppError> {
    let section = parse_section(&section)?;
    let session = find_session(&state, session_id).await?;
    let session = session.lock().await;
    let spec = section.spec();

    Ok(Json(SectionDetailResponse {
        section,
        title: spec.title,
        description: spec.description_or_empty(),
        content: session.sections.get(section).unwrap_or_default().to_string(),
    }))
}

/// POST /api/v1/sessions/:id/sections/:section/feedback
pub async fn handle_submit_feedback(
    State(state): State<AppState>,
    Path((session_id, section)): Path<(Uuid, String)>,
    Json(request): Json<FeedbackRequest>,
) -> Result<Json<FeedbackResponse>, AppError> {
    let section = parse_section(&section)?;
    let session = find_session(&state, session_id).await?;
    let mut session = session.lock().await;

    let revision = revise_section(&state.backends, &mut session, section, &request.feedback).await?;

    Ok(Json(FeedbackResponse {
        content: session.sections.get(section).unwrap_or_default().to_string(),
        revision,
    }))
}

/// GET /api/v1/sessions/:id/feedback
pub async fn handle_feedback_history(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<FeedbackHistoryResponse>, AppError> {
    let session = find_session(&state, session_id).await?;
    let session = session.lock().await;

    let entries = session
        .feedback
        .iter()
        .rev()
        .map(|record| FeedbackEntry {
            section: record.section,
            section_title: record.section_title.clone(),
            feedback: record.feedback.clone(),
            time: record.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
        })
        .collect();

    Ok(Json(FeedbackHistoryResponse { entries }))
}

/// GET /api/v1/sessions/:id/document?source=header|review
///
/// Streams the assembled .docx. 404 until a run has completed.
pub async fn handle_download(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, AppError> {
    let session = find_session(&state, session_id).await?;
    let path = {
        let session = session.lock().await;
        if !session.has_generated {
            return Err(AppError::NotFound(
                "No documentation has been generated for this session yet".to_string(),
            ));
        }
        session.output_path.clone()
    };

    let data = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => {
            AppError::NotFound(format!("Document {} is missing", path.display()))
        }
        _ => AppError::Internal(anyhow::Error::new(e).context("Failed to read document")),
    })?;

    let disposition = format!("attachment; filename=\"{}\"", query.source.file_name());
    Ok((
        [
            (header::CONTENT_TYPE, DOCX_MIME.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Bytes::from(data),
    )
        .into_response())
}
