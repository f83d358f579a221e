//! Axum route handlers for the Document API.

use axum::{
    extract::{Multipart, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::documents::extract::extract_text;
use crate::documents::package::{build_attachment, Attachment};
use crate::documents::values::parse_values;
use crate::documents::Upload;
use crate::errors::AppError;
use crate::state::AppState;
use crate::template::{extract_variables, substitute, ValueMap};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Fields of the multipart form shared by all document endpoints.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub file: Option<Upload>,
    pub email: Option<String>,
    pub values: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InspectResponse {
    pub variables: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResponse {
    pub ok: bool,
    pub message_id: String,
    pub sent_at: DateTime<Utc>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/inspect
///
/// Returns the placeholder names found in the uploaded document.
pub async fn handle_inspect(multipart: Multipart) -> Result<Json<InspectResponse>, AppError> {
    let form = read_form(multipart).await?;
    let upload = require_file(form.file)?;

    let filename = upload.filename.clone();
    let variables = run_blocking(move || extract_text(&upload).map(|t| extract_variables(&t))).await?;

    info!("Inspected '{filename}': {} variables", variables.len());
    Ok(Json(InspectResponse { variables }))
}

/// POST /api/render
///
/// Applies the submitted values and returns the processed document as a download.
pub async fn handle_render(multipart: Multipart) -> Result<impl IntoResponse, AppError> {
    let form = read_form(multipart).await?;
    let upload = require_file(form.file)?;
    let values = parse_values(form.values.as_deref())?;

    let attachment = run_blocking(move || fill_document(&upload, &values)).await?;

    info!("Rendered '{}' ({} bytes)", attachment.filename, attachment.content.len());
    Ok(download(attachment))
}

/// POST /api/send
///
/// Applies the submitted values and emails the processed document to `email`.
pub async fn handle_send(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<SendResponse>, AppError> {
    let form = read_form(multipart).await?;
    let email = form
        .email
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Recipient email is required".to_string()))?;
    let upload = require_file(form.file)?;
    let values = parse_values(form.values.as_deref())?;

    let attachment = run_blocking(move || fill_document(&upload, &values)).await?;
    let receipt = state.mailer.send(email.trim(), attachment).await?;

    Ok(Json(SendResponse {
        ok: true,
        message_id: receipt.message_id,
        sent_at: receipt.sent_at,
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Extract → discover variables → substitute → package.
fn fill_document(upload: &Upload, values: &ValueMap) -> Result<Attachment, AppError> {
    let text = extract_text(upload)?;
    let variables = extract_variables(&text);
    let missing = variables.iter().filter(|v| !values.contains_key(*v)).count();
    if missing > 0 {
        info!("'{}': {missing} variables without a value", upload.filename);
    }
    let processed = substitute(&text, &variables, values);
    build_attachment(&processed, &upload.filename)
}

/// Runs CPU-bound document work off the async runtime.
async fn run_blocking<T, F>(work: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::Internal(e.into()))?
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content = field.bytes().await.map_err(malformed)?;
                // Browsers send an empty, unnamed part when no file was chosen.
                if !filename.is_empty() {
                    form.file = Some(Upload { filename, content });
                }
            }
            "email" => form.email = Some(field.text().await.map_err(malformed)?),
            "values" => form.values = Some(field.text().await.map_err(malformed)?),
            _ => {}
        }
    }

    Ok(form)
}

fn malformed(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Validation(format!("Malformed upload: {}", e.body_text()))
}

fn require_file(file: Option<Upload>) -> Result<Upload, AppError> {
    file.ok_or_else(|| AppError::Validation("No file uploaded".to_string()))
}

fn download(attachment: Attachment) -> impl IntoResponse {
    // Header values must stay visible ASCII.
    let safe_name: String = attachment
        .filename
        .chars()
        .map(|c| if (c.is_ascii_graphic() && c != '"') || c == ' ' { c } else { '_' })
        .collect();

    (
        [
            (header::CONTENT_TYPE, attachment.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{safe_name}\""),
            ),
        ],
        attachment.content,
    )
}
