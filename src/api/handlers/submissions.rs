//! Public intake handlers. These routes are exempt from the operator gate but
//! enforce every validation rule before anything touches storage.

use crate::AppState;
use crate::api::models::SubmissionAck;
use crate::errors::{Error, Result};
use crate::validation::{validate_text_note, validate_voice_note};
use axum::{
    Form, Json, RequestExt,
    extract::{Multipart, Request, State},
    http::{StatusCode, header},
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct TextSubmission {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub text: String,
}

/// `POST /notes` - accepts JSON `{name, text}` or the form-encoded
/// equivalent. The route carries a small body limit; anything larger is cut
/// off at the transport before this handler runs.
pub async fn submit_text_note(State(state): State<AppState>, request: Request) -> Result<(StatusCode, Json<SubmissionAck>)> {
    let is_json = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|content_type| content_type.contains("application/json"));

    let payload: TextSubmission = if is_json {
        let Json(payload) = request.extract().await.map_err(|_| Error::BadRequest {
            message: "invalid message payload".to_string(),
        })?;
        payload
    } else {
        let Form(payload) = request.extract().await.map_err(|_| Error::BadRequest {
            message: "invalid message payload".to_string(),
        })?;
        payload
    };

    let validated = validate_text_note(payload.name.as_deref(), &payload.text, &state.config.limits)
        .map_err(|message| Error::BadRequest { message })?;

    let id = state.submissions.create_text_note(validated).await?;
    tracing::info!(id, "text note stored");

    Ok((StatusCode::CREATED, Json(SubmissionAck::ok())))
}

/// `POST /voice-notes` - multipart upload with fields `audio` (file),
/// `duration` (numeric string), `name` and optional `note`.
///
/// The route's body limit caps the whole payload at the audio ceiling plus a
/// multipart overhead allowance before parsing begins. The audio field itself
/// is read through a capped loop so at most `max_audio_bytes + 1` bytes are
/// ever buffered, no matter what the uploader declares or sends.
pub async fn submit_voice_note(State(state): State<AppState>, mut multipart: Multipart) -> Result<(StatusCode, Json<SubmissionAck>)> {
    let limits = state.config.limits.clone();

    let mut audio: Option<Vec<u8>> = None;
    let mut declared_mime: Option<String> = None;
    let mut duration = String::new();
    let mut name = String::new();
    let mut note = String::new();

    while let Some(mut field) = multipart.next_field().await.map_err(|_| Error::BadRequest {
        message: "invalid audio payload".to_string(),
    })? {
        match field.name().unwrap_or("") {
            "audio" => {
                declared_mime = field.content_type().map(|s| s.to_string());
                let mut buffer: Vec<u8> = Vec::new();
                let cap = limits.max_audio_bytes + 1;
                while let Some(chunk) = field.chunk().await.map_err(|_| Error::BadRequest {
                    message: "unable to read audio file".to_string(),
                })? {
                    let remaining = cap - buffer.len();
                    if chunk.len() >= remaining {
                        buffer.extend_from_slice(&chunk[..remaining]);
                        break;
                    }
                    buffer.extend_from_slice(&chunk);
                }
                if buffer.len() > limits.max_audio_bytes {
                    return Err(Error::PayloadTooLarge {
                        message: "audio file too large".to_string(),
                    });
                }
                audio = Some(buffer);
            }
            "duration" => {
                duration = read_text_field(field).await?;
            }
            "name" => {
                name = read_text_field(field).await?;
            }
            "note" => {
                note = read_text_field(field).await?;
            }
            _ => {
                // Ignore unknown fields (forward compatibility)
            }
        }
    }

    let audio = audio.ok_or_else(|| Error::BadRequest {
        message: "audio file is required".to_string(),
    })?;

    let validated = validate_voice_note(&name, &note, &duration, declared_mime.as_deref(), audio, &limits)
        .map_err(|message| Error::BadRequest { message })?;

    let id = state.submissions.create_voice_note(validated).await?;
    tracing::info!(id, duration_seconds = duration.as_str(), "voice note stored");

    Ok((StatusCode::CREATED, Json(SubmissionAck::ok())))
}

async fn read_text_field(field: axum::extract::multipart::Field<'_>) -> Result<String> {
    field.text().await.map_err(|_| Error::BadRequest {
        message: "invalid audio payload".to_string(),
    })
}
