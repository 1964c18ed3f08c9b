//! Flat feed - the fixed-shape operator read surface.
//!
//! No filtering, no pagination: the most recent N of each note kind, where N
//! is the configured feed cap. Responses are marked non-cacheable so the
//! operator dashboard always polls fresh data.

use crate::AppState;
use crate::api::models::{TextNoteResponse, VoiceNoteResponse};
use crate::errors::Result;
use axum::{Json, extract::State, http::header};

/// `GET /admin/notes` - text notes, newest first, capped
pub async fn list_text_notes(
    State(state): State<AppState>,
) -> Result<([(header::HeaderName, &'static str); 1], Json<Vec<TextNoteResponse>>)> {
    let notes = state.submissions.list_text_notes(Some(state.config.limits.feed_limit)).await?;
    let data = notes.into_iter().map(TextNoteResponse::from).collect();
    Ok(([(header::CACHE_CONTROL, "no-store")], Json(data)))
}

/// `GET /admin/voice-notes` - voice note metadata, newest first, capped.
/// Audio bytes are never part of the feed.
pub async fn list_voice_notes(
    State(state): State<AppState>,
) -> Result<([(header::HeaderName, &'static str); 1], Json<Vec<VoiceNoteResponse>>)> {
    let notes = state.submissions.list_voice_notes(Some(state.config.limits.feed_limit)).await?;
    let data = notes.into_iter().map(VoiceNoteResponse::from).collect();
    Ok(([(header::CACHE_CONTROL, "no-store")], Json(data)))
}
