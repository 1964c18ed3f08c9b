//! Response shapes shared by both read surfaces.
//!
//! Each struct serves double duty: serde serialization for the flat feed and
//! `SimpleObject` for GraphQL. One read model, two encodings - the surfaces
//! cannot drift apart because there is nothing separate to drift.

use crate::db::models::{NoteId, TextNote, VoiceNote};
use async_graphql::{ComplexObject, SimpleObject};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Fetch path for a voice note's audio, derived from its id. Nothing is
/// stored for this; the id is the only source of truth.
pub fn voice_audio_path(id: NoteId) -> String {
    format!("/voice-notes/{id}/audio")
}

/// Acknowledgement body for accepted submissions
#[derive(Debug, Serialize)]
pub struct SubmissionAck {
    pub status: &'static str,
}

impl SubmissionAck {
    pub fn ok() -> Self {
        Self { status: "ok" }
    }
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
#[graphql(name = "TextNote")]
pub struct TextNoteResponse {
    pub id: NoteId,
    pub guest_name: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl From<TextNote> for TextNoteResponse {
    fn from(note: TextNote) -> Self {
        Self {
            id: note.id,
            guest_name: note.guest_name,
            text: note.body,
            created_at: note.created_at,
        }
    }
}

/// Voice note metadata; audio bytes are only reachable through the streaming
/// endpoint at [`voice_audio_path`].
#[derive(Debug, Clone, Serialize, SimpleObject)]
#[graphql(name = "VoiceNote", complex)]
pub struct VoiceNoteResponse {
    pub id: NoteId,
    pub guest_name: String,
    pub note: String,
    pub duration_seconds: i32,
    pub mime_type: String,
    pub created_at: DateTime<Utc>,
}

#[ComplexObject]
impl VoiceNoteResponse {
    /// Path to stream this note's audio
    async fn audio_url(&self) -> String {
        voice_audio_path(self.id)
    }
}

impl From<VoiceNote> for VoiceNoteResponse {
    fn from(note: VoiceNote) -> Self {
        Self {
            id: note.id,
            guest_name: note.guest_name,
            note: note.note,
            duration_seconds: note.duration_seconds,
            mime_type: note.mime_type,
            created_at: note.created_at,
        }
    }
}
