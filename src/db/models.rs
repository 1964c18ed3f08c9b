use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type NoteId = i32;

/// Text note row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TextNote {
    pub id: NoteId,
    pub guest_name: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Voice note metadata row. The audio blob is deliberately absent so feed
/// queries never drag megabytes of BYTEA through the pool.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct VoiceNote {
    pub id: NoteId,
    pub guest_name: String,
    pub note: String,
    pub duration_seconds: i32,
    pub mime_type: String,
    pub created_at: DateTime<Utc>,
}

/// Stored audio payload for a single voice note
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VoiceAudio {
    pub audio: Vec<u8>,
    pub mime_type: String,
}

/// Database request for inserting a text note
#[derive(Debug, Clone)]
pub struct TextNoteCreateDBRequest {
    pub guest_name: String,
    pub body: String,
}

/// Database request for inserting a voice note
#[derive(Debug, Clone)]
pub struct VoiceNoteCreateDBRequest {
    pub guest_name: String,
    pub note: String,
    pub audio: Vec<u8>,
    pub mime_type: String,
    pub duration_seconds: i32,
}
