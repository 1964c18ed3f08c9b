//! Repository implementations for the two note tables.
//!
//! Each repository borrows a single connection; every operation is one
//! statement, so no transactions are needed - a submission either inserts its
//! row or leaves nothing behind.

use crate::db::{
    errors::Result,
    models::{NoteId, TextNote, TextNoteCreateDBRequest, VoiceAudio, VoiceNote, VoiceNoteCreateDBRequest},
};
use sqlx::PgConnection;

pub struct TextNotes<'c> {
    db: &'c mut PgConnection,
}

impl<'c> TextNotes<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Insert a validated text note, returning its assigned id
    pub async fn create(&mut self, request: &TextNoteCreateDBRequest) -> Result<NoteId> {
        let id = sqlx::query_scalar::<_, NoteId>(
            r#"
            INSERT INTO text_notes (guest_name, body)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(&request.guest_name)
        .bind(&request.body)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(id)
    }

    /// List notes newest-first. Callers are responsible for clamping `limit`.
    pub async fn list(&mut self, limit: i64) -> Result<Vec<TextNote>> {
        let notes = sqlx::query_as::<_, TextNote>(
            r#"
            SELECT id, guest_name, body, created_at
            FROM text_notes
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(notes)
    }
}

pub struct VoiceNotes<'c> {
    db: &'c mut PgConnection,
}

impl<'c> VoiceNotes<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Insert a validated voice note, returning its assigned id
    pub async fn create(&mut self, request: &VoiceNoteCreateDBRequest) -> Result<NoteId> {
        let id = sqlx::query_scalar::<_, NoteId>(
            r#"
            INSERT INTO voice_notes (guest_name, note, audio, mime_type, duration_seconds)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&request.guest_name)
        .bind(&request.note)
        .bind(&request.audio)
        .bind(&request.mime_type)
        .bind(request.duration_seconds)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(id)
    }

    /// List metadata newest-first, audio bytes excluded
    pub async fn list(&mut self, limit: i64) -> Result<Vec<VoiceNote>> {
        let notes = sqlx::query_as::<_, VoiceNote>(
            r#"
            SELECT id, guest_name, COALESCE(note, '') AS note, duration_seconds, mime_type, created_at
            FROM voice_notes
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(notes)
    }

    /// Point lookup of the stored audio for one note
    pub async fn get_audio(&mut self, id: NoteId) -> Result<Option<VoiceAudio>> {
        let audio = sqlx::query_as::<_, VoiceAudio>("SELECT audio, mime_type FROM voice_notes WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(audio)
    }
}
