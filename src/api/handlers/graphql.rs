//! Typed query surface over the same read models as the flat feed.
//!
//! Queries take an optional row limit (clamped by the service, same rule as
//! everywhere else) and a mutation mirrors the public text submission with the
//! identical validation pipeline. Per the single-endpoint convention, any
//! request whose response carries errors - parse, validation, or resolver -
//! is answered with HTTP 400 and the standard error envelope.

use crate::AppState;
use crate::api::models::{TextNoteResponse, VoiceNoteResponse};
use crate::config::LimitsConfig;
use crate::errors::Error;
use crate::submissions::Submissions;
use crate::validation::validate_text_note;
use async_graphql::{Context, EmptySubscription, Object, Schema};
use axum::{Json, extract::State, http::StatusCode};

pub type GuestbookSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn build_schema(submissions: Submissions, limits: LimitsConfig) -> GuestbookSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(submissions)
        .data(limits)
        .finish()
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Most recent text notes, newest first
    async fn text_notes(&self, ctx: &Context<'_>, limit: Option<i32>) -> async_graphql::Result<Vec<TextNoteResponse>> {
        let submissions = ctx.data_unchecked::<Submissions>();
        let notes = submissions
            .list_text_notes(limit.map(i64::from))
            .await
            .map_err(to_resolver_error)?;
        Ok(notes.into_iter().map(TextNoteResponse::from).collect())
    }

    /// Most recent voice note metadata, newest first. Audio itself is fetched
    /// through the `audioUrl` each entry exposes.
    async fn voice_notes(&self, ctx: &Context<'_>, limit: Option<i32>) -> async_graphql::Result<Vec<VoiceNoteResponse>> {
        let submissions = ctx.data_unchecked::<Submissions>();
        let notes = submissions
            .list_voice_notes(limit.map(i64::from))
            .await
            .map_err(to_resolver_error)?;
        Ok(notes.into_iter().map(VoiceNoteResponse::from).collect())
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Submit a text note. Same validation as the public REST route; returns
    /// `true` once the note is stored.
    async fn submit_text_note(&self, ctx: &Context<'_>, name: Option<String>, text: String) -> async_graphql::Result<bool> {
        let submissions = ctx.data_unchecked::<Submissions>();
        let limits = ctx.data_unchecked::<LimitsConfig>();

        let validated = validate_text_note(name.as_deref(), &text, limits).map_err(async_graphql::Error::new)?;
        submissions.create_text_note(validated).await.map_err(to_resolver_error)?;
        Ok(true)
    }
}

/// Map a service error into the response envelope, keeping the internal
/// detail in the logs and only the user-safe message on the wire.
fn to_resolver_error(err: Error) -> async_graphql::Error {
    if err.status_code().is_server_error() {
        tracing::error!("GraphQL resolver failure: {:#}", err);
    } else {
        tracing::debug!("GraphQL resolver rejection: {}", err);
    }
    async_graphql::Error::new(err.user_message())
}

/// `POST /graphql` (operator-gated)
pub async fn graphql_handler(
    State(state): State<AppState>,
    Json(request): Json<async_graphql::Request>,
) -> (StatusCode, Json<async_graphql::Response>) {
    let response = state.schema.execute(request).await;
    let status = if response.is_ok() { StatusCode::OK } else { StatusCode::BAD_REQUEST };
    (status, Json(response))
}
