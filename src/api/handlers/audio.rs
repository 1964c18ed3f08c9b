//! Binary audio streaming for stored voice notes.
//!
//! Serves the blob with its stored MIME type and honors single byte ranges so
//! browser `<audio>` elements can seek. Multi-range and malformed `Range`
//! headers fall back to the full body rather than erroring; a range that
//! starts past the end is the one case that gets 416.

use crate::AppState;
use crate::db::models::NoteId;
use crate::errors::{Error, Result};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::Response,
};
use bytes::Bytes;

enum RangeRequest {
    /// No usable range; serve the whole body
    Full,
    /// Inclusive byte range, already clipped to the body length
    Partial { start: u64, end: u64 },
    /// Syntactically valid but nothing to serve (start past end of body)
    Unsatisfiable,
}

/// Parse a `Range` header against a body of `len` bytes.
///
/// Only single `bytes=` ranges are understood: `start-end`, `start-`, and the
/// suffix form `-n`. Anything else degrades to the full body.
fn parse_range(raw: &str, len: u64) -> RangeRequest {
    let Some(spec) = raw.strip_prefix("bytes=") else {
        return RangeRequest::Full;
    };
    let spec = spec.trim();
    if spec.contains(',') {
        return RangeRequest::Full;
    }
    let Some((start_raw, end_raw)) = spec.split_once('-') else {
        return RangeRequest::Full;
    };

    if start_raw.is_empty() {
        // Suffix form: the last n bytes
        let Ok(suffix) = end_raw.parse::<u64>() else {
            return RangeRequest::Full;
        };
        if suffix == 0 || len == 0 {
            return RangeRequest::Unsatisfiable;
        }
        return RangeRequest::Partial {
            start: len.saturating_sub(suffix),
            end: len - 1,
        };
    }

    let Ok(start) = start_raw.parse::<u64>() else {
        return RangeRequest::Full;
    };
    if start >= len {
        return RangeRequest::Unsatisfiable;
    }
    let end = if end_raw.is_empty() {
        len - 1
    } else {
        match end_raw.parse::<u64>() {
            Ok(end) if end >= start => end.min(len - 1),
            _ => return RangeRequest::Full,
        }
    };
    RangeRequest::Partial { start, end }
}

/// `GET /voice-notes/{id}/audio`
///
/// A malformed or non-positive id is reported the same way as an absent row:
/// not found. The path segment is not a hint about what exists.
pub async fn get_voice_audio(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response> {
    let id: NoteId = id
        .parse()
        .ok()
        .filter(|&id| id > 0)
        .ok_or_else(|| Error::NotFound {
            resource: "voice note".to_string(),
        })?;

    let stored = state.submissions.get_voice_audio(id).await?;
    let body = Bytes::from(stored.audio);
    let len = body.len() as u64;

    let range = headers
        .get(header::RANGE)
        .and_then(|value| value.to_str().ok())
        .map(|raw| parse_range(raw, len))
        .unwrap_or(RangeRequest::Full);

    let builder = Response::builder()
        .header(header::CONTENT_TYPE, stored.mime_type)
        .header(header::ACCEPT_RANGES, "bytes")
        .header(header::CACHE_CONTROL, "no-store");

    let response = match range {
        RangeRequest::Full => builder
            .status(StatusCode::OK)
            .header(header::CONTENT_LENGTH, len)
            .body(body.into()),
        RangeRequest::Partial { start, end } => {
            let slice = body.slice(start as usize..=end as usize);
            builder
                .status(StatusCode::PARTIAL_CONTENT)
                .header(header::CONTENT_RANGE, format!("bytes {start}-{end}/{len}"))
                .header(header::CONTENT_LENGTH, end - start + 1)
                .body(slice.into())
        }
        RangeRequest::Unsatisfiable => builder
            .status(StatusCode::RANGE_NOT_SATISFIABLE)
            .header(header::CONTENT_RANGE, format!("bytes */{len}"))
            .body(Bytes::new().into()),
    };
    Ok(response.map_err(anyhow::Error::from)?)
}
