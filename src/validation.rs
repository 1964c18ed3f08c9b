//! Pure submission validation rules.
//!
//! Everything here is side-effect free: a candidate submission either becomes
//! a normalized record ready for storage, or a single rejection reason
//! suitable for direct display to the guest. Transport concerns (multipart
//! framing, body caps) stay in the handlers; character counting, bounds and
//! MIME resolution live here so both intake paths and the GraphQL mutation
//! share one rule set.

use crate::config::LimitsConfig;

/// Fallback container when the upload declares nothing and sniffing finds
/// nothing recognizable. Browser MediaRecorder produces webm by default.
pub const DEFAULT_AUDIO_MIME: &str = "audio/webm";

/// A text submission that passed validation. Name and body are trimmed;
/// an absent name is stored as the empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTextNote {
    pub guest_name: String,
    pub body: String,
}

/// A voice submission that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedVoiceNote {
    pub guest_name: String,
    pub note: String,
    pub audio: Vec<u8>,
    pub mime_type: String,
    pub duration_seconds: i32,
}

/// Validate a text note candidate. The name is optional; the body must be
/// non-empty after trimming and within the character limit.
pub fn validate_text_note(name: Option<&str>, body: &str, limits: &LimitsConfig) -> Result<ValidatedTextNote, String> {
    let guest_name = name.unwrap_or("").trim().to_string();
    let body = body.trim().to_string();

    if guest_name.chars().count() > limits.max_name_chars {
        return Err("name is too long".to_string());
    }
    if body.is_empty() {
        return Err("message cannot be empty".to_string());
    }
    if body.chars().count() > limits.max_message_chars {
        return Err("message too long".to_string());
    }

    Ok(ValidatedTextNote { guest_name, body })
}

/// Parse a duration field into whole seconds, rounding to the nearest second.
pub fn parse_duration(raw: &str, max_secs: u32) -> Result<i32, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("duration is required".to_string());
    }
    let seconds = raw.parse::<f64>().map_err(|_| "invalid duration".to_string())?;
    if !seconds.is_finite() {
        return Err("invalid duration".to_string());
    }
    let rounded = seconds.round() as i64;
    if rounded <= 0 || rounded > i64::from(max_secs) {
        return Err("duration exceeds limit".to_string());
    }
    Ok(rounded as i32)
}

/// Resolve the MIME type of an uploaded audio blob.
///
/// Resolution order: declared content type of the file part, then content
/// sniffing of the buffered bytes, then [`DEFAULT_AUDIO_MIME`] when sniffing
/// yields nothing or a generic binary type. The result must look like audio.
pub fn resolve_mime_type(declared: Option<&str>, audio: &[u8]) -> Result<String, String> {
    let mut mime_type = match declared.map(str::trim).filter(|s| !s.is_empty()) {
        Some(declared) => declared.to_string(),
        None => infer::get(audio)
            .map(|kind| kind.mime_type().to_string())
            .unwrap_or_else(|| DEFAULT_AUDIO_MIME.to_string()),
    };
    if mime_type == "application/octet-stream" {
        mime_type = DEFAULT_AUDIO_MIME.to_string();
    }
    if !mime_type.starts_with("audio/") && !mime_type.contains("webm") {
        return Err("unsupported audio type".to_string());
    }
    Ok(mime_type)
}

/// Validate a voice note candidate. The buffered audio must already be read
/// through a capped reader; this only checks the resulting sizes and fields.
pub fn validate_voice_note(
    name: &str,
    note: &str,
    duration: &str,
    declared_mime: Option<&str>,
    audio: Vec<u8>,
    limits: &LimitsConfig,
) -> Result<ValidatedVoiceNote, String> {
    let duration_seconds = parse_duration(duration, limits.max_audio_duration_secs)?;

    if audio.is_empty() {
        return Err("audio file is empty".to_string());
    }
    if audio.len() > limits.max_audio_bytes {
        return Err("audio file too large".to_string());
    }

    let mime_type = resolve_mime_type(declared_mime, &audio)?;

    let guest_name = name.trim().to_string();
    if guest_name.is_empty() {
        return Err("name is required".to_string());
    }
    if guest_name.chars().count() > limits.max_name_chars {
        return Err("name is too long".to_string());
    }

    let note = note.trim().to_string();

    Ok(ValidatedVoiceNote {
        guest_name,
        note,
        audio,
        mime_type,
        duration_seconds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> LimitsConfig {
        LimitsConfig::default()
    }

    #[test]
    fn text_note_trims_and_keeps_body_verbatim() {
        let validated = validate_text_note(Some("  Sam "), "  Congrats!  ", &limits()).unwrap();
        assert_eq!(validated.guest_name, "Sam");
        assert_eq!(validated.body, "Congrats!");
    }

    #[test]
    fn text_note_name_is_optional() {
        let validated = validate_text_note(None, "hello", &limits()).unwrap();
        assert_eq!(validated.guest_name, "");
        let validated = validate_text_note(Some("   "), "hello", &limits()).unwrap();
        assert_eq!(validated.guest_name, "");
    }

    #[test]
    fn text_note_rejects_empty_after_trim() {
        assert_eq!(validate_text_note(Some("Sam"), "   \n\t ", &limits()), Err("message cannot be empty".to_string()));
    }

    #[test]
    fn text_note_counts_characters_not_bytes() {
        // 500 multibyte characters are within the limit even though they are
        // 1500 bytes; one more gets rejected.
        let at_cap = "é".repeat(500);
        assert!(validate_text_note(None, &at_cap, &limits()).is_ok());
        let over_cap = "é".repeat(501);
        assert_eq!(validate_text_note(None, &over_cap, &limits()), Err("message too long".to_string()));
    }

    #[test]
    fn text_note_rejects_long_name() {
        let name = "n".repeat(81);
        assert_eq!(validate_text_note(Some(&name), "hi", &limits()), Err("name is too long".to_string()));
        let name = "n".repeat(80);
        assert!(validate_text_note(Some(&name), "hi", &limits()).is_ok());
    }

    #[test]
    fn duration_rounds_to_nearest_second() {
        assert_eq!(parse_duration("9.6", 60), Ok(10));
        assert_eq!(parse_duration("10.4", 60), Ok(10));
        assert_eq!(parse_duration("10", 60), Ok(10));
    }

    #[test]
    fn duration_boundaries() {
        assert_eq!(parse_duration("60", 60), Ok(60));
        assert_eq!(parse_duration("60.4", 60), Ok(60));
        assert!(parse_duration("61", 60).is_err());
        assert!(parse_duration("0", 60).is_err());
        assert!(parse_duration("-3", 60).is_err());
        assert!(parse_duration("0.4", 60).is_err()); // rounds to zero
    }

    #[test]
    fn duration_rejects_garbage() {
        assert_eq!(parse_duration("", 60), Err("duration is required".to_string()));
        assert_eq!(parse_duration("abc", 60), Err("invalid duration".to_string()));
        assert_eq!(parse_duration("NaN", 60), Err("invalid duration".to_string()));
    }

    #[test]
    fn mime_prefers_declared_type() {
        let mime = resolve_mime_type(Some("audio/ogg"), b"whatever").unwrap();
        assert_eq!(mime, "audio/ogg");
    }

    #[test]
    fn mime_falls_back_to_default_for_unrecognized_bytes() {
        // Random bytes sniff to nothing, so the default container applies
        let mime = resolve_mime_type(None, &[0x00, 0x01, 0x02, 0x03]).unwrap();
        assert_eq!(mime, DEFAULT_AUDIO_MIME);
    }

    #[test]
    fn mime_sniffs_undeclared_uploads() {
        // OggS magic
        let mut ogg = b"OggS".to_vec();
        ogg.extend_from_slice(&[0u8; 32]);
        let mime = resolve_mime_type(None, &ogg).unwrap();
        assert_eq!(mime, "audio/ogg");
    }

    #[test]
    fn mime_octet_stream_is_treated_as_unknown() {
        let mime = resolve_mime_type(Some("application/octet-stream"), b"data").unwrap();
        assert_eq!(mime, DEFAULT_AUDIO_MIME);
    }

    #[test]
    fn mime_rejects_non_audio() {
        assert_eq!(resolve_mime_type(Some("image/png"), b"data"), Err("unsupported audio type".to_string()));
        assert_eq!(resolve_mime_type(Some("text/html"), b"data"), Err("unsupported audio type".to_string()));
    }

    #[test]
    fn mime_accepts_webm_container() {
        // Browsers record audio into the webm container but label it video/webm
        let mime = resolve_mime_type(Some("video/webm"), b"data").unwrap();
        assert_eq!(mime, "video/webm");
    }

    #[test]
    fn voice_note_accepts_audio_at_exact_cap() {
        let limits = limits();
        let audio = vec![0xAAu8; limits.max_audio_bytes];
        let validated = validate_voice_note("Ana", "", "10", Some("audio/webm"), audio, &limits).unwrap();
        assert_eq!(validated.audio.len(), limits.max_audio_bytes);
        assert_eq!(validated.duration_seconds, 10);
    }

    #[test]
    fn voice_note_rejects_one_byte_over_cap() {
        let limits = limits();
        let audio = vec![0xAAu8; limits.max_audio_bytes + 1];
        assert_eq!(
            validate_voice_note("Ana", "", "10", Some("audio/webm"), audio, &limits),
            Err("audio file too large".to_string())
        );
    }

    #[test]
    fn voice_note_rejects_empty_audio_and_missing_name() {
        let limits = limits();
        assert_eq!(
            validate_voice_note("Ana", "", "10", Some("audio/webm"), vec![], &limits),
            Err("audio file is empty".to_string())
        );
        assert_eq!(
            validate_voice_note("  ", "", "10", Some("audio/webm"), vec![1, 2, 3], &limits),
            Err("name is required".to_string())
        );
    }

    #[test]
    fn voice_note_trims_caption() {
        let limits = limits();
        let validated = validate_voice_note("Ana", "  from the balcony  ", "10", Some("audio/webm"), vec![1, 2, 3], &limits).unwrap();
        assert_eq!(validated.note, "from the balcony");
    }
}
