//! Deterministic object-store key layout.
//!
//! Rendered videos and archived audio land under stable, user-scoped
//! prefixes so assets can be located (and reclaimed) without a lookup
//! table.

use crate::types::Id;

/// Key prefix used when a recording arrives before its dream exists.
pub const UNASSIGNED_DREAM_SEGMENT: &str = "unassigned";

/// Object key for a rendered node video: `videos/{user}/{dream}/{node}.mp4`.
pub fn video_key(user_id: Id, dream_id: Id, node_id: Id) -> String {
    format!("videos/{user_id}/{dream_id}/{node_id}.mp4")
}

/// Object key for an archived recording:
/// `audio/{user}/{dream|unassigned}/{unix_millis}.{ext}`.
pub fn audio_key(user_id: Id, dream_id: Option<Id>, unix_millis: i64, extension: &str) -> String {
    match dream_id {
        Some(dream_id) => format!("audio/{user_id}/{dream_id}/{unix_millis}.{extension}"),
        None => format!("audio/{user_id}/{UNASSIGNED_DREAM_SEGMENT}/{unix_millis}.{extension}"),
    }
}

/// Map an audio MIME type onto the file extension used in storage keys
/// and speech-to-text uploads. Unknown types default to `mp3`.
pub fn audio_extension(mime_type: &str) -> &'static str {
    if mime_type.contains("webm") {
        "webm"
    } else if mime_type.contains("wav") {
        "wav"
    } else if mime_type.contains("ogg") {
        "ogg"
    } else if mime_type.contains("m4a") {
        "m4a"
    } else if mime_type.contains("mpeg") {
        "mp3"
    } else if mime_type.contains("mp4") {
        "mp4"
    } else {
        "mp3"
    }
}
