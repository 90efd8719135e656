//! Visual prompt construction for the text-to-video service.
//!
//! The prompt style is fixed: a bounded prefix of the narrative wrapped in
//! a dreamlike framing, plus a constant negative prompt. Generation quality
//! depends on these literals staying stable, so they live here rather than
//! inline at the call site.

/// Maximum number of narrative characters carried into the visual prompt.
pub const MAX_CONTENT_CHARS: usize = 200;

/// Negative prompt sent with every generation request.
pub const NEGATIVE_PROMPT: &str =
    "ugly, blurry, low quality, distorted, deformed, artifacts";

/// Build the visual prompt for a narrative segment.
///
/// Truncates the content to [`MAX_CONTENT_CHARS`] characters (on a char
/// boundary, so multi-byte text is safe) and wraps it in the fixed
/// dreamy/cinematic framing.
pub fn visual_prompt(content: &str) -> String {
    let excerpt: String = content.chars().take(MAX_CONTENT_CHARS).collect();
    format!(
        "Dreamy, surreal scene: {excerpt}. Cinematic, ethereal lighting, fantasy art style."
    )
}
