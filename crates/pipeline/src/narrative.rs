//! Context-augmented narrative generation.
//!
//! One chat completion per dream increment, fed three layers of context:
//! semantically relevant fragments from the memory service, the full prior
//! text of the session when continuing from a parent node, and the fresh
//! transcript. The memory service is strictly nice-to-have — recall and
//! write-back failures degrade with a warning, never an error.

use oneira_core::types::Id;
use oneira_db::repositories::StoryNodeRepo;
use oneira_providers::{MemoryClient, StoryClient, StoryError};
use serde::Deserialize;
use sqlx::PgPool;

/// Fixed generation instruction. The strict-JSON contract is what makes
/// the response machine-parseable; deviations are rejected as malformed.
const SYSTEM_PROMPT: &str = "You are a creative dream journal assistant. Based on the user's dream description, generate a vivid, immersive narrative continuation of their dream. Make it surreal, emotionally resonant, and engaging.

Then, provide 3 choices for how the dream could continue. Each choice should be a single sentence describing an action or direction.

You must respond ONLY with valid JSON in this exact format:
{
  \"content\": \"The narrative paragraph...\",
  \"options\": [\"Option 1 text\", \"Option 2 text\", \"Option 3 text\"]
}";

/// Number of continuation options every node carries.
pub const OPTION_COUNT: usize = 3;

/// A parsed generation result: the narrative plus its option set.
#[derive(Debug, Deserialize)]
pub struct GeneratedStory {
    pub content: String,
    pub options: Vec<String>,
}

/// Errors from the narrative generation step.
#[derive(Debug, thiserror::Error)]
pub enum NarrativeError {
    /// The language-model service failed or was unreachable.
    #[error(transparent)]
    Upstream(#[from] StoryError),

    /// The service answered, but not with the expected `{content, options}`
    /// shape.
    #[error("malformed story response: {0}")]
    Malformed(String),

    /// Reading session context from the database failed.
    #[error("failed to load session context: {0}")]
    Context(#[from] sqlx::Error),
}

/// Generate the next narrative segment for a transcript.
pub async fn generate_story(
    pool: &PgPool,
    story: &StoryClient,
    memory: Option<&MemoryClient>,
    user_id: Id,
    transcript: &str,
    dream_id: Option<Id>,
    parent_node_id: Option<Id>,
) -> Result<GeneratedStory, NarrativeError> {
    let memories = recall_memories(memory, user_id, transcript).await;

    // Continuing a session: carry the whole prior narrative for continuity.
    let context = match (parent_node_id, dream_id) {
        (Some(_), Some(dream_id)) => StoryNodeRepo::list_content_for_dream(pool, dream_id)
            .await?
            .join("\n\n"),
        _ => String::new(),
    };

    let user_prompt = build_user_prompt(transcript, &memories, &context);
    let raw = story.complete(SYSTEM_PROMPT, &user_prompt).await?;
    let generated = parse_story(&raw)?;

    // Store this dream for future context. Best-effort.
    if let Some(memory) = memory {
        let record = format!("Dream: {transcript}\nStory: {}", generated.content);
        if let Err(e) = memory.add(user_id, &record).await {
            tracing::warn!(user_id = %user_id, error = %e, "Memory write-back failed; continuing");
        }
    }

    Ok(generated)
}

/// Fetch relevant prior-dream fragments, degrading to none on any failure.
async fn recall_memories(memory: Option<&MemoryClient>, user_id: Id, query: &str) -> String {
    let Some(memory) = memory else {
        tracing::warn!(user_id = %user_id, "Memory service not configured; generating without recall");
        return String::new();
    };

    match memory.search(user_id, query).await {
        Ok(fragments) => {
            tracing::debug!(user_id = %user_id, count = fragments.len(), "Memories recalled");
            fragments.join("\n")
        }
        Err(e) => {
            tracing::warn!(user_id = %user_id, error = %e, "Memory recall failed; generating without it");
            String::new()
        }
    }
}

/// Assemble the user prompt: session context first, then recalled
/// memories, then the fresh transcript and task statement.
fn build_user_prompt(transcript: &str, memories: &str, context: &str) -> String {
    let mut prompt = format!(
        "User's dream: {transcript}\n\n\
         Create a vivid dream narrative and provide 3 choices for how it could continue."
    );
    if !memories.is_empty() {
        prompt = format!("Relevant memories from past dreams:\n{memories}\n\n{prompt}");
    }
    if !context.is_empty() {
        prompt = format!("Previous dream context:\n{context}\n\n{prompt}");
    }
    prompt
}

/// Parse the model's reply into a [`GeneratedStory`], rejecting anything
/// that is not exactly `{content, options × 3}`.
fn parse_story(raw: &str) -> Result<GeneratedStory, NarrativeError> {
    let generated: GeneratedStory = serde_json::from_str(raw)
        .map_err(|e| NarrativeError::Malformed(format!("not the expected JSON shape: {e}")))?;

    if generated.options.len() != OPTION_COUNT {
        return Err(NarrativeError::Malformed(format!(
            "expected {OPTION_COUNT} options, got {}",
            generated.options.len()
        )));
    }
    Ok(generated)
}
