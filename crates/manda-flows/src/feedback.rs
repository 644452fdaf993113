//! Structured feedback — grade a learner submission against a rubric.
//!
//! The model is instructed to answer with a single JSON object matching
//! [`Feedback`]; anything else is a backend error, not something to paper
//! over with a default grade.

use tracing::{debug, warn};

use manda_core::types::MAX_SUBMISSION_CHARS;
use manda_core::{Feedback, FeedbackRequest, GenerationError, TextRequest};
use manda_providers::resolver::ActiveClient;

const SYSTEM_PROMPT: &str = "You are a course instructor producing structured feedback. \
Respond with a single JSON object: {\"score\": <0-100>, \"strengths\": [..], \
\"improvements\": [..], \"summary\": \"..\"}. No prose outside the JSON.";

/// Generate structured feedback for a submission.
pub async fn generate_feedback(
    client: &ActiveClient,
    request: &FeedbackRequest,
) -> Result<Feedback, GenerationError> {
    validate(request)?;
    let backend = client.active()?;

    let mut prompt = format!(
        "Rubric:\n{}\n\nSubmission:\n{}",
        request.rubric, request.submission
    );
    if let Some(context) = &request.context {
        prompt = format!("Assignment context:\n{context}\n\n{prompt}");
    }

    debug!(
        backend = backend.display_name(),
        submission_chars = request.submission.len(),
        "generating feedback"
    );

    let response = backend
        .generate_text(&TextRequest {
            system: Some(SYSTEM_PROMPT.to_string()),
            prompt,
            ..Default::default()
        })
        .await?;

    parse_feedback(&response.text).map_err(|err| {
        warn!(error = %err, "model returned unparseable feedback");
        GenerationError::Backend {
            provider: backend.provider(),
            message: format!("feedback response was not valid JSON: {err}"),
        }
    })
}

fn validate(request: &FeedbackRequest) -> Result<(), GenerationError> {
    if request.submission.trim().is_empty() {
        return Err(GenerationError::InvalidInput(
            "submission must not be empty".into(),
        ));
    }
    if request.submission.chars().count() > MAX_SUBMISSION_CHARS {
        return Err(GenerationError::InvalidInput(format!(
            "submission exceeds {MAX_SUBMISSION_CHARS} characters"
        )));
    }
    if request.rubric.trim().is_empty() {
        return Err(GenerationError::InvalidInput(
            "rubric must not be empty".into(),
        ));
    }
    Ok(())
}

/// Parse the model's JSON, tolerating a markdown code fence around it.
fn parse_feedback(text: &str) -> Result<Feedback, serde_json::Error> {
    let trimmed = text.trim();
    let stripped = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed);
    serde_json::from_str(stripped)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
