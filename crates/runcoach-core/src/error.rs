//! Error taxonomy for the coach core.
//!
//! Bridge and network failures are recoverable: the orchestrator absorbs them
//! into local fallback synthesis and they never reach the end user as errors.
//! Only input-validation and configuration problems surface to the gateway.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoachError {
    /// No Gemini API key configured (GEMINI_API_KEY / NEXT_PUBLIC_GEMINI_API_KEY).
    #[error("Gemini API key is not configured")]
    MissingApiKey,

    /// Non-success HTTP status from the completion API.
    #[error("Gemini API error {status}: {message}")]
    Bridge { status: u16, message: String },

    /// Transport-level failure talking to the completion API.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The completion API answered 200 but the body was not usable.
    #[error("invalid completion response: {0}")]
    InvalidResponse(String),
}
