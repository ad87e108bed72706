//! Typed error for the tutoring protocol.
//!
//! Display strings of the learner-facing kinds are the messages shown to the
//! learner, so they stay in Korean.

use thiserror::Error;

/// Failure of one of the external collaborators. Never retried.
#[derive(Debug, Clone, Error)]
pub enum UpstreamError {
    #[error("embedding provider failed: {0}")]
    Embedding(String),

    #[error("retrieval index failed: {0}")]
    Retrieval(String),

    #[error("text generation failed: {0}")]
    Generation(String),
}

#[derive(Debug, Error)]
pub enum TutorError {
    /// Request body does not have the expected shape.
    #[error("잘못된 요청 형식이야.")]
    MalformedRequest,

    /// Question rejected by the relevance gate or by the generator's "no".
    #[error("한국사와 관련된 질문을 해줘!")]
    OutOfDomain,

    /// Follow-up answer drifted away from the previous hints.
    #[error(
        "이전 힌트와 관련된 대답을 해줘! 힌트로 주어지는 키워드들을 토대로 문장을 만들면, 네가 더 오래 기억할 수 있게 될거야."
    )]
    AnchoringViolation,

    /// Generated text never parsed into the requested shape.
    #[error("LLM 응답이 JSON 으로 변환되지 않습니다. ({artifact}, {attempts}회 시도)")]
    SynthesisFailure { artifact: &'static str, attempts: u32 },

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// Invalid runtime configuration (startup only).
    #[error("config error: {0}")]
    Config(String),
}

impl TutorError {
    /// Stable numeric code reported to callers.
    pub fn code(&self) -> u16 {
        match self {
            TutorError::MalformedRequest
            | TutorError::OutOfDomain
            | TutorError::AnchoringViolation => 400,
            TutorError::SynthesisFailure { .. } | TutorError::Config(_) => 500,
            TutorError::Upstream(_) => 502,
        }
    }

    /// Short machine-readable kind.
    pub fn kind(&self) -> &'static str {
        match self {
            TutorError::MalformedRequest => "MALFORMED_REQUEST",
            TutorError::OutOfDomain => "OUT_OF_DOMAIN",
            TutorError::AnchoringViolation => "ANCHORING_VIOLATION",
            TutorError::SynthesisFailure { .. } => "SYNTHESIS_FAILURE",
            TutorError::Upstream(_) => "UPSTREAM_ERROR",
            TutorError::Config(_) => "CONFIG_ERROR",
        }
    }
}
