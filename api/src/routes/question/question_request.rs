use serde::Deserialize;

/// Request payload for /question: the opening question or a follow-up answer.
#[derive(Debug, Deserialize)]
pub struct QuestionRequest {
    pub question: String,
}
