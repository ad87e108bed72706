//! Typed tutoring artifacts.

use serde::{Deserialize, Serialize};

/// Fixed number of steps generated for one initiating question.
pub const STEP_COUNT: usize = 3;

/// One turn of the tutoring dialogue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub index: usize,
    pub summary: String,
    pub question: String,
    pub hints: Vec<String>,
}

/// Exactly [`STEP_COUNT`] steps, `steps[i].index == i`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StepSequence(Vec<Step>);

impl StepSequence {
    /// Accepts `steps` only when the length matches [`STEP_COUNT`].
    ///
    /// Indices are rewritten to the array position; the array order is the
    /// step order.
    pub fn new(mut steps: Vec<Step>) -> Result<Self, usize> {
        if steps.len() != STEP_COUNT {
            return Err(steps.len());
        }
        for (i, s) in steps.iter_mut().enumerate() {
            s.index = i;
        }
        Ok(Self(steps))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&Step> {
        self.0.get(i)
    }

    pub fn steps(&self) -> &[Step] {
        &self.0
    }
}

/// Terminal artifact produced once all steps have been delivered.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub question_summary: String,
    pub response_summary: String,
    pub thought_process: Vec<String>,
    pub keywords: Vec<String>,
}

/// Body of a successful tutoring turn.
///
/// Serializes as `{"type":"service","text":{..}}` or `{"type":"summary","text":{..}}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "text")]
pub enum TutorReply {
    #[serde(rename = "service")]
    Step(Step),
    #[serde(rename = "summary")]
    Summary(Summary),
}
