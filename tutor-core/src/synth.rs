//! Structured response synthesis with a bounded retry loop.
//!
//! One generator call per attempt, identical request every time, no backoff.
//! `Ok(None)` is reserved for the "no" sentinel; exhausting the attempts is a
//! [`TutorError::SynthesisFailure`].

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, error, info, warn};

use crate::error::TutorError;
use crate::model::{Step, StepSequence, Summary};
use crate::normalize::{Shape, is_sentinel, normalize};
use crate::ports::TextGenerator;
use crate::prompt;

pub struct Synthesizer {
    generator: Arc<dyn TextGenerator>,
    max_attempts: u32,
    max_output_tokens: u32,
}

impl Synthesizer {
    pub fn new(generator: Arc<dyn TextGenerator>, max_attempts: u32, max_output_tokens: u32) -> Self {
        Self {
            generator,
            max_attempts: max_attempts.max(1),
            max_output_tokens,
        }
    }

    /// Generates the step sequence for `question` grounded on `docs`.
    pub async fn steps(
        &self,
        question: &str,
        docs: &[String],
    ) -> Result<Option<StepSequence>, TutorError> {
        let user = prompt::steps_user_prompt(question, docs);
        self.run(prompt::STEPS_SYSTEM, &user, Shape::Steps, "steps", parse_steps)
            .await
    }

    /// Generates the closing summary of `steps`.
    pub async fn summary(&self, steps: &StepSequence) -> Result<Option<Summary>, TutorError> {
        let user = prompt::summary_user_prompt(steps);
        self.run(
            prompt::SUMMARY_SYSTEM,
            &user,
            Shape::Summary,
            "summary",
            parse_json::<Summary>,
        )
        .await
    }

    async fn run<T>(
        &self,
        system: &str,
        user: &str,
        shape: Shape,
        artifact: &'static str,
        parse: fn(&str) -> Result<T, String>,
    ) -> Result<Option<T>, TutorError> {
        for attempt in 1..=self.max_attempts {
            let raw = self
                .generator
                .complete(system, user, self.max_output_tokens)
                .await?;

            if is_sentinel(&raw) {
                info!(artifact, attempt, "generator answered the out-of-domain sentinel");
                return Ok(None);
            }

            let text = normalize(&raw, shape);
            match parse(&text) {
                Ok(value) => {
                    debug!(artifact, attempt, "structured response parsed");
                    return Ok(Some(value));
                }
                Err(reason) => {
                    error!(
                        artifact,
                        attempt,
                        max_attempts = self.max_attempts,
                        %reason,
                        raw = %raw,
                        "failed to parse generated JSON"
                    );
                }
            }
        }

        Err(TutorError::SynthesisFailure {
            artifact,
            attempts: self.max_attempts,
        })
    }
}

fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T, String> {
    serde_json::from_str(text).map_err(|e| e.to_string())
}

fn parse_steps(text: &str) -> Result<StepSequence, String> {
    let steps: Vec<Step> = parse_json(text)?;
    for (pos, s) in steps.iter().enumerate() {
        if s.index != pos {
            warn!(pos, index = s.index, "step index differs from its position, renumbering");
        }
    }
    StepSequence::new(steps).map_err(|len| format!("expected 3 steps, got {len}"))
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use futures::future::BoxFuture;

    use super::*;
    use crate::error::UpstreamError;

    struct Scripted {
        replies: Mutex<VecDeque<Result<String, UpstreamError>>>,
        calls: AtomicU32,
    }

    impl Scripted {
        fn new(replies: Vec<Result<String, UpstreamError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                calls: AtomicU32::new(0),
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl TextGenerator for Scripted {
        fn complete<'a>(
            &'a self,
            _system: &'a str,
            _user: &'a str,
            _max_output_tokens: u32,
        ) -> BoxFuture<'a, Result<String, UpstreamError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok("garbage".into()));
            Box::pin(async move { next })
        }
    }

    const STEPS_OK: &str = r#"```json
[{"index":0,"summary":"a","question":"q0","hints":["고려시대","무신정권"]},
 {"index":1,"summary":"b","question":"q1","hints":["권문세족"]},
 {"index":2,"summary":"c","question":"q2","hints":["실패"]}]
```"#;

    const SUMMARY_OK: &str = r#"{"questionSummary":"qs","responseSummary":"rs","thoughtProcess":["t1"],"keywords":["k1"]}"#;

    fn docs() -> Vec<String> {
        vec!["이자겸의 난은 1126년에 일어났다.".into()]
    }

    #[tokio::test]
    async fn success_on_second_attempt_stops_there() {
        let g = Scripted::new(vec![Ok("not json".into()), Ok(STEPS_OK.into())]);
        let synth = Synthesizer::new(g.clone(), 3, 600);
        let seq = synth.steps("q", &docs()).await.unwrap().unwrap();
        assert_eq!(seq.len(), 3);
        assert_eq!(seq.get(0).unwrap().hints, ["고려시대", "무신정권"]);
        assert_eq!(g.calls(), 2);
    }

    #[tokio::test]
    async fn three_failures_is_synthesis_failure() {
        let g = Scripted::new(vec![
            Ok("{".into()),
            Ok("[]".into()),
            Ok(r#"[{"index":0,"summary":"a","question":"q","hints":"x"}]"#.into()),
            Ok(STEPS_OK.into()),
        ]);
        let synth = Synthesizer::new(g.clone(), 3, 600);
        let err = synth.steps("q", &docs()).await.unwrap_err();
        assert!(matches!(
            err,
            TutorError::SynthesisFailure {
                artifact: "steps",
                attempts: 3
            }
        ));
        assert_eq!(g.calls(), 3);
    }

    #[tokio::test]
    async fn sentinel_short_circuits() {
        let g = Scripted::new(vec![Ok("no".into()), Ok(STEPS_OK.into())]);
        let synth = Synthesizer::new(g.clone(), 3, 600);
        assert!(synth.steps("q", &docs()).await.unwrap().is_none());
        assert_eq!(g.calls(), 1);
    }

    #[tokio::test]
    async fn wrong_step_count_consumes_a_retry() {
        let two = r#"[{"index":0,"summary":"a","question":"q","hints":[]},{"index":1,"summary":"b","question":"q","hints":[]}]"#;
        let g = Scripted::new(vec![Ok(two.into()), Ok(STEPS_OK.into())]);
        let synth = Synthesizer::new(g.clone(), 3, 600);
        assert!(synth.steps("q", &docs()).await.unwrap().is_some());
        assert_eq!(g.calls(), 2);
    }

    #[tokio::test]
    async fn summary_is_not_wrapped_and_requires_all_fields() {
        let missing = r#"{"questionSummary":"qs","responseSummary":"rs","thoughtProcess":["t1"]}"#;
        let g = Scripted::new(vec![Ok(missing.into()), Ok(format!("\u{feff} {SUMMARY_OK} "))]);
        let synth = Synthesizer::new(g.clone(), 3, 600);
        let seq = StepSequence::new(vec![
            Step { index: 0, summary: "a".into(), question: "q".into(), hints: vec![] },
            Step { index: 1, summary: "b".into(), question: "q".into(), hints: vec![] },
            Step { index: 2, summary: "c".into(), question: "q".into(), hints: vec![] },
        ])
        .unwrap();
        let summary = synth.summary(&seq).await.unwrap().unwrap();
        assert_eq!(summary.keywords, ["k1"]);
        assert_eq!(g.calls(), 2);
    }

    #[tokio::test]
    async fn upstream_failure_is_not_retried() {
        let g = Scripted::new(vec![Err(UpstreamError::Generation("503".into()))]);
        let synth = Synthesizer::new(g.clone(), 3, 600);
        let err = synth.steps("q", &docs()).await.unwrap_err();
        assert!(matches!(err, TutorError::Upstream(UpstreamError::Generation(_))));
        assert_eq!(g.calls(), 1);
    }
}
