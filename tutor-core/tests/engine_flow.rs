use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;
use tutor_core::ports::{Embedder, RetrievalIndex, RetrievedDocs, TextGenerator};
use tutor_core::{
    SessionStore, TokenAction, TurnOutcome, TutorConfig, TutorEngine, TutorError, TutorReply,
    UpstreamError,
};

const QUESTION: &str = "이자겸의 난은 언제 발생했어?";
const ANSWER_STEP0: &str = "고려시대에 일어났어";
const ANSWER_STEP1: &str = "권문세족이 왕실과 혼인했어";
const UNRELATED: &str = "오늘 점심 뭐 먹지";

const STEPS: &str = r#"```json
[{"index":0,"summary":"이자겸의 난이 언제 발생했는지 알아보자!","question":"먼저 시기를 떠올려 볼까?","hints":["고려시대","무신정권"]},
 {"index":1,"summary":"배경을 알아보자!","question":"이자겸은 어떤 인물이었을까?","hints":["권문세족","왕실과 혼인"]},
 {"index":2,"summary":"결과를 알아보자!","question":"결국 어떻게 끝났을까?","hints":["실패","귀족사회의 동요"]}]
```"#;

const SUMMARY: &str = r#"{"questionSummary":"이자겸의 난","responseSummary":"고려 인종 때의 반란","thoughtProcess":["시기","배경","결과"],"keywords":["고려시대","권문세족"]}"#;

/* ---------------------------- fakes ---------------------------- */

struct TableEmbedder(HashMap<&'static str, Vec<f32>>);

impl TableEmbedder {
    fn new() -> Self {
        Self(HashMap::from([
            ("고려시대 무신정권", vec![1.0, 0.0, 0.0]),
            ("권문세족 왕실과 혼인", vec![0.0, 1.0, 0.0]),
            (ANSWER_STEP0, vec![1.0, 0.0, 0.0]),
            (ANSWER_STEP1, vec![0.0, 1.0, 0.0]),
            // cosine 0.1 against both hint vectors above
            (UNRELATED, vec![0.1, 0.1, 0.98994946]),
        ]))
    }
}

impl Embedder for TableEmbedder {
    fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, UpstreamError>> {
        let v = self.0.get(text).cloned().unwrap_or_else(|| vec![0.0, 0.0, 1.0]);
        Box::pin(async move { Ok(v) })
    }
}

struct FixedIndex {
    distances: Vec<f32>,
}

impl RetrievalIndex for FixedIndex {
    fn query<'a>(
        &'a self,
        _vector: Vec<f32>,
        k: u64,
    ) -> BoxFuture<'a, Result<RetrievedDocs, UpstreamError>> {
        let n = (k as usize).min(self.distances.len());
        let docs = RetrievedDocs {
            texts: (0..n).map(|i| format!("문서 {i}: 이자겸의 난은 1126년 고려에서 일어났다.")).collect(),
            distances: self.distances[..n].to_vec(),
        };
        Box::pin(async move { Ok(docs) })
    }
}

#[derive(Default)]
struct ScriptedGenerator {
    replies: Mutex<VecDeque<String>>,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    fn push(&self, reply: &str) {
        self.replies.lock().unwrap().push_back(reply.to_string());
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TextGenerator for ScriptedGenerator {
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
            .ok_or_else(|| UpstreamError::Generation("script exhausted".into()));
        Box::pin(async move { next })
    }
}

struct Harness {
    engine: TutorEngine,
    generator: Arc<ScriptedGenerator>,
    store: Arc<SessionStore>,
}

fn harness(distances: &[f32]) -> Harness {
    let generator = Arc::new(ScriptedGenerator::default());
    let store = Arc::new(SessionStore::new());
    let engine = TutorEngine::new(
        TutorConfig::default(),
        Arc::new(TableEmbedder::new()),
        Arc::new(FixedIndex {
            distances: distances.to_vec(),
        }),
        generator.clone(),
        store.clone(),
    );
    Harness {
        engine,
        generator,
        store,
    }
}

const IN_DOMAIN: [f32; 3] = [0.35, 0.3, 0.25];

fn step_index(outcome: &TurnOutcome) -> usize {
    match &outcome.reply {
        TutorReply::Step(s) => s.index,
        other => panic!("expected a step, got {other:?}"),
    }
}

fn issued(outcome: &TurnOutcome) -> String {
    match &outcome.token {
        TokenAction::Issue(id) => id.clone(),
        other => panic!("expected a new token, got {other:?}"),
    }
}

async fn cursor_of(store: &SessionStore, id: &str) -> usize {
    store.get(id).await.expect("live session").lock().await.cursor()
}

/* ---------------------------- scenarios ---------------------------- */

#[tokio::test]
async fn first_question_opens_session_with_step_zero() {
    let h = harness(&IN_DOMAIN);
    h.generator.push(STEPS);

    let out = h.engine.handle(None, QUESTION).await.unwrap();
    assert_eq!(step_index(&out), 0);
    let id = issued(&out);
    assert_eq!(cursor_of(&h.store, &id).await, 1);
    assert_eq!(h.generator.calls(), 1);
}

#[tokio::test]
async fn full_dialogue_ends_with_summary_and_cleared_token() {
    let h = harness(&IN_DOMAIN);
    h.generator.push(STEPS);
    let id = issued(&h.engine.handle(None, QUESTION).await.unwrap());

    let second = h.engine.handle(Some(&id), ANSWER_STEP0).await.unwrap();
    assert_eq!(step_index(&second), 1);
    assert_eq!(second.token, TokenAction::Keep);
    assert_eq!(cursor_of(&h.store, &id).await, 2);

    h.generator.push(SUMMARY);
    let third = h.engine.handle(Some(&id), ANSWER_STEP1).await.unwrap();
    let TutorReply::Summary(summary) = &third.reply else {
        panic!("expected summary, got {:?}", third.reply);
    };
    assert_eq!(summary.keywords, ["고려시대", "권문세족"]);
    assert_eq!(third.token, TokenAction::Clear);
    assert!(h.store.get(&id).await.is_none());

    // Stale token behaves like no token at all.
    h.generator.push(STEPS);
    let fresh = h.engine.handle(Some(&id), QUESTION).await.unwrap();
    assert_eq!(step_index(&fresh), 0);
    assert_ne!(issued(&fresh), id);
    assert_eq!(h.store.len().await, 1);
}

#[tokio::test]
async fn low_mean_score_is_out_of_domain_without_side_effects() {
    let h = harness(&[0.05, 0.05, 0.05]);
    h.generator.push(STEPS);

    let err = h.engine.handle(None, QUESTION).await.unwrap_err();
    assert!(matches!(err, TutorError::OutOfDomain));
    assert!(h.store.is_empty().await);
    assert_eq!(h.generator.calls(), 0);
}

#[tokio::test]
async fn empty_retrieval_is_out_of_domain() {
    let h = harness(&[]);
    let err = h.engine.handle(None, QUESTION).await.unwrap_err();
    assert!(matches!(err, TutorError::OutOfDomain));
    assert!(h.store.is_empty().await);
}

#[tokio::test]
async fn unrelated_answer_keeps_cursor_and_same_step_is_served_after_fix() {
    let h = harness(&IN_DOMAIN);
    h.generator.push(STEPS);
    let id = issued(&h.engine.handle(None, QUESTION).await.unwrap());

    let err = h.engine.handle(Some(&id), UNRELATED).await.unwrap_err();
    assert!(matches!(err, TutorError::AnchoringViolation));
    assert_eq!(cursor_of(&h.store, &id).await, 1);

    let retry = h.engine.handle(Some(&id), ANSWER_STEP0).await.unwrap();
    assert_eq!(step_index(&retry), 1);
    assert_eq!(cursor_of(&h.store, &id).await, 2);
}

#[tokio::test]
async fn sentinel_no_is_out_of_domain_after_one_call() {
    let h = harness(&IN_DOMAIN);
    h.generator.push("no");
    h.generator.push(STEPS);

    let err = h.engine.handle(None, QUESTION).await.unwrap_err();
    assert!(matches!(err, TutorError::OutOfDomain));
    assert_eq!(h.generator.calls(), 1);
    assert!(h.store.is_empty().await);
}

#[tokio::test]
async fn three_unparsable_replies_fail_without_a_session() {
    let h = harness(&IN_DOMAIN);
    for _ in 0..3 {
        h.generator.push("죄송하지만 JSON을 만들 수 없어요");
    }
    h.generator.push(STEPS);

    let err = h.engine.handle(None, QUESTION).await.unwrap_err();
    assert!(matches!(err, TutorError::SynthesisFailure { attempts: 3, .. }));
    assert_eq!(err.code(), 500);
    assert_eq!(h.generator.calls(), 3);
    assert!(h.store.is_empty().await);
}

#[tokio::test]
async fn failed_summary_leaves_session_open() {
    let h = harness(&IN_DOMAIN);
    h.generator.push(STEPS);
    let id = issued(&h.engine.handle(None, QUESTION).await.unwrap());
    h.engine.handle(Some(&id), ANSWER_STEP0).await.unwrap();

    for _ in 0..3 {
        h.generator.push("{\"questionSummary\": ");
    }
    let err = h.engine.handle(Some(&id), ANSWER_STEP1).await.unwrap_err();
    assert!(matches!(err, TutorError::SynthesisFailure { .. }));
    assert_eq!(cursor_of(&h.store, &id).await, 2);

    h.generator.push(SUMMARY);
    let out = h.engine.handle(Some(&id), ANSWER_STEP1).await.unwrap();
    assert_eq!(out.token, TokenAction::Clear);
}

#[tokio::test]
async fn generator_outage_is_upstream_error() {
    let h = harness(&IN_DOMAIN);
    let err = h.engine.handle(None, QUESTION).await.unwrap_err();
    assert!(matches!(err, TutorError::Upstream(UpstreamError::Generation(_))));
    assert_eq!(err.code(), 502);
    assert_eq!(h.generator.calls(), 1);
}

#[tokio::test]
async fn concurrent_turns_on_one_session_consume_one_step() {
    let h = harness(&IN_DOMAIN);
    h.generator.push(STEPS);
    let id = issued(&h.engine.handle(None, QUESTION).await.unwrap());

    let (a, b) = tokio::join!(
        h.engine.handle(Some(&id), ANSWER_STEP0),
        h.engine.handle(Some(&id), ANSWER_STEP0),
    );

    // The loser is checked against step 1's hints and rejected.
    let delivered: Vec<_> = [a, b].into_iter().filter_map(Result::ok).collect();
    assert_eq!(delivered.len(), 1);
    assert_eq!(step_index(&delivered[0]), 1);
    assert_eq!(cursor_of(&h.store, &id).await, 2);
}
