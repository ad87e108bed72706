//! Tutoring session engine: one call per learner message.
//!
//! ```text
//! Uninitialized --in-domain--> Active(cursor=1) --anchored--> Active(cursor=2)
//!                                               --anchored--> Exhausted --summary--> Closed
//! ```
//!
//! Every rejection leaves the store and the cursor untouched. The summary is
//! only ever held by the reply: the session is removed on the same turn.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::cfg::TutorConfig;
use crate::error::TutorError;
use crate::gate::RelevanceGate;
use crate::model::TutorReply;
use crate::ports::{Embedder, RetrievalIndex, TextGenerator};
use crate::session::{Advance, Session, SessionStore};
use crate::synth::Synthesizer;

/// What the transport must do with the session token after this turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenAction {
    /// A session was created; hand this token to the client.
    Issue(String),
    /// The session stays active under the token the client already holds.
    Keep,
    /// The session was closed; the client must drop its token.
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub reply: TutorReply,
    pub token: TokenAction,
}

pub struct TutorEngine {
    cfg: TutorConfig,
    gate: RelevanceGate,
    synth: Synthesizer,
    store: Arc<SessionStore>,
}

impl TutorEngine {
    pub fn new(
        cfg: TutorConfig,
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn RetrievalIndex>,
        generator: Arc<dyn TextGenerator>,
        store: Arc<SessionStore>,
    ) -> Self {
        Self {
            gate: RelevanceGate::new(embedder, index),
            synth: Synthesizer::new(generator, cfg.max_attempts, cfg.max_output_tokens),
            store,
            cfg,
        }
    }

    /// Handles one learner message. An unknown `session_id` behaves like none.
    #[instrument(skip_all, fields(has_session = session_id.is_some()))]
    pub async fn handle(
        &self,
        session_id: Option<&str>,
        question: &str,
    ) -> Result<TurnOutcome, TutorError> {
        if let Some(id) = session_id {
            if let Some(outcome) = self.continue_session(id, question).await? {
                return Ok(outcome);
            }
            info!(session_id = %id, "unknown or closed session, starting a new one");
        }
        self.start_session(question).await
    }

    async fn start_session(&self, question: &str) -> Result<TurnOutcome, TutorError> {
        let docs = self
            .gate
            .is_in_domain(question, self.cfg.top_k, self.cfg.domain_threshold)
            .await?;

        let Some(steps) = self.synth.steps(question, &docs).await? else {
            return Err(TutorError::OutOfDomain);
        };

        let mut session = Session::new(steps);
        let Advance::Step(first) = self.store.advance(&mut session) else {
            return Err(TutorError::SynthesisFailure {
                artifact: "steps",
                attempts: self.cfg.max_attempts,
            });
        };
        let id = self.store.create(session).await;
        info!(session_id = %id, "session started");

        Ok(TurnOutcome {
            reply: TutorReply::Step(first),
            token: TokenAction::Issue(id),
        })
    }

    /// `Ok(None)` when `id` does not name a live session.
    ///
    /// The session mutex is held across the anchoring embeddings and the summary
    /// call, so two turns of one session consume one step; other sessions never wait.
    async fn continue_session(
        &self,
        id: &str,
        answer: &str,
    ) -> Result<Option<TurnOutcome>, TutorError> {
        let Some(handle) = self.store.get(id).await else {
            return Ok(None);
        };
        let mut session = handle.lock().await;
        if session.is_exhausted() {
            return Ok(None);
        }

        let Some(hints) = session.previous_hints() else {
            return Ok(None);
        };
        let anchored = self
            .gate
            .is_anchored(hints, answer, self.cfg.anchor_threshold)
            .await?;
        if !anchored {
            warn!(session_id = %id, cursor = session.cursor(), "answer not anchored to previous hints");
            return Err(TutorError::AnchoringViolation);
        }

        if !session.next_exhausts() {
            let Advance::Step(step) = self.store.advance(&mut session) else {
                return Ok(None);
            };
            info!(session_id = %id, cursor = session.cursor(), "step delivered");
            return Ok(Some(TurnOutcome {
                reply: TutorReply::Step(step),
                token: TokenAction::Keep,
            }));
        }

        // Summary first: a failed summary leaves the session where it was.
        let Some(summary) = self.synth.summary(session.steps()).await? else {
            return Err(TutorError::OutOfDomain);
        };
        self.store.advance(&mut session);
        drop(session);
        self.store.remove(id).await;
        info!(session_id = %id, "session closed");

        Ok(Some(TurnOutcome {
            reply: TutorReply::Summary(summary),
            token: TokenAction::Clear,
        }))
    }
}
