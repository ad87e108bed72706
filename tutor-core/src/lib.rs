//! Socratic tutoring protocol over retrieval + generation.
//!
//! Public API: [`TutorEngine::handle`]. A first in-domain question creates a
//! session and returns step 0; each anchored follow-up returns the next step;
//! the turn that exhausts the sequence returns the summary and closes the session.
//!
//! The three collaborators (embedding model, vector index, text generator) are
//! injected through the traits in [`ports`]; [`adapters`] wires the workspace's
//! concrete clients to them.

mod adapters;
mod cfg;
mod engine;
mod error;
mod synth;

pub mod gate;
pub mod model;
pub mod normalize;
pub mod ports;
pub mod prompt;
pub mod session;

pub use cfg::TutorConfig;
pub use engine::{TokenAction, TurnOutcome, TutorEngine};
pub use error::{TutorError, UpstreamError};
pub use gate::RelevanceGate;
pub use model::{STEP_COUNT, Step, StepSequence, Summary, TutorReply};
pub use session::{Session, SessionStore};
pub use synth::Synthesizer;
