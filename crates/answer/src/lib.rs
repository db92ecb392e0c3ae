//! Streaming answerer
//!
//! Turns retrieved contexts and a single LLM chat call into a validated,
//! citation-hydrated answer. The streaming variant emits answer-text
//! deltas while the model is still producing bytes, with heartbeats to
//! keep idle-timeout middleboxes from cutting the connection. Fallbacks
//! are values, not errors.

pub mod cache;
pub mod engine;
pub mod envelope;
pub mod partial;
pub mod prompt;
pub mod stream;
pub mod validator;

pub use cache::AnswerCache;
pub use engine::{AnswerEngine, AnswerRequest};
pub use envelope::{AnswerOutput, Citation, FallbackCategory, LlmAnswer, RawCitation};
pub use partial::PartialAnswerParser;
pub use stream::AnswerEvent;
pub use validator::validate;

use thiserror::Error;

/// Answer errors (truly exceptional conditions only; fallbacks are values)
#[derive(Error, Debug)]
pub enum AnswerError {
    #[error("query must not be empty")]
    EmptyQuery,

    #[error("invalid answer envelope: {0}")]
    Invalid(String),
}

impl From<AnswerError> for newsflow_core::Error {
    fn from(err: AnswerError) -> Self {
        match err {
            AnswerError::EmptyQuery => {
                newsflow_core::Error::Validation("query must not be empty".to_string())
            }
            AnswerError::Invalid(msg) => newsflow_core::Error::Answer(msg),
        }
    }
}
