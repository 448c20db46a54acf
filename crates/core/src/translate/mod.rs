mod gemini;
mod payload;
mod transport;

use crate::config::ConfigError;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

pub use gemini::{
    endpoint, translate, Candidate, CandidateContent, CandidatePart, GenerateContentRequest,
    GenerateContentResponse, GeminiTranslator, GenerationConfig, PromptFeedback, RequestContent,
    RequestPart, ThinkingConfig, TranslateOptions, TranslationRequest, FINISH_REASON_STOP,
};
pub use payload::{
    ResponseSchemaKind, FIELD_CONCISE, FIELD_DIRECT, FIELD_HUMBLE, FIELD_NATURAL,
    FIELD_TRANSLATION, PLACEHOLDER,
};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, TransportError};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LanguagePair {
    pub source: String,
    pub target: String,
}

impl LanguagePair {
    pub fn new<S: Into<String>, T: Into<String>>(source: S, target: T) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum TranslateError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("text to translate must not be empty")]
    EmptyText,
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    ResponseShape(#[from] ResponseShapeError),
}

/// The provider answered 2xx but the envelope is not usable. Fragments are
/// serialized JSON of the offending part of the response.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ResponseShapeError {
    #[error("response is not a generateContent envelope ({reason}): {raw}")]
    Malformed { reason: String, raw: String },
    #[error("response has no candidates{}: {raw}", block_detail(.block_reason))]
    NoCandidates {
        block_reason: Option<String>,
        raw: String,
    },
    #[error("generation stopped with finish reason {reason}: {candidate}")]
    AbnormalFinish { reason: String, candidate: String },
    #[error("candidate has no content: {candidate}")]
    MissingContent { candidate: String },
    #[error("candidate content has no parts: {candidate}")]
    MissingParts { candidate: String },
    #[error("candidate returned empty text: {candidate}")]
    EmptyText { candidate: String },
}

fn block_detail(block_reason: &Option<String>) -> String {
    match block_reason {
        Some(reason) => format!(" (prompt blocked: {reason})"),
        None => String::new(),
    }
}

pub trait Translator: Send + Sync {
    fn translate(
        &self,
        text: String,
        languages: LanguagePair,
    ) -> BoxFuture<'_, Result<String, TranslateError>>;
}
