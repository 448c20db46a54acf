use crate::config::{ConfigError, GeminiSettings, PluginConfig};
use crate::lang::resolve_language_name;
use crate::translate::payload::ResponseSchemaKind;
use crate::translate::transport::{HttpRequest, HttpTransport, TransportError};
use crate::translate::{LanguagePair, ResponseShapeError, TranslateError, Translator};
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use url::Url;

const LOG_TARGET: &str = "translate::gemini";
const RESPONSE_MIME_TYPE: &str = "application/json";

/// The only finish reason accepted as a complete answer.
pub const FINISH_REASON_STOP: &str = "STOP";

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<RequestContent>,
    pub generation_config: GenerationConfig,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RequestContent {
    pub role: String,
    pub parts: Vec<RequestPart>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RequestPart {
    pub text: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub thinking_config: ThinkingConfig,
    pub temperature: f64,
    pub max_output_tokens: u32,
    pub response_mime_type: String,
    pub response_schema: Value,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ThinkingConfig {
    /// -1 lets the model think as long as it wants, 0 disables thinking.
    pub thinking_budget: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidates: Option<Vec<Candidate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_feedback: Option<PromptFeedback>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<CandidateContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    /// Safety ratings, citations and the like; kept for error reports.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct CandidateContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parts: Option<Vec<CandidatePart>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct CandidatePart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate.
    pub fn first_text(&self) -> Result<&str, ResponseShapeError> {
        let candidate = self
            .candidates
            .as_ref()
            .and_then(|c| c.first())
            .ok_or_else(|| ResponseShapeError::NoCandidates {
                block_reason: self
                    .prompt_feedback
                    .as_ref()
                    .and_then(|f| f.block_reason.clone()),
                raw: fragment(self),
            })?;

        if let Some(reason) = candidate.finish_reason.as_deref() {
            if reason != FINISH_REASON_STOP {
                return Err(ResponseShapeError::AbnormalFinish {
                    reason: reason.to_owned(),
                    candidate: fragment(candidate),
                });
            }
        }

        let content = candidate
            .content
            .as_ref()
            .ok_or_else(|| ResponseShapeError::MissingContent {
                candidate: fragment(candidate),
            })?;
        let part = content
            .parts
            .as_ref()
            .and_then(|p| p.first())
            .ok_or_else(|| ResponseShapeError::MissingParts {
                candidate: fragment(candidate),
            })?;

        match part.text.as_deref() {
            Some(text) if !text.is_empty() => Ok(text),
            _ => Err(ResponseShapeError::EmptyText {
                candidate: fragment(candidate),
            }),
        }
    }
}

fn fragment<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

/// Everything one `generateContent` call needs, resolved from the caller's
/// arguments and the validated settings.
#[derive(Clone, Debug, PartialEq)]
pub struct TranslationRequest {
    pub text: String,
    pub source_lang: String,
    pub target_lang: String,
    pub model: String,
    pub temperature: f64,
    pub max_output_tokens: u32,
    pub thinking_enabled: bool,
}

impl TranslationRequest {
    pub fn new(
        text: &str,
        source_lang: &str,
        target_lang: &str,
        settings: &GeminiSettings,
    ) -> Result<Self, TranslateError> {
        if text.trim().is_empty() {
            return Err(TranslateError::EmptyText);
        }
        Ok(Self {
            text: text.to_owned(),
            source_lang: source_lang.to_owned(),
            target_lang: target_lang.to_owned(),
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_output_tokens: settings.max_output_tokens,
            thinking_enabled: settings.thinking_enabled,
        })
    }

    pub fn prompt(&self) -> String {
        format!(
            "Translate the following text from {} to {}:\n\n{}",
            resolve_language_name(&self.source_lang),
            resolve_language_name(&self.target_lang),
            self.text
        )
    }

    pub fn thinking_budget(&self) -> i32 {
        if self.thinking_enabled {
            -1
        } else {
            0
        }
    }

    pub fn schema_kind(&self) -> ResponseSchemaKind {
        ResponseSchemaKind::for_target(&self.target_lang)
    }

    pub fn to_payload(&self) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user".to_owned(),
                parts: vec![RequestPart {
                    text: self.prompt(),
                }],
            }],
            generation_config: GenerationConfig {
                thinking_config: ThinkingConfig {
                    thinking_budget: self.thinking_budget(),
                },
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
                response_mime_type: RESPONSE_MIME_TYPE.to_owned(),
                response_schema: self.schema_kind().schema(),
            },
        }
    }
}

/// `{base}/models/{model}:generateContent?key={api key}`
pub fn endpoint(settings: &GeminiSettings) -> Result<Url, ConfigError> {
    let base = settings.base_url.as_str().trim_end_matches('/');
    let mut url = Url::parse(&format!("{base}/models/{}:generateContent", settings.model))
        .map_err(|e| ConfigError::InvalidBaseUrl(format!("{base}: {e}")))?;
    url.query_pairs_mut()
        .append_pair("key", settings.api_key.expose());
    Ok(url)
}

fn build_http_request(
    settings: &GeminiSettings,
    request: &TranslationRequest,
) -> Result<HttpRequest, TranslateError> {
    let body = serde_json::to_value(request.to_payload()).map_err(TranslateError::Encode)?;
    let headers = BTreeMap::from([("Content-Type".to_owned(), RESPONSE_MIME_TYPE.to_owned())]);

    Ok(HttpRequest {
        method: Method::POST,
        url: endpoint(settings)?,
        headers,
        body,
    })
}

#[derive(Clone, Default)]
pub struct TranslateOptions {
    pub config: PluginConfig,
    pub transport: Option<Arc<dyn HttpTransport>>,
}

impl TranslateOptions {
    pub fn new(config: PluginConfig) -> Self {
        Self {
            config,
            transport: None,
        }
    }

    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }
}

/// Translates `text` with one `generateContent` call.
///
/// Configuration problems are reported before any request is sent. A reply
/// whose text is not the requested JSON is returned as-is rather than failing.
pub async fn translate(
    text: &str,
    source_lang: &str,
    target_lang: &str,
    options: &TranslateOptions,
) -> Result<String, TranslateError> {
    let transport = options
        .transport
        .as_deref()
        .ok_or(ConfigError::MissingTransport)?;
    let settings = GeminiSettings::from_plugin_config(&options.config)?;
    let request = TranslationRequest::new(text, source_lang, target_lang, &settings)?;
    let http_request = build_http_request(&settings, &request)?;

    tracing::debug!(
        target: LOG_TARGET,
        model = %request.model,
        source_lang = %request.source_lang,
        target_lang = %request.target_lang,
        schema = ?request.schema_kind(),
        thinking_budget = request.thinking_budget(),
        "sending generateContent request"
    );

    let response = transport.send(http_request).await?;

    if !response.ok() {
        tracing::warn!(
            target: LOG_TARGET,
            status = response.status,
            status_text = %response.status_text,
            "generateContent returned an error status"
        );
        let body = Some(response.body).filter(|b| !b.is_empty());
        return Err(TransportError::Status {
            status: response.status,
            status_text: response.status_text,
            body,
        }
        .into());
    }

    let data = response
        .data
        .ok_or_else(|| ResponseShapeError::Malformed {
            reason: "body is not JSON".to_owned(),
            raw: response.body.clone(),
        })?;
    let envelope: GenerateContentResponse =
        serde_json::from_value(data.clone()).map_err(|e| ResponseShapeError::Malformed {
            reason: e.to_string(),
            raw: data.to_string(),
        })?;

    let text = envelope.first_text().inspect_err(|e| {
        tracing::warn!(target: LOG_TARGET, error = %e, "unusable generateContent response");
    })?;

    Ok(request.schema_kind().render(text))
}

/// `Translator` over the Gemini API, carrying its options between calls.
#[derive(Clone)]
pub struct GeminiTranslator {
    options: TranslateOptions,
}

impl GeminiTranslator {
    pub fn new(options: TranslateOptions) -> Self {
        Self { options }
    }
}

impl Translator for GeminiTranslator {
    fn translate(
        &self,
        text: String,
        languages: LanguagePair,
    ) -> BoxFuture<'_, Result<String, TranslateError>> {
        async move { translate(&text, &languages.source, &languages.target, &self.options).await }
            .boxed()
    }
}
