use serde_json::{json, Map, Value};

const LOG_TARGET: &str = "translate::payload";

pub const FIELD_TRANSLATION: &str = "translation";
pub const FIELD_DIRECT: &str = "direct translation";
pub const FIELD_CONCISE: &str = "concise expression";
pub const FIELD_NATURAL: &str = "more natural expression";
pub const FIELD_HUMBLE: &str = "reddit humble expression";

/// Substituted for a phrasing the model left out.
pub const PLACEHOLDER: &str = "N/A";

struct Phrasing {
    field: &'static str,
    label: &'static str,
}

// Output order of the English rendering.
const PHRASINGS: [Phrasing; 4] = [
    Phrasing {
        field: FIELD_DIRECT,
        label: "直译",
    },
    Phrasing {
        field: FIELD_CONCISE,
        label: "简译",
    },
    Phrasing {
        field: FIELD_NATURAL,
        label: "自然表达",
    },
    Phrasing {
        field: FIELD_HUMBLE,
        label: "Reddit谦逊表达",
    },
];

const REQUIRED_PHRASINGS: [&str; 4] = [FIELD_CONCISE, FIELD_NATURAL, FIELD_DIRECT, FIELD_HUMBLE];

// Tried in order when a non-English payload lacks `translation`.
const FALLBACK_FIELDS: [&str; 4] = [FIELD_NATURAL, FIELD_DIRECT, FIELD_CONCISE, FIELD_HUMBLE];

/// Shape of JSON the model is asked to produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseSchemaKind {
    /// Four alternative English phrasings.
    MultiPhrasing,
    /// A single `translation` field.
    SingleTranslation,
}

impl ResponseSchemaKind {
    pub fn for_target(target_lang: &str) -> Self {
        if target_lang == "en" {
            Self::MultiPhrasing
        } else {
            Self::SingleTranslation
        }
    }

    pub fn schema(self) -> Value {
        match self {
            Self::MultiPhrasing => {
                let properties: Map<String, Value> = REQUIRED_PHRASINGS
                    .into_iter()
                    .map(|field| (field.to_owned(), json!({ "type": "string" })))
                    .collect();
                json!({
                    "type": "object",
                    "properties": properties,
                    "required": REQUIRED_PHRASINGS,
                })
            }
            Self::SingleTranslation => json!({
                "type": "object",
                "properties": {
                    FIELD_TRANSLATION: {
                        "type": "string",
                        "description": "The translated text",
                    },
                },
                "required": [FIELD_TRANSLATION],
            }),
        }
    }

    /// Turns the model's text into the string handed back to the caller.
    ///
    /// Text that is not a JSON object is returned unchanged: JSON mode is not
    /// always honored and the raw text is still the best answer available.
    pub fn render(self, text: &str) -> String {
        let parsed: Value = match serde_json::from_str(text) {
            Ok(v) => v,
            Err(e) => {
                tracing::debug!(target: LOG_TARGET, error = %e, "payload is not JSON, returning raw text");
                return text.to_owned();
            }
        };
        let Some(fields) = parsed.as_object() else {
            tracing::debug!(target: LOG_TARGET, "payload is not a JSON object, returning raw text");
            return text.to_owned();
        };

        match self {
            Self::MultiPhrasing => render_phrasings(fields),
            Self::SingleTranslation => match fields.get(FIELD_TRANSLATION) {
                // A string translation is the answer even when empty.
                Some(Value::String(translation)) => translation.clone(),
                _ => std::iter::once(FIELD_TRANSLATION)
                    .chain(FALLBACK_FIELDS)
                    .find_map(|field| field_text(fields, field))
                    .unwrap_or_else(|| text.to_owned()),
            },
        }
    }
}

fn render_phrasings(fields: &Map<String, Value>) -> String {
    let has_phrasing = PHRASINGS
        .iter()
        .any(|p| field_text(fields, p.field).is_some());
    if !has_phrasing {
        if let Some(translation) = field_text(fields, FIELD_TRANSLATION) {
            return translation;
        }
    }

    PHRASINGS
        .iter()
        .map(|p| {
            let value = field_text(fields, p.field).unwrap_or_else(|| PLACEHOLDER.to_owned());
            format!("{}: {}", p.label, value)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn field_text(fields: &Map<String, Value>, name: &str) -> Option<String> {
    match fields.get(name)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        value @ (Value::Bool(_) | Value::Number(_)) => Some(value.to_string()),
        _ => None,
    }
}
