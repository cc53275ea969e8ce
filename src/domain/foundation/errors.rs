//! Field-level validation errors reported by the remote API.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

const GENERIC_MESSAGE: &str = "An error occurred. Please try again.";
const CHECK_INPUT_MESSAGE: &str = "Please check your input and try again.";
const INVALID_REQUEST_MESSAGE: &str = "Invalid request. Please check your input.";

/// Prefixes the API puts in front of the human-readable part of a message.
const MESSAGE_PREFIXES: [&str; 4] = ["validation error", "field error", "error", "detail"];

/// Trailing words after which a message is treated as cut off, so no period is added.
const OPEN_ENDED_SUFFIXES: [&str; 5] = ["available", "required", "total", "amount", "balance"];

/// Validation failure for a submitted form, split into a general message
/// and per-field messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors {
    general: Option<String>,
    fields: BTreeMap<String, String>,
}

impl FieldErrors {
    /// Creates an empty error set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the general (non-field) message.
    pub fn with_general(mut self, message: impl Into<String>) -> Self {
        self.general = Some(message.into());
        self
    }

    /// Adds a message for a specific field.
    pub fn with_field(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.fields.insert(field.into(), message.into());
        self
    }

    /// Builds an error set from a 400 response body.
    ///
    /// The API reports problems either as a single `error`, `detail`,
    /// `message` or `non_field_errors` entry, or as a map of field name to a
    /// list of messages, optionally nested under `errors`.
    pub fn from_response_body(body: &Value) -> Self {
        let Some(object) = body.as_object() else {
            return Self::new().with_general(INVALID_REQUEST_MESSAGE);
        };

        for key in ["error", "detail", "message"] {
            if let Some(message) = object.get(key).and_then(first_message) {
                return Self::new().with_general(clean_message(&message));
            }
        }

        if let Some(message) = object.get("non_field_errors").and_then(first_message) {
            return Self::new().with_general(clean_message(&message));
        }

        if let Some(nested @ Value::Object(_)) = object.get("errors") {
            return Self::from_response_body(nested);
        }

        let mut errors = Self::new();
        for (field, value) in object {
            if field == "non_field_errors" {
                continue;
            }
            if let Some(message) = first_message(value) {
                errors.fields.insert(field.clone(), clean_message(&message));
            }
        }

        if errors.fields.is_empty() {
            errors.general = Some(CHECK_INPUT_MESSAGE.to_string());
        }
        errors
    }

    /// The general message, if any.
    pub fn general(&self) -> Option<&str> {
        self.general.as_deref()
    }

    /// The message for one field, if any.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// All per-field messages, ordered by field name.
    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    /// True when neither a general nor a field message is present.
    pub fn is_empty(&self) -> bool {
        self.general.is_none() && self.fields.is_empty()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(general) = &self.general {
            return write!(f, "{}", general);
        }
        if self.fields.is_empty() {
            return write!(f, "{}", GENERIC_MESSAGE);
        }
        let joined = self
            .fields
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "{}", joined)
    }
}

/// First human-readable message in a JSON value: the value itself when it is
/// a string, the first element when it is an array.
fn first_message(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(items) => items.first().and_then(first_message),
        Value::Null | Value::Object(_) => None,
        Value::String(_) => None,
        other => Some(other.to_string()),
    }
}

/// Normalizes a server-supplied error message for display.
///
/// Strips markup, drops `error:`-style prefixes (keeping the text after the
/// last one), capitalizes the first letter and terminates the sentence.
pub fn clean_message(raw: &str) -> String {
    let stripped = strip_tags(raw);
    let mut cleaned = after_last_prefix(&stripped).trim().to_string();

    if let Some(first) = cleaned.chars().next() {
        let upper: String = first.to_uppercase().collect();
        cleaned.replace_range(..first.len_utf8(), &upper);
    }

    if cleaned.is_empty() {
        return GENERIC_MESSAGE.to_string();
    }

    let terminated = cleaned.ends_with(['.', '!', '?']);
    if !terminated && !ends_open(&cleaned) {
        cleaned.push('.');
    }
    cleaned
}

fn strip_tags(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_tag = false;
    for c in raw.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

fn after_last_prefix(text: &str) -> &str {
    let lower = text.to_ascii_lowercase();
    let bytes = lower.as_bytes();
    let mut start = 0;

    for i in 0..bytes.len() {
        if !lower.is_char_boundary(i) {
            continue;
        }
        for prefix in MESSAGE_PREFIXES {
            if !lower[i..].starts_with(prefix) {
                continue;
            }
            let mut j = i + prefix.len();
            while j < bytes.len() && bytes[j] == b' ' {
                j += 1;
            }
            if j < bytes.len() && bytes[j] == b':' {
                j += 1;
                while j < bytes.len() && bytes[j] == b' ' {
                    j += 1;
                }
                start = start.max(j);
            }
        }
    }
    &text[start..]
}

fn ends_open(text: &str) -> bool {
    let last_word = text
        .rsplit(char::is_whitespace)
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    text.contains(char::is_whitespace) && OPEN_ENDED_SUFFIXES.contains(&last_word.as_str())
}
