//! The analysis verdict and extraction of it from free-text model replies.
//!
//! Replies are parsed with a brace-scanning policy: the first `{` in the
//! text opens a candidate object, the scanner walks to its balanced `}`
//! (ignoring braces inside string literals), and only that slice is handed
//! to `serde_json`. Prose before or after the object is tolerated.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::AnalyzeError;

/// Structured outcome of an analysis as the client understands it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisVerdict {
    pub can_park: bool,
    pub explanation: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub restrictions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<u32>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Locate the first top-level brace-delimited object in `text`.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let end = start + offset + ch.len_utf8();
                    return Some(&text[start..end]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Parse a model reply into the JSON object it carries, unmodified.
///
/// No field validation happens here; whatever object the model produced is
/// what the caller gets back.
pub fn parse_reply(text: &str) -> Result<Value, AnalyzeError> {
    let object = extract_json_object(text).ok_or(AnalyzeError::NoJsonObject)?;
    Ok(serde_json::from_str(object)?)
}
