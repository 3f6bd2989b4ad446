//! Reply text extraction
//!
//! The agent backend does not commit to one response shape, so the reply is
//! located by trying a fixed list of strategies in order.

use serde_json::Value;

/// Shown when no strategy finds reply text
pub const NO_REPLY_TEXT: &str = "Sorry, I could not process that request.";

/// A single way of locating reply text in a payload
pub type ExtractStrategy = fn(&Value) -> Option<&str>;

/// Strategies in priority order. The first hit wins.
pub const STRATEGIES: &[(&str, ExtractStrategy)] = &[
    ("response.result", response_result),
    ("response.response", response_response),
    ("response.message", response_message),
    ("response", response_text),
    ("raw_response", raw_response),
];

fn nested<'a>(payload: &'a Value, field: &str) -> Option<&'a str> {
    payload.get("response")?.get(field)?.as_str()
}

fn response_result(payload: &Value) -> Option<&str> {
    nested(payload, "result")
}

fn response_response(payload: &Value) -> Option<&str> {
    nested(payload, "response")
}

fn response_message(payload: &Value) -> Option<&str> {
    nested(payload, "message")
}

fn response_text(payload: &Value) -> Option<&str> {
    payload.get("response")?.as_str()
}

fn raw_response(payload: &Value) -> Option<&str> {
    payload.get("raw_response")?.as_str()
}

/// Pull the reply text out of an agent payload
pub fn extract_reply(payload: &Value) -> String {
    for (name, strategy) in STRATEGIES {
        if let Some(text) = strategy(payload) {
            tracing::trace!("Reply extracted from {}", name);
            return text.to_string();
        }
    }

    tracing::warn!("No reply text found in agent response");
    NO_REPLY_TEXT.to_string()
}
