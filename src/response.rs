//! Parsing of appliance response bodies
//!
//! Download-station endpoints answer with a JSON object carrying an `error`
//! integer (0 = success), an optional `reason`, and on login a `sid`. Older
//! firmware and the administration service answer with XML instead, where only
//! the session tag is of interest. Unknown fields are always ignored.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

// The patterns are literals; compiling them cannot fail at runtime.
// Tag values may be wrapped in CDATA sections.
#[allow(clippy::expect_used)]
static SID_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<sid>\s*(?:<!\[CDATA\[)?([^<\]]+)(?:\]\]>)?\s*</sid>")
        .expect("valid sid tag pattern")
});

#[allow(clippy::expect_used)]
static SID_LOOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)sid["\s:=]+([^"<\s]+)"#).expect("valid loose sid pattern"));

#[allow(clippy::expect_used)]
static TOKEN_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<token>\s*(?:<!\[CDATA\[)?([^<\]]+)(?:\]\]>)?\s*</token>")
        .expect("valid token tag pattern")
});

#[allow(clippy::expect_used)]
static AUTH_SID_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<authSid>\s*(?:<!\[CDATA\[)?([^<\]]+)(?:\]\]>)?\s*</authSid>")
        .expect("valid authSid tag pattern")
});

/// Which parser understood the body
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyFormat {
    /// A JSON document
    Json,
    /// XML or flat text from which a session tag was scraped
    Markup,
}

/// The fields of an appliance response the client cares about
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedBody {
    /// Parser that produced this
    pub format: BodyFormat,
    /// `error` field; `None` when absent
    pub error: Option<i64>,
    /// `reason` field
    pub reason: Option<String>,
    /// Session identifier (`sid`)
    pub session_id: Option<String>,
    /// Secondary token
    pub token: Option<String>,
}

impl ParsedBody {
    /// `error` is absent or zero
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_none_or(|code| code == 0)
    }
}

/// Parse a body as JSON, falling back to scraping a session tag from markup.
///
/// Returns `None` when the body is neither JSON nor markup containing a session id.
pub fn parse_body(body: &str) -> Option<ParsedBody> {
    parse_json(body).or_else(|| scrape_markup(body))
}

/// Parse a JSON body. Non-object JSON parses but carries no fields.
pub fn parse_json(body: &str) -> Option<ParsedBody> {
    let value: Value = serde_json::from_str(body.trim()).ok()?;

    Some(ParsedBody {
        format: BodyFormat::Json,
        error: value.get("error").and_then(as_code),
        reason: value.get("reason").and_then(as_text),
        session_id: value.get("sid").and_then(as_text),
        token: value.get("token").and_then(as_text),
    })
}

/// Scrape `<sid>` (or a loose `sid=...`) and `<token>` from an XML or text body
pub fn scrape_markup(body: &str) -> Option<ParsedBody> {
    let session_id = capture(&SID_TAG, body).or_else(|| capture(&SID_LOOSE, body))?;

    Some(ParsedBody {
        format: BodyFormat::Markup,
        error: None,
        reason: None,
        session_id: Some(session_id),
        token: capture(&TOKEN_TAG, body),
    })
}

/// Session id from the administration login's `<authSid>` element
pub fn scrape_auth_sid(body: &str) -> Option<String> {
    capture(&AUTH_SID_TAG, body)
}

fn capture(pattern: &Regex, body: &str) -> Option<String> {
    pattern
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Error codes arrive as numbers, and from some firmware as numeric strings
fn as_code(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
