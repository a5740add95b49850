//! Turns a provider message into a [`NormalizedRecord`].
//!
//! Everything here is total: malformed dates, bodies and markup degrade to
//! sentinel strings instead of errors.

use chrono::{DateTime, NaiveDateTime};

use crate::domain::email::{
    ExtractedRecord, FieldValue, NO_BODY, NO_SUBJECT, NormalizedRecord, PREVIEW_CHARS,
    UNKNOWN_DATE, UNKNOWN_SENDER,
};
use crate::mail::decoders::{decode_body_data, html_to_text};
use crate::mail::message::{BodyPayload, ContentKind, Header, RawMessage};

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
/// RFC 822 date after the `Day,` prefix.
const RFC822_FORMAT: &str = "%d %b %Y %H:%M:%S %z";
const PLAIN_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const OUTPUT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Value of the first header named exactly `name`, or `default`.
pub fn header_value<'a>(headers: &'a [Header], name: &str, default: &'a str) -> &'a str {
    find_header(headers, name).unwrap_or(default)
}

fn find_header<'a>(headers: &'a [Header], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|h| h.name == name)
        .map(|h| h.value.as_str())
}

/// Try each accepted format in order; the first that parses wins.
/// The wall-clock time is kept as written, without converting the offset.
pub fn parse_date(raw: &str) -> Option<String> {
    if let Some(rest) = strip_weekday(raw)
        && let Ok(dt) = DateTime::parse_from_str(rest, RFC822_FORMAT)
    {
        return Some(dt.format(OUTPUT_FORMAT).to_string());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, PLAIN_FORMAT) {
        return Some(dt.format(OUTPUT_FORMAT).to_string());
    }
    None
}

/// Drop a leading `Day, ` token. The weekday name must be valid but is not
/// checked against the calendar date.
fn strip_weekday(raw: &str) -> Option<&str> {
    let (day, rest) = raw.split_once(',')?;
    if !WEEKDAYS.iter().any(|w| w.eq_ignore_ascii_case(day)) {
        return None;
    }
    rest.strip_prefix(char::is_whitespace).map(str::trim_start)
}

pub fn normalize_date(raw: &str) -> String {
    parse_date(raw).unwrap_or_else(|| UNKNOWN_DATE.to_string())
}

/// Best readable text of a payload, or `None` if nothing qualifies.
///
/// Only the root and its direct children are inspected; text nested deeper
/// (multipart inside multipart) is not found.
pub fn find_body(payload: &BodyPayload) -> Option<String> {
    if let Some(data) = payload.inline_data() {
        return Some(decode_body_data(data));
    }

    if let Some(data) = first_part_data(&payload.parts, ContentKind::PlainText) {
        return Some(decode_body_data(data));
    }

    first_part_data(&payload.parts, ContentKind::Html)
        .map(|data| html_to_text(&decode_body_data(data)))
}

fn first_part_data(parts: &[BodyPayload], kind: ContentKind) -> Option<&str> {
    parts
        .iter()
        .filter(|p| p.kind() == kind)
        .find_map(BodyPayload::inline_data)
}

pub fn extract_body(payload: &BodyPayload) -> String {
    find_body(payload).unwrap_or_else(|| NO_BODY.to_string())
}

pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// Extract every field, recording which ones fell back to a sentinel.
pub fn extract_fields(msg: &RawMessage) -> ExtractedRecord {
    let headers = msg.headers();

    let sender = match find_header(headers, "From") {
        Some(v) => FieldValue::message(v),
        None => FieldValue::fallback(UNKNOWN_SENDER),
    };
    let subject = match find_header(headers, "Subject") {
        Some(v) => FieldValue::message(v),
        None => FieldValue::fallback(NO_SUBJECT),
    };
    let date = match find_header(headers, "Date").and_then(parse_date) {
        Some(d) => FieldValue::message(d),
        None => FieldValue::fallback(UNKNOWN_DATE),
    };
    let preview = match find_body(&msg.payload) {
        Some(body) => FieldValue::message(truncate_chars(&body, PREVIEW_CHARS)),
        None => FieldValue::fallback(NO_BODY),
    };

    if date.is_fallback() || preview.is_fallback() {
        log::debug!(
            "message {}: date fallback={}, body fallback={}",
            msg.id,
            date.is_fallback(),
            preview.is_fallback()
        );
    }

    ExtractedRecord {
        date,
        sender,
        subject,
        preview,
    }
}

pub fn assemble_record(msg: &RawMessage) -> NormalizedRecord {
    extract_fields(msg).into_record()
}
