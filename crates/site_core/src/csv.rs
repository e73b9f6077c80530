//! crates/site_core/src/csv.rs
//!
//! The line format of the analytics log.
//!
//! Every field is written inside double quotes with embedded quotes doubled, so a
//! row stays well-formed whatever the field contains. The reader is quote-aware:
//! commas and newlines inside quotes are data, and `""` inside quotes is a literal
//! quote. Writing then reading a field is lossless.

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::warn;

use crate::domain::{AnalyticsEvent, EventType, UnknownEventType};

/// Column names of the analytics log, in storage order.
pub const HEADER: [&str; 10] = [
    "timestamp",
    "event_type",
    "page_path",
    "section_id",
    "button_id",
    "button_label",
    "ip_address",
    "location",
    "user_agent",
    "referrer",
];

/// Errors turning a parsed row back into an event.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid timestamp '{0}'")]
    Timestamp(String),
    #[error(transparent)]
    EventType(#[from] UnknownEventType),
}

/// The header line, without a line terminator.
pub fn header_line() -> String {
    HEADER.join(",")
}

/// Wraps a value in quotes, doubling any quotes it contains.
pub fn escape_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Formats a timestamp the way it is stored: RFC 3339, milliseconds, `Z` suffix.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Serializes one event as a row, without a line terminator.
pub fn encode_event(event: &AnalyticsEvent) -> String {
    let timestamp = format_timestamp(&event.timestamp);
    let fields: [&str; 10] = [
        &timestamp,
        event.event_type.as_str(),
        &event.page_path,
        &event.section_id,
        &event.button_id,
        &event.button_label,
        &event.ip_address,
        &event.location,
        &event.user_agent,
        &event.referrer,
    ];

    fields
        .iter()
        .map(|value| escape_field(value))
        .collect::<Vec<_>>()
        .join(",")
}

/// Whether `line` opens a row: a quoted RFC 3339 timestamp followed by `,`.
fn starts_record(line: &str) -> bool {
    line.strip_prefix('"')
        .and_then(|rest| rest.split_once("\","))
        .is_some_and(|(timestamp, _)| DateTime::parse_from_rfc3339(timestamp).is_ok())
}

fn has_open_quote(text: &str) -> bool {
    text.matches('"').count() % 2 == 1
}

/// Splits file content into records.
///
/// A line continues the previous record only while that record has an open quote
/// and the line does not itself start a new row. A torn row therefore swallows at
/// most the lines up to the next row start, never the rest of the file. Blank
/// lines between records are dropped and a trailing `\r` is stripped.
pub fn split_records(content: &str) -> Vec<&str> {
    let mut records = Vec::new();
    // (start, end, quote open) of the record being built.
    let mut current: Option<(usize, usize, bool)> = None;
    let mut offset = 0;

    for line in content.split('\n') {
        let start = offset;
        offset += line.len() + 1;
        let text = line.strip_suffix('\r').unwrap_or(line);
        let end = start + text.len();
        let line_open = has_open_quote(text);

        match current {
            Some((record_start, _, true)) if !starts_record(text) => {
                current = Some((record_start, end, !line_open));
            }
            _ => {
                if let Some((s, e, _)) = current.take() {
                    records.push(&content[s..e]);
                }
                if !text.trim().is_empty() {
                    current = Some((start, end, line_open));
                }
            }
        }
    }
    if let Some((s, e, _)) = current {
        records.push(&content[s..e]);
    }
    records
}

/// Splits one record into its unquoted field values.
pub fn parse_line(line: &str) -> Vec<String> {
    let mut values = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => values.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    values.push(current);
    values
}

/// Rebuilds an event from parsed field values. Missing trailing fields read as empty.
pub fn decode_event(fields: &[String]) -> Result<AnalyticsEvent, DecodeError> {
    let field = |index: usize| fields.get(index).cloned().unwrap_or_default();

    let raw_timestamp = field(0);
    let timestamp = DateTime::parse_from_rfc3339(&raw_timestamp)
        .map_err(|_| DecodeError::Timestamp(raw_timestamp.clone()))?
        .with_timezone(&Utc);
    let event_type: EventType = field(1).parse()?;

    Ok(AnalyticsEvent {
        timestamp,
        event_type,
        page_path: field(2),
        section_id: field(3),
        button_id: field(4),
        button_label: field(5),
        ip_address: field(6),
        location: field(7),
        user_agent: field(8),
        referrer: field(9),
    })
}

/// Decodes the newest `limit` events of a whole log, latest first.
///
/// The first record is the header. Recency follows file order; rows that fail to
/// decode, or whose quotes never close, are skipped with a warning.
pub fn recent_events(content: &str, limit: usize) -> Vec<AnalyticsEvent> {
    let events: Vec<AnalyticsEvent> = split_records(content)
        .into_iter()
        .skip(1)
        .filter(|record| {
            let torn = has_open_quote(record);
            if torn {
                warn!("Skipping analytics row with an unterminated quote");
            }
            !torn
        })
        .filter_map(|record| match decode_event(&parse_line(record)) {
            Ok(event) => Some(event),
            Err(e) => {
                warn!("Skipping unreadable analytics row: {}", e);
                None
            }
        })
        .collect();

    let start = events.len().saturating_sub(limit);
    events.into_iter().skip(start).rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event(n: u32, label: &str) -> AnalyticsEvent {
        AnalyticsEvent {
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, n).unwrap(),
            event_type: EventType::ButtonClicked,
            page_path: "/".to_string(),
            section_id: String::new(),
            button_id: format!("button-{}", n),
            button_label: label.to_string(),
            ip_address: "203.0.113.7".to_string(),
            location: "Mexico City, CMX, MX".to_string(),
            user_agent: "Mozilla/5.0".to_string(),
            referrer: String::new(),
        }
    }

    fn log_of(events: &[AnalyticsEvent]) -> String {
        let mut content = header_line();
        content.push('\n');
        for event in events {
            content.push_str(&encode_event(event));
            content.push('\n');
        }
        content
    }

    #[test]
    fn escape_field_doubles_embedded_quotes() {
        assert_eq!(escape_field(r#"He said "go""#), r#""He said ""go""""#);
        assert_eq!(escape_field(""), r#""""#);
    }

    #[test]
    fn parse_line_keeps_commas_inside_quotes() {
        assert_eq!(
            parse_line(r#""a,b","c""d","""#),
            vec!["a,b".to_string(), "c\"d".to_string(), String::new()]
        );
    }

    #[test]
    fn parse_line_accepts_unquoted_header() {
        assert_eq!(parse_line(&header_line()), HEADER.to_vec());
    }

    #[test]
    fn awkward_fields_survive_a_write_and_read() {
        let mut tricky = event(1, r#"He said "go""#);
        tricky.referrer = "https://example.com/?a=1,b=2".to_string();
        tricky.user_agent = "line one\nline two".to_string();

        let events = recent_events(&log_of(&[tricky.clone()]), 10);
        assert_eq!(events, vec![tricky]);
    }

    #[test]
    fn recent_events_returns_tail_in_reverse_append_order() {
        let all: Vec<_> = (0..5).map(|n| event(n, "Contact")).collect();

        let recent = recent_events(&log_of(&all), 2);
        assert_eq!(recent, vec![all[4].clone(), all[3].clone()]);
    }

    #[test]
    fn recent_events_follows_file_order_not_timestamps() {
        let newer = event(9, "newer");
        let older = event(1, "older");

        let recent = recent_events(&log_of(&[newer.clone(), older.clone()]), 10);
        assert_eq!(recent, vec![older, newer]);
    }

    #[test]
    fn header_only_log_has_no_events() {
        assert!(recent_events(&format!("{}\n", header_line()), 500).is_empty());
        assert!(recent_events("", 500).is_empty());
    }

    #[test]
    fn unreadable_rows_are_skipped() {
        let good = event(2, "ok");
        let content = format!(
            "{}\n\"2024-05-01T12:00:00.000Z\",\"unknown\",\"/\"\n\"yesterday\",\"page_entered\",\"/\"\n{}\n",
            header_line(),
            encode_event(&good)
        );

        assert_eq!(recent_events(&content, 10), vec![good]);
    }

    #[test]
    fn short_rows_fill_missing_fields_with_empty_strings() {
        let fields = parse_line(r#""2024-05-01T12:00:00.000Z","page_entered","/about""#);
        let decoded = decode_event(&fields).unwrap();
        assert_eq!(decoded.page_path, "/about");
        assert_eq!(decoded.referrer, "");
    }

    #[test]
    fn torn_row_does_not_hide_later_rows() {
        let first = event(1, "p1");
        let later: Vec<_> = (3..8).map(|n| event(n, &format!("p{}", n))).collect();

        let mut content = format!("{}\n{}\n", header_line(), encode_event(&first));
        content.push_str("\"2024-05-01T12:00:02.000Z\",\"page_en\n");
        for event in &later {
            content.push_str(&encode_event(event));
            content.push('\n');
        }

        let labels: Vec<_> = recent_events(&content, 500)
            .into_iter()
            .map(|e| e.button_label)
            .collect();
        assert_eq!(labels, vec!["p7", "p6", "p5", "p4", "p3", "p1"]);
    }

    #[test]
    fn unterminated_last_row_is_skipped() {
        let good = event(1, "ok");
        let content = format!(
            "{}\n{}\n\"2024-05-01T12:00:09.000Z\",\"page_entered\",\"/la",
            header_line(),
            encode_event(&good)
        );

        assert_eq!(split_records(&content).len(), 3);
        assert_eq!(recent_events(&content, 10), vec![good]);
    }

    #[test]
    fn multi_line_field_is_one_record() {
        let mut multi = event(4, "ok");
        multi.referrer = "a\n\"2024\",b".to_string();
        let content = format!("{}\n{}\n", header_line(), encode_event(&multi));

        assert_eq!(split_records(&content).len(), 2);
        assert_eq!(recent_events(&content, 10), vec![multi]);
    }

    #[test]
    fn crlf_line_endings_are_tolerated() {
        let good = event(3, "ok");
        let content = format!("{}\r\n{}\r\n", header_line(), encode_event(&good));
        assert_eq!(recent_events(&content, 10), vec![good]);
    }
}
