//! ICS event extraction
//!
//! Pulls `VEVENT` blocks out of an iCalendar document and reads a fixed
//! set of properties from each. Extraction never fails and ignores
//! anything it does not recognise, including the surrounding `VCALENDAR`.
//! The `BEGIN:VEVENT`/`END:VEVENT` markers are matched case-sensitively.

use tracing::debug;

use crate::models::EventRecord;

const BEGIN_EVENT: &str = "BEGIN:VEVENT";
const END_EVENT: &str = "END:VEVENT";
const ATTENDEE: &str = "ATTENDEE";

/// Single-valued properties captured from each event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Property {
    Uid,
    Summary,
    Description,
    Location,
    DtStart,
    DtEnd,
    Status,
    Organizer,
}

const SCALAR_PROPERTIES: [Property; 8] = [
    Property::Uid,
    Property::Summary,
    Property::Description,
    Property::Location,
    Property::DtStart,
    Property::DtEnd,
    Property::Status,
    Property::Organizer,
];

impl Property {
    fn name(self) -> &'static str {
        match self {
            Property::Uid => "UID",
            Property::Summary => "SUMMARY",
            Property::Description => "DESCRIPTION",
            Property::Location => "LOCATION",
            Property::DtStart => "DTSTART",
            Property::DtEnd => "DTEND",
            Property::Status => "STATUS",
            Property::Organizer => "ORGANIZER",
        }
    }

    fn lookup(name: &str) -> Option<Self> {
        SCALAR_PROPERTIES
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
    }

    fn slot(self, record: &mut EventRecord) -> &mut Option<String> {
        match self {
            Property::Uid => &mut record.uid,
            Property::Summary => &mut record.summary,
            Property::Description => &mut record.description,
            Property::Location => &mut record.location,
            Property::DtStart => &mut record.dtstart,
            Property::DtEnd => &mut record.dtend,
            Property::Status => &mut record.status,
            Property::Organizer => &mut record.organizer,
        }
    }
}

/// Extract every `BEGIN:VEVENT ... END:VEVENT` block from `document`.
///
/// Records come back in document order. A `BEGIN:VEVENT` with no later
/// `END:VEVENT` ends the scan; earlier records are kept.
pub fn extract_events(document: &str) -> Vec<EventRecord> {
    let events: Vec<EventRecord> = event_spans(document).map(parse_event).collect();
    debug!("Extracted {} events from ICS document", events.len());
    events
}

/// Bodies of the non-overlapping event spans, in order
fn event_spans(document: &str) -> impl Iterator<Item = &str> {
    let mut rest = document;

    std::iter::from_fn(move || {
        let begin = rest.find(BEGIN_EVENT)?;
        let after_begin = &rest[begin + BEGIN_EVENT.len()..];
        let end = after_begin.find(END_EVENT)?;

        let body = &after_begin[..end];
        rest = &after_begin[end + END_EVENT.len()..];
        Some(body)
    })
}

fn parse_event(body: &str) -> EventRecord {
    let mut record = EventRecord::default();
    let unfolded = unfold(body);

    for line in unfolded.split(['\r', '\n']) {
        let Some((name, value)) = split_content_line(line) else {
            continue;
        };

        if name.eq_ignore_ascii_case(ATTENDEE) {
            record.attendees.push(value.to_string());
        } else if let Some(property) = Property::lookup(name) {
            let slot = property.slot(&mut record);
            if slot.is_none() {
                *slot = Some(unescape(value));
            }
        }
    }

    record
}

/// Undo RFC 5545 line folding: a line break followed by one space or tab
/// continues the previous line.
fn unfold(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\r' && c != '\n' {
            out.push(c);
            continue;
        }

        let mut newline = String::from(c);
        if c == '\r' && chars.peek() == Some(&'\n') {
            chars.next();
            newline.push('\n');
        }

        match chars.peek() {
            Some(' ') | Some('\t') => {
                chars.next();
            }
            _ => out.push_str(&newline),
        }
    }

    out
}

/// Split a content line into its property name and trimmed value.
///
/// The name ends at the first `;` or `:`. The value starts after the first
/// `:` not preceded by a backslash; parameter quoting is not interpreted.
fn split_content_line(line: &str) -> Option<(&str, &str)> {
    let name_end = line.find([';', ':'])?;
    let name = &line[..name_end];
    if name.is_empty() {
        return None;
    }

    let separator = find_value_separator(line, name_end)?;
    Some((name, line[separator + 1..].trim()))
}

fn find_value_separator(line: &str, from: usize) -> Option<usize> {
    let mut escaped = false;

    for (i, c) in line[from..].char_indices() {
        if c == ':' && !escaped {
            return Some(from + i);
        }
        escaped = c == '\\' && !escaped;
    }

    None
}

/// `\,` becomes `,`, then `\n` becomes a newline. Nothing else is decoded.
fn unescape(value: &str) -> String {
    value.replace("\\,", ",").replace("\\n", "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_events() {
        assert!(extract_events("").is_empty());
        assert!(extract_events("BEGIN:VCALENDAR\nVERSION:2.0\nEND:VCALENDAR\n").is_empty());
    }

    #[test]
    fn test_single_property() {
        let events = extract_events("BEGIN:VEVENT\nSUMMARY:Team Sync\nEND:VEVENT");
        assert_eq!(
            events,
            vec![EventRecord {
                summary: Some("Team Sync".to_string()),
                ..Default::default()
            }]
        );
    }

    #[test]
    fn test_unescape_comma_and_newline() {
        let events =
            extract_events("BEGIN:VEVENT\nDESCRIPTION:Lunch\\,with\\,Bob\\nBring notes\nEND:VEVENT");
        assert_eq!(
            events[0].description.as_deref(),
            Some("Lunch,with,Bob\nBring notes")
        );
    }

    #[test]
    fn test_other_escapes_untouched() {
        let events = extract_events("BEGIN:VEVENT\nSUMMARY:a\\;b\\\\c\\Nd\nEND:VEVENT");
        assert_eq!(events[0].summary.as_deref(), Some("a\\;b\\\\c\\Nd"));
    }

    #[test]
    fn test_attendees_in_order_without_unescaping() {
        let doc = "BEGIN:VEVENT\n\
                   ATTENDEE:mailto:a@example.com\n\
                   ATTENDEE;CN=Bob:mailto:b@example.com\n\
                   ATTENDEE: mailto:c\\,d@example.com \n\
                   END:VEVENT";
        let events = extract_events(doc);
        assert_eq!(
            events[0].attendees,
            vec![
                "mailto:a@example.com",
                "mailto:b@example.com",
                "mailto:c\\,d@example.com",
            ]
        );
    }

    #[test]
    fn test_duplicate_attendees_kept() {
        let doc = "BEGIN:VEVENT\nATTENDEE:mailto:a@x\nATTENDEE:mailto:a@x\nEND:VEVENT";
        assert_eq!(extract_events(doc)[0].attendees.len(), 2);
    }

    #[test]
    fn test_unterminated_span() {
        assert!(extract_events("BEGIN:VEVENT\nSUMMARY:Orphan").is_empty());

        let doc = "BEGIN:VEVENT\nSUMMARY:First\nEND:VEVENT\nBEGIN:VEVENT\nSUMMARY:Orphan";
        let events = extract_events(doc);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].summary.as_deref(), Some("First"));
    }

    #[test]
    fn test_first_occurrence_wins() {
        let doc = "BEGIN:VEVENT\nSUMMARY:First\nSUMMARY:Second\nEND:VEVENT";
        assert_eq!(extract_events(doc)[0].summary.as_deref(), Some("First"));
    }

    #[test]
    fn test_case_insensitive_names_and_params() {
        let doc = "BEGIN:VEVENT\r\n\
                   summary:lower\r\n\
                   DTSTART;TZID=Asia/Bangkok:20250602T090000\r\n\
                   DtEnd;VALUE=DATE:20250603\r\n\
                   END:VEVENT\r\n";
        let event = &extract_events(doc)[0];
        assert_eq!(event.summary.as_deref(), Some("lower"));
        assert_eq!(event.dtstart.as_deref(), Some("20250602T090000"));
        assert_eq!(event.dtend.as_deref(), Some("20250603"));
    }

    #[test]
    fn test_name_must_be_exact() {
        let doc = "BEGIN:VEVENT\nSUMMARYX:nope\nSUMMARY :spaced\nX-SUMMARY:nope\nEND:VEVENT";
        assert_eq!(extract_events(doc)[0].summary, None);
    }

    #[test]
    fn test_value_starts_after_first_colon() {
        let doc = "BEGIN:VEVENT\n\
                   ORGANIZER;CN=\"x:mailto:a\n\
                   SUMMARY:ok\n\
                   END:VEVENT";
        let event = &extract_events(doc)[0];
        assert_eq!(event.organizer.as_deref(), Some("mailto:a"));
        assert_eq!(event.summary.as_deref(), Some("ok"));
    }

    #[test]
    fn test_quotes_do_not_hide_colons() {
        let doc = "BEGIN:VEVENT\n\
                   ORGANIZER;CN=\"Dr. A: Smith\":mailto:a@example.com\n\
                   ATTENDEE;DELEGATED-FROM=\"mailto:b@example.com\":mailto:c@example.com\n\
                   END:VEVENT";
        let event = &extract_events(doc)[0];
        assert_eq!(event.organizer.as_deref(), Some("Smith\":mailto:a@example.com"));
        assert_eq!(event.attendees, vec!["b@example.com\":mailto:c@example.com"]);
    }

    #[test]
    fn test_escaped_colon_in_parameter() {
        let doc = "BEGIN:VEVENT\nLOCATION;ALTREP=a\\:b:Room 2\nEND:VEVENT";
        assert_eq!(extract_events(doc)[0].location.as_deref(), Some("Room 2"));
    }

    #[test]
    fn test_markers_are_case_sensitive() {
        assert!(extract_events("begin:vevent\nSUMMARY:lower\nend:vevent").is_empty());
        assert!(extract_events("Begin:VEvent\nSUMMARY:mixed\nEnd:VEvent").is_empty());

        let doc = "begin:vevent\nSUMMARY:skip\nBEGIN:VEVENT\nSUMMARY:kept\nEND:VEVENT";
        let events = extract_events(doc);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].summary.as_deref(), Some("kept"));
    }

    #[test]
    fn test_folded_lines() {
        let doc = "BEGIN:VEVENT\r\n\
                   DESCRIPTION:This is a long\r\n  description\r\n\t that wraps\r\n\
                   LOCATION:Room 1\r\n\
                   END:VEVENT\r\n";
        let event = &extract_events(doc)[0];
        assert_eq!(
            event.description.as_deref(),
            Some("This is a long description that wraps")
        );
        assert_eq!(event.location.as_deref(), Some("Room 1"));
    }

    #[test]
    fn test_empty_value() {
        let events = extract_events("BEGIN:VEVENT\nLOCATION:\nEND:VEVENT");
        assert_eq!(events[0].location.as_deref(), Some(""));
    }

    #[test]
    fn test_two_event_document() {
        let doc = "BEGIN:VCALENDAR\r\n\
                   VERSION:2.0\r\n\
                   BEGIN:VEVENT\r\n\
                   UID:event-1@example.com\r\n\
                   SUMMARY:Design review\r\n\
                   DTSTART:20250602T020000Z\r\n\
                   DTEND:20250602T030000Z\r\n\
                   STATUS:CONFIRMED\r\n\
                   END:VEVENT\r\n\
                   BEGIN:VEVENT\r\n\
                   UID:event-2@example.com\r\n\
                   SUMMARY:Planning\\, Q3\r\n\
                   DTSTART:20250603T070000Z\r\n\
                   DTEND:20250603T080000Z\r\n\
                   ORGANIZER;CN=Alice:mailto:alice@example.com\r\n\
                   ATTENDEE;CN=Bob;ROLE=REQ-PARTICIPANT:mailto:bob@example.com\r\n\
                   ATTENDEE;CN=Carol:mailto:carol@example.com\r\n\
                   END:VEVENT\r\n\
                   END:VCALENDAR\r\n";

        let events = extract_events(doc);
        assert_eq!(events.len(), 2);

        assert_eq!(events[0].uid.as_deref(), Some("event-1@example.com"));
        assert_eq!(events[0].dtstart.as_deref(), Some("20250602T020000Z"));
        assert_eq!(events[0].status.as_deref(), Some("CONFIRMED"));
        assert!(events[0].attendees.is_empty());

        assert_eq!(events[1].summary.as_deref(), Some("Planning, Q3"));
        assert_eq!(events[1].organizer.as_deref(), Some("mailto:alice@example.com"));
        assert_eq!(
            events[1].attendees,
            vec!["mailto:bob@example.com", "mailto:carol@example.com"]
        );
        assert_eq!(events[1].description, None);
    }

    #[test]
    fn test_span_count_matches_pairs() {
        let doc = (0..5)
            .map(|i| format!("BEGIN:VEVENT\nUID:{i}\nEND:VEVENT\n"))
            .collect::<String>();
        let uids: Vec<_> = extract_events(&doc)
            .into_iter()
            .filter_map(|e| e.uid)
            .collect();
        assert_eq!(uids, vec!["0", "1", "2", "3", "4"]);
    }

    #[test]
    fn test_events_json_shape() {
        let events = extract_events("BEGIN:VEVENT\nUID:1\nEND:VEVENT");
        let json = serde_json::to_value(&events).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "uid": "1",
                "summary": null,
                "description": null,
                "location": null,
                "dtstart": null,
                "dtend": null,
                "status": null,
                "organizer": null,
                "attendees": []
            }])
        );
    }
}
