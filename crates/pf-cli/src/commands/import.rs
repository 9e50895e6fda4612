//! Import command for ingesting page views into the local `SQLite` store.

use std::io::BufRead;

use anyhow::{Context, Result};
use pf_core::{Event, RawEvent};
use pf_db::Database;

/// Reads JSONL page views from `reader` and stores them.
///
/// Every line is validated before anything is written, so a bad line leaves
/// the store untouched.
pub fn run<R: BufRead>(reader: R, db: &mut Database) -> Result<usize> {
    let events = parse_events(reader)?;
    let inserted = db.insert_events(&events)?;
    tracing::info!(inserted, "imported page views");
    Ok(inserted)
}

fn parse_events<R: BufRead>(reader: R) -> Result<Vec<Event>> {
    let mut events = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", idx + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let raw: RawEvent = serde_json::from_str(trimmed)
            .with_context(|| format!("invalid JSON on line {}", idx + 1))?;
        let event = raw
            .validate(events.len())
            .with_context(|| format!("invalid event on line {}", idx + 1))?;
        events.push(event);
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    #[test]
    fn parse_events_skips_blank_lines() {
        let input = r#"{"session_id":"userA","screen_id":"home","timestamp":"2025-01-01T00:00:00Z"}

{"session_id":"userA","screen_id":"list","timestamp":"2025-01-01T00:00:05"}
"#;
        let events = parse_events(Cursor::new(input)).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].screen_id.as_str(), "list");
    }

    #[test]
    fn parse_events_rejects_missing_screen() {
        let input = r#"{"session_id":"userA","screen_id":"home","timestamp":"2025-01-01T00:00:00Z"}
{"session_id":"userA","timestamp":"2025-01-01T00:00:05Z"}"#;
        let err = parse_events(Cursor::new(input)).unwrap_err();
        assert!(err.to_string().contains("invalid event on line 2"));
    }

    #[test]
    fn import_is_atomic_on_bad_timestamp() {
        let input = r#"{"session_id":"userA","screen_id":"home","timestamp":"2025-01-01T00:00:00Z"}
{"session_id":"userA","screen_id":"list","timestamp":"later"}"#;
        let mut db = Database::open_in_memory().unwrap();
        assert!(run(Cursor::new(input), &mut db).is_err());
        assert_eq!(db.event_count().unwrap(), 0);
    }

    #[test]
    fn import_stores_all_lines() {
        let input = r#"{"session_id":"userA","screen_id":"home","timestamp":"2025-01-01T00:00:00Z"}
{"session_id":"userB","screen_id":"home","timestamp":"2025-01-01T00:00:01Z"}"#;
        let mut db = Database::open_in_memory().unwrap();
        let inserted = run(Cursor::new(input), &mut db).unwrap();
        assert_eq!(inserted, 2);
        assert_eq!(db.event_count().unwrap(), 2);
    }
}
