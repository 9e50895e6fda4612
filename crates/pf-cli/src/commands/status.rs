//! Status command for showing stored activity per session.

use std::io::Write;

use anyhow::Result;
use pf_core::{format_timestamp, parse_timestamp};
use pf_db::Database;

use crate::Config;

pub fn run<W: Write>(writer: &mut W, db: &Database, config: &Config) -> Result<()> {
    let sessions = db.session_summaries()?;

    writeln!(writer, "Screen flow status")?;
    writeln!(writer, "Database: {}", config.database_path.display())?;

    if sessions.is_empty() {
        writeln!(writer, "No events recorded.")?;
        return Ok(());
    }

    writeln!(writer, "Events: {}", db.event_count()?)?;
    writeln!(writer, "Sessions:")?;
    for session in sessions {
        let last_event = parse_timestamp(&session.last_event)
            .map_or_else(|_| session.last_event.clone(), format_timestamp);
        writeln!(
            writer,
            "- {}: {} events, last at {last_event}",
            session.session_id, session.event_count
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{TimeZone, Utc};
    use pf_core::{Event, ScreenId, SessionId};

    use insta::assert_snapshot;

    fn event(session: &str, screen: &str, secs: u32) -> Event {
        Event::new(
            SessionId::new(session).unwrap(),
            ScreenId::new(screen).unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, secs).unwrap(),
        )
    }

    #[test]
    fn status_command_outputs_sessions() {
        let temp = tempfile::tempdir().unwrap();
        let db_path = temp.path().join("pf.db");
        let mut db = Database::open(&db_path).unwrap();
        db.insert_events(&[
            event("userB", "home", 3),
            event("userA", "home", 0),
            event("userA", "list", 9),
        ])
        .unwrap();

        let config = Config {
            database_path: db_path.clone(),
            default_dwell_secs: 30.0,
        };
        let mut output = Vec::new();
        run(&mut output, &db, &config).unwrap();

        let output = String::from_utf8(output).unwrap();
        let output = output.replace(&db_path.display().to_string(), "[TEMP]/pf.db");
        assert_snapshot!(output, @r"
        Screen flow status
        Database: [TEMP]/pf.db
        Events: 3
        Sessions:
        - userA: 2 events, last at 2025-01-01T00:00:09.000Z
        - userB: 1 events, last at 2025-01-01T00:00:03.000Z
        ");
    }

    #[test]
    fn status_command_on_empty_database() {
        let db = Database::open_in_memory().unwrap();
        let config = Config {
            database_path: "pf.db".into(),
            default_dwell_secs: 30.0,
        };
        let mut output = Vec::new();
        run(&mut output, &db, &config).unwrap();
        assert!(String::from_utf8(output).unwrap().ends_with("No events recorded.\n"));
    }
}
