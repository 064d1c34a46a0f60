//! Delete command.

use std::io::Write;

use anyhow::Result;
use mt_core::SessionStore;
use mt_db::Database;

use super::util::resolve_session;

pub fn run<W: Write>(writer: &mut W, db: &mut Database, id: &str) -> Result<()> {
    let sessions = db.sessions()?;
    let target = resolve_session(&sessions, id)?.id().clone();
    if db.delete_session(&target)? {
        writeln!(writer, "Deleted session {}", target.short(8))?;
    } else {
        writeln!(writer, "Session {} was already gone", target.short(8))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::util::testing::completed;
    use mt_core::ActivityType;

    #[test]
    fn deletes_by_prefix() {
        let mut db = Database::open_in_memory().unwrap();
        let keep = completed(
            ActivityType::Creating,
            "",
            "2025-01-29T10:00:00Z",
            "2025-01-29T11:00:00Z",
        );
        let remove = completed(
            ActivityType::Consuming,
            "",
            "2025-01-29T12:00:00Z",
            "2025-01-29T13:00:00Z",
        );
        db.insert(&keep).unwrap();
        db.insert(&remove).unwrap();
        let mut out = Vec::new();

        run(&mut out, &mut db, remove.id().as_str()).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            format!("Deleted session {}\n", remove.id().short(8))
        );
        assert_eq!(db.sessions().unwrap(), vec![keep]);
    }

    #[test]
    fn unknown_id_fails() {
        let mut db = Database::open_in_memory().unwrap();
        assert!(run(&mut Vec::new(), &mut db, "nope").is_err());
    }
}
