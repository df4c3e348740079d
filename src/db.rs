use anyhow::Context;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Connection;
use std::path::Path;

pub fn open_db(path: &Path) -> anyhow::Result<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("failed to open database {}", path.to_string_lossy()))?;
    init_schema(&conn)?;
    Ok(conn)
}

#[cfg(test)]
pub fn open_in_memory() -> anyhow::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    init_schema(&conn)?;
    Ok(conn)
}

fn init_schema(conn: &Connection) -> anyhow::Result<()> {
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS classes(
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS users(
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL CHECK(role IN ('student', 'teacher')),
            class_id TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY(class_id) REFERENCES classes(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_users_class ON users(class_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS topics(
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT,
            class_id TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY(class_id) REFERENCES classes(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_topics_class ON topics(class_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS essays(
            id TEXT PRIMARY KEY,
            author_id TEXT NOT NULL,
            topic_id TEXT NOT NULL,
            text TEXT NOT NULL,
            score REAL,
            feedback TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY(author_id) REFERENCES users(id),
            FOREIGN KEY(topic_id) REFERENCES topics(id)
        )",
        [],
    )?;
    // Databases created before grading timestamps existed lack this column.
    ensure_essays_graded_at(conn)?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_essays_author ON essays(author_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_essays_topic ON essays(topic_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS sessions(
            token TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            created_at TEXT NOT NULL,
            expires_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES users(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_sessions_expires ON sessions(expires_at)",
        [],
    )?;

    Ok(())
}

fn ensure_essays_graded_at(conn: &Connection) -> anyhow::Result<()> {
    if table_has_column(conn, "essays", "graded_at")? {
        return Ok(());
    }
    conn.execute("ALTER TABLE essays ADD COLUMN graded_at TEXT", [])?;
    // Anything already scored counts as graded at submission time.
    conn.execute(
        "UPDATE essays SET graded_at = created_at WHERE score IS NOT NULL",
        [],
    )?;
    Ok(())
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> anyhow::Result<bool> {
    let sql = format!("PRAGMA table_info({})", table);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Stored timestamps share one fixed-width UTC format so they sort as text.
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn now() -> String {
    timestamp(Utc::now())
}

pub fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(f, _)
            if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_is_idempotent() {
        let conn = open_in_memory().expect("open");
        init_schema(&conn).expect("second init");
        assert!(table_has_column(&conn, "essays", "graded_at").expect("columns"));
    }

    #[test]
    fn graded_at_migration_backfills_scored_rows() {
        let conn = Connection::open_in_memory().expect("open");
        conn.execute_batch(
            "CREATE TABLE essays(
                id TEXT PRIMARY KEY,
                author_id TEXT NOT NULL,
                topic_id TEXT NOT NULL,
                text TEXT NOT NULL,
                score REAL,
                feedback TEXT,
                created_at TEXT NOT NULL
            );
            INSERT INTO essays VALUES('e1', 'u', 't', 'graded', 7.0, 'ok', '2024-01-01T00:00:00.000Z');
            INSERT INTO essays VALUES('e2', 'u', 't', 'pending', NULL, NULL, '2024-01-02T00:00:00.000Z');",
        )
        .expect("seed");

        init_schema(&conn).expect("migrate");

        let graded: Option<String> = conn
            .query_row("SELECT graded_at FROM essays WHERE id = 'e1'", [], |r| r.get(0))
            .expect("e1");
        let pending: Option<String> = conn
            .query_row("SELECT graded_at FROM essays WHERE id = 'e2'", [], |r| r.get(0))
            .expect("e2");
        assert_eq!(graded.as_deref(), Some("2024-01-01T00:00:00.000Z"));
        assert_eq!(pending, None);
    }

    #[test]
    fn timestamps_sort_as_text() {
        let a = timestamp(DateTime::from_timestamp(1_700_000_000, 5_000_000).expect("a"));
        let b = timestamp(DateTime::from_timestamp(1_700_000_001, 0).expect("b"));
        assert_eq!(a, "2023-11-14T22:13:20.005Z");
        assert!(a < b);
    }

    #[test]
    fn duplicate_email_is_a_unique_violation() {
        let conn = open_in_memory().expect("open");
        let insert = "INSERT INTO users(id, name, email, password_hash, role, created_at)
                      VALUES(?, 'x', 'a@b.c', 'h', 'student', '2024-01-01T00:00:00.000Z')";
        conn.execute(insert, ["u1"]).expect("first");
        let e = conn.execute(insert, ["u2"]).expect_err("second");
        assert!(is_unique_violation(&e));
    }
}
