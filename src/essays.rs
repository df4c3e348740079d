//! Essay submission, listing and grading.
//!
//! An essay starts out `submitted` with no score or feedback. A teacher's
//! grade sets both and moves it to `graded`; grading again simply overwrites
//! the previous grade.

use crate::db;
use crate::error::AppError;
use crate::model::{Essay, EssayStatus, Role, Session};
use crate::params::{optional_str, required_f64, required_str};
use crate::topics;
use rusqlite::{Connection, OptionalExtension, Row};
use serde_json::Value;
use uuid::Uuid;

/// Five digits with two decimals, as a `NUMERIC(5,2)` column holds.
pub const MAX_SCORE: f64 = 999.99;

const ESSAY_SELECT: &str = "SELECT e.id, e.topic_id, t.title, e.author_id, u.name,
        e.text, e.score, e.feedback, e.created_at, e.graded_at
     FROM essays e
     JOIN topics t ON t.id = e.topic_id
     JOIN users u ON u.id = e.author_id";

#[derive(Debug, Clone)]
pub struct Submission {
    pub topic_id: String,
    pub text: String,
}

impl Submission {
    pub fn from_params(params: &Value) -> Result<Self, AppError> {
        let topic_id = required_str(params, "topic_id")?;
        // Keep the essay exactly as written; only reject an empty one.
        let text = match params.get("text") {
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            Some(Value::String(_)) | None | Some(Value::Null) => {
                return Err(AppError::bad_params("missing text"))
            }
            Some(_) => return Err(AppError::bad_params("text must be a string")),
        };
        Ok(Self { topic_id, text })
    }
}

#[derive(Debug, Clone)]
pub struct Grade {
    pub score: f64,
    pub feedback: Option<String>,
}

impl Grade {
    pub fn from_params(params: &Value) -> Result<Self, AppError> {
        let score = required_f64(params, "score")?;
        if !score.is_finite() || !(0.0..=MAX_SCORE).contains(&score) {
            return Err(AppError::bad_params(format!(
                "score must be between 0 and {MAX_SCORE}"
            )));
        }
        Ok(Self {
            score: (score * 100.0).round() / 100.0,
            feedback: optional_str(params, "feedback")?,
        })
    }
}

fn essay_from_row(row: &Row) -> rusqlite::Result<Essay> {
    let score: Option<f64> = row.get(6)?;
    Ok(Essay {
        id: row.get(0)?,
        topic_id: row.get(1)?,
        topic_title: row.get(2)?,
        author_id: row.get(3)?,
        author_name: row.get(4)?,
        text: row.get(5)?,
        score,
        feedback: row.get(7)?,
        status: if score.is_some() {
            EssayStatus::Graded
        } else {
            EssayStatus::Submitted
        },
        created_at: row.get(8)?,
        graded_at: row.get(9)?,
    })
}

pub fn submit_essay(
    conn: &Connection,
    session: &Session,
    submission: &Submission,
) -> Result<Essay, AppError> {
    session.require(Role::Student)?;
    if topics::visible_topic(conn, session, &submission.topic_id)?.is_none() {
        return Err(AppError::bad_params(format!(
            "unknown topic_id {}",
            submission.topic_id
        )));
    }

    let id = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO essays(id, author_id, topic_id, text, created_at) VALUES(?, ?, ?, ?, ?)",
        (
            &id,
            &session.user_id,
            &submission.topic_id,
            &submission.text,
            db::now(),
        ),
    )?;
    tracing::info!(essay_id = %id, topic_id = %submission.topic_id, author = %session.user_id, "essay submitted");

    find_essay(conn, &id)?
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("essay {id} vanished after insert")))
}

pub fn list_essays(conn: &Connection, session: &Session) -> Result<Vec<Essay>, AppError> {
    let essays = match session.role {
        Role::Teacher => {
            let sql = format!("{ESSAY_SELECT} ORDER BY e.created_at, e.rowid");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([], essay_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()?
        }
        Role::Student => {
            let sql = format!("{ESSAY_SELECT} WHERE e.author_id = ? ORDER BY e.created_at, e.rowid");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([&session.user_id], essay_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()?
        }
    };
    Ok(essays)
}

pub fn grade_essay(
    conn: &Connection,
    session: &Session,
    essay_id: &str,
    grade: &Grade,
) -> Result<Essay, AppError> {
    session.require(Role::Teacher)?;

    let n = conn.execute(
        "UPDATE essays SET score = ?, feedback = ?, graded_at = ? WHERE id = ?",
        (grade.score, &grade.feedback, db::now(), essay_id),
    )?;
    if n == 0 {
        return Err(AppError::NotFound(format!("essay {essay_id} not found")));
    }
    tracing::info!(essay_id = %essay_id, score = grade.score, by = %session.user_id, "essay graded");

    find_essay(conn, essay_id)?
        .ok_or_else(|| AppError::NotFound(format!("essay {essay_id} not found")))
}

fn find_essay(conn: &Connection, essay_id: &str) -> Result<Option<Essay>, AppError> {
    let sql = format!("{ESSAY_SELECT} WHERE e.id = ?");
    let essay = conn
        .query_row(&sql, [essay_id], essay_from_row)
        .optional()?;
    Ok(essay)
}
