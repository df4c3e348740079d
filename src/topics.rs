//! Writing prompts. Teachers create them; students only see the ones for
//! their own class plus any topic that isn't tied to a class.

use crate::classes;
use crate::db;
use crate::error::AppError;
use crate::model::{Role, Session, Topic};
use crate::params::{optional_str, required_str};
use rusqlite::{Connection, OptionalExtension, Row};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct NewTopic {
    pub title: String,
    pub description: Option<String>,
    pub class_id: Option<String>,
}

impl NewTopic {
    pub fn from_params(params: &Value) -> Result<Self, AppError> {
        Ok(Self {
            title: required_str(params, "title")?,
            description: optional_str(params, "description")?,
            class_id: optional_str(params, "class_id")?,
        })
    }
}

fn topic_from_row(row: &Row) -> rusqlite::Result<Topic> {
    Ok(Topic {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        class_id: row.get(3)?,
        created_at: row.get(4)?,
    })
}

pub fn create_topic(conn: &Connection, session: &Session, new: &NewTopic) -> Result<Topic, AppError> {
    session.require(Role::Teacher)?;
    if let Some(cid) = &new.class_id {
        if !classes::class_exists(conn, cid)? {
            return Err(AppError::bad_params(format!("unknown class_id {cid}")));
        }
    }

    let topic = Topic {
        id: Uuid::new_v4().to_string(),
        title: new.title.clone(),
        description: new.description.clone(),
        class_id: new.class_id.clone(),
        created_at: db::now(),
    };
    conn.execute(
        "INSERT INTO topics(id, title, description, class_id, created_at) VALUES(?, ?, ?, ?, ?)",
        (
            &topic.id,
            &topic.title,
            &topic.description,
            &topic.class_id,
            &topic.created_at,
        ),
    )?;

    tracing::info!(topic_id = %topic.id, by = %session.user_id, "created topic");
    Ok(topic)
}

pub fn list_topics(conn: &Connection, session: &Session) -> Result<Vec<Topic>, AppError> {
    let topics = match session.role {
        Role::Teacher => {
            let mut stmt = conn.prepare(
                "SELECT id, title, description, class_id, created_at
                 FROM topics
                 ORDER BY created_at, rowid",
            )?;
            let rows = stmt.query_map([], topic_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()?
        }
        Role::Student => {
            // `class_id = NULL` never matches, so a student without a class
            // falls through to the shared topics only.
            let mut stmt = conn.prepare(
                "SELECT id, title, description, class_id, created_at
                 FROM topics
                 WHERE class_id IS NULL OR class_id = ?
                 ORDER BY created_at, rowid",
            )?;
            let rows = stmt.query_map([&session.class_id], topic_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()?
        }
    };
    Ok(topics)
}

/// Looks up a topic the session is allowed to see.
pub fn visible_topic(
    conn: &Connection,
    session: &Session,
    topic_id: &str,
) -> Result<Option<Topic>, AppError> {
    let topic = conn
        .query_row(
            "SELECT id, title, description, class_id, created_at FROM topics WHERE id = ?",
            [topic_id],
            topic_from_row,
        )
        .optional()?;
    Ok(topic.filter(|t| match session.role {
        Role::Teacher => true,
        Role::Student => t.class_id.is_none() || t.class_id == session.class_id,
    }))
}
