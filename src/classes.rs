use crate::db;
use crate::error::AppError;
use crate::model::{Class, Role, Session};
use rusqlite::{Connection, OptionalExtension};
use uuid::Uuid;

pub fn create_class(conn: &Connection, session: &Session, name: &str) -> Result<Class, AppError> {
    session.require(Role::Teacher)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::bad_params("name must not be empty"));
    }

    let class = Class {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        created_at: db::now(),
    };
    conn.execute(
        "INSERT INTO classes(id, name, created_at) VALUES(?, ?, ?)",
        (&class.id, &class.name, &class.created_at),
    )?;

    tracing::info!(class_id = %class.id, by = %session.user_id, "created class");
    Ok(class)
}

pub fn list_classes(conn: &Connection) -> Result<Vec<Class>, AppError> {
    let mut stmt = conn.prepare("SELECT id, name, created_at FROM classes ORDER BY name, rowid")?;
    let classes = stmt
        .query_map([], |row| {
            Ok(Class {
                id: row.get(0)?,
                name: row.get(1)?,
                created_at: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(classes)
}

pub fn class_exists(conn: &Connection, class_id: &str) -> Result<bool, AppError> {
    let hit: Option<i64> = conn
        .query_row("SELECT 1 FROM classes WHERE id = ?", [class_id], |r| r.get(0))
        .optional()?;
    Ok(hit.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(role: Role) -> Session {
        Session {
            user_id: "u1".into(),
            name: "T".into(),
            email: "t@school.test".into(),
            role,
            class_id: None,
        }
    }

    #[test]
    fn only_teachers_create_classes() {
        let conn = db::open_in_memory().expect("db");
        let e = create_class(&conn, &session(Role::Student), "9A").expect_err("student");
        assert!(matches!(e, AppError::Unauthorized(_)));
        let e = create_class(&conn, &session(Role::Teacher), "   ").expect_err("blank");
        assert!(matches!(e, AppError::Validation(_)));
        assert!(list_classes(&conn).expect("list").is_empty());
    }

    #[test]
    fn classes_list_by_name() {
        let conn = db::open_in_memory().expect("db");
        let teacher = session(Role::Teacher);
        let b = create_class(&conn, &teacher, "9B").expect("9B");
        create_class(&conn, &teacher, "9A").expect("9A");

        let names: Vec<String> = list_classes(&conn)
            .expect("list")
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["9A", "9B"]);
        assert!(class_exists(&conn, &b.id).expect("exists"));
        assert!(!class_exists(&conn, "missing").expect("missing"));
    }
}
