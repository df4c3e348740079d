//! Registration, credential checks and server-side sessions.

use crate::classes;
use crate::db;
use crate::error::AppError;
use crate::model::{Role, Session, User};
use crate::params::{optional_str, required_str};
use crate::password;
use chrono::{Duration, Utc};
use rusqlite::{Connection, OptionalExtension};
use serde_json::Value;
use uuid::Uuid;

/// A parsed sign-up. The password is hashed while parsing, so callers do the
/// slow part before they take the database lock.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub class_id: Option<String>,
}

impl Registration {
    pub fn from_params(params: &Value) -> Result<Self, AppError> {
        let name = required_str(params, "name")?;
        let email = normalize_email(&required_str(params, "email")?)?;
        // Passwords are taken verbatim; only emptiness is rejected.
        let password = match params.get("password").and_then(|v| v.as_str()) {
            Some(p) if !p.is_empty() => p,
            _ => return Err(AppError::bad_params("missing password")),
        };
        let role: Role = required_str(params, "role")?.parse()?;
        let class_id = optional_str(params, "class_id")?;
        Ok(Self {
            name,
            email,
            password_hash: password::hash_password(password)?,
            role,
            class_id,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn from_params(params: &Value) -> Result<Self, AppError> {
        let email = required_str(params, "email")?.to_ascii_lowercase();
        let password = match params.get("password").and_then(|v| v.as_str()) {
            Some(p) => p.to_string(),
            None => return Err(AppError::bad_params("missing password")),
        };
        Ok(Self { email, password })
    }
}

fn normalize_email(raw: &str) -> Result<String, AppError> {
    let email = raw.trim().to_ascii_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(AppError::bad_params(format!("{raw:?} is not an email address"))),
    }
}

pub fn register(conn: &Connection, reg: &Registration) -> Result<User, AppError> {
    // Only students belong to a class.
    let class_id = match reg.role {
        Role::Student => reg.class_id.clone(),
        Role::Teacher => None,
    };

    let tx = conn.unchecked_transaction()?;

    let taken: Option<i64> = tx
        .query_row("SELECT 1 FROM users WHERE email = ?", [&reg.email], |r| {
            r.get(0)
        })
        .optional()?;
    if taken.is_some() {
        return Err(AppError::DuplicateEmail(reg.email.clone()));
    }

    if let Some(cid) = &class_id {
        if !classes::class_exists(&tx, cid)? {
            return Err(AppError::bad_params(format!("unknown class_id {cid}")));
        }
    }

    let user = User {
        id: Uuid::new_v4().to_string(),
        name: reg.name.clone(),
        email: reg.email.clone(),
        role: reg.role,
        class_id,
        created_at: db::now(),
    };
    tx.execute(
        "INSERT INTO users(id, name, email, password_hash, role, class_id, created_at)
         VALUES(?, ?, ?, ?, ?, ?, ?)",
        (
            &user.id,
            &user.name,
            &user.email,
            &reg.password_hash,
            user.role.as_str(),
            &user.class_id,
            &user.created_at,
        ),
    )
    .map_err(|e| {
        if db::is_unique_violation(&e) {
            AppError::DuplicateEmail(user.email.clone())
        } else {
            AppError::Db(e)
        }
    })?;
    tx.commit()?;

    tracing::info!(user_id = %user.id, role = %user.role, "registered user");
    Ok(user)
}

/// A stored user as found by email, before the password is checked.
pub struct Account {
    session: Session,
    password_hash: String,
}

pub fn find_account(conn: &Connection, email: &str) -> Result<Option<Account>, AppError> {
    let row = conn
        .query_row(
            "SELECT id, name, email, password_hash, role, class_id FROM users WHERE email = ?",
            [email],
            |r| {
                Ok((
                    r.get::<_, String>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, String>(2)?,
                    r.get::<_, String>(3)?,
                    r.get::<_, String>(4)?,
                    r.get::<_, Option<String>>(5)?,
                ))
            },
        )
        .optional()?;

    let Some((user_id, name, email, password_hash, role, class_id)) = row else {
        return Ok(None);
    };
    Ok(Some(Account {
        session: Session {
            user_id,
            name,
            email,
            role: role.parse()?,
            class_id,
        },
        password_hash,
    }))
}

/// Unknown email and wrong password fail the same way. Needs no connection,
/// so it runs outside the database lock.
pub fn authenticate(account: Option<Account>, password: &str) -> Result<Session, AppError> {
    let Some(account) = account else {
        tracing::debug!("login for unknown email");
        return Err(AppError::InvalidCredentials);
    };
    if !password::verify_password(password, &account.password_hash) {
        tracing::debug!(user_id = %account.session.user_id, "login with wrong password");
        return Err(AppError::InvalidCredentials);
    }
    Ok(account.session)
}

/// Opens a session lasting `ttl` and returns its token. Expired sessions are
/// purged on the way.
pub fn open_session(
    conn: &Connection,
    session: &Session,
    ttl: Duration,
) -> Result<String, AppError> {
    let now = Utc::now();
    let created_at = db::timestamp(now);
    conn.execute("DELETE FROM sessions WHERE expires_at <= ?", [&created_at])?;

    let token = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO sessions(token, user_id, created_at, expires_at) VALUES(?, ?, ?, ?)",
        (
            &token,
            &session.user_id,
            &created_at,
            db::timestamp(now + ttl),
        ),
    )?;

    tracing::info!(user_id = %session.user_id, role = %session.role, "session opened");
    Ok(token)
}

/// Ends the session behind `token`, if any. Never fails for a missing or
/// already-expired token.
pub fn logout(conn: &Connection, token: Option<&str>) -> Result<(), AppError> {
    if let Some(token) = token {
        let n = conn.execute("DELETE FROM sessions WHERE token = ?", [token])?;
        if n > 0 {
            tracing::info!("session closed");
        }
    }
    Ok(())
}

pub fn resolve_session(conn: &Connection, token: &str) -> Result<Option<Session>, AppError> {
    let row = conn
        .query_row(
            "SELECT u.id, u.name, u.email, u.role, u.class_id
             FROM sessions s
             JOIN users u ON u.id = s.user_id
             WHERE s.token = ? AND s.expires_at > ?",
            (token, db::now()),
            |r| {
                Ok((
                    r.get::<_, String>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, String>(2)?,
                    r.get::<_, String>(3)?,
                    r.get::<_, Option<String>>(4)?,
                ))
            },
        )
        .optional()?;

    let Some((user_id, name, email, role, class_id)) = row else {
        return Ok(None);
    };
    Ok(Some(Session {
        user_id,
        name,
        email,
        role: role.parse()?,
        class_id,
    }))
}
