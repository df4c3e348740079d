use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "teacher" => Ok(Role::Teacher),
            other => Err(AppError::bad_params(format!(
                "role must be \"student\" or \"teacher\", got {other:?}"
            ))),
        }
    }
}

/// A registered user as exposed to callers. The password hash never leaves
/// the accounts module.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub class_id: Option<String>,
    pub created_at: String,
}

/// The authenticated caller of a request, resolved from the session cookie.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub class_id: Option<String>,
}

impl Session {
    pub fn require(&self, role: Role) -> Result<(), AppError> {
        if self.role == role {
            Ok(())
        } else {
            Err(AppError::unauthorized(format!(
                "only a {role} may do this; signed in as a {}",
                self.role
            )))
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Class {
    pub id: String,
    pub name: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Topic {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub class_id: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EssayStatus {
    Submitted,
    Graded,
}

/// An essay joined with its topic title and author name for display.
#[derive(Debug, Clone, Serialize)]
pub struct Essay {
    pub id: String,
    pub topic_id: String,
    pub topic_title: String,
    pub author_id: String,
    pub author_name: String,
    pub text: String,
    pub score: Option<f64>,
    pub feedback: Option<String>,
    pub status: EssayStatus,
    pub created_at: String,
    pub graded_at: Option<String>,
}
