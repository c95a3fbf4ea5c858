use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A single evaluation or role question with its store-assigned identifier.
///
/// The id is authoritative: finalize answers must reference these exact ids,
/// never a positional index.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct RoleQuestion {
    pub id: i32,
    pub question: String,
}

/// Immutable snapshot of a job opening, resolved once per search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleInformation {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub ai_description: Option<String>,
    pub experience_years: i32,
    pub department: Option<String>,
    pub skills: Option<Vec<String>>,
    pub evaluation_questions: Vec<RoleQuestion>,
    pub role_questions: Vec<RoleQuestion>,
}

#[derive(Debug, Clone, FromRow)]
pub struct RoleRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub ai_description: Option<String>,
    pub experience_years: i32,
    pub department: Option<String>,
    pub skills: Option<Vec<String>>,
}

impl RoleInformation {
    pub fn from_parts(
        row: RoleRow,
        evaluation_questions: Vec<RoleQuestion>,
        role_questions: Vec<RoleQuestion>,
    ) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            ai_description: row.ai_description,
            experience_years: row.experience_years,
            department: row.department,
            skills: row.skills,
            evaluation_questions,
            role_questions,
        }
    }
}
