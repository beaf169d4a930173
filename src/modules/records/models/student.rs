use serde::{Deserialize, Serialize};

use super::Division;

/// Enrollment status of a student
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudentStatus {
    Active,
    Completed,
    /// Exited before completing the course
    Dropped,
}

impl Default for StudentStatus {
    fn default() -> Self {
        StudentStatus::Active
    }
}

impl std::fmt::Display for StudentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StudentStatus::Active => write!(f, "active"),
            StudentStatus::Completed => write!(f, "completed"),
            StudentStatus::Dropped => write!(f, "dropped"),
        }
    }
}

impl StudentStatus {
    pub const ALL: [StudentStatus; 3] = [
        StudentStatus::Active,
        StudentStatus::Completed,
        StudentStatus::Dropped,
    ];

    /// Every stored spelling that reads back as this status (lowercase)
    pub fn stored_codes(&self) -> &'static [&'static str] {
        match self {
            StudentStatus::Active => &["active"],
            StudentStatus::Completed => &["completed"],
            StudentStatus::Dropped => &["dropped", "dropout", "inactive"],
        }
    }
}

impl std::str::FromStr for StudentStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let code = s.trim().to_lowercase();
        StudentStatus::ALL
            .into_iter()
            .find(|status| status.stored_codes().contains(&code.as_str()))
            .ok_or_else(|| format!("Invalid student status: {}", s))
    }
}

/// Student record as stored in the `students` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub division: Option<Division>,
    /// Course the student is (or was) enrolled in
    #[serde(default)]
    pub course_id: Option<String>,
    #[serde(default)]
    pub status: StudentStatus,
    #[serde(default)]
    pub enrolled_on: Option<String>,
    #[serde(default)]
    pub exited_on: Option<String>,
}

impl Student {
    pub fn has_dropped(&self) -> bool {
        self.status == StudentStatus::Dropped
    }
}
