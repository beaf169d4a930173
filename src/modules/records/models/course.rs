use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Division;
use crate::core::timezone::parse_record_date;

/// Catalog status of a course
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CourseStatus {
    Active,
    Inactive,
}

impl Default for CourseStatus {
    fn default() -> Self {
        CourseStatus::Active
    }
}

impl std::fmt::Display for CourseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CourseStatus::Active => write!(f, "Active"),
            CourseStatus::Inactive => write!(f, "Inactive"),
        }
    }
}

impl std::str::FromStr for CourseStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(CourseStatus::Active),
            "inactive" => Ok(CourseStatus::Inactive),
            _ => Err(format!("Invalid course status: {}", s)),
        }
    }
}

/// Course catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub division: Option<Division>,
    #[serde(default)]
    pub duration_months: Option<u32>,
    #[serde(default)]
    pub total_fee: Option<Decimal>,
    #[serde(default)]
    pub admission_fee: Option<Decimal>,
    #[serde(default)]
    pub status: CourseStatus,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub instructors: Vec<String>,
    /// Authoritative enrollment list
    #[serde(default)]
    pub students_enrolled: Vec<String>,
}

impl Course {
    pub fn enrollment_count(&self) -> usize {
        self.students_enrolled.len()
    }

    /// Whether the course ran at any point within `[start, end]`.
    ///
    /// A course with a recorded run window counts when that window overlaps the range,
    /// whatever its current status. Without a window, the catalog status decides.
    pub fn is_active_within(&self, start: NaiveDate, end: NaiveDate) -> bool {
        let runs_from = self.start_date.as_deref().and_then(parse_record_date);
        let runs_until = self.end_date.as_deref().and_then(parse_record_date);

        if runs_from.is_none() && runs_until.is_none() {
            return self.status == CourseStatus::Active;
        }

        let starts_in_time = runs_from.map_or(true, |from| from <= end);
        let still_running = runs_until.map_or(true, |until| until >= start);
        starts_in_time && still_running
    }

    /// Loose name match used when a transaction carries only the course name
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.trim().eq_ignore_ascii_case(name.trim())
    }
}
