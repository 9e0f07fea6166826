use serde::Serialize;

/// Names and subjects are capped at the column width of the grades table.
pub const MAX_FIELD_CHARS: usize = 255;

/// One validated grade entry. Construction is the only way to get one, so a
/// record in hand has already passed every field rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeRecord {
    pub full_name: String,
    pub subject: String,
    pub grade: i64,
}

impl GradeRecord {
    /// Trims the text fields and checks every rule. The Err carries the
    /// reason without any row context; callers prefix the row number.
    pub fn new(
        full_name: &str,
        subject: &str,
        grade: i64,
        min_grade: i64,
        max_grade: i64,
    ) -> Result<GradeRecord, String> {
        let full_name = full_name.trim();
        let subject = subject.trim();
        if full_name.is_empty() {
            return Err("full_name must not be empty".to_string());
        }
        if full_name.chars().count() > MAX_FIELD_CHARS {
            return Err(format!(
                "full_name is longer than {} characters",
                MAX_FIELD_CHARS
            ));
        }
        if subject.is_empty() {
            return Err("group must not be empty".to_string());
        }
        if subject.chars().count() > MAX_FIELD_CHARS {
            return Err(format!("group is longer than {} characters", MAX_FIELD_CHARS));
        }
        if grade < min_grade || grade > max_grade {
            return Err(format!(
                "grade must be between {} and {}, got {}",
                min_grade, max_grade, grade
            ));
        }
        Ok(GradeRecord {
            full_name: full_name.to_string(),
            subject: subject.to_string(),
            grade,
        })
    }
}

/// Per-student count of the analyzed grade, as returned by the threshold
/// queries. Derived at query time, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentGradeCount {
    pub full_name: String,
    pub twos_count: i64,
}

/// Whole-table statistics. The aggregate fields are None on an empty table;
/// they serialize as null so consumers never see a fake zero average.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeSummary {
    pub total_students: i64,
    pub total_grades: i64,
    pub average_grade: Option<f64>,
    pub min_grade: Option<i64>,
    pub max_grade: Option<i64>,
}
