use crate::model::{GradeRecord, GradeSummary, StudentGradeCount};
use chrono::Utc;
use rusqlite::Connection;

/// Storage contract the service is built against. One implementation talks
/// to SQLite; tests can stand in their own.
pub trait GradeStore {
    /// Persists the whole batch in a single transaction.
    fn bulk_insert(&self, records: &[GradeRecord]) -> anyhow::Result<()>;

    /// Distinct student names across the entire table, not one batch.
    fn distinct_student_count(&self) -> anyhow::Result<i64>;

    /// Students whose count of rows with `grade` is strictly greater than
    /// `n`, ordered count DESC then name ASC.
    fn students_with_count_above(&self, grade: i64, n: i64)
        -> anyhow::Result<Vec<StudentGradeCount>>;

    /// Same grouping and order, keeping counts strictly less than `n`.
    /// Students with no matching row at all are never present.
    fn students_with_count_below(&self, grade: i64, n: i64)
        -> anyhow::Result<Vec<StudentGradeCount>>;

    fn summary(&self) -> anyhow::Result<GradeSummary>;

    /// Administrative/test reset. Also restarts the surrogate key sequence.
    fn truncate(&self) -> anyhow::Result<()>;
}

pub struct SqliteGradeStore<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteGradeStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        SqliteGradeStore { conn }
    }
}

impl GradeStore for SqliteGradeStore<'_> {
    fn bulk_insert(&self, records: &[GradeRecord]) -> anyhow::Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO grades(full_name, subject, grade, created_at)
                 VALUES(?, ?, ?, ?)",
            )?;
            let created_at = Utc::now().to_rfc3339();
            for rec in records {
                stmt.execute((&rec.full_name, &rec.subject, rec.grade, &created_at))?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn distinct_student_count(&self) -> anyhow::Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(DISTINCT full_name) FROM grades", [], |r| {
                r.get(0)
            })?;
        Ok(count)
    }

    fn students_with_count_above(
        &self,
        grade: i64,
        n: i64,
    ) -> anyhow::Result<Vec<StudentGradeCount>> {
        let mut stmt = self.conn.prepare(
            "SELECT full_name, COUNT(*) AS twos_count
             FROM grades
             WHERE grade = ?1
             GROUP BY full_name
             HAVING COUNT(*) > ?2
             ORDER BY twos_count DESC, full_name ASC",
        )?;
        let rows = stmt
            .query_map((grade, n), |r| {
                Ok(StudentGradeCount {
                    full_name: r.get(0)?,
                    twos_count: r.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn students_with_count_below(
        &self,
        grade: i64,
        n: i64,
    ) -> anyhow::Result<Vec<StudentGradeCount>> {
        let mut stmt = self.conn.prepare(
            "SELECT full_name, COUNT(*) AS twos_count
             FROM grades
             WHERE grade = ?1
             GROUP BY full_name
             HAVING COUNT(*) < ?2
             ORDER BY twos_count DESC, full_name ASC",
        )?;
        let rows = stmt
            .query_map((grade, n), |r| {
                Ok(StudentGradeCount {
                    full_name: r.get(0)?,
                    twos_count: r.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn summary(&self) -> anyhow::Result<GradeSummary> {
        let summary = self.conn.query_row(
            "SELECT COUNT(DISTINCT full_name), COUNT(*), AVG(grade), MIN(grade), MAX(grade)
             FROM grades",
            [],
            |r| {
                Ok(GradeSummary {
                    total_students: r.get(0)?,
                    total_grades: r.get(1)?,
                    average_grade: r.get(2)?,
                    min_grade: r.get(3)?,
                    max_grade: r.get(4)?,
                })
            },
        )?;
        Ok(summary)
    }

    fn truncate(&self) -> anyhow::Result<()> {
        self.conn.execute("DELETE FROM grades", [])?;
        // sqlite_sequence only exists once an AUTOINCREMENT insert happened.
        let _ = self
            .conn
            .execute("DELETE FROM sqlite_sequence WHERE name = 'grades'", []);
        Ok(())
    }
}
