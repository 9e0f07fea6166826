use crate::config::Settings;
use crate::model::{GradeRecord, GradeSummary, StudentGradeCount};
use crate::store::GradeStore;

/// Orchestrates validated batches into the store and answers the aggregate
/// queries. Holds no connection state of its own; the store is injected at
/// construction.
pub struct GradeService<S: GradeStore> {
    store: S,
    settings: Settings,
}

impl<S: GradeStore> GradeService<S> {
    pub fn new(store: S, settings: Settings) -> Self {
        GradeService { store, settings }
    }

    /// Persists the batch, then re-counts distinct students across the whole
    /// table (intentionally not just this batch). An empty batch returns
    /// (0, 0) without a storage round-trip, even when the table already has
    /// rows from earlier uploads.
    pub fn insert_grades(&self, records: &[GradeRecord]) -> anyhow::Result<(usize, i64)> {
        if records.is_empty() {
            return Ok((0, 0));
        }
        self.store.bulk_insert(records)?;
        let students = self.store.distinct_student_count()?;
        Ok((records.len(), students))
    }

    /// Students with strictly more than `n` occurrences of the analyzed
    /// grade, ordered count DESC then name ASC.
    pub fn students_with_more_than_n_twos(&self, n: i64) -> anyhow::Result<Vec<StudentGradeCount>> {
        self.store
            .students_with_count_above(self.settings.grade_to_analyze, n)
    }

    /// Students with strictly fewer than `n` occurrences of the analyzed
    /// grade. A student with zero occurrences is absent, not counted as 0.
    pub fn students_with_less_than_n_twos(&self, n: i64) -> anyhow::Result<Vec<StudentGradeCount>> {
        self.store
            .students_with_count_below(self.settings.grade_to_analyze, n)
    }

    pub fn summary_statistics(&self) -> anyhow::Result<GradeSummary> {
        self.store.summary()
    }

    pub fn truncate_all(&self) -> anyhow::Result<()> {
        self.store.truncate()
    }
}
