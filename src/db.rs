use rusqlite::Connection;
use std::path::Path;

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join("grades.sqlite3");
    let conn = Connection::open(db_path)?;
    init_schema(&conn)?;
    Ok(conn)
}

/// Creates the grades table and its query indexes. Also used by in-memory
/// test connections.
///
/// The grade check is 1..5 to match record validation; an older schema
/// variant used 2..5 and is deliberately not reproduced.
pub fn init_schema(conn: &Connection) -> anyhow::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS grades(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            full_name TEXT NOT NULL,
            subject TEXT NOT NULL,
            grade INTEGER NOT NULL CHECK(grade >= 1 AND grade <= 5),
            created_at TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_grades_full_name ON grades(full_name)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_grades_grade ON grades(grade)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_grades_subject ON grades(subject)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_grades_full_name_grade ON grades(full_name, grade)",
        [],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_rejects_out_of_range_grades() {
        let conn = Connection::open_in_memory().expect("open");
        init_schema(&conn).expect("schema");
        let insert = "INSERT INTO grades(full_name, subject, grade, created_at)
                      VALUES('Ivanov Ivan', 'Math', ?, '2024-09-02T00:00:00Z')";
        assert!(conn.execute(insert, [0]).is_err());
        assert!(conn.execute(insert, [6]).is_err());
        assert_eq!(conn.execute(insert, [1]).expect("grade 1"), 1);
        assert_eq!(conn.execute(insert, [5]).expect("grade 5"), 1);
    }

    #[test]
    fn init_schema_is_idempotent() {
        let conn = Connection::open_in_memory().expect("open");
        init_schema(&conn).expect("first");
        init_schema(&conn).expect("second");
    }
}
