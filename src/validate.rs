use crate::config::Settings;
use crate::model::GradeRecord;
use anyhow::bail;

const DELIMITER: char = ';';

const COL_DATE: &str = "date";
const COL_GROUP: &str = "group";
const COL_FULL_NAME: &str = "full_name";
const COL_GRADE: &str = "grade";

/// Parses an uploaded CSV into validated records plus per-row error strings.
///
/// Fatal problems (wrong extension, non-UTF-8 content, missing header
/// columns, too many rows) return Err and no records. Row-level problems are
/// tolerated: the bad row is skipped, a `"Row <n>: <reason>"` entry is
/// appended, and parsing continues. Whether any row error rejects the batch
/// is the upload handler's call, not this function's.
///
/// Rows are numbered with the header as row 1, so the first data row is
/// reported as row 2.
pub fn validate_csv(
    bytes: &[u8],
    filename: &str,
    settings: &Settings,
) -> anyhow::Result<(Vec<GradeRecord>, Vec<String>)> {
    if !filename.to_ascii_lowercase().ends_with(".csv") {
        bail!("only CSV files are accepted");
    }
    let Ok(text) = std::str::from_utf8(bytes) else {
        bail!("file must be UTF-8 encoded");
    };
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut lines = text.lines();
    let Some(header_line) = lines.next() else {
        bail!("missing required columns; found: none");
    };
    let headers: Vec<&str> = header_line.split(DELIMITER).map(|h| h.trim()).collect();
    let col = |name: &str| headers.iter().position(|h| *h == name);
    let (Some(_), Some(group_idx), Some(name_idx), Some(grade_idx)) = (
        col(COL_DATE),
        col(COL_GROUP),
        col(COL_FULL_NAME),
        col(COL_GRADE),
    ) else {
        bail!("missing required columns; found: {}", header_line.trim());
    };
    let last_needed = group_idx.max(name_idx).max(grade_idx);

    let mut records: Vec<GradeRecord> = Vec::new();
    let mut errors: Vec<String> = Vec::new();
    let mut row_num = 1usize;
    let mut data_rows = 0usize;

    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        row_num += 1;
        data_rows += 1;
        if data_rows > settings.max_records_per_file {
            bail!(
                "file has more than {} data rows",
                settings.max_records_per_file
            );
        }

        let fields: Vec<&str> = line.split(DELIMITER).collect();
        if fields.len() <= last_needed {
            errors.push(format!(
                "Row {}: expected {} columns, got {}",
                row_num,
                headers.len(),
                fields.len()
            ));
            continue;
        }

        let grade_raw = fields[grade_idx].trim();
        let Ok(grade) = grade_raw.parse::<i64>() else {
            errors.push(format!(
                "Row {}: grade must be an integer, got '{}'",
                row_num, grade_raw
            ));
            continue;
        };

        match GradeRecord::new(
            fields[name_idx],
            fields[group_idx],
            grade,
            settings.min_grade,
            settings.max_grade,
        ) {
            Ok(rec) => records.push(rec),
            Err(reason) => errors.push(format!("Row {}: {}", row_num, reason)),
        }
    }

    Ok((records, errors))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings::default()
    }

    fn run(content: &str) -> (Vec<GradeRecord>, Vec<String>) {
        validate_csv(content.as_bytes(), "grades.csv", &settings()).expect("validate")
    }

    #[test]
    fn parses_well_formed_rows() {
        let (records, errors) = run(
            "date;group;full_name;grade\n\
             2024-09-02;Math;Ivanov Ivan;5\n\
             2024-09-02;Russian;Petrov Petr;3\n",
        );
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].full_name, "Ivanov Ivan");
        assert_eq!(records[0].subject, "Math");
        assert_eq!(records[1].grade, 3);
    }

    #[test]
    fn rejects_non_csv_extension() {
        let err = validate_csv(b"date;group;full_name;grade\n", "grades.txt", &settings())
            .expect_err("should fail");
        assert!(err.to_string().contains("only CSV files"));
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        let out = validate_csv(b"date;group;full_name;grade\n", "GRADES.CSV", &settings());
        assert!(out.is_ok());
    }

    #[test]
    fn rejects_non_utf8_content() {
        let err =
            validate_csv(&[0xff, 0xfe, 0x00], "grades.csv", &settings()).expect_err("should fail");
        assert!(err.to_string().contains("UTF-8"));
    }

    #[test]
    fn strips_leading_bom() {
        let content = "\u{feff}date;group;full_name;grade\n2024-09-02;Math;Ivanov Ivan;4\n";
        let (records, errors) = run(content);
        assert!(errors.is_empty());
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn missing_columns_is_fatal_and_names_found_headers() {
        let err = validate_csv(
            b"full_name;subject;grade\nIvanov Ivan;Math;5\n",
            "grades.csv",
            &settings(),
        )
        .expect_err("should fail");
        let msg = err.to_string();
        assert!(msg.contains("missing required columns"));
        assert!(msg.contains("full_name;subject;grade"));
    }

    #[test]
    fn comma_delimited_header_counts_as_missing_columns() {
        let err = validate_csv(b"date,group,full_name,grade\n", "grades.csv", &settings())
            .expect_err("should fail");
        assert!(err.to_string().contains("missing required columns"));
    }

    #[test]
    fn header_order_is_free() {
        let (records, errors) = run("grade;full_name;group;date\n5;Ivanov Ivan;Math;2024-09-02\n");
        assert!(errors.is_empty());
        assert_eq!(records[0].grade, 5);
        assert_eq!(records[0].subject, "Math");
    }

    #[test]
    fn bad_rows_are_collected_and_parsing_continues() {
        let (records, errors) = run(
            "date;group;full_name;grade\n\
             2024-09-02;Math;Ivanov Ivan;five\n\
             2024-09-02;Math;Petrov Petr;7\n\
             2024-09-02;Math;;3\n\
             2024-09-02;Math;Sidorov Ivan;4\n",
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].full_name, "Sidorov Ivan");
        assert_eq!(errors.len(), 3);
        assert!(errors[0].starts_with("Row 2: grade must be an integer"));
        assert!(errors[1].starts_with("Row 3: grade must be between 1 and 5"));
        assert!(errors[2].starts_with("Row 4: full_name must not be empty"));
    }

    #[test]
    fn short_row_is_a_row_error() {
        let (records, errors) = run(
            "date;group;full_name;grade\n\
             2024-09-02;Math\n\
             2024-09-02;Math;Ivanov Ivan;4\n",
        );
        assert_eq!(records.len(), 1);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Row 2: expected 4 columns"));
    }

    #[test]
    fn fields_are_trimmed() {
        let (records, errors) = run(
            "date;group;full_name;grade\n\
             2024-09-02; Math ;  Ivanov Ivan  ; 5 \n",
        );
        assert!(errors.is_empty());
        assert_eq!(records[0].full_name, "Ivanov Ivan");
        assert_eq!(records[0].subject, "Math");
        assert_eq!(records[0].grade, 5);
    }

    #[test]
    fn header_only_file_yields_no_records_and_no_errors() {
        let (records, errors) = run("date;group;full_name;grade\n");
        assert!(records.is_empty());
        assert!(errors.is_empty());
    }

    #[test]
    fn blank_lines_are_skipped() {
        let (records, errors) = run(
            "date;group;full_name;grade\n\
             \n\
             2024-09-02;Math;Ivanov Ivan;4\n\
             \n",
        );
        assert!(errors.is_empty());
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn record_cap_is_fatal() {
        let mut small = Settings::default();
        small.max_records_per_file = 1;
        let err = validate_csv(
            b"date;group;full_name;grade\n\
              2024-09-02;Math;Ivanov Ivan;4\n\
              2024-09-02;Math;Petrov Petr;3\n",
            "grades.csv",
            &small,
        )
        .expect_err("should fail");
        assert!(err.to_string().contains("more than 1 data rows"));
    }
}
