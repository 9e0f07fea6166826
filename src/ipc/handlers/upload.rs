use crate::ipc::error::ok;
use crate::ipc::helpers::{get_required_str, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::service::GradeService;
use crate::store::SqliteGradeStore;
use crate::validate;
use serde_json::json;
use std::path::PathBuf;

/// Content types the front end is allowed to hand us. Checked before the
/// file is even read.
const ALLOWED_CONTENT_TYPES: [&str; 2] = ["text/csv", "application/vnd.ms-excel"];

/// Cap on how many row errors are spelled out in a rejection message.
const MAX_REPORTED_ERRORS: usize = 5;

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "grades.upload" => Some(handle_upload(state, req)),
        _ => None,
    }
}

fn handle_upload(state: &mut AppState, req: &Request) -> serde_json::Value {
    match upload(state, &req.params) {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

/// All-or-nothing upload policy: the validator tolerates bad rows, but any
/// row error rejects the whole batch here and nothing is persisted.
fn upload(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let Some(conn) = state.db.as_ref() else {
        return Err(HandlerErr::new("no_workspace", "no workspace selected"));
    };

    let content_type = get_required_str(params, "contentType")?;
    if !ALLOWED_CONTENT_TYPES.contains(&content_type.as_str()) {
        return Err(HandlerErr::new(
            "unsupported_media_type",
            format!("unsupported content type: {}", content_type),
        ));
    }

    let path = PathBuf::from(get_required_str(params, "path")?);
    let bytes = std::fs::read(&path)
        .map_err(|e| HandlerErr::new("read_failed", format!("cannot read upload: {}", e)))?;
    if bytes.len() as u64 > state.settings.max_file_size {
        return Err(HandlerErr::new(
            "file_too_large",
            format!("file exceeds {} bytes", state.settings.max_file_size),
        ));
    }

    let filename = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    let (records, errors) = validate::validate_csv(&bytes, filename, &state.settings)
        .map_err(|e| HandlerErr::new("invalid_file", e.to_string()))?;

    if !errors.is_empty() {
        let shown = errors
            .iter()
            .take(MAX_REPORTED_ERRORS)
            .cloned()
            .collect::<Vec<_>>()
            .join("; ");
        return Err(HandlerErr {
            code: "validation_errors",
            message: format!("parsing errors: {}", shown),
            details: Some(json!({ "errorCount": errors.len() })),
        });
    }
    if records.is_empty() {
        return Err(HandlerErr::new(
            "no_records",
            "no valid records found in file",
        ));
    }

    let service = GradeService::new(SqliteGradeStore::new(conn), state.settings.clone());
    let (records_loaded, students) = service
        .insert_grades(&records)
        .map_err(|e| HandlerErr::new("db_insert_failed", e.to_string()))?;

    Ok(json!({
        "recordsLoaded": records_loaded,
        "students": students,
        "message": format!("loaded {} grade records for {} students", records_loaded, students),
    }))
}
