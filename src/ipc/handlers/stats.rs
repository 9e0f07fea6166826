use crate::ipc::error::ok;
use crate::ipc::helpers::HandlerErr;
use crate::ipc::types::{AppState, Request};
use crate::service::GradeService;
use crate::store::SqliteGradeStore;
use serde_json::json;

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "grades.stats" => Some(handle_stats(state, req)),
        "grades.truncate" => Some(handle_truncate(state, req)),
        _ => None,
    }
}

fn handle_stats(state: &mut AppState, req: &Request) -> serde_json::Value {
    match stats(state) {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

fn stats(state: &AppState) -> Result<serde_json::Value, HandlerErr> {
    let Some(conn) = state.db.as_ref() else {
        return Err(HandlerErr::new("no_workspace", "no workspace selected"));
    };
    let service = GradeService::new(SqliteGradeStore::new(conn), state.settings.clone());
    let summary = service
        .summary_statistics()
        .map_err(|e| HandlerErr::new("db_query_failed", e.to_string()))?;
    serde_json::to_value(&summary).map_err(|e| HandlerErr::new("serialize_failed", e.to_string()))
}

/// Administrative/test reset. Not part of the upload or query surface.
fn handle_truncate(state: &mut AppState, req: &Request) -> serde_json::Value {
    match truncate(state) {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

fn truncate(state: &AppState) -> Result<serde_json::Value, HandlerErr> {
    let Some(conn) = state.db.as_ref() else {
        return Err(HandlerErr::new("no_workspace", "no workspace selected"));
    };
    let service = GradeService::new(SqliteGradeStore::new(conn), state.settings.clone());
    service
        .truncate_all()
        .map_err(|e| HandlerErr::new("db_delete_failed", e.to_string()))?;
    Ok(json!({}))
}
