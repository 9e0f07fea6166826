use crate::ipc::error::ok;
use crate::ipc::helpers::HandlerErr;
use crate::ipc::types::{AppState, Request};
use crate::service::GradeService;
use crate::store::SqliteGradeStore;
use serde_json::json;

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.moreThanTwos" => Some(handle_query(state, req, Direction::Above)),
        "students.lessThanTwos" => Some(handle_query(state, req, Direction::Below)),
        _ => None,
    }
}

enum Direction {
    Above,
    Below,
}

fn handle_query(state: &mut AppState, req: &Request, direction: Direction) -> serde_json::Value {
    match query(state, direction) {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

/// The service takes arbitrary thresholds; these endpoints pin them to the
/// configured values (more than 3 / less than 5 by default).
fn query(state: &AppState, direction: Direction) -> Result<serde_json::Value, HandlerErr> {
    let Some(conn) = state.db.as_ref() else {
        return Err(HandlerErr::new("no_workspace", "no workspace selected"));
    };
    let service = GradeService::new(SqliteGradeStore::new(conn), state.settings.clone());
    let students = match direction {
        Direction::Above => service.students_with_more_than_n_twos(state.settings.more_than_threshold),
        Direction::Below => service.students_with_less_than_n_twos(state.settings.less_than_threshold),
    }
    .map_err(|e| HandlerErr::new("db_query_failed", e.to_string()))?;

    let students_json = students
        .iter()
        .map(|s| serde_json::to_value(s))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| HandlerErr::new("serialize_failed", e.to_string()))?;
    Ok(json!({ "students": students_json }))
}
