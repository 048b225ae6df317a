//! Session issuance handler.

use axum::extract::State;
use axum::Json;
use axum_extra::extract::CookieJar;
use serde_json::{json, Value};

use crate::error::ApiResult;
use crate::session::session_cookie;
use crate::state::AppState;

/// Issue a session cookie signed over the caller-supplied identity claims.
pub async fn issue_session(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(claims): Json<serde_json::Map<String, Value>>,
) -> ApiResult<(CookieJar, Json<Value>)> {
    let token = state.session.issue(claims)?;
    Ok((
        jar.add(session_cookie(token)),
        Json(json!({ "success": true })),
    ))
}
