//! Status handler.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use vegahc_monitor::{CheckResult, Status};

use crate::ApiState;

/// Body of `GET /`.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: Status,
    pub reasons: Vec<String>,
}

impl From<&CheckResult> for StatusResponse {
    fn from(result: &CheckResult) -> Self {
        Self {
            status: result.status(),
            reasons: result.reasons().iter().map(|e| e.to_string()).collect(),
        }
    }
}

/// GET /
pub async fn health_status(State(state): State<ApiState>) -> impl IntoResponse {
    let result = state.store.latest().await;

    let code = if result.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    (code, Json(StatusResponse::from(&result)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vegahc_checks::{CheckError, Dependency};

    #[test]
    fn healthy_result_has_no_reasons() {
        let body = StatusResponse::from(&CheckResult::from_reasons(Vec::new()));
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"status":"HEALTHY","reasons":[]}"#
        );
    }

    #[test]
    fn reasons_are_display_strings_in_order() {
        let result = CheckResult::from_reasons(vec![
            CheckError::Offline(Dependency::Core),
            CheckError::DataNodeLagging { lag: 60 },
        ]);
        let body = StatusResponse::from(&result);
        assert_eq!(body.status, Status::Unhealthy);
        assert_eq!(
            body.reasons,
            vec![
                "core http endpoint is not online".to_string(),
                "data node is lagging behind core by 60 blocks".to_string(),
            ]
        );
    }

    #[test]
    fn unknown_serializes_uppercase() {
        let body = StatusResponse::from(&CheckResult::unknown());
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"status":"UNKNOWN","reasons":[]}"#
        );
    }
}
