use axum::Json;
use serde_json::{json, Value};

/// Body for `GET /health` on every service.
pub fn health_response(service: &str, version: &str) -> Json<Value> {
    Json(json!({
        "status": "UP",
        "service": service,
        "version": version
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_body() {
        let Json(body) = health_response("job-service", "0.1.0");
        assert_eq!(body["status"], "UP");
        assert_eq!(body["service"], "job-service");
    }
}
