use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthCheck {
    status: &'static str,
    timestamp: DateTime<Utc>,
}

pub async fn get_health_check() -> Json<HealthCheck> {
    Json(HealthCheck {
        status: "ok",
        timestamp: Utc::now(),
    })
}
