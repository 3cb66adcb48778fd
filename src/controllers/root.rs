use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub docs: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub struct RootController;

impl RootController {
    pub async fn root(backend_url: &str) -> Json<ServiceInfo> {
        Json(ServiceInfo {
            name: "Songs REST API Service",
            version: "1.0",
            docs: format!("{}/apidocs/index.html", backend_url.trim_end_matches('/')),
        })
    }

    pub async fn health_check() -> impl IntoResponse {
        (StatusCode::OK, Json(HealthResponse { status: "OK" }))
    }
}
