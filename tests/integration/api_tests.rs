//! API integration tests
//!
//! The router is driven in-process over a seeded in-memory store.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use bson::{oid::ObjectId, Bson, Document};
use serde_json::Value;
use tower::ServiceExt;

use labtrack_server::{
    api::create_router,
    config::AppConfig,
    error::{AppError, AppResult},
    query::Projection,
    repository::{memory::MemoryStore, Collection, EntityStore, FindQuery, Repository},
    services::Services,
    AppState,
};

async fn app_with(store: Arc<dyn EntityStore>, seed: bool) -> Router {
    let config = AppConfig::default();
    let repository = Repository::new(store, &config.store);
    let services = Services::new(repository, config.reports.clone());
    if seed {
        services.inventory.reseed().await.expect("seed failed");
    }
    create_router(AppState {
        services: Arc::new(services),
    })
}

async fn seeded_app() -> Router {
    app_with(Arc::new(MemoryStore::new()), true).await
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .expect("request failed");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

/// Store that refuses every call
struct DownStore;

#[async_trait]
impl EntityStore for DownStore {
    async fn find(&self, _: Collection, _: &FindQuery) -> AppResult<Vec<Document>> {
        Err(AppError::StoreUnavailable("connection refused".to_string()))
    }

    async fn fetch_by_ids(
        &self,
        _: Collection,
        _: &[ObjectId],
        _: &Projection,
    ) -> AppResult<Vec<Document>> {
        Err(AppError::StoreUnavailable("connection refused".to_string()))
    }

    async fn insert_many(&self, _: Collection, _: Vec<Document>) -> AppResult<Vec<ObjectId>> {
        Err(AppError::StoreUnavailable("connection refused".to_string()))
    }

    async fn delete_all(&self, _: Collection) -> AppResult<u64> {
        Err(AppError::StoreUnavailable("connection refused".to_string()))
    }

    async fn push_to_array(
        &self,
        _: Collection,
        _: ObjectId,
        _: &str,
        _: Vec<Bson>,
    ) -> AppResult<bool> {
        Err(AppError::StoreUnavailable("connection refused".to_string()))
    }

    async fn ping(&self) -> AppResult<()> {
        Err(AppError::StoreUnavailable("connection refused".to_string()))
    }
}

#[tokio::test]
async fn test_health_check() {
    let (status, body) = get(seeded_app().await, "/api/v1/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_readiness_check() {
    let (status, body) = get(seeded_app().await, "/api/v1/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_user_listing() {
    let (status, body) = get(seeded_app().await, "/api/v1/reports/users").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 5);
    let users = body["usuarios"].as_array().unwrap();
    assert_eq!(users[0]["apellido"], "González López");
    assert_eq!(users[0]["nombreCompleto"], "María Elena González López");
    assert_eq!(users[0]["activo"], true);
}

#[tokio::test]
async fn test_available_laboratories() {
    let (status, body) = get(seeded_app().await, "/api/v1/reports/laboratories/available").await;
    assert_eq!(status, StatusCode::OK);
    let labs = body.as_array().unwrap();
    assert_eq!(labs.len(), 2);
    assert_eq!(labs[0]["codigo"], "LAB-001");
    assert_eq!(labs[0]["equiposDisponibles"], 2);
    assert_eq!(labs[0]["ubicacionCompleta"], "Edificio A - Piso 2 - Aula A-201");
    assert_eq!(labs[0]["responsable"]["correo"], "juan.perez@universidad.edu");
}

#[tokio::test]
async fn test_equipment_by_status() {
    let (status, body) = get(seeded_app().await, "/api/v1/reports/equipment/by-status").await;
    assert_eq!(status, StatusCode::OK);
    let groups = body.as_array().unwrap();
    assert_eq!(groups[0]["estado"], "disponible");
    assert_eq!(groups[0]["cantidad"], 4);
    assert_eq!(groups[1]["estado"], "mantenimiento");
    assert_eq!(groups[1]["equipos"][0]["codigo"], "OSC-001");
}

#[tokio::test]
async fn test_institutional_users() {
    let (status, body) = get(seeded_app().await, "/api/v1/reports/users/institutional").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    for user in body["usuarios"].as_array().unwrap() {
        assert!(user["correo"].as_str().unwrap().ends_with("@universidad.edu"));
    }
}

#[tokio::test]
async fn test_laboratory_statistics() {
    let (status, body) = get(seeded_app().await, "/api/v1/reports/laboratories/statistics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalLaboratorios"], 3);
    assert_eq!(body["totalEquipos"], 5);
    let average = body["promedioEquiposPorLab"].as_f64().unwrap();
    assert!((average - 5.0 / 3.0).abs() < 1e-9);
    assert_eq!(body["laboratorios"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_statistics_on_empty_store() {
    let app = app_with(Arc::new(MemoryStore::new()), false).await;
    let (status, body) = get(app, "/api/v1/reports/laboratories/statistics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalLaboratorios"], 0);
    assert_eq!(body["promedioEquiposPorLab"], 0.0);
}

#[tokio::test]
async fn test_equipment_needing_attention() {
    let (status, body) = get(seeded_app().await, "/api/v1/reports/equipment/attention").await;
    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().unwrap();
    let oscilloscope = items.iter().find(|i| i["codigo"] == "OSC-001").unwrap();
    assert_eq!(oscilloscope["mantenimientos"], 1);
    assert_eq!(oscilloscope["laboratorio"]["codigo"], "LAB-003");
    assert_eq!(oscilloscope["informacionCompleta"], "Tektronix TBS1052B - OSC-001");
}

#[tokio::test]
async fn test_activity_by_role() {
    let (status, body) = get(seeded_app().await, "/api/v1/reports/users/by-role").await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows[0]["rol"], "estudiante");
    assert_eq!(rows[0]["cantidad"], 2);
    assert_eq!(rows[0]["porcentajeActivos"], 100.0);
}

#[tokio::test]
async fn test_all_reports() {
    let (status, body) = get(seeded_app().await, "/api/v1/reports").await;
    assert_eq!(status, StatusCode::OK);
    for key in [
        "usuarios",
        "laboratoriosDisponibles",
        "equiposPorEstado",
        "usuariosInstitucionales",
        "estadisticas",
        "equiposAtencion",
        "actividadPorRol",
    ] {
        assert!(!body[key].is_null(), "missing {key}");
    }
}

#[tokio::test]
async fn test_store_down_is_service_unavailable() {
    let app = app_with(Arc::new(DownStore), false).await;
    let (status, body) = get(app.clone(), "/api/v1/reports/users").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "StoreFailure");

    let (status, _) = get(app, "/api/v1/ready").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_openapi_document() {
    let (status, body) = get(seeded_app().await, "/api-docs/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/reports/equipment/attention"].is_object());
}
