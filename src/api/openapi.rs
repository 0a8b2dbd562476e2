//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{health, reports};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "LabTrack API",
        version = "1.0.0",
        description = "Laboratory and equipment inventory reports"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Reports
        reports::user_listing,
        reports::available_laboratories,
        reports::equipment_by_status,
        reports::institutional_users,
        reports::laboratory_statistics,
        reports::equipment_needing_attention,
        reports::activity_by_role,
        reports::all_reports,
    ),
    components(
        schemas(
            crate::models::report::UserSummary,
            crate::models::report::UserListing,
            crate::models::report::PersonRef,
            crate::models::report::EquipmentSummary,
            crate::models::report::AvailableLaboratory,
            crate::models::report::EquipmentRef,
            crate::models::report::StatusGroup,
            crate::models::report::LaboratoryDetail,
            crate::models::report::LaboratoryStatistics,
            crate::models::report::LaboratoryRef,
            crate::models::report::AttentionItem,
            crate::models::report::RoleActivity,
            crate::models::report::FullReport,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "reports", description = "Inventory reports")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
