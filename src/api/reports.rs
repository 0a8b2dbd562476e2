//! Report endpoints

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::report::{
        AttentionItem, AvailableLaboratory, FullReport, LaboratoryStatistics, RoleActivity,
        StatusGroup, UserListing,
    },
    AppState,
};

/// All users sorted by surname then name
#[utoipa::path(
    get,
    path = "/reports/users",
    tag = "reports",
    responses(
        (status = 200, description = "User listing", body = UserListing),
        (status = 503, description = "Store unavailable", body = crate::error::ErrorResponse)
    )
)]
pub async fn user_listing(State(state): State<AppState>) -> AppResult<Json<UserListing>> {
    let listing = state.services.reports.user_listing().await?;
    Ok(Json(listing))
}

/// Available laboratories with their available equipment
#[utoipa::path(
    get,
    path = "/reports/laboratories/available",
    tag = "reports",
    responses(
        (status = 200, description = "Available laboratories", body = Vec<AvailableLaboratory>),
        (status = 503, description = "Store unavailable", body = crate::error::ErrorResponse)
    )
)]
pub async fn available_laboratories(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<AvailableLaboratory>>> {
    let labs = state.services.reports.available_laboratories().await?;
    Ok(Json(labs))
}

/// Equipment counts per status
#[utoipa::path(
    get,
    path = "/reports/equipment/by-status",
    tag = "reports",
    responses(
        (status = 200, description = "Equipment grouped by status", body = Vec<StatusGroup>),
        (status = 503, description = "Store unavailable", body = crate::error::ErrorResponse)
    )
)]
pub async fn equipment_by_status(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<StatusGroup>>> {
    let groups = state.services.reports.equipment_by_status().await?;
    Ok(Json(groups))
}

/// Users with an institutional email address
#[utoipa::path(
    get,
    path = "/reports/users/institutional",
    tag = "reports",
    responses(
        (status = 200, description = "Institutional users", body = UserListing),
        (status = 503, description = "Store unavailable", body = crate::error::ErrorResponse)
    )
)]
pub async fn institutional_users(State(state): State<AppState>) -> AppResult<Json<UserListing>> {
    let listing = state.services.reports.institutional_users().await?;
    Ok(Json(listing))
}

/// Cross-collection laboratory statistics
#[utoipa::path(
    get,
    path = "/reports/laboratories/statistics",
    tag = "reports",
    responses(
        (status = 200, description = "Laboratory statistics", body = LaboratoryStatistics),
        (status = 503, description = "Store unavailable", body = crate::error::ErrorResponse)
    )
)]
pub async fn laboratory_statistics(
    State(state): State<AppState>,
) -> AppResult<Json<LaboratoryStatistics>> {
    let statistics = state.services.reports.laboratory_statistics().await?;
    Ok(Json(statistics))
}

/// Equipment that needs attention
#[utoipa::path(
    get,
    path = "/reports/equipment/attention",
    tag = "reports",
    responses(
        (status = 200, description = "Equipment needing attention", body = Vec<AttentionItem>),
        (status = 503, description = "Store unavailable", body = crate::error::ErrorResponse)
    )
)]
pub async fn equipment_needing_attention(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<AttentionItem>>> {
    let items = state.services.reports.equipment_needing_attention().await?;
    Ok(Json(items))
}

/// User activity per role
#[utoipa::path(
    get,
    path = "/reports/users/by-role",
    tag = "reports",
    responses(
        (status = 200, description = "Activity by role", body = Vec<RoleActivity>),
        (status = 503, description = "Store unavailable", body = crate::error::ErrorResponse)
    )
)]
pub async fn activity_by_role(State(state): State<AppState>) -> AppResult<Json<Vec<RoleActivity>>> {
    let rows = state.services.reports.activity_by_role().await?;
    Ok(Json(rows))
}

/// Every report in one response
#[utoipa::path(
    get,
    path = "/reports",
    tag = "reports",
    responses(
        (status = 200, description = "All reports", body = FullReport),
        (status = 503, description = "Store unavailable", body = crate::error::ErrorResponse),
        (status = 504, description = "Store query timed out", body = crate::error::ErrorResponse)
    )
)]
pub async fn all_reports(State(state): State<AppState>) -> AppResult<Json<FullReport>> {
    let report = state.services.reports.run_all().await?;
    Ok(Json(report))
}
