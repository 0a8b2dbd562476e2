//! Report composer

use bson::Bson;
use chrono::{DateTime, Duration, Utc};

use crate::{
    config::ReportsConfig,
    error::{AppError, AppResult},
    models::{
        report::{
            AttentionItem, AvailableLaboratory, FullReport, LaboratoryStatistics, RoleActivity,
            StatusGroup, UserListing,
        },
        EquipmentStatus, LabStatus,
    },
    pipeline::{Expr, Group, Pipeline},
    populate::Populate,
    query::{Filter, Projection, SortSpec},
    repository::{Collection, FindQuery, Repository},
};

#[derive(Clone)]
pub struct ReportsService {
    repository: Repository,
    settings: ReportsConfig,
}

impl ReportsService {
    pub fn new(repository: Repository, settings: ReportsConfig) -> Self {
        Self {
            repository,
            settings,
        }
    }

    /// Every user, sorted by surname then name
    pub async fn user_listing(&self) -> AppResult<UserListing> {
        let session = self.repository.session("user_listing").await?;
        let query = FindQuery::new(Filter::All)
            .project(Projection::include(["nombre", "apellido", "correo", "rol", "activo"]))
            .sort(SortSpec::new().asc("apellido").asc("nombre").asc("_id"));
        let users = session.find(Collection::Users, &query).await?;

        tracing::info!(total = users.len(), "User listing generated");
        Ok(UserListing::from_documents(&users))
    }

    /// Available laboratories with their available equipment and responsible user
    pub async fn available_laboratories(&self) -> AppResult<Vec<AvailableLaboratory>> {
        let session = self.repository.session("available_laboratories").await?;
        let mut labs = session
            .find(
                Collection::Laboratories,
                &FindQuery::new(Filter::eq("estado", LabStatus::Available)),
            )
            .await?;

        Populate::equipment("equipos")
            .matching(Filter::eq("estado", EquipmentStatus::Available))
            .select(["nombre", "codigo", "tipo", "estado"])
            .resolve(&session, &mut labs)
            .await?;
        Populate::users("responsable")
            .select(["nombre", "apellido", "correo"])
            .resolve(&session, &mut labs)
            .await?;

        tracing::info!(laboratories = labs.len(), "Available laboratories generated");
        Ok(labs.iter().map(AvailableLaboratory::from).collect())
    }

    /// Equipment count per status, largest groups first
    pub async fn equipment_by_status(&self) -> AppResult<Vec<StatusGroup>> {
        let session = self.repository.session("equipment_by_status").await?;
        let groups = Pipeline::new()
            .group(
                Group::by(Expr::field("estado"))
                    .count("cantidad")
                    .push(
                        "equipos",
                        Expr::record([
                            ("nombre", Expr::field("nombre")),
                            ("codigo", Expr::field("codigo")),
                        ]),
                    ),
            )
            .sort(SortSpec::new().desc("cantidad").asc("_id"))
            .run(&session, Collection::Equipment)
            .await?;

        tracing::info!(groups = groups.len(), "Equipment by status generated");
        Ok(groups.iter().map(StatusGroup::from).collect())
    }

    /// Users whose email belongs to the institutional domain, any letter case
    pub async fn institutional_users(&self) -> AppResult<UserListing> {
        let pattern = format!("@{}$", regex::escape(&self.settings.institutional_domain));
        let filter = Filter::regex("correo", &pattern, true)?;

        let session = self.repository.session("institutional_users").await?;
        let query = FindQuery::new(filter)
            .project(Projection::include(["nombre", "apellido", "correo", "rol"]));
        let users = session.find(Collection::Users, &query).await?;

        tracing::info!(
            domain = %self.settings.institutional_domain,
            total = users.len(),
            "Institutional users generated"
        );
        Ok(UserListing::from_documents(&users))
    }

    /// Per-laboratory equipment counts and value, summarized over all laboratories
    pub async fn laboratory_statistics(&self) -> AppResult<LaboratoryStatistics> {
        let session = self.repository.session("laboratory_statistics").await?;
        let summary = Pipeline::new()
            .lookup(Collection::Equipment, "_id", "laboratorio", "equiposDetalle")
            .lookup(Collection::Users, "responsable", "_id", "responsableDetalle")
            .project([
                ("nombre", Expr::field("nombre")),
                ("codigo", Expr::field("codigo")),
                ("tipo", Expr::field("tipo")),
                ("estado", Expr::field("estado")),
                ("cantidadEquipos", Expr::size(Expr::field("equiposDetalle"))),
                (
                    "equiposDisponibles",
                    Expr::size(Expr::filter(
                        Expr::field("equiposDetalle"),
                        Filter::eq("estado", EquipmentStatus::Available),
                    )),
                ),
                ("responsable", Expr::elem_at(Expr::field("responsableDetalle"), 0)),
                (
                    "valorTotalEquipos",
                    Expr::sum(Expr::field("equiposDetalle.valorAdquisicion")),
                ),
            ])
            .group(
                Group::all()
                    .count("totalLaboratorios")
                    .sum("totalEquipos", Expr::field("cantidadEquipos"))
                    .avg("promedioEquiposPorLab", Expr::field("cantidadEquipos"))
                    .push(
                        "laboratorios",
                        Expr::record([
                            ("nombre", Expr::field("nombre")),
                            ("codigo", Expr::field("codigo")),
                            ("tipo", Expr::field("tipo")),
                            ("estado", Expr::field("estado")),
                            ("cantidadEquipos", Expr::field("cantidadEquipos")),
                            ("equiposDisponibles", Expr::field("equiposDisponibles")),
                            ("responsable", Expr::field("responsable")),
                            ("valorTotal", Expr::field("valorTotalEquipos")),
                        ]),
                    ),
            )
            .run(&session, Collection::Laboratories)
            .await?;

        let statistics = summary
            .first()
            .map(LaboratoryStatistics::from)
            .unwrap_or_default();
        tracing::info!(
            laboratories = statistics.total_laboratories,
            equipment = statistics.total_equipment,
            "Laboratory statistics generated"
        );
        Ok(statistics)
    }

    /// Equipment in maintenance, damaged, or old and never maintained
    pub async fn equipment_needing_attention(&self) -> AppResult<Vec<AttentionItem>> {
        self.equipment_needing_attention_at(Utc::now()).await
    }

    /// Attention report evaluated as of `now`
    pub async fn equipment_needing_attention_at(
        &self,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<AttentionItem>> {
        let threshold = Duration::try_days(self.settings.attention_age_days)
            .and_then(|age| now.checked_sub_signed(age))
            .ok_or_else(|| {
                AppError::BadRequest(format!(
                    "attention_age_days out of range: {}",
                    self.settings.attention_age_days
                ))
            })?;
        let filter = Filter::any(vec![
            Filter::eq("estado", EquipmentStatus::Maintenance),
            Filter::eq("estado", EquipmentStatus::Damaged),
            Filter::lt("fechaAdquisicion", bson::DateTime::from_chrono(threshold))
                .and(Filter::exists("historialMantenimiento.0", false)),
        ]);

        let session = self.repository.session("equipment_needing_attention").await?;
        let mut equipment = session
            .find(Collection::Equipment, &FindQuery::new(filter))
            .await?;

        Populate::laboratories("laboratorio")
            .select(["nombre", "codigo"])
            .resolve(&session, &mut equipment)
            .await?;
        Populate::users("usuarioAsignado")
            .select(["nombre", "apellido"])
            .resolve(&session, &mut equipment)
            .await?;

        tracing::info!(
            equipment = equipment.len(),
            threshold = %threshold,
            "Attention report generated"
        );
        Ok(equipment.iter().map(AttentionItem::from).collect())
    }

    /// Active and reachable users per role
    pub async fn activity_by_role(&self) -> AppResult<Vec<RoleActivity>> {
        let session = self.repository.session("activity_by_role").await?;
        let has_phone = Filter::exists("telefono", true).and(Filter::ne("telefono", Bson::Null));
        let rows = Pipeline::new()
            .group(
                Group::by(Expr::field("rol"))
                    .count("cantidad")
                    .sum(
                        "activos",
                        Expr::cond(Filter::eq("activo", true), Expr::lit(1), Expr::lit(0)),
                    )
                    .sum("conTelefono", Expr::cond(has_phone, Expr::lit(1), Expr::lit(0))),
            )
            .project([
                ("rol", Expr::field("_id")),
                ("cantidad", Expr::field("cantidad")),
                ("activos", Expr::field("activos")),
                (
                    "inactivos",
                    Expr::subtract(Expr::field("cantidad"), Expr::field("activos")),
                ),
                ("conTelefono", Expr::field("conTelefono")),
                (
                    "porcentajeActivos",
                    Expr::multiply(
                        Expr::divide(Expr::field("activos"), Expr::field("cantidad")),
                        Expr::lit(100.0),
                    ),
                ),
            ])
            .sort(SortSpec::new().desc("cantidad").asc("rol"))
            .run(&session, Collection::Users)
            .await?;

        tracing::info!(roles = rows.len(), "Activity by role generated");
        Ok(rows.iter().map(RoleActivity::from).collect())
    }

    /// Run every report concurrently; the first failure aborts the run
    pub async fn run_all(&self) -> AppResult<FullReport> {
        self.run_all_at(Utc::now()).await
    }

    /// Full report with the attention section evaluated as of `now`
    pub async fn run_all_at(&self, now: DateTime<Utc>) -> AppResult<FullReport> {
        let (
            users,
            available_laboratories,
            equipment_by_status,
            institutional_users,
            laboratory_statistics,
            equipment_needing_attention,
            activity_by_role,
        ) = tokio::try_join!(
            self.user_listing(),
            self.available_laboratories(),
            self.equipment_by_status(),
            self.institutional_users(),
            self.laboratory_statistics(),
            self.equipment_needing_attention_at(now),
            self.activity_by_role(),
        )?;

        Ok(FullReport {
            users,
            available_laboratories,
            equipment_by_status,
            institutional_users,
            laboratory_statistics,
            equipment_needing_attention,
            activity_by_role,
        })
    }
}
