//! Report value objects
//!
//! Rows are built leniently from stored documents: a missing or mistyped
//! field falls back to an empty string or zero instead of failing the report.

use bson::{Bson, Document};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::{
    equipment::full_description_of, hex_id, integer, laboratory::full_location_of, number,
    optional_bool, optional_text, text, user::full_name_of,
};

/// User row of the listing and search reports
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct UserSummary {
    pub id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "apellido")]
    pub surname: String,
    #[serde(rename = "correo")]
    pub email: String,
    #[serde(rename = "rol")]
    pub role: String,
    #[serde(rename = "activo", skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(rename = "nombreCompleto")]
    pub full_name: String,
}

impl From<&Document> for UserSummary {
    fn from(doc: &Document) -> Self {
        Self {
            id: hex_id(doc),
            name: text(doc, "nombre"),
            surname: text(doc, "apellido"),
            email: text(doc, "correo"),
            role: text(doc, "rol"),
            active: optional_bool(doc, "activo"),
            full_name: full_name_of(doc),
        }
    }
}

/// Users report with its total
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct UserListing {
    pub total: usize,
    #[serde(rename = "usuarios")]
    pub users: Vec<UserSummary>,
}

impl UserListing {
    pub fn from_documents(documents: &[Document]) -> Self {
        let users: Vec<UserSummary> = documents.iter().map(UserSummary::from).collect();
        Self {
            total: users.len(),
            users,
        }
    }
}

/// Populated person reference (responsible or assigned user)
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PersonRef {
    pub id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "apellido")]
    pub surname: String,
    #[serde(rename = "correo", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "nombreCompleto")]
    pub full_name: String,
}

impl PersonRef {
    /// Read a populated reference; `None` when the reference did not resolve
    pub fn from_field(doc: &Document, key: &str) -> Option<Self> {
        doc.get_document(key).ok().map(|person| Self {
            id: hex_id(person),
            name: text(person, "nombre"),
            surname: text(person, "apellido"),
            email: optional_text(person, "correo"),
            full_name: full_name_of(person),
        })
    }
}

/// Equipment row attached to an available laboratory
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EquipmentSummary {
    pub id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "codigo")]
    pub code: String,
    #[serde(rename = "tipo")]
    pub equipment_type: String,
    #[serde(rename = "estado")]
    pub status: String,
}

impl From<&Document> for EquipmentSummary {
    fn from(doc: &Document) -> Self {
        Self {
            id: hex_id(doc),
            name: text(doc, "nombre"),
            code: text(doc, "codigo"),
            equipment_type: text(doc, "tipo"),
            status: text(doc, "estado"),
        }
    }
}

/// Available laboratory with its available equipment
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AvailableLaboratory {
    pub id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "codigo")]
    pub code: String,
    #[serde(rename = "ubicacionCompleta")]
    pub full_location: String,
    #[serde(rename = "responsable")]
    pub responsible: Option<PersonRef>,
    #[serde(rename = "equiposDisponibles")]
    pub available_count: usize,
    #[serde(rename = "equipos")]
    pub equipment: Vec<EquipmentSummary>,
}

impl From<&Document> for AvailableLaboratory {
    fn from(doc: &Document) -> Self {
        let equipment: Vec<EquipmentSummary> = subdocuments(doc, "equipos")
            .map(EquipmentSummary::from)
            .collect();
        Self {
            id: hex_id(doc),
            name: text(doc, "nombre"),
            code: text(doc, "codigo"),
            full_location: full_location_of(doc),
            responsible: PersonRef::from_field(doc, "responsable"),
            available_count: equipment.len(),
            equipment,
        }
    }
}

/// (name, code) pair collected into a status group
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EquipmentRef {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "codigo")]
    pub code: String,
}

/// Equipment count per status
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct StatusGroup {
    #[serde(rename = "estado")]
    pub status: String,
    #[serde(rename = "cantidad")]
    pub count: i64,
    #[serde(rename = "equipos")]
    pub equipment: Vec<EquipmentRef>,
}

impl From<&Document> for StatusGroup {
    fn from(doc: &Document) -> Self {
        Self {
            status: text(doc, "_id"),
            count: integer(doc, "cantidad"),
            equipment: subdocuments(doc, "equipos")
                .map(|e| EquipmentRef {
                    name: text(e, "nombre"),
                    code: text(e, "codigo"),
                })
                .collect(),
        }
    }
}

/// Per-laboratory line of the statistics report
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct LaboratoryDetail {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "codigo")]
    pub code: String,
    #[serde(rename = "tipo")]
    pub lab_type: String,
    #[serde(rename = "estado")]
    pub status: String,
    #[serde(rename = "cantidadEquipos")]
    pub equipment_count: i64,
    #[serde(rename = "equiposDisponibles")]
    pub available_count: i64,
    #[serde(rename = "responsable")]
    pub responsible: Option<PersonRef>,
    #[serde(rename = "valorTotal")]
    pub total_value: f64,
}

impl From<&Document> for LaboratoryDetail {
    fn from(doc: &Document) -> Self {
        Self {
            name: text(doc, "nombre"),
            code: text(doc, "codigo"),
            lab_type: text(doc, "tipo"),
            status: text(doc, "estado"),
            equipment_count: integer(doc, "cantidadEquipos"),
            available_count: integer(doc, "equiposDisponibles"),
            responsible: PersonRef::from_field(doc, "responsable"),
            total_value: number(doc, "valorTotal"),
        }
    }
}

/// Cross-collection summary over every laboratory
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct LaboratoryStatistics {
    #[serde(rename = "totalLaboratorios")]
    pub total_laboratories: i64,
    #[serde(rename = "totalEquipos")]
    pub total_equipment: i64,
    #[serde(rename = "promedioEquiposPorLab")]
    pub average_equipment_per_lab: f64,
    #[serde(rename = "laboratorios")]
    pub laboratories: Vec<LaboratoryDetail>,
}

impl From<&Document> for LaboratoryStatistics {
    fn from(doc: &Document) -> Self {
        Self {
            total_laboratories: integer(doc, "totalLaboratorios"),
            total_equipment: integer(doc, "totalEquipos"),
            average_equipment_per_lab: number(doc, "promedioEquiposPorLab"),
            laboratories: subdocuments(doc, "laboratorios")
                .map(LaboratoryDetail::from)
                .collect(),
        }
    }
}

/// Populated laboratory reference
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct LaboratoryRef {
    pub id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "codigo")]
    pub code: String,
}

/// Equipment that needs attention
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AttentionItem {
    pub id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "codigo")]
    pub code: String,
    #[serde(rename = "estado")]
    pub status: String,
    #[serde(rename = "informacionCompleta")]
    pub full_description: String,
    #[serde(rename = "fechaAdquisicion")]
    pub acquired_at: Option<DateTime<Utc>>,
    #[serde(rename = "laboratorio")]
    pub laboratory: Option<LaboratoryRef>,
    #[serde(rename = "usuarioAsignado")]
    pub assigned_user: Option<PersonRef>,
    #[serde(rename = "mantenimientos")]
    pub maintenance_count: usize,
}

impl From<&Document> for AttentionItem {
    fn from(doc: &Document) -> Self {
        Self {
            id: hex_id(doc),
            name: text(doc, "nombre"),
            code: text(doc, "codigo"),
            status: text(doc, "estado"),
            full_description: full_description_of(doc),
            acquired_at: doc.get_datetime("fechaAdquisicion").ok().map(|d| d.to_chrono()),
            laboratory: doc.get_document("laboratorio").ok().map(|lab| LaboratoryRef {
                id: hex_id(lab),
                name: text(lab, "nombre"),
                code: text(lab, "codigo"),
            }),
            assigned_user: PersonRef::from_field(doc, "usuarioAsignado"),
            maintenance_count: doc
                .get_array("historialMantenimiento")
                .map(|h| h.len())
                .unwrap_or(0),
        }
    }
}

/// User activity per role
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RoleActivity {
    #[serde(rename = "rol")]
    pub role: String,
    #[serde(rename = "cantidad")]
    pub count: i64,
    #[serde(rename = "activos")]
    pub active: i64,
    #[serde(rename = "inactivos")]
    pub inactive: i64,
    #[serde(rename = "conTelefono")]
    pub with_phone: i64,
    #[serde(rename = "porcentajeActivos")]
    pub active_percentage: f64,
}

impl From<&Document> for RoleActivity {
    fn from(doc: &Document) -> Self {
        Self {
            role: text(doc, "rol"),
            count: integer(doc, "cantidad"),
            active: integer(doc, "activos"),
            inactive: integer(doc, "inactivos"),
            with_phone: integer(doc, "conTelefono"),
            active_percentage: number(doc, "porcentajeActivos"),
        }
    }
}

/// Every report from a single run
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FullReport {
    #[serde(rename = "usuarios")]
    pub users: UserListing,
    #[serde(rename = "laboratoriosDisponibles")]
    pub available_laboratories: Vec<AvailableLaboratory>,
    #[serde(rename = "equiposPorEstado")]
    pub equipment_by_status: Vec<StatusGroup>,
    #[serde(rename = "usuariosInstitucionales")]
    pub institutional_users: UserListing,
    #[serde(rename = "estadisticas")]
    pub laboratory_statistics: LaboratoryStatistics,
    #[serde(rename = "equiposAtencion")]
    pub equipment_needing_attention: Vec<AttentionItem>,
    #[serde(rename = "actividadPorRol")]
    pub activity_by_role: Vec<RoleActivity>,
}

/// Embedded documents of an array field, skipping non-document elements
fn subdocuments<'a>(doc: &'a Document, key: &str) -> impl Iterator<Item = &'a Document> {
    doc.get_array(key)
        .map(|items| items.as_slice())
        .unwrap_or(&[])
        .iter()
        .filter_map(Bson::as_document)
}
