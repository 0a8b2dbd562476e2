//! Equipment model

use bson::{oid::ObjectId, DateTime, Document};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::{
    enums::{EquipmentStatus, EquipmentType, MaintenanceKind},
    text,
};

/// Hardware / software specification block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Specifications {
    #[serde(rename = "procesador", default, skip_serializing_if = "Option::is_none")]
    pub processor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ram: Option<String>,
    #[serde(rename = "almacenamiento", default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
    #[serde(rename = "sistemaOperativo", default, skip_serializing_if = "Option::is_none")]
    pub operating_system: Option<String>,
    #[serde(rename = "otros", default)]
    pub extras: Vec<String>,
}

/// One entry of the maintenance history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceEntry {
    #[serde(rename = "fecha")]
    pub date: DateTime,
    #[serde(rename = "tipo")]
    pub kind: MaintenanceKind,
    #[serde(rename = "descripcion", default)]
    pub description: String,
    #[serde(rename = "tecnico", default, skip_serializing_if = "Option::is_none")]
    pub technician: Option<ObjectId>,
    #[serde(rename = "costo", default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
}

/// Stored equipment document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(rename = "nombre")]
    pub name: String,
    /// Unique, uppercase
    #[serde(rename = "codigo")]
    pub code: String,
    #[serde(rename = "tipo")]
    pub equipment_type: EquipmentType,
    #[serde(rename = "marca")]
    pub brand: String,
    #[serde(rename = "modelo")]
    pub model: String,
    #[serde(rename = "numeroSerie", default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(rename = "especificaciones", default, skip_serializing_if = "Option::is_none")]
    pub specifications: Option<Specifications>,
    #[serde(rename = "estado", default)]
    pub status: EquipmentStatus,
    #[serde(rename = "fechaAdquisicion")]
    pub acquired_at: DateTime,
    #[serde(rename = "valorAdquisicion", default, skip_serializing_if = "Option::is_none")]
    pub acquisition_value: Option<f64>,
    /// Owning laboratory (required)
    #[serde(rename = "laboratorio")]
    pub laboratory: ObjectId,
    #[serde(rename = "usuarioAsignado", default, skip_serializing_if = "Option::is_none")]
    pub assigned_user: Option<ObjectId>,
    #[serde(rename = "historialMantenimiento", default)]
    pub maintenance_history: Vec<MaintenanceEntry>,
    #[serde(rename = "activo", default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

impl Equipment {
    pub fn full_description(&self) -> String {
        full_description(&self.brand, &self.model, &self.code)
    }
}

pub fn full_description(brand: &str, model: &str, code: &str) -> String {
    format!("{} {} - {}", brand, model, code)
}

/// Full description of a raw equipment document
pub fn full_description_of(doc: &Document) -> String {
    full_description(&text(doc, "marca"), &text(doc, "modelo"), &text(doc, "codigo"))
}

/// Create equipment request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEquipment {
    pub name: String,
    pub code: String,
    pub equipment_type: EquipmentType,
    pub brand: String,
    pub model: String,
    pub serial_number: Option<String>,
    pub specifications: Option<Specifications>,
    pub status: Option<EquipmentStatus>,
    pub acquired_at: chrono::DateTime<Utc>,
    pub acquisition_value: Option<f64>,
    pub laboratory: ObjectId,
    pub assigned_user: Option<ObjectId>,
}

impl CreateEquipment {
    /// Build the stored document, normalising the code to uppercase
    pub fn into_equipment(self, id: ObjectId) -> Equipment {
        Equipment {
            id,
            name: self.name.trim().to_string(),
            code: self.code.to_uppercase(),
            equipment_type: self.equipment_type,
            brand: self.brand.trim().to_string(),
            model: self.model.trim().to_string(),
            serial_number: self.serial_number,
            specifications: self.specifications,
            status: self.status.unwrap_or_default(),
            acquired_at: DateTime::from_chrono(self.acquired_at),
            acquisition_value: self.acquisition_value,
            laboratory: self.laboratory,
            assigned_user: self.assigned_user,
            maintenance_history: Vec::new(),
            active: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_full_description() {
        let d = doc! { "marca": "Fluke", "modelo": "117", "codigo": "MUL-001" };
        assert_eq!(full_description_of(&d), "Fluke 117 - MUL-001");
    }

    #[test]
    fn test_create_normalises_code() {
        let equipment = CreateEquipment {
            name: " Proyector Epson ".into(),
            code: "pry-002".into(),
            equipment_type: EquipmentType::Projector,
            brand: "Epson".into(),
            model: "X41".into(),
            serial_number: None,
            specifications: None,
            status: None,
            acquired_at: Utc::now(),
            acquisition_value: Some(600.0),
            laboratory: ObjectId::new(),
            assigned_user: None,
        }
        .into_equipment(ObjectId::new());
        assert_eq!(equipment.code, "PRY-002");
        assert_eq!(equipment.name, "Proyector Epson");
        assert_eq!(equipment.status, EquipmentStatus::Available);
        assert_eq!(equipment.full_description(), "Epson X41 - PRY-002");
    }
}
