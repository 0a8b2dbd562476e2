//! Laboratory model

use bson::{oid::ObjectId, Document};
use serde::{Deserialize, Serialize};

use super::{
    enums::{LabStatus, LabType},
    integer, text,
};

/// Building / floor / room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(rename = "edificio")]
    pub building: String,
    /// Floor, starting at 1
    #[serde(rename = "piso")]
    pub floor: i32,
    #[serde(rename = "aula")]
    pub room: String,
}

/// Opening window for one weekday ("HH:MM" strings)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    #[serde(rename = "inicio")]
    pub start: String,
    #[serde(rename = "fin")]
    pub end: String,
}

impl TimeWindow {
    pub fn new(start: &str, end: &str) -> Self {
        Self {
            start: start.to_string(),
            end: end.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeeklySchedule {
    #[serde(rename = "lunes", default, skip_serializing_if = "Option::is_none")]
    pub monday: Option<TimeWindow>,
    #[serde(rename = "martes", default, skip_serializing_if = "Option::is_none")]
    pub tuesday: Option<TimeWindow>,
    #[serde(rename = "miercoles", default, skip_serializing_if = "Option::is_none")]
    pub wednesday: Option<TimeWindow>,
    #[serde(rename = "jueves", default, skip_serializing_if = "Option::is_none")]
    pub thursday: Option<TimeWindow>,
    #[serde(rename = "viernes", default, skip_serializing_if = "Option::is_none")]
    pub friday: Option<TimeWindow>,
    #[serde(rename = "sabado", default, skip_serializing_if = "Option::is_none")]
    pub saturday: Option<TimeWindow>,
}

impl WeeklySchedule {
    /// Same window Monday to Thursday, a separate one on Friday
    pub fn weekdays(window: TimeWindow, friday: Option<TimeWindow>) -> Self {
        Self {
            monday: Some(window.clone()),
            tuesday: Some(window.clone()),
            wednesday: Some(window.clone()),
            thursday: Some(window),
            friday,
            saturday: None,
        }
    }
}

/// Stored laboratory document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Laboratory {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(rename = "nombre")]
    pub name: String,
    /// `LAB-###`
    #[serde(rename = "codigo")]
    pub code: String,
    #[serde(rename = "ubicacion")]
    pub location: Location,
    #[serde(rename = "capacidad")]
    pub capacity: i32,
    #[serde(rename = "tipo")]
    pub lab_type: LabType,
    #[serde(rename = "estado", default)]
    pub status: LabStatus,
    #[serde(rename = "horarioDisponible", default)]
    pub schedule: WeeklySchedule,
    /// Responsible user (required)
    #[serde(rename = "responsable")]
    pub responsible: ObjectId,
    /// Back-references maintained by the write path
    #[serde(rename = "equipos", default)]
    pub equipment: Vec<ObjectId>,
    #[serde(rename = "activo", default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

impl Laboratory {
    pub fn full_location(&self) -> String {
        full_location(
            &self.location.building,
            i64::from(self.location.floor),
            &self.location.room,
        )
    }
}

pub fn full_location(building: &str, floor: i64, room: &str) -> String {
    format!("{} - Piso {} - Aula {}", building, floor, room)
}

/// Full location of a raw laboratory document; missing parts render empty
pub fn full_location_of(doc: &Document) -> String {
    let empty = Document::new();
    let location = doc.get_document("ubicacion").unwrap_or(&empty);
    full_location(
        &text(location, "edificio"),
        integer(location, "piso"),
        &text(location, "aula"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_full_location() {
        let lab = doc! { "ubicacion": { "edificio": "Edificio A", "piso": 2, "aula": "A-201" } };
        assert_eq!(full_location_of(&lab), "Edificio A - Piso 2 - Aula A-201");
        assert_eq!(full_location_of(&doc! {}), " - Piso 0 - Aula ");
    }
}
