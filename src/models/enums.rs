//! Shared domain enums (stored as their lowercase Spanish slugs)

use bson::Bson;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

macro_rules! slug_enum {
    ($name:ident { $($variant:ident => $slug:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $slug,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl From<$name> for Bson {
            fn from(value: $name) -> Self {
                Bson::String(value.as_str().to_string())
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum Role {
    #[default]
    #[serde(rename = "estudiante")]
    Student,
    #[serde(rename = "profesor")]
    Professor,
    #[serde(rename = "administrador")]
    Administrator,
    #[serde(rename = "tecnico")]
    Technician,
}

slug_enum!(Role {
    Student => "estudiante",
    Professor => "profesor",
    Administrator => "administrador",
    Technician => "tecnico",
});

// ---------------------------------------------------------------------------
// Laboratory
// ---------------------------------------------------------------------------

/// Laboratory domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum LabType {
    #[serde(rename = "informatica")]
    ComputerScience,
    #[serde(rename = "fisica")]
    Physics,
    #[serde(rename = "quimica")]
    Chemistry,
    #[serde(rename = "biologia")]
    Biology,
    #[serde(rename = "electronica")]
    Electronics,
}

slug_enum!(LabType {
    ComputerScience => "informatica",
    Physics => "fisica",
    Chemistry => "quimica",
    Biology => "biologia",
    Electronics => "electronica",
});

/// Laboratory operating status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum LabStatus {
    #[default]
    #[serde(rename = "disponible")]
    Available,
    #[serde(rename = "ocupado")]
    Occupied,
    #[serde(rename = "mantenimiento")]
    Maintenance,
    #[serde(rename = "fuera_servicio")]
    OutOfService,
}

slug_enum!(LabStatus {
    Available => "disponible",
    Occupied => "ocupado",
    Maintenance => "mantenimiento",
    OutOfService => "fuera_servicio",
});

// ---------------------------------------------------------------------------
// Equipment
// ---------------------------------------------------------------------------

/// Equipment category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum EquipmentType {
    #[serde(rename = "computadora")]
    Computer,
    #[serde(rename = "proyector")]
    Projector,
    #[serde(rename = "impresora")]
    Printer,
    #[serde(rename = "scanner")]
    Scanner,
    #[serde(rename = "microscopio")]
    Microscope,
    #[serde(rename = "osciloscopio")]
    Oscilloscope,
    #[serde(rename = "multimetro")]
    Multimeter,
    #[serde(rename = "otro")]
    Other,
}

slug_enum!(EquipmentType {
    Computer => "computadora",
    Projector => "proyector",
    Printer => "impresora",
    Scanner => "scanner",
    Microscope => "microscopio",
    Oscilloscope => "osciloscopio",
    Multimeter => "multimetro",
    Other => "otro",
});

/// Equipment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum EquipmentStatus {
    #[default]
    #[serde(rename = "disponible")]
    Available,
    #[serde(rename = "en_uso")]
    InUse,
    #[serde(rename = "mantenimiento")]
    Maintenance,
    #[serde(rename = "dañado")]
    Damaged,
    #[serde(rename = "fuera_servicio")]
    OutOfService,
}

slug_enum!(EquipmentStatus {
    Available => "disponible",
    InUse => "en_uso",
    Maintenance => "mantenimiento",
    Damaged => "dañado",
    OutOfService => "fuera_servicio",
});

/// Kind of maintenance intervention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum MaintenanceKind {
    #[serde(rename = "preventivo")]
    Preventive,
    #[serde(rename = "correctivo")]
    Corrective,
    #[serde(rename = "calibracion")]
    Calibration,
}

slug_enum!(MaintenanceKind {
    Preventive => "preventivo",
    Corrective => "correctivo",
    Calibration => "calibracion",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugs_match_serde_names() {
        let encoded = bson::to_bson(&EquipmentStatus::Damaged).unwrap();
        assert_eq!(encoded, Bson::from(EquipmentStatus::Damaged));
        assert_eq!(EquipmentStatus::Damaged.as_str(), "dañado");
        assert_eq!(Role::Technician.to_string(), "tecnico");
    }
}
