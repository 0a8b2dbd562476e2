//! Fixture dataset used to (re)seed a store

use bson::{oid::ObjectId, DateTime};
use chrono::{NaiveDate, Utc};

use crate::models::{
    enums::{EquipmentStatus, EquipmentType, LabStatus, LabType, MaintenanceKind, Role},
    equipment::{Equipment, MaintenanceEntry, Specifications},
    laboratory::{Laboratory, Location, TimeWindow, WeeklySchedule},
    user::User,
};

/// Typed documents to load, already cross-linked by id
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub users: Vec<User>,
    pub laboratories: Vec<Laboratory>,
    pub equipment: Vec<Equipment>,
}

fn date(year: i32, month: u32, day: u32) -> DateTime {
    let midnight = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|d| d.and_utc())
        .unwrap_or_default();
    DateTime::from_chrono(midnight)
}

fn user(name: &str, surname: &str, email: &str, role: Role, national_id: &str, phone: &str) -> User {
    User {
        id: ObjectId::new(),
        name: name.to_string(),
        surname: surname.to_string(),
        email: email.to_lowercase(),
        role,
        national_id: national_id.to_string(),
        phone: Some(phone.to_string()),
        active: true,
        registered_at: DateTime::from_chrono(Utc::now()),
        assigned_laboratories: Vec::new(),
    }
}

#[allow(clippy::too_many_arguments)]
fn laboratory(
    name: &str,
    code: &str,
    location: (&str, i32, &str),
    capacity: i32,
    lab_type: LabType,
    status: LabStatus,
    responsible: ObjectId,
    schedule: WeeklySchedule,
) -> Laboratory {
    Laboratory {
        id: ObjectId::new(),
        name: name.to_string(),
        code: code.to_string(),
        location: Location {
            building: location.0.to_string(),
            floor: location.1,
            room: location.2.to_string(),
        },
        capacity,
        lab_type,
        status,
        schedule,
        responsible,
        equipment: Vec::new(),
        active: true,
    }
}

#[allow(clippy::too_many_arguments)]
fn equipment(
    name: &str,
    code: &str,
    equipment_type: EquipmentType,
    (brand, model, serial): (&str, &str, &str),
    status: EquipmentStatus,
    acquired_at: DateTime,
    value: f64,
    laboratory: ObjectId,
) -> Equipment {
    Equipment {
        id: ObjectId::new(),
        name: name.to_string(),
        code: code.to_string(),
        equipment_type,
        brand: brand.to_string(),
        model: model.to_string(),
        serial_number: Some(serial.to_string()),
        specifications: None,
        status,
        acquired_at,
        acquisition_value: Some(value),
        laboratory,
        assigned_user: None,
        maintenance_history: Vec::new(),
        active: true,
    }
}

/// The university dataset: five users, three laboratories and their equipment
pub fn university_dataset() -> Dataset {
    let users = vec![
        user("Juan Carlos", "Pérez García", "juan.perez@universidad.edu", Role::Professor, "1234567890", "0987654321"),
        user("María Elena", "González López", "maria.gonzalez@universidad.edu", Role::Administrator, "0987654321", "0912345678"),
        user("Carlos Alberto", "Rodríguez Sánchez", "carlos.rodriguez@estudiante.edu", Role::Student, "1122334455", "0923456789"),
        user("Ana Sofía", "Martínez Flores", "ana.martinez@universidad.edu", Role::Technician, "5544332211", "0934567890"),
        user("Diego Fernando", "Vásquez Torres", "diego.vasquez@estudiante.edu", Role::Student, "6677889900", "0945678901"),
    ];

    let laboratories = vec![
        laboratory(
            "Laboratorio de Informática 1",
            "LAB-001",
            ("Edificio A", 2, "A-201"),
            30,
            LabType::ComputerScience,
            LabStatus::Available,
            users[0].id,
            WeeklySchedule::weekdays(
                TimeWindow::new("08:00", "18:00"),
                Some(TimeWindow::new("08:00", "16:00")),
            ),
        ),
        laboratory(
            "Laboratorio de Física",
            "LAB-002",
            ("Edificio B", 1, "B-105"),
            25,
            LabType::Physics,
            LabStatus::Available,
            users[1].id,
            WeeklySchedule::weekdays(
                TimeWindow::new("07:00", "17:00"),
                Some(TimeWindow::new("07:00", "15:00")),
            ),
        ),
        laboratory(
            "Laboratorio de Electrónica",
            "LAB-003",
            ("Edificio C", 3, "C-301"),
            20,
            LabType::Electronics,
            LabStatus::Maintenance,
            users[3].id,
            WeeklySchedule::weekdays(TimeWindow::new("08:00", "16:00"), None),
        ),
    ];

    let mut pc = equipment(
        "Computadora HP EliteDesk",
        "PC-001",
        EquipmentType::Computer,
        ("HP", "EliteDesk 800 G5", "HP001234567"),
        EquipmentStatus::Available,
        date(2023, 1, 15),
        1200.0,
        laboratories[0].id,
    );
    pc.specifications = Some(Specifications {
        processor: Some("Intel Core i5-9500".into()),
        ram: Some("8GB DDR4".into()),
        storage: Some("256GB SSD".into()),
        operating_system: Some("Windows 11 Pro".into()),
        extras: Vec::new(),
    });

    let mut oscilloscope = equipment(
        "Osciloscopio Tektronix",
        "OSC-001",
        EquipmentType::Oscilloscope,
        ("Tektronix", "TBS1052B", "TEK555666777"),
        EquipmentStatus::Maintenance,
        date(2022, 11, 5),
        800.0,
        laboratories[2].id,
    );
    oscilloscope.maintenance_history.push(MaintenanceEntry {
        date: DateTime::from_chrono(Utc::now()),
        kind: MaintenanceKind::Preventive,
        description: "Calibración anual".into(),
        technician: Some(users[3].id),
        cost: Some(150.0),
    });

    let equipment = vec![
        pc,
        equipment(
            "Proyector BenQ",
            "PRY-001",
            EquipmentType::Projector,
            ("BenQ", "MX535", "BQ987654321"),
            EquipmentStatus::Available,
            date(2022, 8, 20),
            450.0,
            laboratories[0].id,
        ),
        equipment(
            "Microscopio Olympus",
            "MIC-001",
            EquipmentType::Microscope,
            ("Olympus", "CX23", "OLY123456789"),
            EquipmentStatus::Available,
            date(2023, 3, 10),
            2500.0,
            laboratories[1].id,
        ),
        oscilloscope,
        equipment(
            "Multímetro Fluke",
            "MUL-001",
            EquipmentType::Multimeter,
            ("Fluke", "117", "FLU888999000"),
            EquipmentStatus::Available,
            date(2023, 2, 28),
            180.0,
            laboratories[2].id,
        ),
    ];

    Dataset {
        users,
        laboratories,
        equipment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_is_cross_linked() {
        let dataset = university_dataset();
        assert_eq!(dataset.users.len(), 5);
        assert_eq!(dataset.laboratories.len(), 3);
        for item in &dataset.equipment {
            assert!(dataset.laboratories.iter().any(|lab| lab.id == item.laboratory));
        }
        for lab in &dataset.laboratories {
            assert!(dataset.users.iter().any(|u| u.id == lab.responsible));
        }
    }
}
