//! Data models for LabTrack

pub mod enums;
pub mod equipment;
pub mod laboratory;
pub mod report;
pub mod user;

use bson::{Bson, Document};

// Re-export commonly used types
pub use enums::{EquipmentStatus, EquipmentType, LabStatus, LabType, MaintenanceKind, Role};
pub use equipment::{CreateEquipment, Equipment};
pub use laboratory::Laboratory;
pub use user::User;

// Lenient field accessors for documents that may be projected or malformed.

pub(crate) fn text(doc: &Document, key: &str) -> String {
    doc.get_str(key).unwrap_or_default().to_string()
}

pub(crate) fn optional_text(doc: &Document, key: &str) -> Option<String> {
    doc.get_str(key).ok().map(str::to_string)
}

pub(crate) fn optional_bool(doc: &Document, key: &str) -> Option<bool> {
    doc.get_bool(key).ok()
}

pub(crate) fn integer(doc: &Document, key: &str) -> i64 {
    match doc.get(key) {
        Some(Bson::Int32(v)) => i64::from(*v),
        Some(Bson::Int64(v)) => *v,
        Some(Bson::Double(v)) => *v as i64,
        _ => 0,
    }
}

pub(crate) fn number(doc: &Document, key: &str) -> f64 {
    doc.get(key)
        .and_then(crate::query::path::as_f64)
        .unwrap_or(0.0)
}

pub(crate) fn hex_id(doc: &Document) -> String {
    doc.get_object_id("_id")
        .map(|id| id.to_hex())
        .unwrap_or_default()
}
