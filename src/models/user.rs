//! User model

use bson::{oid::ObjectId, DateTime, Document};
use serde::{Deserialize, Serialize};

use super::{enums::Role, text};

/// Stored user document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "apellido")]
    pub surname: String,
    /// Unique, stored lowercase
    #[serde(rename = "correo")]
    pub email: String,
    #[serde(rename = "rol", default)]
    pub role: Role,
    /// National id (10 digits, unique)
    #[serde(rename = "cedula")]
    pub national_id: String,
    #[serde(rename = "telefono", default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(rename = "activo", default = "default_true")]
    pub active: bool,
    #[serde(rename = "fechaRegistro")]
    pub registered_at: DateTime,
    #[serde(rename = "laboratoriosAsignados", default)]
    pub assigned_laboratories: Vec<ObjectId>,
}

fn default_true() -> bool {
    true
}

impl User {
    pub fn full_name(&self) -> String {
        full_name(&self.name, &self.surname)
    }
}

/// "nombre apellido", skipping whichever part is empty
pub fn full_name(name: &str, surname: &str) -> String {
    match (name.is_empty(), surname.is_empty()) {
        (false, false) => format!("{} {}", name, surname),
        (false, true) => name.to_string(),
        (true, _) => surname.to_string(),
    }
}

/// Full name of a raw (possibly projected or malformed) user document
pub fn full_name_of(doc: &Document) -> String {
    full_name(&text(doc, "nombre"), &text(doc, "apellido"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_full_name() {
        assert_eq!(full_name("Ana Sofía", "Martínez Flores"), "Ana Sofía Martínez Flores");
        assert_eq!(full_name_of(&doc! { "apellido": "Pérez" }), "Pérez");
        assert_eq!(full_name_of(&doc! {}), "");
    }

    #[test]
    fn test_roundtrip_uses_stored_field_names() {
        let user = User {
            id: ObjectId::new(),
            name: "Juan".into(),
            surname: "Pérez".into(),
            email: "juan@universidad.edu".into(),
            role: Role::Professor,
            national_id: "1234567890".into(),
            phone: None,
            active: true,
            registered_at: DateTime::now(),
            assigned_laboratories: vec![],
        };
        let stored = bson::to_document(&user).unwrap();
        assert_eq!(stored.get_str("rol").unwrap(), "profesor");
        assert!(!stored.contains_key("telefono"));
        let back: User = bson::from_document(stored).unwrap();
        assert_eq!(back, user);
    }
}
