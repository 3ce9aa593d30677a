// models/src/medical/staff.rs
use serde::{Deserialize, Serialize};

use crate::identifiers::Identifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    #[serde(alias = "medecin")]
    Doctor,
    #[serde(alias = "secretaire")]
    Secretary,
}

/// Establishment staff. Doctors may work in several establishments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffMember {
    pub id: Identifier,
    pub display_name: String,
    pub role: StaffRole,
    #[serde(default)]
    pub establishment_ids: Vec<Identifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl StaffMember {
    pub fn new(id: Identifier, display_name: impl Into<String>, role: StaffRole) -> Self {
        StaffMember {
            id,
            display_name: display_name.into(),
            role,
            establishment_ids: Vec::new(),
            specialty: None,
            active: true,
        }
    }

    pub fn works_at(&self, establishment_id: &Identifier) -> bool {
        self.establishment_ids.iter().any(|id| id == establishment_id)
    }

    pub fn is_doctor(&self) -> bool {
        self.role == StaffRole::Doctor
    }
}
