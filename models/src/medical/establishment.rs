// models/src/medical/establishment.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identifiers::Identifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstablishmentKind {
    #[serde(alias = "hopital")]
    Hospital,
    #[serde(alias = "clinique")]
    Clinic,
    #[default]
    #[serde(alias = "cabinet")]
    Practice,
}

/// Validation gate for an establishment's secretary workflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    #[default]
    Pending,
    Validated,
    Rejected,
}

/// A healthcare facility (hospital, clinic or practice).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Establishment {
    pub id: Identifier,
    pub name: String,
    #[serde(default)]
    pub kind: EstablishmentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub validation_status: ValidationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Establishment {
    pub fn new(name: impl Into<String>, kind: EstablishmentKind) -> Self {
        let now = Utc::now();
        Establishment {
            id: Identifier::generate(),
            name: name.into(),
            kind,
            address: None,
            phone: None,
            validation_status: ValidationStatus::Pending,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_validated(&self) -> bool {
        self.validation_status == ValidationStatus::Validated
    }
}
