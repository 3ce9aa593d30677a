// models/src/medical/appointment.rs

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::identifiers::Identifier;
use crate::medical::history::HistoryEntry;
use crate::medical::status::{AppointmentKind, AppointmentStatus, CreatorRole};
use crate::schedule::{self, format_time};

/// Input for a new appointment demand, as submitted by a patient or a
/// secretary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentDemand {
    pub patient_id: Identifier,
    pub establishment_id: Identifier,
    #[serde(with = "crate::schedule::date")]
    pub date: NaiveDate,
    #[serde(with = "crate::schedule::optional_time")]
    pub start_time: Option<NaiveTime>,
    #[serde(with = "crate::schedule::optional_time")]
    pub end_time: Option<NaiveTime>,
    pub motive: String,
    pub kind: AppointmentKind,
    pub created_by: CreatorRole,
    #[serde(default)]
    pub doctor_id: Option<Identifier>,
    #[serde(default)]
    pub specialty: Option<String>,
    /// Acting user recorded in the creation entry. Falls back to the
    /// patient for patient demands.
    #[serde(default)]
    pub created_by_id: Option<Identifier>,
}

impl AppointmentDemand {
    pub fn actor(&self) -> String {
        match (&self.created_by_id, self.created_by) {
            (Some(id), _) => id.to_string(),
            (None, CreatorRole::Patient) => self.patient_id.to_string(),
            (None, CreatorRole::Secretary) => CreatorRole::Secretary.to_string(),
        }
    }
}

/// Stored appointment ("rendez-vous") document.
///
/// Field names follow the stored layout. Legacy documents may lack
/// `establishment_id` or the structured time fields (carrying a combined
/// `time_slot` instead); the migration sweep repairs those.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Identifier,
    pub patient_id: Identifier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub establishment_id: Option<Identifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_id: Option<Identifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_doctor_id: Option<Identifier>,
    #[serde(rename = "date_rdv", alias = "date_rendez_vous", with = "crate::schedule::date")]
    pub date: NaiveDate,
    #[serde(default, with = "crate::schedule::optional_time", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, with = "crate::schedule::optional_time", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_slot: Option<String>,
    #[serde(default)]
    pub motive: String,
    #[serde(default)]
    pub kind: AppointmentKind,
    pub status: AppointmentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    #[serde(default)]
    pub created_by: CreatorRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secretary_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_notes: Option<String>,
    #[serde(default, alias = "historique_modifications")]
    pub history: Vec<HistoryEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Appointment {
    /// Builds the initial document for a demand. The caller decides the
    /// status and whether the demand's doctor becomes the assignment.
    pub fn from_demand(
        id: Identifier,
        demand: AppointmentDemand,
        status: AppointmentStatus,
        assigned_doctor: Option<Identifier>,
    ) -> Self {
        let now = Utc::now();
        let preferred_doctor_id = match assigned_doctor {
            Some(_) => None,
            None => demand.doctor_id,
        };
        Appointment {
            id,
            patient_id: demand.patient_id,
            establishment_id: Some(demand.establishment_id),
            doctor_id: assigned_doctor,
            preferred_doctor_id,
            date: demand.date,
            start_time: demand.start_time,
            end_time: demand.end_time,
            time_slot: None,
            motive: demand.motive,
            kind: demand.kind,
            status,
            specialty: demand.specialty,
            created_by: demand.created_by,
            secretary_notes: None,
            doctor_notes: None,
            history: Vec::new(),
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    pub fn belongs_to(&self, establishment_id: &Identifier) -> bool {
        self.establishment_id.as_ref() == Some(establishment_id)
    }

    /// Date and times as recorded in history entries.
    pub fn schedule_value(&self) -> Value {
        json!({
            "date": self.date.format(schedule::DATE_FORMAT).to_string(),
            "start_time": self.start_time.as_ref().map(format_time),
            "end_time": self.end_time.as_ref().map(format_time),
        })
    }

    pub fn record(&mut self, entry: HistoryEntry) {
        self.updated_at = Some(entry.timestamp);
        self.history.push(entry);
    }

    pub fn last_history_entry(&self) -> Option<&HistoryEntry> {
        self.history.last()
    }
}
