// models/src/medical/status.rs

//! Canonical vocabularies for appointment documents.
//!
//! Records written over the years use two status vocabularies (a short form
//! such as `confirm` and a suffixed form such as `confirmed`) plus French
//! spellings. Decoding folds all of them into one enum; encoding always
//! writes the canonical suffixed form.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::ValidationError;

/// Lowercases, folds French accents and unifies separators.
pub(crate) fn fold_token(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'à' | 'â' => 'a',
            'ï' | 'î' => 'i',
            'ô' => 'o',
            'ù' | 'û' => 'u',
            ' ' | '-' => '_',
            other => other,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Rescheduled,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 5] = [
        AppointmentStatus::Pending,
        AppointmentStatus::Confirmed,
        AppointmentStatus::Rescheduled,
        AppointmentStatus::Cancelled,
        AppointmentStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Rescheduled => "rescheduled",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match fold_token(s).as_str() {
            "pending" | "en_attente" | "attente" => Ok(AppointmentStatus::Pending),
            "confirmed" | "confirm" | "confirme" => Ok(AppointmentStatus::Confirmed),
            "rescheduled" | "reschedule" | "report" | "reporte" => Ok(AppointmentStatus::Rescheduled),
            "cancelled" | "canceled" | "cancel" | "annule" => Ok(AppointmentStatus::Cancelled),
            "completed" | "complete" | "termine" | "done" => Ok(AppointmentStatus::Completed),
            _ => Err(ValidationError::UnknownStatus(s.to_string())),
        }
    }
}

impl Serialize for AppointmentStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AppointmentStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Kind of encounter requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AppointmentKind {
    #[default]
    Consultation,
    Urgency,
    FollowUp,
}

impl AppointmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentKind::Consultation => "consultation",
            AppointmentKind::Urgency => "urgency",
            AppointmentKind::FollowUp => "follow_up",
        }
    }
}

impl fmt::Display for AppointmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match fold_token(s).as_str() {
            "consultation" => Ok(AppointmentKind::Consultation),
            "urgency" | "urgence" | "emergency" => Ok(AppointmentKind::Urgency),
            "follow_up" | "followup" | "suivi" => Ok(AppointmentKind::FollowUp),
            _ => Err(ValidationError::UnknownKind(s.to_string())),
        }
    }
}

impl Serialize for AppointmentKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AppointmentKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Who created the appointment demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreatorRole {
    #[default]
    Patient,
    #[serde(alias = "secretaire", alias = "secrétaire")]
    Secretary,
}

impl fmt::Display for CreatorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CreatorRole::Patient => f.write_str("patient"),
            CreatorRole::Secretary => f.write_str("secretary"),
        }
    }
}

impl FromStr for CreatorRole {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match fold_token(s).as_str() {
            "patient" => Ok(CreatorRole::Patient),
            "secretary" | "secretaire" => Ok(CreatorRole::Secretary),
            _ => Err(ValidationError::UnknownRole(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_fold_both_status_vocabularies() {
        assert_eq!("confirm".parse::<AppointmentStatus>().unwrap(), AppointmentStatus::Confirmed);
        assert_eq!("confirmed".parse::<AppointmentStatus>().unwrap(), AppointmentStatus::Confirmed);
        assert_eq!("Annulé".parse::<AppointmentStatus>().unwrap(), AppointmentStatus::Cancelled);
        assert_eq!("canceled".parse::<AppointmentStatus>().unwrap(), AppointmentStatus::Cancelled);
        assert_eq!("en attente".parse::<AppointmentStatus>().unwrap(), AppointmentStatus::Pending);
        assert_eq!("reporté".parse::<AppointmentStatus>().unwrap(), AppointmentStatus::Rescheduled);
        assert_eq!("complete".parse::<AppointmentStatus>().unwrap(), AppointmentStatus::Completed);
    }

    #[test]
    fn should_reject_unknown_status() {
        let err = "archived".parse::<AppointmentStatus>().unwrap_err();
        assert_eq!(err, ValidationError::UnknownStatus("archived".to_string()));
    }

    #[test]
    fn should_write_canonical_status() {
        let legacy: AppointmentStatus = serde_json::from_str("\"cancel\"").unwrap();
        assert_eq!(serde_json::to_string(&legacy).unwrap(), "\"cancelled\"");
    }

    #[test]
    fn should_parse_kind_aliases() {
        assert_eq!("urgence".parse::<AppointmentKind>().unwrap(), AppointmentKind::Urgency);
        assert_eq!("suivi".parse::<AppointmentKind>().unwrap(), AppointmentKind::FollowUp);
        assert_eq!(serde_json::to_string(&AppointmentKind::FollowUp).unwrap(), "\"follow_up\"");
    }

    #[test]
    fn should_parse_creator_role() {
        assert_eq!("Secrétaire".parse::<CreatorRole>().unwrap(), CreatorRole::Secretary);
        let role: CreatorRole = serde_json::from_str("\"secretaire\"").unwrap();
        assert_eq!(role, CreatorRole::Secretary);
    }
}
