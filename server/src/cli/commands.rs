// server/src/cli/commands.rs

// Command-line arguments and subcommands of the rendezvous CLI.
use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime};
use clap::{Args, Parser, Subcommand};
use models::schedule::{parse_date, parse_time};
use models::{AppointmentKind, AppointmentStatus, CreatorRole, EstablishmentKind, Identifier, StaffRole};
use serde::de::DeserializeOwned;

#[derive(Parser, Debug)]
#[command(name = "rendezvous-cli")]
#[command(version = "0.1.0")]
#[command(about = "Appointment lifecycle and migration tool")]
pub struct CliArgs {
    /// Path to the YAML config file.
    #[arg(long, short = 'c', global = true, env = "RENDEZVOUS_CONFIG")]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: RendezvousCommands,
}

#[derive(Debug, Subcommand, PartialEq)]
pub enum RendezvousCommands {
    /// Submit a new appointment demand
    Create(CreateArgs),
    /// Confirm a demand and assign its doctor
    Confirm {
        id: Identifier,
        #[arg(long)]
        doctor: Identifier,
        #[arg(long)]
        secretary: Identifier,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Move an appointment to a new date and time
    Reschedule {
        id: Identifier,
        #[arg(long, value_parser = date_arg)]
        date: NaiveDate,
        #[arg(long, value_parser = time_arg)]
        start: NaiveTime,
        #[arg(long, value_parser = time_arg)]
        end: NaiveTime,
        #[arg(long)]
        actor: String,
        #[arg(long)]
        reason: String,
    },
    /// Hand an appointment to another doctor
    Reassign {
        id: Identifier,
        #[arg(long)]
        doctor: Identifier,
        #[arg(long)]
        actor: String,
        #[arg(long)]
        reason: String,
    },
    Cancel {
        id: Identifier,
        #[arg(long)]
        actor: String,
        #[arg(long)]
        reason: Option<String>,
    },
    Complete {
        id: Identifier,
        #[arg(long)]
        doctor: Identifier,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Set a status directly, within the allowed transitions
    SetStatus {
        id: Identifier,
        status: AppointmentStatus,
        #[arg(long)]
        actor: String,
        #[arg(long)]
        reason: Option<String>,
    },
    Show {
        id: Identifier,
    },
    List(ListArgs),
    /// Repair legacy appointment records of one establishment
    Migrate {
        #[arg(long)]
        establishment: Identifier,
        #[arg(long, default_value = "migration")]
        actor: String,
    },
    Establishment(EstablishmentCommandWrapper),
    Staff(StaffCommandWrapper),
}

#[derive(Debug, Args, PartialEq)]
pub struct CreateArgs {
    #[arg(long)]
    pub patient: Identifier,
    #[arg(long)]
    pub establishment: Identifier,
    #[arg(long, value_parser = date_arg)]
    pub date: NaiveDate,
    #[arg(long, value_parser = time_arg)]
    pub start: Option<NaiveTime>,
    #[arg(long, value_parser = time_arg)]
    pub end: Option<NaiveTime>,
    #[arg(long, default_value = "")]
    pub motive: String,
    #[arg(long, default_value = "consultation")]
    pub kind: AppointmentKind,
    #[arg(long = "created-by", default_value = "patient")]
    pub created_by: CreatorRole,
    /// Id of the acting user, recorded in the creation entry
    #[arg(long)]
    pub actor: Option<Identifier>,
    #[arg(long)]
    pub doctor: Option<Identifier>,
    #[arg(long)]
    pub specialty: Option<String>,
}

#[derive(Debug, Args, PartialEq)]
#[group(required = true, multiple = false)]
pub struct ListArgs {
    #[arg(long)]
    pub establishment: Option<Identifier>,
    #[arg(long)]
    pub doctor: Option<Identifier>,
    /// Pending demands of this establishment
    #[arg(long, value_name = "ESTABLISHMENT")]
    pub pending: Option<Identifier>,
}

#[derive(Debug, Args, PartialEq)]
pub struct EstablishmentCommandWrapper {
    #[clap(subcommand)]
    pub command: EstablishmentAction,
}

#[derive(Debug, Subcommand, PartialEq)]
pub enum EstablishmentAction {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, value_parser = serde_arg::<EstablishmentKind>, default_value = "practice")]
        kind: EstablishmentKind,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    Validate {
        id: Identifier,
    },
    Reject {
        id: Identifier,
        #[arg(long)]
        reason: String,
    },
    List,
}

#[derive(Debug, Args, PartialEq)]
pub struct StaffCommandWrapper {
    #[clap(subcommand)]
    pub command: StaffAction,
}

#[derive(Debug, Subcommand, PartialEq)]
pub enum StaffAction {
    Add {
        id: Identifier,
        #[arg(long)]
        name: String,
        #[arg(long, value_parser = serde_arg::<StaffRole>)]
        role: StaffRole,
        #[arg(long = "establishment")]
        establishments: Vec<Identifier>,
        #[arg(long)]
        specialty: Option<String>,
    },
    List {
        #[arg(long)]
        establishment: Option<Identifier>,
    },
    Deactivate {
        id: Identifier,
    },
}

fn date_arg(value: &str) -> Result<NaiveDate, String> {
    parse_date(value).map_err(|e| e.to_string())
}

fn time_arg(value: &str) -> Result<NaiveTime, String> {
    parse_time(value).map_err(|e| e.to_string())
}

/// Parses an enum through its serde names and aliases.
fn serde_arg<T: DeserializeOwned>(value: &str) -> Result<T, String> {
    serde_json::from_value(serde_json::Value::String(value.trim().to_lowercase())).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(std::iter::once("rendezvous-cli").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn should_parse_create_with_defaults() {
        let args = parse(&["create", "--patient", "P1", "--establishment", "E1", "--date", "12/03/2024", "--start", "09:00", "--end", "9h30"]);
        match args.command {
            RendezvousCommands::Create(create) => {
                assert_eq!(create.date, NaiveDate::from_ymd_opt(2024, 3, 12).unwrap());
                assert_eq!(create.end, NaiveTime::from_hms_opt(9, 30, 0));
                assert_eq!(create.created_by, CreatorRole::Patient);
                assert_eq!(create.kind, AppointmentKind::Consultation);
                assert!(create.doctor.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn should_parse_status_aliases() {
        let args = parse(&["set-status", "rdv1", "annulé", "--actor", "S1"]);
        assert_eq!(
            args.command,
            RendezvousCommands::SetStatus {
                id: "rdv1".parse().unwrap(),
                status: AppointmentStatus::Cancelled,
                actor: "S1".to_string(),
                reason: None,
            }
        );
    }

    #[test]
    fn should_require_one_list_filter() {
        assert!(CliArgs::try_parse_from(["rendezvous-cli", "list"]).is_err());
        assert!(CliArgs::try_parse_from(["rendezvous-cli", "list", "--doctor", "D1", "--pending", "E1"]).is_err());
        let args = parse(&["list", "--pending", "E1"]);
        assert!(matches!(args.command, RendezvousCommands::List(ListArgs { pending: Some(_), .. })));
    }

    #[test]
    fn should_parse_staff_roles_through_serde_aliases() {
        let args = parse(&["staff", "add", "D1", "--name", "Dr Kane", "--role", "medecin", "--establishment", "E1", "--establishment", "E2"]);
        match args.command {
            RendezvousCommands::Staff(StaffCommandWrapper { command: StaffAction::Add { role, establishments, .. } }) => {
                assert_eq!(role, StaffRole::Doctor);
                assert_eq!(establishments.len(), 2);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn should_reject_identifier_with_separator() {
        assert!(CliArgs::try_parse_from(["rendezvous-cli", "show", "a/b"]).is_err());
    }
}
