// server/src/cli/handlers.rs

use anyhow::{Context, Result};
use log::{debug, info};
use models::{AppointmentDemand, Establishment, StaffMember};
use rendezvous::storage_engine::StorageEngine as _;
use rendezvous::{AppConfig, AppointmentService, Database, Directory};
use serde::Serialize;
use serde_json::Value;

use super::commands::{
    CreateArgs, EstablishmentAction, ListArgs, RendezvousCommands, StaffAction,
};

/// Everything a command needs, opened once per invocation.
#[derive(Debug, Clone)]
pub struct CliContext {
    pub appointments: AppointmentService,
    pub directory: Directory,
}

impl CliContext {
    pub async fn open(config: &AppConfig) -> Result<Self> {
        let db = Database::new(&config.storage)
            .await
            .with_context(|| format!("opening storage at {:?}", config.storage.data_directory))?
            .with_max_retries(config.lifecycle.max_transaction_retries);
        debug!("Storage engine: {}", db.storage().get_type());
        Ok(Self::with_database(db))
    }

    pub fn with_database(db: Database) -> Self {
        CliContext {
            appointments: AppointmentService::new(db.clone()),
            directory: Directory::new(db),
        }
    }
}

/// Runs one command and prints its result as JSON.
pub async fn handle_command(context: &CliContext, command: RendezvousCommands) -> Result<()> {
    let output = execute(context, command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    context.appointments.database().flush().await?;
    Ok(())
}

pub async fn execute(context: &CliContext, command: RendezvousCommands) -> Result<Value> {
    let service = &context.appointments;
    match command {
        RendezvousCommands::Create(args) => to_json(service.create_demand(demand_from(args)).await?),
        RendezvousCommands::Confirm { id, doctor, secretary, notes } => {
            to_json(service.confirm_and_assign(&id, &doctor, &secretary, notes).await?)
        }
        RendezvousCommands::Reschedule { id, date, start, end, actor, reason } => {
            to_json(service.reschedule(&id, date, start, end, &actor, &reason).await?)
        }
        RendezvousCommands::Reassign { id, doctor, actor, reason } => {
            to_json(service.reassign_doctor(&id, &doctor, &actor, &reason).await?)
        }
        RendezvousCommands::Cancel { id, actor, reason } => to_json(service.cancel(&id, &actor, reason).await?),
        RendezvousCommands::Complete { id, doctor, notes } => to_json(service.complete(&id, &doctor, notes).await?),
        RendezvousCommands::SetStatus { id, status, actor, reason } => {
            to_json(service.update_status(&id, status, &actor, reason).await?)
        }
        RendezvousCommands::Show { id } => to_json(service.get(&id).await?),
        RendezvousCommands::List(args) => handle_list(service, args).await,
        RendezvousCommands::Migrate { establishment, actor } => {
            let report = service.run_migration(&establishment, &actor).await?;
            if report.is_noop() {
                info!("Nothing to migrate for establishment {}", establishment);
            }
            to_json(report)
        }
        RendezvousCommands::Establishment(wrapper) => handle_establishment(&context.directory, wrapper.command).await,
        RendezvousCommands::Staff(wrapper) => handle_staff(&context.directory, wrapper.command).await,
    }
}

fn demand_from(args: CreateArgs) -> AppointmentDemand {
    AppointmentDemand {
        patient_id: args.patient,
        establishment_id: args.establishment,
        date: args.date,
        start_time: args.start,
        end_time: args.end,
        motive: args.motive,
        kind: args.kind,
        created_by: args.created_by,
        doctor_id: args.doctor,
        specialty: args.specialty,
        created_by_id: args.actor,
    }
}

async fn handle_list(service: &AppointmentService, args: ListArgs) -> Result<Value> {
    let appointments = match (args.establishment, args.doctor, args.pending) {
        (Some(establishment), _, _) => service.list_by_establishment(&establishment).await?,
        (_, Some(doctor), _) => service.list_by_doctor(&doctor).await?,
        (_, _, Some(establishment)) => service.list_pending(&establishment).await?,
        (None, None, None) => anyhow::bail!("list needs --establishment, --doctor or --pending"),
    };
    to_json(appointments)
}

async fn handle_establishment(directory: &Directory, action: EstablishmentAction) -> Result<Value> {
    match action {
        EstablishmentAction::Add { name, kind, address, phone } => {
            let mut establishment = Establishment::new(name, kind);
            establishment.address = address;
            establishment.phone = phone;
            to_json(directory.add_establishment(establishment).await?)
        }
        EstablishmentAction::Validate { id } => to_json(directory.validate_establishment(&id).await?),
        EstablishmentAction::Reject { id, reason } => to_json(directory.reject_establishment(&id, &reason).await?),
        EstablishmentAction::List => to_json(directory.list_establishments().await?),
    }
}

async fn handle_staff(directory: &Directory, action: StaffAction) -> Result<Value> {
    match action {
        StaffAction::Add { id, name, role, establishments, specialty } => {
            let mut member = StaffMember::new(id, name, role);
            member.establishment_ids = establishments;
            member.specialty = specialty;
            to_json(directory.add_staff(member).await?)
        }
        StaffAction::List { establishment } => to_json(directory.list_staff(establishment.as_ref()).await?),
        StaffAction::Deactivate { id } => to_json(directory.set_staff_active(&id, false).await?),
    }
}

fn to_json<T: Serialize>(value: T) -> Result<Value> {
    serde_json::to_value(value).context("encoding command output")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::CliArgs;
    use clap::Parser;
    use rendezvous::StorageConfig;

    async fn memory_context() -> CliContext {
        let config = AppConfig {
            storage: StorageConfig::in_memory(),
            ..AppConfig::default()
        };
        CliContext::open(&config).await.unwrap()
    }

    async fn run(context: &CliContext, args: &[&str]) -> Result<Value> {
        let parsed = CliArgs::try_parse_from(std::iter::once("rendezvous-cli").chain(args.iter().copied()))?;
        execute(context, parsed.command).await
    }

    #[tokio::test]
    async fn should_drive_a_demand_through_the_cli() {
        let context = memory_context().await;
        let created = run(&context, &["create", "--patient", "P1", "--establishment", "E1", "--date", "2024-03-12"])
            .await
            .unwrap();
        assert_eq!(created["status"], "pending");
        let id = created["id"].as_str().unwrap().to_string();

        let confirmed = run(&context, &["confirm", &id, "--doctor", "D1", "--secretary", "S1"]).await.unwrap();
        assert_eq!(confirmed["status"], "confirmed");
        assert_eq!(confirmed["doctor_id"], "D1");

        let listed = run(&context, &["list", "--doctor", "D1"]).await.unwrap();
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let err = run(&context, &["set-status", &id, "pending", "--actor", "S1"]).await.unwrap_err();
        assert!(err.to_string().contains("not allowed"));
    }

    #[tokio::test]
    async fn should_report_noop_migration() {
        let context = memory_context().await;
        run(&context, &["staff", "add", "D1", "--name", "Dr Kane", "--role", "doctor", "--establishment", "E1"])
            .await
            .unwrap();
        let report = run(&context, &["migrate", "--establishment", "E1"]).await.unwrap();
        assert_eq!(report["changed"], 0);
        assert_eq!(report["scanned"], 0);
    }

    #[tokio::test]
    async fn should_manage_establishments() {
        let context = memory_context().await;
        let added = run(&context, &["establishment", "add", "--name", "Cabinet Médical", "--kind", "cabinet"])
            .await
            .unwrap();
        assert_eq!(added["kind"], "practice");
        let id = added["id"].as_str().unwrap().to_string();
        let rejected = run(&context, &["establishment", "reject", &id, "--reason", "incomplete file"]).await.unwrap();
        assert_eq!(rejected["validation_status"], "rejected");
        let listed = run(&context, &["establishment", "list"]).await.unwrap();
        assert_eq!(listed.as_array().unwrap().len(), 1);
    }
}
