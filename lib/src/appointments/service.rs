// lib/src/appointments/service.rs

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use log::info;
use models::errors::{RendezvousResult, ValidationError, ValidationResult};
use models::schedule::format_time;
use models::{
    Appointment, AppointmentDemand, AppointmentStatus, CreatorRole, HistoryAction, HistoryEntry, Identifier,
};
use serde_json::{json, Value};

use super::migration::{self, MigrationReport};
use super::notifications::{dispatch, AppointmentEvent, AppointmentNotifier, LogNotifier};
use super::transitions::check_transition;
use crate::database::{Database, APPOINTMENTS};

/// Appointment lifecycle operations over the `appointments` collection.
///
/// Every mutation is a single optimistic read-modify-write that checks the
/// transition table against the freshly read status and appends exactly one
/// history entry.
#[derive(Debug, Clone)]
pub struct AppointmentService {
    db: Database,
    notifier: Arc<dyn AppointmentNotifier>,
}

impl AppointmentService {
    pub fn new(db: Database) -> Self {
        Self::with_notifier(db, Arc::new(LogNotifier))
    }

    pub fn with_notifier(db: Database, notifier: Arc<dyn AppointmentNotifier>) -> Self {
        AppointmentService { db, notifier }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Stores a new demand. A secretary naming a doctor books it directly
    /// as `confirmed`; every other demand waits as `pending` with no doctor.
    pub async fn create_demand(&self, demand: AppointmentDemand) -> RendezvousResult<Appointment> {
        validate_range(demand.start_time, demand.end_time)?;
        let actor = demand.actor();
        let (status, assigned_doctor) = match (demand.created_by, &demand.doctor_id) {
            (CreatorRole::Secretary, Some(doctor_id)) => (AppointmentStatus::Confirmed, Some(doctor_id.clone())),
            _ => (AppointmentStatus::Pending, None),
        };

        let mut appointment = Appointment::from_demand(Identifier::generate(), demand, status, assigned_doctor);
        appointment.record(
            HistoryEntry::new(HistoryAction::Creation, actor).with_values(None, Some(json!(status.as_str()))),
        );
        self.db
            .insert_new(APPOINTMENTS, appointment.id.as_str(), &appointment)
            .await?;

        info!(
            "Created appointment {} for patient {} as {}",
            appointment.id, appointment.patient_id, appointment.status
        );
        dispatch(
            self.notifier.as_ref(),
            AppointmentEvent::from_appointment(&appointment, HistoryAction::Creation),
        )
        .await;
        Ok(appointment)
    }

    pub async fn confirm_and_assign(
        &self,
        id: &Identifier,
        doctor_id: &Identifier,
        secretary_id: &Identifier,
        notes: Option<String>,
    ) -> RendezvousResult<Appointment> {
        let notes = non_blank(notes);
        self.mutate(id, HistoryAction::Confirmation, |appointment| {
            check_transition(appointment.status, AppointmentStatus::Confirmed)?;
            let entry = HistoryEntry::new(HistoryAction::Confirmation, secretary_id.as_str()).with_values(
                Some(json!({ "status": appointment.status.as_str(), "doctor_id": doctor_value(&appointment.doctor_id) })),
                Some(json!({ "status": AppointmentStatus::Confirmed.as_str(), "doctor_id": doctor_id.as_str() })),
            );
            appointment.doctor_id = Some(doctor_id.clone());
            appointment.status = AppointmentStatus::Confirmed;
            if let Some(notes) = &notes {
                appointment.secretary_notes = Some(notes.clone());
            }
            appointment.record(entry);
            Ok(())
        })
        .await
    }

    /// Moves the appointment to a new date and time. Any legacy `time_slot`
    /// is dropped since the structured fields now hold the schedule.
    pub async fn reschedule(
        &self,
        id: &Identifier,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
        actor: &str,
        reason: &str,
    ) -> RendezvousResult<Appointment> {
        let reason = required_reason("reschedule", reason)?;
        validate_range(Some(start_time), Some(end_time))?;
        self.mutate(id, HistoryAction::Report, |appointment| {
            check_transition(appointment.status, AppointmentStatus::Rescheduled)?;
            let old_schedule = appointment.schedule_value();
            appointment.date = date;
            appointment.start_time = Some(start_time);
            appointment.end_time = Some(end_time);
            appointment.time_slot = None;
            appointment.status = AppointmentStatus::Rescheduled;
            let entry = HistoryEntry::new(HistoryAction::Report, actor)
                .with_values(Some(old_schedule), Some(appointment.schedule_value()))
                .with_reason(Some(reason.clone()));
            appointment.record(entry);
            Ok(())
        })
        .await
    }

    /// Hands a booked appointment to another doctor. The status is kept.
    pub async fn reassign_doctor(
        &self,
        id: &Identifier,
        doctor_id: &Identifier,
        actor: &str,
        reason: &str,
    ) -> RendezvousResult<Appointment> {
        let reason = required_reason("reassign", reason)?;
        self.mutate(id, HistoryAction::Attribution, |appointment| {
            if !matches!(
                appointment.status,
                AppointmentStatus::Confirmed | AppointmentStatus::Rescheduled
            ) {
                return Err(ValidationError::InvalidState {
                    operation: "reassign",
                    status: appointment.status,
                }
                .into());
            }
            let entry = HistoryEntry::new(HistoryAction::Attribution, actor)
                .with_values(Some(doctor_value(&appointment.doctor_id)), Some(json!(doctor_id.as_str())))
                .with_reason(Some(reason.clone()));
            appointment.doctor_id = Some(doctor_id.clone());
            appointment.record(entry);
            Ok(())
        })
        .await
    }

    /// Cancels from any status, including an already cancelled one.
    pub async fn cancel(&self, id: &Identifier, actor: &str, reason: Option<String>) -> RendezvousResult<Appointment> {
        let reason = non_blank(reason);
        self.mutate(id, HistoryAction::Cancellation, |appointment| {
            check_transition(appointment.status, AppointmentStatus::Cancelled)?;
            let entry = HistoryEntry::new(HistoryAction::Cancellation, actor)
                .with_values(
                    Some(json!(appointment.status.as_str())),
                    Some(json!(AppointmentStatus::Cancelled.as_str())),
                )
                .with_reason(reason.clone());
            appointment.status = AppointmentStatus::Cancelled;
            appointment.record(entry);
            Ok(())
        })
        .await
    }

    pub async fn complete(
        &self,
        id: &Identifier,
        doctor_id: &Identifier,
        notes: Option<String>,
    ) -> RendezvousResult<Appointment> {
        let notes = non_blank(notes);
        self.mutate(id, HistoryAction::Completion, |appointment| {
            check_transition(appointment.status, AppointmentStatus::Completed)?;
            let entry = HistoryEntry::new(HistoryAction::Completion, doctor_id.as_str()).with_values(
                Some(json!(appointment.status.as_str())),
                Some(json!(AppointmentStatus::Completed.as_str())),
            );
            if appointment.doctor_id.is_none() {
                appointment.doctor_id = Some(doctor_id.clone());
            }
            if let Some(notes) = &notes {
                appointment.doctor_notes = Some(notes.clone());
            }
            appointment.status = AppointmentStatus::Completed;
            appointment.record(entry);
            Ok(())
        })
        .await
    }

    /// Generic status change, held to the same transition table as the
    /// dedicated operations.
    pub async fn update_status(
        &self,
        id: &Identifier,
        status: AppointmentStatus,
        actor: &str,
        reason: Option<String>,
    ) -> RendezvousResult<Appointment> {
        let reason = non_blank(reason);
        self.mutate(id, HistoryAction::StatusChange, |appointment| {
            check_transition(appointment.status, status)?;
            if status == AppointmentStatus::Confirmed && appointment.doctor_id.is_none() {
                return Err(ValidationError::MissingDoctor(appointment.id.to_string()).into());
            }
            let entry = HistoryEntry::new(HistoryAction::StatusChange, actor)
                .with_values(Some(json!(appointment.status.as_str())), Some(json!(status.as_str())))
                .with_reason(reason.clone());
            appointment.status = status;
            appointment.record(entry);
            Ok(())
        })
        .await
    }

    pub async fn run_migration(&self, establishment_id: &Identifier, actor: &str) -> RendezvousResult<MigrationReport> {
        migration::run_migration(&self.db, establishment_id, actor).await
    }

    pub async fn get(&self, id: &Identifier) -> RendezvousResult<Appointment> {
        self.db.fetch(APPOINTMENTS, id.as_str()).await
    }

    pub async fn list_by_establishment(&self, establishment_id: &Identifier) -> RendezvousResult<Vec<Appointment>> {
        self.list_where(|a| a.belongs_to(establishment_id)).await
    }

    pub async fn list_by_doctor(&self, doctor_id: &Identifier) -> RendezvousResult<Vec<Appointment>> {
        self.list_where(|a| a.doctor_id.as_ref() == Some(doctor_id)).await
    }

    /// Demands of an establishment still waiting for a secretary.
    pub async fn list_pending(&self, establishment_id: &Identifier) -> RendezvousResult<Vec<Appointment>> {
        self.list_where(|a| a.belongs_to(establishment_id) && a.status == AppointmentStatus::Pending)
            .await
    }

    async fn list_where<P>(&self, predicate: P) -> RendezvousResult<Vec<Appointment>>
    where
        P: Fn(&Appointment) -> bool,
    {
        let mut appointments: Vec<Appointment> = self
            .db
            .scan::<Appointment>(APPOINTMENTS)
            .await?
            .into_iter()
            .filter(|a| predicate(a))
            .collect();
        appointments.sort_by(|a, b| {
            (a.date, a.start_time, a.id.as_str()).cmp(&(b.date, b.start_time, b.id.as_str()))
        });
        Ok(appointments)
    }

    async fn mutate<F>(&self, id: &Identifier, action: HistoryAction, mutation: F) -> RendezvousResult<Appointment>
    where
        F: FnMut(&mut Appointment) -> RendezvousResult<()> + Send,
    {
        let appointment: Appointment = self.db.update(APPOINTMENTS, id.as_str(), mutation).await?;
        info!("Appointment {} {:?}: status {}", appointment.id, action, appointment.status);
        dispatch(
            self.notifier.as_ref(),
            AppointmentEvent::from_appointment(&appointment, action),
        )
        .await;
        Ok(appointment)
    }
}

fn doctor_value(doctor_id: &Option<Identifier>) -> Value {
    match doctor_id {
        Some(id) => json!(id.as_str()),
        None => Value::Null,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required_reason(operation: &'static str, reason: &str) -> ValidationResult<String> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(ValidationError::ReasonRequired(operation));
    }
    Ok(reason.to_string())
}

fn validate_range(start: Option<NaiveTime>, end: Option<NaiveTime>) -> ValidationResult<()> {
    match (start, end) {
        (Some(start), Some(end)) if end <= start => Err(ValidationError::InvalidTimeRange {
            start: format_time(&start),
            end: format_time(&end),
        }),
        _ => Ok(()),
    }
}
