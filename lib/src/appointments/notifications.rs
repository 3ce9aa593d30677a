// lib/src/appointments/notifications.rs

use std::fmt::Debug;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, warn};
use models::{Appointment, AppointmentStatus, HistoryAction, Identifier};
use serde::Serialize;

/// What happened to an appointment, as handed to notifiers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppointmentEvent {
    pub appointment_id: Identifier,
    pub action: HistoryAction,
    pub status: AppointmentStatus,
    pub patient_id: Identifier,
    pub doctor_id: Option<Identifier>,
}

impl AppointmentEvent {
    pub fn from_appointment(appointment: &Appointment, action: HistoryAction) -> Self {
        AppointmentEvent {
            appointment_id: appointment.id.clone(),
            action,
            status: appointment.status,
            patient_id: appointment.patient_id.clone(),
            doctor_id: appointment.doctor_id.clone(),
        }
    }
}

/// Receives lifecycle events after the change is stored.
#[async_trait]
pub trait AppointmentNotifier: Send + Sync + Debug {
    async fn notify(&self, event: &AppointmentEvent) -> Result<()>;
}

/// Default notifier: writes the event to the log at debug level. The
/// service already logs each change at info.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl AppointmentNotifier for LogNotifier {
    async fn notify(&self, event: &AppointmentEvent) -> Result<()> {
        debug!(
            "Appointment {} {:?}: now {} (patient {}, doctor {})",
            event.appointment_id,
            event.action,
            event.status,
            event.patient_id,
            event.doctor_id.as_ref().map(Identifier::as_str).unwrap_or("-")
        );
        Ok(())
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<AppointmentEvent>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AppointmentEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl AppointmentNotifier for RecordingNotifier {
    async fn notify(&self, event: &AppointmentEvent) -> Result<()> {
        let mut events = self
            .events
            .lock()
            .map_err(|_| anyhow::anyhow!("notification log is poisoned"))?;
        events.push(event.clone());
        Ok(())
    }
}

/// Runs the notifier. A failing notifier never fails the caller's change.
pub async fn dispatch(notifier: &dyn AppointmentNotifier, event: AppointmentEvent) {
    if let Err(e) = notifier.notify(&event).await {
        warn!(
            "Notification for appointment {} ({:?}) failed: {}",
            event.appointment_id, event.action, e
        );
    }
}
