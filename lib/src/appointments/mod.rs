// lib/src/appointments/mod.rs

pub mod migration;
pub mod notifications;
pub mod service;
pub mod transitions;

pub use migration::{repair_appointment, run_migration, MigrationReport, Repair};
pub use notifications::{AppointmentEvent, AppointmentNotifier, LogNotifier, RecordingNotifier};
pub use service::AppointmentService;
pub use transitions::{allowed_targets, can_transition, check_transition};
