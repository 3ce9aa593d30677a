// models/src/medical/mod.rs

pub mod appointment;
pub mod establishment;
pub mod history;
pub mod staff;
pub mod status;

pub use appointment::{Appointment, AppointmentDemand};
pub use establishment::{Establishment, EstablishmentKind, ValidationStatus};
pub use history::{HistoryAction, HistoryEntry};
pub use staff::{StaffMember, StaffRole};
pub use status::{AppointmentKind, AppointmentStatus, CreatorRole};
