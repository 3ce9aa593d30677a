// models/src/lib.rs

pub mod errors;
pub mod identifiers;
pub mod medical;
pub mod schedule;

pub use errors::{RendezvousError, RendezvousResult, ValidationError, ValidationResult};
pub use identifiers::Identifier;
pub use medical::{
    Appointment, AppointmentDemand, AppointmentKind, AppointmentStatus, CreatorRole, Establishment,
    EstablishmentKind, HistoryAction, HistoryEntry, StaffMember, StaffRole, ValidationStatus,
};
pub use schedule::TimeSlot;
