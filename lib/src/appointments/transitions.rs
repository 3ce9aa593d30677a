// lib/src/appointments/transitions.rs

use log::warn;
use models::errors::{RendezvousError, RendezvousResult};
use models::AppointmentStatus;

use AppointmentStatus::*;

/// Statuses reachable in one step from `from`. Nothing leads back to
/// `Pending`, and `Cancelled` is reachable from everywhere.
pub fn allowed_targets(from: AppointmentStatus) -> &'static [AppointmentStatus] {
    match from {
        Pending => &[Confirmed, Rescheduled, Cancelled],
        Confirmed | Rescheduled => &[Confirmed, Rescheduled, Completed, Cancelled],
        Completed => &[Cancelled],
        Cancelled => &[Cancelled],
    }
}

pub fn can_transition(from: AppointmentStatus, to: AppointmentStatus) -> bool {
    allowed_targets(from).contains(&to)
}

pub fn check_transition(from: AppointmentStatus, to: AppointmentStatus) -> RendezvousResult<()> {
    if can_transition(from, to) {
        Ok(())
    } else {
        warn!("Invalid status transition attempted: {} -> {}", from, to);
        Err(RendezvousError::InvalidTransition { from, to })
    }
}
