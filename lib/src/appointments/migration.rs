// lib/src/appointments/migration.rs

use std::collections::HashSet;

use log::{debug, error, info, warn};
use models::errors::{RendezvousError, RendezvousResult};
use models::schedule::format_time;
use models::{Appointment, AppointmentStatus, HistoryAction, HistoryEntry, Identifier, TimeSlot};
use serde::Serialize;
use serde_json::json;

use crate::database::{Database, APPOINTMENTS};
use crate::directory::Directory;
use crate::storage_engine::storage_utils::{document_key, encode_document};
use crate::storage_engine::{BatchOutcome, WriteBatch};

/// Summary of one sweep over the appointments of an establishment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub establishment_id: Option<Identifier>,
    pub scanned: usize,
    pub changed: usize,
    pub skipped: usize,
    pub establishment_backfills: usize,
    pub doctor_cleanups: usize,
    pub slot_splits: usize,
    pub changed_ids: Vec<String>,
}

impl MigrationReport {
    pub fn is_noop(&self) -> bool {
        self.changed == 0
    }
}

/// Fixes applied to a single appointment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Repair {
    pub establishment_backfilled: bool,
    pub doctor_cleared: bool,
    pub slot_split: bool,
}

impl Repair {
    pub fn changed(&self) -> bool {
        self.establishment_backfilled || self.doctor_cleared || self.slot_split
    }
}

/// Heals one appointment in place, appending one history entry per fix.
///
/// A record without an establishment is adopted when its doctor works
/// there. Only records of `establishment_id` (after adoption) get the
/// pending-doctor and time-slot fixes.
pub fn repair_appointment(
    appointment: &mut Appointment,
    establishment_id: &Identifier,
    member_doctors: &HashSet<Identifier>,
    actor: &str,
) -> Repair {
    let mut repair = Repair::default();

    if appointment.establishment_id.is_none() {
        if let Some(doctor_id) = appointment.doctor_id.as_ref().filter(|d| member_doctors.contains(*d)) {
            let entry = HistoryEntry::new(HistoryAction::Migration, actor)
                .with_values(
                    Some(json!({ "establishment_id": null })),
                    Some(json!({ "establishment_id": establishment_id.as_str() })),
                )
                .with_reason(Some(format!("establishment backfilled from doctor {}", doctor_id)));
            appointment.establishment_id = Some(establishment_id.clone());
            appointment.record(entry);
            repair.establishment_backfilled = true;
        }
    }

    if !appointment.belongs_to(establishment_id) {
        return repair;
    }

    if appointment.status == AppointmentStatus::Pending {
        if let Some(doctor_id) = appointment.doctor_id.take() {
            let entry = HistoryEntry::new(HistoryAction::Cleanup, actor)
                .with_values(Some(json!({ "doctor_id": doctor_id.as_str() })), Some(json!({ "doctor_id": null })))
                .with_reason(Some("pending appointment cannot carry an assigned doctor".to_string()));
            appointment.record(entry);
            repair.doctor_cleared = true;
        }
    }

    if appointment.start_time.is_none() && appointment.end_time.is_none() {
        if let Some(raw) = appointment.time_slot.clone() {
            match TimeSlot::parse(&raw) {
                Ok(slot) => {
                    appointment.start_time = Some(slot.start);
                    appointment.end_time = Some(slot.end);
                    appointment.time_slot = None;
                    let entry = HistoryEntry::new(HistoryAction::Migration, actor)
                        .with_values(
                            Some(json!({ "time_slot": raw })),
                            Some(json!({
                                "start_time": format_time(&slot.start),
                                "end_time": format_time(&slot.end),
                            })),
                        )
                        .with_reason(Some("legacy time slot split into start and end".to_string()));
                    appointment.record(entry);
                    repair.slot_split = true;
                }
                Err(e) => warn!("Appointment {} keeps unparsable time slot: {}", appointment.id, e),
            }
        }
    }

    repair
}

/// Sweeps every appointment and commits all repairs as one atomic batch.
/// Nothing is written when no record needs a fix.
///
/// Each repaired record is written only if it still holds the bytes the
/// sweep read. A lifecycle write landing in between aborts the batch and the
/// sweep starts over, up to the database retry bound.
pub async fn run_migration(
    db: &Database,
    establishment_id: &Identifier,
    actor: &str,
) -> RendezvousResult<MigrationReport> {
    let member_doctors = Directory::new(db.clone()).doctor_ids_of(establishment_id).await?;
    info!(
        "Starting migration sweep for establishment {} ({} member doctors)",
        establishment_id,
        member_doctors.len()
    );

    for attempt in 1..=db.max_retries() {
        let (report, batch) = build_sweep(db, establishment_id, &member_doctors, actor).await?;
        if batch.is_empty() {
            info!("Migration sweep for {}: nothing to change ({} scanned)", establishment_id, report.scanned);
            return Ok(report);
        }

        match db.apply_batch(batch).await? {
            BatchOutcome::Applied => {
                info!(
                    "Migration sweep for {} changed {} of {} appointments ({} backfills, {} cleanups, {} slot splits, {} skipped)",
                    establishment_id,
                    report.changed,
                    report.scanned,
                    report.establishment_backfills,
                    report.doctor_cleanups,
                    report.slot_splits,
                    report.skipped
                );
                return Ok(report);
            }
            BatchOutcome::Conflict { key } => {
                debug!(
                    "{} changed during the sweep, starting over (attempt {}/{})",
                    String::from_utf8_lossy(&key),
                    attempt,
                    db.max_retries()
                );
            }
        }
    }

    error!("Migration sweep for {} kept conflicting after {} attempts", establishment_id, db.max_retries());
    Err(RendezvousError::TransactionError(format!(
        "appointments of {} kept changing during migration after {} attempts",
        establishment_id,
        db.max_retries()
    )))
}

async fn build_sweep(
    db: &Database,
    establishment_id: &Identifier,
    member_doctors: &HashSet<Identifier>,
    actor: &str,
) -> RendezvousResult<(MigrationReport, WriteBatch)> {
    let mut report = MigrationReport {
        establishment_id: Some(establishment_id.clone()),
        ..MigrationReport::default()
    };
    let mut batch = WriteBatch::new();

    for (key_id, snapshot, decoded) in db.scan_snapshots::<Appointment>(APPOINTMENTS).await? {
        report.scanned += 1;
        let mut appointment = match decoded {
            Ok(appointment) => appointment,
            Err(e) => {
                warn!("Skipping appointment {} during migration: {}", key_id, e);
                report.skipped += 1;
                continue;
            }
        };

        let repair = repair_appointment(&mut appointment, establishment_id, member_doctors, actor);
        if !repair.changed() {
            continue;
        }
        report.changed += 1;
        report.establishment_backfills += usize::from(repair.establishment_backfilled);
        report.doctor_cleanups += usize::from(repair.doctor_cleared);
        report.slot_splits += usize::from(repair.slot_split);
        batch.replace(document_key(APPOINTMENTS, &key_id), snapshot, encode_document(&appointment)?);
        report.changed_ids.push(key_id);
    }
    Ok((report, batch))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::tests::RacingStorage;
    use crate::storage_engine::{InMemoryStorage, StorageEngine};
    use models::{StaffMember, StaffRole};
    use std::sync::Arc;

    fn id(value: &str) -> Identifier {
        value.parse().unwrap()
    }

    fn legacy(value: serde_json::Value) -> Appointment {
        serde_json::from_value(value).unwrap()
    }

    fn members(ids: &[&str]) -> HashSet<Identifier> {
        ids.iter().map(|d| id(d)).collect()
    }

    #[test]
    fn should_backfill_only_for_member_doctors() {
        let mut mine = legacy(json!({
            "id": "a1", "patient_id": "P1", "doctor_id": "D1",
            "date_rdv": "2023-05-01", "status": "confirmed"
        }));
        let mut foreign = legacy(json!({
            "id": "a2", "patient_id": "P1", "doctor_id": "D9",
            "date_rdv": "2023-05-01", "status": "confirmed"
        }));
        let doctors = members(&["D1"]);

        let repair = repair_appointment(&mut mine, &id("E1"), &doctors, "admin");
        assert!(repair.establishment_backfilled);
        assert_eq!(mine.establishment_id, Some(id("E1")));
        assert_eq!(mine.last_history_entry().unwrap().action, HistoryAction::Migration);

        let repair = repair_appointment(&mut foreign, &id("E1"), &doctors, "admin");
        assert!(!repair.changed());
        assert!(foreign.establishment_id.is_none());
        assert!(foreign.history.is_empty());
    }

    #[test]
    fn should_clear_doctor_on_pending_record() {
        let mut appointment = legacy(json!({
            "id": "a1", "patient_id": "P1", "establishment_id": "E1", "doctor_id": "D1",
            "date_rdv": "2023-05-01", "status": "en_attente"
        }));
        let repair = repair_appointment(&mut appointment, &id("E1"), &HashSet::new(), "admin");
        assert!(repair.doctor_cleared);
        assert!(appointment.doctor_id.is_none());
        let entry = appointment.last_history_entry().unwrap();
        assert_eq!(entry.action, HistoryAction::Cleanup);
        assert_eq!(entry.old_value.as_ref().unwrap()["doctor_id"], "D1");
    }

    #[test]
    fn should_split_legacy_slot() {
        let mut appointment = legacy(json!({
            "id": "a1", "patient_id": "P1", "establishment_id": "E1",
            "date_rdv": "2023-05-01", "status": "confirmed", "time_slot": "10:00-10:30"
        }));
        let repair = repair_appointment(&mut appointment, &id("E1"), &HashSet::new(), "admin");
        assert!(repair.slot_split);
        assert_eq!(appointment.start_time.map(|t| format_time(&t)).as_deref(), Some("10:00"));
        assert_eq!(appointment.end_time.map(|t| format_time(&t)).as_deref(), Some("10:30"));
        assert!(appointment.time_slot.is_none());
    }

    #[test]
    fn should_leave_unparsable_slot_alone() {
        let mut appointment = legacy(json!({
            "id": "a1", "patient_id": "P1", "establishment_id": "E1",
            "date_rdv": "2023-05-01", "status": "confirmed", "time_slot": "morning"
        }));
        let repair = repair_appointment(&mut appointment, &id("E1"), &HashSet::new(), "admin");
        assert!(!repair.changed());
        assert_eq!(appointment.time_slot.as_deref(), Some("morning"));
    }

    #[test]
    fn should_ignore_other_establishments() {
        let mut appointment = legacy(json!({
            "id": "a1", "patient_id": "P1", "establishment_id": "E2", "doctor_id": "D1",
            "date_rdv": "2023-05-01", "status": "pending", "time_slot": "10:00 - 10:30"
        }));
        let repair = repair_appointment(&mut appointment, &id("E1"), &members(&["D1"]), "admin");
        assert!(!repair.changed());
        assert_eq!(appointment.doctor_id, Some(id("D1")));
    }

    #[tokio::test]
    async fn should_write_nothing_when_clean() {
        let storage = Arc::new(InMemoryStorage::new());
        let db = Database::with_engine(storage.clone());
        let clean = legacy(json!({
            "id": "a1", "patient_id": "P1", "establishment_id": "E1", "doctor_id": "D1",
            "date_rdv": "2023-05-01", "start_time": "09:00", "end_time": "09:30", "status": "confirmed"
        }));
        db.put(APPOINTMENTS, "a1", &clean).await.unwrap();
        let before = storage.retrieve(b"appointments/a1").await.unwrap();

        let report = run_migration(&db, &id("E1"), "admin").await.unwrap();
        assert!(report.is_noop());
        assert_eq!(report.scanned, 1);
        assert_eq!(storage.retrieve(b"appointments/a1").await.unwrap(), before);
    }

    #[tokio::test]
    async fn should_count_undecodable_documents_as_skipped() {
        let db = Database::with_engine(Arc::new(InMemoryStorage::new()));
        db.storage().insert(b"appointments/bad", b"{\"status\":42}").await.unwrap();
        let mut doctor = StaffMember::new(id("D1"), "Dr Diallo", StaffRole::Doctor);
        doctor.establishment_ids.push(id("E1"));
        db.put(crate::database::STAFF, "D1", &doctor).await.unwrap();
        let orphan = legacy(json!({
            "id": "a1", "patient_id": "P1", "doctor_id": "D1",
            "date_rdv": "2023-05-01", "status": "confirmed"
        }));
        db.put(APPOINTMENTS, "a1", &orphan).await.unwrap();

        let report = run_migration(&db, &id("E1"), "admin").await.unwrap();
        assert_eq!(report.scanned, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.changed, 1);
        assert_eq!(report.establishment_backfills, 1);
        assert_eq!(report.changed_ids, vec!["a1".to_string()]);
    }

    fn racing_fixture() -> (serde_json::Value, Vec<u8>) {
        let fixture = json!({
            "id": "a1", "patient_id": "P1", "establishment_id": "E1", "doctor_id": "D1",
            "date_rdv": "2023-05-01", "status": "pending", "time_slot": "10:00 - 10:30"
        });
        // What a cancellation committed mid-sweep leaves behind.
        let cancelled = json!({
            "id": "a1", "patient_id": "P1", "establishment_id": "E1", "doctor_id": "D1",
            "date_rdv": "2023-05-01", "status": "cancelled", "time_slot": "10:00 - 10:30",
            "history": [
                { "timestamp": "2023-05-01T09:00:00Z", "action": "cancellation", "actor": "S1",
                  "old_value": "pending", "new_value": "cancelled" }
            ]
        });
        (fixture, serde_json::to_vec(&cancelled).unwrap())
    }

    #[tokio::test]
    async fn should_resweep_when_record_changes_before_commit() {
        let (fixture, cancelled) = racing_fixture();
        let db = Database::with_engine(Arc::new(RacingStorage::new(1, &cancelled)));
        db.put(APPOINTMENTS, "a1", &legacy(fixture)).await.unwrap();

        let report = run_migration(&db, &id("E1"), "admin").await.unwrap();
        // The second sweep sees a cancelled record: only the slot needs work.
        assert_eq!(report.changed, 1);
        assert_eq!(report.doctor_cleanups, 0);
        assert_eq!(report.slot_splits, 1);

        let stored: Appointment = db.fetch(APPOINTMENTS, "a1").await.unwrap();
        assert_eq!(stored.status, AppointmentStatus::Cancelled);
        assert_eq!(stored.doctor_id, Some(id("D1")));
        let actions: Vec<HistoryAction> = stored.history.iter().map(|entry| entry.action).collect();
        assert_eq!(actions, vec![HistoryAction::Cancellation, HistoryAction::Migration]);
    }

    #[tokio::test]
    async fn should_give_up_when_records_keep_changing() {
        let (fixture, cancelled) = racing_fixture();
        let db = Database::with_engine(Arc::new(RacingStorage::new(100, &cancelled))).with_max_retries(2);
        db.put(APPOINTMENTS, "a1", &legacy(fixture)).await.unwrap();

        let err = run_migration(&db, &id("E1"), "admin").await.unwrap_err();
        assert!(matches!(err, RendezvousError::TransactionError(_)));
        let stored: Appointment = db.fetch(APPOINTMENTS, "a1").await.unwrap();
        assert!(stored.history.iter().all(|entry| entry.action != HistoryAction::Migration));
    }
}
