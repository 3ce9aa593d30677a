// lib/tests/lifecycle_scenarios.rs

use chrono::{NaiveDate, NaiveTime};
use models::{AppointmentKind, CreatorRole, HistoryAction, StaffMember, StaffRole};
use rendezvous::storage_engine::StorageEngine;
use rendezvous::{
    AppointmentDemand, AppointmentService, AppointmentStatus, Database, Directory, Identifier, StorageConfig,
    StorageEngineType,
};
use serde_json::json;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn id(value: &str) -> Identifier {
    value.parse().unwrap()
}

async fn sled_database(dir: &tempfile::TempDir) -> Database {
    let config = StorageConfig {
        storage_engine_type: StorageEngineType::Sled,
        data_directory: dir.path().join("rendezvous"),
        ..StorageConfig::default()
    };
    Database::new(&config).await.unwrap()
}

fn patient_demand() -> AppointmentDemand {
    AppointmentDemand {
        patient_id: id("P1"),
        establishment_id: id("E1"),
        date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
        start_time: NaiveTime::from_hms_opt(10, 0, 0),
        end_time: NaiveTime::from_hms_opt(10, 30, 0),
        motive: "consultation annuelle".to_string(),
        kind: AppointmentKind::Consultation,
        created_by: CreatorRole::Patient,
        doctor_id: None,
        specialty: Some("cardiologie".to_string()),
        created_by_id: None,
    }
}

#[tokio::test]
async fn confirm_then_reassign_persists_full_history() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let service = AppointmentService::new(sled_database(&dir).await);

    let created = service.create_demand(patient_demand()).await.unwrap();
    assert_eq!(created.status, AppointmentStatus::Pending);

    service
        .confirm_and_assign(&created.id, &id("D1"), &id("S1"), Some("first visit".into()))
        .await
        .unwrap();
    let stored = service.get(&created.id).await.unwrap();
    assert_eq!(stored.status, AppointmentStatus::Confirmed);
    assert_eq!(stored.history.len(), 2);

    service
        .reassign_doctor(&created.id, &id("D2"), "S1", "D1 unavailable")
        .await
        .unwrap();
    service.database().flush().await.unwrap();

    let stored = service.get(&created.id).await.unwrap();
    assert_eq!(stored.status, AppointmentStatus::Confirmed);
    assert_eq!(stored.doctor_id, Some(id("D2")));
    assert_eq!(stored.secretary_notes.as_deref(), Some("first visit"));
    assert_eq!(stored.history.len(), 3);
    assert_eq!(stored.history[2].action, HistoryAction::Attribution);
    assert_eq!(stored.history[2].reason.as_deref(), Some("D1 unavailable"));
}

#[tokio::test]
async fn migration_repairs_legacy_records_once() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let db = sled_database(&dir).await;
    let directory = Directory::new(db.clone());

    let mut member = StaffMember::new(id("D1"), "Dr Ndiaye", StaffRole::Doctor);
    member.establishment_ids.push(id("E1"));
    directory.add_staff(member).await.unwrap();
    directory
        .add_staff(StaffMember::new(id("D9"), "Dr Faye", StaffRole::Doctor))
        .await
        .unwrap();

    // Legacy shapes written straight to the store.
    let fixtures = [
        (
            "orphan-member",
            json!({ "patient_id": "P1", "doctor_id": "D1", "date_rendez_vous": "2023-02-01",
                    "start_time": "08:00", "end_time": "08:30", "status": "confirme" }),
        ),
        (
            "orphan-foreign",
            json!({ "patient_id": "P2", "doctor_id": "D9", "date_rendez_vous": "2023-02-01",
                    "time_slot": "09:00 - 09:30", "status": "confirmed" }),
        ),
        (
            "pending-with-doctor",
            json!({ "patient_id": "P3", "establishment_id": "E1", "doctor_id": "D1",
                    "date_rdv": "2023-02-02", "start_time": "11:00", "end_time": "11:30",
                    "status": "en_attente" }),
        ),
        (
            "legacy-slot",
            json!({ "patient_id": "P4", "establishment_id": "E1", "doctor_id": "D1",
                    "date_rdv": "2023-02-03", "time_slot": "14:00 - 14:45", "status": "confirmed",
                    "historique_modifications": [
                        { "timestamp": "2023-01-20T08:00:00Z", "action": "creation", "actor": "P4" }
                    ] }),
        ),
    ];
    for (key, document) in &fixtures {
        let bytes = serde_json::to_vec(document).unwrap();
        db.storage()
            .insert(format!("appointments/{}", key).as_bytes(), &bytes)
            .await
            .unwrap();
    }

    let service = AppointmentService::new(db.clone());
    let report = service.run_migration(&id("E1"), "admin").await.unwrap();
    assert_eq!(report.scanned, 4);
    assert_eq!(report.changed, 3);
    assert_eq!(report.establishment_backfills, 1);
    assert_eq!(report.doctor_cleanups, 1);
    assert_eq!(report.slot_splits, 1);
    assert_eq!(report.skipped, 0);

    let backfilled = service.get(&id("orphan-member")).await.unwrap();
    assert_eq!(backfilled.establishment_id, Some(id("E1")));
    assert_eq!(backfilled.history.last().unwrap().action, HistoryAction::Migration);

    let foreign = service.get(&id("orphan-foreign")).await.unwrap();
    assert!(foreign.establishment_id.is_none());
    assert_eq!(foreign.time_slot.as_deref(), Some("09:00 - 09:30"));

    let cleaned = service.get(&id("pending-with-doctor")).await.unwrap();
    assert!(cleaned.doctor_id.is_none());
    assert_eq!(cleaned.history.last().unwrap().action, HistoryAction::Cleanup);

    let split = service.get(&id("legacy-slot")).await.unwrap();
    assert_eq!(split.start_time, NaiveTime::from_hms_opt(14, 0, 0));
    assert_eq!(split.end_time, NaiveTime::from_hms_opt(14, 45, 0));
    assert!(split.time_slot.is_none());
    assert_eq!(split.history.len(), 2);

    let pending = service.list_pending(&id("E1")).await.unwrap();
    assert_eq!(pending.len(), 1);

    let second = service.run_migration(&id("E1"), "admin").await.unwrap();
    assert!(second.is_noop());
    assert_eq!(second.scanned, 4);
}

#[tokio::test]
async fn reschedule_clears_legacy_slot_on_disk() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let db = sled_database(&dir).await;
    let legacy = json!({ "patient_id": "P1", "establishment_id": "E1", "doctor_id": "D1",
                         "date_rdv": "2023-03-01", "time_slot": "10:00 - 10:30", "status": "confirmed" });
    db.storage()
        .insert(b"appointments/old", &serde_json::to_vec(&legacy).unwrap())
        .await
        .unwrap();

    let service = AppointmentService::new(db);
    let moved = service
        .reschedule(
            &id("old"),
            NaiveDate::from_ymd_opt(2023, 3, 8).unwrap(),
            NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(15, 30, 0).unwrap(),
            "S1",
            "room unavailable",
        )
        .await
        .unwrap();
    assert_eq!(moved.status, AppointmentStatus::Rescheduled);
    assert!(moved.time_slot.is_none());
    let entry = moved.history.last().unwrap();
    assert_eq!(entry.old_value.as_ref().unwrap()["date"], "2023-03-01");

    let stored = service.get(&id("old")).await.unwrap();
    assert_eq!(stored, moved);
}
