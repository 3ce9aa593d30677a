// lib/src/directory.rs

use std::collections::HashSet;

use chrono::Utc;
use log::info;
use models::errors::{RendezvousResult, ValidationError};
use models::{Establishment, Identifier, StaffMember, ValidationStatus};

use crate::database::{Database, ESTABLISHMENTS, STAFF};

/// Establishments and their staff.
#[derive(Debug, Clone)]
pub struct Directory {
    db: Database,
}

impl Directory {
    pub fn new(db: Database) -> Self {
        Directory { db }
    }

    pub async fn add_establishment(&self, establishment: Establishment) -> RendezvousResult<Establishment> {
        self.db
            .insert_new(ESTABLISHMENTS, establishment.id.as_str(), &establishment)
            .await?;
        info!("Registered establishment {} ({})", establishment.id, establishment.name);
        Ok(establishment)
    }

    pub async fn get_establishment(&self, id: &Identifier) -> RendezvousResult<Establishment> {
        self.db.fetch(ESTABLISHMENTS, id.as_str()).await
    }

    pub async fn list_establishments(&self) -> RendezvousResult<Vec<Establishment>> {
        let mut establishments: Vec<Establishment> = self.db.scan(ESTABLISHMENTS).await?;
        establishments.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(establishments)
    }

    pub async fn validate_establishment(&self, id: &Identifier) -> RendezvousResult<Establishment> {
        self.set_validation(id, ValidationStatus::Validated, None).await
    }

    pub async fn reject_establishment(&self, id: &Identifier, reason: &str) -> RendezvousResult<Establishment> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ValidationError::ReasonRequired("reject").into());
        }
        self.set_validation(id, ValidationStatus::Rejected, Some(reason.to_string()))
            .await
    }

    async fn set_validation(
        &self,
        id: &Identifier,
        status: ValidationStatus,
        reason: Option<String>,
    ) -> RendezvousResult<Establishment> {
        let establishment: Establishment = self
            .db
            .update(ESTABLISHMENTS, id.as_str(), |e: &mut Establishment| {
                e.validation_status = status;
                e.rejection_reason = reason.clone();
                e.updated_at = Utc::now();
                Ok(())
            })
            .await?;
        info!("Establishment {} is now {:?}", id, status);
        Ok(establishment)
    }

    pub async fn add_staff(&self, member: StaffMember) -> RendezvousResult<StaffMember> {
        self.db.insert_new(STAFF, member.id.as_str(), &member).await?;
        info!("Registered {:?} {} ({})", member.role, member.id, member.display_name);
        Ok(member)
    }

    pub async fn get_staff(&self, id: &Identifier) -> RendezvousResult<StaffMember> {
        self.db.fetch(STAFF, id.as_str()).await
    }

    /// Staff of one establishment, or everyone when `establishment_id` is `None`.
    pub async fn list_staff(&self, establishment_id: Option<&Identifier>) -> RendezvousResult<Vec<StaffMember>> {
        let mut members: Vec<StaffMember> = self
            .db
            .scan::<StaffMember>(STAFF)
            .await?
            .into_iter()
            .filter(|m| establishment_id.map_or(true, |e| m.works_at(e)))
            .collect();
        members.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        Ok(members)
    }

    pub async fn join_establishment(&self, id: &Identifier, establishment_id: &Identifier) -> RendezvousResult<StaffMember> {
        self.db
            .update(STAFF, id.as_str(), |m: &mut StaffMember| {
                if !m.works_at(establishment_id) {
                    m.establishment_ids.push(establishment_id.clone());
                }
                Ok(())
            })
            .await
    }

    pub async fn set_staff_active(&self, id: &Identifier, active: bool) -> RendezvousResult<StaffMember> {
        let member: StaffMember = self
            .db
            .update(STAFF, id.as_str(), |m: &mut StaffMember| {
                m.active = active;
                Ok(())
            })
            .await?;
        info!("Staff member {} active: {}", id, active);
        Ok(member)
    }

    /// Doctors whose staff record lists the establishment. Inactive doctors
    /// are included since their past appointments still belong there.
    pub async fn doctor_ids_of(&self, establishment_id: &Identifier) -> RendezvousResult<HashSet<Identifier>> {
        Ok(self
            .list_staff(Some(establishment_id))
            .await?
            .into_iter()
            .filter(StaffMember::is_doctor)
            .map(|m| m.id)
            .collect())
    }
}
