// lib/src/lib.rs

pub mod appointments;
pub mod config;
pub mod database;
pub mod directory;
pub mod storage_engine;

pub use models::{Appointment, AppointmentDemand, AppointmentStatus, Identifier};
pub use models::errors::{RendezvousError, RendezvousResult, ValidationError};

pub use crate::appointments::{AppointmentNotifier, AppointmentService, LogNotifier, MigrationReport};
pub use crate::config::{load_config, AppConfig, StorageConfig, StorageEngineType};
pub use crate::database::Database;
pub use crate::directory::Directory;
