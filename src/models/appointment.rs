use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::AppointmentStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub provider_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
    pub service_id: Option<Uuid>,
    pub date: NaiveDate,
    pub start_minute: u32,
    pub duration_minutes: u32,
    pub status: AppointmentStatus,
}

impl Appointment {
    pub fn end_minute(&self) -> u32 {
        self.start_minute + self.duration_minutes
    }
}

/// Insert shape for the atomic check-and-insert. The id is generated by
/// the repository so a conflict never burns a caller-visible identifier.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub tenant_id: Uuid,
    pub provider_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
    pub service_id: Option<Uuid>,
    pub date: NaiveDate,
    pub start_minute: u32,
    pub duration_minutes: u32,
    pub status: AppointmentStatus,
}

/// A time span already taken on a given day, in minutes since midnight.
/// Half-open: `[start_minute, end_minute)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccupiedInterval {
    pub start_minute: u32,
    pub end_minute: u32,
}

impl OccupiedInterval {
    pub fn overlaps(&self, start: u32, end: u32) -> bool {
        start < self.end_minute && self.start_minute < end
    }
}
