use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    /// IANA zone name, or "UTC".
    pub time_zone: String,
}

impl Doctor {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A booked visit. Start and end are civil times in the doctor's zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visit {
    pub id: i64,
    pub start_date_time: NaiveDateTime,
    pub end_date_time: NaiveDateTime,
    pub doctor_id: i64,
    pub patient_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVisit {
    pub start_date_time: NaiveDateTime,
    pub end_date_time: NaiveDateTime,
    pub doctor_id: i64,
    pub patient_id: i64,
}

impl NewVisit {
    pub fn with_id(self, id: i64) -> Visit {
        Visit {
            id,
            start_date_time: self.start_date_time,
            end_date_time: self.end_date_time,
            doctor_id: self.doctor_id,
            patient_id: self.patient_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitWithDoctor {
    #[serde(flatten)]
    pub visit: Visit,
    pub doctor: Doctor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientWithVisits {
    #[serde(flatten)]
    pub patient: Patient,
    #[serde(default)]
    pub visits: Vec<VisitWithDoctor>,
}
