//! Clinic events
//!
//! One record per notable transition in a patient's visit, kept in simulated
//! time order as the run produces them.

use crate::simulation::SimTime;
use crate::types::PatientId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClinicEventType {
    /// Patient entered the clinic
    Arrival,
    /// Registration finished
    RegistrationComplete,
    /// Patient was given an exam room
    ExamRoomAssigned,
    /// Nurse assessment finished
    NurseVisitComplete,
    /// Doctor consultation finished
    DoctorVisitComplete,
    /// Patient left the clinic
    Discharge,
    /// Patient was turned away at the door
    Balked,
}

impl fmt::Display for ClinicEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClinicEventType::Arrival => "arrival",
            ClinicEventType::RegistrationComplete => "registration_complete",
            ClinicEventType::ExamRoomAssigned => "exam_room_assigned",
            ClinicEventType::NurseVisitComplete => "nurse_visit_complete",
            ClinicEventType::DoctorVisitComplete => "doctor_visit_complete",
            ClinicEventType::Discharge => "discharge",
            ClinicEventType::Balked => "balked",
        };
        f.write_str(name)
    }
}

/// A single entry in the clinic event log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicEvent {
    /// Simulated time of the event
    pub timestamp: SimTime,
    /// Kind of event
    pub event_type: ClinicEventType,
    /// Patient concerned
    pub patient_id: PatientId,
    /// Exam room, for room assignments
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub room_id: Option<usize>,
    /// Sampled service duration, for completed services
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub duration: Option<f64>,
}

impl ClinicEvent {
    /// Create an event with no room or duration
    pub fn new(timestamp: SimTime, event_type: ClinicEventType, patient_id: PatientId) -> Self {
        Self { timestamp, event_type, patient_id, room_id: None, duration: None }
    }

    /// Attach an exam room
    pub fn with_room(mut self, room_id: usize) -> Self {
        self.room_id = Some(room_id);
        self
    }

    /// Attach a service duration
    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Serialize as a single JSON line
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_builder() {
        let event = ClinicEvent::new(12.5, ClinicEventType::ExamRoomAssigned, PatientId::new(3))
            .with_room(2);
        assert_eq!(event.room_id, Some(2));
        assert_eq!(event.duration, None);
    }

    #[test]
    fn test_json_line_omits_absent_fields() {
        let event = ClinicEvent::new(4.0, ClinicEventType::Arrival, PatientId::new(1));
        let line = event.to_json_line().unwrap();
        assert_eq!(line, r#"{"timestamp":4.0,"event_type":"arrival","patient_id":"Patient_001"}"#);

        let event = ClinicEvent::new(9.0, ClinicEventType::NurseVisitComplete, PatientId::new(1))
            .with_duration(5.0);
        let line = event.to_json_line().unwrap();
        assert!(line.contains(r#""duration":5.0"#));
        assert!(!line.contains("room_id"));
    }

    #[test]
    fn test_event_type_names_match_serde() {
        let json = serde_json::to_string(&ClinicEventType::DoctorVisitComplete).unwrap();
        assert_eq!(json, format!("\"{}\"", ClinicEventType::DoctorVisitComplete));
    }
}
