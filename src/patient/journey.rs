//! Patient journey records
//!
//! A journey is created at arrival, filled in by the owning patient process
//! as it moves through the clinic, and finalized exactly once at discharge.

use crate::simulation::{SimTime, SimulationError, SimulationResult};
use crate::types::PatientId;
use serde::{Deserialize, Serialize};

/// Timing record for one patient's visit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientJourney {
    /// Patient identity
    pub patient_id: PatientId,
    /// Arrival at the clinic
    pub arrival_time: SimTime,
    /// Start of the pre-registration wait (same as arrival)
    pub waiting_room_start: SimTime,
    /// Registration started
    pub registration_start: Option<SimTime>,
    /// Registration finished
    pub registration_end: Option<SimTime>,
    /// Exam room granted
    pub exam_room_assigned: Option<SimTime>,
    /// Index of the assigned exam room
    pub room_id: Option<usize>,
    /// Nurse visit started
    pub nurse_visit_start: Option<SimTime>,
    /// Nurse visit finished
    pub nurse_visit_end: Option<SimTime>,
    /// Doctor visit started
    pub doctor_visit_start: Option<SimTime>,
    /// Doctor visit finished
    pub doctor_visit_end: Option<SimTime>,
    /// Left the clinic
    pub departure_time: Option<SimTime>,
    /// `departure_time - arrival_time`
    pub total_time: Option<f64>,
    /// `exam_room_assigned - arrival_time`
    pub waiting_time: Option<f64>,
    /// Set once every stage has finished and departure is recorded
    pub service_completed: bool,
}

impl PatientJourney {
    /// Start a journey at arrival
    pub fn new(patient_id: PatientId, arrival_time: SimTime) -> Self {
        Self {
            patient_id,
            arrival_time,
            waiting_room_start: arrival_time,
            registration_start: None,
            registration_end: None,
            exam_room_assigned: None,
            room_id: None,
            nurse_visit_start: None,
            nurse_visit_end: None,
            doctor_visit_start: None,
            doctor_visit_end: None,
            departure_time: None,
            total_time: None,
            waiting_time: None,
            service_completed: false,
        }
    }

    /// The nine milestone timestamps in the order they must occur
    pub fn milestones(&self) -> [Option<SimTime>; 9] {
        [
            Some(self.arrival_time),
            self.registration_start,
            self.registration_end,
            self.exam_room_assigned,
            self.nurse_visit_start,
            self.nurse_visit_end,
            self.doctor_visit_start,
            self.doctor_visit_end,
            self.departure_time,
        ]
    }

    /// Whether the recorded milestones are non-decreasing with no gaps
    pub fn is_chronological(&self) -> bool {
        let mut previous = f64::NEG_INFINITY;
        let mut seen_gap = false;
        for milestone in self.milestones() {
            match milestone {
                Some(_) if seen_gap => return false,
                Some(time) if time < previous => return false,
                Some(time) => previous = time,
                None => seen_gap = true,
            }
        }
        true
    }

    /// Interval during which the patient held an exam room; open-ended while still inside
    pub fn exam_room_interval(&self) -> Option<(SimTime, Option<SimTime>)> {
        self.exam_room_assigned.map(|start| (start, self.departure_time))
    }

    /// Record departure and derive the summary metrics
    pub(crate) fn finalize(&mut self, departure_time: SimTime) -> SimulationResult<()> {
        if self.service_completed {
            return Err(SimulationError::invariant_violation(format!(
                "journey for {} finalized twice",
                self.patient_id
            )));
        }

        let previous = self.departure_time.replace(departure_time);
        if !self.is_chronological() || self.milestones().iter().any(Option::is_none) {
            self.departure_time = previous;
            return Err(SimulationError::invariant_violation(format!(
                "journey for {} has missing or out-of-order timestamps",
                self.patient_id
            )));
        }

        self.total_time = Some(departure_time - self.arrival_time);
        self.waiting_time = self.exam_room_assigned.map(|assigned| assigned - self.arrival_time);
        self.service_completed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_journey() -> PatientJourney {
        let mut journey = PatientJourney::new(PatientId::new(1), 2.0);
        journey.registration_start = Some(2.0);
        journey.registration_end = Some(5.0);
        journey.exam_room_assigned = Some(6.5);
        journey.room_id = Some(0);
        journey.nurse_visit_start = Some(6.5);
        journey.nurse_visit_end = Some(14.0);
        journey.doctor_visit_start = Some(15.0);
        journey.doctor_visit_end = Some(27.0);
        journey
    }

    #[test]
    fn test_finalize_derives_metrics() {
        let mut journey = complete_journey();
        journey.finalize(27.0).unwrap();

        assert!(journey.service_completed);
        assert_eq!(journey.departure_time, Some(27.0));
        assert_eq!(journey.total_time, Some(25.0));
        assert_eq!(journey.waiting_time, Some(4.5));
        assert_eq!(journey.exam_room_interval(), Some((6.5, Some(27.0))));
    }

    #[test]
    fn test_finalize_twice_is_fatal() {
        let mut journey = complete_journey();
        journey.finalize(27.0).unwrap();
        assert!(matches!(journey.finalize(28.0), Err(SimulationError::InvariantViolation(_))));
    }

    #[test]
    fn test_out_of_order_journey_is_rejected() {
        let mut journey = complete_journey();
        journey.nurse_visit_end = Some(20.0);
        assert!(!journey.is_chronological());
        assert!(journey.finalize(27.0).is_err());
        assert!(!journey.service_completed);
    }

    #[test]
    fn test_incomplete_journey_cannot_be_finalized() {
        let mut journey = complete_journey();
        journey.doctor_visit_start = None;
        journey.doctor_visit_end = None;
        assert!(journey.finalize(30.0).is_err());
    }

    #[test]
    fn test_in_progress_journey_is_chronological() {
        let mut journey = PatientJourney::new(PatientId::new(4), 10.0);
        journey.registration_start = Some(12.0);
        assert!(journey.is_chronological());
        assert_eq!(journey.exam_room_interval(), None);
    }
}
