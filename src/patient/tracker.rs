//! Journey tracker
//!
//! Follows every patient's lifecycle stage, the waiting-room roster and the
//! exam-room occupancy map, and collects finalized journeys. Patients never
//! see each other's records; each process reports only its own transitions.

use crate::patient::PatientJourney;
use crate::simulation::{SimTime, SimulationError, SimulationResult};
use crate::types::{ExamPhase, PatientId, PatientStage};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Number of in-progress patients in each stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCounts {
    /// Waiting for registration
    pub arrived: usize,
    /// Being registered
    pub registering: usize,
    /// Registered, waiting for an exam room
    pub waiting_for_exam_room: usize,
    /// In an exam room, waiting for or seeing a nurse
    pub in_exam_room_nurse_visit: usize,
    /// In an exam room, waiting for or seeing a doctor
    pub in_exam_room_doctor_visit: usize,
}

impl StageCounts {
    /// Patients still in the clinic
    pub fn total(&self) -> usize {
        self.arrived
            + self.registering
            + self.waiting_for_exam_room
            + self.in_exam_room_nurse_visit
            + self.in_exam_room_doctor_visit
    }
}

/// Live lifecycle tracking and completed-journey collection
#[derive(Debug, Default)]
pub struct JourneyTracker {
    stages: BTreeMap<PatientId, PatientStage>,
    waiting_room: BTreeSet<PatientId>,
    exam_rooms: BTreeMap<usize, PatientId>,
    completed: Vec<PatientJourney>,
}

impl JourneyTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a newly arrived patient in the waiting room
    pub fn start_journey(&mut self, patient_id: PatientId) -> SimulationResult<()> {
        if self.stages.contains_key(&patient_id) {
            return Err(SimulationError::invariant_violation(format!(
                "{} arrived twice",
                patient_id
            )));
        }
        self.stages.insert(patient_id, PatientStage::Arrived);
        self.waiting_room.insert(patient_id);
        Ok(())
    }

    /// Move a patient to the next stage; skipping or going back is an error
    pub fn advance(&mut self, patient_id: PatientId, stage: PatientStage) -> SimulationResult<()> {
        let current = self.stages.get_mut(&patient_id).ok_or_else(|| {
            SimulationError::invariant_violation(format!("{} is not in the clinic", patient_id))
        })?;

        if current.successor() != Some(stage) {
            return Err(SimulationError::invariant_violation(format!(
                "{} cannot move from {} to {}",
                patient_id, current, stage
            )));
        }

        debug!(patient = %patient_id, from = %current, to = %stage, "Stage transition");
        *current = stage;
        Ok(())
    }

    /// Give a patient the lowest-numbered free exam room and move them out of the waiting room
    pub fn assign_exam_room(&mut self, patient_id: PatientId) -> SimulationResult<usize> {
        self.advance(patient_id, PatientStage::InExamRoom(ExamPhase::NurseVisit))?;

        let room_id = (0..).find(|room| !self.exam_rooms.contains_key(room)).unwrap_or_default();
        self.exam_rooms.insert(room_id, patient_id);
        self.waiting_room.remove(&patient_id);
        Ok(room_id)
    }

    /// Discharge a patient: free their room and finalize their journey
    pub fn discharge(
        &mut self,
        mut journey: PatientJourney,
        departure_time: SimTime,
    ) -> SimulationResult<()> {
        let patient_id = journey.patient_id;
        self.advance(patient_id, PatientStage::Discharged)?;

        let room_id = journey.room_id.ok_or_else(|| {
            SimulationError::invariant_violation(format!(
                "{} discharged without a room",
                patient_id
            ))
        })?;
        if self.exam_rooms.remove(&room_id) != Some(patient_id) {
            return Err(SimulationError::invariant_violation(format!(
                "{} does not occupy exam room {}",
                patient_id, room_id
            )));
        }

        journey.finalize(departure_time)?;
        self.stages.remove(&patient_id);
        self.completed.push(journey);
        Ok(())
    }

    /// Drop a patient whose process failed, vacating any room or seat they occupy
    pub(crate) fn withdraw(&mut self, patient_id: PatientId) {
        self.stages.remove(&patient_id);
        self.waiting_room.remove(&patient_id);
        self.exam_rooms.retain(|_, occupant| *occupant != patient_id);
    }

    /// Current stage of a patient still in the clinic
    pub fn stage(&self, patient_id: PatientId) -> Option<PatientStage> {
        self.stages.get(&patient_id).copied()
    }

    /// Patients arrived but not yet in an exam room
    pub fn waiting_room_count(&self) -> usize {
        self.waiting_room.len()
    }

    /// Occupied exam rooms by index
    pub fn exam_room_occupancy(&self) -> &BTreeMap<usize, PatientId> {
        &self.exam_rooms
    }

    /// Patients currently in the clinic
    pub fn active_count(&self) -> usize {
        self.stages.len()
    }

    /// In-progress patients per stage
    pub fn stage_counts(&self) -> StageCounts {
        let mut counts = StageCounts::default();
        for stage in self.stages.values() {
            match stage {
                PatientStage::Arrived => counts.arrived += 1,
                PatientStage::Registering => counts.registering += 1,
                PatientStage::WaitingForExamRoom => counts.waiting_for_exam_room += 1,
                PatientStage::InExamRoom(ExamPhase::NurseVisit) => {
                    counts.in_exam_room_nurse_visit += 1
                }
                PatientStage::InExamRoom(ExamPhase::DoctorVisit) => {
                    counts.in_exam_room_doctor_visit += 1
                }
                PatientStage::Discharged => {}
            }
        }
        counts
    }

    /// Finalized journeys in discharge order
    pub fn completed(&self) -> &[PatientJourney] {
        &self.completed
    }

    /// Take the finalized journeys
    pub fn into_completed(self) -> Vec<PatientJourney> {
        self.completed
    }
}
