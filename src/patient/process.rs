//! Patient process
//!
//! One patient's visit as a resumable state machine:
//! registration, exam room, nurse visit, doctor visit, discharge. Each step
//! either asks for a resource or waits out a sampled service time; nothing
//! is skipped and nothing runs out of order.

use crate::clinic::ResourceGrant;
use crate::events::{ClinicEvent, ClinicEventType};
use crate::patient::PatientJourney;
use crate::simulation::{
    ProcessContext, Resumption, SimTime, SimulationError, SimulationResult, Suspend,
};
use crate::types::{ExamPhase, PatientId, PatientStage, ResourceKind, ServiceStage};
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Arrive,
    AwaitRegistration,
    Registering,
    AwaitExamRoom,
    AwaitNurse,
    NurseVisit,
    AwaitDoctor,
    DoctorVisit,
    Done,
}

/// A single patient moving through the clinic
#[derive(Debug)]
pub struct PatientProcess {
    patient_id: PatientId,
    journey: Option<PatientJourney>,
    step: Step,
    holds_seat: bool,
    held: BTreeMap<ResourceKind, ResourceGrant>,
    service_duration: f64,
}

impl PatientProcess {
    pub(crate) fn new(patient_id: PatientId, arrival_time: SimTime, holds_seat: bool) -> Self {
        Self {
            patient_id,
            journey: Some(PatientJourney::new(patient_id, arrival_time)),
            step: Step::Arrive,
            holds_seat,
            held: BTreeMap::new(),
            service_duration: 0.0,
        }
    }

    /// Patient identity
    pub fn patient_id(&self) -> PatientId {
        self.patient_id
    }

    /// The journey so far; `None` once discharged
    pub fn journey(&self) -> Option<&PatientJourney> {
        self.journey.as_ref()
    }

    /// Resource kinds currently held
    pub fn held_resources(&self) -> impl Iterator<Item = ResourceKind> + '_ {
        self.held.keys().copied()
    }

    fn journey_mut(&mut self) -> SimulationResult<&mut PatientJourney> {
        let patient_id = self.patient_id;
        self.journey.as_mut().ok_or_else(|| {
            SimulationError::invariant_violation(format!(
                "{} has already been discharged",
                patient_id
            ))
        })
    }

    fn hold(&mut self, grant: ResourceGrant, expected: ResourceKind) -> SimulationResult<()> {
        if grant.kind() != expected {
            return Err(SimulationError::invariant_violation(format!(
                "{} expected {} but was granted {}",
                self.patient_id,
                expected,
                grant.kind()
            )));
        }
        if self.held.contains_key(&expected) {
            return Err(SimulationError::invariant_violation(format!(
                "{} would hold two units of {}",
                self.patient_id, expected
            )));
        }
        self.held.insert(expected, grant);
        Ok(())
    }

    fn release(
        &mut self,
        kind: ResourceKind,
        ctx: &mut ProcessContext<'_>,
    ) -> SimulationResult<()> {
        let grant = self.held.remove(&kind).ok_or_else(|| {
            SimulationError::invariant_violation(format!(
                "{} released {} it does not hold",
                self.patient_id, kind
            ))
        })?;
        ctx.release(grant)
    }

    fn begin_service(
        &mut self,
        stage: ServiceStage,
        ctx: &mut ProcessContext<'_>,
    ) -> SimulationResult<Suspend> {
        let staff = stage.performed_by();
        if !self.held.contains_key(&staff) {
            return Err(SimulationError::invariant_violation(format!(
                "{} started {} without holding {}",
                self.patient_id, stage, staff
            )));
        }

        self.service_duration = ctx.sampler.service_time(stage)?;
        debug!(
            patient = %self.patient_id,
            stage = %stage,
            staff = %staff,
            time = ctx.now(),
            duration = self.service_duration,
            "Service started"
        );
        Ok(Suspend::Timeout(self.service_duration))
    }

    /// Hand back every unit and seat still held; used when the process cannot continue
    pub(crate) fn abandon(&mut self, ctx: &mut ProcessContext<'_>) -> SimulationResult<()> {
        let held = std::mem::take(&mut self.held);
        for grant in held.into_values() {
            ctx.release(grant)?;
        }
        if self.holds_seat {
            ctx.clinic.leave_waiting_room()?;
            self.holds_seat = false;
        }
        ctx.tracker.withdraw(self.patient_id);
        self.journey = None;
        self.step = Step::Done;
        Ok(())
    }

    fn event(&self, ctx: &ProcessContext<'_>, event_type: ClinicEventType) -> ClinicEvent {
        ClinicEvent::new(ctx.now(), event_type, self.patient_id)
    }

    pub(crate) fn resume(
        &mut self,
        resumption: Resumption,
        ctx: &mut ProcessContext<'_>,
    ) -> SimulationResult<Suspend> {
        let now = ctx.now();
        let patient_id = self.patient_id;

        match (self.step, resumption) {
            (Step::Arrive, Resumption::Start) => {
                debug!(patient = %patient_id, time = now, "Patient arrived, awaiting registration");
                let event = self.event(ctx, ClinicEventType::Arrival);
                ctx.clinic.log_event(event);
                self.step = Step::AwaitRegistration;
                Ok(Suspend::Request(ResourceKind::RegistrationStaff))
            }

            (Step::AwaitRegistration, Resumption::Granted(grant)) => {
                self.hold(grant, ResourceKind::RegistrationStaff)?;
                ctx.tracker.advance(patient_id, PatientStage::Registering)?;
                self.journey_mut()?.registration_start = Some(now);
                self.step = Step::Registering;
                self.begin_service(ServiceStage::Registration, ctx)
            }

            (Step::Registering, Resumption::TimeoutElapsed) => {
                self.journey_mut()?.registration_end = Some(now);
                self.release(ResourceKind::RegistrationStaff, ctx)?;
                let event = self
                    .event(ctx, ClinicEventType::RegistrationComplete)
                    .with_duration(self.service_duration);
                ctx.clinic.log_event(event);

                ctx.tracker.advance(patient_id, PatientStage::WaitingForExamRoom)?;
                self.step = Step::AwaitExamRoom;
                Ok(Suspend::Request(ResourceKind::ExamRooms))
            }

            (Step::AwaitExamRoom, Resumption::Granted(grant)) => {
                self.hold(grant, ResourceKind::ExamRooms)?;
                let room_id = ctx.tracker.assign_exam_room(patient_id)?;
                let journey = self.journey_mut()?;
                journey.exam_room_assigned = Some(now);
                journey.room_id = Some(room_id);

                if self.holds_seat {
                    ctx.clinic.leave_waiting_room()?;
                    self.holds_seat = false;
                }

                debug!(patient = %patient_id, room = room_id, time = now, "Moved to exam room");
                let event = self.event(ctx, ClinicEventType::ExamRoomAssigned).with_room(room_id);
                ctx.clinic.log_event(event);
                self.step = Step::AwaitNurse;
                Ok(Suspend::Request(ResourceKind::Nurses))
            }

            (Step::AwaitNurse, Resumption::Granted(grant)) => {
                self.hold(grant, ResourceKind::Nurses)?;
                self.journey_mut()?.nurse_visit_start = Some(now);
                self.step = Step::NurseVisit;
                self.begin_service(ServiceStage::NurseVisit, ctx)
            }

            (Step::NurseVisit, Resumption::TimeoutElapsed) => {
                self.journey_mut()?.nurse_visit_end = Some(now);
                self.release(ResourceKind::Nurses, ctx)?;
                let event = self
                    .event(ctx, ClinicEventType::NurseVisitComplete)
                    .with_duration(self.service_duration);
                ctx.clinic.log_event(event);

                let stage = PatientStage::InExamRoom(ExamPhase::DoctorVisit);
                ctx.tracker.advance(patient_id, stage)?;
                self.step = Step::AwaitDoctor;
                Ok(Suspend::Request(ResourceKind::Doctors))
            }

            (Step::AwaitDoctor, Resumption::Granted(grant)) => {
                self.hold(grant, ResourceKind::Doctors)?;
                self.journey_mut()?.doctor_visit_start = Some(now);
                self.step = Step::DoctorVisit;
                self.begin_service(ServiceStage::DoctorVisit, ctx)
            }

            (Step::DoctorVisit, Resumption::TimeoutElapsed) => {
                self.journey_mut()?.doctor_visit_end = Some(now);
                self.release(ResourceKind::Doctors, ctx)?;
                let event = self
                    .event(ctx, ClinicEventType::DoctorVisitComplete)
                    .with_duration(self.service_duration);
                ctx.clinic.log_event(event);

                self.release(ResourceKind::ExamRooms, ctx)?;
                let journey = self.journey.take().ok_or_else(|| {
                    SimulationError::invariant_violation(format!("{} discharged twice", patient_id))
                })?;
                ctx.tracker.discharge(journey, now)?;

                debug!(patient = %patient_id, time = now, "Patient discharged");
                let event = self.event(ctx, ClinicEventType::Discharge);
                ctx.clinic.log_event(event);
                self.step = Step::Done;
                Ok(Suspend::Finished)
            }

            (step, resumption) => Err(SimulationError::invariant_violation(format!(
                "{} cannot handle {:?} in step {:?}",
                patient_id, resumption, step
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clinic::{ClinicModel, RequestOutcome, ResourceStatus};
    use crate::patient::JourneyTracker;
    use crate::simulation::{Sampler, Scheduler};
    use crate::types::{ClinicConfiguration, ProcessId, ServiceTimeSpec};

    struct Harness {
        clinic: ClinicModel,
        tracker: JourneyTracker,
        sampler: Sampler,
        scheduler: Scheduler,
        spawned: Vec<PatientProcess>,
        samples: Vec<ResourceStatus>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                clinic: ClinicModel::new(ClinicConfiguration::uniform(1)).unwrap(),
                tracker: JourneyTracker::new(),
                sampler: Sampler::new(&ServiceTimeSpec::default(), 5.0, 3).unwrap(),
                scheduler: Scheduler::new(),
                spawned: Vec::new(),
                samples: Vec::new(),
            }
        }

        fn ctx(&mut self) -> ProcessContext<'_> {
            ProcessContext {
                clinic: &mut self.clinic,
                tracker: &mut self.tracker,
                sampler: &mut self.sampler,
                scheduler: &mut self.scheduler,
                spawned: &mut self.spawned,
                status_samples: &mut self.samples,
            }
        }
    }

    #[test]
    fn test_patient_walks_through_every_step_in_order() {
        let mut h = Harness::new();
        let id = PatientId::new(1);
        let process = ProcessId(1);
        h.tracker.start_journey(id).unwrap();
        let mut patient = PatientProcess::new(id, 0.0, false);

        let mut requested = Vec::new();
        let mut resumption = Resumption::Start;
        loop {
            let suspend = patient.resume(resumption, &mut h.ctx()).unwrap();
            resumption = match suspend {
                Suspend::Request(kind) => {
                    requested.push(kind);
                    match h.clinic.request(kind, process).unwrap() {
                        RequestOutcome::Granted(grant) => Resumption::Granted(grant),
                        other => panic!("uncontended request queued: {:?}", other),
                    }
                }
                Suspend::Timeout(delay) => {
                    h.scheduler.schedule_timeout(process, delay).unwrap();
                    h.scheduler.pop_before(f64::INFINITY).unwrap().1
                }
                Suspend::Finished => break,
            };
        }

        assert_eq!(
            requested,
            vec![
                ResourceKind::RegistrationStaff,
                ResourceKind::ExamRooms,
                ResourceKind::Nurses,
                ResourceKind::Doctors
            ]
        );
        assert!(patient.journey().is_none());
        assert_eq!(patient.held_resources().count(), 0);
        for kind in ResourceKind::ALL {
            assert_eq!(h.clinic.pool(kind).unwrap().in_use(), 0, "{} still held", kind);
        }

        let journey = &h.tracker.completed()[0];
        assert!(journey.service_completed);
        assert!(journey.is_chronological());
        assert_eq!(journey.room_id, Some(0));
        assert_eq!(journey.waiting_time, Some(journey.registration_end.unwrap()));

        let kinds: Vec<ClinicEventType> =
            h.clinic.event_log().iter().map(|event| event.event_type).collect();
        assert_eq!(
            kinds,
            vec![
                ClinicEventType::Arrival,
                ClinicEventType::RegistrationComplete,
                ClinicEventType::ExamRoomAssigned,
                ClinicEventType::NurseVisitComplete,
                ClinicEventType::DoctorVisitComplete,
                ClinicEventType::Discharge,
            ]
        );
    }

    #[test]
    fn test_unexpected_resumption_is_fatal() {
        let mut h = Harness::new();
        let id = PatientId::new(1);
        h.tracker.start_journey(id).unwrap();
        let mut patient = PatientProcess::new(id, 0.0, false);

        assert!(matches!(
            patient.resume(Resumption::TimeoutElapsed, &mut h.ctx()),
            Err(SimulationError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_wrong_grant_kind_is_fatal() {
        let mut h = Harness::new();
        let id = PatientId::new(1);
        h.tracker.start_journey(id).unwrap();
        let mut patient = PatientProcess::new(id, 0.0, false);
        patient.resume(Resumption::Start, &mut h.ctx()).unwrap();

        let grant = ResourceGrant::new(ResourceKind::Doctors, ProcessId(1));
        assert!(matches!(
            patient.resume(Resumption::Granted(grant), &mut h.ctx()),
            Err(SimulationError::InvariantViolation(_))
        ));
    }
}
