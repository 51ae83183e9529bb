//! Clinic model
//!
//! Owns the configuration, every resource pool, the waiting-area counter, the
//! admission policy and the clinic-wide counters and event log. Patient and
//! arrival processes operate against it through the request/release contract.

use crate::clinic::{RequestOutcome, ResourceGrant, ResourcePool, ResourceStatus, WaitingArea};
use crate::events::{ClinicEvent, ClinicEventType};
use crate::patient::JourneyTracker;
use crate::simulation::{SimTime, SimulationError, SimulationResult};
use crate::types::{AdmissionPolicy, ClinicConfiguration, PatientId, ProcessId, ResourceKind};
use std::collections::BTreeMap;
use tracing::{info, instrument, warn};

/// Shared state of the simulated clinic
#[derive(Debug)]
pub struct ClinicModel {
    config: ClinicConfiguration,
    pools: BTreeMap<ResourceKind, ResourcePool>,
    waiting_area: WaitingArea,
    admission_policy: AdmissionPolicy,
    patients_arrived: u64,
    patients_balked: u64,
    event_log: Vec<ClinicEvent>,
}

impl ClinicModel {
    /// Build the clinic; every capacity must be positive
    #[instrument(
        skip(config),
        fields(doctors = config.num_doctors, exam_rooms = config.num_exam_rooms)
    )]
    pub fn new(config: ClinicConfiguration) -> SimulationResult<Self> {
        config.validate()?;

        let pools = ResourceKind::ALL
            .iter()
            .map(|&kind| ResourcePool::new(kind, config.capacity(kind)).map(|pool| (kind, pool)))
            .collect::<SimulationResult<BTreeMap<_, _>>>()?;
        let waiting_area = WaitingArea::new(config.waiting_room_capacity)?;

        for pool in pools.values() {
            info!(resource = %pool.kind(), capacity = pool.capacity(), "Resource pool ready");
        }
        info!(capacity = waiting_area.capacity(), "Waiting room ready");

        Ok(Self {
            config,
            pools,
            waiting_area,
            admission_policy: AdmissionPolicy::default(),
            patients_arrived: 0,
            patients_balked: 0,
            event_log: Vec::new(),
        })
    }

    /// Set the admission policy applied to new arrivals
    pub fn with_admission_policy(mut self, policy: AdmissionPolicy) -> Self {
        self.admission_policy = policy;
        self
    }

    /// Configuration the clinic was built from
    pub fn config(&self) -> &ClinicConfiguration {
        &self.config
    }

    /// Admission policy in force
    pub fn admission_policy(&self) -> AdmissionPolicy {
        self.admission_policy
    }

    /// Pool for a resource kind
    pub fn pool(&self, kind: ResourceKind) -> SimulationResult<&ResourcePool> {
        self.pools.get(&kind).ok_or_else(|| missing_pool(kind))
    }

    fn pool_mut(&mut self, kind: ResourceKind) -> SimulationResult<&mut ResourcePool> {
        self.pools.get_mut(&kind).ok_or_else(|| missing_pool(kind))
    }

    /// Waiting-area counter
    pub fn waiting_area(&self) -> &WaitingArea {
        &self.waiting_area
    }

    /// Request one unit of `kind` on behalf of `process`
    pub fn request(
        &mut self,
        kind: ResourceKind,
        process: ProcessId,
    ) -> SimulationResult<RequestOutcome> {
        self.pool_mut(kind)?.request(process)
    }

    /// Release a unit; returns the grant handed to the next waiter, if any
    pub fn release(&mut self, grant: ResourceGrant) -> SimulationResult<Option<ResourceGrant>> {
        self.pool_mut(grant.kind())?.release(grant)
    }

    /// Whether the clinic can take another patient right now
    pub fn check_system_capacity(&self, patients_in_system: usize) -> bool {
        if self.waiting_area.available() == 0 {
            warn!("Waiting room at capacity");
            return false;
        }
        if patients_in_system >= self.config.max_patients_in_system {
            warn!(
                in_system = patients_in_system,
                max = self.config.max_patients_in_system,
                "System at patient capacity"
            );
            return false;
        }
        true
    }

    /// Assign the next patient identity, counting the arrival
    pub(crate) fn next_patient_id(&mut self) -> PatientId {
        self.patients_arrived += 1;
        PatientId::new(self.patients_arrived)
    }

    /// Apply the admission policy to an arrival; an admitted patient takes a seat under enforcement
    pub(crate) fn admit(&mut self, patients_in_system: usize) -> bool {
        match self.admission_policy {
            AdmissionPolicy::Unenforced => true,
            AdmissionPolicy::Enforced => {
                self.check_system_capacity(patients_in_system) && self.waiting_area.try_occupy()
            }
        }
    }

    /// Give back a waiting-room seat taken at admission
    pub(crate) fn leave_waiting_room(&mut self) -> SimulationResult<()> {
        self.waiting_area.vacate()
    }

    /// Count a turned-away arrival
    pub(crate) fn record_balk(&mut self, now: SimTime, patient_id: PatientId) {
        self.patients_balked += 1;
        self.log_event(ClinicEvent::new(now, ClinicEventType::Balked, patient_id));
    }

    /// Append to the event log
    pub(crate) fn log_event(&mut self, event: ClinicEvent) {
        self.event_log.push(event);
    }

    /// Events recorded so far
    pub fn event_log(&self) -> &[ClinicEvent] {
        &self.event_log
    }

    /// Take the event log, leaving it empty
    pub(crate) fn take_event_log(&mut self) -> Vec<ClinicEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Arrivals so far, including balked ones
    pub fn patients_arrived(&self) -> u64 {
        self.patients_arrived
    }

    /// Arrivals turned away
    pub fn patients_balked(&self) -> u64 {
        self.patients_balked
    }

    /// Snapshot of every pool, the waiting area and the tracker's live counts
    pub fn resource_status(&self, now: SimTime, tracker: &JourneyTracker) -> ResourceStatus {
        ResourceStatus {
            time: now,
            pools: self.pools.iter().map(|(kind, pool)| (*kind, pool.status())).collect(),
            waiting_area: self.waiting_area.status(),
            waiting_room_patients: tracker.waiting_room_count(),
            exam_room_occupancy: tracker.exam_room_occupancy().clone(),
        }
    }
}

fn missing_pool(kind: ResourceKind) -> SimulationError {
    SimulationError::invariant_violation(format!("no pool for {}", kind))
}
