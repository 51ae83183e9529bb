//! Main simulation orchestrator
//!
//! [`ClinicSimulation`] wires the clinic model, journey tracker, sampler and
//! scheduler together and drives every process until the run's duration is
//! reached. Resumptions at or after the stop time are never processed;
//! patients still mid-visit at that point are reported as in progress.

use crate::clinic::{ClinicModel, RequestOutcome, ResourceStatus};
use crate::events::ClinicEvent;
use crate::patient::{ArrivalGenerator, JourneyTracker, PatientJourney};
use crate::simulation::{
    Process, ProcessContext, Resumption, Sampler, Scheduler, SimTime, SimulationError,
    SimulationResult, SimulationStatistics, StatusMonitor, Suspend,
};
use crate::types::{
    AdmissionPolicy, ClinicConfiguration, ProcessId, RunParameters, ServiceTimeSpec,
    SimulationConfig,
};
use crate::{perf_span, sim_event};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Everything a finished run produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Unique identifier of this run
    pub run_id: Uuid,
    /// Wall-clock time the report was produced
    pub generated_at: DateTime<Utc>,
    /// Completed journeys in discharge order
    pub journeys: Vec<PatientJourney>,
    /// Journeys of patients still in the clinic at the stop time
    pub in_progress: Vec<PatientJourney>,
    /// Simulated duration in minutes
    pub simulation_duration: SimTime,
    /// Mean inter-arrival time used
    pub mean_arrival_interval: f64,
    /// Random seed used
    pub seed: u64,
    /// Admission policy in force
    pub admission_policy: AdmissionPolicy,
    /// Clinic configuration used
    pub clinic_config: ClinicConfiguration,
    /// Service-time distributions used
    pub service_time_config: ServiceTimeSpec,
    /// Aggregate statistics
    pub statistics: SimulationStatistics,
    /// Clinic event log
    pub event_log: Vec<ClinicEvent>,
    /// Periodic status snapshots, when sampling was enabled
    pub status_samples: Vec<ResourceStatus>,
    /// Status at the stop time
    pub final_status: ResourceStatus,
}

impl SimulationReport {
    /// Number of completed journeys
    pub fn total_patients(&self) -> usize {
        self.journeys.len()
    }

    /// Write completed journeys as JSON lines
    pub fn write_journeys<W: Write>(&self, writer: &mut W) -> SimulationResult<()> {
        for journey in &self.journeys {
            serde_json::to_writer(&mut *writer, journey)?;
            writeln!(writer)?;
        }
        Ok(())
    }

    /// Write the event log as JSON lines
    pub fn write_event_log<W: Write>(&self, writer: &mut W) -> SimulationResult<()> {
        for event in &self.event_log {
            writeln!(writer, "{}", event.to_json_line()?)?;
        }
        Ok(())
    }
}

/// A single clinic simulation run, advanced step by step or to completion
#[derive(Debug)]
pub struct ClinicSimulation {
    clinic: ClinicModel,
    tracker: JourneyTracker,
    sampler: Sampler,
    scheduler: Scheduler,
    processes: BTreeMap<ProcessId, Process>,
    next_process: u64,
    arrivals: ProcessId,
    service_times: ServiceTimeSpec,
    params: RunParameters,
    status_samples: Vec<ResourceStatus>,
    started: bool,
    failed: Option<String>,
}

impl ClinicSimulation {
    /// Validate the inputs and set up a run with exponential arrivals
    #[instrument(skip_all, fields(duration = params.duration, seed = params.seed))]
    pub fn new(
        config: ClinicConfiguration,
        service_times: ServiceTimeSpec,
        params: RunParameters,
    ) -> SimulationResult<Self> {
        params.validate()?;
        service_times.validate()?;
        let clinic = ClinicModel::new(config)?;
        let sampler = Sampler::new(&service_times, params.mean_arrival_interval, params.seed)?;

        info!(
            duration = params.duration,
            mean_arrival_interval = params.mean_arrival_interval,
            seed = params.seed,
            "Clinic simulation initialized"
        );

        let mut simulation = Self {
            clinic,
            tracker: JourneyTracker::new(),
            sampler,
            scheduler: Scheduler::new(),
            processes: BTreeMap::new(),
            next_process: 0,
            arrivals: ProcessId(0),
            service_times,
            params,
            status_samples: Vec::new(),
            started: false,
            failed: None,
        };
        simulation.arrivals =
            simulation.register(Process::Arrivals(ArrivalGenerator::exponential()));
        Ok(simulation)
    }

    /// Set up a run from the top-level configuration
    pub fn from_config(config: &SimulationConfig) -> SimulationResult<Self> {
        config.validate()?;
        let simulation = Self::new(
            config.clinic.clone(),
            config.service_times.clone(),
            config.run_parameters(),
        )?
        .with_admission_policy(config.admission_policy)?;

        match config.status_interval {
            Some(interval) => simulation.with_status_interval(interval),
            None => Ok(simulation),
        }
    }

    fn ensure_not_started(&self, what: &str) -> SimulationResult<()> {
        if self.started {
            return Err(SimulationError::configuration_error(format!(
                "{} must be set before the run starts",
                what
            )));
        }
        Ok(())
    }

    /// Choose how arrivals are admitted
    pub fn with_admission_policy(mut self, policy: AdmissionPolicy) -> SimulationResult<Self> {
        self.ensure_not_started("admission policy")?;
        self.clinic = self.clinic.with_admission_policy(policy);
        Ok(self)
    }

    /// Record a resource status snapshot every `interval` simulated minutes
    pub fn with_status_interval(mut self, interval: SimTime) -> SimulationResult<Self> {
        self.ensure_not_started("status interval")?;
        let monitor = StatusMonitor::new(interval)?;
        self.register(Process::Monitor(monitor));
        Ok(self)
    }

    /// Replace exponential arrivals with arrivals at exactly these times
    pub fn with_scripted_arrivals(
        mut self,
        times: impl IntoIterator<Item = SimTime>,
    ) -> SimulationResult<Self> {
        self.ensure_not_started("scripted arrivals")?;
        let generator = ArrivalGenerator::scripted(times)?;
        self.processes.insert(self.arrivals, Process::Arrivals(generator));
        Ok(self)
    }

    fn register(&mut self, process: Process) -> ProcessId {
        let id = ProcessId(self.next_process);
        self.next_process += 1;
        self.processes.insert(id, process);
        self.scheduler.schedule_start(id);
        id
    }

    /// Current simulated time
    pub fn now(&self) -> SimTime {
        self.scheduler.now()
    }

    /// Run parameters
    pub fn params(&self) -> &RunParameters {
        &self.params
    }

    /// The clinic model
    pub fn clinic(&self) -> &ClinicModel {
        &self.clinic
    }

    /// The journey tracker
    pub fn tracker(&self) -> &JourneyTracker {
        &self.tracker
    }

    /// Resource status at the current simulated time
    pub fn status(&self) -> ResourceStatus {
        self.clinic.resource_status(self.now(), &self.tracker)
    }

    /// Process every resumption before `time` (capped at the run duration) and move the clock there
    ///
    /// A fault stops the run for good: the failing process gives back what it
    /// held and every later call returns an error.
    pub fn run_until(&mut self, time: SimTime) -> SimulationResult<()> {
        if let Some(reason) = &self.failed {
            return Err(SimulationError::invariant_violation(format!(
                "run already failed: {}",
                reason
            )));
        }
        if time.is_nan() {
            return Err(SimulationError::invariant_violation("cannot run until NaN"));
        }
        self.started = true;
        let deadline = time.min(self.params.duration);

        while let Some((process, resumption)) = self.scheduler.pop_before(deadline) {
            if let Err(error) = self.dispatch(process, resumption) {
                self.abort(process, &error);
                return Err(error);
            }
        }
        debug!(time = deadline, pending = self.scheduler.pending_count(), "Run paused");
        self.scheduler.advance_to(deadline);
        Ok(())
    }

    fn abort(&mut self, id: ProcessId, error: &SimulationError) {
        warn!(process = %id, time = self.now(), error = %error, "Simulation failed");
        self.failed = Some(error.to_string());

        if let Some(mut process) = self.processes.remove(&id) {
            let mut spawned = Vec::new();
            let mut ctx = ProcessContext {
                clinic: &mut self.clinic,
                tracker: &mut self.tracker,
                sampler: &mut self.sampler,
                scheduler: &mut self.scheduler,
                spawned: &mut spawned,
                status_samples: &mut self.status_samples,
            };
            if let Err(release_error) = process.abandon(&mut ctx) {
                warn!(process = %id, error = %release_error, "Could not release held resources");
            }
        }
    }

    fn dispatch(&mut self, id: ProcessId, resumption: Resumption) -> SimulationResult<()> {
        let process = self.processes.get_mut(&id).ok_or_else(|| {
            SimulationError::invariant_violation(format!("resumption for unknown process {}", id))
        })?;

        let mut spawned = Vec::new();
        let suspend = {
            let mut ctx = ProcessContext {
                clinic: &mut self.clinic,
                tracker: &mut self.tracker,
                sampler: &mut self.sampler,
                scheduler: &mut self.scheduler,
                spawned: &mut spawned,
                status_samples: &mut self.status_samples,
            };
            process.resume(resumption, &mut ctx)?
        };

        for patient in spawned {
            self.register(Process::Patient(Box::new(patient)));
        }

        match suspend {
            Suspend::Timeout(delay) => self.scheduler.schedule_timeout(id, delay)?,
            Suspend::Request(kind) => match self.clinic.request(kind, id)? {
                RequestOutcome::Granted(grant) => self.scheduler.schedule_grant(grant),
                RequestOutcome::Queued { position } => {
                    let now = self.now();
                    debug!(process = %id, resource = %kind, position, time = now, "Queued");
                }
            },
            Suspend::Finished => {
                self.processes.remove(&id);
            }
        }
        Ok(())
    }

    /// Run to the configured duration and build the report
    #[instrument(skip(self), fields(duration = self.params.duration))]
    pub fn finish(mut self) -> SimulationResult<SimulationReport> {
        {
            let _span = perf_span!("clinic_run", duration = self.params.duration).entered();
            self.run_until(self.params.duration)?;
        }

        let in_progress: Vec<PatientJourney> = self
            .processes
            .values()
            .filter_map(|process| match process {
                Process::Patient(patient) => patient.journey().cloned(),
                _ => None,
            })
            .collect();

        let completed_count = self.tracker.completed().len() as u64;
        let accounted =
            completed_count + in_progress.len() as u64 + self.clinic.patients_balked();
        if accounted != self.clinic.patients_arrived() {
            return Err(SimulationError::invariant_violation(format!(
                "{} arrivals but {} patients accounted for",
                self.clinic.patients_arrived(),
                accounted
            )));
        }

        let final_status = self.status();
        let statistics = SimulationStatistics::compute(
            &self.clinic,
            self.tracker.completed(),
            &in_progress,
            self.tracker.stage_counts(),
            self.params.duration,
        );

        sim_event!(
            info,
            "Clinic simulation complete",
            arrived = statistics.patients_arrived,
            served = statistics.patients_served,
            balked = statistics.patients_balked,
            in_system = statistics.patients_in_system,
        );

        Ok(SimulationReport {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            event_log: self.clinic.take_event_log(),
            admission_policy: self.clinic.admission_policy(),
            clinic_config: self.clinic.config().clone(),
            journeys: self.tracker.into_completed(),
            in_progress,
            simulation_duration: self.params.duration,
            mean_arrival_interval: self.params.mean_arrival_interval,
            seed: self.params.seed,
            service_time_config: self.service_times,
            statistics,
            status_samples: self.status_samples,
            final_status,
        })
    }
}

/// Run a complete simulation with exponential arrivals and unenforced admission
pub fn run_simulation(
    config: &ClinicConfiguration,
    service_times: &ServiceTimeSpec,
    params: RunParameters,
) -> SimulationResult<SimulationReport> {
    ClinicSimulation::new(config.clone(), service_times.clone(), params)?.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ResourceKind, StageServiceTime};

    #[test]
    fn test_default_run_produces_consistent_report() {
        let config = ClinicConfiguration::default();
        let params = RunParameters::from_config(&config, 5.0);
        let report = run_simulation(&config, &ServiceTimeSpec::default(), params).unwrap();

        assert!(report.total_patients() > 0);
        assert_eq!(report.simulation_duration, 120.0);
        assert_eq!(report.clinic_config, config);
        assert_eq!(report.statistics.patients_balked, 0);
        assert_eq!(
            report.statistics.patients_arrived,
            (report.journeys.len() + report.in_progress.len()) as u64
        );
        assert_eq!(report.final_status.time, 120.0);
        for journey in &report.journeys {
            assert!(journey.service_completed);
            assert!(journey.departure_time.unwrap() < 120.0);
        }
    }

    #[test]
    fn test_invalid_inputs_fail_before_running() {
        let config = ClinicConfiguration::default();
        let spec = ServiceTimeSpec::default();

        assert!(run_simulation(&config, &spec, RunParameters::new(0.0, 5.0, 1)).is_err());
        assert!(run_simulation(&config, &spec, RunParameters::new(60.0, 0.0, 1)).is_err());

        let mut no_nurses = config.clone();
        no_nurses.set_capacity(ResourceKind::Nurses, 0);
        assert!(matches!(
            run_simulation(&no_nurses, &spec, RunParameters::new(60.0, 5.0, 1)),
            Err(SimulationError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_stepwise_run_matches_single_run() {
        let config = ClinicConfiguration::default();
        let spec = ServiceTimeSpec::default();
        let params = RunParameters::new(120.0, 4.0, 9);

        let mut stepwise = ClinicSimulation::new(config.clone(), spec.clone(), params).unwrap();
        for t in [10.0, 30.0, 30.0, 75.5] {
            stepwise.run_until(t).unwrap();
            assert_eq!(stepwise.now(), t);
            assert!(stepwise.status().utilizations_in_bounds());
        }
        let stepwise = stepwise.finish().unwrap();
        let direct = run_simulation(&config, &spec, params).unwrap();

        assert_eq!(
            serde_json::to_string(&stepwise.journeys).unwrap(),
            serde_json::to_string(&direct.journeys).unwrap()
        );
    }

    #[test]
    fn test_run_until_is_capped_at_duration() {
        let config = ClinicConfiguration::default();
        let params = RunParameters::new(30.0, 5.0, 1);
        let mut simulation =
            ClinicSimulation::new(config, ServiceTimeSpec::default(), params).unwrap();
        simulation.run_until(500.0).unwrap();
        assert_eq!(simulation.now(), 30.0);
    }

    /// Registration 3, nurse 8, doctor 12 minutes, every time
    fn fixed_service_times() -> ServiceTimeSpec {
        ServiceTimeSpec {
            registration: StageServiceTime::fixed(3.0, 0.5),
            nurse_visit: StageServiceTime::fixed(8.0, 1.0),
            doctor_visit: StageServiceTime::fixed(12.0, 2.0),
        }
    }

    #[test]
    fn test_failed_process_releases_resources_and_stops_the_run() {
        let params = RunParameters::new(60.0, 5.0, 3);
        let mut simulation =
            ClinicSimulation::new(ClinicConfiguration::uniform(1), fixed_service_times(), params)
                .unwrap()
                .with_scripted_arrivals([0.0])
                .unwrap();

        // Mid nurse visit: holding an exam room and a nurse
        simulation.run_until(5.0).unwrap();
        let status = simulation.status();
        assert_eq!(status.pool(ResourceKind::ExamRooms).unwrap().in_use, 1);
        assert_eq!(status.pool(ResourceKind::Nurses).unwrap().in_use, 1);

        let patient = simulation
            .processes
            .iter()
            .find(|(_, process)| matches!(process, Process::Patient(_)))
            .map(|(id, _)| *id)
            .unwrap();
        simulation.scheduler.schedule_start(patient);

        assert!(matches!(
            simulation.run_until(10.0),
            Err(SimulationError::InvariantViolation(_))
        ));
        let status = simulation.status();
        for kind in ResourceKind::ALL {
            assert_eq!(status.pool(kind).unwrap().in_use, 0, "{} still held", kind);
        }
        assert!(status.exam_room_occupancy.is_empty());
        assert!(!simulation.processes.contains_key(&patient));

        assert!(simulation.run_until(20.0).is_err());
        assert!(simulation.finish().is_err());
    }

    #[test]
    fn test_overflowing_service_time_fails_the_run() {
        let mut spec = ServiceTimeSpec::default();
        spec.doctor_visit = StageServiceTime::new(1.7e308, 1.7e308, 2.0);
        let params = RunParameters::new(480.0, 2.0, 3);
        let mut simulation =
            ClinicSimulation::new(ClinicConfiguration::uniform(20), spec, params).unwrap();

        assert!(matches!(
            simulation.run_until(480.0),
            Err(SimulationError::SamplingError(_))
        ));
        assert!(simulation.status().utilizations_in_bounds());
        assert!(simulation.run_until(480.0).is_err());
        assert!(simulation.finish().is_err());
    }

    #[test]
    fn test_builders_rejected_after_start() {
        let config = ClinicConfiguration::default();
        let params = RunParameters::new(30.0, 5.0, 1);
        let mut simulation =
            ClinicSimulation::new(config, ServiceTimeSpec::default(), params).unwrap();
        simulation.run_until(1.0).unwrap();
        assert!(simulation.with_status_interval(5.0).is_err());
    }
}
