//! Simulated processes
//!
//! Every process is a resumable state machine. The scheduler hands it a
//! [`Resumption`], the process does its work against the shared
//! [`ProcessContext`] and answers with how it wants to be suspended next.

use crate::clinic::{ClinicModel, ResourceGrant, ResourceStatus};
use crate::patient::{ArrivalGenerator, JourneyTracker, PatientProcess};
use crate::simulation::{
    Resumption, Sampler, Scheduler, SimTime, SimulationResult, StatusMonitor,
};
use crate::types::ResourceKind;

/// The two ways a process can wait, plus termination
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Suspend {
    /// Resume after this many minutes
    Timeout(SimTime),
    /// Resume once a unit of this resource is granted
    Request(ResourceKind),
    /// The process is done and can be dropped
    Finished,
}

/// Shared state a process may touch while it runs
#[derive(Debug)]
pub(crate) struct ProcessContext<'a> {
    pub(crate) clinic: &'a mut ClinicModel,
    pub(crate) tracker: &'a mut JourneyTracker,
    pub(crate) sampler: &'a mut Sampler,
    pub(crate) scheduler: &'a mut Scheduler,
    pub(crate) spawned: &'a mut Vec<PatientProcess>,
    pub(crate) status_samples: &'a mut Vec<ResourceStatus>,
}

impl ProcessContext<'_> {
    /// Current simulated time
    pub(crate) fn now(&self) -> SimTime {
        self.scheduler.now()
    }

    /// Release a unit and wake whoever was next in line for it
    pub(crate) fn release(&mut self, grant: ResourceGrant) -> SimulationResult<()> {
        if let Some(next) = self.clinic.release(grant)? {
            self.scheduler.schedule_grant(next);
        }
        Ok(())
    }
}

/// Every kind of process the scheduler drives
#[derive(Debug)]
pub(crate) enum Process {
    Arrivals(ArrivalGenerator),
    Patient(Box<PatientProcess>),
    Monitor(StatusMonitor),
}

impl Process {
    pub(crate) fn resume(
        &mut self,
        resumption: Resumption,
        ctx: &mut ProcessContext<'_>,
    ) -> SimulationResult<Suspend> {
        match self {
            Process::Arrivals(generator) => generator.resume(resumption, ctx),
            Process::Patient(patient) => patient.resume(resumption, ctx),
            Process::Monitor(monitor) => monitor.resume(resumption, ctx),
        }
    }

    /// Give back whatever the process holds after it failed
    pub(crate) fn abandon(&mut self, ctx: &mut ProcessContext<'_>) -> SimulationResult<()> {
        match self {
            Process::Patient(patient) => patient.abandon(ctx),
            Process::Arrivals(_) | Process::Monitor(_) => Ok(()),
        }
    }
}
