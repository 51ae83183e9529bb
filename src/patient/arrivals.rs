//! Arrival generator
//!
//! A single long-lived process that spawns patients, either with exponential
//! inter-arrival times or at an explicit list of instants.

use crate::patient::PatientProcess;
use crate::simulation::{
    ProcessContext, Resumption, SimTime, SimulationError, SimulationResult, Suspend,
};
use crate::types::AdmissionPolicy;
use std::collections::VecDeque;
use tracing::{debug, warn};

/// When patients arrive
#[derive(Debug, Clone, PartialEq)]
pub enum ArrivalPattern {
    /// Exponential gaps with the run's mean arrival interval
    Exponential,
    /// Arrivals at these absolute times, earliest first
    Scripted(VecDeque<SimTime>),
}

/// Spawns patient processes over the course of the run
#[derive(Debug, Clone)]
pub struct ArrivalGenerator {
    pattern: ArrivalPattern,
}

impl ArrivalGenerator {
    /// Generator drawing exponential inter-arrival times
    pub fn exponential() -> Self {
        Self { pattern: ArrivalPattern::Exponential }
    }

    /// Generator spawning one patient at each given time; several may share an instant
    pub fn scripted(times: impl IntoIterator<Item = SimTime>) -> SimulationResult<Self> {
        let mut times: Vec<SimTime> = times.into_iter().collect();
        if let Some(bad) = times.iter().find(|time| !(time.is_finite() && **time >= 0.0)) {
            return Err(SimulationError::configuration_error(format!(
                "scripted arrival time must be finite and non-negative, got {}",
                bad
            )));
        }
        times.sort_by(f64::total_cmp);
        Ok(Self { pattern: ArrivalPattern::Scripted(times.into()) })
    }

    /// Arrival pattern in use
    pub fn pattern(&self) -> &ArrivalPattern {
        &self.pattern
    }

    fn next_arrival(&self, ctx: &mut ProcessContext<'_>) -> SimulationResult<Suspend> {
        match &self.pattern {
            ArrivalPattern::Exponential => Ok(Suspend::Timeout(ctx.sampler.inter_arrival()?)),
            ArrivalPattern::Scripted(times) => Ok(match times.front() {
                Some(time) => Suspend::Timeout((time - ctx.now()).max(0.0)),
                None => Suspend::Finished,
            }),
        }
    }

    fn spawn_patient(&self, ctx: &mut ProcessContext<'_>) -> SimulationResult<()> {
        let now = ctx.now();
        let patient_id = ctx.clinic.next_patient_id();
        let in_system = ctx.tracker.active_count();

        if !ctx.clinic.admit(in_system) {
            ctx.clinic.record_balk(now, patient_id);
            warn!(patient = %patient_id, time = now, in_system, "Patient balked");
            return Ok(());
        }

        ctx.tracker.start_journey(patient_id)?;
        let holds_seat = ctx.clinic.admission_policy() == AdmissionPolicy::Enforced;
        ctx.spawned.push(PatientProcess::new(patient_id, now, holds_seat));
        debug!(patient = %patient_id, time = now, in_system, "Patient admitted");
        Ok(())
    }

    pub(crate) fn resume(
        &mut self,
        resumption: Resumption,
        ctx: &mut ProcessContext<'_>,
    ) -> SimulationResult<Suspend> {
        match resumption {
            Resumption::Start => self.next_arrival(ctx),
            Resumption::TimeoutElapsed => {
                if let ArrivalPattern::Scripted(times) = &mut self.pattern {
                    times.pop_front();
                }
                self.spawn_patient(ctx)?;
                self.next_arrival(ctx)
            }
            Resumption::Granted(grant) => Err(SimulationError::invariant_violation(format!(
                "arrival generator was granted {}",
                grant.kind()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_times_are_sorted() {
        let generator = ArrivalGenerator::scripted([5.0, 0.0, 2.5, 0.0]).unwrap();
        assert_eq!(
            generator.pattern(),
            &ArrivalPattern::Scripted(VecDeque::from(vec![0.0, 0.0, 2.5, 5.0]))
        );
    }

    #[test]
    fn test_invalid_scripted_times_rejected() {
        assert!(ArrivalGenerator::scripted([1.0, -0.5]).is_err());
        assert!(ArrivalGenerator::scripted([f64::NAN]).is_err());
    }
}
