//! Random sampling for service times and arrivals
//!
//! One seeded generator feeds every draw in the run. Draws happen in event
//! order, which the scheduler makes deterministic, so a seed fixes the
//! whole run.

use crate::simulation::{SimTime, SimulationError, SimulationResult};
use crate::types::{ServiceStage, ServiceTimeSpec, StageServiceTime};
use rand::{rngs::StdRng, SeedableRng};
use rand_distr::{Distribution, Exp, Normal};

/// Normal distribution floored at a stage minimum
#[derive(Debug, Clone, Copy)]
struct ClampedNormal {
    normal: Normal<f64>,
    minimum: f64,
}

impl ClampedNormal {
    fn new(stage: ServiceStage, spec: &StageServiceTime) -> SimulationResult<Self> {
        let normal = Normal::new(spec.mean, spec.std_dev).map_err(|e| {
            SimulationError::configuration_error(format!(
                "invalid {} service time distribution: {}",
                stage, e
            ))
        })?;
        Ok(Self { normal, minimum: spec.minimum })
    }

    fn sample(&self, rng: &mut StdRng) -> f64 {
        self.normal.sample(rng).max(self.minimum)
    }
}

/// Seeded source of every random quantity in a run
#[derive(Debug, Clone)]
pub struct Sampler {
    rng: StdRng,
    registration: ClampedNormal,
    nurse_visit: ClampedNormal,
    doctor_visit: ClampedNormal,
    inter_arrival: Exp<f64>,
}

impl Sampler {
    /// Build the distributions and seed the generator
    pub fn new(
        service_times: &ServiceTimeSpec,
        mean_arrival_interval: f64,
        seed: u64,
    ) -> SimulationResult<Self> {
        if !(mean_arrival_interval.is_finite() && mean_arrival_interval > 0.0) {
            return Err(SimulationError::configuration_error(format!(
                "mean arrival interval must be positive, got {}",
                mean_arrival_interval
            )));
        }
        let inter_arrival = Exp::new(1.0 / mean_arrival_interval).map_err(|e| {
            SimulationError::configuration_error(format!("invalid arrival distribution: {}", e))
        })?;

        Ok(Self {
            rng: StdRng::seed_from_u64(seed),
            registration: ClampedNormal::new(
                ServiceStage::Registration,
                &service_times.registration,
            )?,
            nurse_visit: ClampedNormal::new(ServiceStage::NurseVisit, &service_times.nurse_visit)?,
            doctor_visit: ClampedNormal::new(
                ServiceStage::DoctorVisit,
                &service_times.doctor_visit,
            )?,
            inter_arrival,
        })
    }

    /// Draw a service duration for a stage, never below the stage minimum
    pub fn service_time(&mut self, stage: ServiceStage) -> SimulationResult<f64> {
        let distribution = match stage {
            ServiceStage::Registration => self.registration,
            ServiceStage::NurseVisit => self.nurse_visit,
            ServiceStage::DoctorVisit => self.doctor_visit,
        };
        let duration = distribution.sample(&mut self.rng);
        if !duration.is_finite() {
            return Err(SimulationError::sampling_error(format!(
                "{} service time draw produced {}",
                stage, duration
            )));
        }
        Ok(duration)
    }

    /// Draw the delay until the next arrival
    pub fn inter_arrival(&mut self) -> SimulationResult<SimTime> {
        let delay = self.inter_arrival.sample(&mut self.rng);
        if !delay.is_finite() {
            return Err(SimulationError::sampling_error(format!(
                "inter-arrival draw produced {}",
                delay
            )));
        }
        Ok(delay)
    }
}
