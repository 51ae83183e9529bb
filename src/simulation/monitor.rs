//! Periodic resource status sampling

use crate::simulation::{
    ProcessContext, Resumption, SimTime, SimulationError, SimulationResult, Suspend,
};
use tracing::debug;

/// Records a resource status snapshot at time zero and every `interval` minutes after
///
/// Draws no random numbers, so enabling it leaves every journey unchanged.
#[derive(Debug, Clone)]
pub struct StatusMonitor {
    interval: SimTime,
}

impl StatusMonitor {
    /// Create a monitor; the interval must be positive
    pub fn new(interval: SimTime) -> SimulationResult<Self> {
        if !(interval.is_finite() && interval > 0.0) {
            return Err(SimulationError::configuration_error(format!(
                "status interval must be positive, got {}",
                interval
            )));
        }
        Ok(Self { interval })
    }

    /// Sampling interval in minutes
    pub fn interval(&self) -> SimTime {
        self.interval
    }

    pub(crate) fn resume(
        &mut self,
        resumption: Resumption,
        ctx: &mut ProcessContext<'_>,
    ) -> SimulationResult<Suspend> {
        match resumption {
            Resumption::Start | Resumption::TimeoutElapsed => {
                let status = ctx.clinic.resource_status(ctx.now(), ctx.tracker);
                debug!(
                    time = status.time,
                    waiting_room = status.waiting_room_patients,
                    rooms_occupied = status.exam_room_occupancy.len(),
                    "Resource status sampled"
                );
                ctx.status_samples.push(status);
                Ok(Suspend::Timeout(self.interval))
            }
            Resumption::Granted(grant) => Err(SimulationError::invariant_violation(format!(
                "status monitor was granted {}",
                grant.kind()
            ))),
        }
    }
}
