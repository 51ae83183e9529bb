//! Waiting-area counter
//!
//! Bounded seat counter for the pre-registration waiting room. It gates
//! admission rather than service, so it has no queue.

use crate::clinic::WaitingAreaStatus;
use crate::simulation::{SimulationError, SimulationResult};

/// Seats in the waiting room; `occupied + available == capacity` always holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitingArea {
    capacity: usize,
    available: usize,
}

impl WaitingArea {
    /// Create an empty waiting area
    pub fn new(capacity: usize) -> SimulationResult<Self> {
        if capacity == 0 {
            return Err(SimulationError::configuration_error(
                "waiting room requires a positive capacity",
            ));
        }
        Ok(Self { capacity, available: capacity })
    }

    /// Total seats
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Free seats
    pub fn available(&self) -> usize {
        self.available
    }

    /// Occupied seats
    pub fn occupied(&self) -> usize {
        self.capacity - self.available
    }

    /// Fraction of seats occupied
    pub fn utilization(&self) -> f64 {
        self.occupied() as f64 / self.capacity as f64
    }

    /// Take a seat if one is free
    pub fn try_occupy(&mut self) -> bool {
        if self.available == 0 {
            return false;
        }
        self.available -= 1;
        true
    }

    /// Give a seat back
    pub fn vacate(&mut self) -> SimulationResult<()> {
        if self.available == self.capacity {
            return Err(SimulationError::invariant_violation(
                "waiting room vacated while already empty",
            ));
        }
        self.available += 1;
        Ok(())
    }

    /// Point-in-time status
    pub fn status(&self) -> WaitingAreaStatus {
        WaitingAreaStatus {
            capacity: self.capacity,
            available: self.available,
            occupied: self.occupied(),
            utilization: self.utilization(),
        }
    }
}
