//! Resource status snapshots
//!
//! Snapshots are recomputed on demand from live pool, waiting-area and
//! journey-tracker state and are never cached across simulated time.

use crate::simulation::SimTime;
use crate::types::{PatientId, ResourceKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Status of one resource pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolStatus {
    /// Configured capacity
    pub capacity: usize,
    /// Units currently held
    pub in_use: usize,
    /// Requests waiting for a unit
    pub queue_length: usize,
    /// `in_use / capacity`
    pub utilization: f64,
}

/// Status of the waiting-area counter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitingAreaStatus {
    /// Total seats
    pub capacity: usize,
    /// Free seats
    pub available: usize,
    /// Occupied seats
    pub occupied: usize,
    /// `occupied / capacity`
    pub utilization: f64,
}

/// Read-only snapshot of every resource in the clinic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceStatus {
    /// Simulated time the snapshot was taken
    pub time: SimTime,
    /// Per-kind pool status
    pub pools: BTreeMap<ResourceKind, PoolStatus>,
    /// Waiting-area counter status
    pub waiting_area: WaitingAreaStatus,
    /// Patients who have arrived but not yet been assigned an exam room
    pub waiting_room_patients: usize,
    /// Occupied exam rooms by room index
    pub exam_room_occupancy: BTreeMap<usize, PatientId>,
}

impl ResourceStatus {
    /// Status of one pool
    pub fn pool(&self, kind: ResourceKind) -> Option<&PoolStatus> {
        self.pools.get(&kind)
    }

    /// Whether every reported utilization lies in `[0, 1]`
    pub fn utilizations_in_bounds(&self) -> bool {
        let in_bounds = |value: f64| (0.0..=1.0).contains(&value);
        self.pools.values().all(|pool| in_bounds(pool.utilization))
            && in_bounds(self.waiting_area.utilization)
    }
}
