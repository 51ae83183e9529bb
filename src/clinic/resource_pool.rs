//! Capacity resource pools
//!
//! A pool grants up to `capacity` concurrent holders and queues everyone else
//! in strict FIFO order. A unit freed by a release goes straight to the head
//! of the queue; it is never returned to the free count while anyone waits.

use crate::clinic::PoolStatus;
use crate::simulation::{SimulationError, SimulationResult};
use crate::types::{ProcessId, ResourceKind};
use std::collections::VecDeque;

/// Proof that a process holds one unit of a resource kind
///
/// Grants cannot be cloned; handing one back to [`ResourcePool::release`] is
/// the only way to free the unit.
#[must_use = "a resource grant must be released exactly once"]
#[derive(Debug, PartialEq, Eq)]
pub struct ResourceGrant {
    kind: ResourceKind,
    holder: ProcessId,
}

impl ResourceGrant {
    pub(crate) fn new(kind: ResourceKind, holder: ProcessId) -> Self {
        Self { kind, holder }
    }

    /// The resource kind this grant is for
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// The process holding the unit
    pub fn holder(&self) -> ProcessId {
        self.holder
    }
}

/// Result of a resource request
#[derive(Debug, PartialEq, Eq)]
pub enum RequestOutcome {
    /// A unit was free and nobody was waiting
    Granted(ResourceGrant),
    /// The request joined the wait queue at this 1-based position
    Queued {
        /// Position in the FIFO queue
        position: usize,
    },
}

/// Counting resource with a FIFO wait queue
#[derive(Debug, Clone)]
pub struct ResourcePool {
    kind: ResourceKind,
    capacity: usize,
    holders: Vec<ProcessId>,
    queue: VecDeque<ProcessId>,
}

impl ResourcePool {
    /// Create a pool; capacity must be positive
    pub fn new(kind: ResourceKind, capacity: usize) -> SimulationResult<Self> {
        if capacity == 0 {
            return Err(SimulationError::configuration_error(format!(
                "{} pool requires a positive capacity",
                kind
            )));
        }
        Ok(Self { kind, capacity, holders: Vec::with_capacity(capacity), queue: VecDeque::new() })
    }

    /// Resource kind served by this pool
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Configured capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Units currently held
    pub fn in_use(&self) -> usize {
        self.holders.len()
    }

    /// Units currently free
    pub fn available(&self) -> usize {
        self.capacity - self.holders.len()
    }

    /// Requests waiting for a unit
    pub fn queue_length(&self) -> usize {
        self.queue.len()
    }

    /// Fraction of capacity currently held
    pub fn utilization(&self) -> f64 {
        self.in_use() as f64 / self.capacity as f64
    }

    /// Whether `process` holds a unit
    pub fn is_holding(&self, process: ProcessId) -> bool {
        self.holders.contains(&process)
    }

    /// Whether `process` is waiting for a unit
    pub fn is_queued(&self, process: ProcessId) -> bool {
        self.queue.contains(&process)
    }

    /// Request one unit for `process`
    ///
    /// Grants immediately only when a unit is free and the queue is empty;
    /// otherwise the request waits behind everyone already queued.
    pub fn request(&mut self, process: ProcessId) -> SimulationResult<RequestOutcome> {
        if self.is_holding(process) {
            return Err(SimulationError::invariant_violation(format!(
                "{} requested a second unit of {}",
                process, self.kind
            )));
        }
        if self.is_queued(process) {
            return Err(SimulationError::invariant_violation(format!(
                "{} is already queued for {}",
                process, self.kind
            )));
        }

        if self.queue.is_empty() && self.holders.len() < self.capacity {
            self.holders.push(process);
            return Ok(RequestOutcome::Granted(ResourceGrant::new(self.kind, process)));
        }

        self.queue.push_back(process);
        Ok(RequestOutcome::Queued { position: self.queue.len() })
    }

    /// Release a held unit, handing it to the head of the queue if anyone waits
    pub fn release(&mut self, grant: ResourceGrant) -> SimulationResult<Option<ResourceGrant>> {
        if grant.kind != self.kind {
            return Err(SimulationError::invariant_violation(format!(
                "{} grant released into the {} pool",
                grant.kind, self.kind
            )));
        }
        let index = self.holders.iter().position(|holder| *holder == grant.holder).ok_or_else(|| {
            SimulationError::invariant_violation(format!(
                "{} released {} it does not hold",
                grant.holder, self.kind
            ))
        })?;
        self.holders.swap_remove(index);

        Ok(self.queue.pop_front().map(|next| {
            self.holders.push(next);
            ResourceGrant::new(self.kind, next)
        }))
    }

    /// Point-in-time status of this pool
    pub fn status(&self) -> PoolStatus {
        PoolStatus {
            capacity: self.capacity,
            in_use: self.in_use(),
            queue_length: self.queue_length(),
            utilization: self.utilization(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn granted(outcome: RequestOutcome) -> ResourceGrant {
        match outcome {
            RequestOutcome::Granted(grant) => grant,
            other => panic!("expected immediate grant, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_capacity_pool_is_rejected() {
        assert!(matches!(
            ResourcePool::new(ResourceKind::ExamRooms, 0),
            Err(SimulationError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_grants_up_to_capacity_then_queues() {
        let mut pool = ResourcePool::new(ResourceKind::Nurses, 2).unwrap();
        let _a = granted(pool.request(ProcessId(1)).unwrap());
        let _b = granted(pool.request(ProcessId(2)).unwrap());

        assert_eq!(pool.request(ProcessId(3)).unwrap(), RequestOutcome::Queued { position: 1 });
        assert_eq!(pool.request(ProcessId(4)).unwrap(), RequestOutcome::Queued { position: 2 });
        assert_eq!(pool.in_use(), 2);
        assert_eq!(pool.available(), 0);
        assert_eq!(pool.queue_length(), 2);
        assert_eq!(pool.utilization(), 1.0);
    }

    #[test]
    fn test_release_hands_unit_to_queue_head_in_fifo_order() {
        let mut pool = ResourcePool::new(ResourceKind::Doctors, 1).unwrap();
        let first = granted(pool.request(ProcessId(1)).unwrap());
        pool.request(ProcessId(2)).unwrap();
        pool.request(ProcessId(3)).unwrap();

        let second = pool.release(first).unwrap().expect("queued request granted");
        assert_eq!(second.holder(), ProcessId(2));
        assert_eq!(pool.in_use(), 1);
        assert_eq!(pool.queue_length(), 1);

        let third = pool.release(second).unwrap().expect("queued request granted");
        assert_eq!(third.holder(), ProcessId(3));

        assert!(pool.release(third).unwrap().is_none());
        assert_eq!(pool.in_use(), 0);
        assert_eq!(pool.available(), 1);
    }

    #[test]
    fn test_new_requests_do_not_jump_the_queue() {
        let mut pool = ResourcePool::new(ResourceKind::ExamRooms, 1).unwrap();
        let first = granted(pool.request(ProcessId(1)).unwrap());
        pool.request(ProcessId(2)).unwrap();

        let handed_over = pool.release(first).unwrap().unwrap();
        assert_eq!(handed_over.holder(), ProcessId(2));
        // The unit went to the waiter, so a newcomer queues
        assert!(matches!(pool.request(ProcessId(3)).unwrap(), RequestOutcome::Queued { .. }));
    }

    #[test]
    fn test_double_request_is_an_invariant_violation() {
        let mut pool = ResourcePool::new(ResourceKind::Doctors, 2).unwrap();
        let _grant = granted(pool.request(ProcessId(1)).unwrap());
        assert!(matches!(
            pool.request(ProcessId(1)),
            Err(SimulationError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_releasing_a_foreign_grant_fails() {
        let mut doctors = ResourcePool::new(ResourceKind::Doctors, 1).unwrap();
        let mut nurses = ResourcePool::new(ResourceKind::Nurses, 1).unwrap();
        let nurse_grant = granted(nurses.request(ProcessId(1)).unwrap());
        assert!(matches!(
            doctors.release(nurse_grant),
            Err(SimulationError::InvariantViolation(_))
        ));

        let forged = ResourceGrant::new(ResourceKind::Doctors, ProcessId(5));
        assert!(matches!(doctors.release(forged), Err(SimulationError::InvariantViolation(_))));
    }

    #[test]
    fn test_status_reflects_pool_state() {
        let mut pool = ResourcePool::new(ResourceKind::RegistrationStaff, 4).unwrap();
        let _grant = granted(pool.request(ProcessId(1)).unwrap());
        let status = pool.status();
        assert_eq!(status.capacity, 4);
        assert_eq!(status.in_use, 1);
        assert_eq!(status.queue_length, 0);
        assert_eq!(status.utilization, 0.25);
    }
}
