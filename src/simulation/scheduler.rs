//! Virtual clock and event scheduler
//!
//! Pending resumptions live in a min-heap keyed by `(time, sequence)`. The
//! sequence number is assigned at enqueue time, so resumptions that share an
//! instant come back out in the order they were scheduled.

use crate::clinic::ResourceGrant;
use crate::simulation::{SimulationError, SimulationResult};
use crate::types::ProcessId;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Simulated time in minutes since the start of the run
pub type SimTime = f64;

/// Why a suspended process is being resumed
#[derive(Debug)]
pub enum Resumption {
    /// First activation of a newly registered process
    Start,
    /// A requested delay has elapsed
    TimeoutElapsed,
    /// A requested resource unit has been granted
    Granted(ResourceGrant),
}

#[derive(Debug)]
struct PendingResumption {
    time: SimTime,
    sequence: u64,
    process: ProcessId,
    resumption: Resumption,
}

impl Ord for PendingResumption {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so BinaryHeap pops the earliest time, then the lowest sequence
        other
            .time
            .total_cmp(&self.time)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for PendingResumption {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for PendingResumption {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PendingResumption {}

/// Orders pending resumptions and advances simulated time monotonically
#[derive(Debug, Default)]
pub struct Scheduler {
    now: SimTime,
    next_sequence: u64,
    pending: BinaryHeap<PendingResumption>,
}

impl Scheduler {
    /// Create a scheduler at time zero with nothing pending
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulated time
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Number of resumptions waiting to fire
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Time of the earliest pending resumption
    pub fn next_time(&self) -> Option<SimTime> {
        self.pending.peek().map(|entry| entry.time)
    }

    /// Activate a process at the current time
    pub fn schedule_start(&mut self, process: ProcessId) {
        self.push(self.now, process, Resumption::Start);
    }

    /// Resume a process after `delay` minutes
    pub fn schedule_timeout(&mut self, process: ProcessId, delay: SimTime) -> SimulationResult<()> {
        if !(delay.is_finite() && delay >= 0.0) {
            return Err(SimulationError::invariant_violation(format!(
                "{} requested an invalid delay of {}",
                process, delay
            )));
        }
        self.push(self.now + delay, process, Resumption::TimeoutElapsed);
        Ok(())
    }

    /// Resume the grant's holder at the current time
    pub fn schedule_grant(&mut self, grant: ResourceGrant) {
        let process = grant.holder();
        self.push(self.now, process, Resumption::Granted(grant));
    }

    fn push(&mut self, time: SimTime, process: ProcessId, resumption: Resumption) {
        debug_assert!(time >= self.now, "resumption scheduled in the past");
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.pending.push(PendingResumption { time, sequence, process, resumption });
    }

    /// Pop the next resumption strictly before `deadline`, advancing the clock to it
    pub fn pop_before(&mut self, deadline: SimTime) -> Option<(ProcessId, Resumption)> {
        if self.next_time()? >= deadline {
            return None;
        }
        let entry = self.pending.pop()?;
        self.now = entry.time;
        Some((entry.process, entry.resumption))
    }

    /// Move the clock forward to `time`; never moves it backwards
    pub fn advance_to(&mut self, time: SimTime) {
        if time > self.now {
            self.now = time;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResourceKind;

    fn drain(scheduler: &mut Scheduler, deadline: SimTime) -> Vec<(SimTime, ProcessId)> {
        let mut fired = Vec::new();
        while let Some((process, _)) = scheduler.pop_before(deadline) {
            fired.push((scheduler.now(), process));
        }
        fired
    }

    #[test]
    fn test_resumptions_fire_in_time_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_timeout(ProcessId(1), 10.0).unwrap();
        scheduler.schedule_timeout(ProcessId(2), 5.0).unwrap();
        scheduler.schedule_timeout(ProcessId(3), 20.0).unwrap();

        let fired = drain(&mut scheduler, f64::INFINITY);
        assert_eq!(
            fired,
            vec![(5.0, ProcessId(2)), (10.0, ProcessId(1)), (20.0, ProcessId(3))]
        );
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_same_instant_resumptions_keep_enqueue_order() {
        let mut scheduler = Scheduler::new();
        for id in [7, 3, 9, 1] {
            scheduler.schedule_timeout(ProcessId(id), 4.0).unwrap();
        }
        scheduler.schedule_start(ProcessId(42));

        let order: Vec<u64> = drain(&mut scheduler, f64::INFINITY)
            .into_iter()
            .map(|(_, process)| process.0)
            .collect();
        assert_eq!(order, vec![42, 7, 3, 9, 1]);
    }

    #[test]
    fn test_deadline_is_exclusive() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_timeout(ProcessId(1), 99.5).unwrap();
        scheduler.schedule_timeout(ProcessId(2), 100.0).unwrap();

        let fired = drain(&mut scheduler, 100.0);
        assert_eq!(fired, vec![(99.5, ProcessId(1))]);
        assert_eq!(scheduler.pending_count(), 1);

        scheduler.advance_to(100.0);
        assert_eq!(scheduler.now(), 100.0);
        scheduler.advance_to(50.0);
        assert_eq!(scheduler.now(), 100.0);
    }

    #[test]
    fn test_invalid_delays_are_rejected() {
        let mut scheduler = Scheduler::new();
        assert!(matches!(
            scheduler.schedule_timeout(ProcessId(1), -1.0),
            Err(SimulationError::InvariantViolation(_))
        ));
        assert!(scheduler.schedule_timeout(ProcessId(1), f64::NAN).is_err());
        assert!(scheduler.schedule_timeout(ProcessId(1), f64::INFINITY).is_err());
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_grants_resume_their_holder_now() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_timeout(ProcessId(1), 3.0).unwrap();
        scheduler.pop_before(f64::INFINITY).unwrap();

        scheduler.schedule_grant(ResourceGrant::new(ResourceKind::Doctors, ProcessId(8)));
        let (process, resumption) = scheduler.pop_before(f64::INFINITY).unwrap();
        assert_eq!(process, ProcessId(8));
        assert_eq!(scheduler.now(), 3.0);
        match resumption {
            Resumption::Granted(grant) => assert_eq!(grant.kind(), ResourceKind::Doctors),
            other => panic!("expected grant, got {:?}", other),
        }
    }
}
