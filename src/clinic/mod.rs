//! Clinic resources and the clinic model
//!
//! # Overview
//!
//! - **ResourcePool**: counting resource with a strict FIFO wait queue
//! - **WaitingArea**: bounded seat counter used for admission control
//! - **ResourceStatus**: read-only snapshot of pools, seats and room occupancy
//! - **ClinicModel**: owns all of the above plus counters and the event log
//!
//! # Usage Example
//!
//! ```rust
//! use outpatient_clinic_simulator::clinic::*;
//! use outpatient_clinic_simulator::types::*;
//!
//! let mut pool = ResourcePool::new(ResourceKind::Doctors, 1)?;
//! let grant = match pool.request(ProcessId(1))? {
//!     RequestOutcome::Granted(grant) => grant,
//!     RequestOutcome::Queued { .. } => unreachable!(),
//! };
//! assert!(matches!(pool.request(ProcessId(2))?, RequestOutcome::Queued { position: 1 }));
//!
//! // Releasing hands the unit straight to the waiting request
//! let next = pool.release(grant)?.expect("queued request");
//! assert_eq!(next.holder(), ProcessId(2));
//! # let _ = pool.release(next)?;
//! # Ok::<(), outpatient_clinic_simulator::simulation::SimulationError>(())
//! ```

pub mod model;
pub mod resource_pool;
pub mod status;
pub mod waiting_area;

pub use model::*;
pub use resource_pool::*;
pub use status::*;
pub use waiting_area::*;
