//! Simulation orchestration and control
//!
//! This module contains the event scheduler, the process model, random
//! sampling, the run orchestrator, statistics and error handling.
//!
//! # Overview
//!
//! - **Scheduler**: time-ordered queue of process resumptions
//! - **Process**: resumable state machines (arrivals, patients, status monitor)
//! - **Sampler**: seeded service-time and inter-arrival draws
//! - **ClinicSimulation**: drives a run and produces a [`SimulationReport`]
//! - **SimulationStatistics**: KPIs derived from the finished journeys
//! - **SimulationError**: error handling for simulation operations
//!
//! # Usage Example
//!
//! ```rust
//! use outpatient_clinic_simulator::simulation::*;
//! use outpatient_clinic_simulator::types::*;
//!
//! let config = ClinicConfiguration::default();
//! let params = RunParameters::new(60.0, 5.0, 7);
//!
//! let simulation = ClinicSimulation::new(config, ServiceTimeSpec::default(), params)?
//!     .with_status_interval(15.0)?;
//! let report = simulation.finish()?;
//!
//! assert_eq!(report.status_samples.len(), 4);
//! println!("{}", report.statistics);
//! # Ok::<(), SimulationError>(())
//! ```

pub mod error;
pub mod logging;
pub mod monitor;
pub mod orchestrator;
pub mod process;
pub mod sampling;
pub mod scheduler;
pub mod statistics;

// Re-export all public types for convenience
pub use error::*;
pub use logging::*;
pub use monitor::*;
pub use orchestrator::*;
pub use process::*;
pub use sampling::*;
pub use scheduler::*;
pub use statistics::*;
