//! Patients: journeys, lifecycle tracking and the processes that move them
//!
//! # Overview
//!
//! - **PatientJourney**: per-patient timing record, finalized once at discharge
//! - **JourneyTracker**: live stage map, waiting-room roster, exam-room occupancy
//! - **PatientProcess**: one patient's visit as a resumable state machine
//! - **ArrivalGenerator**: spawns patients at exponential or scripted times

pub mod arrivals;
pub mod journey;
pub mod process;
pub mod tracker;

pub use arrivals::*;
pub use journey::*;
pub use process::*;
pub use tracker::*;
