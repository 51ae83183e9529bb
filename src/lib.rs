//! Outpatient Clinic Simulator
//!
//! A discrete-event simulation of patients moving through an outpatient
//! clinic: registration, a wait for an exam room, a nurse visit and a doctor
//! visit, competing for finite staff and rooms along the way.
//!
//! # Overview
//!
//! Patients arrive over a simulated session, queue first-come-first-served
//! for each resource they need and leave once the doctor is done with them.
//! Every patient's timeline is recorded, and a finished run reports waiting
//! times, throughput and resource utilization.
//!
//! ## Key Features
//!
//! - **Deterministic runs**: identical inputs and seed give identical journeys
//! - **FIFO resource pools**: counted capacity with strict arrival-order queues
//! - **Journey tracking**: live stage map, waiting-room roster, exam-room occupancy
//! - **Admission control**: optional waiting-room and system-capacity enforcement
//! - **Structured output**: JSON-lines journeys and clinic event log
//!
//! ## Quick Start
//!
//! ```rust
//! use outpatient_clinic_simulator::*;
//!
//! let config = ClinicConfiguration::default();
//! let params = RunParameters::new(120.0, 5.0, 42);
//!
//! let report = run_simulation(&config, &ServiceTimeSpec::default(), params)?;
//! println!("Served {} patients", report.statistics.patients_served);
//! # Ok::<(), SimulationError>(())
//! ```
//!
//! ## Module Organization
//!
//! - [`types`]: Identifiers, enums and configuration
//! - [`clinic`]: Resource pools, waiting area and the clinic model
//! - [`patient`]: Journeys, lifecycle tracking and patient processes
//! - [`events`]: Clinic event log records
//! - [`simulation`]: Scheduler, orchestration, statistics and logging
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │   Types     │    │   Clinic    │    │   Patient   │
//! │             │    │             │    │             │
//! │ Identifiers │◄───┤ Resource    │◄───┤ Journey     │
//! │ Enums       │    │ Pools       │    │ Tracker     │
//! │ Config      │    │ Waiting Area│    │ Process     │
//! └─────────────┘    └─────────────┘    └─────────────┘
//!        ▲                   ▲                   ▲
//!        │                   │                   │
//! ┌─────────────┐    ┌──────────────────────────────────┐
//! │   Events    │◄───┤            Simulation            │
//! │             │    │                                  │
//! │ Clinic log  │    │ Scheduler, Orchestrator, Stats   │
//! └─────────────┘    └──────────────────────────────────┘
//! ```
#![warn(missing_docs, missing_debug_implementations, unreachable_pub)]

// Module declarations
pub mod clinic;
pub mod events;
pub mod patient;
pub mod simulation;

pub mod types;

// Core types and identifiers
pub use types::{
    AdmissionPolicy,
    ClinicConfiguration,
    ConfigValidationError,
    ExamPhase,
    // Identifiers
    PatientId,
    PatientStage,
    ProcessId,
    // Enums
    ResourceKind,
    RunParameters,
    ServiceStage,
    // Configuration
    ServiceTimeSpec,
    SimulationConfig,
    StageServiceTime,
};

// Clinic resources
pub use clinic::{
    ClinicModel, PoolStatus, RequestOutcome, ResourceGrant, ResourcePool, ResourceStatus,
    WaitingArea, WaitingAreaStatus,
};

// Patients
pub use patient::{ArrivalGenerator, JourneyTracker, PatientJourney, StageCounts};

// Events
pub use events::{ClinicEvent, ClinicEventType};

// Simulation types and functionality
pub use simulation::{
    run_simulation, ClinicSimulation, SimulationError, SimulationReport, SimulationResult,
    SimulationStatistics,
};
