//! Clinic event log
//!
//! Every arrival, completed service, room assignment, discharge and balk is
//! recorded as a [`ClinicEvent`] and returned with the simulation report.
//!
//! # Usage Example
//!
//! ```rust
//! use outpatient_clinic_simulator::events::*;
//! use outpatient_clinic_simulator::types::PatientId;
//!
//! let event = ClinicEvent::new(3.5, ClinicEventType::RegistrationComplete, PatientId::new(1))
//!     .with_duration(2.25);
//! assert_eq!(event.event_type.to_string(), "registration_complete");
//! ```

pub mod clinic_event;

pub use clinic_event::*;
