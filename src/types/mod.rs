//! Core types and identifiers for the clinic simulator
//!
//! This module contains fundamental types, identifiers, and configuration structures
//! used throughout the simulation system.
//!
//! # Overview
//!
//! - **Identifiers**: arrival-ordered patient IDs and scheduler process IDs
//! - **Enums**: resource kinds, service stages, patient stages, admission policy
//! - **Configuration**: clinic staffing, service-time distributions, run parameters
//!
//! # Usage Example
//!
//! ```rust
//! use outpatient_clinic_simulator::types::*;
//!
//! let config = ClinicConfiguration {
//!     num_doctors: 4,
//!     num_exam_rooms: 6,
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! assert_eq!(config.capacity(ResourceKind::Doctors), 4);
//!
//! let params = RunParameters::from_config(&config, 5.0);
//! assert_eq!(params.duration, 120.0);
//! ```

pub mod config;
pub mod enums;
pub mod identifiers;

// Re-export all public types for convenience
pub use config::*;
pub use enums::*;
pub use identifiers::*;
