//! Configuration structures for the clinic simulator
//!
//! This module contains the clinic staffing configuration, the service-time
//! distributions, the run parameters, and the top-level configuration that the
//! command line and configuration files populate, together with validation.

use super::{AdmissionPolicy, ResourceKind, ServiceStage};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default service-time distributions (minutes)
pub mod service_defaults {
    /// Registration mean duration
    pub const REGISTRATION_MEAN: f64 = 3.0;
    /// Registration standard deviation
    pub const REGISTRATION_STD_DEV: f64 = 0.8;
    /// Registration floor
    pub const REGISTRATION_MINIMUM: f64 = 0.5;

    /// Nurse visit mean duration
    pub const NURSE_VISIT_MEAN: f64 = 8.0;
    /// Nurse visit standard deviation
    pub const NURSE_VISIT_STD_DEV: f64 = 2.0;
    /// Nurse visit floor
    pub const NURSE_VISIT_MINIMUM: f64 = 1.0;

    /// Doctor visit mean duration
    pub const DOCTOR_VISIT_MEAN: f64 = 12.0;
    /// Doctor visit standard deviation
    pub const DOCTOR_VISIT_STD_DEV: f64 = 4.0;
    /// Doctor visit floor
    pub const DOCTOR_VISIT_MINIMUM: f64 = 2.0;

    /// Relative spread applied by [`super::ServiceTimeSpec::scaled`] to registration
    pub const REGISTRATION_SPREAD: f64 = 0.3;
    /// Relative spread applied by [`super::ServiceTimeSpec::scaled`] to nurse visits
    pub const NURSE_VISIT_SPREAD: f64 = 0.25;
    /// Relative spread applied by [`super::ServiceTimeSpec::scaled`] to doctor visits
    pub const DOCTOR_VISIT_SPREAD: f64 = 0.3;
}

/// Default mean time between arrivals (minutes)
pub const DEFAULT_MEAN_ARRIVAL_INTERVAL: f64 = 5.0;

/// Command line arguments structure
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "outpatient-clinic-simulator",
    version = "0.1.0",
    about = "Outpatient Clinic Simulator - Predicts wait times and utilization for a clinic",
    long_about = "Simulates patients flowing through registration, exam rooms, nurse and doctor \
visits over simulated time, then reports per-patient journeys and aggregate utilization.

EXAMPLES:
    # Run with default settings
    outpatient-clinic-simulator

    # Use a configuration file
    outpatient-clinic-simulator --config clinic.json

    # Try a different staffing level for a full day
    outpatient-clinic-simulator --doctors 4 --exam-rooms 6 --duration 480

    # Generate configuration template
    outpatient-clinic-simulator --print-config > clinic.json

    # Write journeys for the dashboard
    outpatient-clinic-simulator --journey-output journeys.jsonl

CONFIGURATION:
    Configuration can be provided via:
    1. Command line arguments (highest priority)
    2. Configuration file (--config flag)
    3. Default values (lowest priority)

    Supported configuration file formats: JSON (.json)"
)]
pub struct CliArgs {
    /// Configuration file path (JSON format)
    #[arg(short, long, help = "Configuration file path (JSON format)")]
    pub config: Option<String>,

    /// Number of doctors
    #[arg(long, help = "Number of doctors")]
    pub doctors: Option<usize>,

    /// Number of nurses
    #[arg(long, help = "Number of nurses")]
    pub nurses: Option<usize>,

    /// Number of registration staff
    #[arg(long, help = "Number of registration staff")]
    pub registration_staff: Option<usize>,

    /// Number of lab technicians
    #[arg(long, help = "Number of lab technicians")]
    pub lab_technicians: Option<usize>,

    /// Number of exam rooms
    #[arg(long, help = "Number of exam rooms")]
    pub exam_rooms: Option<usize>,

    /// Number of lab equipment stations
    #[arg(long, help = "Number of lab equipment stations")]
    pub lab_equipment: Option<usize>,

    /// Number of pharmacy counters
    #[arg(long, help = "Number of pharmacy counters")]
    pub pharmacy_counters: Option<usize>,

    /// Waiting room seats
    #[arg(long, help = "Waiting room capacity")]
    pub waiting_room_capacity: Option<usize>,

    /// Maximum patients in the clinic at once
    #[arg(long, help = "Maximum patients in the system")]
    pub max_patients: Option<usize>,

    /// Simulated duration in minutes
    #[arg(
        long,
        help = "Simulated duration in minutes",
        long_help = "Length of the simulated session in minutes. \
                     Must be greater than 0. Default: 120"
    )]
    pub duration: Option<f64>,

    /// Mean minutes between patient arrivals
    #[arg(
        long,
        help = "Mean minutes between arrivals",
        long_help = "Mean of the exponential inter-arrival distribution, in minutes. \
                     Must be greater than 0. Default: 5"
    )]
    pub arrival_interval: Option<f64>,

    /// Random seed for reproducible results
    #[arg(long, help = "Random seed for reproducible results")]
    pub seed: Option<u64>,

    /// Mean registration time in minutes
    #[arg(long, help = "Mean registration time (minutes)")]
    pub registration_time: Option<f64>,

    /// Mean nurse visit time in minutes
    #[arg(long, help = "Mean nurse visit time (minutes)")]
    pub nurse_time: Option<f64>,

    /// Mean doctor visit time in minutes
    #[arg(long, help = "Mean doctor visit time (minutes)")]
    pub doctor_time: Option<f64>,

    /// Turn away arrivals when the waiting room or clinic is full
    #[arg(
        long,
        help = "Enforce waiting-room and system capacity at arrival",
        long_help = "Arrivals balk when the waiting room has no free seat or the clinic \
                     already holds the maximum number of patients. Off by default."
    )]
    pub enforce_admission: bool,

    /// Record a resource status snapshot every N simulated minutes
    #[arg(long, help = "Status sampling interval in simulated minutes")]
    pub status_interval: Option<f64>,

    /// Output path for completed journeys (JSONL)
    #[arg(long, help = "Output path for completed patient journeys (JSONL)")]
    pub journey_output: Option<String>,

    /// Output path for the clinic event log (JSONL)
    #[arg(long, help = "Output path for the clinic event log (JSONL)")]
    pub event_log_output: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long, help = "Enable debug logging")]
    pub debug: bool,

    /// Dry run mode - validate configuration without running simulation
    #[arg(long, help = "Validate configuration without running simulation")]
    pub dry_run: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in JSON format and exit")]
    pub print_config: bool,
}

/// Staffing and physical capacity of the clinic for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicConfiguration {
    /// Number of doctors
    pub num_doctors: usize,
    /// Number of nurses
    pub num_nurses: usize,
    /// Number of registration staff
    pub num_registration_staff: usize,
    /// Number of lab technicians
    pub num_lab_technicians: usize,
    /// Number of exam rooms
    pub num_exam_rooms: usize,
    /// Number of lab equipment stations
    pub num_lab_equipment: usize,
    /// Number of pharmacy counters
    pub num_pharmacy_counters: usize,
    /// Seats in the pre-registration waiting room
    pub waiting_room_capacity: usize,
    /// Maximum patients permitted in the clinic at once
    pub max_patients_in_system: usize,
    /// Simulated session length in minutes
    pub simulation_time: f64,
    /// Random seed
    pub random_seed: u64,
}

impl Default for ClinicConfiguration {
    fn default() -> Self {
        Self {
            num_doctors: 3,
            num_nurses: 2,
            num_registration_staff: 1,
            num_lab_technicians: 1,
            num_exam_rooms: 5,
            num_lab_equipment: 2,
            num_pharmacy_counters: 1,
            waiting_room_capacity: 50,
            max_patients_in_system: 100,
            simulation_time: 120.0,
            random_seed: 42,
        }
    }
}

impl ClinicConfiguration {
    /// Configuration with the same capacity for every resource kind
    pub fn uniform(capacity: usize) -> Self {
        let mut config = Self::default();
        for kind in ResourceKind::ALL {
            config.set_capacity(kind, capacity);
        }
        config
    }

    /// Configured capacity for a resource kind
    pub fn capacity(&self, kind: ResourceKind) -> usize {
        match kind {
            ResourceKind::Doctors => self.num_doctors,
            ResourceKind::Nurses => self.num_nurses,
            ResourceKind::RegistrationStaff => self.num_registration_staff,
            ResourceKind::LabTechnicians => self.num_lab_technicians,
            ResourceKind::ExamRooms => self.num_exam_rooms,
            ResourceKind::LabEquipment => self.num_lab_equipment,
            ResourceKind::PharmacyCounters => self.num_pharmacy_counters,
        }
    }

    /// Set the capacity for a resource kind
    pub fn set_capacity(&mut self, kind: ResourceKind, capacity: usize) {
        match kind {
            ResourceKind::Doctors => self.num_doctors = capacity,
            ResourceKind::Nurses => self.num_nurses = capacity,
            ResourceKind::RegistrationStaff => self.num_registration_staff = capacity,
            ResourceKind::LabTechnicians => self.num_lab_technicians = capacity,
            ResourceKind::ExamRooms => self.num_exam_rooms = capacity,
            ResourceKind::LabEquipment => self.num_lab_equipment = capacity,
            ResourceKind::PharmacyCounters => self.num_pharmacy_counters = capacity,
        }
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        for kind in ResourceKind::ALL {
            let capacity = self.capacity(kind);
            if capacity == 0 {
                return Err(ConfigValidationError::InvalidCapacity {
                    resource: kind.key().to_string(),
                    value: capacity,
                });
            }
        }

        if self.waiting_room_capacity == 0 {
            return Err(ConfigValidationError::InvalidWaitingRoomCapacity(
                self.waiting_room_capacity,
            ));
        }

        if self.max_patients_in_system == 0 {
            return Err(ConfigValidationError::InvalidMaxPatients(self.max_patients_in_system));
        }

        validate_positive_duration(self.simulation_time)
    }
}

/// Clamped-normal service-time distribution for one stage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageServiceTime {
    /// Mean duration in minutes
    pub mean: f64,
    /// Standard deviation in minutes
    pub std_dev: f64,
    /// Floor applied to every sampled duration
    pub minimum: f64,
}

impl StageServiceTime {
    /// Create a new stage distribution
    pub fn new(mean: f64, std_dev: f64, minimum: f64) -> Self {
        Self { mean, std_dev, minimum }
    }

    /// A distribution that always yields `duration` (provided it is above the floor)
    pub fn fixed(duration: f64, minimum: f64) -> Self {
        Self { mean: duration, std_dev: 0.0, minimum }
    }

    fn validate(&self, stage: ServiceStage) -> Result<(), ConfigValidationError> {
        let invalid = |field: &str, value: f64| ConfigValidationError::InvalidServiceTime {
            stage: stage.to_string(),
            field: field.to_string(),
            value,
        };

        if !(self.mean.is_finite() && self.mean > 0.0) {
            return Err(invalid("mean", self.mean));
        }
        if !(self.std_dev.is_finite() && self.std_dev >= 0.0) {
            return Err(invalid("std_dev", self.std_dev));
        }
        if !(self.minimum.is_finite() && self.minimum > 0.0) {
            return Err(invalid("minimum", self.minimum));
        }
        Ok(())
    }
}

/// Service-time distributions for every sampled stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceTimeSpec {
    /// Registration desk
    pub registration: StageServiceTime,
    /// Nurse assessment
    pub nurse_visit: StageServiceTime,
    /// Doctor consultation
    pub doctor_visit: StageServiceTime,
}

impl Default for ServiceTimeSpec {
    fn default() -> Self {
        use service_defaults::*;
        Self {
            registration: StageServiceTime::new(
                REGISTRATION_MEAN,
                REGISTRATION_STD_DEV,
                REGISTRATION_MINIMUM,
            ),
            nurse_visit: StageServiceTime::new(
                NURSE_VISIT_MEAN,
                NURSE_VISIT_STD_DEV,
                NURSE_VISIT_MINIMUM,
            ),
            doctor_visit: StageServiceTime::new(
                DOCTOR_VISIT_MEAN,
                DOCTOR_VISIT_STD_DEV,
                DOCTOR_VISIT_MINIMUM,
            ),
        }
    }
}

impl ServiceTimeSpec {
    /// Build service times from mean durations, with spread proportional to each mean
    pub fn scaled(registration_mean: f64, nurse_mean: f64, doctor_mean: f64) -> Self {
        use service_defaults::*;
        Self {
            registration: StageServiceTime::new(
                registration_mean,
                registration_mean * REGISTRATION_SPREAD,
                REGISTRATION_MINIMUM,
            ),
            nurse_visit: StageServiceTime::new(
                nurse_mean,
                nurse_mean * NURSE_VISIT_SPREAD,
                NURSE_VISIT_MINIMUM,
            ),
            doctor_visit: StageServiceTime::new(
                doctor_mean,
                doctor_mean * DOCTOR_VISIT_SPREAD,
                DOCTOR_VISIT_MINIMUM,
            ),
        }
    }

    /// Distribution for a stage
    pub fn stage(&self, stage: ServiceStage) -> &StageServiceTime {
        match stage {
            ServiceStage::Registration => &self.registration,
            ServiceStage::NurseVisit => &self.nurse_visit,
            ServiceStage::DoctorVisit => &self.doctor_visit,
        }
    }

    /// Mutable distribution for a stage
    pub fn stage_mut(&mut self, stage: ServiceStage) -> &mut StageServiceTime {
        match stage {
            ServiceStage::Registration => &mut self.registration,
            ServiceStage::NurseVisit => &mut self.nurse_visit,
            ServiceStage::DoctorVisit => &mut self.doctor_visit,
        }
    }

    /// Validate every stage distribution
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        self.registration.validate(ServiceStage::Registration)?;
        self.nurse_visit.validate(ServiceStage::NurseVisit)?;
        self.doctor_visit.validate(ServiceStage::DoctorVisit)?;
        Ok(())
    }
}

/// Parameters of a single run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunParameters {
    /// Simulated duration in minutes
    pub duration: f64,
    /// Mean of the exponential inter-arrival distribution in minutes
    pub mean_arrival_interval: f64,
    /// Random seed
    pub seed: u64,
}

impl RunParameters {
    /// Create run parameters
    pub fn new(duration: f64, mean_arrival_interval: f64, seed: u64) -> Self {
        Self { duration, mean_arrival_interval, seed }
    }

    /// Take duration and seed from a clinic configuration
    pub fn from_config(config: &ClinicConfiguration, mean_arrival_interval: f64) -> Self {
        Self::new(config.simulation_time, mean_arrival_interval, config.random_seed)
    }

    /// Validate the run parameters
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        validate_positive_duration(self.duration)?;
        if !(self.mean_arrival_interval.is_finite() && self.mean_arrival_interval > 0.0) {
            return Err(ConfigValidationError::InvalidArrivalInterval(self.mean_arrival_interval));
        }
        Ok(())
    }
}

fn validate_positive_duration(duration: f64) -> Result<(), ConfigValidationError> {
    if !(duration.is_finite() && duration > 0.0) {
        return Err(ConfigValidationError::InvalidDuration(duration));
    }
    Ok(())
}

/// Complete configuration for the simulator binary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Staffing and capacity
    pub clinic: ClinicConfiguration,
    /// Service-time distributions
    pub service_times: ServiceTimeSpec,
    /// Mean minutes between arrivals
    pub mean_arrival_interval: f64,
    /// Admission policy for new arrivals
    pub admission_policy: AdmissionPolicy,
    /// Status sampling interval in simulated minutes
    pub status_interval: Option<f64>,
    /// Output path for completed journeys
    pub journey_output: Option<String>,
    /// Output path for the clinic event log
    pub event_log_output: Option<String>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            clinic: ClinicConfiguration::default(),
            service_times: ServiceTimeSpec::default(),
            mean_arrival_interval: DEFAULT_MEAN_ARRIVAL_INTERVAL,
            admission_policy: AdmissionPolicy::default(),
            status_interval: None,
            journey_output: None,
            event_log_output: None,
        }
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Configuration file read error
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    /// JSON parsing error
    #[error("Failed to parse JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Unsupported configuration file format
    #[error("Unsupported configuration file format: {0} (supported: .json)")]
    UnsupportedFormat(String),
}

/// Validation errors for simulation configuration
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigValidationError {
    /// A resource pool was configured without capacity
    #[error("Capacity for {resource} must be greater than 0, got {value}")]
    InvalidCapacity {
        /// Resource kind key
        resource: String,
        /// The configured capacity
        value: usize,
    },

    /// Waiting room has no seats
    #[error("Waiting room capacity must be greater than 0, got {0}")]
    InvalidWaitingRoomCapacity(usize),

    /// System patient limit is zero
    #[error("Maximum patients in system must be greater than 0, got {0}")]
    InvalidMaxPatients(usize),

    /// Run duration is not a positive number
    #[error("Simulation duration must be a positive number of minutes, got {0}")]
    InvalidDuration(f64),

    /// Mean arrival interval is not a positive number
    #[error("Mean arrival interval must be a positive number of minutes, got {0}")]
    InvalidArrivalInterval(f64),

    /// A service-time distribution parameter is out of range
    #[error("Invalid {field} for {stage} service time: {value}")]
    InvalidServiceTime {
        /// Stage name
        stage: String,
        /// Offending parameter
        field: String,
        /// The invalid value
        value: f64,
    },

    /// Status sampling interval is not a positive number
    #[error("Status interval must be a positive number of minutes, got {0}")]
    InvalidStatusInterval(f64),
}

impl SimulationConfig {
    /// Create configuration from parsed CLI arguments
    pub fn from_cli_args(args: CliArgs) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(config_path) = &args.config {
            config = Self::from_file(config_path)?;
        }

        // CLI takes precedence over the file
        Self::apply_cli_overrides(&mut config, args);

        Ok(config)
    }

    /// Load configuration from a JSON file; missing fields take their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => {
                let content = fs::read_to_string(path)?;
                Ok(serde_json::from_str(&content)?)
            }
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::UnsupportedFormat("no extension".to_string())),
        }
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(config: &mut Self, args: CliArgs) {
        let capacities = [
            (ResourceKind::Doctors, args.doctors),
            (ResourceKind::Nurses, args.nurses),
            (ResourceKind::RegistrationStaff, args.registration_staff),
            (ResourceKind::LabTechnicians, args.lab_technicians),
            (ResourceKind::ExamRooms, args.exam_rooms),
            (ResourceKind::LabEquipment, args.lab_equipment),
            (ResourceKind::PharmacyCounters, args.pharmacy_counters),
        ];
        for (kind, value) in capacities {
            if let Some(value) = value {
                config.clinic.set_capacity(kind, value);
            }
        }

        if let Some(value) = args.waiting_room_capacity {
            config.clinic.waiting_room_capacity = value;
        }
        if let Some(value) = args.max_patients {
            config.clinic.max_patients_in_system = value;
        }
        if let Some(value) = args.duration {
            config.clinic.simulation_time = value;
        }
        if let Some(value) = args.seed {
            config.clinic.random_seed = value;
        }
        if let Some(value) = args.arrival_interval {
            config.mean_arrival_interval = value;
        }

        // A mean given on the command line brings its proportional spread with it
        let scaled = ServiceTimeSpec::scaled(
            args.registration_time.unwrap_or(config.service_times.registration.mean),
            args.nurse_time.unwrap_or(config.service_times.nurse_visit.mean),
            args.doctor_time.unwrap_or(config.service_times.doctor_visit.mean),
        );
        let stage_overrides = [
            (ServiceStage::Registration, args.registration_time),
            (ServiceStage::NurseVisit, args.nurse_time),
            (ServiceStage::DoctorVisit, args.doctor_time),
        ];
        for (stage, value) in stage_overrides {
            if value.is_some() {
                let minimum = config.service_times.stage(stage).minimum;
                let stage_spec = config.service_times.stage_mut(stage);
                *stage_spec = *scaled.stage(stage);
                stage_spec.minimum = minimum;
            }
        }

        if args.enforce_admission {
            config.admission_policy = AdmissionPolicy::Enforced;
        }
        if let Some(value) = args.status_interval {
            config.status_interval = Some(value);
        }
        if let Some(value) = args.journey_output {
            config.journey_output = Some(value);
        }
        if let Some(value) = args.event_log_output {
            config.event_log_output = Some(value);
        }
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Print configuration as JSON
    pub fn print_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Run parameters derived from this configuration
    pub fn run_parameters(&self) -> RunParameters {
        RunParameters::from_config(&self.clinic, self.mean_arrival_interval)
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        self.clinic.validate()?;
        self.service_times.validate()?;
        self.run_parameters().validate()?;

        if let Some(interval) = self.status_interval {
            if !(interval.is_finite() && interval > 0.0) {
                return Err(ConfigValidationError::InvalidStatusInterval(interval));
            }
        }

        Ok(())
    }
}
