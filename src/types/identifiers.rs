//! Identifier types for the clinic simulator
//!
//! Patients are numbered in arrival order so that a fixed seed always produces
//! the same identities. Process identifiers are internal to the scheduler and
//! name whichever simulated process (patient, arrival generator, monitor) a
//! resumption belongs to.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

const PATIENT_PREFIX: &str = "Patient_";

/// Identifier for a simulated patient, assigned monotonically at arrival
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PatientId(pub u64);

impl PatientId {
    /// Create a patient ID from its arrival sequence number
    pub fn new(sequence: u64) -> Self {
        Self(sequence)
    }

    /// The arrival sequence number (1-based)
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", PATIENT_PREFIX, self.sequence())
    }
}

impl Serialize for PatientId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PatientId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let digits = s.strip_prefix(PATIENT_PREFIX).unwrap_or(&s);
        let sequence = digits.parse::<u64>().map_err(serde::de::Error::custom)?;
        Ok(PatientId(sequence))
    }
}

/// Identifier for a process registered with the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProcessId(pub u64);

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PROC_{}", self.0)
    }
}
