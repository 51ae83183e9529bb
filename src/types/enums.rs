//! Enumeration types for the clinic simulator
//!
//! This module contains the resource kinds a clinic is staffed with, the
//! service stages that have sampled durations, the patient lifecycle stages,
//! and the admission policy applied to new arrivals.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kinds of finite-capacity resources in the clinic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Physicians performing the doctor visit
    Doctors,
    /// Nurses performing the nurse visit
    Nurses,
    /// Front-desk staff performing registration
    RegistrationStaff,
    /// Laboratory technicians
    LabTechnicians,
    /// Examination rooms, one patient each
    ExamRooms,
    /// Laboratory equipment stations
    LabEquipment,
    /// Pharmacy dispensing counters
    PharmacyCounters,
}

impl ResourceKind {
    /// Every resource kind, in reporting order
    pub const ALL: [ResourceKind; 7] = [
        ResourceKind::Doctors,
        ResourceKind::Nurses,
        ResourceKind::RegistrationStaff,
        ResourceKind::LabTechnicians,
        ResourceKind::ExamRooms,
        ResourceKind::LabEquipment,
        ResourceKind::PharmacyCounters,
    ];

    /// Snake-case name used in configuration and reports
    pub fn key(&self) -> &'static str {
        match self {
            ResourceKind::Doctors => "doctors",
            ResourceKind::Nurses => "nurses",
            ResourceKind::RegistrationStaff => "registration_staff",
            ResourceKind::LabTechnicians => "lab_technicians",
            ResourceKind::ExamRooms => "exam_rooms",
            ResourceKind::LabEquipment => "lab_equipment",
            ResourceKind::PharmacyCounters => "pharmacy_counters",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Doctors => write!(f, "Doctors"),
            ResourceKind::Nurses => write!(f, "Nurses"),
            ResourceKind::RegistrationStaff => write!(f, "Registration Staff"),
            ResourceKind::LabTechnicians => write!(f, "Lab Technicians"),
            ResourceKind::ExamRooms => write!(f, "Exam Rooms"),
            ResourceKind::LabEquipment => write!(f, "Lab Equipment"),
            ResourceKind::PharmacyCounters => write!(f, "Pharmacy Counters"),
        }
    }
}

/// Service stages whose durations are sampled
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStage {
    /// Check-in at the registration desk
    Registration,
    /// Nurse assessment in the exam room
    NurseVisit,
    /// Doctor consultation in the exam room
    DoctorVisit,
}

impl ServiceStage {
    /// The resource kind that performs this stage
    pub fn performed_by(&self) -> ResourceKind {
        match self {
            ServiceStage::Registration => ResourceKind::RegistrationStaff,
            ServiceStage::NurseVisit => ResourceKind::Nurses,
            ServiceStage::DoctorVisit => ResourceKind::Doctors,
        }
    }
}

impl fmt::Display for ServiceStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceStage::Registration => write!(f, "Registration"),
            ServiceStage::NurseVisit => write!(f, "Nurse Visit"),
            ServiceStage::DoctorVisit => write!(f, "Doctor Visit"),
        }
    }
}

/// Phase of a patient's stay inside an exam room
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExamPhase {
    /// Waiting for or receiving the nurse visit
    NurseVisit,
    /// Waiting for or receiving the doctor visit
    DoctorVisit,
}

/// Lifecycle stage of a patient; stages only ever move forward
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatientStage {
    /// In the waiting room, queued for registration
    Arrived,
    /// Being registered
    Registering,
    /// Registered, queued for an exam room
    WaitingForExamRoom,
    /// Holding an exam room
    InExamRoom(ExamPhase),
    /// Left the clinic
    Discharged,
}

impl PatientStage {
    /// The only stage a patient may move to next
    pub fn successor(&self) -> Option<PatientStage> {
        match self {
            PatientStage::Arrived => Some(PatientStage::Registering),
            PatientStage::Registering => Some(PatientStage::WaitingForExamRoom),
            PatientStage::WaitingForExamRoom => {
                Some(PatientStage::InExamRoom(ExamPhase::NurseVisit))
            }
            PatientStage::InExamRoom(ExamPhase::NurseVisit) => {
                Some(PatientStage::InExamRoom(ExamPhase::DoctorVisit))
            }
            PatientStage::InExamRoom(ExamPhase::DoctorVisit) => Some(PatientStage::Discharged),
            PatientStage::Discharged => None,
        }
    }
}

impl fmt::Display for PatientStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatientStage::Arrived => write!(f, "Arrived"),
            PatientStage::Registering => write!(f, "Registering"),
            PatientStage::WaitingForExamRoom => write!(f, "Waiting For Exam Room"),
            PatientStage::InExamRoom(ExamPhase::NurseVisit) => {
                write!(f, "In Exam Room (Nurse Visit)")
            }
            PatientStage::InExamRoom(ExamPhase::DoctorVisit) => {
                write!(f, "In Exam Room (Doctor Visit)")
            }
            PatientStage::Discharged => write!(f, "Discharged"),
        }
    }
}

/// How arrivals are admitted into the clinic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionPolicy {
    /// Every arrival is admitted; waiting-area and system limits are reported but never checked
    #[default]
    Unenforced,
    /// Arrivals balk when the waiting area is full or the system is at its patient limit
    Enforced,
}

impl fmt::Display for AdmissionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdmissionPolicy::Unenforced => write!(f, "unenforced"),
            AdmissionPolicy::Enforced => write!(f, "enforced"),
        }
    }
}
