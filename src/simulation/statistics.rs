//! Run statistics
//!
//! Everything here is derived once, at the end of a run, from the journey
//! records and the clinic's arrival counters. Nothing is accumulated
//! incrementally during the run.

use crate::clinic::ClinicModel;
use crate::patient::{PatientJourney, StageCounts};
use crate::simulation::SimTime;
use crate::types::ResourceKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Utilization of one resource kind over the run
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceUtilization {
    /// Busy unit-minutes divided by `capacity * duration`
    pub average: f64,
    /// Peak concurrent holders divided by capacity
    pub maximum: f64,
}

/// Aggregate results of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationStatistics {
    /// Arrivals, including balked ones
    pub patients_arrived: u64,
    /// Patients discharged
    pub patients_served: usize,
    /// Arrivals turned away
    pub patients_balked: u64,
    /// Patients still in the clinic at the stop time
    pub patients_in_system: usize,
    /// Mean arrival-to-exam-room wait of served patients
    pub average_waiting_time: f64,
    /// Longest arrival-to-exam-room wait of served patients
    pub max_waiting_time: f64,
    /// Mean arrival-to-departure time of served patients
    pub average_total_time: f64,
    /// Served patients as a fraction of admitted patients
    pub completion_rate: f64,
    /// In-progress patients per stage at the stop time
    pub stage_counts: StageCounts,
    /// Per-kind utilization derived from journey intervals
    pub resource_utilization: BTreeMap<ResourceKind, ResourceUtilization>,
}

impl SimulationStatistics {
    /// Derive the statistics for a finished run
    pub fn compute(
        clinic: &ClinicModel,
        completed: &[PatientJourney],
        in_progress: &[PatientJourney],
        stage_counts: StageCounts,
        duration: SimTime,
    ) -> Self {
        let waiting_times: Vec<f64> = completed.iter().filter_map(|j| j.waiting_time).collect();
        let total_times: Vec<f64> = completed.iter().filter_map(|j| j.total_time).collect();

        let patients_arrived = clinic.patients_arrived();
        let patients_balked = clinic.patients_balked();
        let admitted = patients_arrived.saturating_sub(patients_balked);
        let completion_rate =
            if admitted == 0 { 0.0 } else { completed.len() as f64 / admitted as f64 };

        let resource_utilization = ResourceKind::ALL
            .iter()
            .map(|&kind| {
                let capacity = clinic.config().capacity(kind);
                let intervals: Vec<(SimTime, SimTime)> = completed
                    .iter()
                    .chain(in_progress)
                    .filter_map(|journey| busy_interval(journey, kind, duration))
                    .collect();
                (kind, utilization(&intervals, capacity, duration))
            })
            .collect();

        Self {
            patients_arrived,
            patients_served: completed.len(),
            patients_balked,
            patients_in_system: in_progress.len(),
            average_waiting_time: mean(&waiting_times),
            max_waiting_time: waiting_times.iter().copied().fold(0.0, f64::max),
            average_total_time: mean(&total_times),
            completion_rate,
            stage_counts,
            resource_utilization,
        }
    }

    /// Utilization for one resource kind
    pub fn utilization(&self, kind: ResourceKind) -> ResourceUtilization {
        self.resource_utilization.get(&kind).copied().unwrap_or_default()
    }
}

impl fmt::Display for SimulationStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Patients arrived:      {}", self.patients_arrived)?;
        writeln!(f, "Patients served:       {}", self.patients_served)?;
        writeln!(f, "Patients balked:       {}", self.patients_balked)?;
        writeln!(f, "Patients in system:    {}", self.patients_in_system)?;
        writeln!(f, "Completion rate:       {:.1}%", self.completion_rate * 100.0)?;
        writeln!(f, "Average waiting time:  {:.1} min", self.average_waiting_time)?;
        writeln!(f, "Maximum waiting time:  {:.1} min", self.max_waiting_time)?;
        writeln!(f, "Average time in clinic: {:.1} min", self.average_total_time)?;
        writeln!(f, "Resource utilization (average / peak):")?;
        for (kind, usage) in &self.resource_utilization {
            writeln!(
                f,
                "  {:<18} {:>5.1}% / {:>5.1}%",
                kind.to_string(),
                usage.average * 100.0,
                usage.maximum * 100.0
            )?;
        }
        Ok(())
    }
}

/// Interval during which a journey held a unit of `kind`, clipped to the run
fn busy_interval(
    journey: &PatientJourney,
    kind: ResourceKind,
    horizon: SimTime,
) -> Option<(SimTime, SimTime)> {
    let (start, end) = match kind {
        ResourceKind::RegistrationStaff => (journey.registration_start?, journey.registration_end),
        ResourceKind::ExamRooms => (journey.exam_room_assigned?, journey.departure_time),
        ResourceKind::Nurses => (journey.nurse_visit_start?, journey.nurse_visit_end),
        ResourceKind::Doctors => (journey.doctor_visit_start?, journey.doctor_visit_end),
        ResourceKind::LabTechnicians
        | ResourceKind::LabEquipment
        | ResourceKind::PharmacyCounters => return None,
    };
    let end = end.unwrap_or(horizon).min(horizon);
    (end > start).then_some((start, end))
}

fn utilization(
    intervals: &[(SimTime, SimTime)],
    capacity: usize,
    duration: SimTime,
) -> ResourceUtilization {
    if capacity == 0 || duration <= 0.0 {
        return ResourceUtilization::default();
    }
    let capacity = capacity as f64;

    let busy: f64 = intervals.iter().map(|(start, end)| end - start).sum();

    // Sweep; at equal times releases come before acquisitions
    let mut edges: Vec<(SimTime, i64)> =
        intervals.iter().flat_map(|&(start, end)| [(start, 1), (end, -1)]).collect();
    edges.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    let mut current = 0i64;
    let mut peak = 0i64;
    for (_, delta) in edges {
        current += delta;
        peak = peak.max(current);
    }

    ResourceUtilization {
        average: (busy / (capacity * duration)).clamp(0.0, 1.0),
        maximum: (peak as f64 / capacity).clamp(0.0, 1.0),
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}
