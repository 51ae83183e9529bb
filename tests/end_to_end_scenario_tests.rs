//! End-to-end scenario tests
//!
//! Small, fully controlled runs (scripted arrivals, fixed service times)
//! plus one long heavily loaded run.

use outpatient_clinic_simulator::simulation::{ClinicSimulation, SimulationError};
use outpatient_clinic_simulator::types::{
    ClinicConfiguration, ConfigValidationError, PatientId, ResourceKind, RunParameters,
    ServiceTimeSpec, SimulationConfig, StageServiceTime,
};
use outpatient_clinic_simulator::{run_simulation, ClinicEventType};

/// Registration 3, nurse 8, doctor 12 minutes, every time
fn fixed_service_times() -> ServiceTimeSpec {
    ServiceTimeSpec {
        registration: StageServiceTime::fixed(3.0, 0.5),
        nurse_visit: StageServiceTime::fixed(8.0, 1.0),
        doctor_visit: StageServiceTime::fixed(12.0, 2.0),
    }
}

/// A lone patient in a clinic with one of everything never waits in a queue
#[test]
fn test_single_patient_without_contention() {
    let config = ClinicConfiguration::uniform(1);
    let params = RunParameters::new(100.0, 1000.0, 42);

    let report = ClinicSimulation::new(config, ServiceTimeSpec::default(), params)
        .unwrap()
        .with_scripted_arrivals([0.0])
        .unwrap()
        .finish()
        .unwrap();

    assert_eq!(report.journeys.len(), 1);
    assert!(report.in_progress.is_empty());
    let journey = &report.journeys[0];
    assert_eq!(journey.patient_id, PatientId::new(1));

    // Every hand-off is immediate
    assert_eq!(journey.registration_start, Some(journey.arrival_time));
    assert_eq!(journey.exam_room_assigned, journey.registration_end);
    assert_eq!(journey.nurse_visit_start, journey.exam_room_assigned);
    assert_eq!(journey.doctor_visit_start, journey.nurse_visit_end);
    assert_eq!(journey.departure_time, journey.doctor_visit_end);

    // No queueing: the only time before the exam room is registration itself
    let registration = journey.registration_end.unwrap() - journey.registration_start.unwrap();
    assert!((journey.waiting_time.unwrap() - registration).abs() < 1e-9);

    let sampled: f64 = report.event_log.iter().filter_map(|event| event.duration).sum();
    assert!((journey.total_time.unwrap() - sampled).abs() < 1e-9);
    assert_eq!(report.statistics.max_waiting_time, journey.waiting_time.unwrap());
}

/// Same instant, one doctor: whoever finishes with the nurse first sees the doctor first
#[test]
fn test_simultaneous_arrivals_share_one_doctor() {
    let mut config = ClinicConfiguration::default();
    config.set_capacity(ResourceKind::Doctors, 1);
    let params = RunParameters::new(120.0, 5.0, 1);

    let report = ClinicSimulation::new(config, fixed_service_times(), params)
        .unwrap()
        .with_scripted_arrivals([0.0, 0.0])
        .unwrap()
        .finish()
        .unwrap();

    assert_eq!(report.journeys.len(), 2);
    let first = &report.journeys[0];
    let second = &report.journeys[1];
    assert_eq!(first.patient_id, PatientId::new(1));
    assert_eq!(second.patient_id, PatientId::new(2));
    assert_eq!(first.arrival_time, second.arrival_time);

    assert!(first.nurse_visit_end < second.nurse_visit_end);
    assert_eq!(first.doctor_visit_start, Some(11.0));
    assert_eq!(first.doctor_visit_end, Some(23.0));
    assert!(second.doctor_visit_start >= first.doctor_visit_end);
    assert_eq!(second.doctor_visit_start, Some(23.0));
    assert_eq!(second.departure_time, Some(35.0));
}

#[test]
fn test_zero_exam_rooms_rejected_before_running() {
    let mut config = ClinicConfiguration::default();
    config.set_capacity(ResourceKind::ExamRooms, 0);

    assert_eq!(
        config.validate(),
        Err(ConfigValidationError::InvalidCapacity {
            resource: ResourceKind::ExamRooms.key().to_string(),
            value: 0,
        })
    );

    let params = RunParameters::new(100.0, 5.0, 1);
    let result = run_simulation(&config, &ServiceTimeSpec::default(), params);
    assert!(matches!(result, Err(SimulationError::ConfigurationError(_))));

    let full = SimulationConfig { clinic: config, ..Default::default() };
    assert!(full.validate().is_err());
    assert!(ClinicSimulation::from_config(&full).is_err());
}

#[test]
fn test_long_overloaded_run_stage_counts_add_up() {
    let mut config = ClinicConfiguration::uniform(1);
    config.set_capacity(ResourceKind::RegistrationStaff, 2);
    let params = RunParameters::new(10_000.0, 2.0, 2024);

    let report = run_simulation(&config, &ServiceTimeSpec::default(), params).unwrap();
    let stats = &report.statistics;

    assert!(stats.patients_in_system > 0);
    assert_eq!(stats.patients_arrived, (stats.patients_served + stats.patients_in_system) as u64);
    assert_eq!(stats.stage_counts.total(), report.in_progress.len());

    let earlier_stages = stats.stage_counts.arrived + stats.stage_counts.registering;
    let in_exam_rooms =
        stats.stage_counts.in_exam_room_nurse_visit + stats.stage_counts.in_exam_room_doctor_visit;
    assert_eq!(
        stats.stage_counts.waiting_for_exam_room,
        stats.patients_arrived as usize - stats.patients_served - earlier_stages - in_exam_rooms
    );

    let waiting_for_room = report
        .in_progress
        .iter()
        .filter(|journey| {
            journey.registration_end.is_some() && journey.exam_room_assigned.is_none()
        })
        .count();
    assert_eq!(stats.stage_counts.waiting_for_exam_room, waiting_for_room);
    assert!(in_exam_rooms <= 1);
    assert_eq!(report.final_status.exam_room_occupancy.len(), in_exam_rooms);
}

/// First come, first served at the registration desk
#[test]
fn test_fifo_registration_order() {
    let config = ClinicConfiguration::default();
    let params = RunParameters::new(200.0, 5.0, 3);

    let report = ClinicSimulation::new(config, fixed_service_times(), params)
        .unwrap()
        .with_scripted_arrivals([0.0, 0.0, 0.0, 1.0])
        .unwrap()
        .finish()
        .unwrap();

    let mut journeys = report.journeys.clone();
    journeys.sort_by_key(|journey| journey.patient_id);
    let starts: Vec<f64> = journeys.iter().filter_map(|j| j.registration_start).collect();
    assert_eq!(starts, vec![0.0, 3.0, 6.0, 9.0]);

    let arrivals: Vec<PatientId> = report
        .event_log
        .iter()
        .filter(|event| event.event_type == ClinicEventType::Arrival)
        .map(|event| event.patient_id)
        .collect();
    assert_eq!(arrivals, (1..=4).map(PatientId::new).collect::<Vec<_>>());
}

/// Two patients granted exam rooms at the same instant take the lowest free rooms in arrival order
#[test]
fn test_simultaneous_room_grants_take_lowest_rooms_in_order() {
    let mut config = ClinicConfiguration::default();
    config.set_capacity(ResourceKind::RegistrationStaff, 2);
    let params = RunParameters::new(60.0, 5.0, 8);

    let run = || {
        ClinicSimulation::new(config.clone(), fixed_service_times(), params)
            .unwrap()
            .with_scripted_arrivals([0.0, 0.0])
            .unwrap()
            .finish()
            .unwrap()
    };
    let report = run();

    let rooms: Vec<(PatientId, Option<f64>, Option<usize>)> = report
        .journeys
        .iter()
        .map(|journey| (journey.patient_id, journey.exam_room_assigned, journey.room_id))
        .collect();
    assert_eq!(
        rooms,
        vec![
            (PatientId::new(1), Some(3.0), Some(0)),
            (PatientId::new(2), Some(3.0), Some(1)),
        ]
    );

    let again = run();
    assert_eq!(
        serde_json::to_string(&report.journeys).unwrap(),
        serde_json::to_string(&again.journeys).unwrap()
    );
}
