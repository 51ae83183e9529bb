// Integration tests test your crate's public API. They only have access to items
// in your crate that are marked pub. See the Cargo Targets page of the Cargo Book
// for more information.
//
//   https://doc.rust-lang.org/cargo/reference/cargo-targets.html#integration-tests
//

use outpatient_clinic_simulator::*;

mod end_to_end_scenario_tests;

#[test]
fn test_core_id_types() {
    let first = PatientId::new(1);
    let later = PatientId::new(42);

    assert!(first < later);
    assert_eq!(first.to_string(), "Patient_001");
    assert_eq!(later.to_string(), "Patient_042");
    assert_eq!(PatientId::new(1234).to_string(), "Patient_1234");
    assert_eq!(ProcessId(7).to_string(), "PROC_7");

    let json = serde_json::to_string(&later).unwrap();
    assert_eq!(json, "\"Patient_042\"");
    assert_eq!(serde_json::from_str::<PatientId>(&json).unwrap(), later);
}

#[test]
fn test_public_run_entry_point() {
    let config = ClinicConfiguration::default();
    let params = RunParameters::from_config(&config, 5.0);
    let report = run_simulation(&config, &ServiceTimeSpec::default(), params).unwrap();

    assert_eq!(report.clinic_config, config);
    assert_eq!(report.service_time_config, ServiceTimeSpec::default());
    assert_eq!(report.seed, config.random_seed);
    assert_eq!(report.admission_policy, AdmissionPolicy::Unenforced);
    assert!(report.statistics.patients_served > 0);
}
