// Outpatient Clinic Simulator - Main Entry Point
//
// You can run it via Cargo:
//
// ```console
// $ cargo build --release
// $ ./target/release/outpatient-clinic-simulator
// ```
//
// Or with custom configuration:
//
// ```console
// $ ./target/release/outpatient-clinic-simulator --doctors 4 --duration 480 \
//     --journey-output journeys.jsonl --verbose
// ```

use anyhow::Context;
use outpatient_clinic_simulator::simulation::{ClinicSimulation, LoggingConfig, SimulationReport};
use outpatient_clinic_simulator::types::config::CliArgs;
use outpatient_clinic_simulator::types::{ResourceKind, ServiceStage, SimulationConfig};
use clap::Parser;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::process;
use std::time::Instant;
use tracing::{error, info};

fn main() {
    // Parse CLI arguments first to check for special flags
    let args = CliArgs::parse();

    if args.print_config {
        let default_config = SimulationConfig::default();
        match default_config.print_json() {
            Ok(json) => {
                println!("{}", json);
                return;
            }
            Err(e) => {
                eprintln!("Failed to serialize default configuration: {}", e);
                process::exit(1);
            }
        }
    }

    let _logging_guard = match LoggingConfig::from_verbosity(args.verbose, args.debug).init() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            process::exit(1);
        }
    };

    info!("Starting Outpatient Clinic Simulator");

    // Load configuration from CLI arguments and optional config file
    let config = match SimulationConfig::from_cli_args(args.clone()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            eprintln!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        eprintln!("Configuration validation failed: {}", e);
        process::exit(1);
    }

    info!("Configuration loaded and validated successfully");

    if args.dry_run {
        eprintln!("Configuration validation successful!");
        eprintln!("Dry run mode - simulation will not be executed.");
        print_configuration_summary(&config);
        return;
    }

    print_startup_banner(&config);

    if let Err(e) = run(&config) {
        error!("Simulation failed: {:#}", e);
        eprintln!("Simulation failed: {:#}", e);
        process::exit(1);
    }

    info!("Outpatient Clinic Simulator completed successfully");
}

/// Run the simulation and write every requested output
fn run(config: &SimulationConfig) -> anyhow::Result<()> {
    let start_time = Instant::now();

    let report = ClinicSimulation::from_config(config)
        .context("Failed to initialize simulation")?
        .finish()
        .context("Simulation run failed")?;

    if let Some(path) = &config.journey_output {
        write_output(path, |writer| report.write_journeys(writer))
            .with_context(|| format!("Failed to write journeys to '{}'", path))?;
        info!(path = %path, journeys = report.journeys.len(), "Journeys written");
        eprintln!("Journeys written to: {}", path);
    }

    if let Some(path) = &config.event_log_output {
        write_output(path, |writer| report.write_event_log(writer))
            .with_context(|| format!("Failed to write event log to '{}'", path))?;
        info!(path = %path, events = report.event_log.len(), "Event log written");
        eprintln!("Event log written to: {}", path);
    }

    print_final_statistics(&report, start_time.elapsed());
    Ok(())
}

fn write_output<F>(path: &str, write: F) -> anyhow::Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> outpatient_clinic_simulator::SimulationResult<()>,
{
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write(&mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Print startup banner and configuration summary
fn print_startup_banner(config: &SimulationConfig) {
    eprintln!("Outpatient Clinic Simulator");
    eprintln!("===========================");
    eprintln!("Patient flow through registration, exam rooms, nurses and doctors");
    eprintln!();

    print_configuration_summary(config);
}

/// Print configuration summary
fn print_configuration_summary(config: &SimulationConfig) {
    eprintln!("Configuration:");
    for kind in ResourceKind::ALL {
        eprintln!("  {}: {}", kind, config.clinic.capacity(kind));
    }
    eprintln!("  Waiting Room Capacity: {}", config.clinic.waiting_room_capacity);
    eprintln!("  Max Patients in System: {}", config.clinic.max_patients_in_system);
    eprintln!("  Duration: {:.1} min", config.clinic.simulation_time);
    eprintln!("  Mean Arrival Interval: {:.2} min", config.mean_arrival_interval);
    for stage in [ServiceStage::Registration, ServiceStage::NurseVisit, ServiceStage::DoctorVisit] {
        let spec = config.service_times.stage(stage);
        eprintln!(
            "  {} Time: mean {:.1}, std dev {:.1}, min {:.1}",
            stage, spec.mean, spec.std_dev, spec.minimum
        );
    }
    eprintln!("  Admission Policy: {}", config.admission_policy);
    eprintln!("  Random Seed: {}", config.clinic.random_seed);
    eprintln!();
}

/// Print the run summary
fn print_final_statistics(report: &SimulationReport, elapsed: std::time::Duration) {
    eprintln!("Simulation Complete!");
    eprintln!("====================");
    eprintln!("Run ID: {}", report.run_id);
    eprintln!(
        "Simulated {:.1} minutes in {:.3} seconds",
        report.simulation_duration,
        elapsed.as_secs_f64()
    );
    eprintln!();
    eprintln!("{}", report.statistics);
}
