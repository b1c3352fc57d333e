//! Patientor command-line client.
//!
//! Browses patients and diagnoses and creates patients and entries against the
//! backend configured by `PATIENTOR_API_BASE_URL`.

mod render;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use patientor_api_client::HttpPatientApi;
use patientor_core::{
    ClientConfig, DischargeInput, EntryFormInput, EntryWithoutId, HealthCheckRating,
    PatientFormValues, PatientorError, Session, SickLeaveInput,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "patientor")]
#[command(about = "Patientor patient record client")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all patients with their latest health rating
    List,
    /// Show a patient and their entries
    Show {
        /// Patient ID
        id: String,
    },
    /// List the diagnosis catalog
    Diagnoses,
    /// Create a patient
    AddPatient {
        name: String,
        occupation: String,
        /// male, female or other
        gender: String,
        #[arg(long)]
        ssn: Option<String>,
        /// Date of birth (YYYY-MM-DD)
        #[arg(long)]
        date_of_birth: Option<String>,
    },
    /// Add an entry to a patient
    AddEntry(AddEntryArgs),
}

#[derive(Args)]
struct AddEntryArgs {
    /// Patient ID
    patient_id: String,
    /// Read the entry from a JSON file instead of the flags below
    #[arg(long)]
    from_json: Option<PathBuf>,
    /// HealthCheck, Hospital or OccupationalHealthcare
    #[arg(long = "type", default_value = "HealthCheck")]
    entry_type: String,
    #[arg(long, default_value = "")]
    description: String,
    /// Entry date (YYYY-MM-DD)
    #[arg(long, default_value = "")]
    date: String,
    #[arg(long, default_value = "")]
    specialist: String,
    /// Diagnosis code; repeat for several
    #[arg(long = "diagnosis-code")]
    diagnosis_codes: Vec<String>,
    /// 0-3 or Healthy, LowRisk, HighRisk, CriticalRisk
    #[arg(long)]
    rating: Option<HealthCheckRating>,
    #[arg(long, default_value = "")]
    discharge_date: String,
    #[arg(long, default_value = "")]
    discharge_criteria: String,
    #[arg(long, default_value = "")]
    employer: String,
    #[arg(long, default_value = "")]
    sick_leave_start: String,
    #[arg(long, default_value = "")]
    sick_leave_end: String,
}

impl AddEntryArgs {
    fn form_input(&self) -> EntryFormInput {
        EntryFormInput {
            entry_type: self.entry_type.clone(),
            description: self.description.clone(),
            date: self.date.clone(),
            specialist: self.specialist.clone(),
            diagnosis_codes: if self.diagnosis_codes.is_empty() {
                None
            } else {
                Some(self.diagnosis_codes.clone())
            },
            health_check_rating: self.rating,
            discharge: DischargeInput {
                date: self.discharge_date.clone(),
                criteria: self.discharge_criteria.clone(),
            },
            employer_name: self.employer.clone(),
            sick_leave: SickLeaveInput {
                start_date: self.sick_leave_start.clone(),
                end_date: self.sick_leave_end.clone(),
            },
        }
    }
}

/// Reads a candidate entry from `path` and checks it against the entry shape.
fn load_entry_file(path: &Path) -> anyhow::Result<EntryWithoutId> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    let entry = EntryWithoutId::from_value(value)
        .with_context(|| format!("{} is not a valid entry", path.display()))?;
    Ok(entry)
}

fn print_notice(session: &Session<HttpPatientApi>) {
    if let Some(notice) = session.notices().active() {
        eprintln!("! {}", notice.message);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("patientor=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("Use 'patientor --help' for commands");
        return Ok(());
    };

    let cfg = ClientConfig::from_env_values(
        std::env::var("PATIENTOR_API_BASE_URL").ok(),
        std::env::var("PATIENTOR_REQUEST_TIMEOUT_SECS").ok(),
        std::env::var("PATIENTOR_NOTICE_SECS").ok(),
    )?;
    tracing::debug!("using backend at {}", cfg.api_base_url());

    let api = HttpPatientApi::new(&cfg)?;
    let mut session = Session::new(api, &cfg);

    match command {
        Commands::List => {
            session.start().await;
            print_notice(&session);
            let patients = session.directory().patients();
            if patients.is_empty() {
                println!("No patients found.");
            }
            for patient in patients {
                println!("{}", render::patient_row(patient));
            }
        }
        Commands::Show { id } => {
            session.start().await;
            print_notice(&session);
            let patient = session
                .open_patient(&id)
                .await
                .map_err(|e| anyhow::anyhow!("could not load patient {id}: {}", e.user_message()))?
                .clone();
            print!(
                "{}",
                render::patient_details(&patient, session.directory().diagnoses())
            );
        }
        Commands::Diagnoses => {
            session
                .load_diagnoses()
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message().to_string()))?;
            for diagnosis in session.directory().diagnoses().iter() {
                println!("{}", render::diagnosis_line(diagnosis));
            }
        }
        Commands::AddPatient {
            name,
            occupation,
            gender,
            ssn,
            date_of_birth,
        } => {
            let values = PatientFormValues::new(
                &name,
                &occupation,
                &gender,
                ssn.as_deref(),
                date_of_birth.as_deref(),
            )?;
            let patient = session
                .add_patient(&values)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message().to_string()))?;
            println!("Created patient {} with ID: {}", patient.name, patient.id);
        }
        Commands::AddEntry(args) => {
            // Validate locally before touching the network.
            let entry = match &args.from_json {
                Some(path) => load_entry_file(path)?,
                None => patientor_core::assemble(&args.form_input())?,
            };

            session.load_diagnoses().await.ok();
            session
                .open_patient(&args.patient_id)
                .await
                .map_err(|e| {
                    anyhow::anyhow!(
                        "could not load patient {}: {}",
                        args.patient_id,
                        e.user_message()
                    )
                })?;

            let submitted = session.submit_assembled(entry).await.cloned();
            match submitted {
                Ok(patient) => {
                    println!("Added entry for {}", patient.name);
                    if let Some(created) = patient.entries.last() {
                        print!(
                            "{}",
                            render::entry_details(created, session.directory().diagnoses())
                        );
                    }
                }
                Err(PatientorError::Api(_)) => {
                    print_notice(&session);
                    anyhow::bail!("entry was not saved");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    Ok(())
}
