use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use intake_core::IntakeField;

#[derive(Parser)]
#[command(name = "intake", version, about = "Register patients and follow document indexing")]
pub struct Cli {
    /// Backend root URL, e.g. http://localhost:8000
    #[arg(long, env = "INTAKE_API_BASE_URL")]
    pub base_url: String,

    /// Delay between indexing status fetches, in milliseconds.
    #[arg(long, env = "INTAKE_POLL_INTERVAL_MS", default_value_t = 2000)]
    pub poll_interval_ms: u64,

    /// Per-request HTTP timeout, in seconds.
    #[arg(long, default_value_t = 60)]
    pub request_timeout_secs: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Register a new patient and upload their documents
    Submit(SubmitArgs),
    /// Print a patient's current indexing status once
    Status { patient_id: String },
    /// Follow a patient's document indexing until it completes
    Watch(WatchArgs),
    /// Retry a patient's failed documents, then follow indexing again
    Retry(WatchArgs),
    /// List registered patients
    List(ListArgs),
    /// Check whether the patient registered under a phone number is active
    CheckActive { phone: String },
}

#[derive(Args)]
pub struct FollowArgs {
    /// Show a one-line progress indicator instead of the detailed view.
    #[arg(long)]
    pub background: bool,

    /// Stop following after this many seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

impl FollowArgs {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Args)]
pub struct WatchArgs {
    pub patient_id: String,

    #[command(flatten)]
    pub follow: FollowArgs,
}

#[derive(Args)]
pub struct ListArgs {
    /// Match against first name, last name or phone.
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long)]
    pub active: Option<bool>,
    #[arg(long)]
    pub page: Option<u32>,
    #[arg(long)]
    pub page_size: Option<u32>,
}

#[derive(Args)]
pub struct SubmitArgs {
    /// JSON object of fields keyed by backend name (`first_name`, `phone`, ...).
    /// Flags given alongside override its values.
    #[arg(long)]
    pub record: Option<PathBuf>,

    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub date_of_birth: Option<String>,
    #[arg(long)]
    pub gender: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub emergency_contact: Option<String>,
    #[arg(long)]
    pub emergency_phone: Option<String>,
    #[arg(long)]
    pub medical_history: Option<String>,
    #[arg(long)]
    pub allergies: Option<String>,
    #[arg(long)]
    pub current_medications: Option<String>,

    /// Document to upload (.pdf, .jpg, .jpeg, .png, .doc, .docx); repeatable.
    #[arg(long = "document", short = 'd')]
    pub documents: Vec<PathBuf>,

    #[command(flatten)]
    pub follow: FollowArgs,
}

impl SubmitArgs {
    /// Field values given on the command line.
    pub fn field_values(&self) -> Vec<(IntakeField, &str)> {
        [
            (IntakeField::FirstName, &self.first_name),
            (IntakeField::LastName, &self.last_name),
            (IntakeField::Email, &self.email),
            (IntakeField::Phone, &self.phone),
            (IntakeField::DateOfBirth, &self.date_of_birth),
            (IntakeField::Gender, &self.gender),
            (IntakeField::Address, &self.address),
            (IntakeField::EmergencyContact, &self.emergency_contact),
            (IntakeField::EmergencyPhone, &self.emergency_phone),
            (IntakeField::MedicalHistory, &self.medical_history),
            (IntakeField::Allergies, &self.allergies),
            (IntakeField::CurrentMedications, &self.current_medications),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
        .collect()
    }
}
