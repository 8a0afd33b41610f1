//! Patient intake record: the named text fields a user fills in before
//! submitting.
//!
//! Fields are keyed by [`IntakeField`], whose serde names are the backend's
//! snake_case form field names, so a record can also be loaded from a JSON
//! object such as `{"first_name": "Awa", "phone": "+221771234567"}`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeField {
    FirstName,
    LastName,
    Email,
    Phone,
    DateOfBirth,
    Gender,
    Address,
    EmergencyContact,
    EmergencyPhone,
    MedicalHistory,
    Allergies,
    CurrentMedications,
}

impl IntakeField {
    /// Every field, in the order the backend's create endpoint lists them.
    pub const ALL: [IntakeField; 12] = [
        IntakeField::FirstName,
        IntakeField::LastName,
        IntakeField::Email,
        IntakeField::Phone,
        IntakeField::DateOfBirth,
        IntakeField::Gender,
        IntakeField::Address,
        IntakeField::EmergencyContact,
        IntakeField::EmergencyPhone,
        IntakeField::MedicalHistory,
        IntakeField::Allergies,
        IntakeField::CurrentMedications,
    ];

    pub const REQUIRED: [IntakeField; 3] = [
        IntakeField::FirstName,
        IntakeField::LastName,
        IntakeField::Phone,
    ];

    /// Multipart field name used by `POST /api/patients/`.
    pub fn external_name(self) -> &'static str {
        match self {
            IntakeField::FirstName => "first_name",
            IntakeField::LastName => "last_name",
            IntakeField::Email => "email",
            IntakeField::Phone => "phone",
            IntakeField::DateOfBirth => "date_of_birth",
            IntakeField::Gender => "gender",
            IntakeField::Address => "address",
            IntakeField::EmergencyContact => "emergency_contact",
            IntakeField::EmergencyPhone => "emergency_phone",
            IntakeField::MedicalHistory => "medical_history",
            IntakeField::Allergies => "allergies",
            IntakeField::CurrentMedications => "current_medications",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            IntakeField::FirstName => "first name",
            IntakeField::LastName => "last name",
            IntakeField::Email => "email",
            IntakeField::Phone => "phone",
            IntakeField::DateOfBirth => "date of birth",
            IntakeField::Gender => "gender",
            IntakeField::Address => "address",
            IntakeField::EmergencyContact => "emergency contact",
            IntakeField::EmergencyPhone => "emergency phone",
            IntakeField::MedicalHistory => "medical history",
            IntakeField::Allergies => "allergies",
            IntakeField::CurrentMedications => "current medications",
        }
    }

    pub fn is_required(self) -> bool {
        Self::REQUIRED.contains(&self)
    }
}

impl fmt::Display for IntakeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required fields: {}", join_labels(.0))]
    MissingFields(Vec<IntakeField>),
}

fn join_labels(fields: &[IntakeField]) -> String {
    fields
        .iter()
        .map(|f| f.label())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Text fields entered for one new patient.
///
/// Unset fields read as the empty string. Edits are plain replacement; the
/// only validation is the presence check in [`IntakeRecord::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntakeRecord {
    fields: BTreeMap<IntakeField, String>,
}

impl IntakeRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: IntakeField, value: impl Into<String>) {
        self.fields.insert(field, value.into());
    }

    pub fn get(&self, field: IntakeField) -> &str {
        self.fields.get(&field).map(String::as_str).unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.fields.values().all(|v| v.is_empty())
    }

    /// Check that first name, last name and phone are non-empty. Values are
    /// taken as entered, so a single space counts as filled in.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let missing: Vec<IntakeField> = IntakeField::REQUIRED
            .into_iter()
            .filter(|f| self.get(*f).is_empty())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::MissingFields(missing))
        }
    }

    /// All fields as `(external_name, value)` pairs in backend order, with
    /// unset optional fields sent as empty strings.
    pub fn to_form_fields(&self) -> Vec<(&'static str, String)> {
        IntakeField::ALL
            .into_iter()
            .map(|f| (f.external_name(), self.get(f).to_string()))
            .collect()
    }

    pub fn full_name(&self) -> String {
        format!(
            "{} {}",
            self.get(IntakeField::FirstName),
            self.get(IntakeField::LastName)
        )
        .trim()
        .to_string()
    }
}
