//! Write paths: onboarding, dose confirmation, skips, blood-pressure logs and
//! demo requests.
//!
//! These run outside the analytics engine. Each call is one store transaction
//! and stamps its rows with the clock's current civil time.

use chrono::Timelike;
use thiserror::Error;
use tracing::{info, warn};

use crate::analytics::{current_streak, AnalyticsError};
use crate::clock::Clock;
use crate::db::{Database, DbError};
use crate::models::{
    BpLog, BpReadingInput, DemoRequest, DosingWindow, Event, EventType, Medication, ModelError,
    Patient, DEFAULT_TARGET_DIASTOLIC, DEFAULT_TARGET_SYSTOLIC,
};

/// Name given to a patient who leaves the field blank.
pub const DEFAULT_PATIENT_NAME: &str = "Patient";

/// Write-path errors.
#[derive(Error, Debug)]
pub enum CareError {
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] ModelError),

    #[error("Doctor code not found: {0}")]
    UnknownDoctorCode(String),

    #[error("Patient not found: {0}")]
    PatientNotFound(String),

    #[error("Medication {medication_id} does not belong to patient {patient_id}")]
    MedicationNotFound {
        patient_id: String,
        medication_id: String,
    },

    #[error("Database error: {0}")]
    Db(#[from] DbError),

    #[error("Analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
}

pub type CareResult<T> = Result<T, CareError>;

/// One medication entered during onboarding.
#[derive(Debug, Clone, PartialEq)]
pub struct MedicationInput {
    pub drug_name: String,
    pub dosage: String,
    pub window: DosingWindow,
}

/// Everything collected by the onboarding steps.
#[derive(Debug, Clone, PartialEq)]
pub struct Onboarding {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// Optional code linking the patient to a doctor
    pub doctor_code: Option<String>,
    pub target_systolic: i32,
    pub target_diastolic: i32,
    pub medications: Vec<MedicationInput>,
}

impl Onboarding {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            phone: None,
            email: None,
            doctor_code: None,
            target_systolic: DEFAULT_TARGET_SYSTOLIC,
            target_diastolic: DEFAULT_TARGET_DIASTOLIC,
            medications: Vec::new(),
        }
    }

    pub fn with_medication(mut self, drug_name: &str, dosage: &str, window: DosingWindow) -> Self {
        self.medications.push(MedicationInput {
            drug_name: drug_name.to_string(),
            dosage: dosage.to_string(),
            window,
        });
        self
    }

    pub fn with_doctor_code(mut self, code: &str) -> Self {
        self.doctor_code = Some(code.to_string());
        self
    }

    pub fn with_targets(mut self, systolic: i32, diastolic: i32) -> Self {
        self.target_systolic = systolic;
        self.target_diastolic = diastolic;
        self
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn require_patient(db: &Database, patient_id: &str) -> CareResult<Patient> {
    db.get_patient(patient_id)?
        .ok_or_else(|| CareError::PatientNotFound(patient_id.to_string()))
}

fn require_medication(db: &Database, patient_id: &str, medication_id: &str) -> CareResult<()> {
    match db.get_medication(medication_id)? {
        Some(med) if med.patient_id == patient_id => Ok(()),
        _ => Err(CareError::MedicationNotFound {
            patient_id: patient_id.to_string(),
            medication_id: medication_id.to_string(),
        }),
    }
}

/// Create a patient with their medications and record `onboarding_completed`.
///
/// Medications with a blank drug name are dropped. A doctor code that matches
/// no doctor rejects the whole onboarding.
pub fn onboard_patient<C: Clock + ?Sized>(
    db: &Database,
    clock: &C,
    form: Onboarding,
) -> CareResult<(Patient, Vec<Medication>)> {
    let now = clock.now();
    let doctor_code = non_blank(form.doctor_code);
    let name = non_blank(Some(form.name)).unwrap_or_else(|| DEFAULT_PATIENT_NAME.to_string());

    db.in_transaction(|db| {
        if let Some(code) = &doctor_code {
            if db.find_doctor_by_code(code)?.is_none() {
                warn!(code = %code, "onboarding rejected: unknown doctor code");
                return Err(CareError::UnknownDoctorCode(code.clone()));
            }
        }

        let mut patient =
            Patient::new(name, now).with_targets(form.target_systolic, form.target_diastolic);
        patient.phone = non_blank(form.phone);
        patient.email = non_blank(form.email);
        patient.doctor_code = doctor_code.clone();
        db.insert_patient(&patient)?;

        let mut medications = Vec::new();
        for input in form.medications {
            let drug_name = input.drug_name.trim();
            if drug_name.is_empty() {
                continue;
            }
            let med = Medication::new(
                patient.id.clone(),
                drug_name.to_string(),
                input.dosage.trim().to_string(),
                input.window,
                now,
            );
            db.insert_medication(&med)?;
            medications.push(med);
        }

        db.append_event(&Event::new(&patient.id, EventType::OnboardingCompleted, now))?;
        info!(
            patient_id = %patient.id,
            medications = medications.len(),
            "patient onboarded"
        );
        Ok((patient, medications))
    })
}

/// Record a confirmed dose, then recompute and persist the streak.
///
/// Returns the new streak.
pub fn confirm_dose<C: Clock + ?Sized>(
    db: &Database,
    clock: &C,
    patient_id: &str,
    medication_id: Option<&str>,
) -> CareResult<u32> {
    let now = clock.now();

    db.in_transaction(|db| {
        require_patient(db, patient_id)?;
        let mut event = Event::new(patient_id, EventType::DoseConfirmed, now)
            .with_meta("day_of_week", now.format("%A").to_string())
            .with_meta("hour", now.hour());
        if let Some(med_id) = medication_id {
            require_medication(db, patient_id, med_id)?;
            event = event.with_medication(med_id);
        }
        db.append_event(&event)?;

        let streak = current_streak(db, patient_id, now.date())?;
        db.update_patient_streak(patient_id, streak)?;
        info!(patient_id, streak, "dose confirmed");
        Ok(streak)
    })
}

/// Record a skipped dose.
pub fn skip_dose<C: Clock + ?Sized>(
    db: &Database,
    clock: &C,
    patient_id: &str,
    medication_id: Option<&str>,
) -> CareResult<()> {
    let now = clock.now();

    db.in_transaction(|db| {
        require_patient(db, patient_id)?;
        let mut event = Event::new(patient_id, EventType::DoseSkipped, now);
        if let Some(med_id) = medication_id {
            require_medication(db, patient_id, med_id)?;
            event = event.with_medication(med_id);
        }
        db.append_event(&event)?;
        info!(patient_id, "dose skipped");
        Ok(())
    })
}

/// Store a validated reading and record `bp_logged`.
pub fn log_bp<C: Clock + ?Sized>(
    db: &Database,
    clock: &C,
    patient_id: &str,
    reading: BpReadingInput,
) -> CareResult<BpLog> {
    let now = clock.now();

    db.in_transaction(|db| {
        require_patient(db, patient_id)?;
        let log = BpLog::new(patient_id, reading, now);
        db.insert_bp_log(&log)?;

        let event = Event::new(patient_id, EventType::BpLogged, now)
            .with_meta("systolic", log.systolic)
            .with_meta("diastolic", log.diastolic)
            .with_meta("context", log.context.clone());
        db.append_event(&event)?;
        info!(patient_id, reading = %log.display(), "blood pressure logged");
        Ok(log)
    })
}

/// Parse raw form fields, then [`log_bp`].
pub fn log_bp_form<C: Clock + ?Sized>(
    db: &Database,
    clock: &C,
    patient_id: &str,
    systolic: &str,
    diastolic: &str,
    context: Option<&str>,
    notes: Option<&str>,
) -> CareResult<BpLog> {
    let reading = BpReadingInput::parse(systolic, diastolic, context, notes).map_err(|e| {
        warn!(patient_id, error = %e, "rejected blood-pressure input");
        e
    })?;
    log_bp(db, clock, patient_id, reading)
}

/// Store a landing-page demo request. Blank fields are stored as missing.
pub fn request_demo<C: Clock + ?Sized>(
    db: &Database,
    clock: &C,
    name: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    role: Option<String>,
) -> CareResult<DemoRequest> {
    let mut request = DemoRequest::new(clock.now());
    request.name = non_blank(name);
    request.phone = non_blank(phone);
    request.email = non_blank(email);
    request.role = non_blank(role);
    db.insert_demo_request(&request)?;
    info!(request_id = %request.id, role = ?request.role, "demo requested");
    Ok(request)
}

/// Record a system-level `doctor_portal_viewed` event.
pub fn record_portal_view<C: Clock + ?Sized>(db: &Database, clock: &C) -> CareResult<()> {
    db.append_event(&Event::system(EventType::DoctorPortalViewed, clock.now()))?;
    Ok(())
}

/// Record a `dashboard_opened` event for a patient.
pub fn record_dashboard_open<C: Clock + ?Sized>(
    db: &Database,
    clock: &C,
    patient_id: &str,
) -> CareResult<()> {
    db.append_event(&Event::new(patient_id, EventType::DashboardOpened, clock.now()))?;
    Ok(())
}
